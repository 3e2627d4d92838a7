// training_engine/src/batch.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Батч языкового моделирования, подаваемый на шаг обучения или валидации.

use burn::tensor::{backend::Backend, Bool, Int, Tensor};

/// Значение целевой метки, исключаемое из вычисления лосса.
pub const IGNORE_LABEL: i64 = -100;

/// Один батч для языковой модели.
///
/// Если `labels` не заданы, целевые метки выводятся из `input_ids`
/// сдвигом на одну позицию влево (задача предсказания следующего токена).
#[derive(Debug, Clone)]
pub struct LmBatch<B: Backend> {
    /// Идентификаторы входных токенов, форма `[batch, seq_len]`.
    pub input_ids: Tensor<B, 2, Int>,
    /// Опциональные целевые метки той же формы; значение [`IGNORE_LABEL`]
    /// исключает позицию из лосса.
    pub labels: Option<Tensor<B, 2, Int>>,
    /// Опциональная маска паддинга `[batch, seq_len]` (`true` = реальный токен).
    pub attention_mask: Option<Tensor<B, 2, Bool>>,
    /// Опциональная маска двунаправленного префикса `[batch, seq_len]`.
    pub bidirectional_mask: Option<Tensor<B, 2, Bool>>,
}

impl<B: Backend> LmBatch<B> {
    /// Создает батч только из входных токенов (метки будут выведены сдвигом).
    #[must_use]
    pub fn new(input_ids: Tensor<B, 2, Int>) -> Self {
        Self {
            input_ids,
            labels: None,
            attention_mask: None,
            bidirectional_mask: None,
        }
    }

    /// Задает явные целевые метки.
    #[must_use]
    pub fn with_labels(mut self, labels: Tensor<B, 2, Int>) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Задает маску паддинга.
    #[must_use]
    pub fn with_attention_mask(mut self, mask: Tensor<B, 2, Bool>) -> Self {
        self.attention_mask = Some(mask);
        self
    }

    /// Задает маску двунаправленного префикса.
    #[must_use]
    pub fn with_bidirectional_mask(mut self, mask: Tensor<B, 2, Bool>) -> Self {
        self.bidirectional_mask = Some(mask);
        self
    }
}
