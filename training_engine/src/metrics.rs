// training_engine/src/metrics.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Накопительные метрики языкового моделирования.
//!
//! Метрики взвешиваются по числу токенов: батчи разного размера вносят
//! вклад пропорционально количеству реальных (не игнорируемых) целевых меток.
//! Для обучения и валидации заводятся отдельные экземпляры.

use burn::{
    tensor::{backend::Backend, ElementConversion},
    train::ClassificationOutput,
};

/// Взвешенное по токенам скользящее среднее кросс-энтропии.
///
/// С фичей `serde_support` состояние аккумулятора (де)сериализуется,
/// что позволяет сохранять и восстанавливать его вместе с чекпоинтом запуска.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
pub struct LanguageCrossEntropy {
    /// Сумма лоссов, умноженных на количество токенов батча.
    total_loss: f64,
    /// Суммарное количество учтенных токенов.
    total_tokens: usize,
}

impl LanguageCrossEntropy {
    /// Создает пустой аккумулятор.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_loss: 0.0,
            total_tokens: 0,
        }
    }

    /// Учитывает средний лосс батча с весом `num_tokens`.
    pub fn update(&mut self, batch_mean_loss: f64, num_tokens: usize) {
        self.total_loss += batch_mean_loss * num_tokens as f64;
        self.total_tokens += num_tokens;
    }

    /// Учитывает результат шага обучения или валидации.
    ///
    /// Количество токенов берется из числа целевых меток, средний лосс
    /// считывается со скалярного тензора.
    pub fn update_from_output<B: Backend>(&mut self, output: &ClassificationOutput<B>) {
        let num_tokens = output.targets.dims()[0];
        let batch_mean_loss: f64 = output.loss.clone().into_scalar().elem();
        self.update(batch_mean_loss, num_tokens);
    }

    /// Текущее среднее значение кросс-энтропии (0, если токенов не было).
    #[must_use]
    pub fn value(&self) -> f64 {
        if self.total_tokens == 0 {
            return 0.0;
        }
        self.total_loss / self.total_tokens as f64
    }

    /// Количество учтенных токенов.
    #[must_use]
    pub const fn num_tokens(&self) -> usize {
        self.total_tokens
    }

    /// Сбрасывает аккумулятор.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Перплексия: экспонента взвешенной по токенам кросс-энтропии.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde_support", derive(serde::Serialize, serde::Deserialize))]
pub struct Perplexity {
    /// Внутренний аккумулятор кросс-энтропии.
    cross_entropy: LanguageCrossEntropy,
}

impl Perplexity {
    /// Создает пустой аккумулятор.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cross_entropy: LanguageCrossEntropy::new(),
        }
    }

    /// Учитывает средний лосс батча с весом `num_tokens`.
    pub fn update(&mut self, batch_mean_loss: f64, num_tokens: usize) {
        self.cross_entropy.update(batch_mean_loss, num_tokens);
    }

    /// Учитывает результат шага обучения или валидации.
    pub fn update_from_output<B: Backend>(&mut self, output: &ClassificationOutput<B>) {
        self.cross_entropy.update_from_output(output);
    }

    /// Текущее значение перплексии (1, если токенов не было).
    #[must_use]
    pub fn value(&self) -> f64 {
        self.cross_entropy.value().exp()
    }

    /// Сбрасывает аккумулятор.
    pub fn reset(&mut self) {
        self.cross_entropy.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cross_entropy_is_token_weighted() {
        let mut metric = LanguageCrossEntropy::new();
        metric.update(2.0, 10);
        metric.update(4.0, 30);
        // (2 * 10 + 4 * 30) / 40 = 3.5
        assert_relative_eq!(metric.value(), 3.5, epsilon = 1e-12);
        assert_eq!(metric.num_tokens(), 40);
    }

    #[test]
    fn test_empty_metric_values() {
        let ce = LanguageCrossEntropy::new();
        assert_relative_eq!(ce.value(), 0.0);
        let ppl = Perplexity::new();
        assert_relative_eq!(ppl.value(), 1.0);
    }

    #[test]
    fn test_perplexity_is_exp_of_cross_entropy() {
        let mut ppl = Perplexity::new();
        ppl.update(1.0, 5);
        assert_relative_eq!(ppl.value(), core::f64::consts::E, epsilon = 1e-12);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut metric = LanguageCrossEntropy::new();
        metric.update(2.0, 10);
        metric.reset();
        assert_eq!(metric.num_tokens(), 0);
        assert_relative_eq!(metric.value(), 0.0);
    }

    #[cfg(feature = "serde_support")]
    #[test]
    fn test_metric_state_serde_round_trip() {
        let mut metric = LanguageCrossEntropy::new();
        metric.update(2.0, 10);
        metric.update(4.0, 30);

        let json = serde_json::to_string(&metric).unwrap();
        let restored: LanguageCrossEntropy = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.num_tokens(), metric.num_tokens());
        assert_relative_eq!(restored.value(), metric.value(), epsilon = 1e-12);
    }
}
