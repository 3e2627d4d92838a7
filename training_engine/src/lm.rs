// training_engine/src/lm.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Обертка языковой модели над [`core_burn::GptModel`]: вывод целевых меток,
//! кросс-энтропийный лосс следующего токена с игнорируемой меткой и
//! реализации `TrainStep`/`ValidStep` для `burn::train::Learner`.

use burn::{
    module::Module,
    nn::loss::CrossEntropyLossConfig,
    tensor::{backend::AutodiffBackend, backend::Backend, Int, Tensor},
    train::{ClassificationOutput, TrainOutput, TrainStep, ValidStep},
};

use core_burn::{GptModel, GptModelConfig};

use crate::{
    batch::{LmBatch, IGNORE_LABEL},
    TrainingEngineError,
};

/// Языковая модель для обучения: GPT-модель плюс вычисление лосса.
///
/// Логиты вычисляются только для позиций, порождающих лосс: строки скрытых
/// состояний с меткой [`IGNORE_LABEL`] отбрасываются до связанной проекции
/// в словарь, что экономит память на больших словарях.
#[derive(Debug, Module)]
pub struct GptLanguageModel<B: Backend> {
    /// Базовая GPT-модель.
    model: GptModel<B>,
    /// Оценка FLOPs одного прямого прохода, вычисленная при создании.
    num_fwd_flops: usize,
}

impl<B: Backend> GptLanguageModel<B> {
    /// Создает языковую модель из конфигурации GPT.
    ///
    /// # Ошибки
    /// Пробрасывает ошибки валидации и инициализации из `core_burn`.
    pub fn new(config: &GptModelConfig, device: &B::Device) -> Result<Self, TrainingEngineError> {
        let model = config.init(device)?;
        let num_fwd_flops = model.num_fwd_flops();
        tracing::info!(num_fwd_flops, "Языковая модель создана");
        Ok(Self {
            model,
            num_fwd_flops,
        })
    }

    /// Базовая GPT-модель.
    #[must_use]
    pub const fn model(&self) -> &GptModel<B> {
        &self.model
    }

    /// Оценка FLOPs одного прямого прохода на полной длине последовательности.
    #[must_use]
    pub const fn num_fwd_flops(&self) -> usize {
        self.num_fwd_flops
    }

    /// Выводит целевые метки для батча.
    ///
    /// С явными `labels` возвращает их как есть. Без них цели получаются
    /// сдвигом `input_ids` на одну позицию влево; последняя позиция помечается
    /// [`IGNORE_LABEL`], так как для нее нет следующего токена.
    fn derive_targets(batch: &LmBatch<B>) -> Tensor<B, 2, Int> {
        if let Some(labels) = &batch.labels {
            return labels.clone();
        }
        let [batch_size, seq_len] = batch.input_ids.dims();
        let device = batch.input_ids.device();
        let shifted = batch
            .input_ids
            .clone()
            .slice([0..batch_size, 1..seq_len]);
        let tail = Tensor::<B, 2, Int>::full([batch_size, 1], IGNORE_LABEL, &device);
        Tensor::cat(vec![shifted, tail], 1)
    }

    /// Полный проход с вычислением лосса: скрытые состояния, отбор строк
    /// с реальными метками, связанная проекция, кросс-энтропия.
    ///
    /// # Ошибки
    /// Возвращает `InvalidBatch`, если форма `labels` не совпадает с формой
    /// `input_ids` или ни одна позиция батча не порождает лосс, а также
    /// пробрасывает ошибки `core_burn` при несогласованных формах масок.
    pub fn forward_classification(
        &self,
        batch: LmBatch<B>,
    ) -> Result<ClassificationOutput<B>, TrainingEngineError> {
        let [batch_size, seq_len] = batch.input_ids.dims();
        if let Some(labels) = &batch.labels {
            let label_dims = labels.dims();
            if label_dims != [batch_size, seq_len] {
                return Err(TrainingEngineError::InvalidBatch(format!(
                    "форма labels {label_dims:?} не совпадает с формой input_ids \
                     [{batch_size}, {seq_len}]"
                )));
            }
        }
        let targets = Self::derive_targets(&batch);

        let hidden = self.model.forward_hidden(
            batch.input_ids,
            batch.attention_mask,
            batch.bidirectional_mask,
        )?;
        let [_, _, d_model] = hidden.dims();

        let hidden_flat = hidden.reshape([batch_size * seq_len, d_model]);
        let targets_flat = targets.reshape([batch_size * seq_len]);

        // Индексы позиций с реальными метками (target != IGNORE_LABEL).
        let keep = targets_flat.clone().not_equal_elem(IGNORE_LABEL);
        let indices = keep.argwhere().squeeze::<1>(1);
        let n_rows = indices.dims()[0];
        if n_rows == 0 {
            return Err(TrainingEngineError::InvalidBatch(
                "все целевые метки батча помечены как игнорируемые".to_string(),
            ));
        }

        let hidden_rows = hidden_flat.select(0, indices.clone());
        let targets_rows = targets_flat.select(0, indices);

        let logits = self.model.project(hidden_rows);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets_rows.clone());

        Ok(ClassificationOutput::new(loss, logits, targets_rows))
    }
}

impl<B: AutodiffBackend> TrainStep<LmBatch<B>, ClassificationOutput<B>> for GptLanguageModel<B> {
    fn step(&self, batch: LmBatch<B>) -> TrainOutput<ClassificationOutput<B>> {
        // Интерфейс TrainStep не допускает Result; некорректный батч
        // означает ошибку в пайплайне данных.
        let output = match self.forward_classification(batch) {
            Ok(output) => output,
            Err(error) => {
                tracing::error!(%error, "Ошибка на шаге обучения");
                panic!("шаг обучения невозможен: {error}");
            }
        };
        TrainOutput::new(self, output.loss.backward(), output)
    }
}

impl<B: Backend> ValidStep<LmBatch<B>, ClassificationOutput<B>> for GptLanguageModel<B> {
    fn step(&self, batch: LmBatch<B>) -> ClassificationOutput<B> {
        match self.forward_classification(batch) {
            Ok(output) => output,
            Err(error) => {
                tracing::error!(%error, "Ошибка на шаге валидации");
                panic!("шаг валидации невозможен: {error}");
            }
        }
    }
}
