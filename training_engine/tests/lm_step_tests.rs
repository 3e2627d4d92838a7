// training_engine/tests/lm_step_tests.rs

//! Интеграционные тесты шагов обучения и валидации языковой модели
//! на CPU-бэкенде NdArray (с autodiff для обучения).

use burn::backend::{Autodiff, NdArray};
use burn::tensor::{Bool, Int, Tensor, TensorData};
use burn::train::{TrainStep, ValidStep};

use core_burn::GptModelConfig;
use training_engine::{GptLanguageModel, LanguageCrossEntropy, LmBatch, Perplexity, IGNORE_LABEL};

type TestBackend = NdArray;
type TestAutodiffBackend = Autodiff<NdArray>;

fn small_config() -> GptModelConfig {
    GptModelConfig::new(50, 16, 32, 2, 4)
}

fn int_tensor<B: burn::tensor::backend::Backend>(
    values: Vec<i64>,
    shape: [usize; 2],
) -> Tensor<B, 2, Int> {
    let device = Default::default();
    Tensor::from_data(TensorData::new(values, shape), &device)
}

#[test]
fn test_train_step_produces_finite_loss_and_gradients() {
    let device = Default::default();
    let model =
        GptLanguageModel::<TestAutodiffBackend>::new(&small_config(), &device).unwrap();

    let batch = LmBatch::new(int_tensor(vec![1, 2, 3, 4, 5, 6, 7, 8], [2, 4]));
    let output = TrainStep::step(&model, batch);

    let loss: Vec<f32> = output.item.loss.into_data().to_vec().unwrap();
    assert!(loss[0].is_finite());
    assert!(loss[0] > 0.0);
}

#[test]
fn test_valid_step_runs_without_autodiff() {
    let device = Default::default();
    let model = GptLanguageModel::<TestBackend>::new(&small_config(), &device).unwrap();

    let batch = LmBatch::new(int_tensor(vec![1, 2, 3, 4], [1, 4]));
    let output = ValidStep::step(&model, batch);

    // Сдвинутые цели: 3 реальные позиции из 4.
    assert_eq!(output.targets.dims(), [3]);
    assert_eq!(output.output.dims(), [3, 50]);
}

#[test]
fn test_padding_and_labels_through_wrapper() {
    let device = Default::default();
    let model = GptLanguageModel::<TestBackend>::new(&small_config(), &device).unwrap();

    // Последний токен - паддинг; его метка игнорируется.
    let attention_mask = Tensor::<TestBackend, 2, Bool>::from_data(
        TensorData::new(vec![true, true, true, false], [1, 4]),
        &device,
    );
    let batch = LmBatch::new(int_tensor(vec![1, 2, 3, 0], [1, 4]))
        .with_labels(int_tensor(vec![2, 3, IGNORE_LABEL, IGNORE_LABEL], [1, 4]))
        .with_attention_mask(attention_mask);

    let output = model.forward_classification(batch).unwrap();
    assert_eq!(output.targets.dims(), [2]);

    let loss: Vec<f32> = output.loss.into_data().to_vec().unwrap();
    assert!(loss[0].is_finite());
}

#[test]
fn test_metrics_accumulate_from_outputs() {
    let device = Default::default();
    let model = GptLanguageModel::<TestBackend>::new(&small_config(), &device).unwrap();

    let mut cross_entropy = LanguageCrossEntropy::new();
    let mut perplexity = Perplexity::new();

    for start in [1_i64, 5, 9] {
        let ids: Vec<i64> = (start..start + 4).collect();
        let output = model
            .forward_classification(LmBatch::new(int_tensor(ids, [1, 4])))
            .unwrap();
        cross_entropy.update_from_output(&output);
        perplexity.update_from_output(&output);
    }

    // 3 батча по 3 реальных цели.
    assert_eq!(cross_entropy.num_tokens(), 9);
    assert!(cross_entropy.value() > 0.0);
    approx::assert_relative_eq!(
        perplexity.value(),
        cross_entropy.value().exp(),
        epsilon = 1e-12
    );
}

#[test]
fn test_bidirectional_prefix_changes_logits() {
    let device = Default::default();
    let model = GptLanguageModel::<TestBackend>::new(&small_config(), &device).unwrap();

    let ids = vec![1_i64, 2, 3, 4];
    let causal = model
        .forward_classification(LmBatch::new(int_tensor(ids.clone(), [1, 4])))
        .unwrap();

    let prefix = Tensor::<TestBackend, 2, Bool>::from_data(
        TensorData::new(vec![true, true, false, false], [1, 4]),
        &device,
    );
    let prefix_lm = model
        .forward_classification(
            LmBatch::new(int_tensor(ids, [1, 4])).with_bidirectional_mask(prefix),
        )
        .unwrap();

    // Двунаправленный префикс открывает позиции будущего внутри сегмента,
    // поэтому логиты первой позиции должны отличаться.
    let causal_logits: Vec<f32> = causal.output.into_data().to_vec().unwrap();
    let prefix_logits: Vec<f32> = prefix_lm.output.into_data().to_vec().unwrap();
    let differs = causal_logits
        .iter()
        .zip(prefix_logits.iter())
        .any(|(a, b)| (a - b).abs() > 1e-6);
    assert!(differs);
}
