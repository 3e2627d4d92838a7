// core_burn/src/architectures/gpt/ffn.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Реализация Feed-Forward Network (MLP) для GPT-подобной модели.
//!
//! Классический двухслойный MLP: расширение `d_model -> mlp_ratio * d_model`,
//! активация GELU, сжатие обратно до `d_model`.

use burn::{
    module::Module,
    nn::{Gelu, Initializer, Linear, LinearConfig},
    tensor::{backend::Backend, Tensor},
};

use crate::BurnCoreError;

/// Конфигурация для [`GptFeedForward`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GptFeedForwardConfig {
    /// Размерность скрытого слоя модели.
    pub d_model: usize,
    /// Множитель расширения внутреннего слоя MLP.
    pub mlp_ratio: usize,
    /// Стандартное отклонение инициализации входной проекции.
    pub init_std: f64,
    /// Стандартное отклонение инициализации выходной (остаточной) проекции:
    /// `init_std / sqrt(2 * n_layers)`.
    pub resid_init_std: f64,
}

impl GptFeedForwardConfig {
    /// Создает новый экземпляр [`GptFeedForward`].
    ///
    /// # Ошибки
    /// Возвращает `InvalidConfig`, если `mlp_ratio` равно нулю.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<GptFeedForward<B>, BurnCoreError> {
        if self.mlp_ratio == 0 {
            return Err(BurnCoreError::InvalidConfig(
                "mlp_ratio должно быть больше нуля.".to_string(),
            ));
        }
        let d_hidden = self.d_model * self.mlp_ratio;

        let mlp_up = LinearConfig::new(self.d_model, d_hidden)
            .with_bias(true)
            .with_initializer(Initializer::Normal {
                mean: 0.0,
                std: self.init_std,
            })
            .init(device);
        // Выходная проекция лежит на остаточной ветви и инициализируется
        // уменьшенным стандартным отклонением.
        let mlp_down = LinearConfig::new(d_hidden, self.d_model)
            .with_bias(true)
            .with_initializer(Initializer::Normal {
                mean: 0.0,
                std: self.resid_init_std,
            })
            .init(device);

        Ok(GptFeedForward {
            mlp_up: zero_bias(mlp_up, d_hidden, device),
            activation: Gelu::new(),
            mlp_down: zero_bias(mlp_down, self.d_model, device),
        })
    }
}

/// Зануляет смещение линейного слоя после инициализации.
fn zero_bias<B: Backend>(mut linear: Linear<B>, d_out: usize, device: &B::Device) -> Linear<B> {
    linear.bias = linear.bias.map(|_| Initializer::Zeros.init([d_out], device));
    linear
}

/// Feed-Forward Network (MLP) слой GPT-модели.
#[derive(Debug, Module)]
pub struct GptFeedForward<B: Backend> {
    /// Расширяющая проекция `d_model -> mlp_ratio * d_model`.
    mlp_up: Linear<B>,
    /// Активация GELU между проекциями.
    activation: Gelu,
    /// Сжимающая (остаточная) проекция обратно до `d_model`.
    mlp_down: Linear<B>,
}

impl<B: Backend> GptFeedForward<B> {
    /// Выполняет прямой проход через MLP.
    ///
    /// # Аргументы
    /// * `hidden_states`: Входной тензор, форма `[batch, seq_len, d_model]`.
    ///
    /// # Возвращает
    /// Выходной тензор той же формы.
    pub fn forward(&self, hidden_states: Tensor<B, 3>) -> Tensor<B, 3> {
        let up = self.mlp_up.forward(hidden_states);
        let activated = self.activation.forward(up);
        self.mlp_down.forward(activated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_ffn_forward_shape() {
        let device = Default::default();
        let config = GptFeedForwardConfig {
            d_model: 16,
            mlp_ratio: 4,
            init_std: 0.02,
            resid_init_std: 0.01,
        };
        let ffn = config.init::<TestBackend>(&device).unwrap();

        let x = Tensor::<TestBackend, 3>::zeros([2, 7, 16], &device);
        let output = ffn.forward(x);
        assert_eq!(output.dims(), [2, 7, 16]);
    }

    #[test]
    fn test_ffn_zero_ratio_is_rejected() {
        let device = Default::default();
        let config = GptFeedForwardConfig {
            d_model: 16,
            mlp_ratio: 0,
            init_std: 0.02,
            resid_init_std: 0.01,
        };
        assert!(matches!(
            config.init::<TestBackend>(&device),
            Err(BurnCoreError::InvalidConfig(_))
        ));
    }
}
