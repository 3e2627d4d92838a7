// core_burn/src/architectures/gpt/attention.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Реализация механизма внимания (Self-Attention) для GPT-подобной модели.
//!
//! Поддерживаются две взаимозаменяемые реализации:
//! - [`BuiltinAttention`]: обертка над готовым примитивом `MultiHeadAttention` из Burn;
//!   принимает только булеву маску, поэтому несовместима с ALiBi.
//! - [`FusedAttention`]: собранное вручную multi-head внимание с отдельными Q/K/V/O
//!   проекциями, принимающее полный аддитивный тензор смещения (включая ALiBi).

use burn::{
    module::Module, // Module для определения модулей.
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig, Initializer, Linear, LinearConfig,
    },
    tensor::{activation, backend::Backend, Tensor}, // Основные типы тензоров.
};

// Импортируем необходимые компоненты из нашего крейта.
use crate::BurnCoreError; // Тип ошибки нашего крейта.

/// Выбор реализации внимания.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttnImpl {
    /// Готовый примитив `burn::nn::attention::MultiHeadAttention`.
    Builtin,
    /// Собранное вручную внимание с аддитивным смещением в скорах.
    Fused,
}

impl core::fmt::Display for AttnImpl {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::Fused => write!(f, "fused"),
        }
    }
}

/// Конфигурация для слоя внимания [`GptAttention`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GptAttentionConfig {
    /// Размерность скрытого слоя модели.
    pub d_model: usize,
    /// Количество голов внимания.
    pub n_heads: usize,
    /// Вероятность дропаута весов внимания (после softmax).
    #[serde(default)]
    pub attn_pdrop: f64,
    /// Выбранная реализация внимания.
    pub attn_impl: AttnImpl,
    /// Используется ли в модели ALiBi (влияет на допустимость `Builtin`).
    #[serde(default)]
    pub alibi: bool,
    /// Стандартное отклонение инициализации проекций Q/K/V.
    pub init_std: f64,
    /// Стандартное отклонение инициализации выходной (остаточной) проекции:
    /// `init_std / sqrt(2 * n_layers)`.
    pub resid_init_std: f64,
}

impl GptAttentionConfig {
    /// Создает новый экземпляр [`GptAttention`].
    ///
    /// # Аргументы
    /// * `device`: Устройство Burn, на котором будут инициализированы веса.
    ///
    /// # Ошибки
    /// Возвращает `InvalidConfig`, если `d_model` не кратно `n_heads`, и
    /// `UnsupportedAttnImpl`, если выбрана реализация `Builtin` вместе с ALiBi:
    /// примитив Burn принимает только булеву маску и не может нести
    /// вещественный позиционный штраф.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<GptAttention<B>, BurnCoreError> {
        if self.n_heads == 0 || self.d_model % self.n_heads != 0 {
            return Err(BurnCoreError::InvalidConfig(format!(
                "d_model ({}) должно быть кратно n_heads ({}).",
                self.d_model, self.n_heads
            )));
        }

        match self.attn_impl {
            AttnImpl::Builtin => {
                if self.alibi {
                    return Err(BurnCoreError::UnsupportedAttnImpl {
                        attn_impl: self.attn_impl.to_string(),
                        reason: "ALiBi требует аддитивного смещения; примитив \
                                 MultiHeadAttention принимает только булеву маску. \
                                 Используйте attn_impl = fused."
                            .to_string(),
                    });
                }
                // Встроенный примитив не позволяет отдельно масштабировать
                // инициализацию выходной проекции.
                tracing::warn!(
                    "attn_impl = builtin: рекомендуется `fused` (полное аддитивное \
                     смещение и per-проекционная инициализация)."
                );
                let mha = MultiHeadAttentionConfig::new(self.d_model, self.n_heads)
                    .with_dropout(self.attn_pdrop)
                    .with_initializer(Initializer::Normal {
                        mean: 0.0,
                        std: self.init_std,
                    })
                    .init(device);
                Ok(GptAttention::Builtin(BuiltinAttention { mha }))
            }
            AttnImpl::Fused => {
                let head_dim = self.d_model / self.n_heads;

                let q_proj = self.projection(self.init_std, device);
                let k_proj = self.projection(self.init_std, device);
                let v_proj = self.projection(self.init_std, device);
                // Выходная проекция лежит на остаточной ветви и инициализируется
                // уменьшенным стандартным отклонением.
                let o_proj = self.projection(self.resid_init_std, device);

                Ok(GptAttention::Fused(FusedAttention {
                    q_proj,
                    k_proj,
                    v_proj,
                    o_proj,
                    attn_dropout: DropoutConfig::new(self.attn_pdrop).init(),
                    n_heads: self.n_heads,
                    head_dim,
                }))
            }
        }
    }

    /// Квадратная проекция `d_model -> d_model` с нормальной инициализацией весов
    /// и нулевым смещением.
    fn projection<B: Backend>(&self, std: f64, device: &B::Device) -> Linear<B> {
        let mut linear = LinearConfig::new(self.d_model, self.d_model)
            .with_bias(true)
            .with_initializer(Initializer::Normal { mean: 0.0, std })
            .init(device);
        linear.bias = linear
            .bias
            .map(|_| Initializer::Zeros.init([self.d_model], device));
        linear
    }
}

/// Слой внимания GPT-модели: одна из двух взаимозаменяемых реализаций.
#[derive(Debug, Module)]
pub enum GptAttention<B: Backend> {
    /// Обертка над `burn::nn::attention::MultiHeadAttention`.
    Builtin(BuiltinAttention<B>),
    /// Собранное вручную внимание с аддитивным смещением.
    Fused(FusedAttention<B>),
}

impl<B: Backend> GptAttention<B> {
    /// Выполняет прямой проход через слой внимания.
    ///
    /// # Аргументы
    /// * `hidden_states`: Входной тензор, форма `[batch, seq_len, d_model]`.
    /// * `attn_bias`: Аддитивное смещение внимания, форма `[1 | batch, n_heads, seq_len, seq_len]`
    ///   (`-inf` для запрещенных пар, `0` или ALiBi-штраф для разрешенных).
    ///
    /// # Возвращает
    /// Выходной тензор той же формы `[batch, seq_len, d_model]`.
    pub fn forward(&self, hidden_states: Tensor<B, 3>, attn_bias: Tensor<B, 4>) -> Tensor<B, 3> {
        match self {
            Self::Builtin(inner) => inner.forward(hidden_states, attn_bias),
            Self::Fused(inner) => inner.forward(hidden_states, attn_bias),
        }
    }
}

/// Внимание на основе готового примитива `MultiHeadAttention` из Burn.
#[derive(Debug, Module)]
pub struct BuiltinAttention<B: Backend> {
    /// Примитив multi-head внимания Burn.
    mha: MultiHeadAttention<B>,
}

impl<B: Backend> BuiltinAttention<B> {
    /// Прямой проход: аддитивное смещение сворачивается в булеву маску.
    ///
    /// Инвариант: без ALiBi смещение одинаково для всех голов, поэтому
    /// достаточно нулевой головы.
    pub fn forward(&self, hidden_states: Tensor<B, 3>, attn_bias: Tensor<B, 4>) -> Tensor<B, 3> {
        let [batch, _, _] = hidden_states.dims();
        let [leading, _, s_q, s_k] = attn_bias.dims();

        // [L, H, S, S] -> [L, S, S]: берем нулевую голову.
        let collapsed = attn_bias
            .slice([0..leading, 0..1, 0..s_q, 0..s_k])
            .reshape([leading, s_q, s_k]);
        // Если смещение построено без по-батчевых масок, расширяем его на батч.
        let collapsed = if leading == 1 && batch > 1 {
            collapsed.expand([batch, s_q, s_k])
        } else {
            collapsed
        };
        // true = пара запрещена (в burn `mask_attn` именно такая семантика).
        let mask = collapsed.lower_elem(-1.0e4);

        let input = MhaInput::self_attn(hidden_states).mask_attn(mask);
        self.mha.forward(input).context
    }
}

/// Собранное вручную multi-head внимание с аддитивным смещением в скорах.
#[derive(Debug, Module)]
pub struct FusedAttention<B: Backend> {
    /// Линейная проекция для Query.
    q_proj: Linear<B>,
    /// Линейная проекция для Key.
    k_proj: Linear<B>,
    /// Линейная проекция для Value.
    v_proj: Linear<B>,
    /// Выходная (остаточная) проекция.
    o_proj: Linear<B>,
    /// Дропаут весов внимания (после softmax).
    attn_dropout: Dropout,
    /// Количество голов внимания.
    n_heads: usize,
    /// Размерность одной головы (`d_model / n_heads`).
    head_dim: usize,
}

impl<B: Backend> FusedAttention<B> {
    /// Прямой проход: скоры масштабируются на `1/sqrt(head_dim)`,
    /// смещение прибавляется до softmax.
    pub fn forward(&self, hidden_states: Tensor<B, 3>, attn_bias: Tensor<B, 4>) -> Tensor<B, 3> {
        let [batch, seq_len, _] = hidden_states.dims();

        // 1. Проекции Q, K, V и разбиение на головы:
        // [B, S, D] -> [B, H, S, head_dim].
        let query = self
            .q_proj
            .forward(hidden_states.clone())
            .reshape([batch, seq_len, self.n_heads, self.head_dim])
            .swap_dims(1, 2);
        let key = self
            .k_proj
            .forward(hidden_states.clone())
            .reshape([batch, seq_len, self.n_heads, self.head_dim])
            .swap_dims(1, 2);
        let value = self
            .v_proj
            .forward(hidden_states)
            .reshape([batch, seq_len, self.n_heads, self.head_dim])
            .swap_dims(1, 2);

        // 2. Скоры внимания: Q * K^T / sqrt(head_dim) + bias.
        // [B, H, S, head_dim] x [B, H, head_dim, S] -> [B, H, S, S].
        let scores = query
            .matmul(key.transpose())
            .div_scalar((self.head_dim as f64).sqrt());
        let scores = scores + attn_bias; // бродкастинг по батчу при leading == 1

        // 3. Softmax по ключам, дропаут, агрегация значений.
        let weights = activation::softmax(scores, 3);
        let weights = self.attn_dropout.forward(weights);
        let context = weights.matmul(value);

        // 4. [B, H, S, head_dim] -> [B, S, D] и выходная проекция.
        let context = context
            .swap_dims(1, 2)
            .reshape([batch, seq_len, self.n_heads * self.head_dim]);
        self.o_proj.forward(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn config(attn_impl: AttnImpl, alibi: bool) -> GptAttentionConfig {
        GptAttentionConfig {
            d_model: 16,
            n_heads: 4,
            attn_pdrop: 0.0,
            attn_impl,
            alibi,
            init_std: 0.02,
            resid_init_std: 0.01,
        }
    }

    fn causal_bias(batch: usize, n_heads: usize, seq: usize) -> Tensor<TestBackend, 4> {
        let device = Default::default();
        crate::attn_bias::AttnBiasBuilderConfig::new(n_heads, seq, false, 8.0)
            .init::<TestBackend>(&device)
            .unwrap()
            .build(batch, seq, None, None)
            .unwrap()
    }

    #[test]
    fn test_fused_attention_forward_shape() {
        let device = Default::default();
        let attn = config(AttnImpl::Fused, false).init::<TestBackend>(&device).unwrap();
        let x = Tensor::<TestBackend, 3>::zeros([2, 5, 16], &device);
        let output = attn.forward(x, causal_bias(2, 4, 5));
        assert_eq!(output.dims(), [2, 5, 16]);
    }

    #[test]
    fn test_builtin_attention_forward_shape() {
        let device = Default::default();
        let attn = config(AttnImpl::Builtin, false)
            .init::<TestBackend>(&device)
            .unwrap();
        let x = Tensor::<TestBackend, 3>::zeros([2, 5, 16], &device);
        let output = attn.forward(x, causal_bias(2, 4, 5));
        assert_eq!(output.dims(), [2, 5, 16]);
    }

    #[test]
    fn test_builtin_with_alibi_is_rejected() {
        let device = Default::default();
        let result = config(AttnImpl::Builtin, true).init::<TestBackend>(&device);
        assert!(matches!(
            result,
            Err(BurnCoreError::UnsupportedAttnImpl { .. })
        ));
    }

    #[test]
    fn test_indivisible_heads_is_rejected() {
        let device = Default::default();
        let mut cfg = config(AttnImpl::Fused, false);
        cfg.n_heads = 3;
        let result = cfg.init::<TestBackend>(&device);
        assert!(matches!(result, Err(BurnCoreError::InvalidConfig(_))));
    }

    #[test]
    fn test_fused_attention_output_is_finite_with_padding() {
        use burn::tensor::{Bool, Distribution, TensorData};

        let device = Default::default();
        let attn = config(AttnImpl::Fused, false).init::<TestBackend>(&device).unwrap();

        let padding = Tensor::<TestBackend, 2, Bool>::from_data(
            TensorData::new(vec![true, true, true, false], [1, 4]),
            &device,
        );
        let bias = crate::attn_bias::AttnBiasBuilderConfig::new(4, 4, false, 8.0)
            .init::<TestBackend>(&device)
            .unwrap()
            .build(1, 4, Some(padding), None)
            .unwrap();

        let x = Tensor::<TestBackend, 3>::random([1, 4, 16], Distribution::Default, &device);
        let output = attn.forward(x, bias);

        let values: Vec<f32> = output.into_data().to_vec().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }
}
