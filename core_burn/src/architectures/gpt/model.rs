// core_burn/src/architectures/gpt/model.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Декодерная GPT-модель: эмбеддинги, стек pre-norm блоков, финальная нормализация
//! и проекция в словарь через связанные веса (weight tying) входного эмбеддинга.

use burn::{
    module::Module,
    nn::{
        Dropout, DropoutConfig, Embedding, EmbeddingConfig, Initializer, LayerNorm,
        LayerNormConfig,
    },
    tensor::{backend::Backend, Bool, Int, Tensor},
};

use crate::{
    attn_bias::{AttnBiasBuilder, AttnBiasBuilderConfig},
    BurnCoreError,
};

use super::attention::{AttnImpl, GptAttention, GptAttentionConfig};
use super::ffn::{GptFeedForward, GptFeedForwardConfig};

/// Конфигурация для [`GptModel`].
///
/// Поля с нетривиальными значениями по умолчанию снабжены serde-атрибутами,
/// чтобы конфигурация могла быть загружена из частичного JSON/TOML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GptModelConfig {
    /// Размер словаря токенизатора.
    pub vocab_size: usize,
    /// Максимальная длина последовательности.
    pub max_seq_len: usize,
    /// Размерность скрытого слоя.
    pub d_model: usize,
    /// Количество декодерных блоков.
    pub n_layers: usize,
    /// Количество голов внимания.
    pub n_heads: usize,
    /// Множитель расширения MLP.
    #[serde(default = "default_mlp_ratio")]
    pub mlp_ratio: usize,
    /// Реализация внимания.
    #[serde(default = "default_attn_impl")]
    pub attn_impl: AttnImpl,
    /// Использовать ли позиционное смещение ALiBi вместо обучаемых
    /// позиционных эмбеддингов.
    #[serde(default)]
    pub alibi: bool,
    /// Максимальный показатель затухания ALiBi.
    #[serde(default = "default_alibi_bias_max")]
    pub alibi_bias_max: f64,
    /// Доля градиента, проходящего через эмбеддинги (1.0 = весь градиент).
    #[serde(default = "default_embedding_fraction")]
    pub embedding_fraction: f64,
    /// Дропаут эмбеддингов.
    #[serde(default)]
    pub emb_pdrop: f64,
    /// Дропаут остаточных ветвей.
    #[serde(default)]
    pub resid_pdrop: f64,
    /// Дропаут весов внимания.
    #[serde(default)]
    pub attn_pdrop: f64,
    /// Стандартное отклонение инициализации весов.
    #[serde(default = "default_init_std")]
    pub init_std: f64,
}

const fn default_mlp_ratio() -> usize {
    4
}

const fn default_attn_impl() -> AttnImpl {
    AttnImpl::Fused
}

const fn default_alibi_bias_max() -> f64 {
    8.0
}

const fn default_embedding_fraction() -> f64 {
    1.0
}

const fn default_init_std() -> f64 {
    0.02
}

impl GptModelConfig {
    /// Создает конфигурацию с обязательными размерами и значениями по умолчанию
    /// для остальных полей.
    #[must_use]
    pub const fn new(
        vocab_size: usize,
        max_seq_len: usize,
        d_model: usize,
        n_layers: usize,
        n_heads: usize,
    ) -> Self {
        Self {
            vocab_size,
            max_seq_len,
            d_model,
            n_layers,
            n_heads,
            mlp_ratio: default_mlp_ratio(),
            attn_impl: default_attn_impl(),
            alibi: false,
            alibi_bias_max: default_alibi_bias_max(),
            embedding_fraction: default_embedding_fraction(),
            emb_pdrop: 0.0,
            resid_pdrop: 0.0,
            attn_pdrop: 0.0,
            init_std: default_init_std(),
        }
    }

    /// Проверяет согласованность конфигурации.
    ///
    /// # Ошибки
    /// Возвращает `InvalidConfig` при нулевых размерах, некратности
    /// `d_model` и `n_heads` или `embedding_fraction` вне диапазона `(0, 1]`.
    pub fn validate(&self) -> Result<(), BurnCoreError> {
        if self.vocab_size == 0
            || self.max_seq_len == 0
            || self.d_model == 0
            || self.n_layers == 0
            || self.n_heads == 0
        {
            return Err(BurnCoreError::InvalidConfig(
                "vocab_size, max_seq_len, d_model, n_layers и n_heads должны быть больше нуля."
                    .to_string(),
            ));
        }
        if self.d_model % self.n_heads != 0 {
            return Err(BurnCoreError::InvalidConfig(format!(
                "d_model ({}) должно быть кратно n_heads ({}).",
                self.d_model, self.n_heads
            )));
        }
        if self.embedding_fraction <= 0.0 || self.embedding_fraction > 1.0 {
            return Err(BurnCoreError::InvalidConfig(format!(
                "embedding_fraction ({}) должно лежать в диапазоне (0, 1].",
                self.embedding_fraction
            )));
        }
        Ok(())
    }

    /// Создает новый экземпляр [`GptModel`] на указанном устройстве.
    ///
    /// # Ошибки
    /// Возвращает ошибку валидации конфигурации либо `UnsupportedAttnImpl`,
    /// если выбранная реализация внимания несовместима с ALiBi.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<GptModel<B>, BurnCoreError> {
        self.validate()?;

        tracing::info!(
            vocab_size = self.vocab_size,
            max_seq_len = self.max_seq_len,
            d_model = self.d_model,
            n_layers = self.n_layers,
            n_heads = self.n_heads,
            alibi = self.alibi,
            attn_impl = %self.attn_impl,
            "Инициализация GPT-модели"
        );

        // Остаточные проекции инициализируются уменьшенным стандартным
        // отклонением init_std / sqrt(2 * n_layers).
        let resid_init_std = self.init_std / (2.0 * self.n_layers as f64).sqrt();
        let embedding_initializer = Initializer::Normal {
            mean: 0.0,
            std: self.init_std,
        };

        let wte = EmbeddingConfig::new(self.vocab_size, self.d_model)
            .with_initializer(embedding_initializer.clone())
            .init(device);

        // При ALiBi обучаемые позиционные эмбеддинги не нужны:
        // позиционная информация кодируется смещением внимания.
        let wpe = if self.alibi {
            None
        } else {
            Some(
                EmbeddingConfig::new(self.max_seq_len, self.d_model)
                    .with_initializer(embedding_initializer)
                    .init(device),
            )
        };

        let block_config = GptDecoderBlockConfig {
            d_model: self.d_model,
            n_heads: self.n_heads,
            mlp_ratio: self.mlp_ratio,
            attn_impl: self.attn_impl,
            alibi: self.alibi,
            attn_pdrop: self.attn_pdrop,
            resid_pdrop: self.resid_pdrop,
            init_std: self.init_std,
            resid_init_std,
        };
        let blocks = (0..self.n_layers)
            .map(|_| block_config.init(device))
            .collect::<Result<Vec<_>, _>>()?;

        let bias_builder =
            AttnBiasBuilderConfig::new(self.n_heads, self.max_seq_len, self.alibi, self.alibi_bias_max)
                .init(device)?;

        Ok(GptModel {
            wte,
            wpe,
            emb_dropout: DropoutConfig::new(self.emb_pdrop).init(),
            blocks,
            ln_f: LayerNormConfig::new(self.d_model).init(device),
            bias_builder,
            embedding_fraction: self.embedding_fraction,
            vocab_size: self.vocab_size,
            max_seq_len: self.max_seq_len,
            d_model: self.d_model,
        })
    }
}

/// Конфигурация одного декодерного блока.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GptDecoderBlockConfig {
    /// Размерность скрытого слоя.
    pub d_model: usize,
    /// Количество голов внимания.
    pub n_heads: usize,
    /// Множитель расширения MLP.
    pub mlp_ratio: usize,
    /// Реализация внимания.
    pub attn_impl: AttnImpl,
    /// Используется ли ALiBi.
    pub alibi: bool,
    /// Дропаут весов внимания.
    pub attn_pdrop: f64,
    /// Дропаут остаточных ветвей.
    pub resid_pdrop: f64,
    /// Стандартное отклонение инициализации.
    pub init_std: f64,
    /// Стандартное отклонение инициализации остаточных проекций.
    pub resid_init_std: f64,
}

impl GptDecoderBlockConfig {
    /// Создает новый экземпляр [`GptDecoderBlock`].
    ///
    /// # Ошибки
    /// Пробрасывает ошибки инициализации внимания и MLP.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<GptDecoderBlock<B>, BurnCoreError> {
        let attn = GptAttentionConfig {
            d_model: self.d_model,
            n_heads: self.n_heads,
            attn_pdrop: self.attn_pdrop,
            attn_impl: self.attn_impl,
            alibi: self.alibi,
            init_std: self.init_std,
            resid_init_std: self.resid_init_std,
        }
        .init(device)?;

        let ffn = GptFeedForwardConfig {
            d_model: self.d_model,
            mlp_ratio: self.mlp_ratio,
            init_std: self.init_std,
            resid_init_std: self.resid_init_std,
        }
        .init(device)?;

        Ok(GptDecoderBlock {
            ln_1: LayerNormConfig::new(self.d_model).init(device),
            attn,
            ln_2: LayerNormConfig::new(self.d_model).init(device),
            ffn,
            resid_attn_dropout: DropoutConfig::new(self.resid_pdrop).init(),
            resid_mlp_dropout: DropoutConfig::new(self.resid_pdrop).init(),
        })
    }
}

/// Один декодерный блок в pre-norm компоновке:
/// `x + dropout(attn(ln_1(x)))`, затем `x + dropout(mlp(ln_2(x)))`.
#[derive(Debug, Module)]
pub struct GptDecoderBlock<B: Backend> {
    /// Нормализация перед вниманием.
    ln_1: LayerNorm<B>,
    /// Слой внимания.
    attn: GptAttention<B>,
    /// Нормализация перед MLP.
    ln_2: LayerNorm<B>,
    /// Feed-Forward Network.
    ffn: GptFeedForward<B>,
    /// Дропаут остаточной ветви внимания.
    resid_attn_dropout: Dropout,
    /// Дропаут остаточной ветви MLP.
    resid_mlp_dropout: Dropout,
}

impl<B: Backend> GptDecoderBlock<B> {
    /// Прямой проход блока.
    ///
    /// # Аргументы
    /// * `hidden_states`: Тензор `[batch, seq_len, d_model]`.
    /// * `attn_bias`: Аддитивное смещение внимания `[1 | batch, n_heads, seq_len, seq_len]`.
    pub fn forward(&self, hidden_states: Tensor<B, 3>, attn_bias: Tensor<B, 4>) -> Tensor<B, 3> {
        let attn_out = self.attn.forward(self.ln_1.forward(hidden_states.clone()), attn_bias);
        let hidden_states = hidden_states + self.resid_attn_dropout.forward(attn_out);

        let mlp_out = self.ffn.forward(self.ln_2.forward(hidden_states.clone()));
        hidden_states + self.resid_mlp_dropout.forward(mlp_out)
    }
}

/// Декодерная GPT-модель.
///
/// Выходная проекция в словарь не имеет собственных весов: логиты вычисляются
/// умножением скрытых состояний на транспонированную матрицу входного
/// эмбеддинга (weight tying).
#[derive(Debug, Module)]
pub struct GptModel<B: Backend> {
    /// Эмбеддинг токенов (и одновременно выходная проекция).
    wte: Embedding<B>,
    /// Обучаемые позиционные эмбеддинги (отсутствуют при ALiBi).
    wpe: Option<Embedding<B>>,
    /// Дропаут эмбеддингов.
    emb_dropout: Dropout,
    /// Стек декодерных блоков.
    blocks: Vec<GptDecoderBlock<B>>,
    /// Финальная нормализация.
    ln_f: LayerNorm<B>,
    /// Построитель смещения внимания с предвычисленными шаблонами.
    bias_builder: AttnBiasBuilder<B>,
    /// Доля градиента, проходящего через эмбеддинги.
    embedding_fraction: f64,
    /// Размер словаря.
    vocab_size: usize,
    /// Максимальная длина последовательности.
    max_seq_len: usize,
    /// Размерность скрытого слоя.
    d_model: usize,
}

impl<B: Backend> GptModel<B> {
    /// Размер словаря модели.
    #[must_use]
    pub const fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Максимальная длина последовательности.
    #[must_use]
    pub const fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    /// Прямой проход до финальной нормализации, без проекции в словарь.
    ///
    /// # Аргументы
    /// * `input_ids`: Идентификаторы токенов `[batch, seq_len]`.
    /// * `attention_mask`: Опциональная маска паддинга `[batch, seq_len]`
    ///   (`true` = реальный токен).
    /// * `bidirectional_mask`: Опциональная маска двунаправленного префикса
    ///   `[batch, seq_len]`.
    ///
    /// # Возвращает
    /// Скрытые состояния `[batch, seq_len, d_model]`.
    ///
    /// # Ошибки
    /// Возвращает `InvalidConfig`, если `seq_len` превышает `max_seq_len`,
    /// и `IncompatibleShape`, если маска не соответствует форме батча.
    pub fn forward_hidden(
        &self,
        input_ids: Tensor<B, 2, Int>,
        attention_mask: Option<Tensor<B, 2, Bool>>,
        bidirectional_mask: Option<Tensor<B, 2, Bool>>,
    ) -> Result<Tensor<B, 3>, BurnCoreError> {
        let [batch_size, seq_len] = input_ids.dims();
        if seq_len > self.max_seq_len {
            return Err(BurnCoreError::InvalidConfig(format!(
                "Длина последовательности ({seq_len}) превышает max_seq_len ({}).",
                self.max_seq_len
            )));
        }
        let device = input_ids.device();

        let mut hidden = self.wte.forward(input_ids);
        if let Some(wpe) = &self.wpe {
            let position_ids = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
                .reshape([1, seq_len])
                .repeat_dim(0, batch_size);
            hidden = hidden + wpe.forward(position_ids);
        }

        // Частичное отсоединение градиента эмбеддингов:
        // x * f + detach(x) * (1 - f). При f = 1 путь вырождается в identity.
        if self.embedding_fraction < 1.0 {
            hidden = hidden.clone().mul_scalar(self.embedding_fraction)
                + hidden.detach().mul_scalar(1.0 - self.embedding_fraction);
        }
        let mut hidden = self.emb_dropout.forward(hidden);

        // Смещение строится один раз на батч и разделяется всеми блоками.
        let attn_bias =
            self.bias_builder
                .build(batch_size, seq_len, attention_mask, bidirectional_mask)?;

        for block in &self.blocks {
            hidden = block.forward(hidden, attn_bias.clone());
        }

        Ok(self.ln_f.forward(hidden))
    }

    /// Проецирует скрытые состояния в логиты словаря через связанные веса.
    ///
    /// # Аргументы
    /// * `hidden`: Скрытые состояния `[rows, d_model]` (батч и позиции сплющены).
    ///
    /// # Возвращает
    /// Логиты `[rows, vocab_size]`.
    #[must_use]
    pub fn project(&self, hidden: Tensor<B, 2>) -> Tensor<B, 2> {
        hidden.matmul(self.wte.weight.val().transpose())
    }

    /// Полный прямой проход: от идентификаторов токенов до логитов словаря.
    ///
    /// # Возвращает
    /// Логиты `[batch, seq_len, vocab_size]`.
    ///
    /// # Ошибки
    /// См. [`Self::forward_hidden`].
    pub fn forward(
        &self,
        input_ids: Tensor<B, 2, Int>,
        attention_mask: Option<Tensor<B, 2, Bool>>,
        bidirectional_mask: Option<Tensor<B, 2, Bool>>,
    ) -> Result<Tensor<B, 3>, BurnCoreError> {
        let hidden = self.forward_hidden(input_ids, attention_mask, bidirectional_mask)?;
        let [batch_size, seq_len, d_model] = hidden.dims();
        let logits = self.project(hidden.reshape([batch_size * seq_len, d_model]));
        Ok(logits.reshape([batch_size, seq_len, self.vocab_size]))
    }

    /// Оценка числа FLOPs одного прямого прохода на полной длине
    /// последовательности.
    ///
    /// Состоит из двух слагаемых: умножения на параметры (число параметров
    /// приблизительно равно числу MAC-операций сети, каждая MAC стоит 2 FLOPs)
    /// и квадратичной по длине стоимости матриц внимания
    /// (`A = Q*K^T` и `out = A*V`, по 2 FLOPs на MAC).
    #[must_use]
    pub fn num_fwd_flops(&self) -> usize {
        let n_params = self.num_params();
        let params_flops_per_seq = 2 * n_params * self.max_seq_len;
        let attn_flops_per_seq =
            self.blocks.len() * 2 * 2 * self.d_model * self.max_seq_len * self.max_seq_len;
        params_flops_per_seq + attn_flops_per_seq
    }
}
