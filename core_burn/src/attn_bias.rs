// core_burn/src/attn_bias.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Построение аддитивного смещения внимания (attention bias).
//!
//! Смещение прибавляется к сырым скорам внимания до softmax и кодирует,
//! какие пары токенов могут "видеть" друг друга (через `-inf` для запрещенных пар),
//! а также опциональный позиционный штраф ALiBi, затухающий с расстоянием.
//! Шаблоны смещения предвычисляются один раз на `max_seq_len` при инициализации.

use burn::{
    module::Module, // Для #[derive(Module)]
    nn::attention::generate_autoregressive_mask,
    tensor::{backend::Backend, Bool, Tensor}, // Основные типы тензоров
};

// Импортируем наш кастомный тип ошибки для возврата в случае проблем с конфигурацией.
use crate::BurnCoreError;

/// Вычисляет полный ALiBi-тензор смещения формы `[1, n_heads, seq_len, seq_len]`.
///
/// Для головы `h` (нумерация с 1) и пары позиций `(i, j)`:
/// `bias[h, i, j] = -|i - j| * 2^-(alibi_bias_max * h / n_heads)`.
///
/// # Аргументы
/// * `n_heads`: Количество голов внимания.
/// * `seq_len`: Длина последовательности, для которой строится смещение.
/// * `alibi_bias_max`: Максимальный показатель затухания (обычно 8).
/// * `device`: Устройство Burn, на котором будет создан тензор.
#[must_use]
pub fn alibi_bias<B: Backend>(
    n_heads: usize,
    seq_len: usize,
    alibi_bias_max: f64,
    device: &B::Device,
) -> Tensor<B, 4> {
    // Позиции ключей: [1 - seq_len, ..., 0].
    let positions: Tensor<B, 1> = Tensor::arange(1 - seq_len as i64..1, device).float();

    // Матрица относительных расстояний -|i - j| формы [1, 1, seq_len, seq_len]:
    // внешняя разность позиций ключей и позиций запросов.
    let relative = positions.clone().reshape([1, 1, 1, seq_len])
        - positions.reshape([1, 1, seq_len, 1]);
    let relative = relative.abs().neg();

    // Наклоны (slopes) по головам: 2^-(alibi_bias_max * h / n_heads), h = 1..=n_heads.
    let exponents: Tensor<B, 1> = Tensor::arange(1..n_heads as i64 + 1, device)
        .float()
        .mul_scalar(alibi_bias_max / n_heads as f64);
    let slopes = exponents
        .mul_scalar(-core::f64::consts::LN_2)
        .exp() // 2^-m = exp(-m * ln 2)
        .reshape([1, n_heads, 1, 1]);

    // Бродкастинг [1, 1, S, S] * [1, H, 1, 1] -> [1, H, S, S].
    relative * slopes
}

/// Конфигурация для [`AttnBiasBuilder`].
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct AttnBiasBuilderConfig {
    /// Количество голов внимания.
    pub n_heads: usize,
    /// Максимальная длина последовательности (размер предвычисленных шаблонов).
    pub max_seq_len: usize,
    /// Использовать ли позиционное смещение ALiBi.
    pub alibi: bool,
    /// Максимальный показатель затухания ALiBi.
    pub alibi_bias_max: f64,
}

impl AttnBiasBuilderConfig {
    /// Создает новую конфигурацию построителя смещения.
    pub const fn new(n_heads: usize, max_seq_len: usize, alibi: bool, alibi_bias_max: f64) -> Self {
        Self {
            n_heads,
            max_seq_len,
            alibi,
            alibi_bias_max,
        }
    }

    /// Создает [`AttnBiasBuilder`] с предвычисленными шаблонами.
    ///
    /// # Ошибки
    /// Возвращает `BurnCoreError::InvalidConfig`, если `n_heads` или `max_seq_len` равны нулю.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<AttnBiasBuilder<B>, BurnCoreError> {
        if self.n_heads == 0 || self.max_seq_len == 0 {
            return Err(BurnCoreError::InvalidConfig(format!(
                "n_heads ({}) и max_seq_len ({}) должны быть больше нуля.",
                self.n_heads, self.max_seq_len
            )));
        }

        // Шаблон смещения: ALiBi-штраф либо нули той же формы [1, H, S, S].
        let bias_template = if self.alibi {
            alibi_bias::<B>(self.n_heads, self.max_seq_len, self.alibi_bias_max, device)
        } else {
            Tensor::zeros(
                [1, self.n_heads, self.max_seq_len, self.max_seq_len],
                device,
            )
        };

        // Каузальный шаблон как float 0/1: позиция видит себя и предыдущие.
        // generate_autoregressive_mask дает true для ЗАПРЕЩЕННЫХ (будущих) пар.
        let causal_template = generate_autoregressive_mask::<B>(1, self.max_seq_len, device)
            .bool_not()
            .float()
            .reshape([1, 1, self.max_seq_len, self.max_seq_len]);

        Ok(AttnBiasBuilder {
            bias_template,
            causal_template,
            n_heads: self.n_heads,
            max_seq_len: self.max_seq_len,
        })
    }
}

/// Построитель аддитивного смещения внимания.
///
/// Хранит два предвычисленных буфера (ALiBi/нулевой шаблон и каузальный шаблон)
/// и комбинирует их с масками паддинга и двунаправленных сегментов запроса.
#[derive(Debug, Module)]
pub struct AttnBiasBuilder<B: Backend> {
    /// Шаблон смещения: `[1, n_heads, max_seq_len, max_seq_len]`.
    bias_template: Tensor<B, 4>,
    /// Каузальный шаблон разрешенных пар (float 0/1): `[1, 1, max_seq_len, max_seq_len]`.
    causal_template: Tensor<B, 4>,
    /// Количество голов внимания.
    n_heads: usize,
    /// Максимальная длина последовательности.
    max_seq_len: usize,
}

impl<B: Backend> AttnBiasBuilder<B> {
    /// Максимальная длина последовательности, поддерживаемая шаблонами.
    #[must_use]
    pub const fn max_seq_len(&self) -> usize {
        self.max_seq_len
    }

    /// Строит аддитивное смещение внимания для текущего батча.
    ///
    /// # Аргументы
    /// * `batch_size`: Размер батча.
    /// * `seq_len`: Длина последовательности (не больше `max_seq_len`).
    /// * `attention_mask`: Опциональная маска паддинга `[batch, seq_len]`
    ///   (`true` = реальный токен, `false` = паддинг).
    /// * `bidirectional_mask`: Опциональная маска сегмента запроса `[batch, seq_len]`
    ///   (`true` = позиция входит в двунаправленный префикс и видна всем).
    ///
    /// # Возвращает
    /// Тензор смещения `[1 | batch, n_heads, seq_len, seq_len]`: `0` или ALiBi-штраф
    /// для разрешенных пар, `-inf` для запрещенных. Первая размерность равна `1`,
    /// если ни одна по-батчевая маска не передана (смещение бродкастится).
    ///
    /// # Ошибки
    /// Возвращает `IncompatibleShape`, если маска имеет форму, отличную от
    /// `[batch, seq_len]`, и `InvalidConfig`, если `seq_len` превышает `max_seq_len`.
    pub fn build(
        &self,
        batch_size: usize,
        seq_len: usize,
        attention_mask: Option<Tensor<B, 2, Bool>>,
        bidirectional_mask: Option<Tensor<B, 2, Bool>>,
    ) -> Result<Tensor<B, 4>, BurnCoreError> {
        if seq_len > self.max_seq_len {
            return Err(BurnCoreError::InvalidConfig(format!(
                "seq_len ({}) превышает max_seq_len ({}) предвычисленных шаблонов.",
                seq_len, self.max_seq_len
            )));
        }

        let bias = self
            .bias_template
            .clone()
            .slice([0..1, 0..self.n_heads, 0..seq_len, 0..seq_len]);

        // Каузальная видимость; ИЛИ с двунаправленным сегментом, если он задан.
        let mut allowed = self
            .causal_template
            .clone()
            .slice([0..1, 0..1, 0..seq_len, 0..seq_len]);

        if let Some(bidirectional) = bidirectional_mask {
            Self::check_mask_shape(&bidirectional, batch_size, seq_len, "bidirectional_mask")?;
            // [B, S] -> [B, 1, 1, S]: позиция j видна всем запросам i, если она в сегменте.
            let segment = bidirectional.float().reshape([batch_size, 1, 1, seq_len]);
            // Поэлементное ИЛИ над float 0/1.
            allowed = (allowed + segment).clamp(0.0, 1.0);
        }

        if let Some(padding) = attention_mask {
            Self::check_mask_shape(&padding, batch_size, seq_len, "attention_mask")?;
            // [B, S] -> [B, 1, 1, S]: паддинг-токены не видны никому. Поэлементное И.
            let keep = padding.float().reshape([batch_size, 1, 1, seq_len]);
            allowed = allowed * keep;
        }

        // Приводим смещение и маску к общей форме и заполняем запрещенные пары -inf.
        let leading = allowed.dims()[0]; // 1 либо batch_size
        let bias = bias.expand([leading, self.n_heads, seq_len, seq_len]);
        let allowed = allowed.expand([leading, self.n_heads, seq_len, seq_len]);

        Ok(bias.mask_fill(allowed.equal_elem(0.0), f32::NEG_INFINITY))
    }

    fn check_mask_shape(
        mask: &Tensor<B, 2, Bool>,
        batch_size: usize,
        seq_len: usize,
        name: &str,
    ) -> Result<(), BurnCoreError> {
        let dims = mask.dims();
        if dims != [batch_size, seq_len] {
            return Err(BurnCoreError::IncompatibleShape(format!(
                "{name}: ожидалась форма [{batch_size}, {seq_len}], получена {dims:?}."
            )));
        }
        Ok(())
    }
}
