// core_burn/src/error.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

// Условная компиляция: если активирована фича `with_utils_crate`,
// тогда импортируем и используем ошибку из `utils_crate`.
#[cfg(feature = "with_utils_crate")]
use utils_crate::error::UtilsError;

/// Перечисление всех возможных ошибок, которые могут возникнуть в крейте `core_burn`.
///
/// Этот `enum` агрегирует как специфичные ошибки этого крейта, так и ошибки
/// из зависимостей (например, из `utils_crate`), предоставляя единый
/// тип ошибки для удобства обработки вызывающим кодом.
#[derive(thiserror::Error, Debug)] // Используем `thiserror` для автоматической генерации трейтов Error и Display.
pub enum BurnCoreError {
    /// Ошибка, связанная с некорректной конфигурацией модели или ее компонентов.
    /// Например, неверные размерности, несовместимые параметры.
    #[error("Некорректная конфигурация: {0}")]
    InvalidConfig(String),

    /// Ошибка, указывающая на несовместимые размеры тензоров при операциях.
    /// Например, маска внимания с формой, отличной от `[batch, seq_len]`.
    #[error("Несовместимые размеры или форма тензора: {0}")]
    IncompatibleShape(String),

    /// Запрошенная комбинация "реализация внимания + схема позиционного смещения"
    /// не поддерживается (например, встроенный примитив Burn не принимает
    /// вещественный ALiBi-бонус, только булеву маску).
    #[error("Реализация внимания `{attn_impl}` не поддерживает: {reason}")]
    UnsupportedAttnImpl {
        /// Имя выбранной реализации внимания.
        attn_impl: String,
        /// Причина несовместимости.
        reason: String,
    },

    /// Ошибка, возникшая во вспомогательном крейте `utils_crate`.
    /// Этот вариант доступен только если активирована фича `with_utils_crate`.
    #[cfg(feature = "with_utils_crate")]
    #[error("Ошибка из utils_crate: {0}")]
    Utils(#[from] UtilsError),

    /// Общая или неуточненная ошибка в `core_burn`.
    /// Следует использовать с осторожностью, предпочитая более специфичные варианты ошибок.
    #[error("Общая ошибка Core Burn: {0}")]
    Generic(String),
}
