// training_engine/src/error.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Определяет кастомные типы ошибок для крейта `training_engine`.

use thiserror::Error;

/// Перечисление возможных ошибок движка обучения.
#[derive(Error, Debug)]
pub enum TrainingEngineError {
    /// Батч не пригоден для вычисления лосса (например, все целевые метки
    /// помечены как игнорируемые).
    #[error("Некорректный батч: {0}")]
    InvalidBatch(String),

    /// Ошибка из ядра моделей `core_burn`.
    #[error("Ошибка ядра моделей: {0}")]
    Model(#[from] core_burn::BurnCoreError),

    /// Ошибка из вспомогательного крейта `utils_crate`.
    #[cfg(feature = "with_utils_crate")]
    #[error("Ошибка утилит: {0}")]
    Utils(#[from] utils_crate::UtilsError),

    /// Общая ошибка движка обучения.
    #[error("Ошибка движка обучения: {0}")]
    Generic(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_batch_display() {
        let err = TrainingEngineError::InvalidBatch("нет целевых токенов".to_string());
        assert_eq!(err.to_string(), "Некорректный батч: нет целевых токенов");
    }

    #[test]
    fn test_model_error_conversion() {
        let core_err = core_burn::BurnCoreError::InvalidConfig("n_heads = 0".to_string());
        let err: TrainingEngineError = core_err.into();
        assert!(matches!(err, TrainingEngineError::Model(_)));
    }
}
