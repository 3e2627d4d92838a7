#![warn(
    missing_docs, // Предупреждать, если публичные элементы не документированы.
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used, // Предупреждать об использовании .unwrap()
    clippy::expect_used  // Предупреждать об использовании .expect()
)]
#![deny(
    unsafe_code,        // Запретить использование unsafe блоков.
    unused_mut,         // Запретить неиспользуемые изменяемые переменные.
    unused_imports,     // Запретить неиспользуемые импорты.
    unused_attributes   // Запретить неиспользуемые атрибуты.
)]

//! `utils_crate` предоставляет общие структуры данных, обработку ошибок
//! и распространенные утилиты для воркспейса языковой модели.
//!
//! Этот крейт спроектирован так, чтобы быть модульным, позволяя другим частям
//! проекта выборочно включать необходимую функциональность через систему фич (features).
//!
//! # Основные модули:
//!
//! - [`error`]: Определяет общий тип ошибки `UtilsError` для всего крейта.
//! - [`config`]: (активируется фичей `app_config_serde`) Предоставляет `AppConfig` для
//!   загрузки и управления конфигурацией тренировочного запуска из TOML-файлов.
//! - [`logger`]: (активируется фичей `logger_utils_feature`) Утилиты для
//!   инициализации системы логирования на базе `tracing`.
//!
//! # Использование фич (Features)
//!
//! Крейт использует фичи для управления зависимостями и включаемой функциональностью.
//! Например, чтобы использовать утилиты для логирования, необходимо включить фичу `logger_utils_feature`
//! в `Cargo.toml` вашего проекта:
//!
//! ```toml
//! # В Cargo.toml вашего проекта
//! # utils_crate = { path = "path/to/utils_crate", features = ["logger_utils_feature"] }
//! ```
//!
//! Фича `default` включает наиболее часто используемый набор утилит.

// --- Модуль для общих ошибок ---
pub mod error;
pub use error::UtilsError; // Реэкспорт для удобства использования. Тип ошибки UtilsError.

// --- Утилитарные модули (управляются фичами) ---

/// Модуль с утилитами для инициализации логирования.
///
/// Активируется фичей `logger_utils_feature`.
#[cfg(feature = "logger_utils_feature")]
pub mod logger;
#[cfg(feature = "logger_utils_feature")]
pub use logger::init_tracing_logger; // Реэкспорт.

/// Модуль для загрузки и управления конфигурацией приложения.
///
/// Активируется фичей `app_config_serde`.
#[cfg(feature = "app_config_serde")]
pub mod config;
#[cfg(feature = "app_config_serde")]
pub use config::AppConfig; // Реэкспорт.
