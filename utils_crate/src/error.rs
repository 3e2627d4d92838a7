#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![deny(unsafe_code, unused_mut, unused_imports, unused_attributes)]

use thiserror::Error;

/// Общий тип ошибки для утилит `utils_crate` и потенциально для всего воркспейса.
///
/// Этот enum агрегирует различные типы ошибок, которые могут возникнуть
/// в утилитарных функциях, предоставляя стандартизированный способ их обработки.
#[derive(Error, Debug)]
pub enum UtilsError {
    /// Ошибка ввода-вывода (I/O).
    ///
    /// Содержит исходную ошибку `std::io::Error` и опционально путь к файлу/директории,
    /// с которым возникла проблема.
    #[error("Ошибка ввода-вывода: {source}")]
    Io {
        /// Исходная ошибка I/O.
        source: std::io::Error,
        /// Опциональный путь, связанный с ошибкой I/O.
        path: Option<String>,
    },

    /// Ошибка десериализации (например, из TOML).
    ///
    /// Возникает, когда не удается преобразовать строковое представление данных
    /// (например, из файла конфигурации) в структуру данных.
    /// Активируется фичей `app_config_serde`.
    #[cfg(feature = "app_config_serde")]
    #[error("Ошибка десериализации: {0}")]
    Deserialization(String),

    /// Ошибка, связанная с конфигурацией приложения.
    ///
    /// Например, неверный формат файла конфигурации или отсутствующие обязательные поля.
    #[error("Ошибка конфигурации: {0}")]
    Config(String),

    /// Ошибка, указывающая на то, что в утилитарную функцию был передан неверный параметр.
    #[error("Неверный параметр: {0}")]
    InvalidParameter(String),

    /// Ошибка, указывающая, что запрошенная функция или операция не поддерживается.
    #[error("Операция или функция не поддерживается: {0}")]
    NotSupported(String),

    /// Ошибка, указывающая, что внешний ресурс не был найден.
    ///
    /// Например, попытка загрузить конфигурацию, которой нет по указанному пути.
    #[error("Ресурс не найден: {0}")]
    ResourceNotFound(String),

    /// Общая ошибка утилиты для случаев, не покрытых другими вариантами.
    ///
    /// Используется, когда ни один из более специфичных вариантов ошибки не подходит.
    #[error("Произошла общая ошибка утилиты: {0}")]
    Generic(String),
}

/// Конвертация из `std::io::Error` в `UtilsError::Io` (без указания пути).
impl From<std::io::Error> for UtilsError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }
}

/// Конвертация из `toml::de::Error` (ошибка десериализации TOML) в `UtilsError::Deserialization`.
#[cfg(feature = "app_config_serde")]
impl From<toml::de::Error> for UtilsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Deserialization(format!("Ошибка десериализации TOML: {err}"))
    }
}

impl UtilsError {
    /// Вспомогательный конструктор для создания `UtilsError::Io` с указанием пути.
    ///
    /// # Аргументы
    ///
    /// * `source` - Исходная ошибка `std::io::Error`.
    /// * `path` - Строка или любой тип, который можно преобразовать в `String`, представляющий путь.
    pub fn io_with_path(source: std::io::Error, path: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }
}
