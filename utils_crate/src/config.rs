#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![deny(unsafe_code, unused_mut, unused_imports, unused_attributes)]

#[cfg(feature = "app_config_serde")]
use crate::error::UtilsError;
#[cfg(feature = "app_config_serde")]
use serde::Deserialize;
#[cfg(feature = "app_config_serde")]
use std::path::Path;
#[cfg(feature = "app_config_serde")]
use tracing::warn;

/// Глобальная конфигурация приложения (тренировочного запуска).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "app_config_serde", derive(Deserialize))]
pub struct AppConfig {
    /// Конфигурация, связанная с моделью.
    #[cfg_attr(feature = "app_config_serde", serde(default))]
    pub model_config: ModelConfigSub,

    /// Конфигурация тренировочного запуска.
    #[cfg_attr(feature = "app_config_serde", serde(default))]
    pub training_config: TrainingConfigSub,

    /// Конфигурация логирования.
    #[cfg_attr(feature = "app_config_serde", serde(default))]
    pub logging_config: LoggingConfigSub,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_config: ModelConfigSub::default(),
            training_config: TrainingConfigSub::default(),
            logging_config: LoggingConfigSub::default(),
        }
    }
}

/// Конфигурация, связанная с моделью (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "app_config_serde", derive(Deserialize))]
pub struct ModelConfigSub {
    /// Имя пресета гиперпараметров модели (например, "gpt-125m").
    #[cfg_attr(feature = "app_config_serde", serde(default = "default_model_preset_app"))]
    pub preset: String,
    /// Директория для сохранения чекпоинтов весов.
    #[cfg_attr(feature = "app_config_serde", serde(default = "default_checkpoint_dir_app"))]
    pub checkpoint_dir: String, // PathBuf не всегда хорошо десериализуется без доп. атрибутов
}

fn default_model_preset_app() -> String {
    "gpt-125m".to_string()
}
fn default_checkpoint_dir_app() -> String {
    "./.checkpoints".to_string()
}

impl Default for ModelConfigSub {
    fn default() -> Self {
        Self {
            preset: default_model_preset_app(),
            checkpoint_dir: default_checkpoint_dir_app(),
        }
    }
}

/// Конфигурация тренировочного запуска (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "app_config_serde", derive(Deserialize))]
pub struct TrainingConfigSub {
    /// Размер батча.
    #[cfg_attr(feature = "app_config_serde", serde(default = "default_batch_size_app"))]
    pub batch_size: usize,
    /// Скорость обучения.
    #[cfg_attr(feature = "app_config_serde", serde(default = "default_learning_rate_app"))]
    pub learning_rate: f64,
    /// Максимальное количество шагов обучения.
    #[cfg_attr(feature = "app_config_serde", serde(default = "default_max_steps_app"))]
    pub max_steps: usize,
    /// Сид для воспроизводимости.
    #[cfg_attr(feature = "app_config_serde", serde(default = "default_seed_app"))]
    pub seed: u64,
}

fn default_batch_size_app() -> usize {
    8
}
fn default_learning_rate_app() -> f64 {
    3e-4
}
fn default_max_steps_app() -> usize {
    1000
}
fn default_seed_app() -> u64 {
    42
}

impl Default for TrainingConfigSub {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size_app(),
            learning_rate: default_learning_rate_app(),
            max_steps: default_max_steps_app(),
            seed: default_seed_app(),
        }
    }
}

/// Специфичная конфигурация логирования (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "app_config_serde", derive(Deserialize))]
pub struct LoggingConfigSub {
    /// Уровень логирования.
    #[cfg_attr(feature = "app_config_serde", serde(default = "default_log_level_app"))]
    pub level: String,
    /// Директория для файлов логов (опционально).
    #[cfg_attr(feature = "app_config_serde", serde(default))]
    pub log_dir: Option<String>,
}

fn default_log_level_app() -> String {
    "info".to_string()
}

impl Default for LoggingConfigSub {
    fn default() -> Self {
        Self {
            level: default_log_level_app(),
            log_dir: None,
        }
    }
}

#[cfg(feature = "app_config_serde")]
impl AppConfig {
    /// Загружает конфигурацию приложения из TOML файла.
    /// Если файл не найден, возвращается конфигурация по умолчанию.
    ///
    /// # Arguments
    /// * `file_path` - Путь к TOML файлу конфигурации.
    ///
    /// # Errors
    /// Возвращает `UtilsError::Io` при ошибках чтения файла или `UtilsError::Config`
    /// при ошибках парсинга TOML.
    pub fn load_from_toml(file_path: &Path) -> Result<Self, UtilsError> {
        if !file_path.exists() {
            warn!(
                "AppConfig file not found at {:?}, using default configuration.",
                file_path
            );
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(file_path)?;
        toml::from_str(&config_str).map_err(|e| {
            UtilsError::Config(format!(
                "Failed to parse AppConfig from TOML at {:?}: {}",
                file_path, e
            ))
        })
    }
}
