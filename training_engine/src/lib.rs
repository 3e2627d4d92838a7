// training_engine/src/lib.rs

// Включаем строгие правила линтинга для всего крейта.
#![warn(
    missing_docs, // Предупреждать об отсутствующей документации для публичных элементов.
    clippy::all, // Все стандартные проверки Clippy.
    clippy::pedantic, // Более строгие ("педантичные") проверки Clippy.
    clippy::nursery // Экспериментальные проверки Clippy (могут быть нестабильны).
)]
// Запрещаем использование небезопасных конструкций и потенциально проблемных методов.
#![deny(
    unsafe_code, // Запрет `unsafe` блоков без явного `allow`.
    clippy::unwrap_used, // Запрет использования `.unwrap()`.
    clippy::expect_used // Запрет использования `.expect()`.
)]

//! # `training_engine`
//!
//! Движок обучения языковой модели на базе [`core_burn`]. Оборачивает
//! GPT-модель в интерфейсы `TrainStep`/`ValidStep` фреймворка Burn,
//! реализует вывод целевых меток и кросс-энтропийный лосс следующего токена
//! с игнорируемой меткой, а также накопительные метрики (кросс-энтропия,
//! перплексия), взвешенные по числу токенов.
//!
//! ## Структура
//!
//! - `batch`: Батч языкового моделирования ([`LmBatch`]).
//! - `lm`: Обертка модели ([`GptLanguageModel`]) с шагами обучения/валидации.
//! - `metrics`: Накопительные метрики ([`LanguageCrossEntropy`], [`Perplexity`]).
//! - `error`: Кастомные типы ошибок ([`TrainingEngineError`]).

// Объявляем публичные модули, входящие в состав крейта.
pub mod batch;
pub mod error;
pub mod lm;
pub mod metrics;

// Реэкспортируем наиболее важные элементы для удобства потребителей крейта.

// Ошибки
pub use error::TrainingEngineError;

// Батчи
pub use batch::{LmBatch, IGNORE_LABEL};

// Языковая модель и ее рекорд
pub use lm::{GptLanguageModel, GptLanguageModelRecord};

// Метрики
pub use metrics::{LanguageCrossEntropy, Perplexity};
