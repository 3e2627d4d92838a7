// core_burn/src/lib.rs

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

//! # `core_burn`
//!
//! Этот крейт (`core_burn`) является ядром для реализации моделей машинного обучения
//! с использованием фреймворка [Burn](https://burn.dev/). Он предоставляет определение
//! декодерной GPT-архитектуры, а также вспомогательные компоненты, необходимые для ее
//! работы: построитель аддитивного смещения внимания (каузальность, паддинг,
//! двунаправленные префиксы, ALiBi).
//!
//! ## Назначение
//!
//! Основная цель крейта — служить фундаментом для более высокоуровневых систем,
//! таких как движок обучения (`training_engine`), предоставляя им безопасные,
//! производительные и гибкие реализации моделей.
//!
//! ## Структура
//!
//! Крейт организован следующим образом:
//! - `architectures`: Содержит определения архитектур моделей (например, `gpt`).
//! - `attn_bias`: Построение аддитивного смещения внимания (маски и ALiBi).
//! - `error`: Определяет кастомные типы ошибок для этого крейта.

// Объявляем публичные модули, входящие в состав крейта.
pub mod architectures;
pub mod attn_bias;
pub mod error;

// Реэкспортируем наиболее важные и часто используемые элементы из модулей
// для удобства их использования потребителями этого крейта.

// Ошибки
pub use error::BurnCoreError;

// Построение смещения внимания
pub use attn_bias::{alibi_bias, AttnBiasBuilder, AttnBiasBuilderConfig};

// Архитектуры и их конфигурации
pub use architectures::gpt::{
    // Основная модель GPT и ее компоненты
    GptModel,
    GptDecoderBlock,
    GptAttention,
    GptFeedForward,
    AttnImpl,
    // Конфигурации для модели GPT и ее компонентов
    GptModelConfig,
    GptDecoderBlockConfig,
    GptAttentionConfig,
    GptFeedForwardConfig,
    // Record-структуры для сериализации/десериализации весов
    GptModelRecord,
    GptDecoderBlockRecord,
    GptAttentionRecord, // Реэкспортируем все рекорды для полноты API
    GptFeedForwardRecord,
};
pub use architectures::ModelInfo; // Общая информация о модели (тип, размеры и т.д.)
