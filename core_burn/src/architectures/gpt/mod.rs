// core_burn/src/architectures/gpt/mod.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Модуль, инкапсулирующий полную реализацию декодерной GPT-архитектуры.
//!
//! Он объединяет все компоненты модели: механизм внимания (`attention`),
//! полносвязные сети (`ffn`), декодерные блоки и основную структуру модели (`model`).
//! Этот модуль также реэкспортирует ключевые типы для удобства использования.

// Подключаем подмодули, содержащие реализацию отдельных компонентов GPT.
pub mod attention; // Механизм внимания (Self-Attention)
pub mod ffn;       // Полносвязная сеть (Feed-Forward Network)
pub mod model;     // Основная модель, декодерные блоки, конфигурации

// Реэкспортируем публичные структуры и конфигурации из подмодулей,
// чтобы они были легко доступны через `core_burn::architectures::gpt::*`.

// Компоненты внимания
pub use attention::{AttnImpl, GptAttention, GptAttentionConfig, GptAttentionRecord};

// Компоненты полносвязной сети
pub use ffn::{GptFeedForward, GptFeedForwardConfig, GptFeedForwardRecord};

// Основная модель, декодерные блоки и их конфигурации/рекорды
pub use model::{
    GptModel,
    GptModelConfig,
    GptModelRecord,
    GptDecoderBlock,
    GptDecoderBlockConfig,
    GptDecoderBlockRecord,
};
