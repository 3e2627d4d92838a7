// core_burn/src/architectures/mod.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Корневой модуль для определения различных архитектур моделей машинного обучения.
//!
//! Каждая поддерживаемая архитектура должна быть представлена в своем подмодуле
//! внутри этого модуля. Также здесь определяются общие типы, используемые для
//! идентификации и конфигурации моделей.

// Подключаем подмодуль для GPT-подобной декодерной архитектуры.
pub mod gpt;

// В будущем здесь могут быть добавлены другие архитектуры:
// pub mod llama;

use serde::{Deserialize, Serialize};

/// Перечисление, представляющее тип архитектуры модели.
///
/// Используется для идентификации модели при загрузке конфигурации (например, из `config.json`).
/// Атрибут `#[serde(rename_all = "kebab-case")]` позволяет корректно десериализовать
/// значения типа "gpt" и т.д.
/// Атрибут `#[serde(other)]` обеспечивает устойчивость к неизвестным типам моделей.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    /// GPT-подобная декодерная модель.
    Gpt,
    /// Представляет любой другой или неизвестный тип модели.
    #[serde(other)]
    Other,
}

/// Структура, содержащая общую мета-информацию о модели.
///
/// Эта информация обычно извлекается из файла конфигурации модели (например, `config.json`)
/// и может быть использована для высокоуровневой логики, такой как выбор
/// соответствующих настроек тренировочного запуска.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelInfo {
    /// Тип архитектуры модели.
    #[serde(rename = "model_type")] // Указывает, что в JSON это поле называется "model_type".
    pub model_type: ModelType,

    /// Максимальная длина последовательности, которую может обработать модель.
    pub max_sequence_length: usize,

    /// Размер словаря токенизатора.
    pub vocab_size: usize,

    /// Размерность скрытого слоя модели (embedding dimension).
    pub hidden_size: usize,

    /// Общее количество скрытых слоев (декодерных блоков) в модели.
    pub num_hidden_layers: usize,

    /// Количество голов внимания в механизме multi-head attention.
    pub num_attention_heads: usize,

    /// Использует ли модель позиционное смещение ALiBi
    /// (вместо обучаемых позиционных эмбеддингов).
    pub alibi: bool,
}

impl From<&gpt::GptModelConfig> for ModelInfo {
    fn from(config: &gpt::GptModelConfig) -> Self {
        Self {
            model_type: ModelType::Gpt,
            max_sequence_length: config.max_seq_len,
            vocab_size: config.vocab_size,
            hidden_size: config.d_model,
            num_hidden_layers: config.n_layers,
            num_attention_heads: config.n_heads,
            alibi: config.alibi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_info_from_gpt_config() {
        let config = gpt::GptModelConfig::new(50_000, 2048, 768, 12, 12);
        let info = ModelInfo::from(&config);
        assert_eq!(info.model_type, ModelType::Gpt);
        assert_eq!(info.max_sequence_length, 2048);
        assert_eq!(info.hidden_size, 768);
        assert!(!info.alibi);
    }

    #[test]
    fn test_unknown_model_type_deserializes_to_other() {
        let json = r#"{
            "model_type": "mamba",
            "max_sequence_length": 1024,
            "vocab_size": 1000,
            "hidden_size": 64,
            "num_hidden_layers": 2,
            "num_attention_heads": 4,
            "alibi": false
        }"#;
        let info: ModelInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.model_type, ModelType::Other);
    }

    #[test]
    fn test_model_info_serde_round_trip() {
        let info = ModelInfo::from(&gpt::GptModelConfig::new(100, 32, 16, 1, 2));
        let json = serde_json::to_string(&info).unwrap();
        let back: ModelInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
