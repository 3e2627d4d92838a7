#[cfg(feature = "app_config_serde")]
mod app_config_feature_tests {
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;
    use utils_crate::config::AppConfig;
    use utils_crate::error::UtilsError;

    fn default_checkpoint_dir_app_test() -> String {
        "./.checkpoints".to_string()
    }
    fn default_model_preset_app_test() -> String {
        "gpt-125m".to_string()
    }

    #[test]
    fn test_app_config_default_values_ct() {
        let config = AppConfig::default();
        assert_eq!(config.model_config.preset, default_model_preset_app_test());
        assert_eq!(
            config.model_config.checkpoint_dir,
            default_checkpoint_dir_app_test()
        );
        assert_eq!(config.training_config.batch_size, 8);
        assert_eq!(config.training_config.max_steps, 1000);
        assert_eq!(config.training_config.seed, 42);
        assert_eq!(config.logging_config.level, "info".to_string());
        assert_eq!(config.logging_config.log_dir, None);
    }

    #[test]
    fn test_app_config_load_from_toml_exists_ct() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let toml_content = r#"
            [model_config]
            preset = "gpt-350m"
            checkpoint_dir = "/data/checkpoints"

            [training_config]
            batch_size = 32
            learning_rate = 0.0001
            max_steps = 50000
            seed = 7

            [logging_config]
            level = "debug"
            log_dir = "/var/log/lm_training"
        "#;
        writeln!(temp_file, "{}", toml_content).unwrap();

        let config = AppConfig::load_from_toml(temp_file.path()).unwrap();
        assert_eq!(config.model_config.preset, "gpt-350m".to_string());
        assert_eq!(
            config.model_config.checkpoint_dir,
            "/data/checkpoints".to_string()
        );
        assert_eq!(config.training_config.batch_size, 32);
        assert!((config.training_config.learning_rate - 0.0001).abs() < f64::EPSILON);
        assert_eq!(config.training_config.max_steps, 50000);
        assert_eq!(config.training_config.seed, 7);
        assert_eq!(config.logging_config.level, "debug".to_string());
        assert_eq!(
            config.logging_config.log_dir,
            Some("/var/log/lm_training".to_string())
        );
    }

    #[test]
    fn test_app_config_partial_deserialization_ct() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let toml_content = r#"
            [training_config]
            batch_size = 64
        "#;
        writeln!(temp_file, "{}", toml_content).unwrap();
        let config = AppConfig::load_from_toml(temp_file.path()).unwrap();

        assert_eq!(config.training_config.batch_size, 64);
        assert_eq!(config.training_config.max_steps, 1000);
        assert_eq!(config.model_config.preset, default_model_preset_app_test());
    }

    #[test]
    fn test_app_config_file_not_found_ct() {
        let non_existent_path = Path::new("/totally/non/existent/path/config.toml");
        let config = AppConfig::load_from_toml(non_existent_path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_app_config_invalid_toml_ct() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let invalid_toml_content = r#"batch_size = "not_a_number"#;
        writeln!(temp_file, "{}", invalid_toml_content).unwrap();

        let result = AppConfig::load_from_toml(temp_file.path());
        assert!(result.is_err());
        if let Err(UtilsError::Config(msg)) = result {
            assert!(msg.contains("Failed to parse AppConfig from TOML"));
        } else {
            panic!("Expected a Config error for invalid TOML, got {:?}", result);
        }
    }
}
