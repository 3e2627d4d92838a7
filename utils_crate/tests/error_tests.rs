use std::io;
use utils_crate::error::UtilsError;

#[test]
fn test_io_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let path_str = "non_existent_file.txt";
    let utils_err = UtilsError::io_with_path(io_err, path_str.to_string());

    match utils_err {
        UtilsError::Io {
            source,
            path: Some(p),
        } => {
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
            assert_eq!(p, path_str);
            assert!(source.to_string().contains("file not found"));
        }
        _ => panic!("Expected UtilsError::Io variant with path"),
    }

    let io_err_no_path = io::Error::new(io::ErrorKind::Other, "other io error");
    let utils_err_no_path: UtilsError = io_err_no_path.into(); // Используем From<std::io::Error>
    match utils_err_no_path {
        UtilsError::Io { source, path: None } => {
            assert_eq!(source.kind(), io::ErrorKind::Other);
            assert!(source.to_string().contains("other io error"));
        }
        _ => panic!("Expected UtilsError::Io variant without path"),
    }
}

#[test]
fn test_config_error_formatting() {
    let err = UtilsError::Config("Invalid config format".to_string());
    assert_eq!(
        format!("{}", err),
        "Ошибка конфигурации: Invalid config format"
    );
}

#[test]
fn test_invalid_parameter_formatting() {
    let err = UtilsError::InvalidParameter("Null value not allowed".to_string());
    assert_eq!(
        format!("{}", err),
        "Неверный параметр: Null value not allowed"
    );
}

#[test]
fn test_not_supported_formatting() {
    let err = UtilsError::NotSupported("Legacy API version".to_string());
    assert_eq!(
        format!("{}", err),
        "Операция или функция не поддерживается: Legacy API version"
    );
}

#[test]
fn test_resource_not_found_formatting() {
    let err = UtilsError::ResourceNotFound("Config 'run.toml' not found".to_string());
    assert_eq!(
        format!("{}", err),
        "Ресурс не найден: Config 'run.toml' not found"
    );
}

#[test]
fn test_generic_error_formatting() {
    let err = UtilsError::Generic("Something unexpected happened".to_string());
    assert_eq!(
        format!("{}", err),
        "Произошла общая ошибка утилиты: Something unexpected happened"
    );
}

#[cfg(feature = "app_config_serde")]
#[test]
fn test_toml_de_error_conversion_utils() {
    let toml_str = "key = invalid_toml_value"; // Невалидный TOML
    let toml_err_result: Result<toml::Value, _> = toml::from_str(toml_str);
    assert!(toml_err_result.is_err());
    let toml_err = toml_err_result.unwrap_err();
    let utils_err: UtilsError = toml_err.into(); // Используем From<toml::de::Error>

    match utils_err {
        UtilsError::Deserialization(msg) => {
            assert!(
                msg.contains("Ошибка десериализации TOML:"),
                "Error message was: {}",
                msg
            );
        }
        _ => panic!(
            "Expected UtilsError::Deserialization variant, got {:?}",
            utils_err
        ),
    }
}
