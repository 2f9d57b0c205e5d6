use std::{fs, path::PathBuf};

use tempdir::TempDir;

use crate::core::config::{Config, ConfigError, EncodingConfig};
use crate::types::{
    constants, decode_binary, encode_binary, service_types::RequestHeader, DateTime,
    EncodingContext, EncodingError, NodeId, OPC_UA_NAMESPACE_URI,
};

fn make_config_dir() -> (TempDir, PathBuf) {
    let tmp_dir = TempDir::new("config").unwrap();
    let path = tmp_dir.path().join("encoding.conf");
    (tmp_dir, path)
}

fn sample_config() -> EncodingConfig {
    EncodingConfig {
        max_message_size: 8192,
        max_string_length: 256,
        max_array_length: 16,
        namespaces: vec!["urn:plant".to_string(), "urn:plant:line1".to_string()],
        ..Default::default()
    }
}

#[test]
fn default_config() {
    let config = EncodingConfig::default();
    assert!(config.is_valid());
    assert_eq!(config.max_array_length, constants::MAX_ARRAY_LENGTH);
    assert_eq!(config.max_decoding_depth, constants::MAX_DECODING_DEPTH);
    assert!(config.namespaces.is_empty());
}

#[test]
fn save_and_load() {
    let (_tmp_dir, path) = make_config_dir();
    let config = sample_config();
    config.save(&path).unwrap();
    let loaded = EncodingConfig::load::<EncodingConfig>(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_values_take_defaults() {
    let (_tmp_dir, path) = make_config_dir();
    fs::write(&path, "max_string_length: 10\nnamespaces:\n  - urn:a\n").unwrap();
    let config = EncodingConfig::load::<EncodingConfig>(&path).unwrap();
    assert_eq!(config.max_string_length, 10);
    assert_eq!(config.max_message_size, constants::MAX_MESSAGE_SIZE);
    assert_eq!(config.max_byte_string_length, constants::MAX_BYTE_STRING_LENGTH);
    assert_eq!(config.namespaces, vec!["urn:a".to_string()]);
}

#[test]
fn invalid_config() {
    let mut config = EncodingConfig::default();
    config.max_decoding_depth = 0;
    assert!(!config.is_valid());

    let mut config = EncodingConfig::default();
    config.namespaces = vec!["urn:a".to_string(), String::new()];
    assert!(!config.is_valid());

    // The OPC UA namespace is allowed in front only
    let mut config = EncodingConfig::default();
    config.namespaces = vec![OPC_UA_NAMESPACE_URI.to_string(), "urn:a".to_string()];
    assert!(config.is_valid());
    config.namespaces.reverse();
    assert!(!config.is_valid());

    let (_tmp_dir, path) = make_config_dir();
    assert!(matches!(config.save(&path), Err(ConfigError::Invalid)));
    assert!(!path.exists());

    fs::write(&path, "max_decoding_depth: 0\n").unwrap();
    assert!(matches!(
        EncodingConfig::load::<EncodingConfig>(&path),
        Err(ConfigError::Invalid)
    ));
}

#[test]
fn load_errors() {
    let (_tmp_dir, path) = make_config_dir();
    assert!(matches!(
        EncodingConfig::load::<EncodingConfig>(&path),
        Err(ConfigError::Io { .. })
    ));

    fs::write(&path, "max_array_length: [not, a, number]\n").unwrap();
    assert!(matches!(
        EncodingConfig::load::<EncodingConfig>(&path),
        Err(ConfigError::Yaml(_))
    ));
}

#[test]
fn context_from_config() {
    let config = sample_config();
    let ctx = EncodingContext::from_config(&config);
    assert_eq!(ctx.options.max_message_size, 8192);
    assert_eq!(ctx.options.max_string_length, 256);
    assert_eq!(ctx.options.max_array_length, 16);
    assert_eq!(ctx.namespaces.index_of(OPC_UA_NAMESPACE_URI), Some(0));
    assert_eq!(ctx.namespaces.index_of("urn:plant"), Some(1));
    assert_eq!(ctx.namespaces.index_of("urn:plant:line1"), Some(2));

    // The limits apply to decoding
    let mut header = RequestHeader::new(&NodeId::null(), &DateTime::epoch(), 1);
    header.audit_entry_id = "x".repeat(300).into();
    let bytes = encode_binary(&header).unwrap();
    assert!(matches!(
        decode_binary::<RequestHeader>(&bytes, &ctx),
        Err(EncodingError::InvalidLength { limit: 256, .. })
    ));
}
