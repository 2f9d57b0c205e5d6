// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Configuration of the encoding layer. Settings are stored as YAML.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::result::Result;
use std::sync::Arc;

use serde;
use serde_yaml;
use thiserror::Error;

use crate::types::{
    constants, DecodingOptions, EncodingContext, NamespaceTable, TypeRegistry,
    OPC_UA_NAMESPACE_URI,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access configuration file {path}, {reason}")]
    Io { path: String, reason: String },
    #[error("cannot (de)serialize configuration, {0}")]
    Yaml(String),
    #[error("configuration is not valid")]
    Invalid,
}

/// A trait that handles the loading / saving and validity of configuration information.
pub trait Config: serde::Serialize {
    fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if !self.is_valid() {
            error!("Config isn't valid and won't be saved");
            return Err(ConfigError::Invalid);
        }
        let s = serde_yaml::to_string(&self).map_err(|err| {
            error!("Cannot serialize configuration, error = {}", err);
            ConfigError::Yaml(err.to_string())
        })?;
        let mut f = File::create(path).map_err(|err| {
            error!("Cannot create the path to save the config");
            io_error(path, err)
        })?;
        f.write_all(s.as_bytes()).map_err(|err| {
            error!("Could not save config - error = {:?}", err);
            io_error(path, err)
        })
    }

    fn load<A>(path: &Path) -> Result<A, ConfigError>
    where
        for<'de> A: Config + serde::Deserialize<'de>,
    {
        let mut f = File::open(path).map_err(|err| {
            error!("Cannot open configuration file {}", path.to_string_lossy());
            io_error(path, err)
        })?;
        let mut s = String::new();
        f.read_to_string(&mut s).map_err(|err| {
            error!(
                "Cannot read configuration file {} to string",
                path.to_string_lossy()
            );
            io_error(path, err)
        })?;
        let config: A = serde_yaml::from_str(&s).map_err(|err| {
            error!(
                "Cannot deserialize configuration from {}, error reason: {}",
                path.to_string_lossy(),
                err
            );
            ConfigError::Yaml(err.to_string())
        })?;
        if config.is_valid() {
            Ok(config)
        } else {
            error!(
                "Configuration in {} is not valid",
                path.to_string_lossy()
            );
            Err(ConfigError::Invalid)
        }
    }

    fn is_valid(&self) -> bool;
}

fn io_error(path: &Path, err: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.to_string_lossy().into_owned(),
        reason: err.to_string(),
    }
}

/// Decoding limits and the namespaces a session starts with.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// Maximum size of a message in bytes, 0 for no limit
    #[serde(default = "defaults::max_message_size")]
    pub max_message_size: usize,
    #[serde(default = "defaults::max_string_length")]
    pub max_string_length: usize,
    #[serde(default = "defaults::max_byte_string_length")]
    pub max_byte_string_length: usize,
    #[serde(default = "defaults::max_array_length")]
    pub max_array_length: usize,
    #[serde(default = "defaults::max_decoding_depth")]
    pub max_decoding_depth: usize,
    /// Namespace uris in index order. The OPC UA namespace is always index 0 and may be left out.
    #[serde(default)]
    pub namespaces: Vec<String>,
}

mod defaults {
    use crate::types::constants;

    pub fn max_message_size() -> usize {
        constants::MAX_MESSAGE_SIZE
    }

    pub fn max_string_length() -> usize {
        constants::MAX_STRING_LENGTH
    }

    pub fn max_byte_string_length() -> usize {
        constants::MAX_BYTE_STRING_LENGTH
    }

    pub fn max_array_length() -> usize {
        constants::MAX_ARRAY_LENGTH
    }

    pub fn max_decoding_depth() -> usize {
        constants::MAX_DECODING_DEPTH
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        EncodingConfig {
            max_message_size: constants::MAX_MESSAGE_SIZE,
            max_string_length: constants::MAX_STRING_LENGTH,
            max_byte_string_length: constants::MAX_BYTE_STRING_LENGTH,
            max_array_length: constants::MAX_ARRAY_LENGTH,
            max_decoding_depth: constants::MAX_DECODING_DEPTH,
            namespaces: Vec::new(),
        }
    }
}

impl Config for EncodingConfig {
    fn is_valid(&self) -> bool {
        let mut valid = true;
        if self.max_decoding_depth == 0 {
            error!("Max decoding depth must be at least 1");
            valid = false;
        }
        if let Some(idx) = self.namespaces.iter().position(|ns| ns.is_empty()) {
            error!("Namespace at position {} is empty", idx);
            valid = false;
        }
        // Index 0 is reserved, the OPC UA uri may only appear in front
        if self
            .namespaces
            .iter()
            .skip(1)
            .any(|ns| ns == OPC_UA_NAMESPACE_URI)
        {
            error!(
                "Namespace {} may only be the first namespace",
                OPC_UA_NAMESPACE_URI
            );
            valid = false;
        }
        valid
    }
}

impl EncodingConfig {
    pub fn decoding_options(&self) -> DecodingOptions {
        DecodingOptions {
            max_message_size: self.max_message_size,
            max_string_length: self.max_string_length,
            max_byte_string_length: self.max_byte_string_length,
            max_array_length: self.max_array_length,
            max_decoding_depth: self.max_decoding_depth,
            ..Default::default()
        }
        .for_decoder()
    }

    pub fn namespace_table(&self) -> NamespaceTable {
        NamespaceTable::from_uris(&self.namespaces)
    }
}

impl EncodingContext {
    /// Creates a context over the builtin registry with the limits and namespaces of a config.
    pub fn from_config(config: &EncodingConfig) -> Self {
        Self::from_config_with_registry(config, TypeRegistry::builtin())
    }

    pub fn from_config_with_registry(config: &EncodingConfig, registry: Arc<TypeRegistry>) -> Self {
        EncodingContext::new(
            registry,
            Arc::new(config.namespace_table()),
            config.decoding_options(),
        )
    }
}
