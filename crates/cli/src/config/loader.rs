// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde::Deserialize;

use common::env::{Environment, MODELGEN_PIPELINED};
use core_model_builder::GeneratorConfig;

use super::model::{Config, DEFAULT_CONFIG_FILE, TransformerVersion};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigSer {
    pub generator: Option<GeneratorSer>,
    pub schema: Option<SchemaSer>,
}

#[derive(Deserialize, Debug, PartialEq, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GeneratorSer {
    pub transformer_version: Option<u8>,
    pub add_timestamp_fields: Option<bool>,
    pub handle_list_nullability_transparently: Option<bool>,
    pub respect_primary_key_attributes_on_connection_field: Option<bool>,
    pub data_store_enabled: Option<bool>,
    pub use_model_name_as_associated_with: Option<bool>,
    pub use_fields_in_associated_with_in_has_one: Option<bool>,
}

#[derive(Deserialize, Debug, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SchemaSer {
    pub directives: Option<PathBuf>,
}

impl TryFrom<ConfigSer> for Config {
    type Error = anyhow::Error;

    fn try_from(config: ConfigSer) -> Result<Self, Self::Error> {
        Ok(Config {
            generator: config
                .generator
                .map(GeneratorConfig::try_from)
                .transpose()?
                .unwrap_or_default(),
            directives: config.schema.and_then(|schema| schema.directives),
        })
    }
}

impl TryFrom<GeneratorSer> for GeneratorConfig {
    type Error = anyhow::Error;

    fn try_from(config: GeneratorSer) -> Result<Self, Self::Error> {
        let defaults = GeneratorConfig::default();

        let use_pipelined_transformer = match config.transformer_version {
            Some(version) => TransformerVersion::try_from(version)? == TransformerVersion::V2,
            None => defaults.use_pipelined_transformer,
        };

        Ok(GeneratorConfig {
            use_pipelined_transformer,
            is_timestamp_fields_added: config
                .add_timestamp_fields
                .unwrap_or(defaults.is_timestamp_fields_added),
            handle_list_nullability_transparently: config
                .handle_list_nullability_transparently
                .unwrap_or(defaults.handle_list_nullability_transparently),
            respect_primary_key_attributes_on_connection_field: config
                .respect_primary_key_attributes_on_connection_field
                .unwrap_or(defaults.respect_primary_key_attributes_on_connection_field),
            is_data_store_enabled: config
                .data_store_enabled
                .unwrap_or(defaults.is_data_store_enabled),
            use_model_name_as_associated_with: config
                .use_model_name_as_associated_with
                .unwrap_or(defaults.use_model_name_as_associated_with),
            should_use_fields_in_associated_with_in_has_one: config
                .use_fields_in_associated_with_in_has_one
                .unwrap_or(defaults.should_use_fields_in_associated_with_in_has_one),
        })
    }
}

fn load_config_from_file(path: &Path) -> Result<Config> {
    let toml_str = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read file '{}': {}", path.display(), e))?;
    let config: ConfigSer = toml::from_str(&toml_str)
        .map_err(|e| anyhow!("Failed to parse TOML file '{}': {}", path.display(), e))?;

    config.try_into()
}

/// Load `path`, or `modelgen.toml` when no path is given. Only the default file may be absent.
pub fn load_config(path: Option<&Path>, env: &dyn Environment) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config_from_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                load_config_from_file(default_path)?
            } else {
                Config::default()
            }
        }
    };

    if let Some(pipelined) = env.flag(MODELGEN_PIPELINED)? {
        tracing::debug!(pipelined, "{MODELGEN_PIPELINED} overrides the configured transformer");
        config.generator.use_pipelined_transformer = pipelined;
    }

    Ok(config)
}
