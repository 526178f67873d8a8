// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;

use common::env::SystemEnvironment;
use core_model_builder::{GeneratorConfig, ModelBuildingError, ResolvedGraph};

use super::command::{get, get_required};
use crate::config::load_config;

/// The schema named on the command line, resolved with the configuration the flags and
/// `modelgen.toml` describe.
pub(crate) struct SchemaInput {
    pub schema_path: PathBuf,
    pub schema: String,
    pub directive_definitions: Option<String>,
    pub config: GeneratorConfig,
}

impl SchemaInput {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let schema_path: PathBuf = get_required(matches, "schema")?;
        let config_path: Option<PathBuf> = get(matches, "config");

        let config = load_config(config_path.as_deref(), &SystemEnvironment)?;

        let directives_path = get::<PathBuf>(matches, "directives").or(config.directives);
        let directive_definitions = directives_path
            .as_deref()
            .map(read_file)
            .transpose()?;

        let mut generator = config.generator;
        apply_flags(&mut generator, matches);

        Ok(SchemaInput {
            schema: read_file(&schema_path)?,
            schema_path,
            directive_definitions,
            config: generator,
        })
    }

    pub fn build(&self) -> Result<ResolvedGraph, ModelBuildingError> {
        tracing::debug!(schema = %self.schema_path.display(), config = ?self.config, "building model graph");
        core_model_builder::build(
            &self.schema,
            self.directive_definitions.as_deref(),
            &self.config,
        )
    }
}

fn apply_flags(config: &mut GeneratorConfig, matches: &ArgMatches) {
    if matches.get_flag("pipelined") {
        config.use_pipelined_transformer = true;
    }
    if matches.get_flag("no-timestamps") {
        config.is_timestamp_fields_added = false;
    }
    if matches.get_flag("respect-primary-key") {
        config.respect_primary_key_attributes_on_connection_field = true;
    }
    if matches.get_flag("no-datastore") {
        config.is_data_store_enabled = false;
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file '{}'", path.display()))
}
