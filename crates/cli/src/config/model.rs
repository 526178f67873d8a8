// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;

use core_model_builder::GeneratorConfig;

pub const DEFAULT_CONFIG_FILE: &str = "modelgen.toml";

#[derive(Debug, PartialEq, Default)]
pub struct Config {
    pub generator: GeneratorConfig,
    /// Directive definitions to read alongside every schema.
    pub directives: Option<PathBuf>,
}

/// The transformer generation a schema targets. Version 2 reads the pipelined directives.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TransformerVersion {
    V1,
    V2,
}

impl TryFrom<u8> for TransformerVersion {
    type Error = anyhow::Error;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        match version {
            1 => Ok(TransformerVersion::V1),
            2 => Ok(TransformerVersion::V2),
            _ => Err(anyhow::anyhow!(
                "Unsupported transformer-version {version}. Expected 1 or 2"
            )),
        }
    }
}
