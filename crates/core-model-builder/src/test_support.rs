// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::graph::ModelGraph;

use crate::{
    config::GeneratorConfig, diagnostics::Diagnostics, error::ModelBuildingError, schema_builder,
};

/// Ingest `schema` without running any resolution pass.
pub(crate) fn build_raw(
    schema: &str,
    config: &GeneratorConfig,
) -> Result<ModelGraph, ModelBuildingError> {
    schema_builder::build(schema, None, config, &mut Diagnostics::default())
}

pub(crate) fn config_with(update: impl FnOnce(&mut GeneratorConfig)) -> GeneratorConfig {
    let mut config = GeneratorConfig::default();
    update(&mut config);
    config
}
