// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The resolution passes, in order.
//!
//! Each pass consumes the graph produced by the previous one, so the passes can only be chained
//! in the order they depend on each other:
//!
//! ```text
//! RawGraph -> KeyResolvedGraph -> ExpandedGraph -> ConnectedGraph -> ResolvedGraph
//! ```

use serde::Serialize;

use core_model::graph::ModelGraph;

use crate::{
    config::{Dialect, GeneratorConfig},
    connection::{self, ConnectionResolver},
    diagnostics::{Diagnostics, Warning},
    error::ModelBuildingError,
    key_resolver, many_to_many, normalization, schema_builder, validator,
};

struct PassState {
    graph: ModelGraph,
    config: GeneratorConfig,
    diagnostics: Diagnostics,
}

/// Ingested and normalized models.
pub struct RawGraph(PassState);

/// Primary keys and indexes expressed as `key` directives.
pub struct KeyResolvedGraph(PassState);

/// `@manyToMany` pairs replaced by join models.
pub struct ExpandedGraph(PassState);

/// Every relationship field carries its `ConnectionInfo`.
pub struct ConnectedGraph {
    state: PassState,
    resolver: Box<dyn ConnectionResolver>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedGraph {
    #[serde(flatten)]
    pub graph: ModelGraph,
    pub warnings: Vec<Warning>,
}

impl RawGraph {
    pub fn ingest(
        schema: &str,
        directive_definitions: Option<&str>,
        config: &GeneratorConfig,
    ) -> Result<Self, ModelBuildingError> {
        let mut diagnostics = Diagnostics::default();
        let graph = schema_builder::build(schema, directive_definitions, config, &mut diagnostics)?;
        tracing::debug!(
            models = graph.models.len(),
            non_models = graph.non_models.len(),
            enums = graph.enums.len(),
            "ingested schema"
        );

        Ok(RawGraph(PassState {
            graph,
            config: config.clone(),
            diagnostics,
        }))
    }

    /// Legacy schemas declare `@key` themselves, so this only rewrites the pipelined dialect.
    pub fn resolve_keys(self) -> KeyResolvedGraph {
        let mut state = self.0;
        if state.config.dialect() == Dialect::Pipelined {
            key_resolver::resolve_keys(&mut state.graph);
            tracing::debug!("resolved primary keys and indexes");
        }
        KeyResolvedGraph(state)
    }
}

impl KeyResolvedGraph {
    pub fn expand_many_to_many(self) -> Result<ExpandedGraph, ModelBuildingError> {
        let mut state = self.0;
        many_to_many::expand_many_to_many(&mut state.graph, &state.config)?;
        Ok(ExpandedGraph(state))
    }

    /// `@manyToMany` only exists in the pipelined dialect.
    pub fn skip_expansion(self) -> ExpandedGraph {
        ExpandedGraph(self.0)
    }

    pub fn expand(self) -> Result<ExpandedGraph, ModelBuildingError> {
        match self.0.config.dialect() {
            Dialect::Pipelined => self.expand_many_to_many(),
            Dialect::Legacy => Ok(self.skip_expansion()),
        }
    }
}

impl ExpandedGraph {
    pub fn connect(
        self,
        resolver: Box<dyn ConnectionResolver>,
    ) -> Result<ConnectedGraph, ModelBuildingError> {
        let mut state = self.0;
        connection::connect(&mut state.graph, resolver.as_ref())?;
        tracing::debug!("resolved connections");
        Ok(ConnectedGraph { state, resolver })
    }
}

impl ConnectedGraph {
    pub fn validate(self) -> ResolvedGraph {
        let ConnectedGraph {
            mut state,
            resolver,
        } = self;
        validator::validate(&mut state.graph, resolver.as_ref(), &mut state.diagnostics);
        normalization::mark_required_fields(
            &mut state.graph,
            state.config.handle_list_nullability_transparently,
        );

        ResolvedGraph {
            graph: state.graph,
            warnings: state.diagnostics.into_warnings(),
        }
    }
}

/// Build the resolved model graph for `schema`.
pub fn build(
    schema: &str,
    directive_definitions: Option<&str>,
    config: &GeneratorConfig,
) -> Result<ResolvedGraph, ModelBuildingError> {
    let resolved = RawGraph::ingest(schema, directive_definitions, config)?
        .resolve_keys()
        .expand()?
        .connect(connection::resolver_for(config))?
        .validate();

    tracing::debug!(warnings = resolved.warnings.len(), "model graph resolved");
    Ok(resolved)
}
