// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Relationship resolution.
//!
//! Each directive dialect implements [`ConnectionResolver`]. A resolver only inspects the graph
//! and describes what the relationship needs in a [`Resolution`]; [`connect`] is the single
//! place that writes those changes back into the graph.

mod v1;
mod v2;

use core_model::{
    connection::ConnectionInfo,
    directive::Directive,
    graph::ModelGraph,
    mapped_arena::SerializableSlabIndex,
    types::{Field, Model},
};

use crate::{config::GeneratorConfig, error::ModelBuildingError};

pub use v1::LegacyConnectionResolver;
pub use v2::PipelinedConnectionResolver;

/// The outcome of resolving one relationship field.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub connection: ConnectionInfo,
    /// Fields that must exist for the relationship, keyed by the model that holds them. A field
    /// that is already declared is left untouched.
    pub synthesized_fields: Vec<(String, Field)>,
    /// Scalar fields of the owning model that the relationship field now stands for.
    pub removed_fields: Vec<String>,
    /// Model-level directives to add, keyed by model name.
    pub synthesized_directives: Vec<(String, Directive)>,
}

impl Resolution {
    pub fn new(connection: ConnectionInfo) -> Self {
        Self {
            connection,
            synthesized_fields: vec![],
            removed_fields: vec![],
            synthesized_directives: vec![],
        }
    }
}

pub trait ConnectionResolver {
    /// Resolve `field` of `model`. Fields without a relationship directive of this dialect
    /// resolve to `None`, as do relationship shapes the dialect has no representation for.
    fn resolve(
        &self,
        field: &Field,
        model: &Model,
        graph: &ModelGraph,
    ) -> Result<Option<Resolution>, ModelBuildingError>;

    /// Runs once after every field of every model has been resolved.
    fn finalize(&self, _graph: &mut ModelGraph) {}

    /// The warning reported when a model-typed field ends up without a relationship.
    fn unconnected_warning(&self, model: &Model, field: &Field) -> String;
}

pub fn resolver_for(config: &GeneratorConfig) -> Box<dyn ConnectionResolver> {
    if config.use_pipelined_transformer {
        Box::new(PipelinedConnectionResolver::new(config))
    } else {
        Box::new(LegacyConnectionResolver::new(config))
    }
}

/// Resolve every field of every model, in model declaration order.
pub fn connect(
    graph: &mut ModelGraph,
    resolver: &dyn ConnectionResolver,
) -> Result<(), ModelBuildingError> {
    for id in graph.model_ids() {
        // Resolutions may remove fields of this model, so walk a snapshot of the names.
        let field_names: Vec<String> = graph.models[id]
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect();

        for field_name in field_names {
            let resolution = {
                let model = &graph.models[id];
                match model.field(&field_name) {
                    Some(field) => resolver.resolve(field, model, graph)?,
                    None => continue,
                }
            };

            if let Some(resolution) = resolution {
                apply_resolution(graph, id, &field_name, resolution);
            }
        }
    }

    resolver.finalize(graph);
    Ok(())
}

fn apply_resolution(
    graph: &mut ModelGraph,
    id: SerializableSlabIndex<Model>,
    field_name: &str,
    resolution: Resolution,
) {
    let Resolution {
        connection,
        synthesized_fields,
        removed_fields,
        synthesized_directives,
    } = resolution;

    let model = &mut graph.models[id];
    tracing::debug!(
        model = %model.name,
        field = field_name,
        kind = ?connection.kind(),
        connected_model = connection.connected_model(),
        "resolved connection"
    );
    if let Some(field) = model.field_mut(field_name) {
        field.connection_info = Some(connection);
    }

    for name in removed_fields {
        remove_target_field(model, &name, field_name);
    }

    for (model_name, field) in synthesized_fields {
        if let Some(model) = graph.model_mut(&model_name) {
            let name = field.name.clone();
            if model.add_field_if_missing(field) {
                tracing::debug!(model = %model_name, field = %name, "synthesized connecting field");
            }
        }
    }

    for (model_name, directive) in synthesized_directives {
        let Some(model) = graph.model_mut(&model_name) else {
            continue;
        };
        let duplicate = match &directive {
            Directive::Key(key) => key
                .name
                .as_deref()
                .is_some_and(|name| model.named_key_directive(name).is_some()),
            _ => false,
        };
        if !duplicate {
            model.directives.push(directive);
        }
    }
}

/// Removes a foreign key scalar now represented by `relationship_field`. `id`, primary key
/// components, and the relationship field itself always stay.
pub(crate) fn remove_target_field(model: &mut Model, target: &str, relationship_field: &str) {
    if target == core_model::types::ID_FIELD || target == relationship_field {
        return;
    }
    let is_key_component = model
        .primary_key_component_fields()
        .iter()
        .any(|f| f.name == target);
    if !is_key_component && model.remove_field(target).is_some() {
        tracing::debug!(model = %model.name, field = target, "removed belongsTo target field");
    }
}

/// The model a relationship field points at.
pub(crate) fn connected_model<'a>(
    field: &Field,
    model: &Model,
    graph: &'a ModelGraph,
) -> Result<&'a Model, ModelBuildingError> {
    graph.model(&field.type_name).ok_or_else(|| {
        ModelBuildingError::Generic(format!(
            "The {} on model {} is connected to {}, which is not a model",
            field.name, model.name, field.type_name
        ))
    })
}
