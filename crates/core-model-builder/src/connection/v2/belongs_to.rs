// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::{
    connection::{BelongsToConnection, ConnectionInfo},
    directive::BelongsToArgs,
    graph::ModelGraph,
    types::{Field, Model},
};

use super::{PipelinedConnectionResolver, belongs_to_parent, keys};
use crate::{
    connection::{Resolution, connected_model},
    error::ModelBuildingError,
    naming::connection_attribute_names,
};

pub(super) fn resolve(
    resolver: &PipelinedConnectionResolver,
    field: &Field,
    args: &BelongsToArgs,
    model: &Model,
    graph: &ModelGraph,
) -> Result<Resolution, ModelBuildingError> {
    if field.is_list {
        return Err(ModelBuildingError::Generic(
            "A list field does not support the 'belongsTo' relation".to_string(),
        ));
    }

    let parent = connected_model(field, model, graph)?;
    let reciprocal = belongs_to_parent(resolver, field, args, model, parent)?.ok_or_else(|| {
        ModelBuildingError::Generic(
            "A 'belongsTo' field should match to a corresponding 'hasMany' or 'hasOne' field"
                .to_string(),
        )
    })?;

    let (target_names, is_using_references) = if !args.references.is_empty() {
        (args.references.clone(), true)
    } else if !args.fields.is_empty() {
        (args.fields.clone(), false)
    } else {
        let components = keys::component_names(&keys::key_components(
            parent,
            resolver.respect_primary_key,
        ));
        // An implicit hasMany names the foreign key after itself, so both sides agree on one
        // field. Any other parent leaves the key named after this field.
        let is_implicit_has_many = reciprocal.has_many_args().is_some_and(|has_many| {
            has_many.index_name.is_none()
                && has_many.fields.is_empty()
                && has_many.references.is_empty()
        });
        let names = if is_implicit_has_many {
            connection_attribute_names(&parent.name, &reciprocal.name, &components)
        } else {
            connection_attribute_names(&model.name, &field.name, &components)
        };
        (names, false)
    };

    Ok(Resolution::new(ConnectionInfo::BelongsTo(BelongsToConnection {
        connected_model: parent.name.clone(),
        target_name: target_names.first().cloned().unwrap_or_default(),
        target_names,
        is_connecting_field_auto_created: args.fields.is_empty() && args.references.is_empty(),
        is_using_references,
    })))
}
