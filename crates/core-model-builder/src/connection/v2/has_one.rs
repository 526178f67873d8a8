// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::{
    connection::{ConnectionInfo, HasOneConnection},
    directive::HasOneArgs,
    graph::ModelGraph,
    types::{Field, ID_FIELD, Model},
};

use super::{PipelinedConnectionResolver, child_reciprocals, keys, pick_reciprocal};
use crate::{
    connection::{Resolution, connected_model},
    error::ModelBuildingError,
    naming::connection_attribute_names,
};

pub(super) fn resolve(
    resolver: &PipelinedConnectionResolver,
    field: &Field,
    args: &HasOneArgs,
    model: &Model,
    graph: &ModelGraph,
) -> Result<Resolution, ModelBuildingError> {
    if field.is_list {
        return Err(ModelBuildingError::Generic(
            "A hasOne relationship should be 1:1, no lists".to_string(),
        ));
    }

    let child = connected_model(field, model, graph)?;
    let reciprocal = pick_reciprocal(
        field,
        model,
        child_reciprocals(resolver, field, model, child),
        |candidate| {
            !args.references.is_empty()
                && candidate
                    .belongs_to_args()
                    .is_some_and(|belongs_to| belongs_to.references == args.references)
        },
    )?;

    if !args.references.is_empty() {
        // The foreign key lives on the child and points at this model's key
        let own_key = keys::component_names(&keys::key_components(model, true));
        return Ok(Resolution::new(ConnectionInfo::HasOne(HasOneConnection {
            connected_model: child.name.clone(),
            associated_with: reciprocal
                .map(|r| r.name.clone())
                .unwrap_or_else(|| args.references[0].clone()),
            associated_with_fields: args.references.clone(),
            is_connecting_field_auto_created: false,
            target_name: own_key.first().cloned().unwrap_or_default(),
            target_names: own_key,
        })));
    }

    let components = keys::key_components(child, resolver.respect_primary_key);
    let component_names = keys::component_names(&components);
    let target_names = if args.fields.is_empty() {
        connection_attribute_names(&model.name, &field.name, &component_names)
    } else {
        args.fields.clone()
    };

    let (associated_with, associated_with_fields) = if resolver.respect_primary_key {
        let associated_with = match reciprocal {
            Some(reciprocal)
                if resolver.use_fields_in_associated_with_in_has_one && components.len() > 1 =>
            {
                reciprocal.name.clone()
            }
            _ => component_names[0].clone(),
        };
        (associated_with, component_names)
    } else {
        let associated_with = reciprocal
            .or_else(|| child.primary_key_field())
            .map_or(ID_FIELD.to_string(), |f| f.name.clone());
        (associated_with, vec![])
    };

    let target_fields = keys::typed_fields(&target_names, &components, field.is_nullable);

    Ok(
        Resolution::new(ConnectionInfo::HasOne(HasOneConnection {
            connected_model: child.name.clone(),
            associated_with,
            associated_with_fields,
            is_connecting_field_auto_created: args.fields.is_empty(),
            target_name: target_names[0].clone(),
            target_names,
        }))
        .with_fields(&model.name, target_fields),
    )
}
