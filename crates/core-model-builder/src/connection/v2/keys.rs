// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::types::{Field, ID_FIELD, ID_TYPE, Model};

use crate::naming::connection_attribute_name;

/// A field of a model's key, as seen by a relationship pointing at that model.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct KeyComponent {
    pub name: String,
    pub type_name: String,
}

/// The key components foreign keys to `model` are derived from, in key order. Without
/// composite key support every model is referenced through a single `id`.
pub(super) fn key_components(model: &Model, respect_primary_key: bool) -> Vec<KeyComponent> {
    let names = if respect_primary_key {
        model.identifier_component_names()
    } else {
        vec![ID_FIELD.to_string()]
    };

    names
        .into_iter()
        .map(|name| KeyComponent {
            type_name: model
                .field(&name)
                .map_or(ID_TYPE.to_string(), |f| f.type_name.clone()),
            name,
        })
        .collect()
}

pub(super) fn component_names(components: &[KeyComponent]) -> Vec<String> {
    components.iter().map(|c| c.name.clone()).collect()
}

/// Implicit foreign key fields `<model><Field><Component>`, one per key component.
pub(super) fn foreign_key_fields(
    model_name: &str,
    field_name: &str,
    components: &[KeyComponent],
    is_nullable: bool,
) -> Vec<Field> {
    components
        .iter()
        .map(|c| {
            Field::scalar(
                connection_attribute_name(model_name, field_name, &c.name),
                &c.type_name,
                is_nullable,
            )
        })
        .collect()
}

/// Scalar fields with the given names, typed after the key components in the same position.
pub(super) fn typed_fields(
    names: &[String],
    components: &[KeyComponent],
    is_nullable: bool,
) -> Vec<Field> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let type_name = components.get(i).map_or(ID_TYPE, |c| c.type_name.as_str());
            Field::scalar(name, type_name, is_nullable)
        })
        .collect()
}
