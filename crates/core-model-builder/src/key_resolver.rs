// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Express `@primaryKey` and `@index` as model-level `key` directives, the form both the legacy
//! resolver and the renderers understand.

use core_model::{
    directive::{Directive, KeyArgs},
    graph::ModelGraph,
    types::Model,
};

pub fn resolve_keys(graph: &mut ModelGraph) {
    for id in graph.model_ids() {
        let model = &mut graph.models[id];
        process_primary_key(model);
        process_index(model);
    }
}

/// Adds `key { fields: [primaryKeyField, ...sortKeyFields] }` for a field carrying `@primaryKey`.
/// A model that already has a nameless `key` directive is left alone.
pub fn process_primary_key(model: &mut Model) {
    if model.primary_key_directive().is_some() {
        return;
    }

    let Some((field, args)) = model.primary_key_annotation() else {
        return;
    };

    let key = KeyArgs {
        name: args.name.clone(),
        fields: std::iter::once(field.name.clone())
            .chain(args.sort_key_fields.iter().cloned())
            .collect(),
        query_field: None,
    };

    tracing::debug!(model = %model.name, fields = ?key.fields, "synthesized primary key");
    model.directives.push(Directive::Key(key));
}

/// Adds a named `key` for every `@index`, unless a `key` with that name already exists.
pub fn process_index(model: &mut Model) {
    let keys: Vec<KeyArgs> = model
        .fields
        .iter()
        .flat_map(|field| {
            field.index_args().map(move |index| KeyArgs {
                name: index.name.clone(),
                fields: std::iter::once(field.name.clone())
                    .chain(index.sort_key_fields.iter().cloned())
                    .collect(),
                query_field: index.query_field.clone(),
            })
        })
        .collect();

    for key in keys {
        let exists = key
            .name
            .as_deref()
            .is_some_and(|name| model.named_key_directive(name).is_some());
        if !exists {
            model.directives.push(Directive::Key(key));
        }
    }
}
