// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Per-model normalization applied to every `@model` type as it is ingested, and to synthesized
//! join models.

use core_model::{
    graph::ModelGraph,
    types::{Field, ID_FIELD, ID_TYPE, Model, PrimaryKeyInfo, PrimaryKeyType},
};

use crate::{
    config::{Dialect, GeneratorConfig},
    error::ModelBuildingError,
    naming::{CREATED_AT_FIELD, UPDATED_AT_FIELD},
};

const TIMESTAMP_TYPE: &str = "AWSDateTime";

pub fn normalize_model(model: &mut Model, config: &GeneratorConfig) -> Result<(), ModelBuildingError> {
    ensure_primary_key_field(model, config.dialect())?;
    add_timestamp_fields(model, config);
    sort_fields(model);
    Ok(())
}

/// Tag the primary key field with its `PrimaryKeyInfo`, synthesizing a managed `id` field when
/// the model declares no key.
pub fn ensure_primary_key_field(model: &mut Model, dialect: Dialect) -> Result<(), ModelBuildingError> {
    let declared_key = match dialect {
        Dialect::Pipelined => model
            .primary_key_annotation()
            .map(|(field, args)| (field.name.clone(), args.sort_key_fields.clone())),
        Dialect::Legacy => model
            .primary_key_directive()
            .and_then(|key| key.fields.split_first())
            .map(|(primary, sort_keys)| (primary.clone(), sort_keys.to_vec())),
    };

    match declared_key {
        Some((primary_key_field, sort_key_fields)) => {
            assign_primary_key(model, &primary_key_field, sort_key_fields)
        }
        None => {
            ensure_id_field(model)?;
            if let Some(id_field) = model.field_mut(ID_FIELD) {
                id_field.primary_key_info = Some(PrimaryKeyInfo {
                    primary_key_type: PrimaryKeyType::ManagedId,
                    sort_key_fields: vec![],
                });
            }
            Ok(())
        }
    }
}

fn assign_primary_key(
    model: &mut Model,
    primary_key_field: &str,
    sort_key_fields: Vec<String>,
) -> Result<(), ModelBuildingError> {
    for component in std::iter::once(primary_key_field).chain(sort_key_fields.iter().map(String::as_str)) {
        let field = model.field(component).ok_or_else(|| {
            ModelBuildingError::Generic(format!(
                "Cannot find primary key field {component} in type {}",
                model.name
            ))
        })?;

        if field.is_nullable || field.is_list {
            return Err(ModelBuildingError::Generic(format!(
                "The primary key on type '{}' must reference non-null fields.",
                model.name
            )));
        }
    }

    let primary_key_type = if primary_key_field == ID_FIELD && sort_key_fields.is_empty() {
        PrimaryKeyType::OptionallyManagedId
    } else {
        PrimaryKeyType::CustomId
    };

    if let Some(field) = model.field_mut(primary_key_field) {
        field.primary_key_info = Some(PrimaryKeyInfo {
            primary_key_type,
            sort_key_fields,
        });
    }

    Ok(())
}

fn ensure_id_field(model: &mut Model) -> Result<(), ModelBuildingError> {
    let model_name = model.name.clone();
    match model.field_mut(ID_FIELD) {
        Some(id_field) => {
            if id_field.type_name != ID_TYPE || id_field.is_list {
                return Err(ModelBuildingError::Generic(format!(
                    "id field on {model_name} should be of type ID"
                )));
            }
            id_field.is_nullable = false;
        }
        None => model.fields.insert(0, Field::scalar(ID_FIELD, ID_TYPE, false)),
    }
    Ok(())
}

/// Adds the read-only `createdAt`/`updatedAt` fields unless disabled by configuration or by
/// `@model(timestamps: null)`.
pub fn add_timestamp_fields(model: &mut Model, config: &GeneratorConfig) {
    if !config.is_timestamp_fields_added {
        return;
    }

    let Some(model_args) = model.model_directive() else {
        return;
    };

    let (created_at, updated_at) = match &model_args.timestamps {
        Some(None) => return,
        Some(Some(timestamps)) => (
            timestamps.created_at.clone().unwrap_or(CREATED_AT_FIELD.to_string()),
            timestamps.updated_at.clone().unwrap_or(UPDATED_AT_FIELD.to_string()),
        ),
        None => (CREATED_AT_FIELD.to_string(), UPDATED_AT_FIELD.to_string()),
    };

    for name in [created_at, updated_at] {
        model.add_field_if_missing(Field {
            is_read_only: true,
            ..Field::scalar(name, TIMESTAMP_TYPE, true)
        });
    }
}

/// Moves `id` to the front, keeping every other field in declaration order.
pub fn sort_fields(model: &mut Model) {
    if let Some(position) = model.fields.iter().position(|f| f.name == ID_FIELD) {
        let id_field = model.fields.remove(position);
        model.fields.insert(0, id_field);
    }
}

/// Records `is_required` on every field of every model and non-model type.
pub fn mark_required_fields(graph: &mut ModelGraph, handle_list_nullability_transparently: bool) {
    for arena in [&mut graph.models, &mut graph.non_models] {
        for id in arena.ids() {
            for field in arena[id].fields.iter_mut() {
                field.is_required = field.is_required_field(handle_list_nullability_transparently);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_raw, config_with};
    use multiplatform_test::multiplatform_test;

    #[multiplatform_test]
    fn synthesizes_managed_id() {
        let graph = build_raw(
            r#"
            type Post @model {
              title: String!
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap();

        let post = graph.model("Post").unwrap();
        let names: Vec<_> = post.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "title", "createdAt", "updatedAt"]);

        let id = &post.fields[0];
        assert!(!id.is_nullable);
        assert_eq!(
            id.primary_key_info,
            Some(PrimaryKeyInfo {
                primary_key_type: PrimaryKeyType::ManagedId,
                sort_key_fields: vec![],
            })
        );
    }

    #[multiplatform_test]
    fn explicit_nullable_id_becomes_required_and_first() {
        let graph = build_raw(
            r#"
            type Post @model {
              title: String!
              id: ID
            }
            "#,
            &GeneratorConfig::default(),
        )
        .unwrap();

        let post = graph.model("Post").unwrap();
        assert_eq!(post.fields[0].name, "id");
        assert!(!post.fields[0].is_nullable);
    }

    #[multiplatform_test]
    fn rejects_non_id_typed_id() {
        let err = build_raw(
            r#"
            type Post @model {
              id: String!
            }
            "#,
            &GeneratorConfig::default(),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "id field on Post should be of type ID");
    }

    #[multiplatform_test]
    fn custom_primary_key() {
        let graph = build_raw(
            r#"
            type Comment @model {
              content: String!
              postID: ID! @primaryKey(sortKeyFields: ["content"])
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap();

        let comment = graph.model("Comment").unwrap();
        assert!(!comment.has_field("id"));
        assert_eq!(
            comment.field("postID").unwrap().primary_key_info,
            Some(PrimaryKeyInfo {
                primary_key_type: PrimaryKeyType::CustomId,
                sort_key_fields: vec!["content".to_string()],
            })
        );
        let components: Vec<_> = comment
            .primary_key_component_fields()
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(components, vec!["postID", "content"]);
    }

    #[multiplatform_test]
    fn explicit_id_primary_key_is_optionally_managed() {
        let graph = build_raw(
            r#"
            type Post @model {
              id: ID! @primaryKey
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap();

        assert_eq!(
            graph.model("Post").unwrap().fields[0]
                .primary_key_info
                .as_ref()
                .map(|info| info.primary_key_type),
            Some(PrimaryKeyType::OptionallyManagedId)
        );
    }

    #[multiplatform_test]
    fn legacy_key_designates_primary_key() {
        let graph = build_raw(
            r#"
            type Item @model @key(fields: ["orderId", "itemId"]) {
              orderId: ID!
              itemId: ID!
            }
            "#,
            &GeneratorConfig::default(),
        )
        .unwrap();

        let item = graph.model("Item").unwrap();
        assert!(!item.has_field("id"));
        assert_eq!(
            item.field("orderId").unwrap().primary_key_info,
            Some(PrimaryKeyInfo {
                primary_key_type: PrimaryKeyType::CustomId,
                sort_key_fields: vec!["itemId".to_string()],
            })
        );
    }

    #[multiplatform_test]
    fn primary_key_errors() {
        let err = build_raw(
            r#"
            type Post @model {
              postId: ID! @primaryKey(sortKeyFields: ["missing"])
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Cannot find primary key field missing in type Post");

        let err = build_raw(
            r#"
            type Post @model {
              postId: ID @primaryKey
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The primary key on type 'Post' must reference non-null fields."
        );
    }

    #[multiplatform_test]
    fn timestamps() {
        let graph = build_raw(
            r#"
            type Renamed @model(timestamps: { createdAt: "createdOn" }) {
              id: ID!
            }
            type Disabled @model(timestamps: null) {
              id: ID!
            }
            type Declared @model {
              id: ID!
              createdAt: AWSDateTime!
            }
            "#,
            &GeneratorConfig::default(),
        )
        .unwrap();

        let renamed = graph.model("Renamed").unwrap();
        let created_on = renamed.field("createdOn").unwrap();
        assert!(created_on.is_read_only);
        assert!(created_on.is_nullable);
        assert_eq!(created_on.type_name, "AWSDateTime");
        assert!(renamed.has_field("updatedAt"));

        assert_eq!(graph.model("Disabled").unwrap().fields.len(), 1);

        let declared = graph.model("Declared").unwrap();
        assert!(!declared.field("createdAt").unwrap().is_nullable);
        assert!(!declared.field("createdAt").unwrap().is_read_only);

        let graph = build_raw(
            "type Post @model { id: ID! }",
            &config_with(|c| c.is_timestamp_fields_added = false),
        )
        .unwrap();
        assert_eq!(graph.model("Post").unwrap().fields.len(), 1);
    }
}
