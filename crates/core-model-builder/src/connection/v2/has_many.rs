// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use core_model::{
    connection::{ConnectionInfo, HasManyConnection},
    directive::{Directive, HasManyArgs, KeyArgs},
    graph::ModelGraph,
    types::{Field, ID_FIELD, Model},
};

use super::{PipelinedConnectionResolver, child_reciprocals, keys, pick_reciprocal};
use crate::{
    connection::{Resolution, connected_model},
    error::ModelBuildingError,
    naming::{connection_attribute_names, has_many_key_name},
};

pub(super) fn resolve(
    resolver: &PipelinedConnectionResolver,
    field: &Field,
    args: &HasManyArgs,
    model: &Model,
    graph: &ModelGraph,
) -> Result<Resolution, ModelBuildingError> {
    if !field.is_list {
        return Err(ModelBuildingError::Generic(
            "A field with hasMany must be a list type".to_string(),
        ));
    }

    let child = connected_model(field, model, graph)?;

    if !args.references.is_empty() {
        let reciprocal = pick_reciprocal(
            field,
            model,
            child_reciprocals(resolver, field, model, child),
            |candidate| {
                candidate
                    .belongs_to_args()
                    .is_some_and(|belongs_to| belongs_to.references == args.references)
            },
        )?;
        let associated_with = match reciprocal {
            Some(reciprocal) if resolver.use_model_name_as_associated_with => reciprocal.name.clone(),
            _ => args.references[0].clone(),
        };
        return Ok(has_many(child, associated_with, args.references.clone(), false));
    }

    if let Some(index_name) = &args.index_name {
        let (index_field, index) = child.index_field(index_name).ok_or_else(|| {
            ModelBuildingError::Generic(format!(
                "Error processing @hasMany directive on {}.{}, @index directive with name {index_name} was not found in connected model {}",
                model.name, field.name, child.name
            ))
        })?;
        let key_fields = std::iter::once(index_field.name.clone())
            .chain(index.sort_key_fields.iter().cloned())
            .collect();
        return Ok(explicit_fields(resolver, args, model, child, key_fields));
    }

    if !args.fields.is_empty() {
        let key_fields = child.identifier_component_names();
        return Ok(explicit_fields(resolver, args, model, child, key_fields));
    }

    implicit_fields(resolver, field, model, child)
}

/// `fields` (optionally with `indexName`) name this model's values that match `key_fields` of
/// the child, in order.
fn explicit_fields(
    resolver: &PipelinedConnectionResolver,
    args: &HasManyArgs,
    model: &Model,
    child: &Model,
    mut key_fields: Vec<String>,
) -> Resolution {
    if !args.fields.is_empty() {
        key_fields.truncate(args.fields.len());
    }

    let first = key_fields.first().cloned().unwrap_or_else(|| ID_FIELD.to_string());
    let associated_with = child
        .fields
        .iter()
        .find(|f| {
            f.type_name == model.name
                && f.belongs_to_args()
                    .is_some_and(|belongs_to| belongs_to.fields.first() == Some(&first))
        })
        .map_or(first, |f| f.name.clone());

    let associated_with_fields = if resolver.respect_primary_key {
        key_fields
    } else {
        vec![]
    };
    has_many(child, associated_with, associated_with_fields, false)
}

/// No arguments: pair with a `@belongsTo` on the child, or add implicit foreign keys to it.
fn implicit_fields(
    resolver: &PipelinedConnectionResolver,
    field: &Field,
    model: &Model,
    child: &Model,
) -> Result<Resolution, ModelBuildingError> {
    let components = keys::key_components(model, resolver.respect_primary_key);
    let implicit_names =
        connection_attribute_names(&model.name, &field.name, &keys::component_names(&components));

    let reciprocal = pick_reciprocal(
        field,
        model,
        child_reciprocals(resolver, field, model, child),
        |candidate| {
            candidate
                .belongs_to_args()
                .is_some_and(|belongs_to| belongs_to.fields == implicit_names)
        },
    )?;

    let associated_with_fields = |names: Vec<String>| {
        if resolver.respect_primary_key {
            names
        } else {
            vec![]
        }
    };

    if let Some(reciprocal) = reciprocal {
        let foreign_keys = match reciprocal.belongs_to_args() {
            Some(belongs_to) if !belongs_to.fields.is_empty() => belongs_to.fields.clone(),
            _ => implicit_names,
        };
        let associated_with = if resolver.use_model_name_as_associated_with {
            reciprocal.name.clone()
        } else {
            foreign_keys[0].clone()
        };
        // Declared foreign keys stay as they are; implicit ones are added to the child
        let foreign_key_fields = keys::typed_fields(&foreign_keys, &components, true);
        return Ok(has_many(
            child,
            associated_with,
            associated_with_fields(foreign_keys),
            true,
        )
        .with_fields(&child.name, foreign_key_fields));
    }

    let foreign_keys = keys::foreign_key_fields(&model.name, &field.name, &components, true);
    let key = KeyArgs {
        name: Some(has_many_key_name(&child.name, &implicit_names[0])),
        fields: if resolver.respect_primary_key {
            implicit_names.clone()
        } else {
            vec![implicit_names[0].clone()]
        },
        query_field: None,
    };

    let mut resolution = has_many(
        child,
        implicit_names[0].clone(),
        associated_with_fields(implicit_names),
        true,
    )
    .with_fields(&child.name, foreign_keys);
    resolution
        .synthesized_directives
        .push((child.name.clone(), Directive::Key(key)));
    Ok(resolution)
}

fn has_many(
    child: &Model,
    associated_with: String,
    associated_with_fields: Vec<String>,
    is_connecting_field_auto_created: bool,
) -> Resolution {
    Resolution::new(ConnectionInfo::HasMany(HasManyConnection {
        connected_model: child.name.clone(),
        associated_with,
        associated_with_fields,
        is_connecting_field_auto_created,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{connection_of, resolve};
    use crate::{config::GeneratorConfig, test_support::config_with};
    use core_model::{
        connection::{ConnectionInfo, HasManyConnection},
        directive::KeyArgs,
    };
    use multiplatform_test::multiplatform_test;

    #[multiplatform_test]
    fn unidirectional_synthesizes_foreign_key() {
        let graph = resolve(
            r#"
            type Post @model {
              id: ID!
              comments: [Comment] @hasMany
            }
            type Comment @model {
              id: ID!
              content: String
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap();

        assert_eq!(
            connection_of(&graph, "Post", "comments"),
            &ConnectionInfo::HasMany(HasManyConnection {
                connected_model: "Comment".to_string(),
                associated_with: "postCommentsId".to_string(),
                associated_with_fields: vec![],
                is_connecting_field_auto_created: true,
            })
        );

        let comment = graph.model("Comment").unwrap();
        let foreign_key = comment.field("postCommentsId").unwrap();
        assert_eq!(foreign_key.type_name, "ID");
        assert!(foreign_key.is_nullable);
        assert_eq!(
            comment.named_key_directive("gsi-Comment.postCommentsId"),
            Some(&KeyArgs {
                name: Some("gsi-Comment.postCommentsId".to_string()),
                fields: vec!["postCommentsId".to_string()],
                query_field: None,
            })
        );
    }

    #[multiplatform_test]
    fn unidirectional_composite_key() {
        let graph = resolve(
            r#"
            type Warehouse @model {
              warehouseId: ID! @primaryKey(sortKeyFields: ["region"])
              region: String!
              bars: [Bar] @hasMany
            }
            type Bar @model {
              id: ID!
            }
            "#,
            &config_with(|c| {
                c.use_pipelined_transformer = true;
                c.respect_primary_key_attributes_on_connection_field = true;
            }),
        )
        .unwrap();

        let bars = connection_of(&graph, "Warehouse", "bars").as_has_many().unwrap();
        assert_eq!(bars.associated_with, "warehouseBarsWarehouseId");
        assert_eq!(
            bars.associated_with_fields,
            vec!["warehouseBarsWarehouseId", "warehouseBarsRegion"]
        );

        let bar = graph.model("Bar").unwrap();
        assert_eq!(bar.field("warehouseBarsRegion").unwrap().type_name, "String");
        assert_eq!(
            bar.named_key_directive("gsi-Bar.warehouseBarsWarehouseId")
                .map(|key| key.fields.clone()),
            Some(vec![
                "warehouseBarsWarehouseId".to_string(),
                "warehouseBarsRegion".to_string()
            ])
        );
    }

    #[multiplatform_test]
    fn model_name_as_associated_with() {
        let schema = r#"
            type Post @model {
              id: ID!
              comments: [Comment] @hasMany
            }
            type Comment @model {
              id: ID!
              post: Post @belongsTo
            }
        "#;

        let graph = resolve(schema, &GeneratorConfig::pipelined()).unwrap();
        let comments = connection_of(&graph, "Post", "comments").as_has_many().unwrap();
        assert_eq!(comments.associated_with, "postCommentsId");
        let foreign_key = graph.model("Comment").unwrap().field("postCommentsId").unwrap();
        assert_eq!(foreign_key.type_name, "ID");
        assert!(foreign_key.is_nullable);

        let graph = resolve(
            schema,
            &config_with(|c| {
                c.use_pipelined_transformer = true;
                c.use_model_name_as_associated_with = true;
            }),
        )
        .unwrap();
        let comments = connection_of(&graph, "Post", "comments").as_has_many().unwrap();
        assert_eq!(comments.associated_with, "post");
        assert!(!graph.model("Comment").unwrap().has_field("postCommentsId"));
    }

    #[multiplatform_test]
    fn references_pair_with_belongs_to() {
        let schema = r#"
            type Post @model {
              id: ID!
              comments: [Comment] @hasMany(references: ["postId"])
            }
            type Comment @model {
              id: ID!
              postId: ID!
              post: Post @belongsTo(references: ["postId"])
            }
        "#;

        let graph = resolve(schema, &GeneratorConfig::pipelined()).unwrap();
        assert_eq!(
            connection_of(&graph, "Post", "comments"),
            &ConnectionInfo::HasMany(HasManyConnection {
                connected_model: "Comment".to_string(),
                associated_with: "postId".to_string(),
                associated_with_fields: vec!["postId".to_string()],
                is_connecting_field_auto_created: false,
            })
        );
        assert!(graph.model("Comment").unwrap().has_field("postId"));

        let graph = resolve(
            schema,
            &config_with(|c| {
                c.use_pipelined_transformer = true;
                c.use_model_name_as_associated_with = true;
            }),
        )
        .unwrap();
        let comments = connection_of(&graph, "Post", "comments").as_has_many().unwrap();
        assert_eq!(comments.associated_with, "post");
        assert_eq!(comments.associated_with_fields, vec!["postId"]);
    }

    #[multiplatform_test]
    fn named_primary_key_components() {
        let graph = resolve(
            r#"
            type Warehouse @model @key(name: "byRegion", fields: ["region"]) {
              warehouseId: ID! @primaryKey(name: "byWarehouse", sortKeyFields: ["region"])
              region: String!
              bars: [Bar] @hasMany
            }
            type Bar @model {
              id: ID!
            }
            "#,
            &config_with(|c| {
                c.use_pipelined_transformer = true;
                c.respect_primary_key_attributes_on_connection_field = true;
            }),
        )
        .unwrap();

        let bars = connection_of(&graph, "Warehouse", "bars").as_has_many().unwrap();
        assert_eq!(
            bars.associated_with_fields,
            vec!["warehouseBarsWarehouseId", "warehouseBarsRegion"]
        );
    }

    #[multiplatform_test]
    fn index_with_sort_keys() {
        let graph = resolve(
            r#"
            type Customer @model {
              id: ID!
              name: String!
              orders: [Order] @hasMany(indexName: "byCustomer", fields: ["id", "name"])
            }
            type Order @model {
              id: ID!
              customerID: ID! @index(name: "byCustomer", sortKeyFields: ["customerName", "createdAt"])
              customerName: String!
              createdAt: AWSDateTime!
            }
            "#,
            &config_with(|c| {
                c.use_pipelined_transformer = true;
                c.respect_primary_key_attributes_on_connection_field = true;
            }),
        )
        .unwrap();

        let orders = connection_of(&graph, "Customer", "orders").as_has_many().unwrap();
        assert_eq!(orders.associated_with, "customerID");
        assert_eq!(orders.associated_with_fields, vec!["customerID", "customerName"]);
        assert!(!orders.is_connecting_field_auto_created);
    }

    #[multiplatform_test]
    fn invalid_has_many() {
        let err = resolve(
            r#"
            type Post @model {
              id: ID!
              comment: Comment @hasMany
            }
            type Comment @model {
              id: ID!
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "A field with hasMany must be a list type");

        let err = resolve(
            r#"
            type Post @model {
              id: ID!
              comments: [Comment] @hasMany(indexName: "byPost", fields: ["id"])
            }
            type Comment @model {
              id: ID!
              postID: ID!
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error processing @hasMany directive on Post.comments, @index directive with name byPost was not found in connected model Comment"
        );
    }
}
