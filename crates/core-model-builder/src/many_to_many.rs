// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Expand `@manyToMany` pairs into a join model and two `@hasMany` relationships.
//!
//! For `Post.tags: [Tag] @manyToMany(relationName: "PostTags")` and the matching field on `Tag`,
//! this synthesizes
//!
//! ```graphql
//! type PostTags @model {
//!   id: ID!
//!   postID: ID! @index(name: "byPost", sortKeyFields: ["tagID"])
//!   tagID: ID! @index(name: "byTag", sortKeyFields: ["postID"])
//!   post: Post! @belongsTo(fields: ["postID"])
//!   tag: Tag! @belongsTo(fields: ["tagID"])
//! }
//! ```
//!
//! and rewrites `Post.tags` to `[PostTags] @hasMany(indexName: "byPost", fields: ["id"])`.

use indexmap::IndexMap;

use core_model::{
    directive::{BelongsToArgs, Directive, HasManyArgs, IndexArgs, ModelArgs},
    graph::ModelGraph,
    types::{Field, ID_FIELD, ID_TYPE, Model, ModelKind},
};

use crate::{
    config::GeneratorConfig,
    error::ModelBuildingError,
    naming::{ToJoinFieldName, join_index_name, join_model_name},
    normalization::normalize_model,
};

struct ManyToManyContext {
    model: String,
    field: String,
    relation_name: String,
}

/// One side of a join model: the referenced model and the join model fields holding its key.
struct JoinSide {
    model: String,
    reference_field: String,
    /// (join model field name, type) per key component of `model`
    key_fields: Vec<(String, String)>,
    /// Key component names on `model` itself
    key_components: Vec<String>,
}

pub fn expand_many_to_many(
    graph: &mut ModelGraph,
    config: &GeneratorConfig,
) -> Result<(), ModelBuildingError> {
    let mut relations: IndexMap<String, Vec<ManyToManyContext>> = IndexMap::new();

    for model in graph.models.values() {
        for field in model.fields.iter() {
            if let Some(args) = field.many_to_many_args() {
                relations
                    .entry(join_model_name(&args.relation_name))
                    .or_default()
                    .push(ManyToManyContext {
                        model: model.name.clone(),
                        field: field.name.clone(),
                        relation_name: args.relation_name.clone(),
                    });
            }
        }
    }

    for (join_name, contexts) in relations {
        let [first, second] = contexts.as_slice() else {
            return Err(ModelBuildingError::Generic(format!(
                "Error for relation: '{}', there should be two matching manyToMany directives and found: {}",
                contexts[0].relation_name,
                contexts.len()
            )));
        };

        if graph.models.contains_key(&join_name) || graph.non_models.contains_key(&join_name) {
            return Err(ModelBuildingError::Generic(format!(
                "Model {join_name} generated for relation '{}' conflicts with an existing type",
                first.relation_name
            )));
        }

        let first_side = join_side(graph, &first.model, config)?;
        let second_side = join_side(graph, &second.model, config)?;

        let mut join_model = intermediate_model(&join_name, &first_side, &second_side);
        normalize_model(&mut join_model, config)?;
        tracing::debug!(model = %join_name, "synthesized join model");
        graph.models.add(&join_name, join_model);

        convert_many_to_many_field(graph, first, &join_name, &first_side.key_components)?;
        convert_many_to_many_field(graph, second, &join_name, &second_side.key_components)?;
    }

    Ok(())
}

fn join_side(
    graph: &ModelGraph,
    model_name: &str,
    config: &GeneratorConfig,
) -> Result<JoinSide, ModelBuildingError> {
    let model = graph.model(model_name).ok_or_else(|| {
        ModelBuildingError::Generic(format!("Unknown model {model_name} in manyToMany relation"))
    })?;

    let components = model.primary_key_component_fields();
    let components: Vec<&Field> = if config.respect_primary_key_attributes_on_connection_field {
        components
    } else {
        components.into_iter().take(1).collect()
    };

    let key_fields = if config.respect_primary_key_attributes_on_connection_field {
        components
            .iter()
            .enumerate()
            .map(|(i, f)| (model_name.join_key_field(&f.name, i == 0), f.type_name.clone()))
            .collect()
    } else {
        vec![(model_name.join_key_field(ID_FIELD, true), ID_TYPE.to_string())]
    };

    let key_components = match components.as_slice() {
        [] => vec![ID_FIELD.to_string()],
        components => components.iter().map(|f| f.name.clone()).collect(),
    };

    Ok(JoinSide {
        model: model_name.to_string(),
        reference_field: model_name.join_reference_field(),
        key_fields,
        key_components,
    })
}

fn intermediate_model(join_name: &str, first: &JoinSide, second: &JoinSide) -> Model {
    let mut model = Model::new(join_name, ModelKind::Model);
    model.directives.push(Directive::Model(ModelArgs::default()));
    model.fields.push(Field::scalar(ID_FIELD, ID_TYPE, false));

    for (side, other) in [(first, second), (second, first)] {
        for (i, (name, type_name)) in side.key_fields.iter().enumerate() {
            let mut field = Field::scalar(name, type_name, false);
            if i == 0 {
                let sort_key_fields = side.key_fields[1..]
                    .iter()
                    .chain(other.key_fields.first())
                    .map(|(name, _)| name.clone())
                    .collect();
                field.directives.push(Directive::Index(IndexArgs {
                    name: Some(join_index_name(&side.model)),
                    sort_key_fields,
                    query_field: None,
                }));
            }
            model.fields.push(field);
        }
    }

    for side in [first, second] {
        model.fields.push(
            Field::scalar(&side.reference_field, &side.model, false).with_directive(
                Directive::BelongsTo(BelongsToArgs {
                    fields: side.key_fields.iter().map(|(name, _)| name.clone()).collect(),
                    references: vec![],
                }),
            ),
        );
    }

    model
}

fn convert_many_to_many_field(
    graph: &mut ModelGraph,
    context: &ManyToManyContext,
    join_name: &str,
    key_components: &[String],
) -> Result<(), ModelBuildingError> {
    let field = graph
        .model_mut(&context.model)
        .and_then(|model| model.field_mut(&context.field))
        .ok_or_else(|| {
            ModelBuildingError::Generic(format!(
                "Field {}.{} disappeared during manyToMany expansion",
                context.model, context.field
            ))
        })?;

    let position = field
        .directives
        .iter()
        .position(|d| matches!(d, Directive::ManyToMany(_)))
        .ok_or_else(|| {
            ModelBuildingError::Generic(
                "manyToMany directive not found on manyToMany field".to_string(),
            )
        })?;

    field.directives.remove(position);
    field.type_name = join_name.to_string();
    field.directives.push(Directive::HasMany(HasManyArgs {
        index_name: Some(join_index_name(&context.model)),
        fields: key_components.to_vec(),
        ..Default::default()
    }));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{build_raw, config_with};
    use multiplatform_test::multiplatform_test;

    const POST_TAGS: &str = r#"
        type Post @model {
          id: ID!
          title: String!
          tags: [Tag] @manyToMany(relationName: "PostTags")
        }

        type Tag @model {
          id: ID!
          label: String!
          posts: [Post] @manyToMany(relationName: "PostTags")
        }
    "#;

    fn field_names(model: &Model) -> Vec<&str> {
        model.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[multiplatform_test]
    fn synthesizes_join_model() {
        let config = config_with(|c| {
            c.use_pipelined_transformer = true;
            c.is_timestamp_fields_added = false;
        });
        let mut graph = build_raw(POST_TAGS, &config).unwrap();
        expand_many_to_many(&mut graph, &config).unwrap();

        assert_eq!(graph.models.keys().collect::<Vec<_>>(), vec!["Post", "Tag", "PostTags"]);

        let join = graph.model("PostTags").unwrap();
        assert_eq!(field_names(join), vec!["id", "postID", "tagID", "post", "tag"]);
        assert!(join.model_directive().is_some());

        let post_id = join.field("postID").unwrap();
        assert_eq!(post_id.type_name, "ID");
        assert!(!post_id.is_nullable);
        assert_eq!(
            post_id.index_args().next(),
            Some(&IndexArgs {
                name: Some("byPost".to_string()),
                sort_key_fields: vec!["tagID".to_string()],
                query_field: None,
            })
        );
        assert_eq!(
            join.field("tagID").unwrap().index_args().next().unwrap().sort_key_fields,
            vec!["postID"]
        );

        let post = join.field("post").unwrap();
        assert_eq!(post.type_name, "Post");
        assert!(!post.is_nullable);
        assert_eq!(post.belongs_to_args().unwrap().fields, vec!["postID"]);

        assert!(join.field("id").unwrap().primary_key_info.is_some());
    }

    #[multiplatform_test]
    fn rewrites_fields_to_has_many() {
        let config = GeneratorConfig::pipelined();
        let mut graph = build_raw(POST_TAGS, &config).unwrap();
        expand_many_to_many(&mut graph, &config).unwrap();

        let tags = graph.model("Post").unwrap().field("tags").unwrap();
        assert_eq!(tags.type_name, "PostTags");
        assert!(tags.many_to_many_args().is_none());
        assert_eq!(
            tags.has_many_args(),
            Some(&HasManyArgs {
                index_name: Some("byPost".to_string()),
                fields: vec!["id".to_string()],
                ..Default::default()
            })
        );

        let posts = graph.model("Tag").unwrap().field("posts").unwrap();
        assert_eq!(posts.type_name, "PostTags");
        assert_eq!(posts.has_many_args().unwrap().index_name.as_deref(), Some("byTag"));

        let join = graph.model("PostTags").unwrap();
        assert!(join.has_field("createdAt"));
        assert!(join.has_field("updatedAt"));
    }

    #[multiplatform_test]
    fn requires_exactly_two_sides() {
        let config = GeneratorConfig::pipelined();
        let mut graph = build_raw(
            r#"
            type Post @model {
              id: ID!
              tags: [Tag] @manyToMany(relationName: "PostTags")
            }
            type Tag @model {
              id: ID!
            }
            "#,
            &config,
        )
        .unwrap();

        let err = expand_many_to_many(&mut graph, &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error for relation: 'PostTags', there should be two matching manyToMany directives and found: 1"
        );
    }

    #[multiplatform_test]
    fn uses_composite_keys_when_respected() {
        let config = config_with(|c| {
            c.use_pipelined_transformer = true;
            c.respect_primary_key_attributes_on_connection_field = true;
            c.is_timestamp_fields_added = false;
        });
        let mut graph = build_raw(
            r#"
            type Enthusiast @model {
              id: ID! @primaryKey
              likes: [Like] @manyToMany(relationName: "EnthusiastLikes")
            }

            type Like @model {
              name: String! @primaryKey(sortKeyFields: ["sortKeyFieldOne", "sortKeyFieldTwo"])
              sortKeyFieldOne: String!
              sortKeyFieldTwo: String!
              enthusiasts: [Enthusiast] @manyToMany(relationName: "EnthusiastLikes")
            }
            "#,
            &config,
        )
        .unwrap();
        expand_many_to_many(&mut graph, &config).unwrap();

        let join = graph.model("EnthusiastLikes").unwrap();
        assert_eq!(
            field_names(join),
            vec![
                "id",
                "enthusiastID",
                "likeName",
                "likesortKeyFieldOne",
                "likesortKeyFieldTwo",
                "enthusiast",
                "like"
            ]
        );
        assert_eq!(join.field("likeName").unwrap().type_name, "String");
        assert_eq!(
            join.field("like").unwrap().belongs_to_args().unwrap().fields,
            vec!["likeName", "likesortKeyFieldOne", "likesortKeyFieldTwo"]
        );
        assert_eq!(
            join.field("likeName").unwrap().index_args().next().unwrap().sort_key_fields,
            vec!["likesortKeyFieldOne", "likesortKeyFieldTwo", "enthusiastID"]
        );

        let enthusiasts = graph.model("Like").unwrap().field("enthusiasts").unwrap();
        assert_eq!(
            enthusiasts.has_many_args().unwrap().fields,
            vec!["name", "sortKeyFieldOne", "sortKeyFieldTwo"]
        );
    }
}
