// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolution of `@hasOne`, `@hasMany`, and `@belongsTo`.
//!
//! Unlike the legacy dialect, a relationship here may reference a composite primary key. When
//! `respect_primary_key` is set, every foreign key is derived per key component of the
//! referenced model; otherwise a single `id` component is assumed.

mod belongs_to;
mod has_many;
mod has_one;
mod keys;

use std::collections::HashSet;

use core_model::{
    connection::ConnectionInfo,
    directive::{BelongsToArgs, Directive},
    graph::ModelGraph,
    types::{Field, Model},
};

use super::{ConnectionResolver, Resolution, remove_target_field};
use crate::{config::GeneratorConfig, error::ModelBuildingError, naming::connection_attribute_names};

pub struct PipelinedConnectionResolver {
    respect_primary_key: bool,
    use_model_name_as_associated_with: bool,
    use_fields_in_associated_with_in_has_one: bool,
}

impl PipelinedConnectionResolver {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            respect_primary_key: config.respect_primary_key_attributes_on_connection_field,
            use_model_name_as_associated_with: config.use_model_name_as_associated_with,
            use_fields_in_associated_with_in_has_one: config
                .should_use_fields_in_associated_with_in_has_one,
        }
    }
}

impl ConnectionResolver for PipelinedConnectionResolver {
    fn resolve(
        &self,
        field: &Field,
        model: &Model,
        graph: &ModelGraph,
    ) -> Result<Option<Resolution>, ModelBuildingError> {
        let resolution = field.directives.iter().find_map(|directive| match directive {
            Directive::HasOne(args) => Some(has_one::resolve(self, field, args, model, graph)),
            Directive::HasMany(args) => Some(has_many::resolve(self, field, args, model, graph)),
            Directive::BelongsTo(args) => {
                Some(belongs_to::resolve(self, field, args, model, graph))
            }
            _ => None,
        });

        resolution.transpose()
    }

    /// Drops the `belongsTo` foreign key scalars, which the relationship fields stand for. A
    /// scalar that a `hasMany` or `hasOne` names as its associated field stays.
    fn finalize(&self, graph: &mut ModelGraph) {
        let associated: HashSet<(String, String)> = graph
            .models
            .values()
            .flat_map(|model| model.fields.iter())
            .filter_map(|f| match f.connection_info.as_ref()? {
                ConnectionInfo::HasMany(c) => Some((
                    &c.connected_model,
                    &c.associated_with,
                    &c.associated_with_fields,
                )),
                ConnectionInfo::HasOne(c) => Some((
                    &c.connected_model,
                    &c.associated_with,
                    &c.associated_with_fields,
                )),
                ConnectionInfo::BelongsTo(_) => None,
            })
            .flat_map(|(connected_model, associated_with, associated_with_fields)| {
                std::iter::once(associated_with)
                    .chain(associated_with_fields)
                    .map(move |name| (connected_model.clone(), name.clone()))
            })
            .collect();

        for id in graph.model_ids() {
            let model = &mut graph.models[id];
            let targets: Vec<(String, String)> = model
                .fields
                .iter()
                .filter_map(|f| {
                    let connection = f.connection_info.as_ref()?.as_belongs_to()?;
                    (!connection.is_using_references).then(|| {
                        connection
                            .target_names
                            .iter()
                            .map(|target| (target.clone(), f.name.clone()))
                            .collect::<Vec<_>>()
                    })
                })
                .flatten()
                .filter(|(target, _)| !associated.contains(&(model.name.clone(), target.clone())))
                .collect();

            for (target, relationship_field) in targets {
                remove_target_field(model, &target, &relationship_field);
            }
        }
    }

    fn unconnected_warning(&self, model: &Model, field: &Field) -> String {
        format!(
            "Model {} has field {} of type {} but its not connected. Add the appropriate {}/@belongsTo directive if you want to connect them.",
            model.name,
            field.name,
            field.type_name,
            if field.is_list { "@hasMany" } else { "@hasOne" }
        )
    }
}

/// Fields of `parent` that declare `@hasOne` (singular) or `@hasMany` (list) pointing at
/// `child_name`.
fn parent_fields<'a>(parent: &'a Model, child_name: &str) -> Vec<&'a Field> {
    parent
        .fields
        .iter()
        .filter(|f| {
            f.type_name == child_name
                && ((f.has_one_args().is_some() && !f.is_list)
                    || (f.has_many_args().is_some() && f.is_list))
        })
        .collect()
}

/// The `@hasOne`/`@hasMany` field of `parent` that the `@belongsTo` field of `child` pairs with.
fn belongs_to_parent<'a>(
    resolver: &PipelinedConnectionResolver,
    belongs_to: &Field,
    args: &BelongsToArgs,
    child: &Model,
    parent: &'a Model,
) -> Result<Option<&'a Field>, ModelBuildingError> {
    pick_reciprocal(
        belongs_to,
        child,
        parent_fields(parent, &child.name),
        |candidate| corresponds(resolver, args, child, candidate, parent),
    )
}

/// The `@belongsTo` fields of `child` that pair with `field` of `parent`.
fn child_reciprocals<'a>(
    resolver: &PipelinedConnectionResolver,
    field: &Field,
    parent: &Model,
    child: &'a Model,
) -> Vec<&'a Field> {
    child
        .fields
        .iter()
        .filter(|b| {
            b.type_name == parent.name
                && b.belongs_to_args().is_some_and(|args| {
                    matches!(
                        belongs_to_parent(resolver, b, args, child, parent),
                        Ok(Some(p)) if p.name == field.name
                    )
                })
        })
        .collect()
}

/// Whether a `@belongsTo` with `args` on `child` names the same foreign key as the `@hasOne` or
/// `@hasMany` field `candidate` of `parent`.
fn corresponds(
    resolver: &PipelinedConnectionResolver,
    args: &BelongsToArgs,
    child: &Model,
    candidate: &Field,
    parent: &Model,
) -> bool {
    if !args.references.is_empty() {
        let references = candidate
            .has_many_args()
            .map(|a| &a.references)
            .or_else(|| candidate.has_one_args().map(|a| &a.references));
        return references == Some(&args.references);
    }

    let Some(has_many) = candidate.has_many_args() else {
        // A hasOne keeps its foreign key on its own side
        return false;
    };
    let first_field = args.fields.first();

    if let Some(index_name) = &has_many.index_name {
        child
            .index_field(index_name)
            .is_some_and(|(index_field, _)| first_field == Some(&index_field.name))
    } else if !has_many.fields.is_empty() {
        child
            .primary_key_field()
            .is_some_and(|pk| first_field == Some(&pk.name))
    } else {
        let components = keys::key_components(parent, resolver.respect_primary_key);
        args.fields
            == connection_attribute_names(
                &parent.name,
                &candidate.name,
                &keys::component_names(&components),
            )
    }
}

/// Picks the reciprocal of `field` among `candidates`. A single candidate is taken as is;
/// several are narrowed down with `corresponds`, which must leave exactly one.
fn pick_reciprocal<'a>(
    field: &Field,
    model: &Model,
    candidates: Vec<&'a Field>,
    corresponds: impl Fn(&Field) -> bool,
) -> Result<Option<&'a Field>, ModelBuildingError> {
    if candidates.len() <= 1 {
        return Ok(candidates.into_iter().next());
    }

    let names: Vec<&str> = candidates.iter().map(|f| f.name.as_str()).collect();
    let mut matching = candidates.iter().filter(|f| corresponds(**f));
    match (matching.next(), matching.next()) {
        (Some(reciprocal), None) => Ok(Some(*reciprocal)),
        _ => Err(ModelBuildingError::Generic(format!(
            "Ambiguous relationship on {}.{}: fields {} of {} all point back to {}. Use 'fields' or 'references' so that exactly one of them matches.",
            model.name,
            field.name,
            names.join(", "),
            field.type_name,
            model.name
        ))),
    }
}

impl Resolution {
    fn with_fields(mut self, model_name: &str, fields: Vec<Field>) -> Self {
        self.synthesized_fields
            .extend(fields.into_iter().map(|f| (model_name.to_string(), f)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connection::connect,
        test_support::{build_raw, config_with},
        diagnostics::Diagnostics,
        validator::validate,
    };
    use core_model::connection::{
        BelongsToConnection, ConnectionInfo, ConnectionKind, HasManyConnection,
    };
    use multiplatform_test::multiplatform_test;

    pub(super) fn resolve(
        schema: &str,
        config: &GeneratorConfig,
    ) -> Result<ModelGraph, ModelBuildingError> {
        let mut graph = build_raw(schema, config)?;
        crate::key_resolver::resolve_keys(&mut graph);
        connect(&mut graph, &PipelinedConnectionResolver::new(config))?;
        Ok(graph)
    }

    pub(super) fn connection_of<'a>(
        graph: &'a ModelGraph,
        model: &str,
        field: &str,
    ) -> &'a ConnectionInfo {
        graph
            .model(model)
            .and_then(|m| m.field(field))
            .and_then(|f| f.connection_info.as_ref())
            .unwrap()
    }

    #[multiplatform_test]
    fn bidirectional_relationships_are_symmetric() {
        let graph = resolve(
            r#"
            type Post @model {
              id: ID!
              comments: [Comment] @hasMany
              meta: PostMeta @hasOne
            }
            type Comment @model {
              id: ID!
              post: Post @belongsTo
            }
            type PostMeta @model {
              id: ID!
              post: Post @belongsTo
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap();

        for (parent, child) in [(("Post", "comments"), ("Comment", "post")), (("Post", "meta"), ("PostMeta", "post"))] {
            let parent_connection = connection_of(&graph, parent.0, parent.1);
            let child_connection = connection_of(&graph, child.0, child.1);

            assert_eq!(parent_connection.connected_model(), child.0);
            assert_eq!(child_connection.connected_model(), parent.0);
            assert_ne!(parent_connection.kind(), ConnectionKind::BelongsTo);
            assert_eq!(child_connection.kind(), ConnectionKind::BelongsTo);
        }
    }

    #[multiplatform_test]
    fn explicit_fields_with_composite_child_key() {
        let graph = resolve(
            r#"
            type Post @model {
              comments: [Comment] @hasMany(fields: ["id"])
            }
            type Comment @model {
              postID: ID! @primaryKey(sortKeyFields: ["content"])
              content: String!
              post: Post @belongsTo(fields: ["postID"])
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap();

        assert_eq!(
            connection_of(&graph, "Comment", "post"),
            &ConnectionInfo::BelongsTo(BelongsToConnection {
                connected_model: "Post".to_string(),
                target_name: "postID".to_string(),
                target_names: vec!["postID".to_string()],
                is_connecting_field_auto_created: false,
                is_using_references: false,
            })
        );
        assert_eq!(
            connection_of(&graph, "Post", "comments"),
            &ConnectionInfo::HasMany(HasManyConnection {
                connected_model: "Comment".to_string(),
                associated_with: "post".to_string(),
                associated_with_fields: vec![],
                is_connecting_field_auto_created: false,
            })
        );

        // Part of the primary key, so the target survives
        assert!(graph.model("Comment").unwrap().has_field("postID"));
    }

    #[multiplatform_test]
    fn belongs_to_targets_are_pruned() {
        let graph = resolve(
            r#"
            type Post @model {
              id: ID!
              comments: [Comment] @hasMany(indexName: "byPost", fields: ["id"])
            }
            type Comment @model {
              id: ID!
              postID: ID! @index(name: "byPost")
              post: Post @belongsTo(fields: ["postID"])
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap();

        let comment = graph.model("Comment").unwrap();
        assert!(!comment.has_field("postID"));
        assert_eq!(
            connection_of(&graph, "Post", "comments")
                .as_has_many()
                .map(|c| c.associated_with.as_str()),
            Some("post")
        );
    }

    #[multiplatform_test]
    fn same_type_relationships_resolve_independently() {
        let graph = resolve(
            r#"
            type Match @model {
              id: ID!
              homeTeam: Team @hasOne(references: ["homeMatchId"])
              awayTeam: Team @hasOne(references: ["awayMatchId"])
            }
            type Team @model {
              id: ID!
              homeMatchId: ID
              awayMatchId: ID
              homeMatch: Match @belongsTo(references: ["homeMatchId"])
              awayMatch: Match @belongsTo(references: ["awayMatchId"])
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap();

        let home = connection_of(&graph, "Match", "homeTeam").as_has_one().unwrap();
        assert_eq!(home.associated_with, "homeMatch");
        assert_eq!(home.associated_with_fields, vec!["homeMatchId"]);
        assert_eq!(home.target_name, "id");
        assert_eq!(home.target_names, vec!["id"]);
        let away = connection_of(&graph, "Match", "awayTeam").as_has_one().unwrap();
        assert_eq!(away.associated_with, "awayMatch");

        let home_match = connection_of(&graph, "Team", "homeMatch").as_belongs_to().unwrap();
        assert_eq!(home_match.target_names, vec!["homeMatchId"]);
        assert!(home_match.is_using_references);

        // Referenced fields stay
        let team = graph.model("Team").unwrap();
        assert!(team.has_field("homeMatchId"));
        assert!(team.has_field("awayMatchId"));
    }

    #[multiplatform_test]
    fn ambiguous_reciprocal_is_an_error() {
        let err = resolve(
            r#"
            type Team @model {
              id: ID!
              members: [Member] @hasMany
              alumni: [Member] @hasMany
            }
            type Member @model {
              id: ID!
              team: Team @belongsTo
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Ambiguous relationship on Member.team: fields members, alumni of Team all point back to Member. Use 'fields' or 'references' so that exactly one of them matches."
        );
    }

    #[multiplatform_test]
    fn disambiguates_by_foreign_key_name() {
        let graph = resolve(
            r#"
            type Team @model {
              id: ID!
              members: [Member] @hasMany
              alumni: [Member] @hasMany
            }
            type Member @model {
              id: ID!
              team: Team @belongsTo(fields: ["teamMembersId"])
            }
            "#,
            &GeneratorConfig::pipelined(),
        )
        .unwrap();

        assert_eq!(
            connection_of(&graph, "Member", "team").as_belongs_to().unwrap().target_name,
            "teamMembersId"
        );
        assert_eq!(
            connection_of(&graph, "Team", "members").as_has_many().unwrap().associated_with,
            "teamMembersId"
        );
        assert_eq!(
            connection_of(&graph, "Team", "alumni").as_has_many().unwrap().associated_with,
            "teamAlumniId"
        );
    }

    #[multiplatform_test]
    fn unconnected_fields_are_pruned_with_a_warning() {
        let config = config_with(|c| c.use_pipelined_transformer = true);
        let mut graph = resolve(
            r#"
            type Post @model {
              id: ID!
              author: User
              editors: [User]
            }
            type User @model {
              id: ID!
            }
            "#,
            &config,
        )
        .unwrap();

        let resolver = PipelinedConnectionResolver::new(&config);
        let mut diagnostics = Diagnostics::default();
        validate(&mut graph, &resolver, &mut diagnostics);

        let post = graph.model("Post").unwrap();
        assert!(!post.has_field("author"));
        assert!(!post.has_field("editors"));

        let messages: Vec<_> = diagnostics.warnings().iter().map(|w| w.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Model Post has field author of type User but its not connected. Add the appropriate @hasOne/@belongsTo directive if you want to connect them.",
                "Model Post has field editors of type User but its not connected. Add the appropriate @hasMany/@belongsTo directive if you want to connect them.",
            ]
        );
    }
}
