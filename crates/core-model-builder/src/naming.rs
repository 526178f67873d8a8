// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Names of synthesized fields, models, and keys.
//!
//! These must match the names the backend transformers generate for the same schema, since the
//! generated models read and write those attributes.

use heck::ToLowerCamelCase;

use core_model::types::ID_FIELD;

pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Joins words into one camelCase identifier. Only the first character of each word is
/// touched, so `["Project", "team", "teamId"]` becomes `projectTeamTeamId`.
pub fn to_camel_case(words: &[&str]) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            if i == 0 {
                word.to_lower_first()
            } else {
                word.to_upper_first()
            }
        })
        .collect()
}

/// The name of an implicit foreign key field: `<model><Field><Component>`, for example
/// `postCommentsId`.
pub fn connection_attribute_name(model_name: &str, field_name: &str, component: &str) -> String {
    to_camel_case(&[model_name, field_name, component])
}

/// Implicit foreign key names for every key component of the referenced model.
pub fn connection_attribute_names(
    model_name: &str,
    field_name: &str,
    components: &[String],
) -> Vec<String> {
    components
        .iter()
        .map(|component| connection_attribute_name(model_name, field_name, component))
        .collect()
}

/// Strips characters that are not valid in a GraphQL name.
pub fn graphql_name(name: &str) -> String {
    let valid: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    valid.trim_start_matches(|c: char| c.is_ascii_digit()).to_string()
}

/// Name of the model a `@manyToMany(relationName: ...)` pair expands into.
pub fn join_model_name(relation_name: &str) -> String {
    graphql_name(&relation_name.to_upper_first())
}

/// Name of the `by<Model>` index on a join model.
pub fn join_index_name(model_name: &str) -> String {
    format!("by{model_name}")
}

/// Name of the generated `hasMany` key on a model referenced by an implicit `@hasMany`.
pub fn has_many_key_name(connected_model: &str, associated_with: &str) -> String {
    format!("gsi-{connected_model}.{associated_with}")
}

pub trait ToJoinFieldName {
    /// The back-reference field of a join model: `BlogPost` becomes `blogPost`.
    fn join_reference_field(&self) -> String;

    /// The join model field holding the given key component of this model. The primary
    /// component `id` becomes `<model>ID`, every other component is appended as is.
    fn join_key_field(&self, component: &str, is_primary: bool) -> String;
}

impl ToJoinFieldName for str {
    fn join_reference_field(&self) -> String {
        self.to_lower_camel_case()
    }

    fn join_key_field(&self, component: &str, is_primary: bool) -> String {
        let prefix = self.join_reference_field();
        if is_primary && component == ID_FIELD {
            format!("{prefix}ID")
        } else if is_primary {
            format!("{prefix}{}", component.to_upper_first())
        } else {
            format!("{prefix}{component}")
        }
    }
}

pub trait ChangeFirstCase {
    fn to_upper_first(&self) -> String;
    fn to_lower_first(&self) -> String;
}

impl ChangeFirstCase for str {
    fn to_upper_first(&self) -> String {
        let mut chars = self.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    fn to_lower_first(&self) -> String {
        let mut chars = self.chars();
        match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multiplatform_test::multiplatform_test;

    #[multiplatform_test]
    fn connection_attribute_names_match_transformer() {
        assert_eq!("postCommentsId", connection_attribute_name("Post", "comments", "id"));
        assert_eq!("projectTeamTeamId", connection_attribute_name("Project", "team", "teamId"));
        assert_eq!("projectTeamName", connection_attribute_name("Project", "team", "name"));
        assert_eq!(
            "fooBarsWarehouseId",
            connection_attribute_name("Foo", "bars", "warehouseId")
        );
    }

    #[multiplatform_test]
    fn join_names() {
        assert_eq!("PostTags", join_model_name("postTags"));
        assert_eq!("PostTags", join_model_name("Post-Tags"));
        assert_eq!("byPost", join_index_name("Post"));

        assert_eq!("blogPost", "BlogPost".join_reference_field());
        assert_eq!("blogPostID", "BlogPost".join_key_field("id", true));
        assert_eq!("likeName", "Like".join_key_field("name", true));
        assert_eq!("likesortKeyFieldOne", "Like".join_key_field("sortKeyFieldOne", false));
    }

    #[multiplatform_test]
    fn has_many_key() {
        assert_eq!("gsi-Bar.fooBarsId", has_many_key_name("Bar", "fooBarsId"));
    }
}
