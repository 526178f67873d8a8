// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    connection::ConnectionInfo,
    directive::{
        BelongsToArgs, ConnectionArgs, Directive, HasManyArgs, HasOneArgs, IndexArgs, KeyArgs,
        ManyToManyArgs, ModelArgs, PrimaryKeyArgs,
    },
};

pub const ID_FIELD: &str = "id";
pub const ID_TYPE: &str = "ID";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ModelKind {
    Model,
    NonModel,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub directives: Vec<Directive>,
    pub fields: Vec<Field>,
}

impl Model {
    pub fn new(name: impl Into<String>, kind: ModelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            directives: vec![],
            fields: vec![],
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Appends `field` unless a field with the same name is already declared. Returns whether
    /// the field was added.
    pub fn add_field_if_missing(&mut self, field: Field) -> bool {
        if self.has_field(&field.name) {
            false
        } else {
            self.fields.push(field);
            true
        }
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Field> {
        let position = self.fields.iter().position(|f| f.name == name)?;
        Some(self.fields.remove(position))
    }

    pub fn model_directive(&self) -> Option<&ModelArgs> {
        self.directives.iter().find_map(|d| match d {
            Directive::Model(args) => Some(args),
            _ => None,
        })
    }

    pub fn key_directives(&self) -> impl Iterator<Item = &KeyArgs> {
        self.directives.iter().filter_map(|d| match d {
            Directive::Key(args) => Some(args),
            _ => None,
        })
    }

    /// The `key` directive that designates the primary key: the nameless one, or the one carrying
    /// the name given to `@primaryKey`.
    pub fn primary_key_directive(&self) -> Option<&KeyArgs> {
        let primary_key_name = self
            .primary_key_annotation()
            .and_then(|(_, args)| args.name.as_deref());

        self.key_directives().find(|k| k.name.is_none()).or_else(|| {
            primary_key_name.and_then(|name| self.named_key_directive(name))
        })
    }

    pub fn named_key_directive(&self, name: &str) -> Option<&KeyArgs> {
        self.key_directives().find(|k| k.name.as_deref() == Some(name))
    }

    /// Identifier component field names in key order: the fields of the primary `key` directive,
    /// or `["id"]` when there is none.
    pub fn identifier_component_names(&self) -> Vec<String> {
        match self.primary_key_directive() {
            Some(key) if !key.fields.is_empty() => key.fields.clone(),
            _ => vec![ID_FIELD.to_string()],
        }
    }

    pub fn primary_key_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.primary_key_info.is_some())
    }

    /// The primary key field followed by its sort key fields, or empty if the primary key has not
    /// been determined.
    pub fn primary_key_component_fields(&self) -> Vec<&Field> {
        let Some(primary_key_field) = self.primary_key_field() else {
            return vec![];
        };
        let sort_key_fields = primary_key_field
            .primary_key_info
            .iter()
            .flat_map(|info| info.sort_key_fields.iter())
            .filter_map(|name| self.field(name));

        std::iter::once(primary_key_field)
            .chain(sort_key_fields)
            .collect()
    }

    /// The field carrying `@primaryKey`, along with the directive's arguments.
    pub fn primary_key_annotation(&self) -> Option<(&Field, &PrimaryKeyArgs)> {
        self.fields
            .iter()
            .find_map(|f| f.primary_key_args().map(|args| (f, args)))
    }

    /// The field carrying `@index(name: <index_name>)`, with the index arguments.
    pub fn index_field(&self, index_name: &str) -> Option<(&Field, &IndexArgs)> {
        self.fields.iter().find_map(|f| {
            f.index_args()
                .find(|args| args.name.as_deref() == Some(index_name))
                .map(|args| (f, args))
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_list: bool,
    /// Nullability of the value, or of the list elements for list fields.
    pub is_nullable: bool,
    /// Nullability of the list container. Always `false` for non-list fields.
    pub is_list_nullable: bool,
    pub directives: Vec<Directive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_info: Option<ConnectionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key_info: Option<PrimaryKeyInfo>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_read_only: bool,
    /// `is_required_field` under the generator's list nullability setting. Filled in once the
    /// graph is resolved.
    pub is_required: bool,
}

impl Field {
    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>, is_nullable: bool) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_list: false,
            is_nullable,
            is_list_nullable: false,
            directives: vec![],
            connection_info: None,
            primary_key_info: None,
            is_read_only: false,
            is_required: !is_nullable,
        }
    }

    pub fn with_directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    /// Whether renderers should treat the field as required. With transparent list nullability,
    /// a list field is required when the container itself is non-null.
    pub fn is_required_field(&self, handle_list_nullability_transparently: bool) -> bool {
        if self.is_list && handle_list_nullability_transparently {
            !self.is_list_nullable
        } else {
            !self.is_nullable
        }
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.iter().any(|d| d.name() == name)
    }

    pub fn primary_key_args(&self) -> Option<&PrimaryKeyArgs> {
        self.directives.iter().find_map(|d| match d {
            Directive::PrimaryKey(args) => Some(args),
            _ => None,
        })
    }

    pub fn index_args(&self) -> impl Iterator<Item = &IndexArgs> {
        self.directives.iter().filter_map(|d| match d {
            Directive::Index(args) => Some(args),
            _ => None,
        })
    }

    pub fn has_one_args(&self) -> Option<&HasOneArgs> {
        self.directives.iter().find_map(|d| match d {
            Directive::HasOne(args) => Some(args),
            _ => None,
        })
    }

    pub fn has_many_args(&self) -> Option<&HasManyArgs> {
        self.directives.iter().find_map(|d| match d {
            Directive::HasMany(args) => Some(args),
            _ => None,
        })
    }

    pub fn belongs_to_args(&self) -> Option<&BelongsToArgs> {
        self.directives.iter().find_map(|d| match d {
            Directive::BelongsTo(args) => Some(args),
            _ => None,
        })
    }

    pub fn many_to_many_args(&self) -> Option<&ManyToManyArgs> {
        self.directives.iter().find_map(|d| match d {
            Directive::ManyToMany(args) => Some(args),
            _ => None,
        })
    }

    pub fn connection_args(&self) -> Option<&ConnectionArgs> {
        self.directives.iter().find_map(|d| match d {
            Directive::Connection(args) => Some(args),
            _ => None,
        })
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeyType {
    /// Implicit `id` field managed by the backend.
    ManagedId,
    /// Explicitly declared `id` field without a custom key.
    OptionallyManagedId,
    /// Any other field, or a composite key.
    CustomId,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryKeyInfo {
    pub primary_key_type: PrimaryKeyType,
    pub sort_key_fields: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    /// Language-safe identifier to schema literal.
    pub values: IndexMap<String, String>,
}
