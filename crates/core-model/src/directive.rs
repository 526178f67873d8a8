// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Directives attached to models and fields.
//!
//! Arguments of the directives the resolver understands are decoded once, when the schema is
//! ingested, into one argument struct per directive. Anything else is carried through untouched
//! as a [`CustomDirective`] so that renderers still see it.
//!
//! The resolution passes also write directives back (for example, a `key` directive derived from
//! `@primaryKey`). Those are regular [`Directive`] values and serialize in the same
//! `{ "name": ..., "arguments": { ... } }` shape as the ones that came from the schema.

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::DeserializeOwned,
    ser::SerializeStruct,
};
use serde_json::{Map, Value};

use crate::auth::AuthRule;

pub const MODEL: &str = "model";
pub const KEY: &str = "key";
pub const PRIMARY_KEY: &str = "primaryKey";
pub const INDEX: &str = "index";
pub const HAS_ONE: &str = "hasOne";
pub const HAS_MANY: &str = "hasMany";
pub const BELONGS_TO: &str = "belongsTo";
pub const MANY_TO_MANY: &str = "manyToMany";
pub const CONNECTION: &str = "connection";
pub const AUTH: &str = "auth";

#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Model(ModelArgs),
    Key(KeyArgs),
    PrimaryKey(PrimaryKeyArgs),
    Index(IndexArgs),
    HasOne(HasOneArgs),
    HasMany(HasManyArgs),
    BelongsTo(BelongsToArgs),
    ManyToMany(ManyToManyArgs),
    Connection(ConnectionArgs),
    Auth(AuthArgs),
    Custom(CustomDirective),
}

impl Directive {
    /// Decode a directive from its name and JSON arguments.
    ///
    /// `@auth` is not decoded here: its rules need per-rule leniency (see the builder's auth
    /// processing), so callers construct `Directive::Auth` themselves.
    pub fn decode(name: &str, arguments: Map<String, Value>) -> Result<Directive, serde_json::Error> {
        Ok(match name {
            MODEL => Directive::Model(from_arguments(arguments)?),
            KEY => Directive::Key(from_arguments(arguments)?),
            PRIMARY_KEY => Directive::PrimaryKey(from_arguments(arguments)?),
            INDEX => Directive::Index(from_arguments(arguments)?),
            HAS_ONE => Directive::HasOne(from_arguments(arguments)?),
            HAS_MANY => Directive::HasMany(from_arguments(arguments)?),
            BELONGS_TO => Directive::BelongsTo(from_arguments(arguments)?),
            MANY_TO_MANY => Directive::ManyToMany(from_arguments(arguments)?),
            CONNECTION => Directive::Connection(from_arguments(arguments)?),
            _ => Directive::Custom(CustomDirective {
                name: name.to_string(),
                arguments,
            }),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Directive::Model(_) => MODEL,
            Directive::Key(_) => KEY,
            Directive::PrimaryKey(_) => PRIMARY_KEY,
            Directive::Index(_) => INDEX,
            Directive::HasOne(_) => HAS_ONE,
            Directive::HasMany(_) => HAS_MANY,
            Directive::BelongsTo(_) => BELONGS_TO,
            Directive::ManyToMany(_) => MANY_TO_MANY,
            Directive::Connection(_) => CONNECTION,
            Directive::Auth(_) => AUTH,
            Directive::Custom(custom) => &custom.name,
        }
    }

    /// The `fields` argument of a relationship directive, if this is one.
    pub fn relationship_fields(&self) -> Option<&[String]> {
        match self {
            Directive::HasOne(args) => Some(&args.fields),
            Directive::HasMany(args) => Some(&args.fields),
            Directive::BelongsTo(args) => Some(&args.fields),
            _ => None,
        }
    }
}

fn from_arguments<T: DeserializeOwned>(arguments: Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(arguments))
}

impl Serialize for Directive {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Directive", 2)?;
        state.serialize_field("name", self.name())?;
        match self {
            Directive::Model(args) => state.serialize_field("arguments", args)?,
            Directive::Key(args) => state.serialize_field("arguments", args)?,
            Directive::PrimaryKey(args) => state.serialize_field("arguments", args)?,
            Directive::Index(args) => state.serialize_field("arguments", args)?,
            Directive::HasOne(args) => state.serialize_field("arguments", args)?,
            Directive::HasMany(args) => state.serialize_field("arguments", args)?,
            Directive::BelongsTo(args) => state.serialize_field("arguments", args)?,
            Directive::ManyToMany(args) => state.serialize_field("arguments", args)?,
            Directive::Connection(args) => state.serialize_field("arguments", args)?,
            Directive::Auth(args) => state.serialize_field("arguments", args)?,
            Directive::Custom(custom) => state.serialize_field("arguments", &custom.arguments)?,
        }
        state.end()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelArgs {
    /// `None`: not specified, `Some(None)`: `timestamps: null`, `Some(Some(..))`: renamed fields
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamps: Option<Option<TimestampsArgs>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimestampsArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeyArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_field: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryKeyArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort_key_fields: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct IndexArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort_key_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_field: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HasOneArgs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HasManyArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BelongsToArgs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManyToManyArgs {
    pub relation_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct AuthArgs {
    pub rules: Vec<AuthRule>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CustomDirective {
    #[serde(skip)]
    pub name: String,
    pub arguments: Map<String, Value>,
}

/// Distinguishes an absent argument (handled by `#[serde(default)]`) from an explicit `null`.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
