// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Resolved relationship metadata attached to a field.
//!
//! Fields on the connected model are referred to by name. Any field named here exists on the
//! connected model once resolution has finished, except for `BELONGS_TO` targets that the
//! relationship field itself represents (those are removed from the owning model).

use serde::Serialize;

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionInfo {
    HasMany(HasManyConnection),
    HasOne(HasOneConnection),
    BelongsTo(BelongsToConnection),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HasManyConnection {
    pub connected_model: String,
    /// The field on the connected model anchoring the relationship.
    pub associated_with: String,
    /// Key component fields on the connected model, empty when a single field suffices.
    pub associated_with_fields: Vec<String>,
    pub is_connecting_field_auto_created: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HasOneConnection {
    pub connected_model: String,
    pub associated_with: String,
    pub associated_with_fields: Vec<String>,
    pub is_connecting_field_auto_created: bool,
    /// Foreign key field on the owning model.
    pub target_name: String,
    /// All foreign key fields on the owning model, one per key component of the connected model.
    pub target_names: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BelongsToConnection {
    pub connected_model: String,
    pub target_name: String,
    pub target_names: Vec<String>,
    pub is_connecting_field_auto_created: bool,
    pub is_using_references: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    HasMany,
    HasOne,
    BelongsTo,
}

impl ConnectionInfo {
    pub fn kind(&self) -> ConnectionKind {
        match self {
            ConnectionInfo::HasMany(_) => ConnectionKind::HasMany,
            ConnectionInfo::HasOne(_) => ConnectionKind::HasOne,
            ConnectionInfo::BelongsTo(_) => ConnectionKind::BelongsTo,
        }
    }

    pub fn connected_model(&self) -> &str {
        match self {
            ConnectionInfo::HasMany(c) => &c.connected_model,
            ConnectionInfo::HasOne(c) => &c.connected_model,
            ConnectionInfo::BelongsTo(c) => &c.connected_model,
        }
    }

    pub fn is_connecting_field_auto_created(&self) -> bool {
        match self {
            ConnectionInfo::HasMany(c) => c.is_connecting_field_auto_created,
            ConnectionInfo::HasOne(c) => c.is_connecting_field_auto_created,
            ConnectionInfo::BelongsTo(c) => c.is_connecting_field_auto_created,
        }
    }

    pub fn as_has_many(&self) -> Option<&HasManyConnection> {
        match self {
            ConnectionInfo::HasMany(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_has_one(&self) -> Option<&HasOneConnection> {
        match self {
            ConnectionInfo::HasOne(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_belongs_to(&self) -> Option<&BelongsToConnection> {
        match self {
            ConnectionInfo::BelongsTo(c) => Some(c),
            _ => None,
        }
    }
}
