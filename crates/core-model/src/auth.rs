// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthStrategy {
    Owner,
    Groups,
    Private,
    Public,
    Custom,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthOperation {
    Create,
    Update,
    Delete,
    Read,
    Get,
    List,
    Sync,
    Listen,
    Search,
}

impl AuthOperation {
    pub const DEFAULTS: [AuthOperation; 4] = [
        AuthOperation::Create,
        AuthOperation::Update,
        AuthOperation::Delete,
        AuthOperation::Read,
    ];
}

/// A single `@auth` rule with defaults applied.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthRule {
    pub allow: AuthStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_claim: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_claim: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_field: Option<String>,
    #[serde(default)]
    pub operations: Vec<AuthOperation>,
}
