// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

/// The directive dialect a schema is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `@connection` and `@key`
    Legacy,
    /// `@primaryKey`, `@index`, `@hasOne`, `@hasMany`, `@belongsTo`, and `@manyToMany`
    Pipelined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub use_pipelined_transformer: bool,
    pub is_timestamp_fields_added: bool,
    pub handle_list_nullability_transparently: bool,
    pub respect_primary_key_attributes_on_connection_field: bool,
    pub is_data_store_enabled: bool,
    pub use_model_name_as_associated_with: bool,
    pub should_use_fields_in_associated_with_in_has_one: bool,
}

impl GeneratorConfig {
    pub fn dialect(&self) -> Dialect {
        if self.use_pipelined_transformer {
            Dialect::Pipelined
        } else {
            Dialect::Legacy
        }
    }

    pub fn pipelined() -> Self {
        Self {
            use_pipelined_transformer: true,
            ..Self::default()
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            use_pipelined_transformer: false,
            is_timestamp_fields_added: true,
            handle_list_nullability_transparently: true,
            respect_primary_key_attributes_on_connection_field: false,
            is_data_store_enabled: true,
            use_model_name_as_associated_with: false,
            should_use_fields_in_associated_with_in_has_one: false,
        }
    }
}
