// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::Serialize;

use crate::{
    mapped_arena::{MappedArena, SerializableSlabIndex},
    types::{EnumType, Model},
};

/// All types of a schema: `@model` types, embeddable non-model types, and enums.
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModelGraph {
    pub models: MappedArena<Model>,
    pub non_models: MappedArena<Model>,
    pub enums: MappedArena<EnumType>,
}

impl ModelGraph {
    pub fn is_model(&self, type_name: &str) -> bool {
        self.models.contains_key(type_name)
    }

    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get_by_key(name)
    }

    pub fn model_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.models.get_by_key_mut(name)
    }

    pub fn model_ids(&self) -> Vec<SerializableSlabIndex<Model>> {
        self.models.ids()
    }
}
