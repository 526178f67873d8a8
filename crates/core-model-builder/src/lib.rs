// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Turns an annotated GraphQL schema into a resolved [`core_model::graph::ModelGraph`], where
//! every relationship field knows the model it connects to and the fields that key it.

pub use config::{Dialect, GeneratorConfig};
pub use diagnostics::Warning;
pub use error::ModelBuildingError;
pub use pipeline::{ResolvedGraph, build};

pub mod config;
pub mod connection;
pub mod diagnostics;
pub mod error;
pub mod key_resolver;
pub mod many_to_many;
pub mod naming;
pub mod normalization;
pub mod pipeline;
pub mod schema_builder;
pub mod validator;

mod auth;

#[cfg(test)]
mod test_support;
