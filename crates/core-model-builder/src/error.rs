// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelBuildingError {
    #[error("Could not parse the schema: {0}")]
    Parse(#[from] async_graphql_parser::Error),

    #[error("Invalid arguments for @{directive} on {location}: {source}")]
    InvalidDirective {
        directive: String,
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Generic(String),

    #[error("Could not process the schema")]
    Diagnosis(Vec<String>),
}
