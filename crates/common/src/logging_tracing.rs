// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! # Tracing configuration setup.
//!
//! The resolution passes are instrumented with Rust's `tracing` framework.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the value of
//! the `MODELGEN_LOG` environment variable, which follows the same conventions as `RUST_LOG`.
//! Without it, only warnings (such as unconnected model fields) are printed.
//!
//! Logs go to stderr so that the resolved graph written to stdout stays parseable:
//!
//! ```shell
//! $ MODELGEN_LOG=core_model_builder=debug modelgen resolve schema.graphql > graph.json
//! ```

use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

pub const MODELGEN_LOG: &str = "MODELGEN_LOG";

/// Initialize the tracing subscriber with a compact `tracing_subscriber::fmt` layer.
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter())
        .with(fmt_layer)
        .init();
}

fn filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(MODELGEN_LOG)
        .from_env_lossy()
}
