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
//! The translator and the engine are instrumented with Rust's `tracing` framework.
//!
//! Calling the `init` function will initialize a global tracing subscriber based on the value of
//! the `GRAPHQL_CYPHER_LOG` environment variable, which follows the same conventions as
//! `RUST_LOG`. Without it, only warnings and errors are logged.
//!
//! For example, to see every generated statement:
//!
//! ```shell
//! $ GRAPHQL_CYPHER_LOG=graph_resolver=debug graphql-cypher translate schema.graphql query.graphql
//! ```

use tracing_subscriber::{EnvFilter, filter::LevelFilter, prelude::*};

pub const GRAPHQL_CYPHER_LOG: &str = "GRAPHQL_CYPHER_LOG";

/// Initialize the tracing subscriber with a compact `tracing_subscriber::fmt` layer writing to
/// stderr (stdout is reserved for command output).
pub fn init() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var(GRAPHQL_CYPHER_LOG)
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
