// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Builds a [graph_model::MetadataRegistry], either by parsing a GraphQL schema document
//! ([parse]) or by inferring types from nodes sampled out of the graph ([infer_registry]).

mod error;
mod inference;
mod schema_parser;

pub use error::SchemaError;
pub use inference::{
    DENSE_NODE, LabelSample, SAMPLE_SIZE, SampledNode, SampledRelationship, infer_registry,
};
pub use schema_parser::parse;
