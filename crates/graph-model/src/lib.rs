// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The type metadata model describing how GraphQL types map onto a property graph.
//!
//! A [MetadataRegistry] is built once per schema (by `graph-model-builder`, either from a
//! schema document or by sampling the graph) and then shared read-only by every translation.

mod error;
mod operation;
pub mod operator;
mod property;
mod registry;
mod relationship;
mod type_metadata;
mod types;

pub use error::ModelError;
pub use operation::OperationInfo;
pub use operator::Operator;
pub use property::{CustomQuery, ParameterInfo, PropertyInfo};
pub use registry::MetadataRegistry;
pub use relationship::{RelationshipDirection, RelationshipInfo};
pub use type_metadata::TypeMetadata;
pub use types::{PropertyType, ScalarKind};
