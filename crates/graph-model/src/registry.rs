// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{ModelError, OperationInfo, TypeMetadata};

/// An immutable snapshot of everything known about a schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct MetadataRegistry {
    pub types: IndexMap<String, TypeMetadata>,
    /// Enum types and their values
    pub enums: IndexMap<String, Vec<String>>,
    /// Query fields declared in the schema document (with custom statements)
    pub queries: IndexMap<String, OperationInfo>,
    /// Mutation fields declared in the schema document (with custom statements)
    pub mutations: IndexMap<String, OperationInfo>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeMetadata> {
        self.types.get(type_name)
    }

    pub fn add_type(&mut self, metadata: TypeMetadata) -> Result<(), ModelError> {
        if self.types.contains_key(&metadata.type_name) {
            return Err(ModelError::DuplicateType(metadata.type_name));
        }
        self.types.insert(metadata.type_name.clone(), metadata);
        Ok(())
    }

    pub fn is_enum(&self, type_name: &str) -> bool {
        self.enums.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|name| name.as_str())
    }
}
