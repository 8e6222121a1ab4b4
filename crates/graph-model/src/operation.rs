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

use crate::{CustomQuery, ParameterInfo, PropertyType};

/// A top-level query or mutation field declared in the schema document
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OperationInfo {
    pub name: String,
    pub return_type: PropertyType,
    pub custom_query: Option<CustomQuery>,
    pub parameters: IndexMap<String, ParameterInfo>,
    pub description: Option<String>,
}
