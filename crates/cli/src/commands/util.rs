// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::Path;

use anyhow::{Context, Result, anyhow};

use graph_model_builder::parse;
use graph_model::MetadataRegistry;

/// Parse the schema at `path`, printing diagnostics for an invalid document
pub(super) fn load_schema(path: &Path) -> Result<MetadataRegistry> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read schema file {}", path.display()))?;

    parse(&source).map_err(|error| {
        error.emit_diagnostics(&path.display().to_string(), &source);
        anyhow!("Invalid schema in {}", path.display())
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_schema_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "type Person {{ name: String! }}").unwrap();

        let registry = load_schema(file.path()).unwrap();
        assert!(registry.get("Person").is_some());

        let mut invalid = tempfile::NamedTempFile::new().unwrap();
        writeln!(invalid, "type Person {{ name: String!").unwrap();
        assert!(load_schema(invalid.path()).is_err());

        assert!(load_schema(Path::new("does/not/exist.graphql")).is_err());
    }
}
