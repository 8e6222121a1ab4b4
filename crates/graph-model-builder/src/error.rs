// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use async_graphql_parser::Pos;
use codemap::{CodeMap, Span};
use codemap_diagnostic::{ColorConfig, Diagnostic, Emitter, Level, SpanLabel, SpanStyle};
use thiserror::Error;

use graph_model::ModelError;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Syntax error at {}:{}: {message}", pos.line, pos.column)]
    Syntax { message: String, pos: Pos },

    #[error("{error} (at {}:{})", pos.line, pos.column)]
    Model { error: ModelError, pos: Pos },

    #[error("Invalid @{directive} directive at {}:{}: {message}", pos.line, pos.column)]
    InvalidDirective {
        directive: String,
        message: String,
        pos: Pos,
    },
}

impl SchemaError {
    pub fn pos(&self) -> Pos {
        match self {
            SchemaError::Syntax { pos, .. }
            | SchemaError::Model { pos, .. }
            | SchemaError::InvalidDirective { pos, .. } => *pos,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            SchemaError::Syntax { .. } => "S000",
            SchemaError::Model { .. } => "S001",
            SchemaError::InvalidDirective { .. } => "S002",
        }
    }

    /// Describe the error as a diagnostic pointing into the source, whose span in a codemap is
    /// `source_span`.
    pub fn diagnostic(&self, source: &str, source_span: Span) -> Diagnostic {
        let offset = byte_offset(source, self.pos()) as u64;
        let end = (offset + 1).min(source_span.len());

        let (message, label) = match self {
            SchemaError::Syntax { message, .. } => {
                // The parser's message spans multiple lines, with the expected tokens last
                let expected = message
                    .lines()
                    .map(str::trim)
                    .rfind(|line| !line.is_empty())
                    .unwrap_or(message.as_str())
                    .trim_start_matches("= ")
                    .to_string();
                ("Syntax error".to_string(), expected)
            }
            SchemaError::Model { error, .. } => (error.to_string(), "declared here".to_string()),
            SchemaError::InvalidDirective {
                directive, message, ..
            } => (format!("Invalid @{directive} directive"), message.clone()),
        };

        Diagnostic {
            level: Level::Error,
            message,
            code: Some(self.code().to_string()),
            spans: vec![SpanLabel {
                span: source_span.subspan(offset.min(end), end),
                style: SpanStyle::Primary,
                label: Some(label),
            }],
        }
    }

    /// Print the error to stderr, with the offending part of the source highlighted.
    pub fn emit_diagnostics(&self, file_name: &str, source: &str) {
        let mut codemap = CodeMap::new();
        let file_span = codemap
            .add_file(file_name.to_string(), source.to_string())
            .span;
        let diagnostic = self.diagnostic(source, file_span);

        let mut emitter = Emitter::stderr(ColorConfig::Always, Some(&codemap));
        emitter.emit(&[diagnostic]);
    }
}

impl From<async_graphql_parser::Error> for SchemaError {
    fn from(error: async_graphql_parser::Error) -> Self {
        let pos = error.positions().next().unwrap_or(Pos { line: 1, column: 1 });
        let message = match error {
            async_graphql_parser::Error::Syntax { message, .. } => message,
            error => error.to_string(),
        };
        SchemaError::Syntax { message, pos }
    }
}

/// Convert a 1-based line/column position into a byte offset into `source`
fn byte_offset(source: &str, pos: Pos) -> usize {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(pos.line.saturating_sub(1))
        .map(str::len)
        .sum();

    let column_offset: usize = source[line_start..]
        .chars()
        .take(pos.column.saturating_sub(1))
        .take_while(|c| *c != '\n')
        .map(char::len_utf8)
        .sum();

    line_start + column_offset
}
