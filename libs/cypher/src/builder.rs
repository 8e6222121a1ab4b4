// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::ExpressionBuilder;

pub struct CypherBuilder {
    /// The statement being built
    cypher: String,
    /// Names of the parameters referenced by the statement (in the order of first use)
    params: Vec<String>,
}

impl CypherBuilder {
    pub fn new() -> Self {
        Self {
            cypher: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        self.cypher.push_str(s.as_ref());
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        self.cypher.push(c);
    }

    /// Push a space. This is a common operation, so it is provided as a separate method.
    pub fn push_space(&mut self) {
        self.cypher.push(' ');
    }

    /// Push a newline, which separates clauses of a statement.
    pub fn push_newline(&mut self) {
        self.cypher.push('\n');
    }

    /// Push an identifier (variable, label, relationship type, property key, map key) surrounded
    /// by backticks. Backticks inside the identifier are doubled, so any string is safe to use
    /// here.
    pub fn push_identifier<T: AsRef<str>>(&mut self, s: T) {
        self.cypher.push('`');
        for c in s.as_ref().chars() {
            if c == '`' {
                self.cypher.push('`');
            }
            self.cypher.push(c);
        }
        self.cypher.push('`');
    }

    /// Push a property access of the form `` `variable`.`property` ``
    pub fn push_property<T: AsRef<str>>(&mut self, variable: T, property: T) {
        self.push_identifier(variable);
        self.push('.');
        self.push_identifier(property);
    }

    /// Push a double-quoted string literal, escaping characters that would otherwise terminate
    /// or alter the literal.
    pub fn push_string_literal<T: AsRef<str>>(&mut self, s: T) {
        self.cypher.push('"');
        for c in s.as_ref().chars() {
            match c {
                '"' => self.cypher.push_str("\\\""),
                '\\' => self.cypher.push_str("\\\\"),
                '\n' => self.cypher.push_str("\\n"),
                '\r' => self.cypher.push_str("\\r"),
                '\t' => self.cypher.push_str("\\t"),
                c => self.cypher.push(c),
            }
        }
        self.cypher.push('"');
    }

    /// Push a parameter reference (`$name`) and record that the statement needs a value for it.
    pub fn push_param<T: AsRef<str>>(&mut self, name: T) {
        let name = name.as_ref();
        if !self.params.iter().any(|existing| existing == name) {
            self.params.push(name.to_string());
        }
        self.push('$');
        self.push_str(name);
    }

    /// Push elements of an iterator, separated by `sep`. The `push_elem` function provides
    /// the flexibility to map the elements (compared to [`CypherBuilder::push_elems`], which
    /// assumes that the elements implement [`ExpressionBuilder`]).
    pub fn push_iter<T>(
        &mut self,
        iter: impl ExactSizeIterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T),
    ) {
        let len = iter.len();
        for (i, item) in iter.enumerate() {
            push_elem(self, item);

            if i < len - 1 {
                self.cypher.push_str(sep);
            }
        }
    }

    /// Push elements of a slice, separated by `sep`.
    pub fn push_elems<T: ExpressionBuilder>(&mut self, elems: &[T], sep: &str) {
        self.push_iter(elems.iter(), sep, |builder, elem| {
            elem.build(builder);
        });
    }

    /// Get the statement text and the referenced parameter names. This should be the final step,
    /// and thus the builder consumes `self`.
    pub fn into_cypher(self) -> (String, Vec<String>) {
        (self.cypher, self.params)
    }
}

impl Default for CypherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
