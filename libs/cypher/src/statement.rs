// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{Clause, CypherBuilder, ExpressionBuilder};

/// Ask the database to report the execution plan alongside (or instead of) the results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementPrefix {
    Profile,
    Explain,
}

/// A complete statement: a sequence of clauses, one per line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub prefix: Option<StatementPrefix>,
    pub clauses: Vec<Clause>,
}

impl Statement {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self {
            prefix: None,
            clauses,
        }
    }

    pub fn with_prefix(mut self, prefix: Option<StatementPrefix>) -> Self {
        self.prefix = prefix;
        self
    }
}

impl ExpressionBuilder for Statement {
    fn build(&self, builder: &mut CypherBuilder) {
        match self.prefix {
            Some(StatementPrefix::Profile) => builder.push_str("PROFILE\n"),
            Some(StatementPrefix::Explain) => builder.push_str("EXPLAIN\n"),
            None => {}
        }
        builder.push_elems(&self.clauses, "\n");
    }
}

#[cfg(test)]
mod tests {
    use crate::{Expression, NodePattern, Pattern, Predicate, ReturnItem};

    use super::*;

    #[test]
    fn clauses_on_separate_lines() {
        let statement = Statement::new(vec![
            Clause::matching(
                Pattern::node(NodePattern::variable("movie").with_label("Movie")),
                Predicate::True,
            ),
            Clause::Return {
                items: vec![ReturnItem::new(Expression::property("movie", "title"), "title")],
                order_by: None,
                skip: None,
                limit: None,
            },
        ])
        .with_prefix(Some(StatementPrefix::Explain));

        assert_binding!(
            statement.to_cypher(),
            "EXPLAIN\nMATCH (`movie`:`Movie`)\nRETURN `movie`.`title` AS `title`"
        );
    }
}
