// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{CypherBuilder, Expression, ExpressionBuilder, OrderBy, Pattern, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skip(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(pub i64);

/// `expression AS alias` in a `WITH` or `RETURN` clause
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnItem {
    pub expression: Expression,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetItem {
    /// `variable = expression`
    Replace(String, Expression),
    /// `variable += expression`
    Merge(String, Expression),
    /// `variable:Label1:Label2`
    Labels(String, Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Match {
        pattern: Pattern,
        optional: bool,
        predicate: Predicate,
    },
    With {
        items: Vec<ReturnItem>,
        order_by: Option<OrderBy>,
    },
    Unwind {
        expression: Expression,
        alias: String,
    },
    Create(Pattern),
    Merge(Pattern),
    Set(Vec<SetItem>),
    Delete {
        variables: Vec<String>,
        detach: bool,
    },
    Return {
        items: Vec<ReturnItem>,
        order_by: Option<OrderBy>,
        skip: Option<Skip>,
        limit: Option<Limit>,
    },
}

impl ReturnItem {
    pub fn new(expression: Expression, alias: impl Into<String>) -> Self {
        Self {
            expression,
            alias: Some(alias.into()),
        }
    }

    /// Carry a variable over under its own name
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            expression: Expression::Variable(name.into()),
            alias: None,
        }
    }
}

impl Clause {
    pub fn matching(pattern: Pattern, predicate: Predicate) -> Self {
        Clause::Match {
            pattern,
            optional: false,
            predicate,
        }
    }

    pub fn optional_matching(pattern: Pattern, predicate: Predicate) -> Self {
        Clause::Match {
            pattern,
            optional: true,
            predicate,
        }
    }
}

impl ExpressionBuilder for Skip {
    fn build(&self, builder: &mut CypherBuilder) {
        builder.push_str("SKIP ");
        builder.push_str(self.0.to_string());
    }
}

impl ExpressionBuilder for Limit {
    fn build(&self, builder: &mut CypherBuilder) {
        builder.push_str("LIMIT ");
        builder.push_str(self.0.to_string());
    }
}

impl ExpressionBuilder for ReturnItem {
    fn build(&self, builder: &mut CypherBuilder) {
        self.expression.build(builder);
        if let Some(alias) = &self.alias {
            builder.push_str(" AS ");
            builder.push_identifier(alias);
        }
    }
}

impl ExpressionBuilder for SetItem {
    fn build(&self, builder: &mut CypherBuilder) {
        match self {
            SetItem::Replace(variable, expression) => {
                builder.push_identifier(variable);
                builder.push_str(" = ");
                expression.build(builder);
            }
            SetItem::Merge(variable, expression) => {
                builder.push_identifier(variable);
                builder.push_str(" += ");
                expression.build(builder);
            }
            SetItem::Labels(variable, labels) => {
                builder.push_identifier(variable);
                for label in labels {
                    builder.push(':');
                    builder.push_identifier(label);
                }
            }
        }
    }
}

impl ExpressionBuilder for Clause {
    /// Build a single clause. Trailing sub-clauses (`ORDER BY`, `SKIP`, `LIMIT`) go on their
    /// own lines.
    fn build(&self, builder: &mut CypherBuilder) {
        match self {
            Clause::Match {
                pattern,
                optional,
                predicate,
            } => {
                if *optional {
                    builder.push_str("OPTIONAL ");
                }
                builder.push_str("MATCH ");
                pattern.build(builder);
                if *predicate != Predicate::True {
                    builder.push_newline();
                    builder.push_str("WHERE ");
                    predicate.build(builder);
                }
            }
            Clause::With { items, order_by } => {
                builder.push_str("WITH ");
                builder.push_elems(items, ", ");
                if let Some(order_by) = order_by {
                    builder.push_newline();
                    order_by.build(builder);
                }
            }
            Clause::Unwind { expression, alias } => {
                builder.push_str("UNWIND ");
                expression.build(builder);
                builder.push_str(" AS ");
                builder.push_identifier(alias);
            }
            Clause::Create(pattern) => {
                builder.push_str("CREATE ");
                pattern.build(builder);
            }
            Clause::Merge(pattern) => {
                builder.push_str("MERGE ");
                pattern.build(builder);
            }
            Clause::Set(items) => {
                builder.push_str("SET ");
                builder.push_elems(items, ", ");
            }
            Clause::Delete { variables, detach } => {
                if *detach {
                    builder.push_str("DETACH ");
                }
                builder.push_str("DELETE ");
                builder.push_iter(variables.iter(), ", ", |builder, variable| {
                    builder.push_identifier(variable)
                });
            }
            Clause::Return {
                items,
                order_by,
                skip,
                limit,
            } => {
                builder.push_str("RETURN ");
                builder.push_elems(items, ", ");
                if let Some(order_by) = order_by {
                    builder.push_newline();
                    order_by.build(builder);
                }
                if let Some(skip) = skip {
                    builder.push_newline();
                    skip.build(builder);
                }
                if let Some(limit) = limit {
                    builder.push_newline();
                    limit.build(builder);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Direction, Literal, NodePattern, OrderByElement, Ordering, RelationshipPattern};

    use super::*;

    #[test]
    fn match_with_predicate() {
        let clause = Clause::matching(
            Pattern::node(NodePattern::variable("person").with_label("Person")),
            Predicate::Eq(
                Expression::property("person", "born"),
                Literal::Int(1958).into(),
            ),
        );

        assert_binding!(
            clause.to_cypher(),
            "MATCH (`person`:`Person`)\nWHERE `person`.`born` = 1958"
        );
    }

    #[test]
    fn optional_match_without_predicate() {
        let clause = Clause::optional_matching(
            Pattern::node(NodePattern::variable("person")).related(
                RelationshipPattern::new("ACTED_IN", Direction::Outgoing),
                NodePattern::variable("person_movies").with_label("Movie"),
            ),
            Predicate::True,
        );

        assert_binding!(
            clause.to_cypher(),
            "OPTIONAL MATCH (`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`)"
        );
    }

    #[test]
    fn return_with_trailing_clauses() {
        let clause = Clause::Return {
            items: vec![ReturnItem::new(
                Expression::property("person", "name"),
                "name",
            )],
            order_by: Some(OrderBy(vec![OrderByElement(
                Expression::property("person", "name"),
                Ordering::Asc,
            )])),
            skip: Some(Skip(1)),
            limit: Some(Limit(2)),
        };

        assert_binding!(
            clause.to_cypher(),
            "RETURN `person`.`name` AS `name`\nORDER BY `person`.`name` ASC\nSKIP 1\nLIMIT 2"
        );
    }

    #[test]
    fn mutation_clauses() {
        assert_binding!(
            Clause::Set(vec![
                SetItem::Merge("person".into(), Expression::Parameter("properties".into())),
                SetItem::Labels("person".into(), vec!["Actor".into()]),
            ])
            .to_cypher(),
            "SET `person` += $properties, `person`:`Actor`",
            "properties"
        );
        assert_binding!(
            Clause::Delete {
                variables: vec!["person".into()],
                detach: true
            }
            .to_cypher(),
            "DETACH DELETE `person`"
        );
        assert_binding!(
            Clause::Unwind {
                expression: Expression::Parameter("targets".into()),
                alias: "target".into()
            }
            .to_cypher(),
            "UNWIND $targets AS `target`",
            "targets"
        );
    }
}
