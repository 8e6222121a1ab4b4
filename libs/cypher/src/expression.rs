// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{CypherBuilder, ExpressionBuilder, Literal, Pattern, Predicate};

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    /// A reference to a statement parameter (`$name`)
    Parameter(String),
    Variable(String),
    /// `` `variable`.`property` ``
    Property(String, String),
    /// A function call such as `head(...)` or `graphql.run(...)`. The name is emitted verbatim, so
    /// namespaced functions work as well.
    FunctionCall(String, Vec<Expression>),
    /// An explicit map literal: `` {`key`: expr, ...} ``
    Map(Vec<(String, Expression)>),
    /// A native map projection: `` `variable` {.`prop`, `key`: expr} ``
    MapProjection(String, Vec<MapProjectionItem>),
    List(Vec<Expression>),
    PatternComprehension(Box<PatternComprehension>),
    ListComprehension(Box<ListComprehension>),
    /// `list[from..to]` (either bound may be open)
    Slice(Box<Expression>, Option<i64>, Option<i64>),
    Case(Box<CaseExpression>),
    /// `count(*)`
    CountAll,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapProjectionItem {
    /// `.property`, reading a property of the projected entity under its own name
    Property(String),
    /// `key: expr`
    Entry(String, Expression),
}

/// `[pattern WHERE predicate | projection]`
#[derive(Debug, Clone, PartialEq)]
pub struct PatternComprehension {
    pub pattern: Pattern,
    pub predicate: Predicate,
    pub projection: Expression,
}

/// `[variable IN source WHERE predicate | projection]`
#[derive(Debug, Clone, PartialEq)]
pub struct ListComprehension {
    pub variable: String,
    pub source: Expression,
    pub predicate: Predicate,
    pub projection: Option<Expression>,
}

/// `CASE WHEN condition THEN then ELSE otherwise END`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpression {
    pub condition: Predicate,
    pub then: Expression,
    pub otherwise: Expression,
}

impl Expression {
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn property(variable: impl Into<String>, property: impl Into<String>) -> Self {
        Expression::Property(variable.into(), property.into())
    }

    pub fn function(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall(name.into(), args)
    }

    pub fn head(self) -> Self {
        Self::function("head", vec![self])
    }

    pub fn collect(self) -> Self {
        Self::function("collect", vec![self])
    }

    /// Slice the list, returning `self` unchanged when both bounds are open.
    pub fn slice(self, from: Option<i64>, to: Option<i64>) -> Self {
        if from.is_none() && to.is_none() {
            self
        } else {
            Expression::Slice(Box::new(self), from, to)
        }
    }
}

impl From<Literal> for Expression {
    fn from(literal: Literal) -> Self {
        Expression::Literal(literal)
    }
}

impl ExpressionBuilder for Expression {
    fn build(&self, builder: &mut CypherBuilder) {
        match self {
            Expression::Literal(literal) => literal.build(builder),
            Expression::Parameter(name) => builder.push_param(name),
            Expression::Variable(name) => builder.push_identifier(name),
            Expression::Property(variable, property) => builder.push_property(variable, property),
            Expression::FunctionCall(name, args) => {
                builder.push_str(name);
                builder.push('(');
                builder.push_elems(args, ", ");
                builder.push(')');
            }
            Expression::Map(entries) => {
                builder.push('{');
                builder.push_iter(entries.iter(), ", ", |builder, (key, value)| {
                    builder.push_identifier(key);
                    builder.push_str(": ");
                    value.build(builder);
                });
                builder.push('}');
            }
            Expression::MapProjection(variable, items) => {
                builder.push_identifier(variable);
                builder.push_str(" {");
                builder.push_elems(items, ", ");
                builder.push('}');
            }
            Expression::List(elems) => {
                builder.push('[');
                builder.push_elems(elems, ", ");
                builder.push(']');
            }
            Expression::PatternComprehension(comprehension) => comprehension.build(builder),
            Expression::ListComprehension(comprehension) => comprehension.build(builder),
            Expression::Slice(list, from, to) => {
                list.build(builder);
                builder.push('[');
                if let Some(from) = from {
                    builder.push_str(from.to_string());
                }
                builder.push_str("..");
                if let Some(to) = to {
                    builder.push_str(to.to_string());
                }
                builder.push(']');
            }
            Expression::Case(case) => case.build(builder),
            Expression::CountAll => builder.push_str("count(*)"),
        }
    }
}

impl ExpressionBuilder for MapProjectionItem {
    fn build(&self, builder: &mut CypherBuilder) {
        match self {
            MapProjectionItem::Property(property) => {
                builder.push('.');
                builder.push_identifier(property);
            }
            MapProjectionItem::Entry(key, value) => {
                builder.push_identifier(key);
                builder.push_str(": ");
                value.build(builder);
            }
        }
    }
}

impl ExpressionBuilder for PatternComprehension {
    fn build(&self, builder: &mut CypherBuilder) {
        builder.push('[');
        self.pattern.build(builder);
        build_where(&self.predicate, builder);
        builder.push_str(" | ");
        self.projection.build(builder);
        builder.push(']');
    }
}

impl ExpressionBuilder for ListComprehension {
    fn build(&self, builder: &mut CypherBuilder) {
        builder.push('[');
        builder.push_identifier(&self.variable);
        builder.push_str(" IN ");
        self.source.build(builder);
        build_where(&self.predicate, builder);
        if let Some(projection) = &self.projection {
            builder.push_str(" | ");
            projection.build(builder);
        }
        builder.push(']');
    }
}

impl ExpressionBuilder for CaseExpression {
    fn build(&self, builder: &mut CypherBuilder) {
        builder.push_str("CASE WHEN ");
        self.condition.build(builder);
        builder.push_str(" THEN ");
        self.then.build(builder);
        builder.push_str(" ELSE ");
        self.otherwise.build(builder);
        builder.push_str(" END");
    }
}

/// Push ` WHERE <predicate>` unless the predicate is trivially true
pub(crate) fn build_where(predicate: &Predicate, builder: &mut CypherBuilder) {
    if *predicate != Predicate::True {
        builder.push_str(" WHERE ");
        predicate.build(builder);
    }
}

#[cfg(test)]
mod tests {
    use crate::{Direction, NodePattern, RelationshipPattern};

    use super::*;

    fn acted_in(from: &str, to: &str) -> Pattern {
        Pattern::node(NodePattern::variable(from)).related(
            RelationshipPattern::new("ACTED_IN", Direction::Outgoing),
            NodePattern::variable(to).with_label("Movie"),
        )
    }

    #[test]
    fn map_projection() {
        let projection = Expression::MapProjection(
            "person".into(),
            vec![
                MapProjectionItem::Property("name".into()),
                MapProjectionItem::Entry(
                    "birthYear".into(),
                    Expression::property("person", "born"),
                ),
            ],
        );

        assert_binding!(
            projection.to_cypher(),
            "`person` {.`name`, `birthYear`: `person`.`born`}"
        );
    }

    #[test]
    fn pattern_comprehension() {
        let comprehension = Expression::PatternComprehension(Box::new(PatternComprehension {
            pattern: acted_in("person", "person_movies"),
            predicate: Predicate::Eq(
                Expression::property("person_movies", "released"),
                Expression::Parameter("released".into()),
            ),
            projection: Expression::MapProjection(
                "person_movies".into(),
                vec![MapProjectionItem::Property("title".into())],
            ),
        }));

        assert_binding!(
            comprehension.head().to_cypher(),
            "head([(`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) WHERE `person_movies`.`released` = $released | `person_movies` {.`title`}])",
            "released"
        );
    }

    #[test]
    fn slices() {
        let list = Expression::variable("movies");

        assert_binding!(list.clone().slice(None, None).to_cypher(), "`movies`");
        assert_binding!(
            list.clone().slice(Some(1), Some(3)).to_cypher(),
            "`movies`[1..3]"
        );
        assert_binding!(list.slice(Some(2), None).to_cypher(), "`movies`[2..]");
    }

    #[test]
    fn collect_with_case() {
        let collected = Expression::Case(Box::new(CaseExpression {
            condition: Predicate::IsNull(Expression::variable("m")),
            then: Literal::Null.into(),
            otherwise: Expression::Map(vec![(
                "title".into(),
                Expression::property("m", "title"),
            )]),
        }))
        .collect();

        assert_binding!(
            collected.to_cypher(),
            "collect(CASE WHEN `m` IS NULL THEN null ELSE {`title`: `m`.`title`} END)"
        );
    }

    #[test]
    fn functions() {
        assert_binding!(Expression::CountAll.to_cypher(), "count(*)");
        assert_binding!(
            Expression::function("labels", vec![Expression::variable("n")]).to_cypher(),
            "labels(`n`)"
        );
    }
}
