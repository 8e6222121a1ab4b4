// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{CypherBuilder, Expression, ExpressionBuilder};

/// List predicate functions, used to express conditions over related entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Any,
    None,
    All,
    Single,
}

impl Quantifier {
    fn function_name(&self) -> &'static str {
        match self {
            Quantifier::Any => "ANY",
            Quantifier::None => "NONE",
            Quantifier::All => "ALL",
            Quantifier::Single => "SINGLE",
        }
    }
}

/// A predicate is a boolean expression that can be used in a WHERE clause.
#[derive(Debug, PartialEq, Clone)]
pub enum Predicate {
    True,
    False,
    Eq(Expression, Expression),
    Neq(Expression, Expression),
    Lt(Expression, Expression),
    Lte(Expression, Expression),
    Gt(Expression, Expression),
    Gte(Expression, Expression),
    In(Expression, Expression),

    // string predicates
    Contains(Expression, Expression),
    StartsWith(Expression, Expression),
    EndsWith(Expression, Expression),

    IsNull(Expression),
    IsNotNull(Expression),

    /// `QUANTIFIER(variable IN list WHERE predicate)`
    Quantified(Quantifier, String, Expression, Box<Predicate>),

    // Prefer Predicate::and(), which simplifies the clause
    And(Box<Predicate>, Box<Predicate>),
    // Prefer Predicate::or(), which simplifies the clause
    Or(Box<Predicate>, Box<Predicate>),
    // Prefer `!predicate`, which simplifies the clause
    Not(Box<Predicate>),
}

impl Predicate {
    /// Logical and of two predicates, reducing to a simpler predicate if possible.
    pub fn and(lhs: Predicate, rhs: Predicate) -> Predicate {
        match (lhs, rhs) {
            (Predicate::False, _) | (_, Predicate::False) => Predicate::False,
            (Predicate::True, rhs) => rhs,
            (lhs, Predicate::True) => lhs,
            (lhs, rhs) if lhs == rhs => lhs,
            (lhs, rhs) => Predicate::And(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Logical or of two predicates, reducing to a simpler predicate if possible.
    pub fn or(lhs: Predicate, rhs: Predicate) -> Predicate {
        match (lhs, rhs) {
            (Predicate::True, _) | (_, Predicate::True) => Predicate::True,
            (Predicate::False, rhs) => rhs,
            (lhs, Predicate::False) => lhs,
            (lhs, rhs) if lhs == rhs => lhs,
            (lhs, rhs) => Predicate::Or(Box::new(lhs), Box::new(rhs)),
        }
    }

    /// Conjunction of all predicates (`true` for none)
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        predicates.into_iter().fold(Predicate::True, Predicate::and)
    }

    /// Disjunction of all predicates (`false` for none)
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
        predicates.into_iter().fold(Predicate::False, Predicate::or)
    }

    pub fn quantified(
        quantifier: Quantifier,
        variable: impl Into<String>,
        list: Expression,
        predicate: Predicate,
    ) -> Predicate {
        Predicate::Quantified(quantifier, variable.into(), list, Box::new(predicate))
    }
}

impl From<bool> for Predicate {
    fn from(b: bool) -> Predicate {
        if b { Predicate::True } else { Predicate::False }
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        match self {
            // Reduced to a simpler form when possible, else fall back to Predicate::Not
            Predicate::True => Predicate::False,
            Predicate::False => Predicate::True,
            Predicate::Eq(lhs, rhs) => Predicate::Neq(lhs, rhs),
            Predicate::Neq(lhs, rhs) => Predicate::Eq(lhs, rhs),
            Predicate::IsNull(expr) => Predicate::IsNotNull(expr),
            Predicate::IsNotNull(expr) => Predicate::IsNull(expr),
            Predicate::Quantified(Quantifier::Any, variable, list, predicate) => {
                Predicate::Quantified(Quantifier::None, variable, list, predicate)
            }
            Predicate::Quantified(Quantifier::None, variable, list, predicate) => {
                Predicate::Quantified(Quantifier::Any, variable, list, predicate)
            }
            Predicate::Not(predicate) => *predicate,
            predicate => Predicate::Not(Box::new(predicate)),
        }
    }
}

impl ExpressionBuilder for Predicate {
    fn build(&self, builder: &mut CypherBuilder) {
        match self {
            Predicate::True => builder.push_str("true"),
            Predicate::False => builder.push_str("false"),
            Predicate::Eq(lhs, rhs) => relational_combine(lhs, rhs, "=", builder),
            Predicate::Neq(lhs, rhs) => relational_combine(lhs, rhs, "<>", builder),
            Predicate::Lt(lhs, rhs) => relational_combine(lhs, rhs, "<", builder),
            Predicate::Lte(lhs, rhs) => relational_combine(lhs, rhs, "<=", builder),
            Predicate::Gt(lhs, rhs) => relational_combine(lhs, rhs, ">", builder),
            Predicate::Gte(lhs, rhs) => relational_combine(lhs, rhs, ">=", builder),
            Predicate::In(lhs, rhs) => relational_combine(lhs, rhs, "IN", builder),
            Predicate::Contains(lhs, rhs) => relational_combine(lhs, rhs, "CONTAINS", builder),
            Predicate::StartsWith(lhs, rhs) => {
                relational_combine(lhs, rhs, "STARTS WITH", builder)
            }
            Predicate::EndsWith(lhs, rhs) => relational_combine(lhs, rhs, "ENDS WITH", builder),
            Predicate::IsNull(expr) => {
                expr.build(builder);
                builder.push_str(" IS NULL");
            }
            Predicate::IsNotNull(expr) => {
                expr.build(builder);
                builder.push_str(" IS NOT NULL");
            }
            Predicate::Quantified(quantifier, variable, list, predicate) => {
                builder.push_str(quantifier.function_name());
                builder.push('(');
                builder.push_identifier(variable);
                builder.push_str(" IN ");
                list.build(builder);
                builder.push_str(" WHERE ");
                predicate.build(builder);
                builder.push(')');
            }
            Predicate::And(lhs, rhs) => logical_combine(lhs, rhs, "AND", builder),
            Predicate::Or(lhs, rhs) => logical_combine(lhs, rhs, "OR", builder),
            Predicate::Not(predicate) => {
                builder.push_str("NOT (");
                predicate.build(builder);
                builder.push(')');
            }
        }
    }
}

/// Combine two expressions with a relational operator.
fn relational_combine(
    left: &Expression,
    right: &Expression,
    op: &'static str,
    builder: &mut CypherBuilder,
) {
    left.build(builder);
    builder.push_space();
    builder.push_str(op);
    builder.push_space();
    right.build(builder);
}

/// Combine two predicates with a logical binary operator. Operands using the other logical
/// operator are parenthesized; operands using the same one are left flat (both are associative).
fn logical_combine(
    left: &Predicate,
    right: &Predicate,
    op: &'static str,
    builder: &mut CypherBuilder,
) {
    let build_operand = |operand: &Predicate, builder: &mut CypherBuilder| {
        let needs_parens = matches!(
            (operand, op),
            (Predicate::Or(..), "AND") | (Predicate::And(..), "OR")
        );
        if needs_parens {
            builder.push('(');
        }
        operand.build(builder);
        if needs_parens {
            builder.push(')');
        }
    };

    build_operand(left, builder);
    builder.push_space();
    builder.push_str(op);
    builder.push_space();
    build_operand(right, builder);
}

#[cfg(test)]
mod tests {
    use crate::Literal;

    use super::*;

    fn born() -> Expression {
        Expression::property("person", "born")
    }

    fn name() -> Expression {
        Expression::property("person", "name")
    }

    #[test]
    fn simplification() {
        let eq = Predicate::Eq(born(), Literal::Int(1958).into());

        assert_eq!(Predicate::and(Predicate::True, eq.clone()), eq);
        assert_eq!(Predicate::and(eq.clone(), Predicate::False), Predicate::False);
        assert_eq!(Predicate::or(Predicate::False, eq.clone()), eq);
        assert_eq!(Predicate::or(eq.clone(), Predicate::True), Predicate::True);
        assert_eq!(Predicate::all(vec![]), Predicate::True);
        assert_eq!(Predicate::any(vec![]), Predicate::False);
        assert_eq!(!!eq.clone(), eq);
    }

    #[test]
    fn nested_logical_operators() {
        let predicate = Predicate::and(
            Predicate::or(
                Predicate::Eq(name(), Literal::from("Tom").into()),
                Predicate::StartsWith(name(), Literal::from("M").into()),
            ),
            Predicate::and(
                Predicate::Gte(born(), Literal::Int(1950).into()),
                !Predicate::In(
                    born(),
                    Expression::List(vec![Literal::Int(1956).into()]),
                ),
            ),
        );

        assert_binding!(
            predicate.to_cypher(),
            r#"(`person`.`name` = "Tom" OR `person`.`name` STARTS WITH "M") AND `person`.`born` >= 1950 AND NOT (`person`.`born` IN [1956])"#
        );
    }

    #[test]
    fn quantified() {
        let predicate = Predicate::quantified(
            Quantifier::None,
            "company_employees",
            Expression::variable("employees"),
            Predicate::Eq(
                Expression::property("company_employees", "name"),
                Expression::Parameter("name".into()),
            ),
        );

        assert_binding!(
            predicate.to_cypher(),
            "NONE(`company_employees` IN `employees` WHERE `company_employees`.`name` = $name)",
            "name"
        );
        assert_binding!(
            (!predicate).to_cypher(),
            "ANY(`company_employees` IN `employees` WHERE `company_employees`.`name` = $name)",
            "name"
        );
    }
}
