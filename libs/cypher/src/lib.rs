// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! A small typed AST for the subset of Cypher produced by the GraphQL translator.
//!
//! Each constituent (literal, expression, pattern, clause) implements [ExpressionBuilder], which
//! renders it into a [CypherBuilder]. The builder accumulates the statement text along with the
//! names of the parameters (`$name`) the statement references, so that the caller can supply
//! exactly those values to the executor.
//!
//! The AST stays close to the textual form. Decisions such as variable naming and
//! how a GraphQL selection is lowered live in the resolver; this crate only guarantees consistent
//! quoting and formatting, so the same AST always renders to byte-identical text.

#[cfg(test)]
#[macro_use]
mod test_util;

mod builder;
mod clause;
mod expression;
mod expression_builder;
mod literal;
mod order;
mod pattern;
mod predicate;
mod statement;

pub use builder::CypherBuilder;
pub use clause::{Clause, Limit, ReturnItem, SetItem, Skip};
pub use expression::{
    CaseExpression, Expression, ListComprehension, MapProjectionItem, PatternComprehension,
};
pub use expression_builder::ExpressionBuilder;
pub use literal::Literal;
pub use order::{OrderBy, OrderByElement, Ordering};
pub use pattern::{Direction, NodePattern, Pattern, RelationshipPattern};
pub use predicate::{Predicate, Quantifier};
pub use statement::{Statement, StatementPrefix};
