// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::CypherBuilder;

/// A trait for types that can build themselves into a Cypher fragment.
///
/// Each constituent of a statement (literal, expression, pattern, clause, etc.) implements this
/// trait, which is then used to hierarchically build the statement text and the list of
/// parameters it references.
pub trait ExpressionBuilder {
    /// Build the fragment into the given builder
    fn build(&self, builder: &mut CypherBuilder);

    /// Build the fragment into a string along with the referenced parameter names. Useful for
    /// testing/debugging, where we want to assert on the generated text without setting up a
    /// builder explicitly.
    fn to_cypher(&self) -> (String, Vec<String>)
    where
        Self: Sized,
    {
        let mut builder = CypherBuilder::new();
        self.build(&mut builder);
        builder.into_cypher()
    }
}

impl<T> ExpressionBuilder for Box<T>
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut CypherBuilder) {
        self.as_ref().build(builder)
    }
}

impl<T> ExpressionBuilder for &T
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut CypherBuilder) {
        (**self).build(builder)
    }
}
