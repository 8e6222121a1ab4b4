// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{CypherBuilder, Expression, ExpressionBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// `(variable:Label1:Label2 {key: value})`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodePattern {
    pub variable: Option<String>,
    pub labels: Vec<String>,
    pub properties: Vec<(String, Expression)>,
}

/// `-[variable:TYPE]->` or `<-[variable:TYPE]-`
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipPattern {
    pub variable: Option<String>,
    pub rel_type: String,
    pub direction: Direction,
}

/// A node followed by zero or more relationship hops
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub start: NodePattern,
    pub hops: Vec<(RelationshipPattern, NodePattern)>,
}

impl NodePattern {
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            variable: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Expression) -> Self {
        self.properties.push((key.into(), value));
        self
    }
}

impl RelationshipPattern {
    pub fn new(rel_type: impl Into<String>, direction: Direction) -> Self {
        Self {
            variable: None,
            rel_type: rel_type.into(),
            direction,
        }
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = Some(variable.into());
        self
    }
}

impl Pattern {
    pub fn node(start: NodePattern) -> Self {
        Self {
            start,
            hops: vec![],
        }
    }

    pub fn related(mut self, relationship: RelationshipPattern, node: NodePattern) -> Self {
        self.hops.push((relationship, node));
        self
    }
}

impl ExpressionBuilder for NodePattern {
    fn build(&self, builder: &mut CypherBuilder) {
        builder.push('(');
        if let Some(variable) = &self.variable {
            builder.push_identifier(variable);
        }
        for label in &self.labels {
            builder.push(':');
            builder.push_identifier(label);
        }
        if !self.properties.is_empty() {
            builder.push_str(" {");
            builder.push_iter(self.properties.iter(), ", ", |builder, (key, value)| {
                builder.push_identifier(key);
                builder.push_str(": ");
                value.build(builder);
            });
            builder.push('}');
        }
        builder.push(')');
    }
}

impl ExpressionBuilder for RelationshipPattern {
    fn build(&self, builder: &mut CypherBuilder) {
        let (prefix, suffix) = match self.direction {
            Direction::Outgoing => ("-[", "]->"),
            Direction::Incoming => ("<-[", "]-"),
        };
        builder.push_str(prefix);
        if let Some(variable) = &self.variable {
            builder.push_identifier(variable);
        }
        builder.push(':');
        builder.push_identifier(&self.rel_type);
        builder.push_str(suffix);
    }
}

impl ExpressionBuilder for Pattern {
    fn build(&self, builder: &mut CypherBuilder) {
        self.start.build(builder);
        for (relationship, node) in &self.hops {
            relationship.build(builder);
            node.build(builder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_node() {
        let pattern = Pattern::node(
            NodePattern::variable("person")
                .with_label("Person")
                .with_label("Actor")
                .with_property("name", Expression::Parameter("name".into())),
        );

        assert_binding!(
            pattern.to_cypher(),
            "(`person`:`Person`:`Actor` {`name`: $name})",
            "name"
        );
    }

    #[test]
    fn directions() {
        let outgoing = Pattern::node(NodePattern::variable("person")).related(
            RelationshipPattern::new("ACTED_IN", Direction::Outgoing),
            NodePattern::variable("movie").with_label("Movie"),
        );
        assert_binding!(
            outgoing.to_cypher(),
            "(`person`)-[:`ACTED_IN`]->(`movie`:`Movie`)"
        );

        let incoming = Pattern::node(NodePattern::variable("movie")).related(
            RelationshipPattern::new("ACTED_IN", Direction::Incoming).with_variable("r"),
            NodePattern::default().with_label("Person"),
        );
        assert_binding!(
            incoming.to_cypher(),
            "(`movie`)<-[`r`:`ACTED_IN`]-(:`Person`)"
        );
    }
}
