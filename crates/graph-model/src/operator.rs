// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Filter operators, expressed as suffixes of argument names (`name_starts_with`, `born_gte`,
//! `employees_none`, ...).

use serde::{Deserialize, Serialize};

use crate::{PropertyType, RelationshipInfo, ScalarKind};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gte,
    Gt,
    Lte,
    Lt,
    NotIn,
    In,
    NotContains,
    NotStartsWith,
    NotEndsWith,
    Contains,
    StartsWith,
    EndsWith,
    Some,
    None,
    Every,
    Single,
}

const ALL_OPERATORS: [Operator; 18] = [
    Operator::Eq,
    Operator::Neq,
    Operator::Gte,
    Operator::Gt,
    Operator::Lte,
    Operator::Lt,
    Operator::NotIn,
    Operator::In,
    Operator::NotContains,
    Operator::NotStartsWith,
    Operator::NotEndsWith,
    Operator::Contains,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::Some,
    Operator::None,
    Operator::Every,
    Operator::Single,
];

const STRING_OPERATORS: [Operator; 6] = [
    Operator::Contains,
    Operator::NotContains,
    Operator::StartsWith,
    Operator::NotStartsWith,
    Operator::EndsWith,
    Operator::NotEndsWith,
];

const QUANTIFIERS: [Operator; 4] = [
    Operator::Some,
    Operator::None,
    Operator::Every,
    Operator::Single,
];

impl Operator {
    /// The argument-name suffix (without the separating `_`); empty for equality
    pub fn suffix(&self) -> &'static str {
        match self {
            Operator::Eq => "",
            Operator::Neq => "not",
            Operator::Gte => "gte",
            Operator::Gt => "gt",
            Operator::Lte => "lte",
            Operator::Lt => "lt",
            Operator::NotIn => "not_in",
            Operator::In => "in",
            Operator::NotContains => "not_contains",
            Operator::NotStartsWith => "not_starts_with",
            Operator::NotEndsWith => "not_ends_with",
            Operator::Contains => "contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Some => "some",
            Operator::None => "none",
            Operator::Every => "every",
            Operator::Single => "single",
        }
    }

    /// The operator applied once the negation (if any) is factored out
    pub fn positive(&self) -> Operator {
        match self {
            Operator::Neq => Operator::Eq,
            Operator::NotIn => Operator::In,
            Operator::NotContains => Operator::Contains,
            Operator::NotStartsWith => Operator::StartsWith,
            Operator::NotEndsWith => Operator::EndsWith,
            op => *op,
        }
    }

    pub fn is_negated(&self) -> bool {
        self.positive() != *self
    }

    /// Split an argument name into the field it refers to and the operator applied to it.
    ///
    /// Suffixes are tried longest first, so `born_not_in` resolves to [Operator::NotIn] on
    /// `born` rather than [Operator::In] on `born_not`. A suffix only matches if the remaining
    /// name is declared; names without a matching suffix mean equality.
    pub fn resolve<'a>(
        argument_name: &'a str,
        declared_names: impl Fn(&str) -> bool,
    ) -> (&'a str, Operator) {
        let mut candidates: Vec<Operator> = ALL_OPERATORS
            .iter()
            .copied()
            .filter(|op| !op.suffix().is_empty())
            .collect();
        candidates.sort_by_key(|op| std::cmp::Reverse(op.suffix().len()));

        candidates
            .into_iter()
            .find_map(|op| {
                argument_name
                    .strip_suffix(op.suffix())
                    .and_then(|rest| rest.strip_suffix('_'))
                    .filter(|base| declared_names(base))
                    .map(|base| (base, op))
            })
            .unwrap_or((argument_name, Operator::Eq))
    }

    /// Operators applicable to a property of the given type
    pub fn for_type(property_type: &PropertyType) -> Vec<Operator> {
        use Operator::*;

        match property_type.kind {
            ScalarKind::Boolean => vec![Eq, Neq],
            ScalarKind::Enum | ScalarKind::Object => vec![Eq, Neq, In, NotIn],
            kind => {
                let mut operators = vec![Eq, Neq, In, NotIn, Lt, Lte, Gt, Gte];
                if kind.is_string_like() {
                    operators.extend(STRING_OPERATORS);
                }
                operators
            }
        }
    }

    /// Operators applicable to a relationship
    pub fn for_relationship(relationship: &RelationshipInfo) -> Vec<Operator> {
        use Operator::*;

        let mut operators = vec![Eq, Neq, In, NotIn];
        if relationship.multi {
            operators.extend(QUANTIFIERS);
        }
        operators
    }

    /// The argument name for applying this operator to `field_name`
    pub fn argument_name(&self, field_name: &str) -> String {
        match self {
            Operator::Eq => field_name.to_string(),
            op => format!("{field_name}_{}", op.suffix()),
        }
    }
}
