// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Multi-clause statements: every relationship is matched by its own `OPTIONAL MATCH` (or
//! unwound from its custom statement) and collected by a `WITH` before the parent continues.
//! Variables still needed later are carried through each `WITH`.

use cypher::{
    CaseExpression, Clause, Expression, ListComprehension, Literal, Predicate, ReturnItem,
};

use super::{Backend, Translation, Traversal, project_scope, traversal_pattern};
use crate::TranslationError;

#[derive(Default)]
pub(super) struct Staged {
    pub clauses: Vec<Clause>,
}

impl Backend for Staged {
    fn traverse(
        &mut self,
        translation: &mut Translation<'_>,
        traversal: Traversal<'_>,
        keys: &mut Vec<String>,
    ) -> Result<Expression, TranslationError> {
        let Traversal {
            field,
            relationship,
            target,
            parent,
            variable,
            arguments,
            source,
        } = traversal;

        match source {
            None => self.clauses.push(Clause::optional_matching(
                traversal_pattern(&parent, relationship, &variable, target),
                arguments.predicate.clone(),
            )),
            Some(source) => {
                let list_variable = format!("{variable}_list");
                let list = if arguments.predicate == Predicate::True {
                    source
                } else {
                    Expression::ListComprehension(Box::new(ListComprehension {
                        variable: variable.clone(),
                        source,
                        predicate: arguments.predicate.clone(),
                        projection: None,
                    }))
                };

                self.clauses.push(Clause::With {
                    items: carry(keys, ReturnItem::new(list, &list_variable)),
                    order_by: None,
                });
                // An empty list would drop the parent's row
                self.clauses.push(Clause::Unwind {
                    expression: Expression::Case(Box::new(CaseExpression {
                        condition: Predicate::Eq(
                            Expression::function(
                                "size",
                                vec![Expression::variable(&list_variable)],
                            ),
                            Expression::Literal(Literal::Int(0)),
                        ),
                        then: Expression::List(vec![Expression::Literal(Literal::Null)]),
                        otherwise: Expression::variable(&list_variable),
                    })),
                    alias: variable.clone(),
                });
            }
        }

        let mut child_keys = keys.clone();
        child_keys.push(variable.clone());
        let projection = project_scope(
            self,
            translation,
            target,
            &variable,
            &field.selection_set,
            &mut child_keys,
        )?;

        if let Some(order_by) = arguments.order_by_clause(&variable) {
            self.clauses.push(Clause::With {
                items: child_keys.iter().map(ReturnItem::variable).collect(),
                order_by: Some(order_by),
            });
        }

        let element = Expression::Case(Box::new(CaseExpression {
            condition: Predicate::IsNull(Expression::variable(&variable)),
            then: Expression::Literal(Literal::Null),
            otherwise: projection,
        }));
        let (from, to) = match arguments.slice_bounds() {
            Some((from, to)) => (Some(from), to),
            None => (None, None),
        };
        let collected = element.collect().slice(from, to);
        let collected = if relationship.multi {
            collected
        } else {
            collected.head()
        };

        self.clauses.push(Clause::With {
            items: carry(keys, ReturnItem::new(collected, &variable)),
            order_by: None,
        });
        keys.push(variable.clone());

        Ok(Expression::variable(variable))
    }

    fn projection(&self, _variable: &str, entries: Vec<(String, Expression)>) -> Expression {
        Expression::Map(entries)
    }
}

/// The variables in scope followed by `item`
fn carry(keys: &[String], item: ReturnItem) -> Vec<ReturnItem> {
    keys.iter()
        .map(ReturnItem::variable)
        .chain(std::iter::once(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Dialect;
    use crate::test_util::translate;

    fn statement(query: &str, variables: serde_json::Value) -> String {
        translate(Dialect::Staged, query, variables).unwrap().statement
    }

    #[test]
    fn nested_relationships() {
        assert_eq!(
            statement(r#"{ Person(name: "Keanu") { name born movies { title } } }"#, json!({})),
            "MATCH (`person`:`Person`)\n\
             WHERE `person`.`name` = \"Keanu\"\n\
             OPTIONAL MATCH (`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`)\n\
             WITH `person`, collect(CASE WHEN `person_movies` IS NULL THEN null ELSE {`title`: `person_movies`.`title`} END) AS `person_movies`\n\
             RETURN {`name`: `person`.`name`, `born`: `person`.`born`, `movies`: `person_movies`} AS `Person`"
        );
    }

    #[test]
    fn repeated_fields_merge_selections() {
        assert_eq!(
            statement(
                "{ Person { movies { title } ... on Person { movies { released } } } }",
                json!({})
            ),
            "MATCH (`person`:`Person`)\n\
             OPTIONAL MATCH (`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`)\n\
             WITH `person`, collect(CASE WHEN `person_movies` IS NULL THEN null ELSE {`title`: `person_movies`.`title`, `released`: `person_movies`.`released`} END) AS `person_movies`\n\
             RETURN {`movies`: `person_movies`} AS `Person`"
        );
    }

    #[test]
    fn siblings_and_depth() {
        assert_eq!(
            statement(
                "{ Person { company { name } movies(orderBy: title_desc, first: 2) { title actors { name } } } }",
                json!({})
            ),
            "MATCH (`person`:`Person`)\n\
             OPTIONAL MATCH (`person`)-[:`WORKS_AT`]->(`person_company`:`Company`)\n\
             WITH `person`, head(collect(CASE WHEN `person_company` IS NULL THEN null ELSE {`name`: `person_company`.`name`} END)) AS `person_company`\n\
             OPTIONAL MATCH (`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`)\n\
             OPTIONAL MATCH (`person_movies`)<-[:`ACTED_IN`]-(`person_movies_actors`:`Person`)\n\
             WITH `person`, `person_company`, `person_movies`, collect(CASE WHEN `person_movies_actors` IS NULL THEN null ELSE {`name`: `person_movies_actors`.`name`} END) AS `person_movies_actors`\n\
             WITH `person`, `person_company`, `person_movies`, `person_movies_actors`\n\
             ORDER BY `person_movies`.`title` DESC\n\
             WITH `person`, `person_company`, collect(CASE WHEN `person_movies` IS NULL THEN null ELSE {`title`: `person_movies`.`title`, `actors`: `person_movies_actors`} END)[0..2] AS `person_movies`\n\
             RETURN {`company`: `person_company`, `movies`: `person_movies`} AS `Person`"
        );
    }

    #[test]
    fn custom_relationship() {
        assert_eq!(
            statement(
                "{ Person { recommended(released_gt: 1990) { title } } }",
                json!({})
            ),
            "MATCH (`person`:`Person`)\n\
             WITH `person`, [`person_recommended` IN graphql.run(\"MATCH (this)-[:ACTED_IN]->()<-[:ACTED_IN]-()-[:ACTED_IN]->(m) RETURN m LIMIT $limit\", {`this`: `person`, `limit`: 3}, true) WHERE `person_recommended`.`released` > 1990] AS `person_recommended_list`\n\
             UNWIND CASE WHEN size(`person_recommended_list`) = 0 THEN [null] ELSE `person_recommended_list` END AS `person_recommended`\n\
             WITH `person`, collect(CASE WHEN `person_recommended` IS NULL THEN null ELSE {`title`: `person_recommended`.`title`} END) AS `person_recommended`\n\
             RETURN {`recommended`: `person_recommended`} AS `Person`"
        );
    }

    #[test]
    fn root_ordering_and_pagination() {
        assert_eq!(
            statement(
                "{ Person(orderBy: born_asc, first: 2, offset: 1) { name movies { title } } }",
                json!({})
            ),
            "MATCH (`person`:`Person`)\n\
             OPTIONAL MATCH (`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`)\n\
             WITH `person`, collect(CASE WHEN `person_movies` IS NULL THEN null ELSE {`title`: `person_movies`.`title`} END) AS `person_movies`\n\
             RETURN {`name`: `person`.`name`, `movies`: `person_movies`} AS `Person`\n\
             ORDER BY `person`.`born` ASC\n\
             SKIP 1\n\
             LIMIT 2"
        );
    }

    #[test]
    fn filters_match_comprehension() {
        let query = r#"{ Company(filter: {employees_none: {name: "X"}}) { name } }"#;

        assert_eq!(
            statement(query, json!({})),
            translate(Dialect::Comprehension, query, json!({}))
                .unwrap()
                .statement
                .replace("RETURN `company` {.`name`}", "RETURN {`name`: `company`.`name`}")
        );
    }
}
