// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Single-clause statements: every relationship becomes a pattern comprehension nested in the
//! projection of its parent.

use cypher::{
    Expression, ListComprehension, Literal, MapProjectionItem, Ordering, PatternComprehension,
    Predicate,
};

use super::{Backend, Translation, Traversal, project_scope, traversal_pattern};
use crate::TranslationError;

pub(super) struct Comprehension;

impl Backend for Comprehension {
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

        let projection = project_scope(
            self,
            translation,
            target,
            &variable,
            &field.selection_set,
            keys,
        )?;
        let (from, to) = match arguments.slice_bounds() {
            Some((from, to)) => (Some(from), to),
            None => (None, None),
        };
        let predicate = arguments.predicate;

        let related = if arguments.order_by.is_empty() {
            let related = match source {
                None => Expression::PatternComprehension(Box::new(PatternComprehension {
                    pattern: traversal_pattern(&parent, relationship, &variable, target),
                    predicate,
                    projection,
                })),
                Some(source) => Expression::ListComprehension(Box::new(ListComprehension {
                    variable,
                    source,
                    predicate,
                    projection: Some(projection),
                })),
            };
            related.slice(from, to)
        } else {
            // Sort the matching entities first, then project the requested slice of them
            let matching = match source {
                None => Expression::PatternComprehension(Box::new(PatternComprehension {
                    pattern: traversal_pattern(&parent, relationship, &variable, target),
                    predicate,
                    projection: Expression::variable(&variable),
                })),
                Some(source) if predicate == Predicate::True => source,
                Some(source) => Expression::ListComprehension(Box::new(ListComprehension {
                    variable: variable.clone(),
                    source,
                    predicate,
                    projection: None,
                })),
            };
            let sort_keys = arguments
                .order_by
                .iter()
                .map(|(property, ordering)| {
                    let key = match ordering {
                        Ordering::Asc => format!("^{property}"),
                        Ordering::Desc => property.clone(),
                    };
                    Expression::Literal(Literal::String(key))
                })
                .collect();
            let sorted = Expression::function(
                &translation.translator.config().sort_function,
                vec![matching, Expression::List(sort_keys)],
            );

            Expression::ListComprehension(Box::new(ListComprehension {
                variable,
                source: sorted.slice(from, to),
                predicate: Predicate::True,
                projection: Some(projection),
            }))
        };

        Ok(if relationship.multi {
            related
        } else {
            related.head()
        })
    }

    fn projection(&self, variable: &str, entries: Vec<(String, Expression)>) -> Expression {
        let items = entries
            .into_iter()
            .map(|(key, value)| match value {
                Expression::Property(owner, property) if owner == variable && property == key => {
                    MapProjectionItem::Property(property)
                }
                value => MapProjectionItem::Entry(key, value),
            })
            .collect();

        Expression::MapProjection(variable.to_string(), items)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Dialect;
    use crate::test_util::translate;

    fn statement(query: &str, variables: serde_json::Value) -> String {
        translate(Dialect::Comprehension, query, variables)
            .unwrap()
            .statement
    }

    #[test]
    fn nested_relationships() {
        assert_eq!(
            statement(r#"{ Person(name: "Keanu") { name born movies { title } } }"#, json!({})),
            "MATCH (`person`:`Person`)\n\
             WHERE `person`.`name` = \"Keanu\"\n\
             RETURN `person` {.`name`, .`born`, `movies`: [(`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) | `person_movies` {.`title`}]} AS `Person`"
        );

        // Aliases name the nested variables; single relationships take the head
        assert_eq!(
            statement(
                "{ people: Person { employer: company { name } films: movies { cast: actors { name } } } }",
                json!({})
            ),
            "MATCH (`person`:`Person`)\n\
             RETURN `person` {`employer`: head([(`person`)-[:`WORKS_AT`]->(`person_employer`:`Company`) | `person_employer` {.`name`}]), \
             `films`: [(`person`)-[:`ACTED_IN`]->(`person_films`:`Movie`) | `person_films` {`cast`: [(`person_films`)<-[:`ACTED_IN`]-(`person_films_cast`:`Person`) | `person_films_cast` {.`name`}]}]} AS `people`"
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
             RETURN `person` {`movies`: [(`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) | `person_movies` {.`title`, .`released`}]} AS `Person`"
        );
    }

    #[test]
    fn nested_arguments() {
        assert_eq!(
            statement(
                "{ Person { movies(released_gte: 2000, first: 2, offset: 1) { title } } }",
                json!({})
            ),
            "MATCH (`person`:`Person`)\n\
             RETURN `person` {`movies`: [(`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) WHERE `person_movies`.`released` >= 2000 | `person_movies` {.`title`}][1..3]} AS `Person`"
        );

        assert_eq!(
            statement("{ Person { movies(offset: 2) { title } } }", json!({})),
            "MATCH (`person`:`Person`)\n\
             RETURN `person` {`movies`: [(`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) | `person_movies` {.`title`}][2..]} AS `Person`"
        );
    }

    #[test]
    fn nested_ordering() {
        assert_eq!(
            statement(
                "{ Person { movies(orderBy: [released_asc, title_desc], first: 2) { title } } }",
                json!({})
            ),
            "MATCH (`person`:`Person`)\n\
             RETURN `person` {`movies`: [`person_movies` IN graphql.sortColl([(`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) | `person_movies`], [\"^released\", \"title\"])[0..2] | `person_movies` {.`title`}]} AS `Person`"
        );
    }

    #[test]
    fn root_ordering_and_pagination() {
        assert_eq!(
            statement(
                "query($first: Int) { Person(orderBy: [name_asc, born_desc], first: $first, offset: 1) { name } }",
                json!({"first": 2})
            ),
            "MATCH (`person`:`Person`)\n\
             RETURN `person` {.`name`} AS `Person`\n\
             ORDER BY `person`.`name` ASC, `person`.`born` DESC\n\
             SKIP 1\n\
             LIMIT 2"
        );
    }

    #[test]
    fn custom_fields() {
        assert_eq!(
            statement(
                "{ Person { score recommended(limit: 5, first: 1) { title } coActors } }",
                json!({})
            ),
            "MATCH (`person`:`Person`)\n\
             RETURN `person` {\
             `score`: head(graphql.run(\"RETURN size((this)--()) AS score\", {`this`: `person`}, true)), \
             `recommended`: [`person_recommended` IN graphql.run(\"MATCH (this)-[:ACTED_IN]->()<-[:ACTED_IN]-()-[:ACTED_IN]->(m) RETURN m LIMIT $limit\", {`this`: `person`, `limit`: 5}, true) | `person_recommended` {.`title`}][0..1], \
             `coActors`: graphql.run(\"MATCH (this)-[:ACTED_IN]->()<-[:ACTED_IN]-(p) RETURN p {.name}\", {`this`: `person`}, true)\
             } AS `Person`"
        );
    }

    #[test]
    fn custom_relationship_ordering() {
        assert_eq!(
            statement(
                "query($limit: Int) { Person { recommended(limit: $limit, orderBy: title_asc, released_gt: 1990) { title } } }",
                json!({"limit": 2})
            ),
            "MATCH (`person`:`Person`)\n\
             RETURN `person` {`recommended`: [`person_recommended` IN graphql.sortColl([`person_recommended` IN graphql.run(\"MATCH (this)-[:ACTED_IN]->()<-[:ACTED_IN]-()-[:ACTED_IN]->(m) RETURN m LIMIT $limit\", {`this`: `person`, `limit`: $limit}, true) WHERE `person_recommended`.`released` > 1990], [\"^title\"]) | `person_recommended` {.`title`}]} AS `Person`"
        );
    }

    #[test]
    fn relationship_filters() {
        assert_eq!(
            statement(
                r#"{ Person(filter: {company: {name: "ACME"}}) { name } }"#,
                json!({})
            ),
            "MATCH (`person`:`Person`)\n\
             WHERE ANY(`person_company` IN [(`person`)-[:`WORKS_AT`]->(`person_company`:`Company`) | `person_company`] WHERE `person_company`.`name` = \"ACME\")\n\
             RETURN `person` {.`name`} AS `Person`"
        );

        assert_eq!(
            statement(
                r#"{ Company(filter: {employees_none: {name: "X"}}) { name } }"#,
                json!({})
            ),
            "MATCH (`company`:`Company`)\n\
             WHERE NONE(`company_employees` IN [(`company`)<-[:`WORKS_AT`]-(`company_employees`:`Person`) | `company_employees`] WHERE `company_employees`.`name` = \"X\")\n\
             RETURN `company` {.`name`} AS `Company`"
        );
    }

    #[test]
    fn plural_and_suffix_arguments() {
        assert_eq!(
            statement(
                r#"{ Movie(titles: ["Matrix", "Speed"], released_not_in: [1999]) { title } }"#,
                json!({})
            ),
            "MATCH (`movie`:`Movie`)\n\
             WHERE `movie`.`title` IN [\"Matrix\", \"Speed\"] AND NOT (`movie`.`released` IN [1999])\n\
             RETURN `movie` {.`title`} AS `Movie`"
        );
    }
}
