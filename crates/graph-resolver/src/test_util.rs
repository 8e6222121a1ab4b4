// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use graph_model::MetadataRegistry;

use crate::document::parse_operation;
use crate::{
    Dialect, GeneratedQuery, OperationKind, QueryTranslator, TranslationError, TranslatorConfig,
    Variables,
};

pub(crate) const SCHEMA: &str = r#"
    enum Genre { DRAMA COMEDY ACTION }

    interface Entity {
        name: String!
    }

    type Person implements Entity {
        name: String!
        born: Int
        movies: [Movie] @relation(name: "ACTED_IN")
        company: Company @relation(name: "WORKS_AT")
        friends: [Person] @relation(name: "KNOWS")
        score: Float @cypher(statement: "RETURN size((this)--()) AS score")
        recommended(limit: Int = 3): [Movie] @cypher(statement: "MATCH (this)-[:ACTED_IN]->()<-[:ACTED_IN]-()-[:ACTED_IN]->(m) RETURN m LIMIT $limit")
        coActors: [Person] @cypher(statement: "MATCH (this)-[:ACTED_IN]->()<-[:ACTED_IN]-(p) RETURN p {.name}", passThrough: true)
    }

    type Movie {
        title: String!
        released: Int @defaultValue(value: 2000)
        genre: Genre
        actors: [Person] @relation(name: "ACTED_IN", direction: "IN")
    }

    type Company implements Entity {
        name: String!
        employees: [Person] @relation(name: "WORKS_AT", direction: "IN")
    }

    type Query {
        topMovies(count: Int = 10): [Movie] @cypher(statement: "MATCH (m:Movie) RETURN m ORDER BY m.released DESC LIMIT $count")
        movieCount: Int @cypher(statement: "MATCH (m:Movie) RETURN count(m) AS count")
        person(name: String): Person
    }

    type Mutation {
        rateMovie(title: String!, stars: Int = 5): Int @cypher(statement: "MATCH (m:Movie {title: $title}) SET m.stars = $stars RETURN m.stars", params: {source: "api"})
        resetStats: Int
    }
"#;

pub(crate) fn registry() -> Arc<MetadataRegistry> {
    Arc::new(graph_model_builder::parse(SCHEMA).unwrap())
}

pub(crate) fn translator(config: TranslatorConfig) -> QueryTranslator {
    QueryTranslator::new(registry(), config)
}

/// Translate the first field of the (only) operation in `query`
pub(crate) fn translate(
    dialect: Dialect,
    query: &str,
    variables: serde_json::Value,
) -> Result<GeneratedQuery, TranslationError> {
    translate_with(TranslatorConfig::default().with_dialect(dialect), query, variables)
}

pub(crate) fn translate_with(
    config: TranslatorConfig,
    query: &str,
    variables: serde_json::Value,
) -> Result<GeneratedQuery, TranslationError> {
    let variables: Variables = serde_json::from_value(variables).unwrap();
    let operation = parse_operation(query, None, variables).unwrap();
    let field = &operation.fields[0];
    let translator = translator(config);

    match operation.kind {
        OperationKind::Query => translator.translate_field(field, &operation.variables),
        OperationKind::Mutation => translator.translate_mutation(field, &operation.variables),
    }
}
