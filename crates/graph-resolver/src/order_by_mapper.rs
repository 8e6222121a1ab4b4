// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use cypher::Ordering;
use graph_model::TypeMetadata;

use crate::TranslationError;

/// Map an `orderBy` argument (`title_asc`, or a list such as `[born_desc, name_asc]`) to the
/// properties to sort by.
pub(crate) fn order_by(
    argument: &serde_json::Value,
    metadata: &TypeMetadata,
) -> Result<Vec<(String, Ordering)>, TranslationError> {
    match argument {
        serde_json::Value::Null => Ok(vec![]),
        serde_json::Value::String(token) => Ok(vec![ordering(token, metadata)?]),
        serde_json::Value::Array(elems) => elems
            .iter()
            .map(|elem| match elem {
                serde_json::Value::String(token) => ordering(token, metadata),
                _ => Err(TranslationError::InvalidOrdering(elem.to_string())),
            })
            .collect(),
        _ => Err(TranslationError::InvalidOrdering(argument.to_string())),
    }
}

fn ordering(token: &str, metadata: &TypeMetadata) -> Result<(String, Ordering), TranslationError> {
    let invalid = || TranslationError::InvalidOrdering(token.to_string());

    let (property, direction) = token.rsplit_once('_').ok_or_else(invalid)?;
    let ordering = match direction.to_lowercase().as_str() {
        "asc" => Ordering::Asc,
        "desc" => Ordering::Desc,
        _ => return Err(invalid()),
    };

    match metadata.property(property) {
        Some(_) => Ok((property.to_string(), ordering)),
        None => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use graph_model::{PropertyInfo, PropertyType};
    use serde_json::json;

    use super::*;

    fn person() -> TypeMetadata {
        let mut person = TypeMetadata::new("Person");
        for property in ["name", "born", "first_name"] {
            person
                .add_property(PropertyInfo::new(property, PropertyType::scalar("String")))
                .unwrap();
        }
        person
    }

    #[test]
    fn single_and_multiple() {
        let person = person();

        assert_eq!(
            order_by(&json!("name_asc"), &person).unwrap(),
            vec![("name".to_string(), Ordering::Asc)]
        );
        assert_eq!(
            order_by(&json!(["born_desc", "first_name_asc"]), &person).unwrap(),
            vec![
                ("born".to_string(), Ordering::Desc),
                ("first_name".to_string(), Ordering::Asc)
            ]
        );
    }

    #[test]
    fn invalid() {
        let person = person();

        for token in ["name", "name_up", "title_asc"] {
            assert_eq!(
                order_by(&json!(token), &person),
                Err(TranslationError::InvalidOrdering(token.to_string()))
            );
        }
        assert!(order_by(&json!(5), &person).is_err());
    }
}
