// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::TranslationError;

/// Map a `first` or `offset` argument to a non-negative count
pub(crate) fn count(argument: &str, value: &serde_json::Value) -> Result<i64, TranslationError> {
    value
        .as_i64()
        .filter(|count| *count >= 0)
        .ok_or_else(|| {
            TranslationError::invalid_argument(
                argument,
                format!("expected a non-negative integer, got {value}"),
            )
        })
}

/// Bounds of a list slice implementing `offset` and `first`: `[skip..skip+limit]`, or `[skip..]`
/// without a limit. `None` if the list is not to be sliced at all.
pub(crate) fn slice_bounds(skip: Option<i64>, limit: Option<i64>) -> Option<(i64, Option<i64>)> {
    if skip.is_none() && limit.is_none() {
        return None;
    }
    let start = skip.unwrap_or(0);
    Some((start, limit.map(|limit| start.saturating_add(limit))))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn counts() {
        assert_eq!(count("first", &json!(3)), Ok(3));
        assert!(count("first", &json!(-1)).is_err());
        assert_eq!(
            count("offset", &json!("2")).unwrap_err().to_string(),
            "Invalid argument 'offset': expected a non-negative integer, got \"2\""
        );
    }

    #[test]
    fn slices() {
        assert_eq!(slice_bounds(None, None), None);
        assert_eq!(slice_bounds(Some(2), None), Some((2, None)));
        assert_eq!(slice_bounds(None, Some(3)), Some((0, Some(3))));
        assert_eq!(slice_bounds(Some(2), Some(3)), Some((2, Some(5))));
        assert_eq!(
            slice_bounds(Some(i64::MAX), Some(5)),
            Some((i64::MAX, Some(i64::MAX)))
        );
    }
}
