//! Sanitization of persisted or capacity-changed selections.
//!
//! Storage content is untrusted: it may have been written by an older
//! client, edited by hand, or cut off by a quota error. Bad elements are
//! dropped silently and never fail the load.

use std::collections::HashSet;

use serde_json::Value;

use super::Selectable;

/// Turn an arbitrary persisted value into a valid selection.
///
/// Non-arrays yield an empty selection. Elements that are not objects or do
/// not decode into `T` are skipped, then [`sanitize`] applies.
pub fn normalize<T: Selectable>(input: Value, max: usize) -> Vec<T> {
    let Value::Array(elements) = input else {
        return Vec::new();
    };

    let decoded = elements.into_iter().filter_map(|raw| {
        if !raw.is_object() {
            return None;
        }
        match serde_json::from_value::<T>(raw) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(error = %e, "dropping undecodable compare item");
                None
            }
        }
    });

    sanitize(decoded, max)
}

/// Keep items with a non-empty id and title, first occurrence of each id
/// wins, and stop after `max` accepted items.
pub fn sanitize<T: Selectable>(items: impl IntoIterator<Item = T>, max: usize) -> Vec<T> {
    let mut result = Vec::new();
    if max == 0 {
        return result;
    }

    let mut seen = HashSet::new();
    for item in items {
        if item.id().is_empty() || item.title().is_empty() {
            continue;
        }
        if !seen.insert(item.id().to_string()) {
            continue;
        }
        result.push(item);
        if result.len() >= max {
            break;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ServiceItem;
    use serde_json::json;

    fn ids(items: &[ServiceItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_non_array_is_empty() {
        assert!(normalize::<ServiceItem>(json!({"id": "1", "title": "X"}), 3).is_empty());
        assert!(normalize::<ServiceItem>(json!("[]"), 3).is_empty());
        assert!(normalize::<ServiceItem>(Value::Null, 3).is_empty());
    }

    #[test]
    fn test_duplicates_keep_first_and_cap() {
        let input = json!([
            {"id": "1", "title": "first"},
            {"id": "2", "title": "Y"},
            {"id": "1", "title": "second"},
            {"id": "3", "title": "Z"},
            {"id": "4", "title": "W"}
        ]);

        let items: Vec<ServiceItem> = normalize(input, 3);
        assert_eq!(ids(&items), vec!["1", "2", "3"]);
        assert_eq!(items[0].title, "first");
    }

    #[test]
    fn test_drops_missing_id_or_title_and_keeps_order() {
        let input = json!([
            {"id": "1", "title": "X"},
            {"title": "no id"},
            {"id": "", "title": "blank id"},
            {"id": "2"},
            {"id": "3", "title": ""},
            42,
            null,
            "4",
            {"id": "5", "title": "Z"}
        ]);

        let items: Vec<ServiceItem> = normalize(input, 10);
        assert_eq!(ids(&items), vec!["1", "5"]);
    }

    #[test]
    fn test_wrong_field_types_are_dropped() {
        let input = json!([
            {"id": 1, "title": "numeric id"},
            {"id": "2", "title": "Y", "priceMin": "cheap"},
            {"id": "3", "title": "Z"}
        ]);

        let items: Vec<ServiceItem> = normalize(input, 3);
        assert_eq!(ids(&items), vec!["3"]);
    }

    #[test]
    fn test_sanitize_trims_tail_for_smaller_max() {
        let items = vec![ServiceItem::new("1", "X"), ServiceItem::new("2", "Y"), ServiceItem::new("3", "Z")];
        let trimmed = sanitize(items, 2);
        assert_eq!(ids(&trimmed), vec!["1", "2"]);
    }

    #[test]
    fn test_zero_max_accepts_nothing() {
        let items = vec![ServiceItem::new("1", "X")];
        assert!(sanitize(items, 0).is_empty());
    }
}
