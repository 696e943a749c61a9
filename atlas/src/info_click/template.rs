use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};

/// Maximum number of segments in a placeholder path. Longer paths resolve to an empty string.
const MAX_PATH_SEGMENTS: usize = 3;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\{([^{}]*)\}").unwrap()
});

/// Substitutes `{path}` placeholders in the template with values of the attributes.
///
/// A path is a dot separated sequence of up to three keys: `{id}`, `{owner.name}`, `{owner.address.city}`. Missing
/// keys, `null` values and longer paths are substituted with an empty string. Strings are inserted as is, other
/// values in their JSON notation.
///
/// ```
/// use atlas::info_click::expand_template;
/// use serde_json::json;
///
/// let attributes = json!({"owner": {"name": "Lot 7"}, "id": 42});
/// let text = expand_template("{owner.name} ({id})", attributes.as_object().unwrap());
/// assert_eq!(text, "Lot 7 (42)");
/// ```
pub fn expand_template(template: &str, attributes: &Map<String, Value>) -> String {
    PLACEHOLDER
        .replace_all(template, |captures: &Captures| {
            lookup(attributes, &captures[1]).unwrap_or_default()
        })
        .into_owned()
}

fn lookup(attributes: &Map<String, Value>, path: &str) -> Option<String> {
    let segments: Vec<&str> = path.trim().split('.').map(str::trim).collect();
    if segments.len() > MAX_PATH_SEGMENTS {
        return None;
    }

    let (first, rest) = segments.split_first()?;
    let mut value = attributes.get(*first)?;
    for segment in rest {
        value = value.get(*segment)?;
    }

    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn attributes() -> Map<String, Value> {
        match json!({
            "id": 42,
            "name": "Parcel",
            "active": true,
            "owner": {"name": "Lot 7", "address": {"city": "Göteborg", "geo": {"lat": 57.7}}},
            "empty": null
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn nested_paths() {
        assert_eq!(
            expand_template("{owner.name} ({id})", &attributes()),
            "Lot 7 (42)"
        );
        assert_eq!(
            expand_template("{ owner.address.city }", &attributes()),
            "Göteborg"
        );
    }

    #[test]
    fn missing_values_are_empty() {
        assert_eq!(expand_template("[{missing}]", &attributes()), "[]");
        assert_eq!(expand_template("[{owner.missing}]", &attributes()), "[]");
        assert_eq!(expand_template("[{name.inner.deep}]", &attributes()), "[]");
        assert_eq!(expand_template("[{empty}]", &attributes()), "[]");
    }

    #[test]
    fn paths_longer_than_three_segments_are_empty() {
        assert_eq!(
            expand_template("[{owner.address.geo.lat}]", &attributes()),
            "[]"
        );
    }

    #[test]
    fn non_string_values() {
        assert_eq!(
            expand_template("{active} {owner.address.geo}", &attributes()),
            r#"true {"lat":57.7}"#
        );
    }

    #[test]
    fn text_without_placeholders() {
        assert_eq!(expand_template("No data", &attributes()), "No data");
    }
}
