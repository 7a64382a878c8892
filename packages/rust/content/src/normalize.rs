//! Final text normalization over the serialized document.
//!
//! Output follows Swiss spelling: every string value in the document gets
//! `ß` replaced by `ss`. Object keys and non-string values are left alone.

use serde_json::Value;

/// Apply `f` to every string value, recursing through objects and arrays.
pub fn map_strings(value: &mut Value, f: &dyn Fn(&str) -> Option<String>) {
    match value {
        Value::String(s) => {
            if let Some(replaced) = f(s) {
                *s = replaced;
            }
        }
        Value::Array(items) => {
            for item in items {
                map_strings(item, f);
            }
        }
        Value::Object(map) => {
            for (_, item) in map.iter_mut() {
                map_strings(item, f);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Replace `ß` with `ss` in one string. Package entry paths go through this
/// too, so they keep matching the paths the document references.
pub fn eszett_to_ss(s: &str) -> String {
    s.replace('ß', "ss")
}

/// Replace `ß` with `ss` in every string value of `value`.
pub fn replace_eszett(value: &mut Value) {
    map_strings(value, &|s| s.contains('ß').then(|| eszett_to_ss(s)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replaces_in_nested_structures() {
        let mut doc = json!({
            "title": "Straße",
            "chapters": [
                {"params": {"content": [{"text": "Grüße aus der Großstadt"}]}},
                ["Fuß", 42, null, true]
            ],
            "Maß": "bleibt als Schlüssel"
        });
        replace_eszett(&mut doc);

        assert_eq!(doc["title"], "Strasse");
        assert_eq!(doc["chapters"][0]["params"]["content"][0]["text"], "Grüsse aus der Grossstadt");
        assert_eq!(doc["chapters"][1], json!(["Fuss", 42, null, true]));
        assert_eq!(doc["Maß"], "bleibt als Schlüssel");
    }

    #[test]
    fn untouched_without_eszett() {
        let original = json!({"a": ["b", {"c": 1.5}]});
        let mut doc = original.clone();
        replace_eszett(&mut doc);
        assert_eq!(doc, original);
    }

    #[test]
    fn single_string_replacement() {
        assert_eq!(eszett_to_ss("images/straße.png"), "images/strasse.png");
        assert_eq!(eszett_to_ss("images/tram.png"), "images/tram.png");
    }

    #[test]
    fn map_strings_is_generic() {
        let mut doc = json!(["a", {"b": "c"}]);
        map_strings(&mut doc, &|s| Some(s.to_uppercase()));
        assert_eq!(doc, json!(["A", {"b": "C"}]));
    }
}
