//! JSON merge helpers for layered configuration.

use serde_json::Value;

/// Merge overlay values into the base, recursively overriding objects.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_json_values(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base_slot, overlay_value) => {
            *base_slot = overlay_value.clone();
        }
    }
}

/// camelCase spellings accepted per section, with the field they decode into.
const SECTION_ALIASES: &[(&str, &[(&str, &str)])] = &[
    (
        "ai",
        &[
            ("apiKey", "api_key"),
            ("maxTokens", "max_tokens"),
            ("timeoutSecs", "timeout_secs"),
        ],
    ),
    (
        "voice",
        &[
            ("autoActivation", "auto_activation"),
            ("autoActivationDelay", "auto_activation_delay"),
            ("silenceTimeout", "silence_timeout"),
        ],
    ),
];

/// Rewrite alias keys to their snake_case field names.
///
/// Layers are merged by literal key, so both spellings must collapse onto one
/// key first. When a single layer carries both, the snake_case value is kept.
pub(super) fn canonicalize_aliases(value: &mut Value) {
    let Value::Object(root) = value else {
        return;
    };
    for (section, aliases) in SECTION_ALIASES {
        let Some(Value::Object(map)) = root.get_mut(*section) else {
            continue;
        };
        for (alias, field) in *aliases {
            if let Some(aliased) = map.remove(*alias)
                && !map.contains_key(*field)
            {
                map.insert((*field).to_string(), aliased);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{canonicalize_aliases, merge_json_values};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn aliases_collapse_before_merge() {
        let mut base = json!({ "ai": { "apiKey": "sk-user", "model": "m" } });
        let mut overlay = json!({ "ai": { "api_key": "sk-project" } });
        canonicalize_aliases(&mut base);
        canonicalize_aliases(&mut overlay);
        merge_json_values(&mut base, &overlay);
        assert_eq!(base, json!({ "ai": { "api_key": "sk-project", "model": "m" } }));
    }

    #[test]
    fn snake_case_wins_within_one_layer() {
        let mut value = json!({ "voice": { "silenceTimeout": 3, "silence_timeout": 9 } });
        canonicalize_aliases(&mut value);
        assert_eq!(value, json!({ "voice": { "silence_timeout": 9 } }));
    }
}
