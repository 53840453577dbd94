// ABOUTME: `${KEY}` / `${KEY|default}` substitution for project YAML files.
// ABOUTME: Values come from -p parameters, then the process environment, then the inline default.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::ConfigError;

static VARIABLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([\w-]+)(?:\|([^}]*))?\}").expect("variable pattern is a valid regex")
});

/// Parse `KEY=VALUE` pairs from the command line. Whitespace around the key
/// and value is trimmed; the value may itself contain `=`.
pub fn parse_key_values<S: AsRef<str>>(pairs: &[S]) -> Result<HashMap<String, String>, ConfigError> {
    pairs
        .iter()
        .map(|pair| {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| ConfigError::InvalidParameter(pair.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::InvalidParameter(pair.to_string()));
            }
            Ok((key.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Replace every `${KEY}` and `${KEY|default}` in `content`.
///
/// Unknown keys without a default become the empty string.
pub fn substitute(content: &str, params: &HashMap<String, String>) -> String {
    let replaced = VARIABLE_PATTERN.replace_all(content, |caps: &Captures<'_>| {
        let key = &caps[1];
        if let Some(value) = params.get(key) {
            return value.clone();
        }
        if let Ok(value) = std::env::var(key) {
            return value;
        }
        caps.get(2)
            .map(|default| default.as_str().to_string())
            .unwrap_or_default()
    });

    replaced.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parameters_win_over_defaults() {
        let out = substitute("tag: ${TAG|latest}", &params(&[("TAG", "v2")]));
        assert_eq!(out, "tag: v2");
    }

    #[test]
    fn default_used_when_key_is_unset() {
        temp_env::with_var_unset("ECS_CUTOVER_TEST_UNSET", || {
            let out = substitute("count: ${ECS_CUTOVER_TEST_UNSET|3}", &HashMap::new());
            assert_eq!(out, "count: 3");
        });
    }

    #[test]
    fn environment_used_before_default() {
        temp_env::with_var("ECS_CUTOVER_TEST_ENV", Some("from-env"), || {
            let out = substitute("v: ${ECS_CUTOVER_TEST_ENV|fallback}", &HashMap::new());
            assert_eq!(out, "v: from-env");
        });
    }

    #[test]
    fn unknown_key_without_default_becomes_empty() {
        temp_env::with_var_unset("ECS_CUTOVER_TEST_MISSING", || {
            let out = substitute("a${ECS_CUTOVER_TEST_MISSING}b", &HashMap::new());
            assert_eq!(out, "ab");
        });
    }

    #[test]
    fn parses_key_values_with_equals_in_value() {
        let parsed = parse_key_values(&[" ENV = prod ", "URL=http://x?a=b"]).unwrap();
        assert_eq!(parsed["ENV"], "prod");
        assert_eq!(parsed["URL"], "http://x?a=b");
    }

    #[test]
    fn rejects_pair_without_equals() {
        let err = parse_key_values(&["ENV"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidParameter(p) if p == "ENV"));
    }

    proptest! {
        #[test]
        fn text_without_placeholders_is_unchanged(s in "[a-zA-Z0-9 :_\\n-]{0,64}") {
            prop_assert_eq!(substitute(&s, &HashMap::new()), s);
        }

        #[test]
        fn supplied_parameter_always_replaces_placeholder(
            key in "PROPKEY_[A-Z]{1,8}",
            value in "[a-z0-9]{0,16}",
        ) {
            let content = format!("x: ${{{key}}}");
            let out = substitute(&content, &params(&[(key.as_str(), value.as_str())]));
            prop_assert_eq!(out, format!("x: {value}"));
        }
    }
}
