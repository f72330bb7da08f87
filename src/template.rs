//! Minimal `${key}` placeholder substitution
//!
//! Templates are resolved by exact, case-sensitive lookup against the
//! flattened properties of one event. `${key:default}` falls back to the
//! default text when the key is absent. No nesting, no expression
//! evaluation, no conditionals.

use anyhow::{anyhow, Result};

use crate::properties::FlatProperties;

/// Resolve every `${...}` placeholder in `template` against `props`.
///
/// - Text outside placeholders is copied verbatim; `$` not followed by
///   `{` is literal.
/// - `${key}` with no value for `key` is an error naming the key.
/// - `${key:default}` uses the default when `key` is absent; a present
///   key always wins, even when its value is empty.
/// - An unterminated `${` is an error.
pub fn substitute(template: &str, props: &FlatProperties) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or_else(|| anyhow!("Unterminated placeholder in template: {}", template))?;
        let body = &after[..end];

        // The first ':' separates the key from its default text
        let (key, default) = match body.find(':') {
            Some(sep) => (&body[..sep], Some(&body[sep + 1..])),
            None => (body, None),
        };

        match props.get(key) {
            Some(value) => out.push_str(value),
            None => match default {
                Some(text) => out.push_str(text),
                None => return Err(anyhow!("No value for placeholder: {}", key)),
            },
        }

        rest = &after[end + 1..];
    }
    out.push_str(rest);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> FlatProperties {
        let mut p = FlatProperties::new();
        for (k, v) in pairs {
            p.set(*k, *v);
        }
        p
    }

    #[test]
    fn test_substitute_single_key() {
        let p = props(&[("event.id", "e1")]);
        assert_eq!(
            substitute("http://h/${event.id}", &p).unwrap(),
            "http://h/e1"
        );
    }

    #[test]
    fn test_substitute_multiple_keys() {
        let p = props(&[("stage", "SUCCEEDED"), ("event.id", "e1")]);
        assert_eq!(
            substitute("id=${event.id};stage=${stage}", &p).unwrap(),
            "id=e1;stage=SUCCEEDED"
        );
    }

    #[test]
    fn test_substitute_no_placeholders() {
        let p = props(&[]);
        assert_eq!(substitute("plain text", &p).unwrap(), "plain text");
    }

    #[test]
    fn test_substitute_missing_key_fails() {
        let p = props(&[]);
        let err = substitute("${event.id}", &p).unwrap_err();
        assert!(err.to_string().contains("event.id"));
    }

    #[test]
    fn test_substitute_is_case_sensitive() {
        let p = props(&[("Stage", "SUCCEEDED")]);
        assert!(substitute("${stage}", &p).is_err());
    }

    #[test]
    fn test_substitute_default_used_when_absent() {
        let p = props(&[]);
        assert_eq!(substitute("${region:us-east}", &p).unwrap(), "us-east");
    }

    #[test]
    fn test_substitute_present_key_beats_default() {
        let p = props(&[("region", "eu-west")]);
        assert_eq!(substitute("${region:us-east}", &p).unwrap(), "eu-west");
    }

    #[test]
    fn test_substitute_empty_value_beats_default() {
        let p = props(&[("actionName", "")]);
        assert_eq!(substitute("${actionName:none}", &p).unwrap(), "");
    }

    #[test]
    fn test_substitute_default_splits_on_first_colon() {
        let p = props(&[]);
        assert_eq!(
            substitute("${endpoint:http://fallback:8080}", &p).unwrap(),
            "http://fallback:8080"
        );
    }

    #[test]
    fn test_substitute_empty_default() {
        let p = props(&[]);
        assert_eq!(substitute("x${gone:}y", &p).unwrap(), "xy");
    }

    #[test]
    fn test_substitute_unterminated_fails() {
        let p = props(&[("event.id", "e1")]);
        assert!(substitute("http://h/${event.id", &p).is_err());
    }

    #[test]
    fn test_substitute_bare_dollar_is_literal() {
        let p = props(&[("amount", "5")]);
        assert_eq!(substitute("$ ${amount} US$", &p).unwrap(), "$ 5 US$");
    }

    #[test]
    fn test_substitute_adjacent_placeholders() {
        let p = props(&[("a", "1"), ("b", "2")]);
        assert_eq!(substitute("${a}${b}", &p).unwrap(), "12");
    }
}
