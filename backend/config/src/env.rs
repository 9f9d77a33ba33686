//! `${VAR}` substitution for config values.
//!
//! Only string leaves are touched and only uppercase `[A-Z_][A-Z0-9_]*`
//! names are matched. `$${VAR}` is an escape for a literal `${VAR}`.

use std::collections::HashMap;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// Group 1 is the escape `$`, group 2 the variable name.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$(\$)?\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var regex"));

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitutes references from the process environment. A reference to an
/// unset or empty variable is an error.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                out.insert(key.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if caps.get(1).is_some() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Names referenced anywhere in the tree, sorted and deduplicated. Escaped
/// references are not included.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect_vars(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect_vars(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            ENV_VAR_PATTERN
                .captures_iter(s)
                .filter(|caps| caps.get(1).is_none())
                .map(|caps| caps[2].to_string()),
        ),
        Value::Array(items) => items.iter().for_each(|v| collect_vars(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_vars(v, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_strings() {
        let v = json!({"translation": {"apiKey": "${LT_KEY}", "baseUrl": "http://${LT_HOST}:5000"}});
        let out = resolve_env_vars_with(&v, &env(&[("LT_KEY", "k-123"), ("LT_HOST", "box")])).unwrap();
        assert_eq!(out["translation"]["apiKey"], "k-123");
        assert_eq!(out["translation"]["baseUrl"], "http://box:5000");
    }

    #[test]
    fn missing_or_empty_var_names_the_path() {
        let v = json!({"backend": {"baseUrl": "${OLLAMA_HOST}"}});
        let err = resolve_env_vars_with(&v, &env(&[("OLLAMA_HOST", "")])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("OLLAMA_HOST"));
        assert!(msg.contains("backend.baseUrl"));
    }

    #[test]
    fn escaped_reference_is_kept_literally() {
        let v = json!({"note": "use $${HOME_DIR} here"});
        let out = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(out["note"], "use ${HOME_DIR} here");
    }

    #[test]
    fn lowercase_names_and_non_strings_pass_through() {
        let v = json!({"a": "${lower}", "b": 42, "c": [true, null]});
        let out = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(out, v);
    }

    #[test]
    fn collects_unescaped_names() {
        let v = json!({"a": "${FOO}", "b": ["${BAR}", "$${SKIP}"], "c": "${FOO}"});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR", "FOO"]);
    }
}
