//! `$name` placeholders in action content.
//!
//! Action effects and requirements may leave values open, for example
//! `{"type": "development", "method": "add", "params": {"id": "$id",
//! "landId": "$landId"}}`. The caller supplies the values when performing
//! the action. A string is a placeholder only when the whole string is `$`
//! followed by an identifier; `"$5 fee"` stays a literal.

use std::collections::BTreeMap;

use kingdom_types::{EffectDef, RequirementDef};
use serde_json::Value;

/// Values supplied for an action's placeholders, keyed by name without `$`.
pub type ActionParams = BTreeMap<String, Value>;

/// A placeholder had no value in the supplied params.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing action parameter `{name}`")]
pub struct MissingParam {
    /// Placeholder name without the `$`.
    pub name: String,
}

fn placeholder_name(text: &str) -> Option<&str> {
    text.strip_prefix('$').filter(|name| {
        !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

/// Replace every placeholder in `value` with its param, recursively.
pub fn substitute(value: &Value, params: &ActionParams) -> Result<Value, MissingParam> {
    match value {
        Value::String(text) => match placeholder_name(text) {
            Some(name) => params.get(name).cloned().ok_or_else(|| MissingParam {
                name: name.to_owned(),
            }),
            None => Ok(value.clone()),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| substitute(item, params))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(fields) => fields
            .iter()
            .map(|(key, item)| substitute(item, params).map(|item| (key.clone(), item)))
            .collect::<Result<serde_json::Map<_, _>, _>>()
            .map(Value::Object),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
    }
}

/// A copy of `effect` with its params substituted.
pub fn substitute_effect(effect: &EffectDef, params: &ActionParams) -> Result<EffectDef, MissingParam> {
    Ok(EffectDef {
        params: substitute(&effect.params, params)?,
        ..effect.clone()
    })
}

/// A copy of `requirement` with its params substituted.
pub fn substitute_requirement(
    requirement: &RequirementDef,
    params: &ActionParams,
) -> Result<RequirementDef, MissingParam> {
    Ok(RequirementDef {
        params: substitute(&requirement.params, params)?,
        ..requirement.clone()
    })
}
