//! Shape validation of untyped override trees against the default schema

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{ConfigError, Result};
use super::merge::{get_path, join_path, leaf_paths, set_path};

/// Check that every defined value in `candidate` sits at a path the schema
/// knows and has the same JSON kind as the schema's value there.
///
/// `null` is accepted anywhere and means "unset".
pub fn check_shape(schema: &Value, candidate: &Value) -> Result<()> {
    check_at(schema, candidate, "")
}

fn check_at(schema: &Value, candidate: &Value, path: &str) -> Result<()> {
    if candidate.is_null() {
        return Ok(());
    }

    match schema {
        Value::Object(fields) => {
            let Value::Object(entries) = candidate else {
                return Err(mismatch(path, schema, candidate));
            };
            for (key, value) in entries {
                let child_path = join_path(path, key);
                match fields.get(key) {
                    Some(expected) => check_at(expected, value, &child_path)?,
                    None => return Err(ConfigError::UnknownField { path: child_path }),
                }
            }
            Ok(())
        }
        Value::Array(samples) => {
            let Value::Array(items) = candidate else {
                return Err(mismatch(path, schema, candidate));
            };
            // Element kind is only known when the default carries a sample.
            if let Some(sample) = samples.first() {
                for (index, item) in items.iter().enumerate() {
                    if item.is_null() || !same_kind(sample, item) {
                        return Err(mismatch(&format!("{}[{}]", path, index), sample, item));
                    }
                }
            }
            Ok(())
        }
        _ if same_kind(schema, candidate) => Ok(()),
        _ => Err(mismatch(path, schema, candidate)),
    }
}

/// Check that every defined leaf of `candidate` deserializes into the typed
/// layer `T` on its own.
///
/// Catches what JSON kinds cannot express: enumeration variants, integer
/// widths and elements of arrays whose default is empty. Array elements are
/// reported as `path[index]`.
pub fn check_typed<T: DeserializeOwned>(candidate: &Value) -> Result<()> {
    for path in leaf_paths(candidate) {
        match get_path(candidate, &path) {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    check_leaf::<T>(&path, Value::Array(vec![item.clone()]))
                        .map_err(|e| invalid(format!("{}[{}]", path, index), e))?;
                }
            }
            Some(value) => {
                check_leaf::<T>(&path, value.clone()).map_err(|e| invalid(path.clone(), e))?;
            }
        }
    }
    Ok(())
}

fn check_leaf<T: DeserializeOwned>(path: &str, value: Value) -> serde_json::Result<()> {
    let mut single = Value::Object(Map::new());
    set_path(&mut single, path, value);
    serde_json::from_value::<T>(single).map(|_| ())
}

fn invalid(path: String, error: serde_json::Error) -> ConfigError {
    ConfigError::InvalidValue {
        path,
        reason: error.to_string(),
    }
}

/// JSON kinds match, with unsigned integers only accepting unsigned integers.
fn same_kind(expected: &Value, found: &Value) -> bool {
    match (expected, found) {
        (Value::Number(e), Value::Number(f)) => {
            if e.is_u64() {
                f.is_u64()
            } else if e.is_i64() {
                f.is_i64() || f.is_u64()
            } else {
                true
            }
        }
        _ => kind_name(expected) == kind_name(found),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_u64() => "an unsigned integer",
        Value::Number(n) if n.is_i64() => "an integer",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a record",
    }
}

fn mismatch(path: &str, expected: &Value, found: &Value) -> ConfigError {
    ConfigError::SchemaMismatch {
        path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
        expected: kind_name(expected),
        found: kind_name(found),
    }
}
