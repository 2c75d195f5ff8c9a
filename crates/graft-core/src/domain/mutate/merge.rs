//! Recursive JSON merge.
//!
//! Objects merge key-by-key, arrays follow the configured
//! [`ArrayMergePolicy`], and everything else (scalars, or a type mismatch
//! between existing and incoming) resolves through [`ScalarPolicy`].

use serde_json::Value;

use crate::domain::entities::common::FileState;
use crate::domain::error::DomainError;
use crate::domain::value_objects::ArrayMergePolicy;

use super::Rewrite;

/// Who wins when existing and incoming values cannot be merged structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarPolicy {
    /// The blueprint's value replaces what is in the file.
    #[default]
    IncomingWins,
    /// The file's value is kept; incoming only fills gaps.
    ExistingWins,
}

/// Merge `incoming` into the JSON document held in `state`.
///
/// An absent file becomes an empty document when `create_if_absent` is set
/// and a [`DomainError::NotFound`] otherwise. Content that does not parse
/// as JSON surfaces as [`DomainError::ParseError`] with the original
/// message from the parser.
///
/// The result is serialized pretty-printed with a trailing newline, and
/// `changed` reflects a byte comparison against the input so a merge that
/// lands on the existing values (under user formatting that matches ours)
/// reports a no-op.
pub fn deep_merge(
    path: &str,
    state: &FileState,
    incoming: &Value,
    arrays: ArrayMergePolicy,
    scalars: ScalarPolicy,
    create_if_absent: bool,
) -> Result<Rewrite, DomainError> {
    let current = match state.content() {
        Some(content) => content,
        None if create_if_absent => "",
        None => {
            return Err(DomainError::NotFound {
                path: path.to_string(),
            });
        }
    };

    let base = parse_document(path, current)?;
    let merged = merge_values(base, incoming, arrays, scalars);

    let mut next = serde_json::to_string_pretty(&merged).map_err(|e| DomainError::ParseError {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    next.push('\n');

    if next == current {
        Ok(Rewrite::unchanged(next))
    } else {
        Ok(Rewrite::changed(next))
    }
}

/// Empty or whitespace-only content counts as an empty document; files are
/// often created blank before their first merge.
fn parse_document(path: &str, content: &str) -> Result<Value, DomainError> {
    if content.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(content).map_err(|e| DomainError::ParseError {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn merge_values(
    base: Value,
    incoming: &Value,
    arrays: ArrayMergePolicy,
    scalars: ScalarPolicy,
) -> Value {
    match (base, incoming) {
        (Value::Object(mut existing), Value::Object(new)) => {
            for (key, value) in new {
                match existing.remove(key) {
                    Some(prior) => {
                        existing.insert(key.clone(), merge_values(prior, value, arrays, scalars));
                    }
                    None => {
                        existing.insert(key.clone(), value.clone());
                    }
                }
            }
            Value::Object(existing)
        }
        (Value::Array(mut existing), Value::Array(new)) => match arrays {
            ArrayMergePolicy::Concat => {
                existing.extend(new.iter().cloned());
                Value::Array(existing)
            }
            ArrayMergePolicy::Replace => Value::Array(new.clone()),
            ArrayMergePolicy::Unique => {
                for value in new {
                    if !existing.contains(value) {
                        existing.push(value.clone());
                    }
                }
                Value::Array(existing)
            }
        },
        (existing, new) => match scalars {
            ScalarPolicy::IncomingWins => new.clone(),
            ScalarPolicy::ExistingWins => existing,
        },
    }
}

// ═══════════════════════════════════════════════
//                    TESTS
// ═══════════════════════════════════════════════
