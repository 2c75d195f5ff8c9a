//! Execution context: the read-only parameter bag for one blueprint run.

use serde_json::{Map, Value};

/// Parameters a blueprint execution runs against.
///
/// A **Value Object** assembled by the caller from project metadata and
/// invocation parameters, then handed to the executor. Immutable during
/// execution — transformations create new instances (see `with_value`).
///
/// Values form a JSON tree and are addressed by dotted path:
///
/// | Path | Example value | Source |
/// |------|---------------|--------|
/// | `project.name` | "my-app" | target directory name |
/// | `project.root` | "/home/me/my-app" | absolute target path |
/// | `project.hasApi` | true | caller parameter |
///
/// Conditions and `{{…}}` placeholders both resolve through [`get`].
///
/// [`get`]: ExecutionContext::get
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionContext {
    values: Map<String, Value>,
}

impl ExecutionContext {
    /// Empty context — every condition on a parameter evaluates falsy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Insert a value at a dotted path, consuming self.
    ///
    /// Intermediate objects are created as needed; a scalar in the way is
    /// replaced by an object so later segments have somewhere to live:
    ///
    /// ```rust,ignore
    /// let ctx = ExecutionContext::new()
    ///     .with_value("project.name", "my-app")
    ///     .with_value("project.hasApi", true);
    /// ```
    pub fn with_value(mut self, path: &str, value: impl Into<Value>) -> Self {
        insert_at_path(&mut self.values, path, value.into());
        self
    }

    /// Resolve a dotted path. `None` when any segment is missing or a
    /// non-object is traversed into.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.values.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Textual form of a value for interpolation: strings render bare,
    /// everything else renders as its JSON text.
    pub fn text(&self, path: &str) -> Option<String> {
        self.get(path).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Truthiness of a dotted path; unknown paths are falsy.
    ///
    /// Absence is meaningful in a condition (the caller simply did not set
    /// the parameter), so it is not an error here — malformed *expressions*
    /// error in the condition evaluator instead.
    pub fn is_truthy(&self, path: &str) -> bool {
        self.get(path).is_some_and(truthy)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Truthiness of a JSON value, matching the conventions blueprint authors
/// expect from configuration files: `null`, `false`, `0` and `""` are
/// falsy; arrays and objects are truthy even when empty.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn insert_at_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_owned(), value);
        }
        Some((head, rest)) => {
            let entry = map
                .entry(head.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(inner) = entry {
                insert_at_path(inner, rest, value);
            }
        }
    }
}
