//! Target-shape descriptors and the normalization pass that folds imperfect
//! model output into a fully-populated value.
//!
//! Normalization never fails: missing or mistyped fields take their declared
//! defaults, so callers always receive every field.

use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Defaults to `""`.
    String,
    /// Defaults to `0`. Numeric strings are coerced ("12.5%", "95,000").
    Number,
    /// Upper-cased before matching; unknown values map to `default`.
    Enum {
        allowed: Vec<String>,
        default: String,
    },
    /// Defaults to `[]`. Elements of the wrong shape are dropped.
    Array(Box<FieldKind>),
    Object(Schema),
}

impl FieldKind {
    pub fn enumeration(allowed: &[&str], default: &str) -> Self {
        FieldKind::Enum {
            allowed: allowed.iter().map(|v| v.to_uppercase()).collect(),
            default: default.to_uppercase(),
        }
    }

    pub fn array_of(element: FieldKind) -> Self {
        FieldKind::Array(Box::new(element))
    }

    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::String => Value::String(String::new()),
            FieldKind::Number => Value::from(0),
            FieldKind::Enum { default, .. } => Value::String(default.clone()),
            FieldKind::Array(_) => Value::Array(Vec::new()),
            FieldKind::Object(schema) => Value::Object(schema.defaults()),
        }
    }

    fn normalize(&self, value: Option<&Value>) -> Value {
        let Some(value) = value else {
            return self.default_value();
        };
        match self {
            FieldKind::String => coerce_string(value).unwrap_or_default().into(),
            FieldKind::Number => coerce_number(value).unwrap_or_else(|| Value::from(0)),
            FieldKind::Enum { allowed, default } => {
                let candidate = value.as_str().map(|s| s.trim().to_uppercase());
                match candidate {
                    Some(v) if allowed.contains(&v) => Value::String(v),
                    _ => Value::String(default.clone()),
                }
            }
            FieldKind::Array(element) => match value {
                Value::Array(items) => Value::Array(
                    items
                        .iter()
                        .filter_map(|item| element.normalize_element(item))
                        .collect(),
                ),
                _ => Value::Array(Vec::new()),
            },
            FieldKind::Object(schema) => Value::Object(schema.normalize_object(value)),
        }
    }

    /// Array elements are kept only when they already have the right shape.
    fn normalize_element(&self, value: &Value) -> Option<Value> {
        match self {
            FieldKind::String => coerce_string(value)
                .filter(|s| !s.is_empty())
                .map(Value::String),
            FieldKind::Number => coerce_number(value),
            FieldKind::Enum { allowed, .. } => value
                .as_str()
                .map(|s| s.trim().to_uppercase())
                .filter(|v| allowed.contains(v))
                .map(Value::String),
            FieldKind::Array(_) => value.is_array().then(|| self.normalize(Some(value))),
            FieldKind::Object(schema) => value
                .is_object()
                .then(|| Value::Object(schema.normalize_object(value))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

/// Ordered set of named fields describing the expected payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn string(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::String)
    }

    pub fn number(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Number)
    }

    pub fn enumeration(self, name: impl Into<String>, allowed: &[&str], default: &str) -> Self {
        self.field(name, FieldKind::enumeration(allowed, default))
    }

    pub fn array(self, name: impl Into<String>, element: FieldKind) -> Self {
        self.field(name, FieldKind::array_of(element))
    }

    pub fn object(self, name: impl Into<String>, schema: Schema) -> Self {
        self.field(name, FieldKind::Object(schema))
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Folds `value` into an object holding exactly this schema's fields.
    ///
    /// A non-object root normalizes to all defaults. A bare array root is
    /// accepted when the schema has exactly one array field.
    pub fn normalize(&self, value: &Value) -> Value {
        if value.is_array() {
            if let Some(field) = self.sole_array_field() {
                let mut wrapped = Map::new();
                wrapped.insert(field.name.clone(), value.clone());
                return Value::Object(self.normalize_object(&Value::Object(wrapped)));
            }
        }
        Value::Object(self.normalize_object(value))
    }

    fn normalize_object(&self, value: &Value) -> Map<String, Value> {
        let source = value.as_object();
        self.fields
            .iter()
            .map(|field| {
                let raw = source.and_then(|obj| obj.get(&field.name)).filter(|v| !v.is_null());
                (field.name.clone(), field.kind.normalize(raw))
            })
            .collect()
    }

    fn defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.kind.default_value()))
            .collect()
    }

    fn sole_array_field(&self) -> Option<&Field> {
        let mut arrays = self
            .fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Array(_)));
        match (arrays.next(), arrays.next()) {
            (Some(field), None) => Some(field),
            _ => None,
        }
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numbers pass through; numeric strings are parsed after dropping whitespace,
/// a trailing `%`, and `,` separators. Non-finite results are rejected.
fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n.as_f64().filter(|x| x.is_finite()).map(|_| Value::Number(n.clone())),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_end_matches('%')
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            cleaned
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
        }
        _ => None,
    }
}
