//! Argument bags and their normalization into a form body.
//!
//! Both calling shapes end up here: a structured JSON object passed through
//! verbatim, or an action struct that lays out its fields in positional
//! order. `normalize` is the single place that decides what is actually
//! transmitted.

use serde::Serialize;
use serde_json::Value;

use crate::error::BuildError;
use crate::http::{Form, FormValue, InputFile};

#[derive(Debug, Clone, PartialEq)]
enum Param {
    Json(Value),
    File(InputFile),
}

/// Ordered, named arguments for one Bot API call.
///
/// A field set to `None` or JSON `null` counts as "not provided" and is
/// dropped by `normalize`. Setting the same name twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    fields: Vec<(String, Option<Param>)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the fields of a JSON object verbatim.
    pub fn from_object(value: Value) -> Result<Self, BuildError> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(BuildError::NotAnObject(json_kind(&other))),
        };
        let fields = map
            .into_iter()
            .map(|(name, value)| (name, Some(Param::Json(value))))
            .collect();
        Ok(Self { fields })
    }

    /// Serialize any struct whose field names are Bot API field names.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, BuildError> {
        let value = serde_json::to_value(value).map_err(|source| BuildError::Serialization {
            field: "<root>".to_string(),
            source,
        })?;
        Self::from_object(value)
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name.into(), Some(Param::Json(value.into())));
        self
    }

    /// Set a field from any serializable value, such as a reply markup.
    pub fn serialized<T: Serialize>(
        mut self,
        name: impl Into<String>,
        value: Option<&T>,
    ) -> Result<Self, BuildError> {
        let name = name.into();
        let param = match value {
            Some(value) => {
                let json = serde_json::to_value(value).map_err(|source| BuildError::Serialization {
                    field: name.clone(),
                    source,
                })?;
                Some(Param::Json(json))
            }
            None => None,
        };
        self.insert(name, param);
        Ok(self)
    }

    pub fn file(mut self, name: impl Into<String>, file: InputFile) -> Self {
        self.insert(name.into(), Some(Param::File(file)));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn insert(&mut self, name: String, param: Option<Param>) {
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = param,
            None => self.fields.push((name, param)),
        }
    }
}

/// Reply markup fields carry client-side UI directives and are always sent
/// as JSON text, whatever their shape. A string markup is encoded as a JSON
/// string too, so pass markup as an object rather than pre-encoded text.
pub fn is_markup_field(name: &str) -> bool {
    name == "reply_markup" || name.ends_with("_markup")
}

/// Turn an argument bag into a form body.
///
/// Absent and `null` fields are dropped; arrays, nested objects and markup
/// fields become JSON text; everything else passes through. Returns `None`
/// when no field survives, so callers never send an empty form.
pub fn normalize(params: Params) -> Option<Form> {
    let form: Form = params
        .fields
        .into_iter()
        .filter_map(|(name, param)| {
            let value = normalize_field(&name, param?)?;
            Some((name, value))
        })
        .collect();
    (!form.is_empty()).then_some(form)
}

fn normalize_field(name: &str, param: Param) -> Option<FormValue> {
    let value = match param {
        Param::File(file) => return Some(FormValue::File(file)),
        Param::Json(value) => value,
    };
    match value {
        Value::Null => None,
        _ if is_markup_field(name) => Some(FormValue::Text(value.to_string())),
        Value::String(s) => Some(FormValue::Text(s)),
        Value::Array(_) | Value::Object(_) => Some(FormValue::Text(value.to_string())),
        Value::Bool(b) => Some(FormValue::Bool(b)),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => FormValue::Integer(i),
            None if n.is_f64() => FormValue::Float(n.as_f64().unwrap_or_default()),
            None => FormValue::Text(n.to_string()),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
