//! Structured values crossing the boundary between scripts and the host.
//!
//! [`Value`] mirrors the shapes a Starlark program can produce. Numbers keep the
//! interpreter's own rendering so that arbitrary precision integers and float
//! formatting survive unchanged on their way into a process environment.

use crate::error::Error;
use starlark::values::Heap;
use starlark::values::Value as StarlarkValue;
use starlark::values::dict::DictRef;

/// A scripted value, as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    /// Integer in its canonical decimal rendering.
    Int(String),
    /// Float in its canonical rendering.
    Float(String),
    String(String),
    /// Ordered sequence (list or tuple).
    List(Vec<Value>),
    /// Unordered sequence. Element order is whatever the runtime iterated.
    Set(Vec<Value>),
    /// Mapping with string keys, in insertion order.
    Dict(Vec<(String, Value)>),
    /// Anything else (functions, structs, ...), identified by its type name.
    Unsupported(String),
}

impl Value {
    pub fn int(i: i64) -> Self {
        Value::Int(i.to_string())
    }

    /// Float rendered the way the interpreter prints it: integral values keep a
    /// trailing `.0` and infinities carry an explicit sign.
    pub fn float(f: f64) -> Self {
        let text = if f.is_nan() {
            "nan".to_string()
        } else if f.is_infinite() {
            (if f > 0.0 { "+inf" } else { "-inf" }).to_string()
        } else if f.fract() == 0.0 && f.abs() < 1e16 {
            format!("{f:.1}")
        } else {
            f.to_string()
        };
        Value::Float(text)
    }

    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Name of the value's type, using the interpreter's vocabulary.
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Dict(_) => "dict",
            Value::Unsupported(name) => name,
        }
    }

    /// Text of a scalar as it should appear in an environment variable.
    ///
    /// Returns `None` for containers and unsupported values.
    pub fn scalar_text(&self) -> Option<&str> {
        match self {
            Value::None => Some("None"),
            Value::Bool(true) => Some("True"),
            Value::Bool(false) => Some("False"),
            Value::Int(s) | Value::Float(s) | Value::String(s) => Some(s),
            Value::List(_) | Value::Set(_) | Value::Dict(_) | Value::Unsupported(_) => None,
        }
    }

    /// Convert an interpreter value, dispatching on its type tag.
    ///
    /// Dict keys that are not strings are rendered with `str()`. A container that holds
    /// itself is an [`Error::CyclicValue`]; the same value shared by siblings is fine.
    pub fn from_starlark<'v>(value: StarlarkValue<'v>, heap: &'v Heap) -> anyhow::Result<Self> {
        Converter {
            heap,
            ancestors: Vec::new(),
        }
        .convert(value)
    }
}

struct Converter<'v> {
    heap: &'v Heap,
    /// Containers currently being converted, outermost first.
    ancestors: Vec<StarlarkValue<'v>>,
}

impl<'v> Converter<'v> {
    fn convert(&mut self, value: StarlarkValue<'v>) -> anyhow::Result<Value> {
        let kind = value.get_type();
        Ok(match kind {
            "NoneType" => Value::None,
            "bool" => Value::Bool(value.unpack_bool().unwrap_or_default()),
            "int" => Value::Int(value.to_str()),
            "float" => Value::Float(value.to_str()),
            "string" => Value::String(value.to_str()),
            "dict" | "list" | "tuple" | "set" => {
                if self.ancestors.iter().any(|seen| seen.ptr_eq(value)) {
                    return Err(Error::CyclicValue(kind.to_string()).into());
                }
                self.ancestors.push(value);
                let converted = self.container(kind, value);
                self.ancestors.pop();
                converted?
            }
            other => Value::Unsupported(other.to_string()),
        })
    }

    fn container(&mut self, kind: &str, value: StarlarkValue<'v>) -> anyhow::Result<Value> {
        Ok(match kind {
            "dict" => match DictRef::from_value(value) {
                Some(dict) => {
                    let mut entries = Vec::with_capacity(dict.len());
                    for (k, v) in dict.iter() {
                        entries.push((key_text(k), self.convert(v)?));
                    }
                    Value::Dict(entries)
                }
                None => Value::Unsupported(kind.to_string()),
            },
            "set" => Value::Set(self.elements(value)?),
            _ => Value::List(self.elements(value)?),
        })
    }

    fn elements(&mut self, value: StarlarkValue<'v>) -> anyhow::Result<Vec<Value>> {
        let mut out = Vec::new();
        for item in value.iterate(self.heap).map_err(starlark::Error::into_anyhow)? {
            out.push(self.convert(item)?);
        }
        Ok(out)
    }
}

fn key_text(key: StarlarkValue) -> String {
    match key.unpack_str() {
        Some(s) => s.to_string(),
        None => key.to_str(),
    }
}

impl From<toml::Value> for Value {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::int(i),
            toml::Value::Float(f) => Value::float(f),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(table) => table.into(),
        }
    }
}

impl From<toml::Table> for Value {
    fn from(table: toml::Table) -> Self {
        Value::Dict(table.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_text() {
        assert_eq!(Value::None.scalar_text(), Some("None"));
        assert_eq!(Value::Bool(true).scalar_text(), Some("True"));
        assert_eq!(Value::Bool(false).scalar_text(), Some("False"));
        assert_eq!(Value::int(-42).scalar_text(), Some("-42"));
        assert_eq!(Value::string("a b").scalar_text(), Some("a b"));
        assert_eq!(Value::List(vec![]).scalar_text(), None);
        assert_eq!(Value::Unsupported("function".into()).scalar_text(), None);
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(Value::float(1.0), Value::Float("1.0".into()));
        assert_eq!(Value::float(2.5), Value::Float("2.5".into()));
        assert_eq!(Value::float(-0.25), Value::Float("-0.25".into()));
        assert_eq!(Value::float(f64::INFINITY), Value::Float("+inf".into()));
        assert_eq!(Value::float(f64::NEG_INFINITY), Value::Float("-inf".into()));
        assert_eq!(Value::float(f64::NAN), Value::Float("nan".into()));
    }

    #[test]
    fn test_from_toml_keeps_table_order() {
        let table: toml::Table = toml::from_str(
            r#"
            zeta = "last"
            alpha = 1
            nested = { b = true, a = [1.5, "x"] }
            "#,
        )
        .unwrap();

        let value = Value::from(table);
        assert_eq!(
            value,
            Value::dict([
                ("zeta", Value::string("last")),
                ("alpha", Value::int(1)),
                (
                    "nested",
                    Value::dict([
                        ("b", Value::Bool(true)),
                        (
                            "a",
                            Value::List(vec![Value::float(1.5), Value::string("x")])
                        ),
                    ])
                ),
            ])
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::dict::<&str>([]).type_name(), "dict");
        assert_eq!(Value::Set(vec![]).type_name(), "set");
        assert_eq!(Value::Unsupported("function".into()).type_name(), "function");
    }
}
