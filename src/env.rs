use crate::error::Error;
use crate::value::Value;
use std::fmt;

/// A single `NAME=VALUE` pair destined for a child process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvEntry {
    /// Variable name: the path of keys and 1-based indices leading to the value,
    /// joined with the separator.
    pub name: String,
    /// The scalar's text.
    pub value: String,
}

impl EnvEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for EnvEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Flatten a dict into environment entries.
///
/// Nesting is encoded in the variable name: `{"db": {"host": "x"}}` with separator `_`
/// yields `db_host=x`, and sequence elements are numbered from 1, so `{"a": ["x", "y"]}`
/// yields `a_1=x` and `a_2=y`. Entries come out depth-first in the dict's own order.
///
/// Values that have no environment representation (functions, structs, ...) contribute
/// nothing, which lets callers pass dicts carrying extra fields. Duplicate names are kept
/// and separator collisions are not detected.
pub fn flatten(mapping: &Value, sep: &str) -> Result<Vec<EnvEntry>, Error> {
    let Value::Dict(entries) = mapping else {
        return Err(Error::InvalidEnvironmentShape(mapping.type_name().to_string()));
    };
    let mut out = Vec::new();
    for (key, value) in entries {
        flatten_into(value, key.clone(), sep, &mut out);
    }
    tracing::debug!(entries = out.len(), sep, "flattened environment");
    Ok(out)
}

fn flatten_into(value: &Value, prefix: String, sep: &str, out: &mut Vec<EnvEntry>) {
    match value {
        Value::None
        | Value::Bool(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::String(_) => {
            if let Some(text) = value.scalar_text() {
                out.push(EnvEntry::new(prefix, text));
            }
        }
        Value::Dict(entries) => {
            for (key, nested) in entries {
                flatten_into(nested, format!("{prefix}{sep}{key}"), sep, out);
            }
        }
        Value::List(items) | Value::Set(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(item, format!("{prefix}{sep}{}", i + 1), sep, out);
            }
        }
        Value::Unsupported(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(entries: &[EnvEntry]) -> Vec<String> {
        entries.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_flat_scalars_one_entry_per_key() {
        let env = Value::dict([
            ("S", Value::string("text")),
            ("I", Value::int(7)),
            ("F", Value::float(0.5)),
            ("B", Value::Bool(false)),
            ("N", Value::None),
        ]);
        let entries = flatten(&env, "_").unwrap();
        assert_eq!(
            rendered(&entries),
            vec!["S=text", "I=7", "F=0.5", "B=False", "N=None"]
        );
    }

    #[test]
    fn test_nested_dict() {
        let env = Value::dict([("a", Value::dict([("b", Value::string("1"))]))]);
        assert_eq!(rendered(&flatten(&env, "_").unwrap()), vec!["a_b=1"]);
    }

    #[test]
    fn test_sequence_indices_start_at_one() {
        let env = Value::dict([(
            "a",
            Value::List(vec![Value::string("x"), Value::string("y")]),
        )]);
        assert_eq!(
            rendered(&flatten(&env, "_").unwrap()),
            vec!["a_1=x", "a_2=y"]
        );
    }

    #[test]
    fn test_depth_first_with_custom_separator() {
        let env = Value::dict([
            (
                "db",
                Value::dict([
                    ("host", Value::string("localhost")),
                    (
                        "ports",
                        Value::List(vec![Value::int(5432), Value::int(5433)]),
                    ),
                ]),
            ),
            ("tags", Value::Set(vec![Value::string("x")])),
            ("debug", Value::Bool(true)),
        ]);
        assert_eq!(
            rendered(&flatten(&env, "__").unwrap()),
            vec![
                "db__host=localhost",
                "db__ports__1=5432",
                "db__ports__2=5433",
                "tags__1=x",
                "debug=True",
            ]
        );
    }

    #[test]
    fn test_unsupported_values_are_skipped() {
        let env = Value::dict([
            ("callback", Value::Unsupported("function".into())),
            (
                "nested",
                Value::List(vec![
                    Value::Unsupported("struct".into()),
                    Value::string("kept"),
                ]),
            ),
        ]);
        assert_eq!(rendered(&flatten(&env, "_").unwrap()), vec!["nested_2=kept"]);
    }

    #[test]
    fn test_empty_containers_emit_nothing() {
        let env = Value::dict([
            ("empty_list", Value::List(vec![])),
            ("empty_dict", Value::dict::<&str>([])),
        ]);
        assert!(flatten(&env, "_").unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_and_collisions_pass_through() {
        let env = Value::dict([
            ("a_b", Value::string("flat")),
            ("a", Value::dict([("b", Value::string("nested"))])),
        ]);
        assert_eq!(
            rendered(&flatten(&env, "_").unwrap()),
            vec!["a_b=flat", "a_b=nested"]
        );
    }

    #[test]
    fn test_non_dict_is_rejected() {
        let inputs = [
            Value::string("x"),
            Value::int(1),
            Value::float(1.0),
            Value::Bool(true),
            Value::None,
            Value::List(vec![]),
            Value::Set(vec![]),
            Value::Unsupported("function".into()),
        ];
        for input in inputs {
            match flatten(&input, "_") {
                Err(Error::InvalidEnvironmentShape(ty)) => assert_eq!(ty, input.type_name()),
                other => panic!("expected InvalidEnvironmentShape for {input:?}, got {other:?}"),
            }
        }
    }
}
