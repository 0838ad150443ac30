use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A key or literal slot inside a criteria node.
///
/// Keys must stay primitive (everything but `Custom`); constructors enforce
/// that. `Custom` carries an extension-produced literal such as a wildcard or
/// a named group, created through the registry's function-call syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Custom(CustomValue),
}

impl Value {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Custom(_))
    }

    /// Primitive JSON scalars map across; null, arrays and objects do not.
    pub fn from_json(v: &serde_json::Value) -> Option<Value> {
        match v {
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Value::Int(i)),
                None => n.as_f64().map(Value::Float),
            },
            serde_json::Value::String(s) => Some(Value::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            // an integral float keeps its fraction digit so it never
            // re-parses as an int
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Custom(c) => write!(f, "{}", c.repr()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Opaque literal built by a registered extension's deserializer.
///
/// The tag is the extension name and doubles as the eval-time dispatch key;
/// `repr` is the canonical call form the serializer prints back, so an
/// extension that canonicalizes its arguments round-trips through text.
#[derive(Clone)]
pub struct CustomValue {
    tag: String,
    repr: String,
    data: Arc<dyn Any + Send + Sync>,
}

impl CustomValue {
    pub fn new(
        tag: impl Into<String>,
        repr: impl Into<String>,
        data: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        CustomValue {
            tag: tag.into(),
            repr: repr.into(),
            data,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn repr(&self) -> &str {
        &self.repr
    }

    /// Borrow the extension-defined payload.
    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.data.downcast_ref()
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValue")
            .field("tag", &self.tag)
            .field("repr", &self.repr)
            .finish()
    }
}

impl PartialEq for CustomValue {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.repr == other.repr
    }
}

/// Quote a literal the way serialized criteria text expects: strings
/// single-quoted with escapes, everything else via Display.
pub(crate) fn quote(v: &Value) -> String {
    match v {
        Value::Str(s) => {
            let mut out = String::with_capacity(s.len() + 2);
            out.push('\'');
            for c in s.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    _ => out.push(c),
                }
            }
            out.push('\'');
            out
        }
        other => other.to_string(),
    }
}
