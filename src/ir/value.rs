use std::fmt;

use super::types::Type;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Bool(bool),
    /// Local register or parameter, rendered `%name`.
    Reg(String),
    /// Global symbol, rendered `@name`.
    Global(String),
    Null,
}

impl Value {
    pub fn reg(name: impl Into<String>) -> Value {
        Value::Reg(name.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Reg(name) => write!(f, "%{name}"),
            Value::Global(name) => write!(f, "@{name}"),
            Value::Null => write!(f, "null"),
        }
    }
}

/// A value together with its type, the shape every instruction operand takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    pub ty: Type,
    pub value: Value,
}

impl Operand {
    pub fn new(ty: Type, value: Value) -> Self {
        Self { ty, value }
    }

    pub fn i32(n: i32) -> Self {
        Self::new(Type::I32, Value::Int(n))
    }

    pub fn bool(b: bool) -> Self {
        Self::new(Type::I1, Value::Bool(b))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.value)
    }
}
