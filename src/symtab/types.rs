use serde::{Deserialize, Serialize};

use crate::ir::Type;

/// A resolved MiniJava type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MjType {
    Int,
    Boolean,
    IntArray,
    Object(String),
}

impl MjType {
    /// Storage type of a value of this type: objects and arrays live behind pointers.
    pub fn ir_type(&self) -> Type {
        match self {
            MjType::Int => Type::I32,
            MjType::Boolean => Type::I1,
            MjType::IntArray => Type::I32.ptr(),
            MjType::Object(name) => Type::class(name.clone()).ptr(),
        }
    }
}

impl std::fmt::Display for MjType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MjType::Int => write!(f, "int"),
            MjType::Boolean => write!(f, "boolean"),
            MjType::IntArray => write!(f, "int[]"),
            MjType::Object(name) => write!(f, "{name}"),
        }
    }
}
