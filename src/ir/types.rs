use std::fmt;

/// First-class IR types in typed-pointer syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    I1,
    I8,
    I32,
    /// The `...` marker that closes a variadic parameter list.
    VarArgs,
    Ptr(Box<Type>),
    Array(u32, Box<Type>),
    /// Named struct type `%class.<name>`.
    Class(String),
    Struct(Vec<Type>),
}

impl Type {
    pub fn ptr(self) -> Type {
        Type::Ptr(Box::new(self))
    }

    pub fn class(name: impl Into<String>) -> Type {
        Type::Class(name.into())
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, Type::Ptr(_))
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    /// Class name when this is `%class.<name>*`.
    pub fn pointee_class(&self) -> Option<&str> {
        match self.pointee() {
            Some(Type::Class(name)) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::I1 => write!(f, "i1"),
            Type::I8 => write!(f, "i8"),
            Type::I32 => write!(f, "i32"),
            Type::VarArgs => write!(f, "..."),
            Type::Ptr(inner) => write!(f, "{inner}*"),
            Type::Array(len, elem) => write!(f, "[{len} x {elem}]"),
            Type::Class(name) => write!(f, "%class.{name}"),
            Type::Struct(fields) if fields.is_empty() => write!(f, "{{}}"),
            Type::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, " }}")
            }
        }
    }
}
