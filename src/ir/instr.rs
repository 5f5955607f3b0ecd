use std::fmt;

use super::types::Type;
use super::value::{Operand, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    And,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::And => "and",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpCond {
    Slt,
    Eq,
}

impl fmt::Display for IcmpCond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcmpCond::Slt => write!(f, "slt"),
            IcmpCond::Eq => write!(f, "eq"),
        }
    }
}

/// One line of an IR module: a top-level declaration, a function boundary,
/// a label, or an instruction inside a function body.
///
/// Register and label names are stored bare; `Display` adds the sigils.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// Private constant byte string. The terminating NUL is appended on render.
    GlobalString { name: String, bytes: Vec<u8> },
    TypeDecl { name: String, fields: Vec<Type> },
    Define { ret: Type, name: String, params: Vec<(Type, String)> },
    /// Closing brace of a function body.
    EndFunction,
    Label(String),
    Alloca { dest: String, ty: Type },
    Store { value: Operand, ptr: Operand },
    Load { dest: String, ty: Type, ptr: Operand },
    Binary { dest: String, op: BinaryOp, ty: Type, lhs: Value, rhs: Value },
    Icmp { dest: String, cond: IcmpCond, ty: Type, lhs: Value, rhs: Value },
    Br { target: String },
    CondBr { cond: Value, then_label: String, else_label: String },
    Gep { dest: String, base_ty: Type, ptr: Operand, indices: Vec<Operand> },
    Bitcast { dest: String, from: Operand, to: Type },
    PtrToInt { dest: String, from: Operand, to: Type },
    Zext { dest: String, from: Operand, to: Type },
    /// `sig` carries the full parameter list for variadic callees, which the
    /// textual form requires at the call site.
    Call {
        dest: Option<String>,
        ret: Type,
        sig: Option<Vec<Type>>,
        callee: String,
        args: Vec<Operand>,
    },
    Ret(Operand),
    Declare { ret: Type, name: String, params: Vec<Type> },
}

impl Instr {
    /// Whether this instruction ends a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instr::Br { .. } | Instr::CondBr { .. } | Instr::Ret(_))
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_c_string(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    write!(f, "c\"")?;
    for &b in bytes.iter().chain(std::iter::once(&0u8)) {
        if b.is_ascii_graphic() && b != b'"' && b != b'\\' || b == b' ' {
            write!(f, "{}", b as char)?;
        } else {
            write!(f, "\\{b:02X}")?;
        }
    }
    write!(f, "\"")
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::GlobalString { name, bytes } => {
                write!(f, "@{name} = private constant [{} x i8] ", bytes.len() + 1)?;
                write_c_string(f, bytes)
            }
            Instr::TypeDecl { name, fields } => {
                write!(f, "%class.{name} = type {}", Type::Struct(fields.clone()))
            }
            Instr::Define { ret, name, params } => {
                write!(f, "define {ret} @{name}(")?;
                for (i, (ty, pname)) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{ty} %{pname}")?;
                }
                write!(f, ") {{")
            }
            Instr::EndFunction => write!(f, "}}"),
            Instr::Label(name) => write!(f, "{name}:"),
            Instr::Alloca { dest, ty } => write!(f, "  %{dest} = alloca {ty}"),
            Instr::Store { value, ptr } => write!(f, "  store {value}, {ptr}"),
            Instr::Load { dest, ty, ptr } => write!(f, "  %{dest} = load {ty}, {ptr}"),
            Instr::Binary { dest, op, ty, lhs, rhs } => {
                write!(f, "  %{dest} = {op} {ty} {lhs}, {rhs}")
            }
            Instr::Icmp { dest, cond, ty, lhs, rhs } => {
                write!(f, "  %{dest} = icmp {cond} {ty} {lhs}, {rhs}")
            }
            Instr::Br { target } => write!(f, "  br label %{target}"),
            Instr::CondBr { cond, then_label, else_label } => {
                write!(f, "  br i1 {cond}, label %{then_label}, label %{else_label}")
            }
            Instr::Gep { dest, base_ty, ptr, indices } => {
                write!(f, "  %{dest} = getelementptr {base_ty}, {ptr}")?;
                for idx in indices {
                    write!(f, ", {idx}")?;
                }
                Ok(())
            }
            Instr::Bitcast { dest, from, to } => write!(f, "  %{dest} = bitcast {from} to {to}"),
            Instr::PtrToInt { dest, from, to } => {
                write!(f, "  %{dest} = ptrtoint {from} to {to}")
            }
            Instr::Zext { dest, from, to } => write!(f, "  %{dest} = zext {from} to {to}"),
            Instr::Call { dest, ret, sig, callee, args } => {
                write!(f, "  ")?;
                if let Some(dest) = dest {
                    write!(f, "%{dest} = ")?;
                }
                write!(f, "call {ret} ")?;
                if let Some(sig) = sig {
                    write!(f, "(")?;
                    write_list(f, sig)?;
                    write!(f, ") ")?;
                }
                write!(f, "@{callee}(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
            Instr::Ret(value) => write!(f, "  ret {value}"),
            Instr::Declare { ret, name, params } => {
                write!(f, "declare {ret} @{name}(")?;
                write_list(f, params)?;
                write!(f, ")")
            }
        }
    }
}
