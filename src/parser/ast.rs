use serde::{Deserialize, Serialize};

use crate::span::Spanned;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub main_class: Spanned<MainClass>,
    pub classes: Vec<Spanned<ClassDecl>>,
}

/// The entry class: `class Name { public static void main(String[] arg) { stmt } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainClass {
    pub name: Spanned<String>,
    pub arg_name: Spanned<String>,
    pub body: Spanned<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: Spanned<String>,
    pub superclass: Option<Spanned<String>>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<Spanned<MethodDecl>>,
}

/// A typed name: field, parameter, or method local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: Spanned<String>,
    pub ty: Spanned<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: Spanned<String>,
    pub return_type: Spanned<TypeExpr>,
    pub params: Vec<VarDecl>,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Spanned<Stmt>>,
    pub return_expr: Spanned<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    Int,
    Boolean,
    IntArray,
    Named(String),
}

impl std::fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeExpr::Int => write!(f, "int"),
            TypeExpr::Boolean => write!(f, "boolean"),
            TypeExpr::IntArray => write!(f, "int[]"),
            TypeExpr::Named(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Block(Vec<Spanned<Stmt>>),
    If {
        cond: Spanned<Expr>,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },
    While {
        cond: Spanned<Expr>,
        body: Box<Spanned<Stmt>>,
    },
    Print(Spanned<Expr>),
    Assign {
        target: Spanned<String>,
        value: Spanned<Expr>,
    },
    ArrayAssign {
        target: Spanned<String>,
        index: Spanned<Expr>,
        value: Spanned<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    IntLit(i32),
    BoolLit(bool),
    Ident(String),
    This,
    BinOp {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    Not(Box<Spanned<Expr>>),
    NewObject(Spanned<String>),
    NewArray(Box<Spanned<Expr>>),
    MethodCall {
        object: Box<Spanned<Expr>>,
        method: Spanned<String>,
        args: Vec<Spanned<Expr>>,
    },
    Index {
        array: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    Length(Box<Spanned<Expr>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    And,
    Lt,
    Eq,
    Add,
    Sub,
    Mul,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BinOp::And => "&&",
            BinOp::Lt => "<",
            BinOp::Eq => "==",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
        };
        write!(f, "{s}")
    }
}
