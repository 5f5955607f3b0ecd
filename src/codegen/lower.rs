use tracing::{trace, warn};

use crate::diagnostics::CompileError;
use crate::lexer::is_identifier;
use crate::ir::{BinaryOp, IcmpCond, Instr, Operand, Type, Value};
use crate::parser::ast::*;
use crate::span::{Span, Spanned};
use crate::symtab::{ClassDescriptor, MethodDescriptor, Storage, SymbolTable};

use super::runtime::{MALLOC, PRINTF, RuntimeRegistry};

/// Hidden slot of the entry routine whose value becomes the process exit code.
const ENTRY_RESULT: &str = "main.result";
const RECEIVER_REG: &str = "this";
const INT_BYTES: i32 = 4;

/// The class and method whose body is being lowered.
#[derive(Clone, Copy)]
struct Scope<'a> {
    class: &'a ClassDescriptor,
    method: &'a MethodDescriptor,
}

struct LowerContext<'a> {
    table: &'a SymbolTable,
    runtime: &'a RuntimeRegistry,
    /// `None` while lowering the entry routine.
    scope: Option<Scope<'a>>,
    instrs: Vec<Instr>,
    // Per-function counters; names only need to be unique within one function.
    next_reg: u32,
    next_label: u32,
}

impl<'a> LowerContext<'a> {
    fn new(table: &'a SymbolTable, runtime: &'a RuntimeRegistry, scope: Option<Scope<'a>>) -> Self {
        Self { table, runtime, scope, instrs: Vec::new(), next_reg: 0, next_label: 0 }
    }

    fn emit(&mut self, instr: Instr) {
        self.instrs.push(instr);
    }

    fn fresh_reg(&mut self) -> String {
        let name = format!("tmp{}", self.next_reg);
        self.next_reg += 1;
        name
    }

    fn fresh_label_id(&mut self) -> u32 {
        let id = self.next_label;
        self.next_label += 1;
        id
    }

    fn resolve(&self, name: &str, span: Span) -> Result<(Scope<'a>, Storage<'a>), CompileError> {
        let Some(scope) = self.scope else {
            return Err(CompileError::resolve(
                format!("cannot find variable '{name}' in the entry routine"),
                span,
            ));
        };
        match scope.class.resolve(scope.method, name) {
            Some(storage) => Ok((scope, storage)),
            None => Err(CompileError::resolve(
                format!("cannot find variable '{name}' in method '{}'", scope.method.mangled_name),
                span,
            )),
        }
    }

    fn this_operand(&self, span: Span) -> Result<Operand, CompileError> {
        match self.scope {
            Some(scope) => Ok(Operand::new(
                Type::class(scope.class.name.clone()).ptr(),
                Value::reg(RECEIVER_REG),
            )),
            None => Err(CompileError::resolve("'this' used outside of a method", span)),
        }
    }

    /// Address of a formal, local or field, typed as a pointer to its storage type.
    fn storage_ptr(&mut self, scope: Scope<'a>, storage: Storage<'a>) -> Result<Operand, CompileError> {
        let ty = storage.var().ty.ir_type();
        if let Some(slot) = scope.method.slot_name(&storage) {
            return Ok(Operand::new(ty.ptr(), Value::Reg(slot)));
        }
        let Storage::Field { index, .. } = storage else {
            return Err(CompileError::codegen("storage without a slot must be a field"));
        };
        let class_ty = Type::class(scope.class.name.clone());
        let dest = self.fresh_reg();
        self.emit(Instr::Gep {
            dest: dest.clone(),
            base_ty: class_ty.clone(),
            ptr: Operand::new(class_ty.ptr(), Value::reg(RECEIVER_REG)),
            indices: vec![Operand::i32(0), Operand::i32(index as i32)],
        });
        Ok(Operand::new(ty.ptr(), Value::Reg(dest)))
    }

    /// Make `value` usable where `target` is expected. Pointers are bitcast;
    /// any other mismatch is an error.
    fn coerce(&mut self, value: Operand, target: &Type, what: &str) -> Result<Operand, CompileError> {
        if value.ty == *target {
            return Ok(value);
        }
        if value.ty.is_ptr() && target.is_ptr() {
            let dest = self.fresh_reg();
            self.emit(Instr::Bitcast { dest: dest.clone(), from: value, to: target.clone() });
            return Ok(Operand::new(target.clone(), Value::Reg(dest)));
        }
        Err(CompileError::codegen(format!(
            "{what}: expected {target}, found {}",
            value.ty
        )))
    }

    /// Heap-allocate one `elem` times `count`, returning a typed `elem*`.
    fn emit_alloc(&mut self, elem: Type, count: i32) -> Result<Operand, CompileError> {
        let ptr_ty = elem.clone().ptr();
        let size_ptr = self.fresh_reg();
        self.emit(Instr::Gep {
            dest: size_ptr.clone(),
            base_ty: elem,
            ptr: Operand::new(ptr_ty.clone(), Value::Null),
            indices: vec![Operand::i32(count)],
        });
        let size = self.fresh_reg();
        self.emit(Instr::PtrToInt {
            dest: size.clone(),
            from: Operand::new(ptr_ty.clone(), Value::Reg(size_ptr)),
            to: Type::I32,
        });
        let raw = self.fresh_reg();
        let malloc = self.runtime.get(MALLOC)?;
        let call = malloc.call(Some(raw.clone()), vec![Operand::new(Type::I32, Value::Reg(size))]);
        let raw_ty = malloc.ret.clone();
        self.emit(call);
        let typed = self.fresh_reg();
        self.emit(Instr::Bitcast {
            dest: typed.clone(),
            from: Operand::new(raw_ty, Value::Reg(raw)),
            to: ptr_ty.clone(),
        });
        Ok(Operand::new(ptr_ty, Value::Reg(typed)))
    }

    fn lower_stmt(&mut self, stmt: &Spanned<Stmt>) -> Result<(), CompileError> {
        match &stmt.node {
            Stmt::Block(stmts) => {
                for s in stmts {
                    self.lower_stmt(s)?;
                }
            }
            Stmt::If { cond, then_branch, else_branch } => {
                let cond_val = self.lower_condition(cond)?;
                let id = self.fresh_label_id();
                let then_label = format!("if.then.{id}");
                let else_label = format!("if.else.{id}");
                let end_label = format!("if.end.{id}");

                self.emit(Instr::CondBr {
                    cond: cond_val,
                    then_label: then_label.clone(),
                    else_label: else_label.clone(),
                });
                self.emit(Instr::Label(then_label));
                self.lower_stmt(then_branch)?;
                self.emit(Instr::Br { target: end_label.clone() });
                self.emit(Instr::Label(else_label));
                if let Some(else_branch) = else_branch {
                    self.lower_stmt(else_branch)?;
                }
                self.emit(Instr::Br { target: end_label.clone() });
                self.emit(Instr::Label(end_label));
            }
            Stmt::While { cond, body } => {
                let id = self.fresh_label_id();
                let cond_label = format!("while.cond.{id}");
                let body_label = format!("while.body.{id}");
                let end_label = format!("while.end.{id}");

                self.emit(Instr::Br { target: cond_label.clone() });
                self.emit(Instr::Label(cond_label.clone()));
                let cond_val = self.lower_condition(cond)?;
                self.emit(Instr::CondBr {
                    cond: cond_val,
                    then_label: body_label.clone(),
                    else_label: end_label.clone(),
                });
                self.emit(Instr::Label(body_label));
                self.lower_stmt(body)?;
                self.emit(Instr::Br { target: cond_label });
                self.emit(Instr::Label(end_label));
            }
            Stmt::Print(arg) => self.lower_print(arg)?,
            Stmt::Assign { target, value } => {
                let (scope, storage) = self.resolve(&target.node, target.span)?;
                let value = self.lower_expr(value)?;
                let ptr = self.storage_ptr(scope, storage)?;
                let target_ty = storage.var().ty.ir_type();
                let value = self.coerce(value, &target_ty, &format!("assignment to '{}'", target.node))?;
                self.emit(Instr::Store { value, ptr });
            }
            Stmt::ArrayAssign { .. } => {
                return Err(CompileError::unsupported("array element assignment", stmt.span));
            }
        }
        Ok(())
    }

    fn lower_condition(&mut self, cond: &Spanned<Expr>) -> Result<Value, CompileError> {
        let val = self.lower_expr(cond)?;
        if val.ty != Type::I1 {
            return Err(CompileError::codegen(format!(
                "condition must be boolean, found {}",
                val.ty
            )));
        }
        Ok(val.value)
    }

    fn lower_print(&mut self, arg: &Spanned<Expr>) -> Result<(), CompileError> {
        let val = self.lower_expr(arg)?;
        let val = match val.ty.clone() {
            Type::I32 => val,
            Type::I1 => {
                let dest = self.fresh_reg();
                self.emit(Instr::Zext { dest: dest.clone(), from: val, to: Type::I32 });
                Operand::new(Type::I32, Value::Reg(dest))
            }
            other => {
                return Err(CompileError::codegen(format!(
                    "System.out.println expects int or boolean, found {other}"
                )));
            }
        };

        let fmt = self.fresh_reg();
        let format_ptr = self.runtime.format_ptr();
        self.emit(Instr::Gep {
            dest: fmt.clone(),
            base_ty: self.runtime.format_type(),
            ptr: format_ptr,
            indices: vec![Operand::i32(0), Operand::i32(0)],
        });
        let dest = self.fresh_reg();
        let call = self
            .runtime
            .get(PRINTF)?
            .call(Some(dest), vec![Operand::new(Type::I8.ptr(), Value::Reg(fmt)), val]);
        self.emit(call);
        Ok(())
    }

    fn lower_expr(&mut self, expr: &Spanned<Expr>) -> Result<Operand, CompileError> {
        match &expr.node {
            Expr::IntLit(n) => Ok(Operand::i32(*n)),
            Expr::BoolLit(b) => Ok(Operand::bool(*b)),
            Expr::Ident(name) => {
                let (scope, storage) = self.resolve(name, expr.span)?;
                let ptr = self.storage_ptr(scope, storage)?;
                let ty = storage.var().ty.ir_type();
                let dest = self.fresh_reg();
                self.emit(Instr::Load { dest: dest.clone(), ty: ty.clone(), ptr });
                Ok(Operand::new(ty, Value::Reg(dest)))
            }
            Expr::This => self.this_operand(expr.span),
            Expr::BinOp { op, lhs, rhs } => self.lower_binop(*op, lhs, rhs),
            Expr::Not(_) => Err(CompileError::unsupported("boolean negation", expr.span)),
            Expr::NewObject(class_name) => {
                match self.table.class(&class_name.node) {
                    Some(class) if !class.is_entry => {}
                    Some(_) => {
                        return Err(CompileError::type_err(
                            format!("entry class '{}' cannot be instantiated", class_name.node),
                            class_name.span,
                        ));
                    }
                    None => {
                        return Err(CompileError::type_err(
                            format!("unknown class '{}'", class_name.node),
                            class_name.span,
                        ));
                    }
                }
                self.emit_alloc(Type::class(class_name.node.clone()), 1)
            }
            Expr::NewArray(size) => match size.node {
                Expr::IntLit(n) if n < 0 => {
                    Err(CompileError::type_err(format!("array size {n} is negative"), size.span))
                }
                // malloc takes an i32 byte count.
                Expr::IntLit(n) if n.checked_mul(INT_BYTES).is_none() => Err(CompileError::unsupported(
                    format!("array allocation of {n} elements (more than {} bytes)", i32::MAX),
                    size.span,
                )),
                Expr::IntLit(n) => self.emit_alloc(Type::I32, n),
                _ => Err(CompileError::unsupported("array allocation with a non-constant size", size.span)),
            },
            Expr::MethodCall { object, method, args } => self.lower_call(object, method, args),
            Expr::Index { .. } => Err(CompileError::unsupported("array lookup", expr.span)),
            Expr::Length(_) => Err(CompileError::unsupported("array length", expr.span)),
        }
    }

    fn lower_binop(
        &mut self,
        op: BinOp,
        lhs: &Spanned<Expr>,
        rhs: &Spanned<Expr>,
    ) -> Result<Operand, CompileError> {
        let l = self.lower_expr(lhs)?;
        let r = self.lower_expr(rhs)?;

        let operand_ty = match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Lt => Type::I32,
            BinOp::And => Type::I1,
            BinOp::Eq => l.ty.clone(),
        };
        if l.ty != operand_ty || r.ty != operand_ty {
            return Err(CompileError::codegen(format!(
                "operator '{op}' cannot be applied to {} and {}",
                l.ty, r.ty
            )));
        }

        let dest = self.fresh_reg();
        let (instr, result_ty) = match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::And => {
                let bin = match op {
                    BinOp::Add => BinaryOp::Add,
                    BinOp::Sub => BinaryOp::Sub,
                    BinOp::Mul => BinaryOp::Mul,
                    _ => BinaryOp::And,
                };
                let instr = Instr::Binary {
                    dest: dest.clone(),
                    op: bin,
                    ty: operand_ty.clone(),
                    lhs: l.value,
                    rhs: r.value,
                };
                (instr, operand_ty)
            }
            BinOp::Lt | BinOp::Eq => {
                let cond = if op == BinOp::Lt { IcmpCond::Slt } else { IcmpCond::Eq };
                let instr = Instr::Icmp { dest: dest.clone(), cond, ty: operand_ty, lhs: l.value, rhs: r.value };
                (instr, Type::I1)
            }
        };
        self.emit(instr);
        Ok(Operand::new(result_ty, Value::Reg(dest)))
    }

    fn lower_call(
        &mut self,
        object: &Spanned<Expr>,
        method: &Spanned<String>,
        args: &[Spanned<Expr>],
    ) -> Result<Operand, CompileError> {
        let receiver = self.lower_expr(object)?;
        let mut arg_vals = Vec::with_capacity(args.len() + 1);
        for arg in args {
            arg_vals.push(self.lower_expr(arg)?);
        }

        let Some(class_name) = receiver.ty.pointee_class() else {
            if !is_identifier(&method.node) {
                return Err(CompileError::resolve(format!("invalid method name '{}'", method.node), method.span));
            }
            warn!(
                method = %method.node,
                receiver = %receiver.ty,
                "receiver is not an object; calling unmangled symbol"
            );
            let dest = self.fresh_reg();
            self.emit(Instr::Call {
                dest: Some(dest.clone()),
                ret: Type::I32,
                sig: None,
                callee: method.node.clone(),
                args: arg_vals,
            });
            return Ok(Operand::new(Type::I32, Value::Reg(dest)));
        };

        let table = self.table;
        let class = table
            .class(class_name)
            .ok_or_else(|| CompileError::codegen(format!("no descriptor for class '{class_name}'")))?;
        let callee = class.method(&method.node).ok_or_else(|| {
            CompileError::codegen(format!("class '{}' has no method '{}'", class.name, method.node))
        })?;
        if callee.params().len() != arg_vals.len() {
            return Err(CompileError::codegen(format!(
                "method '{}' takes {} argument(s) but {} were supplied",
                callee.mangled_name,
                callee.params().len(),
                arg_vals.len()
            )));
        }

        let mut call_args = Vec::with_capacity(arg_vals.len() + 1);
        call_args.push(receiver);
        for (val, formal) in arg_vals.into_iter().zip(callee.params()) {
            let what = format!("argument '{}' of '{}'", formal.name, callee.mangled_name);
            call_args.push(self.coerce(val, &formal.ty.ir_type(), &what)?);
        }

        let ret = callee.return_type.ir_type();
        let dest = self.fresh_reg();
        self.emit(Instr::Call {
            dest: Some(dest.clone()),
            ret: ret.clone(),
            sig: None,
            callee: callee.mangled_name.clone(),
            args: call_args,
        });
        Ok(Operand::new(ret, Value::Reg(dest)))
    }
}

/// Lower the entry class into `@main`: a zero-initialized result slot, the
/// single top-level statement, then a return of the slot's value.
pub(crate) fn lower_entry(
    main: &MainClass,
    table: &SymbolTable,
    runtime: &RuntimeRegistry,
) -> Result<Vec<Instr>, CompileError> {
    let mut ctx = LowerContext::new(table, runtime, None);
    let slot = Operand::new(Type::I32.ptr(), Value::reg(ENTRY_RESULT));

    ctx.emit(Instr::Define { ret: Type::I32, name: "main".to_string(), params: vec![] });
    ctx.emit(Instr::Label("entry".to_string()));
    ctx.emit(Instr::Alloca { dest: ENTRY_RESULT.to_string(), ty: Type::I32 });
    ctx.emit(Instr::Store { value: Operand::i32(0), ptr: slot.clone() });
    ctx.lower_stmt(&main.body)?;
    let result = ctx.fresh_reg();
    ctx.emit(Instr::Load { dest: result.clone(), ty: Type::I32, ptr: slot });
    ctx.emit(Instr::Ret(Operand::new(Type::I32, Value::Reg(result))));
    ctx.emit(Instr::EndFunction);

    trace!(class = %main.name.node, instrs = ctx.instrs.len(), "lowered entry routine");
    Ok(ctx.instrs)
}

/// Lower one method of `class` into a function definition.
pub(crate) fn lower_method(
    class: &ClassDescriptor,
    decl: &MethodDecl,
    table: &SymbolTable,
    runtime: &RuntimeRegistry,
) -> Result<Vec<Instr>, CompileError> {
    let method = class.method(&decl.name.node).ok_or_else(|| {
        CompileError::codegen(format!("no descriptor for method '{}.{}'", class.name, decl.name.node))
    })?;
    let scope = Scope { class, method };
    let mut ctx = LowerContext::new(table, runtime, Some(scope));

    let mut params = vec![(Type::class(class.name.clone()).ptr(), RECEIVER_REG.to_string())];
    params.extend(
        method.params().iter().map(|p| (p.ty.ir_type(), MethodDescriptor::param_register(p))),
    );
    ctx.emit(Instr::Define { ret: method.return_type.ir_type(), name: method.mangled_name.clone(), params });
    ctx.emit(Instr::Label("entry".to_string()));

    for param in method.params() {
        let ty = param.ty.ir_type();
        let Some(slot) = method.slot_name(&Storage::Formal(param)) else { continue };
        ctx.emit(Instr::Alloca { dest: slot.clone(), ty: ty.clone() });
        ctx.emit(Instr::Store {
            value: Operand::new(ty.clone(), Value::Reg(MethodDescriptor::param_register(param))),
            ptr: Operand::new(ty.ptr(), Value::Reg(slot)),
        });
    }
    for local in &method.locals {
        let Some(slot) = method.slot_name(&Storage::Local(local)) else { continue };
        ctx.emit(Instr::Alloca { dest: slot, ty: local.ty.ir_type() });
    }

    for stmt in &decl.body {
        ctx.lower_stmt(stmt)?;
    }
    let ret = ctx.lower_expr(&decl.return_expr)?;
    let what = format!("return value of '{}'", method.mangled_name);
    let ret = ctx.coerce(ret, &method.return_type.ir_type(), &what)?;
    ctx.emit(Instr::Ret(ret));
    ctx.emit(Instr::EndFunction);

    trace!(method = %method.mangled_name, instrs = ctx.instrs.len(), "lowered method");
    Ok(ctx.instrs)
}
