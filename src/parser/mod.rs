pub mod ast;

use crate::diagnostics::CompileError;
use crate::lexer::token::Token;
use crate::span::{Span, Spanned};
use ast::*;

pub struct Parser<'a> {
    tokens: &'a [Spanned<Token>],
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Spanned<Token>], source: &'a str) -> Self {
        Self { tokens, source, pos: 0 }
    }

    fn peek(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos + n)
    }

    fn peek_is(&self, expected: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(&t.node) == std::mem::discriminant(expected))
    }

    fn advance(&mut self) -> Option<&Spanned<Token>> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    fn expect(&mut self, expected: &Token) -> Result<Span, CompileError> {
        match self.tokens.get(self.pos) {
            Some(tok) if std::mem::discriminant(&tok.node) == std::mem::discriminant(expected) => {
                self.pos += 1;
                Ok(tok.span)
            }
            Some(tok) => Err(CompileError::syntax(
                format!("expected {expected}, found {}", tok.node),
                tok.span,
            )),
            None => Err(CompileError::syntax(
                format!("expected {expected}, found end of file"),
                self.eof_span(),
            )),
        }
    }

    fn expect_ident(&mut self) -> Result<Spanned<String>, CompileError> {
        match self.tokens.get(self.pos) {
            Some(tok) if matches!(tok.node, Token::Ident) => {
                let name = self.source[tok.span.start..tok.span.end].to_string();
                self.pos += 1;
                Ok(Spanned::new(name, tok.span))
            }
            Some(tok) => Err(CompileError::syntax(
                format!("expected identifier, found {}", tok.node),
                tok.span,
            )),
            None => Err(CompileError::syntax(
                "expected identifier, found end of file",
                self.eof_span(),
            )),
        }
    }

    fn eof_span(&self) -> Span {
        if let Some(last) = self.tokens.last() {
            Span::new(last.span.end, last.span.end)
        } else {
            Span::dummy()
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        let main_class = self.parse_main_class()?;
        let mut classes = Vec::new();
        while let Some(tok) = self.peek() {
            match tok.node {
                Token::Class => classes.push(self.parse_class()?),
                _ => {
                    return Err(CompileError::syntax(
                        format!("expected class declaration, found {}", tok.node),
                        tok.span,
                    ));
                }
            }
        }
        Ok(Program { main_class, classes })
    }

    fn parse_main_class(&mut self) -> Result<Spanned<MainClass>, CompileError> {
        let start = self.expect(&Token::Class)?;
        let name = self.expect_ident()?;
        self.expect(&Token::LBrace)?;
        self.expect(&Token::Public)?;
        self.expect(&Token::Static)?;
        self.expect(&Token::Void)?;
        self.expect(&Token::Main)?;
        self.expect(&Token::LParen)?;
        self.expect(&Token::StringKw)?;
        self.expect(&Token::LBracket)?;
        self.expect(&Token::RBracket)?;
        let arg_name = self.expect_ident()?;
        self.expect(&Token::RParen)?;
        self.expect(&Token::LBrace)?;
        let body = self.parse_stmt()?;
        self.expect(&Token::RBrace)?;
        let end = self.expect(&Token::RBrace)?;
        Ok(Spanned::new(MainClass { name, arg_name, body }, start.to(end)))
    }

    fn parse_class(&mut self) -> Result<Spanned<ClassDecl>, CompileError> {
        let start = self.expect(&Token::Class)?;
        let name = self.expect_ident()?;
        let superclass = if self.peek_is(&Token::Extends) {
            self.advance();
            Some(self.expect_ident()?)
        } else {
            None
        };
        self.expect(&Token::LBrace)?;

        let mut fields = Vec::new();
        while self.at_var_decl() {
            fields.push(self.parse_var_decl()?);
        }

        let mut methods = Vec::new();
        while self.peek_is(&Token::Public) {
            methods.push(self.parse_method()?);
        }

        let end = self.expect(&Token::RBrace)?;
        Ok(Spanned::new(ClassDecl { name, superclass, fields, methods }, start.to(end)))
    }

    /// A declaration starts with a primitive type, or with two identifiers in a row
    /// (`Foo x;`). A lone identifier starts an assignment statement.
    fn at_var_decl(&self) -> bool {
        match self.peek().map(|t| &t.node) {
            Some(Token::Int | Token::Boolean) => true,
            Some(Token::Ident) => matches!(self.peek_nth(1).map(|t| &t.node), Some(Token::Ident)),
            _ => false,
        }
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl, CompileError> {
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        self.expect(&Token::Semi)?;
        Ok(VarDecl { name, ty })
    }

    fn parse_type(&mut self) -> Result<Spanned<TypeExpr>, CompileError> {
        let Some(tok) = self.peek() else {
            return Err(CompileError::syntax("expected type, found end of file", self.eof_span()));
        };
        let span = tok.span;
        match tok.node {
            Token::Int => {
                self.advance();
                if self.peek_is(&Token::LBracket) {
                    self.advance();
                    let end = self.expect(&Token::RBracket)?;
                    Ok(Spanned::new(TypeExpr::IntArray, span.to(end)))
                } else {
                    Ok(Spanned::new(TypeExpr::Int, span))
                }
            }
            Token::Boolean => {
                self.advance();
                Ok(Spanned::new(TypeExpr::Boolean, span))
            }
            Token::Ident => {
                let name = self.expect_ident()?;
                Ok(Spanned::new(TypeExpr::Named(name.node), name.span))
            }
            ref other => Err(CompileError::syntax(format!("expected type, found {other}"), span)),
        }
    }

    fn parse_method(&mut self) -> Result<Spanned<MethodDecl>, CompileError> {
        let start = self.expect(&Token::Public)?;
        let return_type = self.parse_type()?;
        let name = self.expect_ident()?;
        self.expect(&Token::LParen)?;

        let mut params = Vec::new();
        while !self.peek_is(&Token::RParen) {
            if !params.is_empty() {
                self.expect(&Token::Comma)?;
            }
            let ty = self.parse_type()?;
            let pname = self.expect_ident()?;
            params.push(VarDecl { name: pname, ty });
        }
        self.expect(&Token::RParen)?;
        self.expect(&Token::LBrace)?;

        let mut locals = Vec::new();
        while self.at_var_decl() {
            locals.push(self.parse_var_decl()?);
        }

        let mut body = Vec::new();
        while !self.peek_is(&Token::Return) {
            if self.peek().is_none() {
                return Err(CompileError::syntax(
                    "expected return, found end of file",
                    self.eof_span(),
                ));
            }
            body.push(self.parse_stmt()?);
        }
        self.expect(&Token::Return)?;
        let return_expr = self.parse_expr(0)?;
        self.expect(&Token::Semi)?;
        let end = self.expect(&Token::RBrace)?;

        Ok(Spanned::new(
            MethodDecl { name, return_type, params, locals, body, return_expr },
            start.to(end),
        ))
    }

    fn parse_stmt(&mut self) -> Result<Spanned<Stmt>, CompileError> {
        let Some(tok) = self.peek() else {
            return Err(CompileError::syntax(
                "expected statement, found end of file",
                self.eof_span(),
            ));
        };
        let start = tok.span;
        match tok.node {
            Token::LBrace => {
                self.advance();
                let mut stmts = Vec::new();
                while !self.peek_is(&Token::RBrace) {
                    if self.peek().is_none() {
                        return Err(CompileError::syntax(
                            "expected }, found end of file",
                            self.eof_span(),
                        ));
                    }
                    stmts.push(self.parse_stmt()?);
                }
                let end = self.expect(&Token::RBrace)?;
                Ok(Spanned::new(Stmt::Block(stmts), start.to(end)))
            }
            Token::If => {
                self.advance();
                self.expect(&Token::LParen)?;
                let cond = self.parse_expr(0)?;
                self.expect(&Token::RParen)?;
                let then_branch = self.parse_stmt()?;
                let mut end = then_branch.span;
                let else_branch = if self.peek_is(&Token::Else) {
                    self.advance();
                    let stmt = self.parse_stmt()?;
                    end = stmt.span;
                    Some(Box::new(stmt))
                } else {
                    None
                };
                Ok(Spanned::new(
                    Stmt::If { cond, then_branch: Box::new(then_branch), else_branch },
                    start.to(end),
                ))
            }
            Token::While => {
                self.advance();
                self.expect(&Token::LParen)?;
                let cond = self.parse_expr(0)?;
                self.expect(&Token::RParen)?;
                let body = self.parse_stmt()?;
                let span = start.to(body.span);
                Ok(Spanned::new(Stmt::While { cond, body: Box::new(body) }, span))
            }
            Token::Println => {
                self.advance();
                self.expect(&Token::LParen)?;
                let arg = self.parse_expr(0)?;
                self.expect(&Token::RParen)?;
                let end = self.expect(&Token::Semi)?;
                Ok(Spanned::new(Stmt::Print(arg), start.to(end)))
            }
            Token::Ident => {
                let target = self.expect_ident()?;
                if self.peek_is(&Token::LBracket) {
                    self.advance();
                    let index = self.parse_expr(0)?;
                    self.expect(&Token::RBracket)?;
                    self.expect(&Token::Eq)?;
                    let value = self.parse_expr(0)?;
                    let end = self.expect(&Token::Semi)?;
                    Ok(Spanned::new(Stmt::ArrayAssign { target, index, value }, start.to(end)))
                } else {
                    self.expect(&Token::Eq)?;
                    let value = self.parse_expr(0)?;
                    let end = self.expect(&Token::Semi)?;
                    Ok(Spanned::new(Stmt::Assign { target, value }, start.to(end)))
                }
            }
            ref other => Err(CompileError::syntax(
                format!("expected statement, found {other}"),
                start,
            )),
        }
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Spanned<Expr>, CompileError> {
        let mut lhs = self.parse_prefix()?;

        while let Some(tok) = self.peek() {
            let op = match tok.node {
                Token::AmpAmp => BinOp::And,
                Token::Lt => BinOp::Lt,
                Token::EqEq => BinOp::Eq,
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Sub,
                Token::Star => BinOp::Mul,
                _ => break,
            };

            let (lbp, rbp) = infix_binding_power(op);
            if lbp < min_bp {
                break;
            }
            self.advance(); // consume operator

            let rhs = self.parse_expr(rbp)?;
            let span = lhs.span.to(rhs.span);
            lhs = Spanned::new(
                Expr::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                span,
            );
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Spanned<Expr>, CompileError> {
        if self.peek_is(&Token::Bang) {
            let start = self.expect(&Token::Bang)?;
            let operand = self.parse_prefix()?;
            let span = start.to(operand.span);
            return Ok(Spanned::new(Expr::Not(Box::new(operand)), span));
        }
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    /// Array indexing, `.length` and method calls bind tighter than any operator.
    fn parse_postfix(&mut self, mut lhs: Spanned<Expr>) -> Result<Spanned<Expr>, CompileError> {
        loop {
            if self.peek_is(&Token::LBracket) {
                self.advance();
                let index = self.parse_expr(0)?;
                let end = self.expect(&Token::RBracket)?;
                let span = lhs.span.to(end);
                lhs = Spanned::new(
                    Expr::Index { array: Box::new(lhs), index: Box::new(index) },
                    span,
                );
            } else if self.peek_is(&Token::Dot) {
                self.advance();
                if self.peek_is(&Token::Length) {
                    let end = self.expect(&Token::Length)?;
                    let span = lhs.span.to(end);
                    lhs = Spanned::new(Expr::Length(Box::new(lhs)), span);
                    continue;
                }
                let method = self.expect_ident()?;
                self.expect(&Token::LParen)?;
                let mut args = Vec::new();
                while !self.peek_is(&Token::RParen) {
                    if !args.is_empty() {
                        self.expect(&Token::Comma)?;
                    }
                    args.push(self.parse_expr(0)?);
                }
                let end = self.expect(&Token::RParen)?;
                let span = lhs.span.to(end);
                lhs = Spanned::new(
                    Expr::MethodCall { object: Box::new(lhs), method, args },
                    span,
                );
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Spanned<Expr>, CompileError> {
        let Some(tok) = self.peek() else {
            return Err(CompileError::syntax(
                "unexpected end of file in expression",
                self.eof_span(),
            ));
        };
        let span = tok.span;
        match tok.node {
            Token::IntLit(n) => {
                self.advance();
                Ok(Spanned::new(Expr::IntLit(n), span))
            }
            Token::True => {
                self.advance();
                Ok(Spanned::new(Expr::BoolLit(true), span))
            }
            Token::False => {
                self.advance();
                Ok(Spanned::new(Expr::BoolLit(false), span))
            }
            Token::This => {
                self.advance();
                Ok(Spanned::new(Expr::This, span))
            }
            Token::Ident => {
                let ident = self.expect_ident()?;
                Ok(Spanned::new(Expr::Ident(ident.node), ident.span))
            }
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr(0)?;
                let end = self.expect(&Token::RParen)?;
                Ok(Spanned::new(inner.node, span.to(end)))
            }
            Token::New => {
                self.advance();
                if self.peek_is(&Token::Int) {
                    self.advance();
                    self.expect(&Token::LBracket)?;
                    let size = self.parse_expr(0)?;
                    let end = self.expect(&Token::RBracket)?;
                    Ok(Spanned::new(Expr::NewArray(Box::new(size)), span.to(end)))
                } else {
                    let class = self.expect_ident()?;
                    self.expect(&Token::LParen)?;
                    let end = self.expect(&Token::RParen)?;
                    Ok(Spanned::new(Expr::NewObject(class), span.to(end)))
                }
            }
            ref other => Err(CompileError::syntax(
                format!("expected expression, found {other}"),
                span,
            )),
        }
    }
}

fn infix_binding_power(op: BinOp) -> (u8, u8) {
    match op {
        BinOp::And => (1, 2),
        BinOp::Eq => (3, 4),
        BinOp::Lt => (5, 6),
        BinOp::Add | BinOp::Sub => (7, 8),
        BinOp::Mul => (9, 10),
    }
}
