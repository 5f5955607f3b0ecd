#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mjc::lexer::token::Token;
use mjc::span::{Span, Spanned};

/// Token kinds the parser branches on.
#[derive(Arbitrary, Debug)]
enum FuzzToken {
    Class,
    Public,
    Static,
    Void,
    Main,
    StringKw,
    Extends,
    Return,
    Int,
    Boolean,
    If,
    Else,
    While,
    True,
    This,
    New,
    Length,
    Println,
    IntLit(u8),
    Ident,
    AmpAmp,
    Lt,
    Plus,
    Star,
    Bang,
    Eq,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
}

impl FuzzToken {
    fn to_token(&self, offset: usize) -> Spanned<Token> {
        let token = match self {
            FuzzToken::Class => Token::Class,
            FuzzToken::Public => Token::Public,
            FuzzToken::Static => Token::Static,
            FuzzToken::Void => Token::Void,
            FuzzToken::Main => Token::Main,
            FuzzToken::StringKw => Token::StringKw,
            FuzzToken::Extends => Token::Extends,
            FuzzToken::Return => Token::Return,
            FuzzToken::Int => Token::Int,
            FuzzToken::Boolean => Token::Boolean,
            FuzzToken::If => Token::If,
            FuzzToken::Else => Token::Else,
            FuzzToken::While => Token::While,
            FuzzToken::True => Token::True,
            FuzzToken::This => Token::This,
            FuzzToken::New => Token::New,
            FuzzToken::Length => Token::Length,
            FuzzToken::Println => Token::Println,
            FuzzToken::IntLit(n) => Token::IntLit(i32::from(*n)),
            FuzzToken::Ident => Token::Ident,
            FuzzToken::AmpAmp => Token::AmpAmp,
            FuzzToken::Lt => Token::Lt,
            FuzzToken::Plus => Token::Plus,
            FuzzToken::Star => Token::Star,
            FuzzToken::Bang => Token::Bang,
            FuzzToken::Eq => Token::Eq,
            FuzzToken::LParen => Token::LParen,
            FuzzToken::RParen => Token::RParen,
            FuzzToken::LBrace => Token::LBrace,
            FuzzToken::RBrace => Token::RBrace,
            FuzzToken::LBracket => Token::LBracket,
            FuzzToken::RBracket => Token::RBracket,
            FuzzToken::Semi => Token::Semi,
            FuzzToken::Comma => Token::Comma,
            FuzzToken::Dot => Token::Dot,
        };
        Spanned::new(token, Span::new(offset, offset + 1))
    }
}

#[derive(Arbitrary, Debug)]
struct FuzzTokens {
    tokens: Vec<FuzzToken>,
}

fuzz_target!(|input: FuzzTokens| {
    let tokens: Vec<Spanned<Token>> = input
        .tokens
        .iter()
        .enumerate()
        .map(|(i, t)| t.to_token(i))
        .collect();

    // Every identifier span slices to "x".
    let source = "x".repeat(tokens.len());

    let mut parser = mjc::parser::Parser::new(&tokens, &source);
    if let Ok(program) = parser.parse_program() {
        let _ = mjc::compile_program(&program, &mjc::CodegenOptions::default());
    }
});
