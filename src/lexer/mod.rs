pub mod token;
pub use token::{is_identifier, is_keyword};

use crate::diagnostics::CompileError;
use crate::span::{Span, Spanned};
use logos::Logos;
use token::Token;

pub fn lex(source: &str) -> Result<Vec<Spanned<Token>>, CompileError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(Token::Comment) => continue,
            Ok(tok) => tokens.push(Spanned::new(tok, span)),
            Err(()) => {
                let text = &source[span.start..span.end];
                let msg = if text.bytes().all(|b| b.is_ascii_digit()) {
                    format!("integer literal '{text}' does not fit in 32 bits")
                } else if text.starts_with("/*") {
                    "unterminated block comment".to_string()
                } else {
                    format!("unexpected character '{text}'")
                };
                return Err(CompileError::syntax(msg, span));
            }
        }
    }

    Ok(tokens)
}
