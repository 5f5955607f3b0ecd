use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Keywords
    #[token("class")]
    Class,
    #[token("public")]
    Public,
    #[token("static")]
    Static,
    #[token("void")]
    Void,
    #[token("main")]
    Main,
    #[token("String")]
    StringKw,
    #[token("extends")]
    Extends,
    #[token("return")]
    Return,
    #[token("int")]
    Int,
    #[token("boolean")]
    Boolean,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("this")]
    This,
    #[token("new")]
    New,
    #[token("length")]
    Length,
    #[token("System.out.println")]
    Println,

    // Literals
    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i32>().ok())]
    IntLit(i32),

    // Identifiers
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // Operators
    #[token("&&")]
    AmpAmp,
    #[token("<")]
    Lt,
    #[token("==")]
    EqEq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("!")]
    Bang,
    #[token("=")]
    Eq,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,

    // Comments (skip)
    #[regex(r"//[^\n]*")]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,
}

pub fn is_keyword(s: &str) -> bool {
    matches!(
        s,
        "class" | "public" | "static" | "void" | "main" | "String" | "extends" | "return"
            | "int" | "boolean" | "if" | "else" | "while" | "true" | "false" | "this"
            | "new" | "length"
    )
}

/// True when `s` would lex as a single `Ident` token.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !is_keyword(s)
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Class => write!(f, "class"),
            Token::Public => write!(f, "public"),
            Token::Static => write!(f, "static"),
            Token::Void => write!(f, "void"),
            Token::Main => write!(f, "main"),
            Token::StringKw => write!(f, "String"),
            Token::Extends => write!(f, "extends"),
            Token::Return => write!(f, "return"),
            Token::Int => write!(f, "int"),
            Token::Boolean => write!(f, "boolean"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::This => write!(f, "this"),
            Token::New => write!(f, "new"),
            Token::Length => write!(f, "length"),
            Token::Println => write!(f, "System.out.println"),
            Token::IntLit(n) => write!(f, "{n}"),
            Token::Ident => write!(f, "identifier"),
            Token::AmpAmp => write!(f, "&&"),
            Token::Lt => write!(f, "<"),
            Token::EqEq => write!(f, "=="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Bang => write!(f, "!"),
            Token::Eq => write!(f, "="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Semi => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Comment => write!(f, "comment"),
        }
    }
}
