//! Lexer for arrow annotations.
//!
//! Produces span-based tokens; text is sliced from the source only when
//! needed. Unknown characters surface as `Garbage` tokens so the parser can
//! report a spanned error instead of silently skipping input.

use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TokenKind {
    #[token("~>")]
    ArrowOp,

    #[token("<=")]
    LessEqual,

    #[token("\\")]
    Backslash,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(",")]
    Comma,

    #[token(":")]
    Colon,

    #[token("+")]
    Plus,

    #[token("_")]
    Underscore,

    /// `'ident` — an annotation-scoped type parameter.
    #[regex(r"'[A-Za-z][A-Za-z0-9_]*")]
    TyVar,

    #[regex(r"[A-Za-z][A-Za-z0-9_]*")]
    Ident,

    Garbage,
}

/// A token: kind plus byte span into the annotation source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Tokenize an annotation. Lex errors become `Garbage` tokens.
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let kind = result.unwrap_or(TokenKind::Garbage);
        tokens.push(Token {
            kind,
            span: lexer.span(),
        });
    }

    tokens
}
