//! Recursive-descent parser for the annotation grammar.
//!
//! ```text
//! top      := type '~>' type [ '\' '(' '{' bounds? '}' ',' '{' names? '}' ')' ]
//! type     := IDENT ('+' IDENT)*
//!           | '_'
//!           | '\'' IDENT
//!           | '[' type ']'
//!           | '(' type (',' type)* ')'
//!           | '<' IDENT ':' type (',' IDENT ':' type)* '>'
//!           | '{' IDENT ':' type (',' IDENT ':' type)* '}'
//! bounds   := type '<=' type (',' type '<=' type)*
//! names    := IDENT (',' IDENT)*
//! ```
//!
//! Each distinct `'ident` within one annotation maps to one fresh parameter
//! minted from the supplied [`TypeCx`].

use std::collections::HashMap;
use std::ops::Range;

use weft_types::{Type, TypeCx};

use crate::ParseError;
use crate::lexer::{Token, TokenKind, lex};

/// A parsed annotation, ready to become an `ArrowType`.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub arg: Type,
    pub out: Type,
    /// Declared bounds, as `(lower, upper)` pairs.
    pub bounds: Vec<(Type, Type)>,
    /// Declared throw set.
    pub throws: Vec<Type>,
}

/// Parse one annotation. Fresh parameters are minted from `cx`.
pub fn parse_signature(source: &str, cx: &TypeCx) -> Result<Signature, ParseError> {
    let mut parser = Parser {
        source,
        tokens: lex(source),
        pos: 0,
        cx,
        vars: HashMap::new(),
    };

    let arg = parser.ty()?;
    parser.expect(TokenKind::ArrowOp, "expected `~>`")?;
    let out = parser.ty()?;

    let (bounds, throws) = if parser.eat(TokenKind::Backslash) {
        parser.clause()?
    } else {
        (Vec::new(), Vec::new())
    };

    if let Some(tok) = parser.peek() {
        return Err(ParseError::new("trailing input after annotation", tok.span));
    }

    Ok(Signature {
        arg,
        out,
        bounds,
        throws,
    })
}

struct Parser<'s, 'cx> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    cx: &'cx TypeCx,
    vars: HashMap<String, Type>,
}

impl Parser<'_, '_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).cloned()
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eof_span(&self) -> Range<usize> {
        self.source.len()..self.source.len()
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|t| t.kind == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(tok) if tok.kind == kind => {
                self.pos += 1;
                Ok(tok)
            }
            Some(tok) => Err(ParseError::new(message, tok.span)),
            None => Err(ParseError::new(message, self.eof_span())),
        }
    }

    fn text(&self, tok: &Token) -> &str {
        &self.source[tok.span.clone()]
    }

    fn ty(&mut self) -> Result<Type, ParseError> {
        let Some(tok) = self.bump() else {
            return Err(ParseError::new("expected a type", self.eof_span()));
        };

        match tok.kind {
            TokenKind::Underscore => Ok(Type::Top),
            TokenKind::TyVar => {
                let name = self.text(&tok).to_owned();
                let cx = self.cx;
                Ok(self
                    .vars
                    .entry(name)
                    .or_insert_with(|| cx.fresh(false))
                    .clone())
            }
            TokenKind::Ident => {
                let mut names = vec![self.text(&tok).to_owned()];
                while self.eat(TokenKind::Plus) {
                    let next = self.expect(TokenKind::Ident, "expected a name after `+`")?;
                    names.push(self.text(&next).to_owned());
                }
                Ok(Type::from_names(names))
            }
            TokenKind::LBracket => {
                let inner = self.ty()?;
                self.expect(TokenKind::RBracket, "expected `]`")?;
                Ok(Type::array(inner))
            }
            TokenKind::LParen => {
                let mut items = vec![self.ty()?];
                while self.eat(TokenKind::Comma) {
                    items.push(self.ty()?);
                }
                self.expect(TokenKind::RParen, "expected `)`")?;
                Ok(Type::tuple(items))
            }
            TokenKind::LAngle => {
                let entries = self.keyed_entries(TokenKind::RAngle, "expected `>`")?;
                Ok(Type::tagged(entries))
            }
            TokenKind::LBrace => {
                let entries = self.keyed_entries(TokenKind::RBrace, "expected `}`")?;
                Ok(Type::record(entries))
            }
            _ => Err(ParseError::new("expected a type", tok.span)),
        }
    }

    fn keyed_entries(
        &mut self,
        close: TokenKind,
        close_msg: &str,
    ) -> Result<Vec<(String, Type)>, ParseError> {
        let mut entries = Vec::new();
        loop {
            let key = self.expect(TokenKind::Ident, "expected a key")?;
            self.expect(TokenKind::Colon, "expected `:`")?;
            let value = self.ty()?;
            entries.push((self.text(&key).to_owned(), value));

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(close, close_msg)?;
        Ok(entries)
    }

    /// The `\ ({bounds}, {throws})` tail.
    fn clause(&mut self) -> Result<(Vec<(Type, Type)>, Vec<Type>), ParseError> {
        self.expect(TokenKind::LParen, "expected `(` after `\\`")?;

        self.expect(TokenKind::LBrace, "expected `{` opening the bound set")?;
        let mut bounds = Vec::new();
        if !self.peek().is_some_and(|t| t.kind == TokenKind::RBrace) {
            loop {
                let lower = self.ty()?;
                self.expect(TokenKind::LessEqual, "expected `<=`")?;
                let upper = self.ty()?;
                bounds.push((lower, upper));

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "expected `}` closing the bound set")?;

        self.expect(TokenKind::Comma, "expected `,` between bounds and throws")?;

        self.expect(TokenKind::LBrace, "expected `{` opening the throw set")?;
        let mut throws = Vec::new();
        if !self.peek().is_some_and(|t| t.kind == TokenKind::RBrace) {
            loop {
                let tok = self.expect(TokenKind::Ident, "expected a thrown type name")?;
                throws.push(Type::named(self.text(&tok)));

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "expected `}` closing the throw set")?;

        self.expect(TokenKind::RParen, "expected `)`")?;
        Ok((bounds, throws))
    }
}
