use crate::lexer::{TokenKind, lex};

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn lexes_arrow_and_type_vars() {
    assert_eq!(
        kinds("'a ~> 'a"),
        vec![TokenKind::TyVar, TokenKind::ArrowOp, TokenKind::TyVar]
    );
}

#[test]
fn less_equal_wins_over_angle_bracket() {
    assert_eq!(kinds("<="), vec![TokenKind::LessEqual]);
    assert_eq!(
        kinds("< a <= b >"),
        vec![
            TokenKind::LAngle,
            TokenKind::Ident,
            TokenKind::LessEqual,
            TokenKind::Ident,
            TokenKind::RAngle,
        ]
    );
}

#[test]
fn lexes_full_clause_tail() {
    assert_eq!(
        kinds("\\ ({}, {Bool})"),
        vec![
            TokenKind::Backslash,
            TokenKind::LParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::Comma,
            TokenKind::LBrace,
            TokenKind::Ident,
            TokenKind::RBrace,
            TokenKind::RParen,
        ]
    );
}

#[test]
fn unknown_characters_become_garbage() {
    assert!(kinds("Number ? String").contains(&TokenKind::Garbage));
}

#[test]
fn spans_slice_back_to_source() {
    let source = "(Number, 'x)";
    let tokens = lex(source);
    let ident = tokens.iter().find(|t| t.kind == TokenKind::Ident).unwrap();
    let var = tokens.iter().find(|t| t.kind == TokenKind::TyVar).unwrap();

    assert_eq!(&source[ident.span.clone()], "Number");
    assert_eq!(&source[var.span.clone()], "'x");
}
