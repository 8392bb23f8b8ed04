//! Spanned rendering for annotation parse errors.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

use crate::ParseError;

/// Render a parse error against its annotation source, caret and all.
pub fn render_parse_error(error: &ParseError, source: &str) -> String {
    let end = error.span.end.min(source.len());
    let start = error.span.start.min(end);

    let snippet = Snippet::source(source).line_start(1).annotation(
        AnnotationKind::Primary
            .span(start..end)
            .label(&error.message),
    );

    let report = [Level::ERROR
        .primary_title("bad arrow annotation")
        .element(snippet)];

    Renderer::plain().render(&report).to_string()
}
