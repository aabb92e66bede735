use codemap::{CodeMap, File, Span};
use codemap_diagnostic::{
    ColorConfig, Diagnostic, Emitter, Level, SpanLabel, SpanStyle,
};
use rowan::TextRange;

#[derive(Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn show(self, code_map: &CodeMap) {
        if !self.0.is_empty() {
            Emitter::stderr(ColorConfig::Auto, Some(code_map)).emit(&self.0);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.0
            .iter()
            .any(|diagnostic| matches!(diagnostic.level, Level::Error))
    }

    pub fn error(
        &mut self,
        message: impl Into<String>,
        labels: impl Into<Vec<SpanLabel>>,
    ) {
        self.0.push(Diagnostic {
            level: Level::Error,
            message: message.into(),
            code: None,
            spans: labels.into(),
        });
    }

    pub fn note(
        &mut self,
        message: impl Into<String>,
        labels: impl Into<Vec<SpanLabel>>,
    ) {
        self.0.push(Diagnostic {
            level: Level::Note,
            message: message.into(),
            code: None,
            spans: labels.into(),
        });
    }
}

pub fn primary(span: Span, label: impl Into<String>) -> SpanLabel {
    let label = label.into();
    SpanLabel {
        span,
        label: (!label.is_empty()).then_some(label),
        style: SpanStyle::Primary,
    }
}

pub fn span(file: &File, text_range: TextRange) -> Span {
    file.span.subspan(
        u64::from(u32::from(text_range.start())),
        u64::from(u32::from(text_range.end())),
    )
}
