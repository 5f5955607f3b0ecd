use crate::span::Span;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("Syntax error: {msg}")]
    Syntax { msg: String, span: Span },

    #[error("Type error: {msg}")]
    Type { msg: String, span: Span },

    #[error("Resolve error: {msg}")]
    Resolve { msg: String, span: Span },

    #[error("Unsupported: {feature} is not yet supported")]
    Unsupported { feature: String, span: Span },

    #[error("Codegen error: {msg}")]
    Codegen { msg: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid AST JSON: {0}")]
    AstJson(#[from] serde_json::Error),
}

impl CompileError {
    pub fn syntax(msg: impl Into<String>, span: Span) -> Self {
        Self::Syntax { msg: msg.into(), span }
    }

    pub fn type_err(msg: impl Into<String>, span: Span) -> Self {
        Self::Type { msg: msg.into(), span }
    }

    pub fn resolve(msg: impl Into<String>, span: Span) -> Self {
        Self::Resolve { msg: msg.into(), span }
    }

    pub fn unsupported(feature: impl Into<String>, span: Span) -> Self {
        Self::Unsupported { feature: feature.into(), span }
    }

    pub fn codegen(msg: impl Into<String>) -> Self {
        Self::Codegen { msg: msg.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Source span the error points at, when it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Syntax { span, .. }
            | Self::Type { span, .. }
            | Self::Resolve { span, .. }
            | Self::Unsupported { span, .. } => Some(*span),
            Self::Codegen { .. } | Self::Io { .. } | Self::AstJson(_) => None,
        }
    }
}

/// Render a CompileError with ariadne for nice terminal output.
pub fn render_error(source: &str, filename: &str, err: &CompileError) {
    use ariadne::{Label, Report, ReportKind, Source};

    let (kind_str, label_msg) = match err {
        CompileError::Syntax { msg, .. } => ("syntax", msg.clone()),
        CompileError::Type { msg, .. } => ("type", msg.clone()),
        CompileError::Resolve { msg, .. } => ("resolve", msg.clone()),
        CompileError::Unsupported { feature, .. } => {
            ("unsupported", format!("{feature} is not yet supported"))
        }
        CompileError::Codegen { msg } => {
            eprintln!("error: {msg}");
            return;
        }
        CompileError::Io { .. } | CompileError::AstJson(_) => {
            eprintln!("error: {err}");
            return;
        }
    };

    let Some(span) = err.span() else { return };
    let printed = Report::build(ReportKind::Error, filename, span.start)
        .with_message(format!("{kind_str} error"))
        .with_label(Label::new((filename, span.start..span.end)).with_message(label_msg))
        .finish()
        .eprint((filename, Source::from(source)));
    if printed.is_err() {
        eprintln!("error: {err}");
    }
}
