//! Error types for plugin registration and template resolution

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in template text
pub type Span = std::ops::Range<usize>;

/// Where an unresolved token sat when resolution gave up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenContext {
    /// Template text of the pass that failed
    pub template: String,
    /// Byte span of the whole token, markers included
    pub span: Span,
}

#[derive(Error, Debug)]
pub enum TimError {
    /// Registration rejected; the registry is left as it was
    #[error("invalid plugin: {reason}")]
    InvalidPlugin { reason: String },

    /// Delimiter pair is empty or uses the same marker twice
    #[error("invalid delimiters: {reason}")]
    InvalidDelimiters { reason: String },

    /// No plugin matched the content, or every matching plugin declined
    #[error("unresolved token: no plugin resolved {content:?}")]
    UnresolvedToken {
        content: String,
        context: Option<TokenContext>,
    },

    /// A resolver claimed the content but failed to produce a value
    #[error("plugin '{plugin}' failed on {content:?}: {message}")]
    Plugin {
        plugin: String,
        content: String,
        message: String,
    },

    #[error("pass limit exceeded: more than {limit} substitutions in one run")]
    PassLimit { limit: usize },

    #[error("recursion limit exceeded: nested runs deeper than {limit}")]
    RecursionLimit { limit: usize },
}

impl TimError {
    pub(crate) fn unresolved(content: &str) -> Self {
        TimError::UnresolvedToken {
            content: content.to_string(),
            context: None,
        }
    }

    pub(crate) fn invalid_plugin(reason: impl Into<String>) -> Self {
        TimError::InvalidPlugin {
            reason: reason.into(),
        }
    }

    /// Attach the failing template and token span to an unresolved token.
    ///
    /// Other variants, and tokens that already carry a context from a deeper
    /// nested run, pass through untouched.
    pub(crate) fn with_context(self, template: &str, span: Span) -> Self {
        match self {
            TimError::UnresolvedToken {
                content,
                context: None,
            } => TimError::UnresolvedToken {
                content,
                context: Some(TokenContext {
                    template: template.to_string(),
                    span,
                }),
            },
            other => other,
        }
    }

    /// Format the error with template context using ariadne
    ///
    /// Only unresolved tokens carry a location; everything else falls back to
    /// the plain display text.
    pub fn report(&self, filename: &str) -> String {
        self.render_report(filename, true)
    }

    /// Same as [`TimError::report`] without ANSI colors
    pub fn report_plain(&self, filename: &str) -> String {
        self.render_report(filename, false)
    }

    fn render_report(&self, filename: &str, color: bool) -> String {
        let TimError::UnresolvedToken {
            content,
            context: Some(context),
        } = self
        else {
            return self.to_string();
        };

        // ariadne counts characters, spans are bytes
        let (Some(before), Some(token)) = (
            context.template.get(..context.span.start),
            context.template.get(context.span.clone()),
        ) else {
            return self.to_string();
        };
        let start = before.chars().count();
        let end = start + token.chars().count();

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, start)
            .with_config(Config::default().with_color(color))
            .with_message(format!("unresolved token {:?}", content))
            .with_label(
                Label::new((filename, start..end))
                    .with_message("no registered plugin resolved this token")
                    .with_color(Color::Red),
            )
            .with_note("register a catch-all plugin to let unknown tokens through")
            .finish()
            .write((filename, Source::from(context.template.as_str())), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}
