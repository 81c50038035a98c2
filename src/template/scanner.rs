//! Token scanner: finds the first balanced `{{ ... }}` span in a template

use std::ops::Range;

use crate::config::Delimiters;

/// A balanced token located in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Whole token, markers included
    pub span: Range<usize>,
    /// Text between the outermost markers, nested markers left raw
    pub content: Range<usize>,
}

impl Token {
    pub fn content<'a>(&self, template: &'a str) -> &'a str {
        &template[self.content.clone()]
    }
}

/// Find the first balanced token in `template`.
///
/// Starting at the first open marker, the scan keeps a nesting depth: an open
/// marker strictly before the next close marker goes one level deeper, any
/// other close marker comes back up one. The token ends when the depth returns
/// to zero. Returns `None` when there is no open marker, or when the close
/// markers run out first; in that case nothing after the first open marker is
/// a token.
pub fn next_token(template: &str, delimiters: &Delimiters) -> Option<Token> {
    let open = delimiters.open();
    let close = delimiters.close();

    let start = template.find(open)?;
    let mut cursor = start + open.len();
    let mut depth = 1usize;

    while depth > 0 {
        let rest = &template[cursor..];
        let next_close = rest.find(close)?;

        match rest.find(open) {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                cursor += next_open + open.len();
            }
            _ => {
                depth -= 1;
                cursor += next_close + close.len();
            }
        }
    }

    Some(Token {
        span: start..cursor,
        content: start + open.len()..cursor - close.len(),
    })
}
