//! S-expression reader for construct and fact text
//!
//! Every construct is a single parenthesised expression. Atoms are either
//! bare symbols or double-quoted strings (with `\"` and `\\` escapes).
//! `;` starts a comment that runs to the end of the line.

use crate::{EngineError, Value};

/// A parsed expression together with its byte offset in the source text
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Sexp {
    Atom { value: Value, offset: usize },
    List { items: Vec<Sexp>, offset: usize },
}

impl Sexp {
    pub(crate) fn offset(&self) -> usize {
        match self {
            Sexp::Atom { offset, .. } | Sexp::List { offset, .. } => *offset,
        }
    }

    /// Bare symbol text, if this is a symbol atom
    pub(crate) fn as_symbol(&self) -> Option<&str> {
        match self {
            Sexp::Atom {
                value: Value::Symbol(s),
                ..
            } => Some(s),
            _ => None,
        }
    }

    pub(crate) fn as_list(&self) -> Option<&[Sexp]> {
        match self {
            Sexp::List { items, .. } => Some(items),
            _ => None,
        }
    }
}

/// Deepest list nesting accepted in a single expression
pub(crate) const MAX_DEPTH: usize = 64;

/// Parse exactly one expression; trailing non-comment input is an error
pub(crate) fn parse_one(text: &str) -> Result<Sexp, EngineError> {
    let mut reader = Reader { text, pos: 0 };
    let sexp = reader.read(0)?;
    reader.skip_whitespace();
    if reader.pos < text.len() {
        return Err(EngineError::syntax(
            reader.pos,
            "unexpected input after expression",
        ));
    }
    Ok(sexp)
}

struct Reader<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with(';') {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else {
                break;
            }
        }
    }

    fn read(&mut self, depth: usize) -> Result<Sexp, EngineError> {
        self.skip_whitespace();
        let offset = self.pos;

        match self.peek() {
            None => Err(EngineError::syntax(offset, "unexpected end of input")),
            Some('(') if depth >= MAX_DEPTH => {
                Err(EngineError::syntax(offset, "expression nested too deeply"))
            }
            Some('(') => {
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        None => return Err(EngineError::syntax(offset, "unclosed '('")),
                        Some(')') => {
                            self.pos += 1;
                            return Ok(Sexp::List { items, offset });
                        }
                        Some(_) => items.push(self.read(depth + 1)?),
                    }
                }
            }
            Some(')') => Err(EngineError::syntax(offset, "unexpected ')'")),
            Some('"') => self.read_string(offset),
            Some(_) => Ok(self.read_symbol(offset)),
        }
    }

    fn read_string(&mut self, offset: usize) -> Result<Sexp, EngineError> {
        // Skip the opening quote
        let body = &self.text[self.pos + 1..];
        let mut out = String::new();
        let mut chars = body.char_indices();

        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += 1 + i + 1;
                    return Ok(Sexp::Atom {
                        value: Value::String(out),
                        offset,
                    });
                }
                '\\' => match chars.next() {
                    Some((_, escaped)) => out.push(escaped),
                    None => break,
                },
                c => out.push(c),
            }
        }

        Err(EngineError::syntax(offset, "unterminated string"))
    }

    fn read_symbol(&mut self, offset: usize) -> Sexp {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';'))
            .unwrap_or(rest.len());
        let symbol = rest[..end].to_string();
        self.pos += end;

        Sexp::Atom {
            value: Value::Symbol(symbol),
            offset,
        }
    }
}
