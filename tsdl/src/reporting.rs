//! Diagnostic messages reported while parsing TSDL metadata.
//!
//! These can be converted to [`Diagnostic`]s in order to present them to the
//! user.
//!
//! [`Diagnostic`]: codespan_reporting::diagnostic::Diagnostic

use codespan_reporting::diagnostic::{Diagnostic, Label};
use itertools::Itertools;
use std::fmt;

use crate::lang::{FileId, Range};

/// Every error a parse can surface.
///
/// Both the grammar-level and the resolution-level categories abort the
/// parse immediately; a failed parse yields no partial result and there is
/// no warning-level output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A character sequence that is not a token.
    InvalidToken { file_id: FileId, range: Range },
    /// A `/*` with no matching `*/`.
    UnclosedBlockComment { file_id: FileId, range: Range },
    UnexpectedToken {
        file_id: FileId,
        range: Range,
        found: String,
        expected: String,
    },
    UnexpectedEof {
        file_id: FileId,
        range: Range,
        expected: String,
    },
    InvalidIntegerLiteral {
        file_id: FileId,
        range: Range,
        literal: String,
    },
    /// A required `keyword = value;` assignment was omitted from a type
    /// block, e.g. an `integer { ... }` without `size`.
    MissingAttribute {
        file_id: FileId,
        range: Range,
        type_name: &'static str,
        attribute: &'static str,
    },
    /// A `base = <int>;` constant outside {2, 8, 10, 16}.
    UnsupportedBase {
        file_id: FileId,
        range: Range,
        base: i64,
    },
    UnresolvedStruct {
        file_id: FileId,
        range: Range,
        name: String,
    },
    UnresolvedVariant {
        file_id: FileId,
        range: Range,
        name: String,
    },
    UnresolvedAlias {
        file_id: FileId,
        range: Range,
        name: String,
    },
}

impl Message {
    pub fn to_diagnostic(&self) -> Diagnostic<FileId> {
        match self {
            Message::InvalidToken { file_id, range } => Diagnostic::error()
                .with_message("invalid token")
                .with_labels(vec![Label::primary(*file_id, *range)]),
            Message::UnclosedBlockComment { file_id, range } => Diagnostic::error()
                .with_message("unclosed block comment")
                .with_labels(vec![Label::primary(*file_id, *range)
                    .with_message("no matching `*/` before the end of the file")]),
            Message::UnexpectedToken {
                file_id,
                range,
                found,
                expected,
            } => Diagnostic::error()
                .with_message(format!("unexpected token `{}`", found))
                .with_labels(vec![
                    Label::primary(*file_id, *range).with_message("unexpected token")
                ])
                .with_notes(vec![format!("expected {}", expected)]),
            Message::UnexpectedEof {
                file_id,
                range,
                expected,
            } => Diagnostic::error()
                .with_message("unexpected end of file")
                .with_labels(vec![
                    Label::primary(*file_id, *range).with_message("unexpected end of file")
                ])
                .with_notes(vec![format!("expected {}", expected)]),
            Message::InvalidIntegerLiteral {
                file_id,
                range,
                literal,
            } => Diagnostic::error()
                .with_message(format!("invalid integer literal `{}`", literal))
                .with_labels(vec![Label::primary(*file_id, *range)]),
            Message::MissingAttribute {
                file_id,
                range,
                type_name,
                attribute,
            } => Diagnostic::error()
                .with_message(format!(
                    "`{}` block is missing a `{}` assignment",
                    type_name, attribute
                ))
                .with_labels(vec![Label::primary(*file_id, *range)]),
            Message::UnsupportedBase {
                file_id,
                range,
                base,
            } => Diagnostic::error()
                .with_message(format!("unsupported integer base `{}`", base))
                .with_labels(vec![Label::primary(*file_id, *range)])
                .with_notes(vec!["supported bases are 2, 8, 10, and 16".to_owned()]),
            Message::UnresolvedStruct {
                file_id,
                range,
                name,
            } => Diagnostic::error()
                .with_message(format!("cannot resolve struct `{}`", name))
                .with_labels(vec![Label::primary(*file_id, *range)
                    .with_message("not defined in this scope or any enclosing scope")]),
            Message::UnresolvedVariant {
                file_id,
                range,
                name,
            } => Diagnostic::error()
                .with_message(format!("cannot resolve variant `{}`", name))
                .with_labels(vec![Label::primary(*file_id, *range)
                    .with_message("not defined in this scope or any enclosing scope")]),
            Message::UnresolvedAlias {
                file_id,
                range,
                name,
            } => Diagnostic::error()
                .with_message(format!("cannot resolve type `{}`", name))
                .with_labels(vec![Label::primary(*file_id, *range)
                    .with_message("not defined in this scope or any enclosing scope")]),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::InvalidToken { .. } => write!(f, "invalid token"),
            Message::UnclosedBlockComment { .. } => write!(f, "unclosed block comment"),
            Message::UnexpectedToken {
                found, expected, ..
            } => write!(f, "unexpected token `{}`, expected {}", found, expected),
            Message::UnexpectedEof { expected, .. } => {
                write!(f, "unexpected end of file, expected {}", expected)
            }
            Message::InvalidIntegerLiteral { literal, .. } => {
                write!(f, "invalid integer literal `{}`", literal)
            }
            Message::MissingAttribute {
                type_name,
                attribute,
                ..
            } => write!(
                f,
                "`{}` block is missing a `{}` assignment",
                type_name, attribute
            ),
            Message::UnsupportedBase { base, .. } => {
                write!(f, "unsupported integer base `{}`", base)
            }
            Message::UnresolvedStruct { name, .. } => {
                write!(f, "cannot resolve struct `{}`", name)
            }
            Message::UnresolvedVariant { name, .. } => {
                write!(f, "cannot resolve variant `{}`", name)
            }
            Message::UnresolvedAlias { name, .. } => {
                write!(f, "cannot resolve type `{}`", name)
            }
        }
    }
}

impl std::error::Error for Message {}

/// Format a list of grammar alternatives for an error note.
pub(crate) fn format_expected(expected: &[&str]) -> String {
    match expected {
        [] => "nothing".to_owned(),
        [one] => format!("`{}`", one),
        [init @ .., last] => format!(
            "{}, or `{}`",
            init.iter().map(|item| format!("`{}`", item)).join(", "),
            last
        ),
    }
}
