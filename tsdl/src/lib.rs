//! A parser for TSDL, the Trace Stream Description Language used by the
//! Common Trace Format for its `metadata` stream.
//!
//! [`parse`] takes one metadata document through both phases: the grammar
//! builds an abstract syntax tree, and the resolution pass rewrites every
//! by-name type reference to its definition. The phases can also be run
//! separately through [`lang::ast::Document::parse`] and
//! [`pass::resolve::resolve_document`], for callers that want to inspect
//! the unresolved tree.
//!
//! Errors are [`reporting::Message`] values carrying a file id and byte
//! range; [`reporting::Message::to_diagnostic`] turns one into a
//! `codespan_reporting` diagnostic for terminal output.

pub mod lang;
pub mod pass;
pub mod reporting;

mod literal;

use lang::ast::Document;
use lang::FileId;
use reporting::Message;

/// Parse and resolve one metadata document.
///
/// `file_id` is an opaque handle that error messages carry back to the
/// caller, matching the ids used by a `codespan_reporting` file database.
pub fn parse(file_id: FileId, source: &str) -> Result<Document, Message> {
    let mut document = Document::parse(file_id, source)?;
    pass::resolve::resolve_document(&mut document)?;
    Ok(document)
}
