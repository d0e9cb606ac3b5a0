use logos::{Filter, Logos};
use std::fmt;

use crate::lang::FileId;
use crate::reporting::Message;

/// Tokens of the TSDL grammar.
///
/// Only the six type keywords are reserved; scope introducers (`env`,
/// `trace`, ...) and assignment keywords (`size`, `align`, ...) lex as plain
/// names and are recognized contextually by the grammar layer.
#[derive(Debug, Clone, PartialEq, Logos)]
pub enum Token<'source> {
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Name(&'source str),
    #[regex(r#""([^"\\]|\\.)*""#)] // workaround editor highlighting: "
    StringLiteral(&'source str),
    #[regex(r"[0-9][0-9a-zA-Z_]*")]
    NumberLiteral(&'source str),

    #[token("struct")]
    Struct,
    #[token("variant")]
    Variant,
    #[token("enum")]
    Enum,
    #[token("integer")]
    Integer,
    #[token("floating_point")]
    FloatingPoint,
    #[token("string")]
    String,

    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,

    #[token(":=")]
    ColonEquals,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    #[token("...")]
    DotDotDot,
    #[token(".")]
    FullStop,
    #[token("->")]
    HyphenGreater,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,

    #[token("/*", block_comment)]
    UnclosedBlockComment,

    #[error]
    #[regex(r"\p{Whitespace}", logos::skip)]
    #[regex(r"//[^\n]*", logos::skip)]
    Error,
}

/// C-style block comments do not nest; consume up to the first `*/` or, when
/// there is none, emit the token so the stream reports an unclosed comment.
fn block_comment<'source>(lexer: &mut logos::Lexer<'source, Token<'source>>) -> Filter<()> {
    match lexer.remainder().find("*/") {
        Some(close) => {
            lexer.bump(close + "*/".len());
            Filter::Skip
        }
        None => {
            lexer.bump(lexer.remainder().len());
            Filter::Emit(())
        }
    }
}

impl<'source> fmt::Display for Token<'source> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(source) => write!(f, "{}", source),
            Token::StringLiteral(source) => write!(f, "{}", source),
            Token::NumberLiteral(source) => write!(f, "{}", source),

            Token::Struct => write!(f, "struct"),
            Token::Variant => write!(f, "variant"),
            Token::Enum => write!(f, "enum"),
            Token::Integer => write!(f, "integer"),
            Token::FloatingPoint => write!(f, "floating_point"),
            Token::String => write!(f, "string"),

            Token::OpenBrace => write!(f, "{{"),
            Token::CloseBrace => write!(f, "}}"),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::OpenBracket => write!(f, "["),
            Token::CloseBracket => write!(f, "]"),

            Token::ColonEquals => write!(f, ":="),
            Token::Colon => write!(f, ":"),
            Token::Semi => write!(f, ";"),
            Token::Comma => write!(f, ","),
            Token::Equals => write!(f, "="),
            Token::DotDotDot => write!(f, "..."),
            Token::FullStop => write!(f, "."),
            Token::HyphenGreater => write!(f, "->"),
            Token::Less => write!(f, "<"),
            Token::Greater => write!(f, ">"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),

            Token::UnclosedBlockComment => write!(f, "/*"),
            Token::Error => write!(f, "<error>"),
        }
    }
}

pub type Spanned<Tok, Loc> = (Loc, Tok, Loc);

pub fn tokens<'source>(
    file_id: FileId,
    source: &'source str,
) -> impl 'source + Iterator<Item = Result<Spanned<Token<'source>, usize>, Message>> {
    Token::lexer(source)
        .spanned()
        .map(move |(token, range)| match token {
            Token::Error => Err(Message::InvalidToken {
                file_id,
                range: range.into(),
            }),
            Token::UnclosedBlockComment => Err(Message::UnclosedBlockComment {
                file_id,
                range: range.into(),
            }),
            token => Ok((range.start, token, range.end)),
        })
}
