//! The TSDL grammar, as a recursive-descent parse over the token stream.
//!
//! Each `parse_*` method consumes one grammar production. Failures abort the
//! parse with a [`Message`]; there is no recovery.

use itertools::Itertools;

use super::lexer::{self, Token};
use super::*;
use crate::lang::{FileId, Range, Ranged};
use crate::literal;
use crate::reporting::{format_expected, Message};

pub(crate) fn parse_document(file_id: FileId, source: &str) -> Result<Document, Message> {
    Parser::new(file_id, source)?.parse_document()
}

struct Parser<'source> {
    file_id: FileId,
    tokens: Vec<lexer::Spanned<Token<'source>, usize>>,
    pos: usize,
}

impl<'source> Parser<'source> {
    fn new(file_id: FileId, source: &'source str) -> Result<Parser<'source>, Message> {
        let tokens = lexer::tokens(file_id, source).collect::<Result<_, _>>()?;
        Ok(Parser {
            file_id,
            tokens,
            pos: 0,
        })
    }

    // Token stream plumbing

    fn peek(&self) -> Option<&Token<'source>> {
        self.tokens.get(self.pos).map(|(_, token, _)| token)
    }

    fn peek_name(&self) -> Option<&'source str> {
        match self.tokens.get(self.pos) {
            Some((_, Token::Name(name), _)) => Some(name),
            _ => None,
        }
    }

    fn at(&self, token: &Token<'source>) -> bool {
        self.peek() == Some(token)
    }

    fn at2(&self, token: &Token<'source>) -> bool {
        matches!(self.tokens.get(self.pos + 1), Some((_, found, _)) if found == token)
    }

    fn eat(&mut self, token: &Token<'source>) -> bool {
        if self.at(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token<'source>, description: &str) -> Result<(), Message> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.error_expected(&[description]))
        }
    }

    fn eat_name(&mut self) -> Option<Ranged<String>> {
        match self.tokens.get(self.pos) {
            Some((start, Token::Name(name), end)) => {
                let name = Ranged::new(
                    Range {
                        start: *start,
                        end: *end,
                    },
                    (*name).to_owned(),
                );
                self.pos += 1;
                Some(name)
            }
            _ => None,
        }
    }

    fn expect_name(&mut self, description: &str) -> Result<Ranged<String>, Message> {
        match self.eat_name() {
            Some(name) => Ok(name),
            None => Err(self.error_expected(&[description])),
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), Message> {
        if self.peek_name() == Some(keyword) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_expected(&[keyword]))
        }
    }

    fn next_range(&self) -> Range {
        match self.tokens.get(self.pos) {
            Some((start, _, end)) => Range {
                start: *start,
                end: *end,
            },
            None => self.eof_range(),
        }
    }

    fn eof_range(&self) -> Range {
        match self.tokens.last() {
            Some((_, _, end)) => Range {
                start: *end,
                end: *end,
            },
            None => Range { start: 0, end: 0 },
        }
    }

    fn error_expected(&self, expected: &[&str]) -> Message {
        let expected = format_expected(expected);
        match self.tokens.get(self.pos) {
            Some((start, token, end)) => Message::UnexpectedToken {
                file_id: self.file_id,
                range: Range {
                    start: *start,
                    end: *end,
                },
                found: token.to_string(),
                expected,
            },
            None => Message::UnexpectedEof {
                file_id: self.file_id,
                range: self.eof_range(),
                expected,
            },
        }
    }

    // Document root

    fn parse_document(mut self) -> Result<Document, Message> {
        let mut entries = Vec::new();
        while self.peek().is_some() {
            let entry = self.parse_top_entry()?;
            self.expect(Token::Semi, ";")?;
            entries.push(entry);
        }
        Ok(Document {
            file_id: self.file_id,
            entries,
        })
    }

    fn parse_top_entry(&mut self) -> Result<Entry, Message> {
        const EXPECTED: &[&str] = &[
            "env", "trace", "clock", "stream", "event", "typealias", "struct", "variant",
        ];

        if let Some(word) = self.peek_name() {
            if word == "typealias" {
                return Ok(Entry::TypeAlias(self.parse_typealias()?));
            }
            if let Some(kind) = ScopeKind::from_keyword(word) {
                self.pos += 1;
                return Ok(Entry::Scope(self.parse_scope(kind)?));
            }
            return Err(self.error_expected(EXPECTED));
        }
        match self.peek() {
            Some(Token::Struct) => {
                let spec = self.parse_struct_type()?;
                self.require_definition(spec)
            }
            Some(Token::Variant) => {
                let spec = self.parse_variant_type()?;
                self.require_definition(spec)
            }
            _ => Err(self.error_expected(EXPECTED)),
        }
    }

    // Top-level scopes

    fn parse_scope(&mut self, kind: ScopeKind) -> Result<Scope, Message> {
        self.expect(Token::OpenBrace, "{")?;
        let mut entries = Vec::new();
        while !self.at(&Token::CloseBrace) {
            let entry = self.parse_scope_entry()?;
            self.expect(Token::Semi, ";")?;
            entries.push(entry);
        }
        self.expect(Token::CloseBrace, "}")?;
        Ok(Scope { kind, entries })
    }

    fn parse_scope_entry(&mut self) -> Result<Entry, Message> {
        match self.peek() {
            Some(Token::Struct) => {
                let spec = self.parse_struct_type()?;
                return self.require_definition(spec);
            }
            Some(Token::Variant) => {
                let spec = self.parse_variant_type()?;
                return self.require_definition(spec);
            }
            _ => {}
        }
        if self.peek_name() == Some("typealias") {
            return Ok(Entry::TypeAlias(self.parse_typealias()?));
        }
        if self.peek_name().is_some() {
            let key = self.parse_unary_expr()?;
            if self.eat(&Token::ColonEquals) {
                let spec = self.parse_type_spec()?;
                return Ok(Entry::TypeAssign(TypeAssignment { key, spec }));
            }
            if self.eat(&Token::Equals) {
                // Only a bare identifier can carry a value assignment.
                let key = match key {
                    Expr::Postfix(expr) if expr.ops.is_empty() => expr.root,
                    _ => return Err(self.error_expected(&[":="])),
                };
                let value = self.parse_value()?;
                return Ok(Entry::Value(ValueAssignment { key, value }));
            }
            return Err(self.error_expected(&["=", ":="]));
        }
        Err(self.error_expected(&["typealias", "struct", "variant", "an assignment"]))
    }

    fn parse_value(&mut self) -> Result<Value, Message> {
        match self.peek() {
            Some(Token::Name(_)) => {
                let name = self.expect_name("a value")?;
                Ok(Value::Name(name.data))
            }
            Some(Token::StringLiteral(_)) => Ok(Value::String(self.expect_string_literal()?)),
            Some(Token::NumberLiteral(_) | Token::Plus | Token::Minus) => {
                Ok(Value::Number(self.parse_signed_const()?))
            }
            _ => Err(self.error_expected(&["an identifier", "a string literal", "a number"])),
        }
    }

    // Struct and variant bodies

    fn parse_entries_block(&mut self) -> Result<Vec<Entry>, Message> {
        self.expect(Token::OpenBrace, "{")?;
        let mut entries = Vec::new();
        while !self.at(&Token::CloseBrace) {
            let entry = self.parse_struct_entry()?;
            self.expect(Token::Semi, ";")?;
            entries.push(entry);
        }
        self.expect(Token::CloseBrace, "}")?;
        Ok(entries)
    }

    fn parse_struct_entry(&mut self) -> Result<Entry, Message> {
        if let Some(word) = self.peek_name() {
            if word == "typealias" {
                return Ok(Entry::TypeAlias(self.parse_typealias()?));
            }
            return self.parse_alias_field();
        }
        match self.peek() {
            Some(
                Token::Struct
                | Token::Variant
                | Token::Enum
                | Token::Integer
                | Token::FloatingPoint
                | Token::String,
            ) => {
                let spec = self.parse_type_spec()?;
                match self.eat_name() {
                    Some(decl) => {
                        let subscripts = self.parse_subscripts()?;
                        Ok(Entry::Field(Field {
                            spec,
                            decl: Declarator {
                                name: decl.data,
                                subscripts,
                            },
                        }))
                    }
                    None => self.require_definition(spec),
                }
            }
            _ => Err(self.error_expected(&["a type", "typealias"])),
        }
    }

    /// A field whose type is an alias name: one or more identifiers followed
    /// by the declarator name, e.g. `unsigned long seq;`.
    fn parse_alias_field(&mut self) -> Result<Entry, Message> {
        let mut names = Vec::new();
        while let Some(name) = self.eat_name() {
            names.push(name);
        }
        let decl = match names.pop() {
            Some(decl) if !names.is_empty() => decl,
            _ => return Err(self.error_expected(&["a declarator name"])),
        };
        let range = Range {
            start: names.first().map(|name| name.range.start).unwrap_or_default(),
            end: names.last().map(|name| name.range.end).unwrap_or_default(),
        };
        let alias = names.iter().map(|name| name.data.as_str()).join(" ");
        let subscripts = self.parse_subscripts()?;
        Ok(Entry::Field(Field {
            spec: TypeSpec::AliasRef(Ranged::new(range, alias)),
            decl: Declarator {
                name: decl.data,
                subscripts,
            },
        }))
    }

    fn parse_subscripts(&mut self) -> Result<Vec<Expr>, Message> {
        let mut subscripts = Vec::new();
        while self.eat(&Token::OpenBracket) {
            subscripts.push(self.parse_unary_expr()?);
            self.expect(Token::CloseBracket, "]")?;
        }
        Ok(subscripts)
    }

    /// Only full struct/variant definitions can stand alone as entries.
    fn require_definition(&self, spec: TypeSpec) -> Result<Entry, Message> {
        match spec {
            TypeSpec::Def(Type::Struct(def)) => Ok(Entry::Struct(def)),
            TypeSpec::Def(Type::Variant(def)) => Ok(Entry::Variant(def)),
            _ => Err(self.error_expected(&["{"])),
        }
    }

    // Types

    fn parse_type_spec(&mut self) -> Result<TypeSpec, Message> {
        match self.peek() {
            Some(Token::Struct) => self.parse_struct_type(),
            Some(Token::Variant) => self.parse_variant_type(),
            Some(Token::Enum) => Ok(TypeSpec::Def(Type::Enum(self.parse_enum()?))),
            Some(Token::Integer) => {
                let range = self.next_range();
                self.pos += 1;
                let integer = self.parse_integer_block(range)?;
                Ok(TypeSpec::Def(Type::Integer(integer)))
            }
            Some(Token::FloatingPoint) => {
                let range = self.next_range();
                self.pos += 1;
                let float = self.parse_float_block(range)?;
                Ok(TypeSpec::Def(Type::FloatingPoint(float)))
            }
            Some(Token::String) => {
                self.pos += 1;
                Ok(TypeSpec::Def(Type::String(self.parse_string_block()?)))
            }
            _ => Err(self.error_expected(&[
                "struct",
                "variant",
                "enum",
                "integer",
                "floating_point",
                "string",
            ])),
        }
    }

    fn parse_struct_type(&mut self) -> Result<TypeSpec, Message> {
        self.expect(Token::Struct, "struct")?;
        let name = self.eat_name();
        if self.at(&Token::OpenBrace) {
            let entries = self.parse_entries_block()?;
            let align = self.parse_struct_align()?;
            return Ok(TypeSpec::Def(Type::Struct(Struct {
                name: name.map(|name| name.data),
                entries,
                align,
            })));
        }
        match name {
            Some(name) => Ok(TypeSpec::StructRef(name)),
            None => Err(self.error_expected(&["a struct name", "{"])),
        }
    }

    /// An `align(N)` suffix; `align` alone is an ordinary identifier (it may
    /// be the following field's declarator).
    fn parse_struct_align(&mut self) -> Result<Option<u64>, Message> {
        if self.peek_name() != Some("align") || !self.at2(&Token::OpenParen) {
            return Ok(None);
        }
        self.pos += 1;
        self.expect(Token::OpenParen, "(")?;
        let align = self.parse_const_u64()?;
        self.expect(Token::CloseParen, ")")?;
        Ok(Some(align))
    }

    fn parse_variant_type(&mut self) -> Result<TypeSpec, Message> {
        self.expect(Token::Variant, "variant")?;
        let name = self.eat_name();
        let tag = if self.eat(&Token::Less) {
            let tag = self.parse_unary_expr()?;
            self.expect(Token::Greater, ">")?;
            Some(tag)
        } else {
            None
        };

        if self.at(&Token::OpenBrace) {
            let entries = self.parse_entries_block()?;
            return Ok(TypeSpec::Def(Type::Variant(Variant {
                name: name.map(|name| name.data),
                tag,
                entries,
            })));
        }
        match (name, tag) {
            // A reference must carry the tag for its use site.
            (Some(name), Some(tag)) => Ok(TypeSpec::VariantRef { name, tag }),
            (Some(_), None) => Err(self.error_expected(&["<", "{"])),
            (None, _) => Err(self.error_expected(&["a variant name", "{"])),
        }
    }

    fn parse_typealias(&mut self) -> Result<TypeAlias, Message> {
        self.expect_keyword("typealias")?;
        let spec = self.parse_type_spec()?;
        self.expect(Token::ColonEquals, ":=")?;
        let mut parts = vec![self.expect_name("an alias name")?.data];
        while let Some(name) = self.eat_name() {
            parts.push(name.data);
        }
        Ok(TypeAlias {
            name: parts.iter().join(" "),
            spec,
        })
    }

    fn parse_enum(&mut self) -> Result<Enum, Message> {
        self.expect(Token::Enum, "enum")?;
        let name = self.eat_name().map(|name| name.data);
        self.expect(Token::Colon, ":")?;
        let int_type = match self.peek() {
            Some(Token::Integer) => {
                let range = self.next_range();
                self.pos += 1;
                EnumIntType::Integer(Box::new(self.parse_integer_block(range)?))
            }
            _ => EnumIntType::Alias(self.expect_name("an integer type name")?),
        };

        self.expect(Token::OpenBrace, "{")?;
        let mut result = Enum {
            name,
            int_type,
            labels: Vec::new(),
        };
        let mut cursor: i64 = 0;
        while !self.at(&Token::CloseBrace) {
            let label = match self.peek() {
                Some(Token::Name(_)) => self.expect_name("an enumerator name")?.data,
                Some(Token::StringLiteral(_)) => self.expect_string_literal()?,
                _ => {
                    return Err(
                        self.error_expected(&["an enumerator name", "a string literal"])
                    )
                }
            };
            if self.eat(&Token::Equals) {
                let low = self.parse_const_int()?;
                let high = if self.eat(&Token::DotDotDot) {
                    self.parse_const_int()?
                } else {
                    low
                };
                result.push_label(label, low, high);
                cursor = high.wrapping_add(1);
            } else {
                result.push_label(label, cursor, cursor);
                cursor = cursor.wrapping_add(1);
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::CloseBrace, "}")?;
        Ok(result)
    }

    // Primitive type blocks: an unordered bag of `keyword = value;`
    // assignments with defaults for whatever is omitted. A repeated keyword
    // overwrites, so the last occurrence wins.

    fn parse_integer_block(&mut self, keyword_range: Range) -> Result<Integer, Message> {
        self.expect(Token::OpenBrace, "{")?;
        let mut size = None;
        let mut signed = false;
        let mut byte_order = ByteOrder::Native;
        let mut base = 10;
        let mut encoding = Encoding::None;
        let mut align = None;
        let mut map = None;

        while !self.at(&Token::CloseBrace) {
            let key = self.expect_name("an assignment keyword")?;
            self.expect(Token::Equals, "=")?;
            match key.data.as_str() {
                "signed" => signed = self.parse_bool()?,
                "byte_order" => byte_order = self.parse_byte_order()?,
                "size" => size = Some(self.parse_const_u64()?),
                "align" => align = Some(self.parse_const_u64()?),
                "base" => base = self.parse_base()?,
                "encoding" => encoding = self.parse_encoding()?,
                "map" => map = Some(self.parse_unary_expr()?),
                _ => return Err(self.unknown_key(
                    key,
                    &["signed", "byte_order", "size", "align", "base", "encoding", "map"],
                )),
            }
            self.expect(Token::Semi, ";")?;
        }
        self.expect(Token::CloseBrace, "}")?;

        let size = size.ok_or(Message::MissingAttribute {
            file_id: self.file_id,
            range: keyword_range,
            type_name: "integer",
            attribute: "size",
        })?;
        Ok(Integer {
            size,
            signed,
            byte_order,
            base,
            encoding,
            align: align.unwrap_or_else(|| Integer::default_align(size)),
            map,
        })
    }

    fn parse_float_block(&mut self, keyword_range: Range) -> Result<FloatingPoint, Message> {
        self.expect(Token::OpenBrace, "{")?;
        let mut exp_dig = None;
        let mut mant_dig = None;
        let mut byte_order = ByteOrder::Native;
        let mut align = 1;

        while !self.at(&Token::CloseBrace) {
            let key = self.expect_name("an assignment keyword")?;
            self.expect(Token::Equals, "=")?;
            match key.data.as_str() {
                "exp_dig" => exp_dig = Some(self.parse_const_u64()?),
                "mant_dig" => mant_dig = Some(self.parse_const_u64()?),
                "byte_order" => byte_order = self.parse_byte_order()?,
                "align" => align = self.parse_const_u64()?,
                _ => {
                    return Err(
                        self.unknown_key(key, &["exp_dig", "mant_dig", "byte_order", "align"])
                    )
                }
            }
            self.expect(Token::Semi, ";")?;
        }
        self.expect(Token::CloseBrace, "}")?;

        let missing = |attribute| Message::MissingAttribute {
            file_id: self.file_id,
            range: keyword_range,
            type_name: "floating_point",
            attribute,
        };
        Ok(FloatingPoint {
            exp_dig: exp_dig.ok_or_else(|| missing("exp_dig"))?,
            mant_dig: mant_dig.ok_or_else(|| missing("mant_dig"))?,
            byte_order,
            align,
        })
    }

    fn parse_string_block(&mut self) -> Result<StringType, Message> {
        let mut encoding = Encoding::Utf8;
        if self.eat(&Token::OpenBrace) {
            while !self.at(&Token::CloseBrace) {
                let key = self.expect_name("an assignment keyword")?;
                self.expect(Token::Equals, "=")?;
                match key.data.as_str() {
                    "encoding" => encoding = self.parse_encoding()?,
                    _ => return Err(self.unknown_key(key, &["encoding"])),
                }
                self.expect(Token::Semi, ";")?;
            }
            self.expect(Token::CloseBrace, "}")?;
        }
        Ok(StringType { encoding })
    }

    fn unknown_key(&self, key: Ranged<String>, expected: &[&str]) -> Message {
        Message::UnexpectedToken {
            file_id: self.file_id,
            range: key.range,
            found: key.data,
            expected: format_expected(expected),
        }
    }

    // Assignment values

    fn parse_bool(&mut self) -> Result<bool, Message> {
        match self.peek() {
            Some(Token::Name("true") | Token::NumberLiteral("1")) => {
                self.pos += 1;
                Ok(true)
            }
            Some(Token::Name("false") | Token::NumberLiteral("0")) => {
                self.pos += 1;
                Ok(false)
            }
            _ => Err(self.error_expected(&["true", "false", "1", "0"])),
        }
    }

    fn parse_byte_order(&mut self) -> Result<ByteOrder, Message> {
        let word = self.expect_name("a byte order")?;
        match word.data.as_str() {
            "native" => Ok(ByteOrder::Native),
            // `network` order is big-endian.
            "be" | "network" => Ok(ByteOrder::Be),
            "le" => Ok(ByteOrder::Le),
            _ => Err(self.unknown_key(word, &["native", "network", "be", "le"])),
        }
    }

    fn parse_encoding(&mut self) -> Result<Encoding, Message> {
        let word = self.expect_name("an encoding")?;
        match word.data.as_str() {
            "none" => Ok(Encoding::None),
            "UTF8" => Ok(Encoding::Utf8),
            "ASCII" => Ok(Encoding::Ascii),
            _ => Err(self.unknown_key(word, &["none", "UTF8", "ASCII"])),
        }
    }

    fn parse_base(&mut self) -> Result<u8, Message> {
        if let Some(word) = self.eat_name() {
            return match word.data.as_str() {
                "decimal" | "dec" | "d" | "i" | "u" => Ok(10),
                "hexadecimal" | "hex" | "x" | "X" | "p" => Ok(16),
                "octal" | "oct" | "o" => Ok(8),
                "binary" | "bin" | "b" => Ok(2),
                _ => Err(self.unknown_key(word, &["decimal", "hexadecimal", "octal", "binary"])),
            };
        }
        let (range, base) = self.parse_ranged_const()?;
        match base {
            2 | 8 | 10 | 16 => Ok(base as u8),
            _ => Err(Message::UnsupportedBase {
                file_id: self.file_id,
                range,
                base,
            }),
        }
    }

    // Constants and expressions

    fn parse_ranged_const(&mut self) -> Result<(Range, i64), Message> {
        match self.tokens.get(self.pos) {
            Some((start, Token::NumberLiteral(slice), end)) => {
                let (range, slice) = (
                    Range {
                        start: *start,
                        end: *end,
                    },
                    *slice,
                );
                let value = literal::parse_integer(self.file_id, range, slice)?;
                self.pos += 1;
                Ok((range, value))
            }
            _ => Err(self.error_expected(&["an integer literal"])),
        }
    }

    fn parse_const_int(&mut self) -> Result<i64, Message> {
        let (_, value) = self.parse_ranged_const()?;
        Ok(value)
    }

    fn parse_const_u64(&mut self) -> Result<u64, Message> {
        // Unsigned in the grammar; the literal decoder cannot go negative
        // without a sign token.
        let (_, value) = self.parse_ranged_const()?;
        Ok(value as u64)
    }

    fn parse_signed_const(&mut self) -> Result<i64, Message> {
        let negative = self.eat(&Token::Minus);
        if !negative {
            self.eat(&Token::Plus);
        }
        let value = self.parse_const_int()?;
        Ok(if negative { -value } else { value })
    }

    fn expect_string_literal(&mut self) -> Result<String, Message> {
        match self.tokens.get(self.pos) {
            Some((_, Token::StringLiteral(slice), _)) => {
                let body = &slice[1..slice.len() - 1];
                let decoded = literal::decode_string(body);
                self.pos += 1;
                Ok(decoded)
            }
            _ => Err(self.error_expected(&["a string literal"])),
        }
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, Message> {
        match self.peek() {
            Some(Token::Name(_)) => {
                let root = self.expect_name("an identifier")?.data;
                let mut ops = Vec::new();
                loop {
                    if self.eat(&Token::FullStop) {
                        ops.push(PostfixOp::Dot(self.expect_name("a member name")?.data));
                    } else if self.eat(&Token::HyphenGreater) {
                        ops.push(PostfixOp::Arrow(self.expect_name("a member name")?.data));
                    } else if self.eat(&Token::OpenBracket) {
                        let index = self.parse_unary_expr()?;
                        self.expect(Token::CloseBracket, "]")?;
                        ops.push(PostfixOp::Subscript(Box::new(index)));
                    } else {
                        break;
                    }
                }
                Ok(Expr::Postfix(PostfixExpr { root, ops }))
            }
            Some(Token::StringLiteral(_)) => Ok(Expr::String(self.expect_string_literal()?)),
            Some(Token::NumberLiteral(_) | Token::Plus | Token::Minus) => {
                Ok(Expr::Number(self.parse_signed_const()?))
            }
            Some(Token::OpenParen) => {
                self.pos += 1;
                let expr = self.parse_unary_expr()?;
                self.expect(Token::CloseParen, ")")?;
                Ok(expr)
            }
            _ => Err(self.error_expected(&["an expression"])),
        }
    }
}
