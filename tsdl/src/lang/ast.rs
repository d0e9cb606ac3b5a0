//! The TSDL abstract syntax tree.
//!
//! [`Document::parse`] builds the tree straight from source text. At that
//! point every by-name type use is still a reference ([`TypeSpec::StructRef`],
//! [`TypeSpec::VariantRef`], [`TypeSpec::AliasRef`], [`EnumIntType::Alias`]);
//! the resolution pass in [`crate::pass::resolve`] rewrites those slots in
//! place, after which the tree is read-only.

use std::rc::Rc;

use crate::lang::{FileId, Ranged};
use crate::reporting::Message;

mod grammar;
pub(crate) mod lexer;

/// Byte order of an integer or floating point type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ByteOrder {
    Native,
    Be,
    Le,
}

/// Character encoding of an integer or string type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Encoding {
    None,
    Utf8,
    Ascii,
}

/// A fixed-size integer type.
#[derive(Debug, Clone, PartialEq)]
pub struct Integer {
    pub size: u64,
    pub signed: bool,
    pub byte_order: ByteOrder,
    /// Display base: 2, 8, 10, or 16.
    pub base: u8,
    pub encoding: Encoding,
    pub align: u64,
    /// Optional mapping target, e.g. `map = clock.monotonic.value;`.
    pub map: Option<Expr>,
}

impl Integer {
    /// Default alignment: byte-aligned when the size is a whole number of
    /// bytes, bit-aligned otherwise.
    pub fn default_align(size: u64) -> u64 {
        if size % 8 == 0 {
            8
        } else {
            1
        }
    }
}

/// An IEEE 754-style floating point type described by its digit counts.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingPoint {
    pub exp_dig: u64,
    pub mant_dig: u64,
    pub byte_order: ByteOrder,
    pub align: u64,
}

/// A null-terminated string type.
#[derive(Debug, Clone, PartialEq)]
pub struct StringType {
    pub encoding: Encoding,
}

/// One enumerator and its inclusive value range.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumLabel {
    pub name: String,
    pub low: i64,
    pub high: i64,
}

/// The underlying integer type of an enum.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumIntType {
    /// A bare alias name; valid only until resolution.
    Alias(Ranged<String>),
    /// An inline `integer { ... }` block.
    Integer(Box<Integer>),
    /// Rewritten by the resolver.
    Resolved(Rc<Type>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enum {
    pub name: Option<String>,
    pub int_type: EnumIntType,
    /// Labels in insertion order.
    pub labels: Vec<EnumLabel>,
}

impl Enum {
    /// Add a label. A duplicate name overwrites the stored range but keeps
    /// its original position, mirroring dictionary insertion semantics.
    pub fn push_label(&mut self, name: String, low: i64, high: i64) {
        match self.labels.iter_mut().find(|label| label.name == name) {
            Some(label) => {
                label.low = low;
                label.high = high;
            }
            None => self.labels.push(EnumLabel { name, low, high }),
        }
    }
}

/// A full struct definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: Option<String>,
    pub entries: Vec<Entry>,
    /// Explicit byte alignment from an `align(N)` suffix.
    pub align: Option<u64>,
}

/// A full variant definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: Option<String>,
    pub tag: Option<Expr>,
    pub entries: Vec<Entry>,
}

/// A fully defined type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Integer(Integer),
    FloatingPoint(FloatingPoint),
    String(StringType),
    Enum(Enum),
    Struct(Struct),
    Variant(Variant),
}

/// A type as written in a declaration: an inline definition or a by-name
/// reference that the resolver rewrites in place.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    /// An inline definition, resolved recursively in place.
    Def(Type),
    /// `struct <name>`, referring to an earlier full definition.
    StructRef(Ranged<String>),
    /// `variant <name> <tag>`; resolves to an independent copy of the
    /// definition with this use site's tag attached.
    VariantRef { name: Ranged<String>, tag: Expr },
    /// A bare alias name, possibly several identifiers joined by spaces.
    AliasRef(Ranged<String>),
    /// A reference rewritten to share its resolved target.
    Resolved(Rc<Type>),
}

impl TypeSpec {
    /// The shareable form of a resolved spec, or `None` while the spec is
    /// still a reference.
    pub fn as_shared(&self) -> Option<Rc<Type>> {
        match self {
            TypeSpec::Def(ty) => Some(Rc::new(ty.clone())),
            TypeSpec::Resolved(ty) => Some(ty.clone()),
            TypeSpec::StructRef(_) | TypeSpec::VariantRef { .. } | TypeSpec::AliasRef(_) => None,
        }
    }
}

/// A unary/postfix expression. Used for variant tags, `map =` targets, and
/// array subscripts; semantically opaque to the resolver.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(i64),
    String(String),
    Postfix(PostfixExpr),
}

/// An identifier root extended by member, pointer, and subscript accesses.
#[derive(Debug, Clone, PartialEq)]
pub struct PostfixExpr {
    pub root: String,
    pub ops: Vec<PostfixOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PostfixOp {
    /// `.name`
    Dot(String),
    /// `->name`
    Arrow(String),
    /// `[expr]`
    Subscript(Box<Expr>),
}

/// A field's name together with its array subscripts.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub subscripts: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub spec: TypeSpec,
    pub decl: Declarator,
}

/// `typealias <type> := <name>;`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    pub name: String,
    pub spec: TypeSpec,
}

/// `<name> = <value>;` in a top-level scope.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAssignment {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Name(String),
    String(String),
    Number(i64),
}

/// `<expr> := <type>;` in a top-level scope, e.g.
/// `event.fields := struct { ... };`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAssignment {
    pub key: Expr,
    pub spec: TypeSpec,
}

/// The reserved-by-position keyword introducing a top-level scope.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Env,
    Trace,
    Clock,
    Stream,
    Event,
}

impl ScopeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ScopeKind::Env => "env",
            ScopeKind::Trace => "trace",
            ScopeKind::Clock => "clock",
            ScopeKind::Stream => "stream",
            ScopeKind::Event => "event",
        }
    }

    pub fn from_keyword(word: &str) -> Option<ScopeKind> {
        match word {
            "env" => Some(ScopeKind::Env),
            "trace" => Some(ScopeKind::Trace),
            "clock" => Some(ScopeKind::Clock),
            "stream" => Some(ScopeKind::Stream),
            "event" => Some(ScopeKind::Event),
            _ => None,
        }
    }
}

/// A top-level scope block.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub kind: ScopeKind,
    pub entries: Vec<Entry>,
}

/// One member of a scope. The grammar restricts which entries may appear
/// where: fields only inside struct/variant bodies, assignments only inside
/// top-level scopes, scope blocks only at the document root.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Field(Field),
    TypeAlias(TypeAlias),
    Struct(Struct),
    Variant(Variant),
    Value(ValueAssignment),
    TypeAssign(TypeAssignment),
    Scope(Scope),
}

/// The implicit `top` scope of one metadata document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub file_id: FileId,
    pub entries: Vec<Entry>,
}

impl Document {
    /// Parse `source` into an unresolved document. Use [`crate::parse`] to
    /// also resolve type references.
    pub fn parse(file_id: FileId, source: &str) -> Result<Document, Message> {
        grammar::parse_document(file_id, source)
    }
}
