//! Presentation output.
//!
//! Every document node implements [`std::fmt::Display`], rendering as a
//! nested tag per node on a single line. Attributes appear only when the
//! node carries them, so an anonymous struct renders as `<struct>` rather
//! than with empty attribute slots. Rendering an unresolved document shows
//! reference tags in place of their targets.

use std::fmt;

use crate::lang::ast::{
    ByteOrder, Declarator, Document, Encoding, Entry, Enum, EnumIntType, Expr, Field,
    FloatingPoint, Integer, PostfixExpr, PostfixOp, Scope, StringType, Struct, Type, TypeAlias,
    TypeAssignment, TypeSpec, Value, ValueAssignment, Variant,
};

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ByteOrder::Native => write!(f, "NATIVE"),
            ByteOrder::Be => write!(f, "BE"),
            ByteOrder::Le => write!(f, "LE"),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::None => write!(f, "NONE"),
            Encoding::Utf8 => write!(f, "UTF8"),
            Encoding::Ascii => write!(f, "ASCII"),
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<integer size=\"{}\" signed=\"{}\" byte-order=\"{}\" base=\"{}\" encoding=\"{}\" align=\"{}\"",
            self.size, self.signed, self.byte_order, self.base, self.encoding, self.align,
        )?;
        match &self.map {
            Some(map) => write!(f, "><map>{}</map></integer>", map),
            None => write!(f, " />"),
        }
    }
}

impl fmt::Display for FloatingPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<floating_point exp-dig=\"{}\" mant-dig=\"{}\" byte-order=\"{}\" align=\"{}\" />",
            self.exp_dig, self.mant_dig, self.byte_order, self.align,
        )
    }
}

impl fmt::Display for StringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<string encoding=\"{}\" />", self.encoding)
    }
}

impl fmt::Display for EnumIntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumIntType::Alias(name) => write!(f, "{}", name.data),
            EnumIntType::Integer(integer) => write!(f, "{}", integer),
            EnumIntType::Resolved(ty) => write!(f, "{}", ty),
        }
    }
}

impl fmt::Display for Enum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "<enum name=\"{}\">", name)?,
            None => write!(f, "<enum>")?,
        }
        write!(f, "<int-type>{}</int-type><labels>", self.int_type)?;
        for label in &self.labels {
            write!(
                f,
                "<label name=\"{}\" low=\"{}\" high=\"{}\" />",
                label.name, label.low, label.high,
            )?;
        }
        write!(f, "</labels></enum>")
    }
}

impl fmt::Display for Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<struct")?;
        if let Some(name) = &self.name {
            write!(f, " name=\"{}\"", name)?;
        }
        if let Some(align) = self.align {
            write!(f, " align=\"{}\"", align)?;
        }
        write!(f, "><entries>")?;
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        write!(f, "</entries></struct>")
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<variant")?;
        if let Some(name) = &self.name {
            write!(f, " name=\"{}\"", name)?;
        }
        write!(f, ">")?;
        if let Some(tag) = &self.tag {
            write!(f, "<tag>{}</tag>", tag)?;
        }
        write!(f, "<entries>")?;
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        write!(f, "</entries></variant>")
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer(ty) => write!(f, "{}", ty),
            Type::FloatingPoint(ty) => write!(f, "{}", ty),
            Type::String(ty) => write!(f, "{}", ty),
            Type::Enum(ty) => write!(f, "{}", ty),
            Type::Struct(ty) => write!(f, "{}", ty),
            Type::Variant(ty) => write!(f, "{}", ty),
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Def(ty) => write!(f, "{}", ty),
            TypeSpec::Resolved(ty) => write!(f, "{}", ty),
            TypeSpec::StructRef(name) => write!(f, "<struct name=\"{}\" />", name.data),
            TypeSpec::VariantRef { name, tag } => {
                write!(f, "<variant name=\"{}\"><tag>{}</tag></variant>", name.data, tag)
            }
            TypeSpec::AliasRef(name) => write!(f, "{}", name.data),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(value) => write!(f, "{}", value),
            Expr::String(value) => write!(f, "{}", value),
            Expr::Postfix(expr) => write!(f, "{}", expr),
        }
    }
}

impl fmt::Display for PostfixExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<postfix-expr><id>{}</id>", self.root)?;
        for op in &self.ops {
            match op {
                PostfixOp::Dot(name) => write!(f, "<dot /><id>{}</id>", name)?,
                PostfixOp::Arrow(name) => write!(f, "<arrow /><id>{}</id>", name)?,
                PostfixOp::Subscript(expr) => {
                    write!(f, "<subscript-expr>{}</subscript-expr>", expr)?
                }
            }
        }
        write!(f, "</postfix-expr>")
    }
}

impl fmt::Display for Declarator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<declarator name=\"{}\"><subscripts>", self.name)?;
        for subscript in &self.subscripts {
            write!(f, "<subscript-expr>{}</subscript-expr>", subscript)?;
        }
        write!(f, "</subscripts></declarator>")
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<field><type>{}</type>{}</field>", self.spec, self.decl)
    }
}

impl fmt::Display for TypeAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<typealias name=\"{}\">{}</typealias>", self.name, self.spec)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Name(name) => write!(f, "<id>{}</id>", name),
            Value::String(value) => write!(f, "{}", value),
            Value::Number(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for ValueAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<value-assignment key=\"{}\"><value>{}</value></value-assignment>",
            self.key, self.value,
        )
    }
}

impl fmt::Display for TypeAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<type-assignment><key>{}</key><type>{}</type></type-assignment>",
            self.key, self.spec,
        )
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = self.kind.keyword();
        write!(f, "<{}><entries>", keyword)?;
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        write!(f, "</entries></{}>", keyword)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Field(entry) => write!(f, "{}", entry),
            Entry::TypeAlias(entry) => write!(f, "{}", entry),
            Entry::Struct(entry) => write!(f, "{}", entry),
            Entry::Variant(entry) => write!(f, "{}", entry),
            Entry::Value(entry) => write!(f, "{}", entry),
            Entry::TypeAssign(entry) => write!(f, "{}", entry),
            Entry::Scope(entry) => write!(f, "{}", entry),
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<top><entries>")?;
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        write!(f, "</entries></top>")
    }
}
