use std::rc::Rc;

use pretty_assertions::assert_eq;

use tsdl::lang::ast::{
    ByteOrder, Document, Encoding, Entry, EnumIntType, Expr, Field, Scope, ScopeKind, Type,
    TypeSpec, Value,
};
use tsdl::reporting::Message;

const LTTNG_KERNEL_METADATA: &str = r#"/* CTF 1.8 */

typealias integer { size = 8; align = 8; signed = false; } := uint8_t;
typealias integer { size = 16; align = 8; signed = false; } := uint16_t;
typealias integer { size = 32; align = 8; signed = false; } := uint32_t;
typealias integer { size = 64; align = 8; signed = false; } := uint64_t;
typealias integer { size = 32; align = 8; signed = false; } := unsigned long;
typealias integer { size = 27; align = 1; signed = false; } := uint27_clock_monotonic_t;

trace {
    major = 1;
    minor = 8;
    uuid = "2a6422d0-6cee-11e0-8c08-cb07d7b3a564";
    byte_order = le;
    packet.header := struct {
        uint32_t magic;
        uint8_t uuid[16];
        uint32_t stream_id;
    };
};

env {
    hostname = "archeopteryx";
    domain = "kernel";
    tracer_name = "lttng-modules";
    tracer_major = 2;
    tracer_minor = 10;
};

clock {
    name = monotonic;
    description = "Monotonic Clock";
    freq = 1000000000;
    offset = 1446222697389173303;
};

stream {
    id = 0;
    event.header := struct {
        enum : uint32_t { compact = 0 ... 30, extended = 31 } id;
        variant <id> {
            struct {
                uint27_clock_monotonic_t timestamp;
            } compact;
            struct {
                uint32_t id;
                uint64_t timestamp;
            } extended;
        } v;
    } align(8);
    packet.context := struct {
        uint64_t timestamp_begin;
        uint64_t timestamp_end;
        uint64_t content_size;
        uint64_t packet_size;
        unsigned long events_discarded;
        uint32_t cpu_id;
    };
};

event {
    name = "sched_switch";
    id = 0;
    stream_id = 0;
    fields := struct {
        integer { size = 8; signed = true; encoding = UTF8; } prev_comm[16];
        uint32_t prev_tid;
        uint32_t prev_prio;
        string next_comm;
    };
};
"#;

fn first_scope(document: &Document, kind: ScopeKind) -> &Scope {
    document
        .entries
        .iter()
        .find_map(|entry| match entry {
            Entry::Scope(scope) if scope.kind == kind => Some(scope),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no {} scope", kind.keyword()))
}

/// The resolved type assigned to the key whose root identifier is `root`.
fn assigned_type(scope: &Scope, root: &str) -> Rc<Type> {
    scope
        .entries
        .iter()
        .find_map(|entry| match entry {
            Entry::TypeAssign(assignment) => match &assignment.key {
                Expr::Postfix(key) if key.root == root => assignment.spec.as_shared(),
                _ => None,
            },
            _ => None,
        })
        .unwrap_or_else(|| panic!("no resolved type assigned to `{}`", root))
}

fn assigned_value<'a>(scope: &'a Scope, key: &str) -> &'a Value {
    scope
        .entries
        .iter()
        .find_map(|entry| match entry {
            Entry::Value(assignment) if assignment.key == key => Some(&assignment.value),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no value assigned to `{}`", key))
}

fn fields(ty: &Type) -> Vec<&Field> {
    let entries = match ty {
        Type::Struct(def) => &def.entries,
        Type::Variant(def) => &def.entries,
        ty => panic!("expected a struct or variant, found {:?}", ty),
    };
    entries
        .iter()
        .filter_map(|entry| match entry {
            Entry::Field(field) => Some(field),
            _ => None,
        })
        .collect()
}

fn field_type(field: &Field) -> Rc<Type> {
    match &field.spec {
        TypeSpec::Resolved(ty) => ty.clone(),
        spec => panic!("unresolved field spec {:?}", spec),
    }
}

#[test]
fn event_fields_with_an_inline_integer() {
    let document = tsdl::parse(
        0,
        "event { fields := struct { integer { size = 8; signed = true; } byte; }; };",
    )
    .unwrap();
    let fields_type = assigned_type(first_scope(&document, ScopeKind::Event), "fields");
    let byte = field_type(fields(&fields_type)[0]);
    let integer = match &*byte {
        Type::Integer(integer) => integer,
        ty => panic!("expected an integer, found {:?}", ty),
    };
    assert_eq!(integer.size, 8);
    assert!(integer.signed);
    assert_eq!(integer.byte_order, ByteOrder::Native);
    assert_eq!(integer.base, 10);
    assert_eq!(integer.encoding, Encoding::None);
    assert_eq!(integer.align, 8);
}

#[test]
fn typealias_and_enum_in_a_stream() {
    let document = tsdl::parse(
        0,
        "typealias integer { size = 16; } := my_int;\n\
         stream { x := enum : my_int { A, B = 5, C }; };",
    )
    .unwrap();
    let ty = assigned_type(first_scope(&document, ScopeKind::Stream), "x");
    let def = match &*ty {
        Type::Enum(def) => def,
        ty => panic!("expected an enum, found {:?}", ty),
    };
    match &def.int_type {
        EnumIntType::Resolved(int_type) => {
            assert!(matches!(&**int_type, Type::Integer(integer) if integer.size == 16));
        }
        int_type => panic!("unresolved int type {:?}", int_type),
    }
    let labels = def
        .labels
        .iter()
        .map(|label| (label.name.as_str(), label.low, label.high))
        .collect::<Vec<_>>();
    assert_eq!(labels, vec![("A", 0, 0), ("B", 5, 5), ("C", 6, 6)]);
}

#[test]
fn lttng_kernel_metadata_resolves() {
    let document = tsdl::parse(0, LTTNG_KERNEL_METADATA).unwrap();

    let trace = first_scope(&document, ScopeKind::Trace);
    assert_eq!(*assigned_value(trace, "major"), Value::Number(1));
    assert_eq!(
        *assigned_value(trace, "uuid"),
        Value::String("2a6422d0-6cee-11e0-8c08-cb07d7b3a564".to_owned()),
    );
    let packet_header = assigned_type(trace, "packet");
    let header_fields = fields(&packet_header);
    assert_eq!(header_fields[0].decl.name, "magic");
    assert_eq!(header_fields[1].decl.subscripts, vec![Expr::Number(16)]);
    assert!(
        matches!(&*field_type(header_fields[1]), Type::Integer(integer) if integer.size == 8),
    );

    let clock = first_scope(&document, ScopeKind::Clock);
    assert_eq!(
        *assigned_value(clock, "name"),
        Value::Name("monotonic".to_owned()),
    );
    assert_eq!(
        *assigned_value(clock, "freq"),
        Value::Number(1_000_000_000),
    );
}

#[test]
fn lttng_event_header_variant() {
    let document = tsdl::parse(0, LTTNG_KERNEL_METADATA).unwrap();
    let stream = first_scope(&document, ScopeKind::Stream);

    let event_header = assigned_type(stream, "event");
    let header = match &*event_header {
        Type::Struct(def) => def,
        ty => panic!("expected a struct, found {:?}", ty),
    };
    assert_eq!(header.align, Some(8));

    let header_fields = fields(&event_header);
    let id = field_type(header_fields[0]);
    assert!(matches!(&*id, Type::Enum(_)));

    let v = field_type(header_fields[1]);
    let variant = match &*v {
        Type::Variant(def) => def,
        ty => panic!("expected a variant, found {:?}", ty),
    };
    assert!(
        matches!(&variant.tag, Some(Expr::Postfix(tag)) if tag.root == "id" && tag.ops.is_empty()),
    );
    let arms = fields(&v);
    assert_eq!(arms[0].decl.name, "compact");
    assert_eq!(arms[1].decl.name, "extended");
    // the compact arm's timestamp uses the 27-bit clock integer
    let compact = field_type(arms[0]);
    let timestamp = field_type(fields(&compact)[0]);
    assert!(matches!(&*timestamp, Type::Integer(integer) if integer.size == 27));
}

#[test]
fn multi_identifier_aliases_resolve_in_context() {
    let document = tsdl::parse(0, LTTNG_KERNEL_METADATA).unwrap();
    let stream = first_scope(&document, ScopeKind::Stream);
    let packet_context = assigned_type(stream, "packet");
    let discarded = fields(&packet_context)[4];
    assert_eq!(discarded.decl.name, "events_discarded");
    assert!(
        matches!(&*field_type(discarded), Type::Integer(integer) if integer.size == 32),
    );
}

#[test]
fn rendering_a_resolved_document_shows_definitions() {
    let document = tsdl::parse(
        0,
        "typealias integer { size = 32; } := u32;\n\
         event { fields := struct { u32 id; }; };",
    )
    .unwrap();
    let fields_type = assigned_type(first_scope(&document, ScopeKind::Event), "fields");
    assert_eq!(
        fields_type.to_string(),
        "<struct><entries><field><type>\
         <integer size=\"32\" signed=\"false\" byte-order=\"NATIVE\" \
         base=\"10\" encoding=\"NONE\" align=\"8\" /></type>\
         <declarator name=\"id\"><subscripts></subscripts></declarator>\
         </field></entries></struct>",
    );
}

#[test]
fn comments_are_skipped() {
    let document = tsdl::parse(
        0,
        "/* CTF 1.8 */\n\
         env {\n\
             // bits per long on the traced system\n\
             bits = 64;\n\
         };",
    )
    .unwrap();
    let env = first_scope(&document, ScopeKind::Env);
    assert_eq!(*assigned_value(env, "bits"), Value::Number(64));
}

#[test]
fn unclosed_comment_is_an_error() {
    assert!(matches!(
        tsdl::parse(0, "env { }; /* no end"),
        Err(Message::UnclosedBlockComment { .. }),
    ));
}

#[test]
fn unresolved_alias_names_the_symbol() {
    let err = tsdl::parse(0, "event { fields := struct { u17 x; }; };").unwrap_err();
    assert_eq!(err.to_string(), "cannot resolve type `u17`");
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.message, "cannot resolve type `u17`");
    assert_eq!(diagnostic.labels[0].file_id, 0);
}

#[test]
fn scope_definitions_are_not_visible_to_sibling_scopes() {
    let err = tsdl::parse(
        0,
        "stream { typealias integer { size = 8; } := u8; };\n\
         event { fields := struct { u8 x; }; };",
    )
    .unwrap_err();
    assert!(matches!(err, Message::UnresolvedAlias { name, .. } if name == "u8"));
}

#[test]
fn syntax_errors_name_the_offending_token() {
    let err = tsdl::parse(0, "event { fields := struct { integer size; }; };").unwrap_err();
    match err {
        Message::UnexpectedToken { found, expected, .. } => {
            assert_eq!(found, "size");
            assert!(expected.contains("`{`"), "expected note: {}", expected);
        }
        err => panic!("expected a syntax error, found {:?}", err),
    }
}

#[test]
fn missing_size_reports_the_integer_keyword() {
    let err = tsdl::parse(
        0,
        "event { fields := struct { integer { signed = true; } x; }; };",
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "`integer` block is missing a `size` assignment");
}
