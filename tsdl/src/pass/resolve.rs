//! Name resolution.
//!
//! A single pass over the document in source order, tracking a stack of
//! scopes. Each struct body, variant body, and top-level scope block pushes
//! a child scope; names defined inside are popped with it. A scope holds
//! three disjoint namespaces, so `struct foo`, `variant foo`, and a
//! `typealias ... := foo;` can coexist without interfering.
//!
//! Definitions register only once their own insides resolve, and lookup
//! walks the stack innermost first, so an inner definition shadows an outer
//! one for entries that follow it.
//!
//! Struct and alias references share their target through an [`Rc`]. A
//! variant reference instead gets its own copy of the definition, because
//! each use site attaches its own tag expression.

use std::rc::Rc;

use fxhash::FxHashMap;

use crate::lang::ast::{
    Document, Entry, EnumIntType, Type, TypeSpec, Variant,
};
use crate::lang::{FileId, Ranged};
use crate::reporting::Message;

/// Resolve every type reference in `document`, rewriting the reference
/// slots in place. Fails on the first name that has no visible definition.
pub fn resolve_document(document: &mut Document) -> Result<(), Message> {
    let mut context = Context::new(document.file_id);
    context.resolve_entries(&mut document.entries)
}

/// One scope's definitions, in three disjoint namespaces.
#[derive(Default)]
struct Scope {
    structs: FxHashMap<String, Rc<Type>>,
    variants: FxHashMap<String, Rc<Type>>,
    aliases: FxHashMap<String, Rc<Type>>,
}

struct Context {
    file_id: FileId,
    stack: Vec<Scope>,
}

impl Context {
    fn new(file_id: FileId) -> Context {
        Context {
            file_id,
            stack: vec![Scope::default()],
        }
    }

    fn resolve_entries(&mut self, entries: &mut [Entry]) -> Result<(), Message> {
        for entry in entries.iter_mut() {
            match entry {
                Entry::Struct(def) => {
                    self.resolve_scoped_entries(&mut def.entries)?;
                    if let Some(name) = def.name.clone() {
                        let ty = Rc::new(Type::Struct(def.clone()));
                        self.define_struct(name, ty);
                    }
                }
                Entry::Variant(def) => {
                    self.resolve_scoped_entries(&mut def.entries)?;
                    if let Some(name) = def.name.clone() {
                        let ty = Rc::new(Type::Variant(def.clone()));
                        self.define_variant(name, ty);
                    }
                }
                Entry::TypeAlias(alias) => {
                    // Aliases resolve at definition time, so an alias of an
                    // alias always chains to a full type.
                    let ty = self.resolve_spec(&mut alias.spec)?;
                    self.define_alias(alias.name.clone(), ty);
                }
                Entry::Field(field) => {
                    let ty = self.resolve_spec(&mut field.spec)?;
                    // A named definition written inline in a field is also
                    // visible to the entries that follow it.
                    match &*ty {
                        Type::Struct(def) => {
                            if let Some(name) = def.name.clone() {
                                self.define_struct(name, ty.clone());
                            }
                        }
                        Type::Variant(def) => {
                            if let Some(name) = def.name.clone() {
                                self.define_variant(name, ty.clone());
                            }
                        }
                        _ => {}
                    }
                }
                Entry::TypeAssign(assignment) => {
                    self.resolve_spec(&mut assignment.spec)?;
                }
                Entry::Value(_) => {}
                Entry::Scope(scope) => {
                    self.resolve_scoped_entries(&mut scope.entries)?;
                }
            }
        }
        Ok(())
    }

    /// Resolve `entries` in a child scope, popping it even on failure.
    fn resolve_scoped_entries(&mut self, entries: &mut [Entry]) -> Result<(), Message> {
        self.stack.push(Scope::default());
        let result = self.resolve_entries(entries);
        self.stack.pop();
        result
    }

    /// Rewrite `spec` to its resolved form and return the shared target.
    fn resolve_spec(&mut self, spec: &mut TypeSpec) -> Result<Rc<Type>, Message> {
        let ty = match spec {
            TypeSpec::Def(ty) => {
                self.resolve_type(ty)?;
                Rc::new(ty.clone())
            }
            TypeSpec::StructRef(name) => self.lookup_struct(name)?,
            TypeSpec::VariantRef { name, tag } => {
                let mut def = self.lookup_variant(name)?;
                def.tag = Some(tag.clone());
                Rc::new(Type::Variant(def))
            }
            TypeSpec::AliasRef(name) => self.lookup_alias(name)?,
            TypeSpec::Resolved(ty) => ty.clone(),
        };
        *spec = TypeSpec::Resolved(ty.clone());
        Ok(ty)
    }

    fn resolve_type(&mut self, ty: &mut Type) -> Result<(), Message> {
        match ty {
            Type::Integer(_) | Type::FloatingPoint(_) | Type::String(_) => Ok(()),
            Type::Enum(def) => {
                if let EnumIntType::Alias(name) = &def.int_type {
                    let resolved = self.lookup_alias(name)?;
                    def.int_type = EnumIntType::Resolved(resolved);
                }
                Ok(())
            }
            Type::Struct(def) => self.resolve_scoped_entries(&mut def.entries),
            Type::Variant(def) => self.resolve_scoped_entries(&mut def.entries),
        }
    }

    // Definition and lookup. Redefining a name in the same scope overwrites
    // the earlier definition; entries already resolved against the earlier
    // one keep it.

    fn define_struct(&mut self, name: String, ty: Rc<Type>) {
        if let Some(scope) = self.stack.last_mut() {
            scope.structs.insert(name, ty);
        }
    }

    fn define_variant(&mut self, name: String, ty: Rc<Type>) {
        if let Some(scope) = self.stack.last_mut() {
            scope.variants.insert(name, ty);
        }
    }

    fn define_alias(&mut self, name: String, ty: Rc<Type>) {
        if let Some(scope) = self.stack.last_mut() {
            scope.aliases.insert(name, ty);
        }
    }

    fn lookup_struct(&self, name: &Ranged<String>) -> Result<Rc<Type>, Message> {
        for scope in self.stack.iter().rev() {
            if let Some(ty) = scope.structs.get(&name.data) {
                return Ok(ty.clone());
            }
        }
        Err(Message::UnresolvedStruct {
            file_id: self.file_id,
            range: name.range,
            name: name.data.clone(),
        })
    }

    fn lookup_variant(&self, name: &Ranged<String>) -> Result<Variant, Message> {
        for scope in self.stack.iter().rev() {
            if let Some(ty) = scope.variants.get(&name.data) {
                if let Type::Variant(def) = &**ty {
                    return Ok(def.clone());
                }
            }
        }
        Err(Message::UnresolvedVariant {
            file_id: self.file_id,
            range: name.range,
            name: name.data.clone(),
        })
    }

    fn lookup_alias(&self, name: &Ranged<String>) -> Result<Rc<Type>, Message> {
        for scope in self.stack.iter().rev() {
            if let Some(ty) = scope.aliases.get(&name.data) {
                return Ok(ty.clone());
            }
        }
        Err(Message::UnresolvedAlias {
            file_id: self.file_id,
            range: name.range,
            name: name.data.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::ast::{Integer, Scope as AstScope};
    use pretty_assertions::assert_eq;

    fn resolve(source: &str) -> Document {
        let mut document = Document::parse(1, source).unwrap();
        resolve_document(&mut document).unwrap();
        document
    }

    fn resolve_err(source: &str) -> Message {
        let mut document = Document::parse(1, source).unwrap();
        resolve_document(&mut document).unwrap_err()
    }

    fn scope(document: &Document, index: usize) -> &AstScope {
        match &document.entries[index] {
            Entry::Scope(scope) => scope,
            entry => panic!("expected a scope, found {:?}", entry),
        }
    }

    fn assigned_type(scope: &AstScope, index: usize) -> Rc<Type> {
        match &scope.entries[index] {
            Entry::TypeAssign(assignment) => match &assignment.spec {
                TypeSpec::Resolved(ty) => ty.clone(),
                spec => panic!("unresolved spec {:?}", spec),
            },
            entry => panic!("expected a type assignment, found {:?}", entry),
        }
    }

    fn struct_field_type(ty: &Type, index: usize) -> Rc<Type> {
        let def = match ty {
            Type::Struct(def) => def,
            ty => panic!("expected a struct, found {:?}", ty),
        };
        match &def.entries[index] {
            Entry::Field(field) => match &field.spec {
                TypeSpec::Resolved(ty) => ty.clone(),
                spec => panic!("unresolved spec {:?}", spec),
            },
            entry => panic!("expected a field, found {:?}", entry),
        }
    }

    fn u16_alias() -> &'static str {
        "typealias integer { size = 16; } := u16;\n"
    }

    #[test]
    fn alias_field_resolves_to_its_definition() {
        let document = resolve(&format!(
            "{}event {{ fields := struct {{ u16 id; }}; }};",
            u16_alias(),
        ));
        let fields = assigned_type(scope(&document, 1), 0);
        let ty = struct_field_type(&fields, 0);
        assert_eq!(
            *ty,
            Type::Integer(Integer {
                size: 16,
                signed: false,
                byte_order: crate::lang::ast::ByteOrder::Native,
                base: 10,
                encoding: crate::lang::ast::Encoding::None,
                align: 8,
                map: None,
            }),
        );
    }

    #[test]
    fn struct_references_share_one_definition() {
        let document = resolve(
            "struct header { integer { size = 8; } id; };\n\
             event { a := struct header; b := struct header; };",
        );
        let a = assigned_type(scope(&document, 1), 0);
        let b = assigned_type(scope(&document, 1), 1);
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn variant_references_attach_their_own_tag() {
        let document = resolve(
            "variant v { integer { size = 8; } a; };\n\
             stream { x := variant v <tag_a>; y := variant v <tag_b>; };",
        );
        let stream = scope(&document, 1);
        let tag_root = |ty: &Rc<Type>| match &**ty {
            Type::Variant(def) => match &def.tag {
                Some(crate::lang::ast::Expr::Postfix(expr)) => expr.root.clone(),
                tag => panic!("expected a postfix tag, found {:?}", tag),
            },
            ty => panic!("expected a variant, found {:?}", ty),
        };
        assert_eq!(tag_root(&assigned_type(stream, 0)), "tag_a");
        assert_eq!(tag_root(&assigned_type(stream, 1)), "tag_b");
    }

    #[test]
    fn inner_definition_shadows_outer() {
        let document = resolve(
            "typealias integer { size = 8; } := myint;\n\
             event {\n\
                 typealias integer { size = 32; } := myint;\n\
                 fields := struct { myint a; };\n\
             };",
        );
        let fields = assigned_type(scope(&document, 1), 1);
        let ty = struct_field_type(&fields, 0);
        assert!(matches!(&*ty, Type::Integer(integer) if integer.size == 32));
    }

    #[test]
    fn scope_definitions_pop_with_their_scope() {
        let err = resolve_err(
            "event { typealias integer { size = 8; } := myint; };\n\
             event { fields := struct { myint a; }; };",
        );
        assert!(matches!(err, Message::UnresolvedAlias { name, .. } if name == "myint"));
    }

    #[test]
    fn namespaces_are_disjoint() {
        // `struct foo` must not find a typealias named foo.
        let err = resolve_err(
            "typealias integer { size = 8; } := foo;\n\
             event { header := struct foo; };",
        );
        assert!(matches!(err, Message::UnresolvedStruct { name, .. } if name == "foo"));
    }

    #[test]
    fn enum_int_type_resolves_through_the_alias_namespace() {
        let document = resolve(&format!(
            "{}stream {{ id := enum : u16 {{ A, B }}; }};",
            u16_alias(),
        ));
        let ty = assigned_type(scope(&document, 1), 0);
        match &*ty {
            Type::Enum(def) => match &def.int_type {
                EnumIntType::Resolved(int_type) => {
                    assert!(matches!(&**int_type, Type::Integer(integer) if integer.size == 16));
                }
                int_type => panic!("unresolved int type {:?}", int_type),
            },
            ty => panic!("expected an enum, found {:?}", ty),
        }
    }

    #[test]
    fn inline_named_field_type_registers_in_its_scope() {
        let document = resolve(
            "event { fields := struct {\n\
                 struct hdr { integer { size = 8; } id; } first;\n\
                 struct hdr second;\n\
             }; };",
        );
        let fields = assigned_type(scope(&document, 0), 0);
        let first = struct_field_type(&fields, 0);
        let second = struct_field_type(&fields, 1);
        assert_eq!(*first, *second);
    }

    #[test]
    fn self_reference_is_unresolved() {
        // A definition is not visible inside its own body.
        let err = resolve_err(
            "struct node { struct node next; };",
        );
        assert!(matches!(err, Message::UnresolvedStruct { name, .. } if name == "node"));
    }

    #[test]
    fn unresolved_names_are_reported_with_the_symbol() {
        assert!(matches!(
            resolve_err("event { fields := struct { missing x; }; };"),
            Message::UnresolvedAlias { name, .. } if name == "missing",
        ));
        assert!(matches!(
            resolve_err("event { a := variant missing <t>; };"),
            Message::UnresolvedVariant { name, .. } if name == "missing",
        ));
    }

    #[test]
    fn redefinition_in_one_scope_overwrites() {
        let document = resolve(
            "typealias integer { size = 8; } := myint;\n\
             typealias integer { size = 64; } := myint;\n\
             event { fields := struct { myint a; }; };",
        );
        let fields = assigned_type(scope(&document, 2), 0);
        let ty = struct_field_type(&fields, 0);
        assert!(matches!(&*ty, Type::Integer(integer) if integer.size == 64));
    }
}
