use super::*;
use pretty_assertions::assert_eq;

fn string_sig(b: &RegistryBuilder) -> Type {
    let string = b.basic(Kind::String);
    b.func(&[], &[string], false).unwrap()
}

fn body(tag: &'static str) -> impl Fn(&[u8], &[&[u8]]) -> Vec<Vec<u8>> + Send + Sync + 'static {
    move |_, _| vec![tag.as_bytes().to_vec()]
}

#[test]
fn qualified_names() {
    assert_eq!(qualified("example.com/m", "T"), "m.T");
    assert_eq!(qualified("m", "T"), "m.T");
    assert_eq!(qualified("", "T"), "T");
}

#[test]
fn named_type_keeps_layout() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    let t = b.named(NamedType::new("example.com/m", "Count", int)).unwrap();

    assert_eq!(t.to_string(), "m.Count");
    assert_eq!(t.name(), "Count");
    assert_eq!(t.pkg_path(), "example.com/m");
    assert_eq!(t.kind(), Kind::Int);
    assert_eq!((t.size(), t.align()), (int.size(), int.align()));
    assert!(t.is_named());
    assert_ne!(t, int);
    assert_eq!(
        t.hash(),
        fnv1(fnv1(FNV_BASIS, b"example.com/m"), b".Count")
    );
}

#[test]
fn duplicate_named_type() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    b.named(NamedType::new("example.com/m", "T", int)).unwrap();
    assert_eq!(
        b.named(NamedType::new("example.com/m", "T", int)),
        Err(TypeError::DuplicateType {
            name: "m.T".to_owned(),
        })
    );
    // Same name in another package is fine.
    assert!(b.named(NamedType::new("example.com/n", "T", int)).is_ok());
}

#[test]
fn method_tables() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    let sig = string_sig(&b);
    let setter = b.func(&[int], &[], false).unwrap();
    let t = b
        .named(
            NamedType::new("example.com/m", "T", int)
                .method(MethodDecl::new("b", sig, body("b")))
                .method(MethodDecl::new("A", sig, body("A")))
                .ptr_method(MethodDecl::new("Set", setter, body("Set"))),
        )
        .unwrap();

    let names: Vec<&str> = t.methods().iter().map(MethodEntry::name).collect();
    assert_eq!(names, vec!["A", "b"]);
    assert_eq!(t.num_method(), 1);

    let p = t.ptr_to_this().unwrap();
    let names: Vec<&str> = p.methods().iter().map(MethodEntry::name).collect();
    assert_eq!(names, vec!["A", "Set", "b"]);
    assert_eq!(p.num_method(), 2);
    assert!(matches!(p.methods()[0].imp(), MethodImpl::Indirect { method: 0 }));
    assert!(matches!(p.methods()[1].imp(), MethodImpl::Native(_)));
    assert!(matches!(p.methods()[2].imp(), MethodImpl::Indirect { method: 1 }));
    assert!(p.flags().contains(TypeFlags::UNCOMMON));
    assert!(!p.is_named());
}

#[test]
fn invalid_methods() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    let sig = string_sig(&b);

    assert_eq!(
        b.named(NamedType::new("m", "A", int).method(MethodDecl::new("M", int, body("M")))),
        Err(TypeError::MethodNotFunc {
            name: "M".to_owned(),
            typ: "int".to_owned(),
        })
    );
    assert_eq!(
        b.named(
            NamedType::new("m", "B", int)
                .method(MethodDecl::new("M", sig, body("M")))
                .ptr_method(MethodDecl::new("M", sig, body("M"))),
        ),
        Err(TypeError::DuplicateMethod {
            name: "M".to_owned(),
            typ: "m.B".to_owned(),
        })
    );
    let iface = b.empty_interface();
    assert_eq!(
        b.named(NamedType::new("m", "C", iface).method(MethodDecl::new("M", sig, body("M")))),
        Err(TypeError::NotImplemented("methods on an interface type"))
    );
}

#[test]
fn interface_string_forms() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    let string = b.basic(Kind::String);
    let m = b.func(&[int], &[string], false).unwrap();
    let n = b.func(&[], &[], false).unwrap();

    let decls = [IMethodDecl::new("N", n), IMethodDecl::new("M", m)];
    let i = b.interface("example.com/m", None, &decls).unwrap();
    assert_eq!(i.to_string(), "interface { M(int) string; N() }");
    assert_eq!(i.num_method(), 2);
    assert!(!i.is_named());
    assert!(i.comparable());
    assert_eq!((i.size(), i.ptr_bytes()), (16, 16));
    assert_eq!(b.interface("example.com/m", None, &decls).unwrap(), i);

    assert_eq!(b.interface("example.com/m", None, &[]).unwrap(), b.empty_interface());

    let named = b
        .interface("example.com/m", Some("MN"), &decls)
        .unwrap();
    assert_eq!(named.to_string(), "m.MN");
    assert!(named.is_named());
    assert_ne!(named, i);
}

#[test]
fn unexported_interface_methods_sort_last() {
    let b = RegistryBuilder::new();
    let n = b.func(&[], &[], false).unwrap();
    let i = b
        .interface(
            "example.com/m",
            None,
            &[IMethodDecl::new("a", n), IMethodDecl::new("Z", n)],
        )
        .unwrap();
    let names: Vec<&str> = i.interface_methods().iter().map(IMethod::name).collect();
    assert_eq!(names, vec!["Z", "a"]);
    assert_eq!(i.member_pkg_path(), Some("example.com/m"));
}

#[test]
fn declared_pointer_is_companion() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    let p = b.pointer(int).unwrap();
    assert_eq!(b.pointer(int).unwrap(), p);
    let reg = b.build();

    assert_eq!(reg.pointer_to(reg.basic(Kind::Int)).unwrap(), p);
    assert_eq!(reg.stats().pointers, 0);
}

#[test]
fn declared_composites_are_reused() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    let string = b.basic(Kind::String);
    let s = b.slice(int).unwrap();
    let a = b.array(4, int).unwrap();
    let c = b.chan(ChanDir::Recv, int).unwrap();
    let m = b.map(string, int).unwrap();
    assert_eq!(b.slice(int).unwrap(), s);
    assert_eq!(a.array_slice(), s);
    let reg = b.build();

    assert_eq!(reg.slice_of(int).unwrap(), s);
    assert_eq!(reg.array_of(4, int).unwrap(), a);
    assert_eq!(reg.chan_of(ChanDir::Recv, int).unwrap(), c);
    assert_eq!(reg.map_of(string, int).unwrap(), m);
    assert_eq!(reg.stats().keyed, 4);
}

#[test]
fn named_struct_inherits_promoted_methods() {
    let b = RegistryBuilder::new();
    let sig = string_sig(&b);
    let stringer = b
        .interface("example.com/m", Some("Stringer"), &[IMethodDecl::new("String", sig)])
        .unwrap();
    let inner = b
        .structure(&[FieldSpec::new("Stringer", stringer).embed()])
        .unwrap();
    let wrapper = b
        .named(NamedType::new("example.com/m", "Wrapper", inner))
        .unwrap();

    assert_eq!(wrapper.num_method(), 1);
    assert!(matches!(wrapper.methods()[0].imp(), MethodImpl::Promoted(_)));
    assert!(wrapper.implements(&stringer));
    assert!(wrapper.ptr_to_this().unwrap().implements(&stringer));
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = RegistryConfig {
        ptr_size: 3,
        ..RegistryConfig::default()
    };
    assert!(matches!(
        RegistryBuilder::with_config(cfg),
        Err(ConfigError::PtrSize(3))
    ));
}

#[test]
fn build_collects_known_types() {
    let b = RegistryBuilder::new();
    let int = b.basic(Kind::Int);
    b.named(NamedType::new("m", "T", int)).unwrap();
    let reg = b.build();
    // 18 basics, `interface {}`, T and *T.
    assert_eq!(reg.stats().known, 21);
}
