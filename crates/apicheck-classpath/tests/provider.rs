use std::io::Write;
use std::path::Path;

use apicheck_classfile::access::*;
use apicheck_classpath::{ClasspathEntry, ClasspathProvider};
use apicheck_core::{
    ApiChecker, Facet, IntrospectionProvider, LoadError, Modifiers, NestedKind, TypeParameter,
    TypeReference,
};
use apicheck_test_utils::{ClassFileBuilder, MemberBuilder};
use pretty_assertions::assert_eq;

const BOX_SIGNATURE: &str = "<T::Ljava/lang/Comparable<TT;>;>Ljava/lang/Object;";

/// `public class <name><T extends Comparable<T>>` with a public static nested `Node`.
fn write_box(root: &Path, name: &str, node_fields: &[MemberBuilder]) {
    let node = format!("{name}$Node");
    ClassFileBuilder::new(name)
        .signature(BOX_SIGNATURE)
        .default_constructor()
        .method(
            MemberBuilder::new(ACC_PUBLIC, "get", "()Ljava/lang/Comparable;")
                .signature("()TT;"),
        )
        .method(
            MemberBuilder::new(ACC_PUBLIC, "first", &format!("()L{node};"))
                .signature(&format!("()L{node};")),
        )
        .inner_class(&node, Some(name), Some("Node"), ACC_PUBLIC | ACC_STATIC)
        .write_to(root)
        .unwrap();

    let mut node_class = ClassFileBuilder::new(&node)
        .access(ACC_SUPER)
        .default_constructor()
        .inner_class(&node, Some(name), Some("Node"), ACC_PUBLIC | ACC_STATIC);
    for field in node_fields {
        node_class = node_class.field(field.clone());
    }
    node_class.write_to(root).unwrap();
}

fn next_field(owner: &str) -> MemberBuilder {
    MemberBuilder::new(ACC_PUBLIC, "next", &format!("L{owner}$Node;"))
}

#[test]
fn class_directory_round_trip_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_box(dir.path(), "Box", &[next_field("Box")]);
    write_box(dir.path(), "AGAPIBox", &[next_field("AGAPIBox")]);

    let provider = ClasspathProvider::from_paths([dir.path()]);
    let descriptor = provider.load_type("Box").unwrap();
    assert_eq!(
        descriptor.type_params,
        vec![TypeParameter::new(
            "T",
            vec![TypeReference::generic(
                "java.lang.Comparable",
                vec![TypeReference::type_var("T", vec![])]
            )]
        )]
    );
    assert_eq!(descriptor.nested_types.len(), 1);
    assert_eq!(descriptor.nested_types[0].kind, NestedKind::Named);

    let node = provider.load_type("Box$Node").unwrap();
    assert_eq!(node.modifiers, Modifiers::PUBLIC | Modifiers::STATIC);

    let checker = ApiChecker::new(provider);
    let report = checker.report("Box", "AGAPIBox", true).unwrap();
    assert!(report.passed(), "{report}");
}

#[test]
fn nested_field_mismatch_is_found_through_class_files() {
    let dir = tempfile::tempdir().unwrap();
    write_box(dir.path(), "Box", &[]);
    write_box(dir.path(), "AGAPIBox", &[next_field("AGAPIBox")]);

    let checker = ApiChecker::new(ClasspathProvider::from_paths([dir.path()]));
    let report = checker.report("Box", "AGAPIBox", true).unwrap();
    assert!(!report.passed());
    assert_eq!(report.nested.len(), 1);
    let nested_fields = report.nested[0].facet(Facet::Fields).unwrap();
    assert_eq!(
        nested_fields.blocks[0].items,
        vec!["public Box$Node next".to_string()]
    );
}

#[test]
fn classes_load_from_jars() {
    let staging = tempfile::tempdir().unwrap();
    let class = ClassFileBuilder::new("shapes/Circle")
        .default_constructor()
        .field(MemberBuilder::new(ACC_PUBLIC | ACC_FINAL, "radius", "D"));

    let jar_path = staging.path().join("shapes.jar");
    let mut zip = zip::ZipWriter::new(std::fs::File::create(&jar_path).unwrap());
    zip.start_file("META-INF/MANIFEST.MF", zip::write::FileOptions::default())
        .unwrap();
    zip.write_all(b"Manifest-Version: 1.0\n").unwrap();
    zip.start_file("shapes/Circle.class", zip::write::FileOptions::default())
        .unwrap();
    zip.write_all(&class.build()).unwrap();
    zip.finish().unwrap();

    let provider = ClasspathProvider::new(vec![ClasspathEntry::from_path(&jar_path)]);
    let circle = provider.load_type("shapes.Circle").unwrap();
    assert_eq!(circle.package.as_deref(), Some("shapes"));
    assert_eq!(circle.fields[0].ty, TypeReference::named("double"));
    assert_eq!(
        provider.load_type("shapes.Square"),
        Err(LoadError::NotFound("shapes.Square".to_string()))
    );
}

#[test]
fn earlier_entries_shadow_later_ones() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    ClassFileBuilder::new("Box")
        .access(ACC_PUBLIC | ACC_FINAL | ACC_SUPER)
        .write_to(first.path())
        .unwrap();
    ClassFileBuilder::new("Box").write_to(second.path()).unwrap();

    let provider = ClasspathProvider::from_paths([first.path(), second.path()]);
    assert_eq!(
        provider.load_type("Box").unwrap().modifiers,
        Modifiers::PUBLIC | Modifiers::FINAL
    );
}

#[test]
fn corrupt_and_misnamed_class_files_are_malformed() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("Broken.class"), b"not a class").unwrap();
    let bytes = ClassFileBuilder::new("Other").build();
    std::fs::write(dir.path().join("Renamed.class"), bytes).unwrap();

    let provider = ClasspathProvider::from_paths([dir.path()]);
    assert!(matches!(
        provider.load_type("Broken"),
        Err(LoadError::Malformed { name, .. }) if name == "Broken"
    ));
    assert!(matches!(
        provider.load_type("Renamed"),
        Err(LoadError::Malformed { name, .. }) if name == "Renamed"
    ));
}

#[test]
fn discovers_candidates_from_reference_classes() {
    let dir = tempfile::tempdir().unwrap();
    write_box(dir.path(), "AGAPIBox", &[]);
    ClassFileBuilder::new("pkg/AGAPIList")
        .write_to(dir.path())
        .unwrap();
    ClassFileBuilder::new("pkg/Helper").write_to(dir.path()).unwrap();
    ClassFileBuilder::new("AGAPI").write_to(dir.path()).unwrap();

    let provider = ClasspathProvider::from_paths([dir.path()]);
    let found: Vec<String> = provider
        .discover_candidates("AGAPI")
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(found, vec!["Box".to_string(), "pkg.List".to_string()]);
}
