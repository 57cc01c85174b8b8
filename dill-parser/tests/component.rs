mod common;

use common::*;
use dill_parser::ir::{Constant, Expression, Statement, tag};
use dill_parser::{ComponentFile, DecodeError, DecodeOptions, Diagnostic, ErrorKind};

#[test]
fn minimal_component_loads() {
    let bytes = minimal_component().build();
    let component = ComponentFile::load(bytes).unwrap();

    assert_eq!(component.version().0, 16);
    assert!(component.problems().is_empty());
    assert_eq!(component.libraries.len(), 1);

    let library = &component.libraries[0];
    assert!(library.classes.is_empty());
    assert!(library.fields.is_empty());
    assert_eq!(library.procedures.len(), 1);

    let main = &library.procedures[0];
    let body = main.function.as_ref().and_then(|f| f.body.as_ref());
    assert!(matches!(body, Some(Statement::Block(statements)) if statements.is_empty()));

    let names = component.resolver();
    assert_eq!(names.name(&main.name).unwrap(), "main");
    assert_eq!(
        component.main_method().unwrap().as_deref(),
        Some("package:app/main.dart.main")
    );
    assert!(component.diagnostics().is_empty());
}

#[test]
fn bad_magic_is_rejected() {
    let mut builder = minimal_component();
    builder.magic = 0xDEAD_BEEF;
    let err = ComponentFile::load(builder.build()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(matches!(err, DecodeError::BadMagic { found: 0xDEAD_BEEF, .. }));
}

fn word_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[test]
fn shifted_trailer_fails_before_any_section_is_read() {
    let mut bytes = minimal_component().build();
    let len = bytes.len();

    // Break the string table so that reading it would fail differently.
    let index_start = len - 11 * 4;
    let string_table = word_at(&bytes, index_start + 16) as usize;
    bytes[string_table] = 0x7F;

    // Declaring the file one word shorter moves the computed index start
    // back by a word, so the redundant count lands on a library offset.
    bytes[len - 4..].copy_from_slice(&(len as u32 - 4).to_be_bytes());
    let err = ComponentFile::load(bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert!(matches!(err, DecodeError::Integrity { field: "library count", .. }));
}

#[test]
fn broken_string_table_is_a_format_error() {
    let mut bytes = minimal_component().build();
    let index_start = bytes.len() - 11 * 4;
    let string_table = word_at(&bytes, index_start + 16) as usize;
    // The table starts with its offset count, then the leading zero offset.
    bytes[string_table + 1] = 1;
    let err = ComponentFile::load(bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn problems_are_read_for_newer_versions() {
    let mut builder = minimal_component();
    builder.version = 17;
    builder.problems = vec![r#"{"message":"oops"}"#.to_owned()];
    let component = ComponentFile::load(builder.build()).unwrap();

    assert_eq!(component.problems(), [r#"{"message":"oops"}"#]);
    assert_eq!(component.libraries[0].procedures.len(), 1);
    let diagnostics: Vec<_> = component.diagnostics().iter().cloned().collect();
    assert_eq!(diagnostics, vec![Diagnostic::Problems(1)]);
}

#[test]
fn unknown_version_decodes_with_baseline_layout() {
    let mut builder = minimal_component();
    builder.version = 9;
    let component = ComponentFile::load(builder.build()).unwrap();

    assert_eq!(component.libraries.len(), 1);
    let diagnostics: Vec<_> = component.diagnostics().iter().cloned().collect();
    assert_eq!(diagnostics, vec![Diagnostic::UnknownFormatVersion(9)]);
}

#[test]
fn constant_pool_and_deprecated_kinds() {
    let mut builder = minimal_component();
    let flag = builder.string("dart.vm.product");
    builder.constants = vec![
        vec![tag::NULL_CONSTANT],
        vec![tag::BOOL_CONSTANT, 1],
        vec![tag::INT_CONSTANT, tag::SPECIALIZED_INT_LITERAL + 5],
        vec![tag::ENVIRONMENT_BOOL_CONSTANT, flag as u8, 1],
        vec![tag::ENVIRONMENT_INT_CONSTANT, flag as u8, 2],
    ];
    let component = ComponentFile::load(builder.build()).unwrap();

    assert_eq!(component.constants.len(), 5);
    assert_eq!(component.constants[1], Constant::Bool(true));
    match &component.constants[2] {
        Constant::Int(value) => assert_eq!(value.int_value(), Some(2)),
        other => panic!("expected an int constant, got {other:?}"),
    }
    assert!(matches!(
        component.constants[3],
        Constant::EnvironmentBool { default, .. } if component.constant(default) == Some(&Constant::Bool(true))
    ));

    // Two deprecated constants, reported once.
    let diagnostics: Vec<_> = component.diagnostics().iter().cloned().collect();
    assert_eq!(
        diagnostics,
        vec![Diagnostic::DeprecatedConstant(tag::ENVIRONMENT_BOOL_CONSTANT)]
    );
}

#[test]
fn int_constant_rejects_non_integer_payload() {
    let mut builder = minimal_component();
    builder.constants = vec![vec![tag::INT_CONSTANT, tag::NULL_LITERAL]];
    let err = ComponentFile::load(builder.build()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConstantPayload);
    assert!(matches!(
        err,
        DecodeError::InvalidConstantPayload { tag: tag::NULL_LITERAL }
    ));
}

#[test]
fn metadata_mappings_and_payloads() {
    let mut builder = minimal_component();
    let inferred = builder.string("vm.inferred-type.metadata");
    let calls = builder.string("vm.call-site-attributes.metadata");
    builder.metadata_payloads = vec![0x11, 0x22, 0x33, 0x44];
    builder.metadata_mappings = vec![
        (inferred, vec![(100, 0), (140, 2)]),
        (calls, vec![]),
    ];
    let component = ComponentFile::load(builder.build()).unwrap();

    let metadata = &component.metadata;
    let tags: Vec<_> = metadata.mappings().keys().map(String::as_str).collect();
    assert_eq!(
        tags,
        ["vm.inferred-type.metadata", "vm.call-site-attributes.metadata"]
    );

    let mut payload = metadata
        .payload("vm.inferred-type.metadata", 140)
        .unwrap()
        .unwrap();
    assert_eq!(payload.read_u8().unwrap(), 0x33);
    assert!(metadata.payload("vm.inferred-type.metadata", 120).unwrap().is_none());
    assert!(metadata.payload("vm.call-site-attributes.metadata", 100).unwrap().is_none());
}

#[test]
fn source_map_is_decoded() {
    let mut builder = minimal_component();
    builder.sources = vec![("file:///main.dart".to_owned(), vec![0, 12, 30])];
    let component = ComponentFile::load(builder.build()).unwrap();

    assert_eq!(component.source_map.len(), 1);
    let source = &component.source_map.sources[0];
    assert_eq!(source.uri, "file:///main.dart");
    assert_eq!(source.line_starts, vec![0, 12, 30]);
    assert_eq!(source.location(14), Some((2, 3)));
}

#[test]
fn classes_are_carved_from_library_index() {
    let mut builder = minimal_component();
    let class = builder.name(1, "Greeter");
    let class_name = builder.string("Greeter");
    let greet = builder.name(class, "greet");
    let greet_text = builder.string("greet");
    let new = builder.name(class, "");
    let empty = builder.string("");
    builder.libraries[0].classes.push(ClassBuilder {
        canonical_name: class,
        name: class_name,
        constructors: vec![constructor_with_assert(new, empty, true)],
        procedures: vec![procedure(greet, greet_text)],
        index_count: Some(1),
    });
    let component = ComponentFile::load(builder.build()).unwrap();

    let library = &component.libraries[0];
    assert_eq!(library.classes.len(), 1);
    assert_eq!(library.procedures.len(), 1);
    let class = &library.classes[0];
    assert_eq!(component.strings().text(class.name).unwrap(), "Greeter");
    assert_eq!(class.constructors.len(), 1);
    assert_eq!(class.procedures.len(), 1);
    assert_eq!(class.procedure_offsets.as_ref().map(Vec::len), Some(2));
}

#[test]
fn class_procedure_index_must_match_procedure_list() {
    let mut builder = minimal_component();
    let class = builder.name(1, "Broken");
    let class_name = builder.string("Broken");
    builder.libraries[0].classes.push(ClassBuilder {
        canonical_name: class,
        name: class_name,
        index_count: Some(2),
        ..ClassBuilder::default()
    });
    let err = ComponentFile::load(builder.build()).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::Integrity { field: "class procedure count", expected: 0, found: 2 }
    ));
}

#[test]
fn assert_initializer_synthetic_byte_is_configurable() {
    use dill_parser::SyntheticFlag;
    use dill_parser::ir::Initializer;

    let with_class = |synthetic_byte: bool| {
        let mut builder = minimal_component();
        let class = builder.name(1, "Checked");
        let class_name = builder.string("Checked");
        let new = builder.name(class, "");
        let empty = builder.string("");
        builder.libraries[0].classes.push(ClassBuilder {
            canonical_name: class,
            name: class_name,
            constructors: vec![constructor_with_assert(new, empty, synthetic_byte)],
            ..ClassBuilder::default()
        });
        builder.build()
    };
    let first_initializer = |component: &ComponentFile| {
        component.libraries[0].classes[0].constructors[0].initializers[0].clone()
    };

    let present = DecodeOptions::new().assert_synthetic(SyntheticFlag::Present);
    let component = ComponentFile::load_with_options(with_class(true), present).unwrap();
    match first_initializer(&component) {
        Initializer::Assert { is_synthetic, statement } => {
            assert!(is_synthetic);
            assert_eq!(statement.condition, Expression::BoolLiteral(true));
        }
        other => panic!("expected an assert initializer, got {other:?}"),
    }

    // The default follows the header version, which writes the byte.
    let component = ComponentFile::load(with_class(true)).unwrap();
    assert!(first_initializer(&component).is_synthetic());

    let absent = DecodeOptions::new().assert_synthetic(SyntheticFlag::Absent);
    let component = ComponentFile::load_with_options(with_class(false), absent).unwrap();
    assert!(!first_initializer(&component).is_synthetic());

    // Guessing wrong misaligns the stream: the assert tag is taken as the
    // flag and the condition as the statement.
    let err = ComponentFile::load_with_options(with_class(false), present).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTag);
}

#[test]
fn assert_initializer_layout_follows_header_version() {
    use dill_parser::SyntheticFlag;

    let encode = |version: u32, synthetic_byte: bool| {
        let mut builder = minimal_component();
        builder.version = version;
        let class = builder.name(1, "Checked");
        let class_name = builder.string("Checked");
        let new = builder.name(class, "");
        let empty = builder.string("");
        builder.libraries[0].classes.push(ClassBuilder {
            canonical_name: class,
            name: class_name,
            constructors: vec![constructor_with_assert(new, empty, synthetic_byte)],
            ..ClassBuilder::default()
        });
        builder.build()
    };
    let synthetic = |component: &ComponentFile| {
        component.libraries[0].classes[0].constructors[0].initializers[0].is_synthetic()
    };

    let auto = DecodeOptions::new().assert_synthetic(SyntheticFlag::Auto);

    // v16 writes the byte.
    let current = ComponentFile::load_with_options(encode(16, true), auto).unwrap();
    assert!(synthetic(&current));

    // An older header is read without it.
    let older = ComponentFile::load_with_options(encode(9, false), auto).unwrap();
    assert!(!synthetic(&older));
    let diagnostics: Vec<_> = older.diagnostics().iter().cloned().collect();
    assert_eq!(diagnostics, vec![Diagnostic::UnknownFormatVersion(9)]);

    // The same older bytes under v16 misalign the stream.
    let err = ComponentFile::load_with_options(encode(16, false), auto).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTag);

    // An explicit choice overrides the version.
    let present = DecodeOptions::new().assert_synthetic(SyntheticFlag::Present);
    assert!(ComponentFile::load_with_options(encode(9, true), present).is_ok());
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_decode_matches_sequential() {
    let mut builder = minimal_component();
    let second = builder.name(0, "package:app/other.dart");
    let helper = builder.name(second, "helper");
    let helper_text = builder.string("helper");
    builder.libraries.push(LibraryBuilder {
        canonical_name: second,
        name: 0,
        classes: Vec::new(),
        procedures: vec![procedure(helper, helper_text)],
    });
    let bytes = builder.build();

    let sequential = ComponentFile::load(bytes.clone()).unwrap();
    let parallel =
        ComponentFile::load_with_options(bytes, DecodeOptions::new().parallel(true)).unwrap();
    assert_eq!(sequential.libraries, parallel.libraries);
}
