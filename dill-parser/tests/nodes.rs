mod common;

use common::*;
use dill_parser::ir::{
    Constant, DartType, Expression, Initializer, LogicalOperator, Member, Statement, tag,
};
use dill_parser::names::VariableRef;
use dill_parser::{ByteWindow, DecodeError, DecodeOptions, ErrorKind, NodeFamily, Reader, Session};

fn reader<'s>(session: &'s Session, bytes: &[u8]) -> Reader<'s> {
    Reader::new(ByteWindow::new(bytes.to_vec()), session)
}

#[test]
fn specialized_int_literals_carry_their_value() {
    let session = session(&[], DecodeOptions::default());
    let mut r = reader(&session, &[144, 151, 147]);

    assert_eq!(Expression::read(&mut r).unwrap(), Expression::SpecializedIntLiteral(-3));
    assert_eq!(r.position(), 1);
    assert_eq!(Expression::read(&mut r).unwrap(), Expression::SpecializedIntLiteral(4));
    assert_eq!(r.position(), 2);

    let zero = Expression::read(&mut r).unwrap();
    assert_eq!(zero.int_value(), Some(0));
    assert_eq!(zero.tag(), 147);
    assert!(r.remaining() == 0);
}

#[test]
fn specialized_variable_access_uses_the_raw_tag() {
    let session = session(&[], DecodeOptions::default());
    // get v5 at offset 9 (biased 10), declared at 3; then set v2 to 7.
    let mut r = reader(&session, &[133, 10, 3, 138, 0, 4, tag::POSITIVE_INT_LITERAL, 7]);

    match Expression::read(&mut r).unwrap() {
        Expression::SpecializedVariableGet {
            variable,
            file_offset,
            declaration_position,
        } => {
            assert_eq!(variable, VariableRef(5));
            assert_eq!(file_offset.get(), Some(9));
            assert_eq!(declaration_position, 3);
        }
        other => panic!("expected a variable get, got {other:?}"),
    }

    let set = Expression::read(&mut r).unwrap();
    assert_eq!(set.tag(), 138);
    match set {
        Expression::SpecializedVariableSet {
            variable,
            file_offset,
            value,
            ..
        } => {
            assert_eq!(variable, VariableRef(2));
            assert!(file_offset.get().is_none());
            assert_eq!(*value, Expression::PositiveIntLiteral(7));
        }
        other => panic!("expected a variable set, got {other:?}"),
    }
}

#[test]
fn unknown_tags_are_fatal() {
    let session = session(&[], DecodeOptions::default());

    let err = Expression::read(&mut reader(&session, &[60])).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnknownTag { family: NodeFamily::Expression, tag: 60 }
    ));

    let err = Statement::read(&mut reader(&session, &[tag::TRUE_LITERAL])).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTag);

    let err = DartType::read(&mut reader(&session, &[88])).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnknownTag { family: NodeFamily::DartType, tag: 88 }
    ));

    let err = Constant::read(&mut reader(&session, &[16])).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnknownTag { family: NodeFamily::Constant, tag: 16 }
    ));

    let err = Initializer::read(&mut reader(&session, &[13])).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnknownTag { family: NodeFamily::Initializer, tag: 13 }
    ));

    let err = Member::read(&mut reader(&session, &[tag::CLASS])).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnknownTag { family: NodeFamily::Member, tag: tag::CLASS }
    ));
}

#[test]
fn self_describing_nodes_check_their_tag() {
    let session = session(&[], DecodeOptions::default());
    let mut bytes = Bytes::new();
    empty_function(&mut bytes);
    bytes.0[0] = tag::PROCEDURE;

    let err = dill_parser::ir::FunctionNode::read(&mut reader(&session, &bytes.0)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TagMismatch);
    assert!(matches!(
        err,
        DecodeError::TagMismatch { actual: tag::PROCEDURE, expected: tag::FUNCTION_NODE }
    ));
}

#[test]
fn int_constant_accepts_only_integer_literals() {
    let session = session(&["12345678901234567890"], DecodeOptions::default());
    let accepted: [&[u8]; 4] = [
        &[tag::INT_CONSTANT, tag::POSITIVE_INT_LITERAL, 0x81, 0x00],
        &[tag::INT_CONSTANT, tag::NEGATIVE_INT_LITERAL, 5],
        &[tag::INT_CONSTANT, tag::BIG_INT_LITERAL, 1],
        &[tag::INT_CONSTANT, 150],
    ];
    let values: Vec<_> = accepted
        .iter()
        .map(|bytes| match Constant::read(&mut reader(&session, bytes)).unwrap() {
            Constant::Int(expression) => expression.int_value(),
            other => panic!("expected an int constant, got {other:?}"),
        })
        .collect();
    assert_eq!(values, vec![Some(256), Some(-5), None, Some(3)]);

    for inner in [tag::DOUBLE_LITERAL, tag::VARIABLE_GET, 128] {
        let err = Constant::read(&mut reader(&session, &[tag::INT_CONSTANT, inner])).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidConstantPayload { tag } if tag == inner));
    }
}

#[test]
fn option_discriminators() {
    let session = session(&[], DecodeOptions::default());
    let mut r = reader(&session, &[0, 1, tag::DYNAMIC_TYPE, 2]);

    assert_eq!(r.read_option(DartType::read).unwrap(), None);
    assert_eq!(r.position(), 1);
    assert_eq!(r.read_option(DartType::read).unwrap(), Some(DartType::Dynamic));
    assert_eq!(r.position(), 3);
    let err = r.read_option(DartType::read).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidOptionTag { tag: 2 }));
}

#[test]
fn nested_expressions_and_statements() {
    let session = session(&["x"], DecodeOptions::default());
    // if (true && !false) return 1; else ;
    let bytes = [
        tag::IF_STATEMENT,
        0, // file offset
        tag::LOGICAL_EXPRESSION,
        tag::TRUE_LITERAL,
        0, // &&
        tag::NOT,
        tag::FALSE_LITERAL,
        tag::RETURN_STATEMENT,
        0, // file offset
        1,
        148,
        tag::EMPTY_STATEMENT,
    ];
    let statement = Statement::read(&mut reader(&session, &bytes)).unwrap();
    match statement {
        Statement::If {
            condition,
            then,
            otherwise,
            ..
        } => {
            assert!(matches!(
                condition,
                Expression::LogicalExpression { operator: LogicalOperator::And, .. }
            ));
            assert!(matches!(*then, Statement::Return { .. }));
            assert_eq!(*otherwise, Statement::Empty);
        }
        other => panic!("expected an if statement, got {other:?}"),
    }
}

#[test]
fn arguments_count_must_match() {
    let session = session(&[], DecodeOptions::default());
    // Declares two arguments but holds one positional.
    let bytes = [2, 0, 1, tag::NULL_LITERAL, 0];
    let err = dill_parser::ir::Arguments::read(&mut reader(&session, &bytes)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn private_names_carry_their_library() {
    let session = session(&["_hidden", "shown"], DecodeOptions::default());
    let mut r = reader(&session, &[1, 7, 2]);

    let private = r.read_name().unwrap();
    assert!(private.is_private());
    assert_eq!(private.library.map(|l| l.canonical_name().0), Some(7));

    let public = r.read_name().unwrap();
    assert!(!public.is_private());
    assert_eq!(r.remaining(), 0);
}

#[test]
fn window_reads_stay_inside_their_bounds() {
    let root = ByteWindow::new((0u8..32).collect::<Vec<_>>());
    let mut window = root.window(10, 5).unwrap();
    assert_eq!(window.read_bytes(5).unwrap(), &[10, 11, 12, 13, 14]);
    let err = window.read_u8().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bounds);
    assert!(window.set_position(6).is_err());
    assert!(root.window(30, 5).is_err());
}
