//! Wire tags of every node kind.
//!
//! Some values are reused across families (e.g. `107` is both
//! `ConstantExpression` and `RedirectingFactoryConstructor`); the family is
//! always known from context.

// Nodes read through `check_tag`.
pub const CLASS: u8 = 2;
pub const FUNCTION_NODE: u8 = 3;
pub const FIELD: u8 = 4;
pub const CONSTRUCTOR: u8 = 5;
pub const PROCEDURE: u8 = 6;
pub const REDIRECTING_FACTORY_CONSTRUCTOR: u8 = 107;

// Initializers.
pub const INVALID_INITIALIZER: u8 = 7;
pub const FIELD_INITIALIZER: u8 = 8;
pub const SUPER_INITIALIZER: u8 = 9;
pub const REDIRECTING_INITIALIZER: u8 = 10;
pub const LOCAL_INITIALIZER: u8 = 11;
pub const ASSERT_INITIALIZER: u8 = 12;

// Expressions.
pub const CHECK_LIBRARY_IS_LOADED: u8 = 13;
pub const LOAD_LIBRARY: u8 = 14;
pub const DIRECT_PROPERTY_GET: u8 = 15;
pub const DIRECT_PROPERTY_SET: u8 = 16;
pub const DIRECT_METHOD_INVOCATION: u8 = 17;
pub const CONST_STATIC_INVOCATION: u8 = 18;
pub const INVALID_EXPRESSION: u8 = 19;
pub const VARIABLE_GET: u8 = 20;
pub const VARIABLE_SET: u8 = 21;
pub const PROPERTY_GET: u8 = 22;
pub const PROPERTY_SET: u8 = 23;
pub const SUPER_PROPERTY_GET: u8 = 24;
pub const SUPER_PROPERTY_SET: u8 = 25;
pub const STATIC_GET: u8 = 26;
pub const STATIC_SET: u8 = 27;
pub const METHOD_INVOCATION: u8 = 28;
pub const SUPER_METHOD_INVOCATION: u8 = 29;
pub const STATIC_INVOCATION: u8 = 30;
pub const CONSTRUCTOR_INVOCATION: u8 = 31;
pub const CONST_CONSTRUCTOR_INVOCATION: u8 = 32;
pub const NOT: u8 = 33;
pub const LOGICAL_EXPRESSION: u8 = 34;
pub const CONDITIONAL_EXPRESSION: u8 = 35;
pub const STRING_CONCATENATION: u8 = 36;
pub const IS_EXPRESSION: u8 = 37;
pub const AS_EXPRESSION: u8 = 38;
pub const STRING_LITERAL: u8 = 39;
pub const DOUBLE_LITERAL: u8 = 40;
pub const TRUE_LITERAL: u8 = 41;
pub const FALSE_LITERAL: u8 = 42;
pub const NULL_LITERAL: u8 = 43;
pub const SYMBOL_LITERAL: u8 = 44;
pub const TYPE_LITERAL: u8 = 45;
pub const THIS_EXPRESSION: u8 = 46;
pub const RETHROW: u8 = 47;
pub const THROW: u8 = 48;
pub const LIST_LITERAL: u8 = 49;
pub const MAP_LITERAL: u8 = 50;
pub const AWAIT_EXPRESSION: u8 = 51;
pub const FUNCTION_EXPRESSION: u8 = 52;
pub const LET: u8 = 53;
pub const INSTANTIATION: u8 = 54;
pub const POSITIVE_INT_LITERAL: u8 = 55;
pub const NEGATIVE_INT_LITERAL: u8 = 56;
pub const BIG_INT_LITERAL: u8 = 57;
pub const CONST_LIST_LITERAL: u8 = 58;
pub const CONST_MAP_LITERAL: u8 = 59;
pub const CONSTANT_EXPRESSION: u8 = 107;
pub const SET_LITERAL: u8 = 109;
pub const CONST_SET_LITERAL: u8 = 110;

// Statements.
pub const EXPRESSION_STATEMENT: u8 = 61;
pub const BLOCK: u8 = 62;
pub const EMPTY_STATEMENT: u8 = 63;
pub const ASSERT_STATEMENT: u8 = 64;
pub const LABELED_STATEMENT: u8 = 65;
pub const BREAK_STATEMENT: u8 = 66;
pub const WHILE_STATEMENT: u8 = 67;
pub const DO_STATEMENT: u8 = 68;
pub const FOR_STATEMENT: u8 = 69;
pub const FOR_IN_STATEMENT: u8 = 70;
pub const SWITCH_STATEMENT: u8 = 71;
pub const CONTINUE_SWITCH_STATEMENT: u8 = 72;
pub const IF_STATEMENT: u8 = 73;
pub const RETURN_STATEMENT: u8 = 74;
pub const TRY_CATCH: u8 = 75;
pub const TRY_FINALLY: u8 = 76;
pub const YIELD_STATEMENT: u8 = 77;
pub const VARIABLE_DECLARATION: u8 = 78;
pub const FUNCTION_DECLARATION: u8 = 79;
pub const ASYNC_FOR_IN_STATEMENT: u8 = 80;
pub const ASSERT_BLOCK: u8 = 81;

// Types.
pub const TYPEDEF_TYPE: u8 = 87;
pub const INVALID_TYPE: u8 = 90;
pub const DYNAMIC_TYPE: u8 = 91;
pub const VOID_TYPE: u8 = 92;
pub const INTERFACE_TYPE: u8 = 93;
pub const FUNCTION_TYPE: u8 = 94;
pub const TYPE_PARAMETER_TYPE: u8 = 95;
pub const SIMPLE_INTERFACE_TYPE: u8 = 96;
pub const SIMPLE_FUNCTION_TYPE: u8 = 97;

// Constants.
pub const NULL_CONSTANT: u8 = 0;
pub const BOOL_CONSTANT: u8 = 1;
pub const INT_CONSTANT: u8 = 2;
pub const DOUBLE_CONSTANT: u8 = 3;
pub const STRING_CONSTANT: u8 = 4;
pub const SYMBOL_CONSTANT: u8 = 5;
pub const MAP_CONSTANT: u8 = 6;
pub const LIST_CONSTANT: u8 = 7;
pub const INSTANCE_CONSTANT: u8 = 8;
pub const PARTIAL_INSTANTIATION_CONSTANT: u8 = 9;
pub const TEAR_OFF_CONSTANT: u8 = 10;
pub const TYPE_LITERAL_CONSTANT: u8 = 11;
pub const ENVIRONMENT_BOOL_CONSTANT: u8 = 12;
pub const ENVIRONMENT_INT_CONSTANT: u8 = 13;
pub const ENVIRONMENT_STRING_CONSTANT: u8 = 14;
pub const UNEVALUATED_CONSTANT: u8 = 15;

// Bit-packed expression tags: the high bit is set and the low three bits
// carry a payload.
pub const SPECIALIZED_TAG_HIGH_BIT: u8 = 0x80;
pub const SPECIALIZED_TAG_MASK: u8 = 0xF8;
pub const SPECIALIZED_VARIABLE_GET: u8 = 128;
pub const SPECIALIZED_VARIABLE_SET: u8 = 136;
pub const SPECIALIZED_INT_LITERAL: u8 = 144;
/// Specialized int literals encode `value + SPECIALIZED_INT_LITERAL_BIAS`.
pub const SPECIALIZED_INT_LITERAL_BIAS: i32 = 3;

/// Folds a specialized tag down to the base of its 8-wide range. Plain tags
/// are returned unchanged.
pub fn masked(raw: u8) -> u8 {
    if raw & SPECIALIZED_TAG_HIGH_BIT == 0 {
        raw
    } else {
        raw & SPECIALIZED_TAG_MASK
    }
}
