use crate::error::{DecodeError, NodeFamily, Result};
use crate::ir::{
    Arguments, DartType, FileOffset, FunctionNode, MapEntry, VariableDeclaration, tag,
};
use crate::names::{ConstantRef, ConstructorRef, LibraryDependencyRef, MemberRef, Name, VariableRef};
use crate::reader::Reader;
use crate::strings::StringRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl TryFrom<u8> for LogicalOperator {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(LogicalOperator::And),
            1 => Ok(LogicalOperator::Or),
            other => Err(DecodeError::format(format!("invalid logical operator {other}"))),
        }
    }
}

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct AsFlags: u8 {
        const IS_TYPE_ERROR = 1 << 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    InvalidExpression {
        file_offset: FileOffset,
        message: StringRef,
    },
    VariableGet {
        file_offset: FileOffset,
        /// Byte offset of the declaration within its function.
        declaration_position: u32,
        variable: VariableRef,
        promoted_type: Option<DartType>,
    },
    /// `VariableGet` with the variable index folded into the tag.
    SpecializedVariableGet {
        variable: VariableRef,
        file_offset: FileOffset,
        declaration_position: u32,
    },
    VariableSet {
        file_offset: FileOffset,
        declaration_position: u32,
        variable: VariableRef,
        value: Box<Expression>,
    },
    SpecializedVariableSet {
        variable: VariableRef,
        file_offset: FileOffset,
        declaration_position: u32,
        value: Box<Expression>,
    },
    PropertyGet {
        file_offset: FileOffset,
        receiver: Box<Expression>,
        name: Name,
        interface_target: MemberRef,
    },
    PropertySet {
        file_offset: FileOffset,
        receiver: Box<Expression>,
        name: Name,
        value: Box<Expression>,
        interface_target: MemberRef,
    },
    DirectPropertyGet {
        file_offset: FileOffset,
        receiver: Box<Expression>,
        target: MemberRef,
    },
    DirectPropertySet {
        file_offset: FileOffset,
        receiver: Box<Expression>,
        target: MemberRef,
        value: Box<Expression>,
    },
    SuperPropertyGet {
        file_offset: FileOffset,
        name: Name,
        interface_target: MemberRef,
    },
    SuperPropertySet {
        file_offset: FileOffset,
        name: Name,
        value: Box<Expression>,
        interface_target: MemberRef,
    },
    StaticGet {
        file_offset: FileOffset,
        target: MemberRef,
    },
    StaticSet {
        file_offset: FileOffset,
        target: MemberRef,
        value: Box<Expression>,
    },
    MethodInvocation {
        file_offset: FileOffset,
        receiver: Box<Expression>,
        name: Name,
        arguments: Arguments,
        interface_target: MemberRef,
    },
    SuperMethodInvocation {
        file_offset: FileOffset,
        name: Name,
        arguments: Arguments,
        interface_target: MemberRef,
    },
    DirectMethodInvocation {
        file_offset: FileOffset,
        receiver: Box<Expression>,
        target: MemberRef,
        arguments: Arguments,
    },
    StaticInvocation {
        file_offset: FileOffset,
        is_const: bool,
        target: MemberRef,
        arguments: Arguments,
    },
    ConstructorInvocation {
        file_offset: FileOffset,
        is_const: bool,
        target: ConstructorRef,
        arguments: Arguments,
    },
    Not {
        operand: Box<Expression>,
    },
    LogicalExpression {
        left: Box<Expression>,
        operator: LogicalOperator,
        right: Box<Expression>,
    },
    ConditionalExpression {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Box<Expression>,
        static_type: Option<DartType>,
    },
    StringConcatenation {
        file_offset: FileOffset,
        expressions: Vec<Expression>,
    },
    IsExpression {
        file_offset: FileOffset,
        operand: Box<Expression>,
        ty: DartType,
    },
    AsExpression {
        file_offset: FileOffset,
        flags: AsFlags,
        operand: Box<Expression>,
        ty: DartType,
    },
    StringLiteral(StringRef),
    /// Values `-3..=4` folded into the tag.
    SpecializedIntLiteral(i8),
    PositiveIntLiteral(u32),
    /// Stores the absolute value.
    NegativeIntLiteral(u32),
    /// Decimal text of an integer too large for the other encodings.
    BigIntLiteral(StringRef),
    DoubleLiteral(f64),
    BoolLiteral(bool),
    NullLiteral,
    SymbolLiteral(StringRef),
    TypeLiteral(DartType),
    This,
    Rethrow {
        file_offset: FileOffset,
    },
    Throw {
        file_offset: FileOffset,
        value: Box<Expression>,
    },
    ListLiteral {
        file_offset: FileOffset,
        is_const: bool,
        type_argument: DartType,
        expressions: Vec<Expression>,
    },
    SetLiteral {
        file_offset: FileOffset,
        is_const: bool,
        type_argument: DartType,
        expressions: Vec<Expression>,
    },
    MapLiteral {
        file_offset: FileOffset,
        is_const: bool,
        key_type: DartType,
        value_type: DartType,
        entries: Vec<MapEntry>,
    },
    Await {
        operand: Box<Expression>,
    },
    FunctionExpression {
        file_offset: FileOffset,
        function: Box<FunctionNode>,
    },
    Let {
        variable: Box<VariableDeclaration>,
        body: Box<Expression>,
    },
    Instantiation {
        expression: Box<Expression>,
        type_arguments: Vec<DartType>,
    },
    CheckLibraryIsLoaded(LibraryDependencyRef),
    LoadLibrary(LibraryDependencyRef),
    ConstantExpression(ConstantRef),
}

fn boxed(r: &mut Reader<'_>) -> Result<Box<Expression>> {
    Expression::read(r).map(Box::new)
}

impl Expression {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let raw = r.read_u8()?;
        let expression = match tag::masked(raw) {
            // Value is `(raw - 144) - 3`; nothing else follows.
            tag::SPECIALIZED_INT_LITERAL => Expression::SpecializedIntLiteral(
                ((raw - tag::SPECIALIZED_INT_LITERAL) as i32 - tag::SPECIALIZED_INT_LITERAL_BIAS)
                    as i8,
            ),
            // Variable index is `raw - 128`.
            tag::SPECIALIZED_VARIABLE_GET => Expression::SpecializedVariableGet {
                variable: VariableRef((raw - tag::SPECIALIZED_VARIABLE_GET) as u32),
                file_offset: r.read_file_offset()?,
                declaration_position: r.read_uint()?,
            },
            // Variable index is `raw - 136`.
            tag::SPECIALIZED_VARIABLE_SET => Expression::SpecializedVariableSet {
                variable: VariableRef((raw - tag::SPECIALIZED_VARIABLE_SET) as u32),
                file_offset: r.read_file_offset()?,
                declaration_position: r.read_uint()?,
                value: boxed(r)?,
            },
            tag::CHECK_LIBRARY_IS_LOADED => {
                Expression::CheckLibraryIsLoaded(r.read_dependency_ref()?)
            }
            tag::LOAD_LIBRARY => Expression::LoadLibrary(r.read_dependency_ref()?),
            tag::DIRECT_PROPERTY_GET => Expression::DirectPropertyGet {
                file_offset: r.read_file_offset()?,
                receiver: boxed(r)?,
                target: r.read_member_ref()?,
            },
            tag::DIRECT_PROPERTY_SET => Expression::DirectPropertySet {
                file_offset: r.read_file_offset()?,
                receiver: boxed(r)?,
                target: r.read_member_ref()?,
                value: boxed(r)?,
            },
            tag::DIRECT_METHOD_INVOCATION => Expression::DirectMethodInvocation {
                file_offset: r.read_file_offset()?,
                receiver: boxed(r)?,
                target: r.read_member_ref()?,
                arguments: Arguments::read(r)?,
            },
            tag::STATIC_INVOCATION | tag::CONST_STATIC_INVOCATION => {
                Expression::StaticInvocation {
                    file_offset: r.read_file_offset()?,
                    is_const: raw == tag::CONST_STATIC_INVOCATION,
                    target: r.read_member_ref()?,
                    arguments: Arguments::read(r)?,
                }
            }
            tag::INVALID_EXPRESSION => Expression::InvalidExpression {
                file_offset: r.read_file_offset()?,
                message: r.read_string_ref()?,
            },
            tag::VARIABLE_GET => Expression::VariableGet {
                file_offset: r.read_file_offset()?,
                declaration_position: r.read_uint()?,
                variable: r.read_variable_ref()?,
                promoted_type: r.read_option(DartType::read)?,
            },
            tag::VARIABLE_SET => Expression::VariableSet {
                file_offset: r.read_file_offset()?,
                declaration_position: r.read_uint()?,
                variable: r.read_variable_ref()?,
                value: boxed(r)?,
            },
            tag::PROPERTY_GET => Expression::PropertyGet {
                file_offset: r.read_file_offset()?,
                receiver: boxed(r)?,
                name: r.read_name()?,
                interface_target: r.read_member_ref()?,
            },
            tag::PROPERTY_SET => Expression::PropertySet {
                file_offset: r.read_file_offset()?,
                receiver: boxed(r)?,
                name: r.read_name()?,
                value: boxed(r)?,
                interface_target: r.read_member_ref()?,
            },
            tag::SUPER_PROPERTY_GET => Expression::SuperPropertyGet {
                file_offset: r.read_file_offset()?,
                name: r.read_name()?,
                interface_target: r.read_member_ref()?,
            },
            tag::SUPER_PROPERTY_SET => Expression::SuperPropertySet {
                file_offset: r.read_file_offset()?,
                name: r.read_name()?,
                value: boxed(r)?,
                interface_target: r.read_member_ref()?,
            },
            tag::STATIC_GET => Expression::StaticGet {
                file_offset: r.read_file_offset()?,
                target: r.read_member_ref()?,
            },
            tag::STATIC_SET => Expression::StaticSet {
                file_offset: r.read_file_offset()?,
                target: r.read_member_ref()?,
                value: boxed(r)?,
            },
            tag::METHOD_INVOCATION => Expression::MethodInvocation {
                file_offset: r.read_file_offset()?,
                receiver: boxed(r)?,
                name: r.read_name()?,
                arguments: Arguments::read(r)?,
                interface_target: r.read_member_ref()?,
            },
            tag::SUPER_METHOD_INVOCATION => Expression::SuperMethodInvocation {
                file_offset: r.read_file_offset()?,
                name: r.read_name()?,
                arguments: Arguments::read(r)?,
                interface_target: r.read_member_ref()?,
            },
            tag::CONSTRUCTOR_INVOCATION | tag::CONST_CONSTRUCTOR_INVOCATION => {
                Expression::ConstructorInvocation {
                    file_offset: r.read_file_offset()?,
                    is_const: raw == tag::CONST_CONSTRUCTOR_INVOCATION,
                    target: r.read_constructor_ref()?,
                    arguments: Arguments::read(r)?,
                }
            }
            tag::NOT => Expression::Not {
                operand: boxed(r)?,
            },
            tag::LOGICAL_EXPRESSION => Expression::LogicalExpression {
                left: boxed(r)?,
                operator: LogicalOperator::try_from(r.read_u8()?)?,
                right: boxed(r)?,
            },
            tag::CONDITIONAL_EXPRESSION => Expression::ConditionalExpression {
                condition: boxed(r)?,
                then: boxed(r)?,
                otherwise: boxed(r)?,
                static_type: r.read_option(DartType::read)?,
            },
            tag::STRING_CONCATENATION => Expression::StringConcatenation {
                file_offset: r.read_file_offset()?,
                expressions: r.read_list(Expression::read)?,
            },
            tag::IS_EXPRESSION => Expression::IsExpression {
                file_offset: r.read_file_offset()?,
                operand: boxed(r)?,
                ty: DartType::read(r)?,
            },
            tag::AS_EXPRESSION => Expression::AsExpression {
                file_offset: r.read_file_offset()?,
                flags: AsFlags::from_bits_retain(r.read_u8()?),
                operand: boxed(r)?,
                ty: DartType::read(r)?,
            },
            tag::STRING_LITERAL => Expression::StringLiteral(r.read_string_ref()?),
            tag::DOUBLE_LITERAL => Expression::DoubleLiteral(r.read_f64()?),
            tag::TRUE_LITERAL => Expression::BoolLiteral(true),
            tag::FALSE_LITERAL => Expression::BoolLiteral(false),
            tag::NULL_LITERAL => Expression::NullLiteral,
            tag::SYMBOL_LITERAL => Expression::SymbolLiteral(r.read_string_ref()?),
            tag::TYPE_LITERAL => Expression::TypeLiteral(DartType::read(r)?),
            tag::THIS_EXPRESSION => Expression::This,
            tag::RETHROW => Expression::Rethrow {
                file_offset: r.read_file_offset()?,
            },
            tag::THROW => Expression::Throw {
                file_offset: r.read_file_offset()?,
                value: boxed(r)?,
            },
            tag::LIST_LITERAL | tag::CONST_LIST_LITERAL => Expression::ListLiteral {
                file_offset: r.read_file_offset()?,
                is_const: raw == tag::CONST_LIST_LITERAL,
                type_argument: DartType::read(r)?,
                expressions: r.read_list(Expression::read)?,
            },
            tag::SET_LITERAL | tag::CONST_SET_LITERAL => Expression::SetLiteral {
                file_offset: r.read_file_offset()?,
                is_const: raw == tag::CONST_SET_LITERAL,
                type_argument: DartType::read(r)?,
                expressions: r.read_list(Expression::read)?,
            },
            tag::MAP_LITERAL | tag::CONST_MAP_LITERAL => Expression::MapLiteral {
                file_offset: r.read_file_offset()?,
                is_const: raw == tag::CONST_MAP_LITERAL,
                key_type: DartType::read(r)?,
                value_type: DartType::read(r)?,
                entries: r.read_list(MapEntry::read)?,
            },
            tag::AWAIT_EXPRESSION => Expression::Await {
                operand: boxed(r)?,
            },
            tag::FUNCTION_EXPRESSION => Expression::FunctionExpression {
                file_offset: r.read_file_offset()?,
                function: Box::new(FunctionNode::read(r)?),
            },
            tag::LET => Expression::Let {
                variable: Box::new(VariableDeclaration::read(r)?),
                body: boxed(r)?,
            },
            tag::INSTANTIATION => Expression::Instantiation {
                expression: boxed(r)?,
                type_arguments: r.read_list(DartType::read)?,
            },
            tag::POSITIVE_INT_LITERAL => Expression::PositiveIntLiteral(r.read_uint()?),
            tag::NEGATIVE_INT_LITERAL => Expression::NegativeIntLiteral(r.read_uint()?),
            tag::BIG_INT_LITERAL => Expression::BigIntLiteral(r.read_string_ref()?),
            tag::CONSTANT_EXPRESSION => Expression::ConstantExpression(r.read_constant_ref()?),
            _ => {
                return Err(DecodeError::UnknownTag {
                    family: NodeFamily::Expression,
                    tag: raw,
                });
            }
        };
        Ok(expression)
    }

    /// The tag this expression is encoded with. Specialized forms report
    /// their raw, unmasked tag.
    pub fn tag(&self) -> u8 {
        match self {
            Expression::InvalidExpression { .. } => tag::INVALID_EXPRESSION,
            Expression::VariableGet { .. } => tag::VARIABLE_GET,
            Expression::SpecializedVariableGet { variable, .. } => {
                tag::SPECIALIZED_VARIABLE_GET + variable.0 as u8
            }
            Expression::VariableSet { .. } => tag::VARIABLE_SET,
            Expression::SpecializedVariableSet { variable, .. } => {
                tag::SPECIALIZED_VARIABLE_SET + variable.0 as u8
            }
            Expression::PropertyGet { .. } => tag::PROPERTY_GET,
            Expression::PropertySet { .. } => tag::PROPERTY_SET,
            Expression::DirectPropertyGet { .. } => tag::DIRECT_PROPERTY_GET,
            Expression::DirectPropertySet { .. } => tag::DIRECT_PROPERTY_SET,
            Expression::SuperPropertyGet { .. } => tag::SUPER_PROPERTY_GET,
            Expression::SuperPropertySet { .. } => tag::SUPER_PROPERTY_SET,
            Expression::StaticGet { .. } => tag::STATIC_GET,
            Expression::StaticSet { .. } => tag::STATIC_SET,
            Expression::MethodInvocation { .. } => tag::METHOD_INVOCATION,
            Expression::SuperMethodInvocation { .. } => tag::SUPER_METHOD_INVOCATION,
            Expression::DirectMethodInvocation { .. } => tag::DIRECT_METHOD_INVOCATION,
            Expression::StaticInvocation { is_const: false, .. } => tag::STATIC_INVOCATION,
            Expression::StaticInvocation { is_const: true, .. } => tag::CONST_STATIC_INVOCATION,
            Expression::ConstructorInvocation { is_const: false, .. } => {
                tag::CONSTRUCTOR_INVOCATION
            }
            Expression::ConstructorInvocation { is_const: true, .. } => {
                tag::CONST_CONSTRUCTOR_INVOCATION
            }
            Expression::Not { .. } => tag::NOT,
            Expression::LogicalExpression { .. } => tag::LOGICAL_EXPRESSION,
            Expression::ConditionalExpression { .. } => tag::CONDITIONAL_EXPRESSION,
            Expression::StringConcatenation { .. } => tag::STRING_CONCATENATION,
            Expression::IsExpression { .. } => tag::IS_EXPRESSION,
            Expression::AsExpression { .. } => tag::AS_EXPRESSION,
            Expression::StringLiteral(_) => tag::STRING_LITERAL,
            Expression::SpecializedIntLiteral(value) => {
                (*value as i32 + tag::SPECIALIZED_INT_LITERAL_BIAS) as u8
                    + tag::SPECIALIZED_INT_LITERAL
            }
            Expression::PositiveIntLiteral(_) => tag::POSITIVE_INT_LITERAL,
            Expression::NegativeIntLiteral(_) => tag::NEGATIVE_INT_LITERAL,
            Expression::BigIntLiteral(_) => tag::BIG_INT_LITERAL,
            Expression::DoubleLiteral(_) => tag::DOUBLE_LITERAL,
            Expression::BoolLiteral(true) => tag::TRUE_LITERAL,
            Expression::BoolLiteral(false) => tag::FALSE_LITERAL,
            Expression::NullLiteral => tag::NULL_LITERAL,
            Expression::SymbolLiteral(_) => tag::SYMBOL_LITERAL,
            Expression::TypeLiteral(_) => tag::TYPE_LITERAL,
            Expression::This => tag::THIS_EXPRESSION,
            Expression::Rethrow { .. } => tag::RETHROW,
            Expression::Throw { .. } => tag::THROW,
            Expression::ListLiteral { is_const: false, .. } => tag::LIST_LITERAL,
            Expression::ListLiteral { is_const: true, .. } => tag::CONST_LIST_LITERAL,
            Expression::SetLiteral { is_const: false, .. } => tag::SET_LITERAL,
            Expression::SetLiteral { is_const: true, .. } => tag::CONST_SET_LITERAL,
            Expression::MapLiteral { is_const: false, .. } => tag::MAP_LITERAL,
            Expression::MapLiteral { is_const: true, .. } => tag::CONST_MAP_LITERAL,
            Expression::Await { .. } => tag::AWAIT_EXPRESSION,
            Expression::FunctionExpression { .. } => tag::FUNCTION_EXPRESSION,
            Expression::Let { .. } => tag::LET,
            Expression::Instantiation { .. } => tag::INSTANTIATION,
            Expression::CheckLibraryIsLoaded(_) => tag::CHECK_LIBRARY_IS_LOADED,
            Expression::LoadLibrary(_) => tag::LOAD_LIBRARY,
            Expression::ConstantExpression(_) => tag::CONSTANT_EXPRESSION,
        }
    }

    /// Whether this is one of the integer literal encodings.
    pub fn is_int_literal(&self) -> bool {
        matches!(
            self,
            Expression::SpecializedIntLiteral(_)
                | Expression::PositiveIntLiteral(_)
                | Expression::NegativeIntLiteral(_)
                | Expression::BigIntLiteral(_)
        )
    }

    /// Value of a small integer literal. Big integers are left as text.
    pub fn int_value(&self) -> Option<i64> {
        match self {
            Expression::SpecializedIntLiteral(value) => Some(*value as i64),
            Expression::PositiveIntLiteral(value) => Some(*value as i64),
            Expression::NegativeIntLiteral(value) => Some(-(*value as i64)),
            _ => None,
        }
    }
}
