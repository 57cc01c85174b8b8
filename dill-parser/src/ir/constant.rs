use crate::error::{DecodeError, NodeFamily, Result};
use crate::ir::{DartType, Expression, tag};
use crate::names::{ClassRef, ConstantRef, FieldRef, LibraryRef, ProcedureRef};
use crate::reader::Reader;
use crate::strings::StringRef;

/// An entry of the component constant pool. Nested constants are referenced
/// by index into the pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Null,
    Bool(bool),
    /// Always wraps one of the integer literal expressions.
    Int(Expression),
    Double(f64),
    String(StringRef),
    Symbol {
        /// Set for private symbols.
        library: LibraryRef,
        name: StringRef,
    },
    Map {
        key_type: DartType,
        value_type: DartType,
        entries: Vec<(ConstantRef, ConstantRef)>,
    },
    List {
        element_type: DartType,
        entries: Vec<ConstantRef>,
    },
    Instance {
        class: ClassRef,
        type_arguments: Vec<DartType>,
        fields: Vec<(FieldRef, ConstantRef)>,
    },
    PartialInstantiation {
        tear_off: ConstantRef,
        type_arguments: Vec<DartType>,
    },
    TearOff(ProcedureRef),
    TypeLiteral(DartType),
    /// Only found in old components; `fromEnvironment` lookups are now
    /// resolved before serialization.
    EnvironmentBool {
        name: StringRef,
        default: ConstantRef,
    },
    EnvironmentInt {
        name: StringRef,
        default: ConstantRef,
    },
    EnvironmentString {
        name: StringRef,
        default: ConstantRef,
    },
    Unevaluated(Expression),
}

impl Constant {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let raw = r.read_u8()?;
        let constant = match raw {
            tag::NULL_CONSTANT => Constant::Null,
            tag::BOOL_CONSTANT => Constant::Bool(r.read_u8()? != 0),
            tag::INT_CONSTANT => {
                let inner = r.peek_u8()?;
                let is_int = matches!(
                    tag::masked(inner),
                    tag::POSITIVE_INT_LITERAL
                        | tag::NEGATIVE_INT_LITERAL
                        | tag::BIG_INT_LITERAL
                        | tag::SPECIALIZED_INT_LITERAL
                );
                if !is_int {
                    return Err(DecodeError::InvalidConstantPayload { tag: inner });
                }
                Constant::Int(Expression::read(r)?)
            }
            tag::DOUBLE_CONSTANT => Constant::Double(r.read_f64()?),
            tag::STRING_CONSTANT => Constant::String(r.read_string_ref()?),
            tag::SYMBOL_CONSTANT => Constant::Symbol {
                library: r.read_library_ref()?,
                name: r.read_string_ref()?,
            },
            tag::MAP_CONSTANT => Constant::Map {
                key_type: DartType::read(r)?,
                value_type: DartType::read(r)?,
                entries: r.read_list(|r| Ok((r.read_constant_ref()?, r.read_constant_ref()?)))?,
            },
            tag::LIST_CONSTANT => Constant::List {
                element_type: DartType::read(r)?,
                entries: r.read_list(|r| r.read_constant_ref())?,
            },
            tag::INSTANCE_CONSTANT => Constant::Instance {
                class: r.read_class_ref()?,
                type_arguments: r.read_list(DartType::read)?,
                fields: r.read_list(|r| Ok((r.read_field_ref()?, r.read_constant_ref()?)))?,
            },
            tag::PARTIAL_INSTANTIATION_CONSTANT => Constant::PartialInstantiation {
                tear_off: r.read_constant_ref()?,
                type_arguments: r.read_list(DartType::read)?,
            },
            tag::TEAR_OFF_CONSTANT => Constant::TearOff(r.read_procedure_ref()?),
            tag::TYPE_LITERAL_CONSTANT => Constant::TypeLiteral(DartType::read(r)?),
            tag::ENVIRONMENT_BOOL_CONSTANT => Constant::EnvironmentBool {
                name: r.read_string_ref()?,
                default: r.read_constant_ref()?,
            },
            tag::ENVIRONMENT_INT_CONSTANT => Constant::EnvironmentInt {
                name: r.read_string_ref()?,
                default: r.read_constant_ref()?,
            },
            tag::ENVIRONMENT_STRING_CONSTANT => Constant::EnvironmentString {
                name: r.read_string_ref()?,
                default: r.read_constant_ref()?,
            },
            tag::UNEVALUATED_CONSTANT => Constant::Unevaluated(Expression::read(r)?),
            tag => {
                return Err(DecodeError::UnknownTag {
                    family: NodeFamily::Constant,
                    tag,
                });
            }
        };
        Ok(constant)
    }

    pub fn tag(&self) -> u8 {
        match self {
            Constant::Null => tag::NULL_CONSTANT,
            Constant::Bool(_) => tag::BOOL_CONSTANT,
            Constant::Int(_) => tag::INT_CONSTANT,
            Constant::Double(_) => tag::DOUBLE_CONSTANT,
            Constant::String(_) => tag::STRING_CONSTANT,
            Constant::Symbol { .. } => tag::SYMBOL_CONSTANT,
            Constant::Map { .. } => tag::MAP_CONSTANT,
            Constant::List { .. } => tag::LIST_CONSTANT,
            Constant::Instance { .. } => tag::INSTANCE_CONSTANT,
            Constant::PartialInstantiation { .. } => tag::PARTIAL_INSTANTIATION_CONSTANT,
            Constant::TearOff(_) => tag::TEAR_OFF_CONSTANT,
            Constant::TypeLiteral(_) => tag::TYPE_LITERAL_CONSTANT,
            Constant::EnvironmentBool { .. } => tag::ENVIRONMENT_BOOL_CONSTANT,
            Constant::EnvironmentInt { .. } => tag::ENVIRONMENT_INT_CONSTANT,
            Constant::EnvironmentString { .. } => tag::ENVIRONMENT_STRING_CONSTANT,
            Constant::Unevaluated(_) => tag::UNEVALUATED_CONSTANT,
        }
    }

    /// Whether this kind is kept only for reading old components.
    pub fn is_deprecated(&self) -> bool {
        matches!(
            self,
            Constant::EnvironmentBool { .. }
                | Constant::EnvironmentInt { .. }
                | Constant::EnvironmentString { .. }
        )
    }
}
