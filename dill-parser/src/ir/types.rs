use crate::error::{DecodeError, NodeFamily, Result};
use crate::ir::{TypeParameter, tag};
use crate::names::{CanonicalNameRef, ClassRef, TypedefRef};
use crate::reader::Reader;
use crate::strings::StringRef;

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub class: ClassRef,
    pub type_arguments: Vec<DartType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedType {
    pub name: StringRef,
    pub ty: DartType,
}

impl NamedType {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(NamedType {
            name: r.read_string_ref()?,
            ty: DartType::read(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub type_parameters: Vec<TypeParameter>,
    pub required_parameter_count: u32,
    /// Positional plus named.
    pub total_parameter_count: u32,
    pub positional_parameters: Vec<DartType>,
    pub named_parameters: Vec<NamedType>,
    /// Typedef this type was written through, or null.
    pub typedef: CanonicalNameRef,
    pub return_type: Box<DartType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedefType {
    pub typedef: TypedefRef,
    pub type_arguments: Vec<DartType>,
}

impl TypedefType {
    /// Reads a tagged typedef type.
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.check_tag(tag::TYPEDEF_TYPE)?;
        Self::read_body(r)
    }

    fn read_body(r: &mut Reader<'_>) -> Result<Self> {
        Ok(TypedefType {
            typedef: r.read_typedef_ref()?,
            type_arguments: r.read_list(DartType::read)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DartType {
    Invalid,
    Dynamic,
    Void,
    Interface(InterfaceType),
    /// An interface type without type arguments.
    SimpleInterface(ClassRef),
    Function(FunctionType),
    /// A function type with only positional parameters and no type
    /// parameters.
    SimpleFunction {
        positional_parameters: Vec<DartType>,
        return_type: Box<DartType>,
    },
    TypeParameter {
        /// Index into the type parameters in scope.
        index: u32,
        bound: Option<Box<DartType>>,
    },
    Typedef(TypedefType),
}

impl DartType {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let tag = r.read_u8()?;
        let ty = match tag {
            tag::INVALID_TYPE => DartType::Invalid,
            tag::DYNAMIC_TYPE => DartType::Dynamic,
            tag::VOID_TYPE => DartType::Void,
            tag::INTERFACE_TYPE => DartType::Interface(InterfaceType {
                class: r.read_class_ref()?,
                type_arguments: r.read_list(DartType::read)?,
            }),
            tag::SIMPLE_INTERFACE_TYPE => DartType::SimpleInterface(r.read_class_ref()?),
            tag::FUNCTION_TYPE => DartType::Function(FunctionType {
                type_parameters: r.read_list(TypeParameter::read)?,
                required_parameter_count: r.read_uint()?,
                total_parameter_count: r.read_uint()?,
                positional_parameters: r.read_list(DartType::read)?,
                named_parameters: r.read_list(NamedType::read)?,
                typedef: r.read_canonical_name()?,
                return_type: Box::new(DartType::read(r)?),
            }),
            tag::SIMPLE_FUNCTION_TYPE => DartType::SimpleFunction {
                positional_parameters: r.read_list(DartType::read)?,
                return_type: Box::new(DartType::read(r)?),
            },
            tag::TYPE_PARAMETER_TYPE => DartType::TypeParameter {
                index: r.read_uint()?,
                bound: r.read_option(|r| DartType::read(r).map(Box::new))?,
            },
            tag::TYPEDEF_TYPE => DartType::Typedef(TypedefType::read_body(r)?),
            tag => {
                return Err(DecodeError::UnknownTag {
                    family: NodeFamily::DartType,
                    tag,
                });
            }
        };
        Ok(ty)
    }

    pub fn tag(&self) -> u8 {
        match self {
            DartType::Invalid => tag::INVALID_TYPE,
            DartType::Dynamic => tag::DYNAMIC_TYPE,
            DartType::Void => tag::VOID_TYPE,
            DartType::Interface(_) => tag::INTERFACE_TYPE,
            DartType::SimpleInterface(_) => tag::SIMPLE_INTERFACE_TYPE,
            DartType::Function(_) => tag::FUNCTION_TYPE,
            DartType::SimpleFunction { .. } => tag::SIMPLE_FUNCTION_TYPE,
            DartType::TypeParameter { .. } => tag::TYPE_PARAMETER_TYPE,
            DartType::Typedef(_) => tag::TYPEDEF_TYPE,
        }
    }

    /// Class of an interface type, with or without type arguments.
    pub fn class(&self) -> Option<ClassRef> {
        match self {
            DartType::Interface(interface) => Some(interface.class),
            DartType::SimpleInterface(class) => Some(*class),
            _ => None,
        }
    }
}
