//! Members: fields, constructors, procedures and redirecting factories.
//!
//! Each member starts with its own tag, which the member reader checks.

use crate::error::{DecodeError, NodeFamily, Result};
use crate::ir::{
    DartType, Expression, FileOffset, FunctionNode, Initializer, TypeParameter,
    VariableDeclaration, tag,
};
use crate::names::{CanonicalNameRef, MemberRef, Name, UriRef};
use crate::reader::Reader;

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct FieldFlags: u8 {
        const IS_FINAL = 1 << 0;
        const IS_CONST = 1 << 1;
        const IS_STATIC = 1 << 2;
        const HAS_IMPLICIT_GETTER = 1 << 3;
        const HAS_IMPLICIT_SETTER = 1 << 4;
        const IS_COVARIANT = 1 << 5;
        const IS_GENERIC_COVARIANT_IMPL = 1 << 6;
    }
}

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ConstructorFlags: u8 {
        const IS_CONST = 1 << 0;
        const IS_EXTERNAL = 1 << 1;
        const IS_SYNTHETIC = 1 << 2;
    }
}

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ProcedureFlags: u8 {
        const IS_STATIC = 1 << 0;
        const IS_ABSTRACT = 1 << 1;
        const IS_EXTERNAL = 1 << 2;
        const IS_CONST = 1 << 3;
        const IS_FORWARDING_STUB = 1 << 4;
        const IS_FORWARDING_SEMI_STUB = 1 << 5;
        const IS_REDIRECTING_FACTORY_CONSTRUCTOR = 1 << 6;
        const IS_NO_SUCH_METHOD_FORWARDER = 1 << 7;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureKind {
    Method,
    Getter,
    Setter,
    Operator,
    Factory,
}

impl TryFrom<u8> for ProcedureKind {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ProcedureKind::Method),
            1 => Ok(ProcedureKind::Getter),
            2 => Ok(ProcedureKind::Setter),
            3 => Ok(ProcedureKind::Operator),
            4 => Ok(ProcedureKind::Factory),
            other => Err(DecodeError::format(format!("invalid procedure kind {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub canonical_name: CanonicalNameRef,
    pub file_uri: UriRef,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub flags: FieldFlags,
    pub name: Name,
    pub annotations: Vec<Expression>,
    pub ty: DartType,
    pub initializer: Option<Expression>,
}

impl Field {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.check_tag(tag::FIELD)?;
        Ok(Field {
            canonical_name: r.read_canonical_name()?,
            file_uri: r.read_uri_ref()?,
            file_offset: r.read_file_offset()?,
            file_end_offset: r.read_file_offset()?,
            flags: FieldFlags::from_bits_retain(r.read_u8()?),
            name: r.read_name()?,
            annotations: r.read_list(Expression::read)?,
            ty: DartType::read(r)?,
            initializer: r.read_option(Expression::read)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub canonical_name: CanonicalNameRef,
    pub file_uri: UriRef,
    /// Start of the declaration, including annotations.
    pub start_file_offset: FileOffset,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub flags: ConstructorFlags,
    pub name: Name,
    pub annotations: Vec<Expression>,
    pub function: FunctionNode,
    pub initializers: Vec<Initializer>,
}

impl Constructor {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.check_tag(tag::CONSTRUCTOR)?;
        Ok(Constructor {
            canonical_name: r.read_canonical_name()?,
            file_uri: r.read_uri_ref()?,
            start_file_offset: r.read_file_offset()?,
            file_offset: r.read_file_offset()?,
            file_end_offset: r.read_file_offset()?,
            flags: ConstructorFlags::from_bits_retain(r.read_u8()?),
            name: r.read_name()?,
            annotations: r.read_list(Expression::read)?,
            function: FunctionNode::read(r)?,
            initializers: r.read_list(Initializer::read)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub canonical_name: CanonicalNameRef,
    pub file_uri: UriRef,
    pub start_file_offset: FileOffset,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub kind: ProcedureKind,
    pub flags: ProcedureFlags,
    pub name: Name,
    pub annotations: Vec<Expression>,
    pub forwarding_stub_super_target: Option<MemberRef>,
    pub forwarding_stub_interface_target: Option<MemberRef>,
    /// Absent for abstract and external procedures.
    pub function: Option<FunctionNode>,
}

impl Procedure {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.check_tag(tag::PROCEDURE)?;
        Ok(Procedure {
            canonical_name: r.read_canonical_name()?,
            file_uri: r.read_uri_ref()?,
            start_file_offset: r.read_file_offset()?,
            file_offset: r.read_file_offset()?,
            file_end_offset: r.read_file_offset()?,
            kind: ProcedureKind::try_from(r.read_u8()?)?,
            flags: ProcedureFlags::from_bits_retain(r.read_u8()?),
            name: r.read_name()?,
            annotations: r.read_list(Expression::read)?,
            forwarding_stub_super_target: r.read_option(|r| r.read_member_ref())?,
            forwarding_stub_interface_target: r.read_option(|r| r.read_member_ref())?,
            function: r.read_option(FunctionNode::read)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedirectingFactoryConstructor {
    pub canonical_name: CanonicalNameRef,
    pub file_uri: UriRef,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub flags: ConstructorFlags,
    pub name: Name,
    pub annotations: Vec<Expression>,
    pub target: MemberRef,
    pub type_arguments: Vec<DartType>,
    pub type_parameters: Vec<TypeParameter>,
    pub parameter_count: u32,
    pub required_parameter_count: u32,
    pub positional_parameters: Vec<VariableDeclaration>,
    pub named_parameters: Vec<VariableDeclaration>,
}

impl RedirectingFactoryConstructor {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.check_tag(tag::REDIRECTING_FACTORY_CONSTRUCTOR)?;
        Ok(RedirectingFactoryConstructor {
            canonical_name: r.read_canonical_name()?,
            file_uri: r.read_uri_ref()?,
            file_offset: r.read_file_offset()?,
            file_end_offset: r.read_file_offset()?,
            flags: ConstructorFlags::from_bits_retain(r.read_u8()?),
            name: r.read_name()?,
            annotations: r.read_list(Expression::read)?,
            target: r.read_member_ref()?,
            type_arguments: r.read_list(DartType::read)?,
            type_parameters: r.read_list(TypeParameter::read)?,
            parameter_count: r.read_uint()?,
            required_parameter_count: r.read_uint()?,
            positional_parameters: r.read_list(VariableDeclaration::read)?,
            named_parameters: r.read_list(VariableDeclaration::read)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Field(Field),
    Constructor(Constructor),
    Procedure(Procedure),
    RedirectingFactoryConstructor(RedirectingFactoryConstructor),
}

impl Member {
    /// Peeks the tag and hands off to the matching member reader.
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let member = match r.peek_u8()? {
            tag::FIELD => Member::Field(Field::read(r)?),
            tag::CONSTRUCTOR => Member::Constructor(Constructor::read(r)?),
            tag::PROCEDURE => Member::Procedure(Procedure::read(r)?),
            tag::REDIRECTING_FACTORY_CONSTRUCTOR => {
                Member::RedirectingFactoryConstructor(RedirectingFactoryConstructor::read(r)?)
            }
            tag => {
                return Err(DecodeError::UnknownTag {
                    family: NodeFamily::Member,
                    tag,
                });
            }
        };
        Ok(member)
    }

    pub fn canonical_name(&self) -> CanonicalNameRef {
        match self {
            Member::Field(field) => field.canonical_name,
            Member::Constructor(constructor) => constructor.canonical_name,
            Member::Procedure(procedure) => procedure.canonical_name,
            Member::RedirectingFactoryConstructor(factory) => factory.canonical_name,
        }
    }

    pub fn name(&self) -> &Name {
        match self {
            Member::Field(field) => &field.name,
            Member::Constructor(constructor) => &constructor.name,
            Member::Procedure(procedure) => &procedure.name,
            Member::RedirectingFactoryConstructor(factory) => &factory.name,
        }
    }
}
