//! Structures shared by several node families.

use std::fmt;

use crate::error::{DecodeError, Result};
use crate::ir::tag;
use crate::ir::{DartType, Expression, Statement};
use crate::reader::Reader;
use crate::strings::StringRef;

/// A source position. Stored on the wire as `offset + 1` so that `0` can
/// mean "no offset".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileOffset(pub Option<u32>);

impl FileOffset {
    pub const NONE: FileOffset = FileOffset(None);

    pub fn from_biased(raw: u32) -> Self {
        FileOffset(raw.checked_sub(1))
    }

    pub fn get(self) -> Option<u32> {
        self.0
    }
}

impl fmt::Display for FileOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(offset) => write!(f, "@{offset}"),
            None => f.write_str("@-"),
        }
    }
}

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct TypeParameterFlags: u8 {
        const IS_GENERIC_COVARIANT_IMPL = 1 << 0;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub flags: TypeParameterFlags,
    pub annotations: Vec<Expression>,
    pub name: StringRef,
    pub bound: DartType,
    pub default_type: Option<DartType>,
}

impl TypeParameter {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(TypeParameter {
            flags: TypeParameterFlags::from_bits_retain(r.read_u8()?),
            annotations: r.read_list(Expression::read)?,
            name: r.read_string_ref()?,
            bound: DartType::read(r)?,
            default_type: r.read_option(DartType::read)?,
        })
    }
}

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct VariableFlags: u8 {
        const IS_FINAL = 1 << 0;
        const IS_CONST = 1 << 1;
        const IS_FIELD_FORMAL = 1 << 2;
        const IS_COVARIANT = 1 << 3;
        const IS_IN_SCOPE = 1 << 4;
        const IS_GENERIC_COVARIANT_IMPL = 1 << 5;
    }
}

/// A local variable or parameter. Read without a tag; statements that wrap
/// one carry their own.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub file_offset: FileOffset,
    /// Offset of the `=` sign, if there is an initializer.
    pub file_equals_offset: FileOffset,
    pub annotations: Vec<Expression>,
    pub flags: VariableFlags,
    pub name: StringRef,
    pub ty: DartType,
    pub initializer: Option<Expression>,
}

impl VariableDeclaration {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(VariableDeclaration {
            file_offset: r.read_file_offset()?,
            file_equals_offset: r.read_file_offset()?,
            annotations: r.read_list(Expression::read)?,
            flags: VariableFlags::from_bits_retain(r.read_u8()?),
            name: r.read_string_ref()?,
            ty: DartType::read(r)?,
            initializer: r.read_option(Expression::read)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsyncMarker {
    Sync,
    SyncStar,
    Async,
    AsyncStar,
    SyncYielding,
}

impl TryFrom<u8> for AsyncMarker {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(AsyncMarker::Sync),
            1 => Ok(AsyncMarker::SyncStar),
            2 => Ok(AsyncMarker::Async),
            3 => Ok(AsyncMarker::AsyncStar),
            4 => Ok(AsyncMarker::SyncYielding),
            other => Err(DecodeError::format(format!("invalid async marker {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub async_marker: AsyncMarker,
    /// Marker as written in source, before async lowering.
    pub dart_async_marker: AsyncMarker,
    pub type_parameters: Vec<TypeParameter>,
    pub parameter_count: u32,
    pub required_parameter_count: u32,
    pub positional_parameters: Vec<VariableDeclaration>,
    pub named_parameters: Vec<VariableDeclaration>,
    pub return_type: DartType,
    pub body: Option<Statement>,
}

impl FunctionNode {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.check_tag(tag::FUNCTION_NODE)?;
        Ok(FunctionNode {
            file_offset: r.read_file_offset()?,
            file_end_offset: r.read_file_offset()?,
            async_marker: AsyncMarker::try_from(r.read_u8()?)?,
            dart_async_marker: AsyncMarker::try_from(r.read_u8()?)?,
            type_parameters: r.read_list(TypeParameter::read)?,
            parameter_count: r.read_uint()?,
            required_parameter_count: r.read_uint()?,
            positional_parameters: r.read_list(VariableDeclaration::read)?,
            named_parameters: r.read_list(VariableDeclaration::read)?,
            return_type: DartType::read(r)?,
            body: r.read_option(Statement::read)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedExpression {
    pub name: StringRef,
    pub value: Expression,
}

impl NamedExpression {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(NamedExpression {
            name: r.read_string_ref()?,
            value: Expression::read(r)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    pub types: Vec<DartType>,
    pub positional: Vec<Expression>,
    pub named: Vec<NamedExpression>,
}

impl Arguments {
    /// Reads `numArguments` followed by the three lists; the count must
    /// match the positional and named arguments read.
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let count = r.read_uint()?;
        let types = r.read_list(DartType::read)?;
        let positional = r.read_list(Expression::read)?;
        let named = r.read_list(NamedExpression::read)?;
        let actual = positional.len() + named.len();
        if count as usize != actual {
            return Err(DecodeError::format(format!(
                "arguments declare {count} values but hold {actual}"
            )));
        }
        Ok(Arguments {
            types,
            positional,
            named,
        })
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Expression,
    pub value: Expression,
}

impl MapEntry {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(MapEntry {
            key: Expression::read(r)?,
            value: Expression::read(r)?,
        })
    }
}
