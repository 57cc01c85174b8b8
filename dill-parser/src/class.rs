//! Class declarations.

use crate::error::{DecodeError, Result};
use crate::ir::{
    Constructor, DartType, Expression, Field, FileOffset, Procedure,
    RedirectingFactoryConstructor, TypeParameter, tag,
};
use crate::names::{CanonicalNameRef, UriRef};
use crate::reader::Reader;
use crate::strings::StringRef;

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ClassFlags: u8 {
        const LEVEL_BIT0 = 1 << 0;
        const LEVEL_BIT1 = 1 << 1;
        const IS_ABSTRACT = 1 << 2;
        const IS_ENUM = 1 << 3;
        const IS_ANONYMOUS_MIXIN = 1 << 4;
        const IS_ELIMINATED_MIXIN = 1 << 5;
        const IS_MIXIN_DECLARATION = 1 << 6;
    }
}

/// How much of a class was serialized. Classes of external libraries stop
/// at the type or hierarchy level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassLevel {
    Type,
    Hierarchy,
    Mixin,
    Body,
}

impl ClassFlags {
    pub fn level(self) -> ClassLevel {
        match self.bits() & 0x3 {
            0 => ClassLevel::Type,
            1 => ClassLevel::Hierarchy,
            2 => ClassLevel::Mixin,
            _ => ClassLevel::Body,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub canonical_name: CanonicalNameRef,
    pub file_uri: UriRef,
    /// Start of the declaration, including annotations.
    pub start_file_offset: FileOffset,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub flags: ClassFlags,
    pub name: StringRef,
    pub annotations: Vec<Expression>,
    pub type_parameters: Vec<TypeParameter>,
    pub super_class: Option<DartType>,
    /// For eliminated mixin applications the mixed-in type is moved to the
    /// end of `implemented_classes`.
    pub mixed_in_type: Option<DartType>,
    pub implemented_classes: Vec<DartType>,
    pub fields: Vec<Field>,
    pub constructors: Vec<Constructor>,
    pub procedures: Vec<Procedure>,
    pub redirecting_factory_constructors: Vec<RedirectingFactoryConstructor>,
    /// Absolute `procedures.len() + 1` offsets when the class carries its
    /// own procedure index.
    pub procedure_offsets: Option<Vec<u32>>,
}

impl Class {
    /// Reads a class from a reader positioned at its tag. The reader's
    /// window must end where the class ends for the trailing procedure index
    /// to be found.
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        r.check_tag(tag::CLASS)?;
        let mut class = Class {
            canonical_name: r.read_canonical_name()?,
            file_uri: r.read_uri_ref()?,
            start_file_offset: r.read_file_offset()?,
            file_offset: r.read_file_offset()?,
            file_end_offset: r.read_file_offset()?,
            flags: ClassFlags::from_bits_retain(r.read_u8()?),
            name: r.read_string_ref()?,
            annotations: r.read_list(Expression::read)?,
            type_parameters: r.read_list(TypeParameter::read)?,
            super_class: r.read_option(DartType::read)?,
            mixed_in_type: r.read_option(DartType::read)?,
            implemented_classes: r.read_list(DartType::read)?,
            fields: r.read_list(Field::read)?,
            constructors: r.read_list(Constructor::read)?,
            procedures: r.read_list(Procedure::read)?,
            redirecting_factory_constructors: r.read_list(RedirectingFactoryConstructor::read)?,
            procedure_offsets: None,
        };
        class.procedure_offsets = read_procedure_index(r, class.procedures.len())?;
        log::trace!(
            "class {}: {} fields, {} constructors, {} procedures",
            r.string(class.name)?.unwrap_or("<anonymous>"),
            class.fields.len(),
            class.constructors.len(),
            class.procedures.len()
        );
        Ok(class)
    }

    pub fn level(&self) -> ClassLevel {
        self.flags.level()
    }
}

/// Parses the optional class index that trails the forward data:
///
/// ```text
/// UInt32[procedureCount + 1] procedureOffsets;
/// UInt32 procedureCount;
/// ```
fn read_procedure_index(r: &mut Reader<'_>, expected: usize) -> Result<Option<Vec<u32>>> {
    let trailing = r.remaining();
    if trailing == 0 {
        return Ok(None);
    }
    let len = r.len();
    let count_at = len.checked_sub(4).filter(|_| trailing >= 4).ok_or_else(|| {
        DecodeError::format(format!("{trailing} stray byte(s) after class body"))
    })?;
    r.set_position(count_at)?;
    let count = r.read_u32()?;
    if count as usize != expected {
        return Err(DecodeError::Integrity {
            field: "class procedure count",
            expected: expected as u32,
            found: count,
        });
    }
    let index_len = (count as usize + 2) * 4;
    if index_len != trailing {
        return Err(DecodeError::format(format!(
            "class index of {index_len} bytes does not fill the {trailing} trailing bytes"
        )));
    }
    r.set_position(len - index_len)?;
    let mut offsets = Vec::with_capacity(count as usize + 1);
    for _ in 0..=count {
        offsets.push(r.read_u32()?);
    }
    Ok(Some(offsets))
}
