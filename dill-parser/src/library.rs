//! Libraries and the declarations that only appear at library level.
//!
//! A library's window ends with a fixed-width index that is read backward
//! before anything else:
//!
//! ```text
//! UInt32[classes.length + 1] classOffsets;
//! UInt32 classCount;
//! UInt32[procedures.length + 1] procedureOffsets;
//! UInt32 procedureCount;
//! ```
//!
//! Offsets in the index are absolute file offsets.

use crate::class::Class;
use crate::error::{DecodeError, Result};
use crate::ir::{DartType, Expression, Field, FileOffset, Procedure, TypeParameter, VariableDeclaration};
use crate::names::{CanonicalNameRef, LibraryRef, TypedefRef, UriRef};
use crate::reader::Reader;
use crate::strings::StringRef;
use crate::window::ByteWindow;

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct LibraryFlags: u8 {
        const IS_EXTERNAL = 1 << 0;
        const IS_SYNTHETIC = 1 << 1;
    }
}

bitflags::bitflags! {
    #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
    pub struct DependencyFlags: u8 {
        const IS_EXPORT = 1 << 0;
        const IS_DEFERRED = 1 << 1;
    }
}

/// The backward-stored class and procedure offsets of a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryIndex {
    pub class_offsets: Vec<u32>,
    pub procedure_offsets: Vec<u32>,
}

impl LibraryIndex {
    pub fn read(window: &ByteWindow) -> Result<Self> {
        let mut window = window.clone();
        let mut end = window.len();

        let procedure_count = read_word_before(&mut window, &mut end)?;
        let procedure_offsets = read_words_before(&mut window, &mut end, procedure_count as usize + 1)?;
        let class_count = read_word_before(&mut window, &mut end)?;
        let class_offsets = read_words_before(&mut window, &mut end, class_count as usize + 1)?;

        Ok(LibraryIndex {
            class_offsets,
            procedure_offsets,
        })
    }

    pub fn class_count(&self) -> usize {
        self.class_offsets.len() - 1
    }

    pub fn procedure_count(&self) -> usize {
        self.procedure_offsets.len() - 1
    }

    /// Absolute `[start, end)` of class `index`.
    pub fn class_range(&self, index: usize) -> Option<(u32, u32)> {
        pair(&self.class_offsets, index)
    }

    /// Absolute `[start, end)` of procedure `index`.
    pub fn procedure_range(&self, index: usize) -> Option<(u32, u32)> {
        pair(&self.procedure_offsets, index)
    }

    /// Where the library-level field list begins: right after the last class.
    pub fn fields_start(&self) -> u32 {
        self.class_offsets.last().copied().unwrap_or_default()
    }
}

fn pair(offsets: &[u32], index: usize) -> Option<(u32, u32)> {
    Some((*offsets.get(index)?, *offsets.get(index + 1)?))
}

fn truncated_index(window: &ByteWindow) -> DecodeError {
    DecodeError::format(format!(
        "library at {:#x} is too short for its index",
        window.base()
    ))
}

/// Moves `end` back one word and reads it.
fn read_word_before(window: &mut ByteWindow, end: &mut usize) -> Result<u32> {
    *end = end.checked_sub(4).ok_or_else(|| truncated_index(window))?;
    window.set_position(*end)?;
    window.read_u32()
}

/// Moves `end` back `count` words and reads them in file order.
fn read_words_before(window: &mut ByteWindow, end: &mut usize, count: usize) -> Result<Vec<u32>> {
    *end = count
        .checked_mul(4)
        .and_then(|len| end.checked_sub(len))
        .ok_or_else(|| truncated_index(window))?;
    window.set_position(*end)?;
    window.read_u32s(count)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combinator {
    /// `show` when set, `hide` otherwise.
    pub is_show: bool,
    pub names: Vec<StringRef>,
}

impl Combinator {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Combinator {
            is_show: r.read_u8()? & 1 != 0,
            names: r.read_list(|r| r.read_string_ref())?,
        })
    }
}

/// An `import` or `export` directive.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryDependency {
    pub file_offset: FileOffset,
    pub flags: DependencyFlags,
    pub annotations: Vec<Expression>,
    pub target_library: LibraryRef,
    /// Prefix name, or null.
    pub name: StringRef,
    pub combinators: Vec<Combinator>,
}

impl LibraryDependency {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(LibraryDependency {
            file_offset: r.read_file_offset()?,
            flags: DependencyFlags::from_bits_retain(r.read_u8()?),
            annotations: r.read_list(Expression::read)?,
            target_library: r.read_library_ref()?,
            name: r.read_string_ref()?,
            combinators: r.read_list(Combinator::read)?,
        })
    }

    pub fn is_export(&self) -> bool {
        self.flags.contains(DependencyFlags::IS_EXPORT)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryPart {
    pub annotations: Vec<Expression>,
    pub part_uri: StringRef,
}

impl LibraryPart {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(LibraryPart {
            annotations: r.read_list(Expression::read)?,
            part_uri: r.read_string_ref()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Typedef {
    pub canonical_name: TypedefRef,
    pub file_uri: UriRef,
    pub file_offset: FileOffset,
    pub name: StringRef,
    pub annotations: Vec<Expression>,
    pub type_parameters: Vec<TypeParameter>,
    pub ty: DartType,
    pub type_parameters_of_function_type: Vec<TypeParameter>,
    pub positional_parameters: Vec<VariableDeclaration>,
    pub named_parameters: Vec<VariableDeclaration>,
}

impl Typedef {
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Typedef {
            canonical_name: r.read_typedef_ref()?,
            file_uri: r.read_uri_ref()?,
            file_offset: r.read_file_offset()?,
            name: r.read_string_ref()?,
            annotations: r.read_list(Expression::read)?,
            type_parameters: r.read_list(TypeParameter::read)?,
            ty: DartType::read(r)?,
            type_parameters_of_function_type: r.read_list(TypeParameter::read)?,
            positional_parameters: r.read_list(VariableDeclaration::read)?,
            named_parameters: r.read_list(VariableDeclaration::read)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Library {
    pub flags: LibraryFlags,
    pub canonical_name: LibraryRef,
    pub name: StringRef,
    /// Absolute URI of the source file the library was created from.
    pub file_uri: UriRef,
    pub annotations: Vec<Expression>,
    pub dependencies: Vec<LibraryDependency>,
    pub additional_exports: Vec<CanonicalNameRef>,
    pub parts: Vec<LibraryPart>,
    pub typedefs: Vec<Typedef>,
    pub classes: Vec<Class>,
    pub fields: Vec<Field>,
    pub procedures: Vec<Procedure>,
    pub index: LibraryIndex,
}

impl Library {
    /// Decodes a library from a reader over exactly its own window.
    pub fn read(r: &mut Reader<'_>) -> Result<Self> {
        let index = LibraryIndex::read(r.window())?;
        let base = r.window().base();
        log::trace!(
            "library at {base:#x}: {} classes, {} procedures",
            index.class_count(),
            index.procedure_count()
        );

        r.set_position(0)?;
        let flags = LibraryFlags::from_bits_retain(r.read_u8()?);
        let canonical_name = r.read_library_ref()?;
        let name = r.read_string_ref()?;
        let file_uri = r.read_uri_ref()?;
        let annotations = r.read_list(Expression::read)?;
        let dependencies = r.read_list(LibraryDependency::read)?;
        let additional_exports = r.read_list(|r| r.read_canonical_name())?;
        let parts = r.read_list(LibraryPart::read)?;
        let typedefs = r.read_list(Typedef::read)?;

        let mut classes = Vec::with_capacity(index.class_count());
        for i in 0..index.class_count() {
            classes.push(read_class(r, &index, i)?);
        }

        r.set_position(r.window().relative(index.fields_start())?)?;
        let fields = r.read_list(Field::read)?;

        let mut procedures = Vec::with_capacity(index.procedure_count());
        for i in 0..index.procedure_count() {
            procedures.push(read_procedure(r, &index, i)?);
        }

        Ok(Library {
            flags,
            canonical_name,
            name,
            file_uri,
            annotations,
            dependencies,
            additional_exports,
            parts,
            typedefs,
            classes,
            fields,
            procedures,
            index,
        })
    }

    pub fn is_external(&self) -> bool {
        self.flags.contains(LibraryFlags::IS_EXTERNAL)
    }
}

fn missing(kind: &'static str, index: usize, len: usize) -> DecodeError {
    DecodeError::InvalidReference {
        kind,
        index: index as u32,
        len,
    }
}

/// Decodes class `i` from its own window, carved from the library index.
pub(crate) fn read_class(r: &Reader<'_>, index: &LibraryIndex, i: usize) -> Result<Class> {
    let (start, end) = index
        .class_range(i)
        .ok_or_else(|| missing("class", i, index.class_count()))?;
    let window = r.window().window_absolute(start, end)?;
    log::trace!("class {i} window [{start:#x}, {end:#x})");
    Class::read(&mut r.with_window(window))
}

/// Decodes procedure `i` from its own window, carved from the library index.
pub(crate) fn read_procedure(r: &Reader<'_>, index: &LibraryIndex, i: usize) -> Result<Procedure> {
    let (start, end) = index
        .procedure_range(i)
        .ok_or_else(|| missing("procedure", i, index.procedure_count()))?;
    let window = r.window().window_absolute(start, end)?;
    log::trace!("procedure {i} window [{start:#x}, {end:#x})");
    Procedure::read(&mut r.with_window(window))
}
