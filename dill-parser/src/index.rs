//! The component index: a fixed-width directory at the end of the file.
//!
//! ```text
//! ComponentIndex {
//!   UInt32 binaryOffsetForSourceTable;
//!   UInt32 binaryOffsetForCanonicalNames;
//!   UInt32 binaryOffsetForMetadataPayloads;
//!   UInt32 binaryOffsetForMetadataMappings;
//!   UInt32 binaryOffsetForStringTable;
//!   UInt32 binaryOffsetForConstantTable;
//!   UInt32 mainMethodReference;
//!   UInt32[libraryCount + 1] libraryOffsets;
//!   UInt32 libraryCount;
//!   UInt32 componentFileSizeInBytes;
//! }
//! ```
//!
//! The last two words locate the directory, so its start is computed as
//! `fileSize - (libraryCount + 10) * 4`.

use crate::error::{DecodeError, Result};
use crate::names::{CanonicalNameRef, ProcedureRef};
use crate::window::ByteWindow;

/// Words in the index besides the library offsets.
const FIXED_WORDS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentIndex {
    pub source_table: u32,
    pub canonical_names: u32,
    pub metadata_payloads: u32,
    pub metadata_mappings: u32,
    pub string_table: u32,
    pub constant_table: u32,
    /// Stored as a fixed-width canonical name reference.
    pub main_method: ProcedureRef,
    /// `library_count + 1` absolute offsets; the last one ends the final
    /// library.
    pub library_offsets: Vec<u32>,
    pub library_count: u32,
    pub file_size: u32,
}

impl ComponentIndex {
    /// Locates the index from the final 8 bytes of `file` and parses it.
    pub fn read(file: &ByteWindow) -> Result<Self> {
        let trailer_start = file
            .len()
            .checked_sub(8)
            .ok_or_else(|| DecodeError::format(format!("file of {} bytes has no trailer", file.len())))?;
        let mut trailer = file.window_from(trailer_start)?;
        let library_count = trailer.read_u32()?;
        let file_size = trailer.read_u32()?;

        let index_len = (library_count as u64 + FIXED_WORDS) * 4;
        let index_start = (file_size as u64).checked_sub(index_len).ok_or_else(|| {
            DecodeError::format(format!(
                "file size {file_size} cannot hold an index for {library_count} libraries"
            ))
        })?;
        log::debug!(
            "component index at {index_start:#x}: {library_count} libraries, {file_size} bytes"
        );

        let mut window = file.window_from(index_start as usize)?;
        Self::parse(&mut window, library_count, file_size)
    }

    /// Parses the index body given the trailer values, checking them against
    /// the redundant copies stored at the end of the index.
    pub fn parse(window: &mut ByteWindow, library_count: u32, file_size: u32) -> Result<Self> {
        let source_table = window.read_u32()?;
        let canonical_names = window.read_u32()?;
        let metadata_payloads = window.read_u32()?;
        let metadata_mappings = window.read_u32()?;
        let string_table = window.read_u32()?;
        let constant_table = window.read_u32()?;
        let main_method = ProcedureRef(CanonicalNameRef(window.read_u32()?));
        let library_offsets = window.read_u32s(library_count as usize + 1)?;

        let check_count = window.read_u32()?;
        if check_count != library_count {
            return Err(DecodeError::Integrity {
                field: "library count",
                expected: library_count,
                found: check_count,
            });
        }
        let check_size = window.read_u32()?;
        if check_size != file_size {
            return Err(DecodeError::Integrity {
                field: "component file size",
                expected: file_size,
                found: check_size,
            });
        }

        Ok(ComponentIndex {
            source_table,
            canonical_names,
            metadata_payloads,
            metadata_mappings,
            string_table,
            constant_table,
            main_method,
            library_offsets,
            library_count,
            file_size,
        })
    }

    /// Absolute `[start, end)` of library `index`.
    pub fn library_range(&self, index: usize) -> Option<(u32, u32)> {
        let start = *self.library_offsets.get(index)?;
        let end = *self.library_offsets.get(index + 1)?;
        Some((start, end))
    }

    /// Byte range of the metadata payload blob.
    pub fn metadata_payload_range(&self) -> (u32, u32) {
        (self.metadata_payloads, self.metadata_mappings)
    }

    /// Byte range of the backward-encoded metadata mapping table, which runs
    /// up to the string table.
    pub fn metadata_mapping_range(&self) -> (u32, u32) {
        (self.metadata_mappings, self.string_table)
    }
}
