//! Whole-component decoding.
//!
//! ```text
//! ComponentFile {
//!   UInt32 magic = 0x90ABCDEF;
//!   UInt32 formatVersion;
//!   List<List<Byte>> problemsAsJson; // version 17 and later
//!   Library[] libraries;
//!   UriSource sourceMap;
//!   List<CanonicalName> canonicalNames;
//!   MetadataPayload[] metadataPayloads;
//!   RList<MetadataMapping> metadataMappings;
//!   StringTable strings;
//!   List<Constant> constants;
//!   ComponentIndex componentIndex;
//! }
//! ```
//!
//! Sections are not read in file order: the index at the end is located
//! first, then the tables every other section depends on.

use std::fmt;
use std::sync::Arc;

use crate::error::{DecodeError, Result};
use crate::index::ComponentIndex;
use crate::ir::Constant;
use crate::library::Library;
use crate::metadata::{self, Metadata};
use crate::names::{CanonicalNames, ConstantRef, NameResolver};
use crate::reader::Reader;
use crate::session::{DecodeOptions, FormatVersion, Session, SessionBuilder};
use crate::source::UriSource;
use crate::strings::StringTable;
use crate::window::ByteWindow;

pub const MAGIC: u32 = 0x90AB_CDEF;

/// Non-fatal conditions noticed while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The header version predates the layouts this crate knows; decoding
    /// continued with the baseline layout.
    UnknownFormatVersion(u32),
    /// The front end recorded this many problems in the header.
    Problems(usize),
    /// The constant pool holds a kind only old components use.
    DeprecatedConstant(u8),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownFormatVersion(version) => write!(
                f,
                "unknown component format version {version}, decoding as version {}",
                FormatVersion::BASELINE.0
            ),
            Diagnostic::Problems(count) => write!(f, "component carries {count} problem(s)"),
            Diagnostic::DeprecatedConstant(tag) => {
                write!(f, "deprecated constant kind (tag {tag}) in constant pool")
            }
        }
    }
}

/// Diagnostics of one decode. Each kind is kept, and logged, once.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn report(&mut self, diagnostic: Diagnostic) {
        let kind = std::mem::discriminant(&diagnostic);
        if self.0.iter().any(|seen| std::mem::discriminant(seen) == kind) {
            return;
        }
        log::warn!("{diagnostic}");
        self.0.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: FormatVersion,
    /// JSON-encoded front end problems.
    pub problems: Vec<String>,
}

impl Header {
    pub fn read(window: &mut ByteWindow, diagnostics: &mut Diagnostics) -> Result<Self> {
        let magic = window.read_u32()?;
        if magic != MAGIC {
            return Err(DecodeError::BadMagic {
                expected: MAGIC,
                found: magic,
            });
        }

        let version = FormatVersion(window.read_u32()?);
        let mut problems = Vec::new();
        if version.has_problems() {
            let count = window.read_uint()? as usize;
            for _ in 0..count {
                let bytes = window.read_byte_list()?;
                let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
                    context: "problems list",
                })?;
                problems.push(text.to_owned());
            }
            if !problems.is_empty() {
                diagnostics.report(Diagnostic::Problems(problems.len()));
            }
        } else if !version.is_known() {
            diagnostics.report(Diagnostic::UnknownFormatVersion(version.0));
        }
        log::debug!("component format version {}", version.0);

        Ok(Header { version, problems })
    }
}

/// The sections every decode needs before any node can be read.
pub(crate) struct Prelude {
    pub root: ByteWindow,
    pub header: Header,
    pub index: ComponentIndex,
    pub session: Session,
    pub diagnostics: Diagnostics,
}

impl Prelude {
    pub fn read(bytes: Arc<[u8]>, options: DecodeOptions) -> Result<Self> {
        let root = ByteWindow::new(bytes);
        let mut diagnostics = Diagnostics::default();
        let header = Header::read(&mut root.clone(), &mut diagnostics)?;
        let index = ComponentIndex::read(&root)?;
        log::debug!(
            "sections: source {:#x}, names {:#x}, payloads {:#x}, mappings {:#x}, strings {:#x}, constants {:#x}",
            index.source_table,
            index.canonical_names,
            index.metadata_payloads,
            index.metadata_mappings,
            index.string_table,
            index.constant_table
        );

        let strings = StringTable::read(&mut root.window_from(index.string_table as usize)?)?;
        let names = CanonicalNames::read(&mut root.window_from(index.canonical_names as usize)?)?;

        let mut builder = SessionBuilder::new(header.version, options);
        builder.attach_strings(strings)?.canonical_names(names);
        let session = builder.build()?;

        Ok(Prelude {
            root,
            header,
            index,
            session,
            diagnostics,
        })
    }

    pub fn library_window(&self, index: usize) -> Result<ByteWindow> {
        let (start, end) = self
            .index
            .library_range(index)
            .ok_or(DecodeError::InvalidReference {
                kind: "library",
                index: index as u32,
                len: self.index.library_count as usize,
            })?;
        self.root.window_absolute(start, end)
    }

    pub fn read_library(&self, index: usize) -> Result<Library> {
        let window = self.library_window(index)?;
        log::debug!(
            "library {index}: [{:#x}, {:#x})",
            window.base(),
            window.base() + window.len()
        );
        Library::read(&mut Reader::new(window, &self.session))
    }

    pub fn read_constants(&self) -> Result<Vec<Constant>> {
        let window = self.root.window_from(self.index.constant_table as usize)?;
        let constants = Reader::new(window, &self.session).read_list(Constant::read)?;
        log::debug!("constant pool: {} entries", constants.len());
        Ok(constants)
    }
}

/// A fully decoded component.
#[derive(Debug)]
pub struct ComponentFile {
    pub header: Header,
    pub index: ComponentIndex,
    pub source_map: UriSource,
    pub metadata: Metadata,
    pub constants: Vec<Constant>,
    pub libraries: Vec<Library>,
    session: Session,
    diagnostics: Diagnostics,
}

impl ComponentFile {
    /// Decodes a component held entirely in memory.
    pub fn load(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        Self::load_with_options(bytes, DecodeOptions::default())
    }

    pub fn load_with_options(bytes: impl Into<Arc<[u8]>>, options: DecodeOptions) -> Result<Self> {
        let prelude = Prelude::read(bytes.into(), options)?;
        let mut diagnostics = prelude.diagnostics.clone();
        let root = &prelude.root;
        let index = &prelude.index;

        let (mappings_start, mappings_end) = index.metadata_mapping_range();
        let mappings = metadata::read_mappings(&root.window_absolute(mappings_start, mappings_end)?)?;

        let source_map = UriSource::read(&mut root.window_from(index.source_table as usize)?)?;
        log::debug!("source map: {} entries", source_map.len());

        let constants = prelude.read_constants()?;
        for constant in constants.iter().filter(|c| c.is_deprecated()) {
            diagnostics.report(Diagnostic::DeprecatedConstant(constant.tag()));
        }

        let libraries = read_libraries(&prelude)?;

        let (payloads_start, payloads_end) = index.metadata_payload_range();
        let payloads = root.window_absolute(payloads_start, payloads_end)?;
        let metadata = Metadata::new(payloads, mappings, prelude.session.strings())?;

        let Prelude {
            header,
            index,
            session,
            ..
        } = prelude;
        Ok(ComponentFile {
            header,
            index,
            source_map,
            metadata,
            constants,
            libraries,
            session,
            diagnostics,
        })
    }

    pub fn version(&self) -> FormatVersion {
        self.header.version
    }

    pub fn problems(&self) -> &[String] {
        &self.header.problems
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn strings(&self) -> &StringTable {
        self.session.strings()
    }

    pub fn canonical_names(&self) -> &CanonicalNames {
        self.session.canonical_names()
    }

    pub fn resolver(&self) -> NameResolver<'_> {
        self.session.resolver()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn constant(&self, reference: ConstantRef) -> Option<&Constant> {
        self.constants.get(reference.0 as usize)
    }

    /// Display name of the entry point, if the component has one.
    pub fn main_method(&self) -> Result<Option<String>> {
        self.resolver()
            .resolve(self.index.main_method.canonical_name())
    }
}

#[cfg(feature = "parallel")]
fn read_libraries(prelude: &Prelude) -> Result<Vec<Library>> {
    use rayon::prelude::*;

    let count = prelude.index.library_count as usize;
    if prelude.session.options().parallel {
        log::debug!("decoding {count} libraries in parallel");
        (0..count)
            .into_par_iter()
            .map(|i| prelude.read_library(i))
            .collect()
    } else {
        (0..count).map(|i| prelude.read_library(i)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn read_libraries(prelude: &Prelude) -> Result<Vec<Library>> {
    if prelude.session.options().parallel {
        log::debug!("parallel decoding requested but the `parallel` feature is off");
    }
    let count = prelude.index.library_count as usize;
    (0..count).map(|i| prelude.read_library(i)).collect()
}
