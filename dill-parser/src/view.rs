//! Partial access to a component.
//!
//! Opening a view reads only the header, the trailer directory, the string
//! table and the canonical names. Libraries, classes and procedures are
//! decoded on request from windows carved out of the shared buffer.

use std::sync::Arc;

use crate::class::Class;
use crate::component::{Diagnostics, Header, Prelude};
use crate::error::Result;
use crate::index::ComponentIndex;
use crate::ir::{Constant, Member, Procedure};
use crate::library::{self, Library, LibraryIndex};
use crate::reader::Reader;
use crate::session::{DecodeOptions, Session};

pub struct ComponentView {
    prelude: Prelude,
}

impl ComponentView {
    pub fn open(bytes: impl Into<Arc<[u8]>>) -> Result<Self> {
        Self::open_with_options(bytes, DecodeOptions::default())
    }

    pub fn open_with_options(bytes: impl Into<Arc<[u8]>>, options: DecodeOptions) -> Result<Self> {
        Ok(ComponentView {
            prelude: Prelude::read(bytes.into(), options)?,
        })
    }

    pub fn header(&self) -> &Header {
        &self.prelude.header
    }

    pub fn index(&self) -> &ComponentIndex {
        &self.prelude.index
    }

    pub fn session(&self) -> &Session {
        &self.prelude.session
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.prelude.diagnostics
    }

    pub fn library_count(&self) -> usize {
        self.prelude.index.library_count as usize
    }

    /// Decodes library `index` in full.
    pub fn library(&self, index: usize) -> Result<Library> {
        self.prelude.read_library(index)
    }

    /// The class and procedure offsets of library `index`, without
    /// decoding any of its declarations.
    pub fn library_index(&self, index: usize) -> Result<LibraryIndex> {
        LibraryIndex::read(&self.prelude.library_window(index)?)
    }

    pub fn class(&self, library: usize, class: usize) -> Result<Class> {
        let (reader, index) = self.library_reader(library)?;
        library::read_class(&reader, &index, class)
    }

    pub fn procedure(&self, library: usize, procedure: usize) -> Result<Procedure> {
        let (reader, index) = self.library_reader(library)?;
        library::read_procedure(&reader, &index, procedure)
    }

    /// Decodes the member whose tag sits at absolute file offset `offset`.
    pub fn member_at(&self, offset: u32) -> Result<Member> {
        let window = self.prelude.root.window_from(offset as usize)?;
        Member::read(&mut Reader::new(window, &self.prelude.session))
    }

    pub fn constants(&self) -> Result<Vec<Constant>> {
        self.prelude.read_constants()
    }

    fn library_reader(&self, library: usize) -> Result<(Reader<'_>, LibraryIndex)> {
        let window = self.prelude.library_window(library)?;
        let index = LibraryIndex::read(&window)?;
        Ok((Reader::new(window, &self.prelude.session), index))
    }
}
