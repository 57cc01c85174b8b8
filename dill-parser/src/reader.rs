//! Cursor used by every node constructor: a [`ByteWindow`] paired with the
//! decode [`Session`] that resolves strings and names.

use crate::error::{DecodeError, Result};
use crate::ir::FileOffset;
use crate::names::{
    CanonicalNameRef, ClassRef, ConstantRef, ConstructorRef, FieldRef, LibraryDependencyRef,
    LibraryRef, MemberRef, Name, ProcedureRef, TypedefRef, UriRef, VariableRef,
};
use crate::session::Session;
use crate::strings::StringRef;
use crate::window::ByteWindow;

pub struct Reader<'s> {
    window: ByteWindow,
    session: &'s Session,
}

impl<'s> Reader<'s> {
    pub fn new(window: ByteWindow, session: &'s Session) -> Self {
        Reader { window, session }
    }

    /// A reader over `window` sharing this reader's session.
    pub fn with_window(&self, window: ByteWindow) -> Reader<'s> {
        Reader::new(window, self.session)
    }

    pub fn session(&self) -> &'s Session {
        self.session
    }

    pub fn window(&self) -> &ByteWindow {
        &self.window
    }

    pub fn into_window(self) -> ByteWindow {
        self.window
    }

    pub fn position(&self) -> usize {
        self.window.position()
    }

    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        self.window.set_position(pos)
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.window.remaining()
    }

    // =================================================================
    // Primitives
    // =================================================================

    pub fn read_u8(&mut self) -> Result<u8> {
        self.window.read_u8()
    }

    pub fn peek_u8(&self) -> Result<u8> {
        self.window.peek_u8()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.window.read_u32()
    }

    pub fn read_uint(&mut self) -> Result<u32> {
        self.window.read_uint()
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.window.read_f64()
    }

    pub fn check_tag(&mut self, expected: u8) -> Result<()> {
        self.window.check_tag(expected)
    }

    // =================================================================
    // Composites
    // =================================================================

    /// `List<T>`: a `UInt` length followed by that many elements.
    pub fn read_list<T>(&mut self, mut element: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.read_uint()? as usize;
        self.read_list_of(count, &mut element)
    }

    /// Reads `count` elements without a length prefix.
    pub fn read_list_of<T>(
        &mut self,
        count: usize,
        mut element: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        // Every element takes at least one byte.
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(element(self)?);
        }
        Ok(items)
    }

    /// `Option<T>`: tag `0` is nothing, `1` is followed by a `T`.
    pub fn read_option<T>(&mut self, element: impl FnOnce(&mut Self) -> Result<T>) -> Result<Option<T>> {
        match self.read_u8()? {
            0 => Ok(None),
            1 => element(self).map(Some),
            tag => Err(DecodeError::InvalidOptionTag { tag }),
        }
    }

    /// `List<Byte>`.
    pub fn read_byte_list(&mut self) -> Result<Vec<u8>> {
        Ok(self.window.read_byte_list()?.to_vec())
    }

    /// `List<Byte>` holding UTF-8 text.
    pub fn read_utf8(&mut self, context: &'static str) -> Result<String> {
        String::from_utf8(self.read_byte_list()?).map_err(|_| DecodeError::InvalidUtf8 { context })
    }

    // =================================================================
    // References
    // =================================================================

    pub fn read_string_ref(&mut self) -> Result<StringRef> {
        self.read_uint().map(StringRef)
    }

    pub fn read_canonical_name(&mut self) -> Result<CanonicalNameRef> {
        self.read_uint().map(CanonicalNameRef)
    }

    pub fn read_library_ref(&mut self) -> Result<LibraryRef> {
        self.read_canonical_name().map(LibraryRef)
    }

    pub fn read_class_ref(&mut self) -> Result<ClassRef> {
        self.read_canonical_name().map(ClassRef)
    }

    pub fn read_member_ref(&mut self) -> Result<MemberRef> {
        self.read_canonical_name().map(MemberRef)
    }

    pub fn read_field_ref(&mut self) -> Result<FieldRef> {
        self.read_canonical_name().map(FieldRef)
    }

    pub fn read_constructor_ref(&mut self) -> Result<ConstructorRef> {
        self.read_canonical_name().map(ConstructorRef)
    }

    pub fn read_procedure_ref(&mut self) -> Result<ProcedureRef> {
        self.read_canonical_name().map(ProcedureRef)
    }

    pub fn read_typedef_ref(&mut self) -> Result<TypedefRef> {
        self.read_canonical_name().map(TypedefRef)
    }

    pub fn read_uri_ref(&mut self) -> Result<UriRef> {
        self.read_uint().map(UriRef)
    }

    pub fn read_constant_ref(&mut self) -> Result<ConstantRef> {
        self.read_uint().map(ConstantRef)
    }

    pub fn read_dependency_ref(&mut self) -> Result<LibraryDependencyRef> {
        self.read_uint().map(LibraryDependencyRef)
    }

    pub fn read_variable_ref(&mut self) -> Result<VariableRef> {
        self.read_uint().map(VariableRef)
    }

    pub fn read_file_offset(&mut self) -> Result<FileOffset> {
        self.read_uint().map(FileOffset::from_biased)
    }

    /// Reads a [`Name`]. The library reference is only present on the wire
    /// when the decoded text starts with `_`.
    pub fn read_name(&mut self) -> Result<Name> {
        let text = self.read_string_ref()?;
        let private = self
            .session
            .strings()
            .get(text)?
            .is_some_and(|s| s.starts_with('_'));
        let library = if private {
            Some(self.read_library_ref()?)
        } else {
            None
        };
        Ok(Name { text, library })
    }

    /// Resolves a string reference against the session's table.
    pub fn string(&self, reference: StringRef) -> Result<Option<&'s str>> {
        self.session.strings().get(reference)
    }
}
