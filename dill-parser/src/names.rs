//! Canonical names and the typed references that point into them.
//!
//! Every cross-reference between nodes (library, class, member, typedef) is a
//! biased index into the component's canonical-name list. A canonical name is
//! a `{parent, name}` pair, so a display name is built by walking the parent
//! chain up to the root and joining the segments with `.`.

use std::fmt;

use crate::error::{DecodeError, Result};
use crate::strings::{StringRef, StringTable};
use crate::window::ByteWindow;

/// Biased index into the canonical-name list. `0` means "no name".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CanonicalNameRef(pub u32);

impl CanonicalNameRef {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn slot(self) -> Option<usize> {
        self.0.checked_sub(1).map(|slot| slot as usize)
    }
}

impl fmt::Display for CanonicalNameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name#{}", self.0)
    }
}

macro_rules! name_reference {
    ($($(#[$meta:meta])* $ty:ident;)*) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $ty(pub CanonicalNameRef);

        impl $ty {
            pub fn canonical_name(self) -> CanonicalNameRef {
                self.0
            }

            pub fn is_null(self) -> bool {
                self.0.is_null()
            }
        }

        impl From<CanonicalNameRef> for $ty {
            fn from(name: CanonicalNameRef) -> Self {
                $ty(name)
            }
        }
    )*};
}

name_reference! {
    /// Reference to a library through its canonical name.
    LibraryRef;
    /// Reference to a class through its canonical name.
    ClassRef;
    /// Reference to any member (field, constructor, procedure).
    MemberRef;
    FieldRef;
    ConstructorRef;
    ProcedureRef;
    TypedefRef;
}

/// Index into the component source table. Not biased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UriRef(pub u32);

/// Index into the constant pool. Not biased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConstantRef(pub u32);

/// Index of a library dependency within the enclosing library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LibraryDependencyRef(pub u32);

/// Stack index of a variable in scope at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VariableRef(pub u32);

/// One entry of the canonical-name list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalName {
    pub parent: CanonicalNameRef,
    pub name: StringRef,
}

impl CanonicalName {
    pub fn read(window: &mut ByteWindow) -> Result<Self> {
        Ok(CanonicalName {
            parent: CanonicalNameRef(window.read_uint()?),
            name: StringRef(window.read_uint()?),
        })
    }
}

/// The canonical-name list of a component (the "link table").
#[derive(Debug, Clone, Default)]
pub struct CanonicalNames(Vec<CanonicalName>);

impl CanonicalNames {
    pub fn new(names: Vec<CanonicalName>) -> Self {
        CanonicalNames(names)
    }

    pub fn read(window: &mut ByteWindow) -> Result<Self> {
        let count = window.read_uint()? as usize;
        let mut names = Vec::with_capacity(count.min(window.remaining()));
        for _ in 0..count {
            names.push(CanonicalName::read(window)?);
        }
        log::debug!("canonical names: {}", names.len());
        Ok(CanonicalNames(names))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, reference: CanonicalNameRef) -> Result<Option<&CanonicalName>> {
        let Some(slot) = reference.slot() else {
            return Ok(None);
        };
        self.0
            .get(slot)
            .map(Some)
            .ok_or(DecodeError::InvalidReference {
                kind: "canonical name",
                index: reference.0,
                len: self.0.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalName> {
        self.0.iter()
    }
}

/// Resolves references into display strings.
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    strings: &'a StringTable,
    names: &'a CanonicalNames,
}

impl<'a> NameResolver<'a> {
    pub fn new(strings: &'a StringTable, names: &'a CanonicalNames) -> Self {
        NameResolver { strings, names }
    }

    pub fn string(&self, reference: StringRef) -> Result<Option<&'a str>> {
        self.strings.get(reference)
    }

    /// Walks the parent chain of `reference`.
    ///
    /// Returns `None` for the null reference, and for chains whose every
    /// segment is unnamed (the root).
    pub fn resolve(&self, reference: CanonicalNameRef) -> Result<Option<String>> {
        let mut segments = Vec::new();
        let mut current = reference;
        // A well formed chain visits each entry at most once.
        let mut budget = self.names.len() + 1;

        while let Some(entry) = self.names.get(current)? {
            if budget == 0 {
                return Err(DecodeError::format(format!(
                    "canonical name chain starting at {reference} does not terminate"
                )));
            }
            budget -= 1;
            if let Some(segment) = self.strings.get(entry.name)? {
                segments.push(segment);
            }
            current = entry.parent;
        }

        if segments.is_empty() {
            return Ok(None);
        }
        segments.reverse();
        Ok(Some(segments.join(".")))
    }

    /// Like [`NameResolver::resolve`] but renders absent names as `""`.
    pub fn display(&self, reference: CanonicalNameRef) -> Result<String> {
        Ok(self.resolve(reference)?.unwrap_or_default())
    }

    /// Text of a member [`Name`]. Library-private names are qualified by
    /// their owning library.
    pub fn name(&self, name: &Name) -> Result<String> {
        let text = self.strings.text(name.text)?;
        match name.library {
            Some(library) => match self.resolve(library.canonical_name())? {
                Some(owner) => Ok(format!("{owner}.{text}")),
                None => Ok(text.to_owned()),
            },
            None => Ok(text.to_owned()),
        }
    }
}

/// A member name. `library` is present exactly when the text starts with
/// `_`, which marks it as private to that library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Name {
    pub text: StringRef,
    pub library: Option<LibraryRef>,
}

impl Name {
    pub fn is_private(&self) -> bool {
        self.library.is_some()
    }
}
