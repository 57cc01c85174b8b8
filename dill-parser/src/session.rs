//! Decode session: the string table, canonical names and options shared by
//! every node constructor of one component.
//!
//! A [`Session`] is immutable once built, so it can be shared across threads
//! when libraries are decoded in parallel. The string table is attached
//! exactly once, on the [`SessionBuilder`], before any node is read.

use std::sync::Arc;

use crate::error::{DecodeError, Result};
use crate::names::{CanonicalNames, NameResolver};
use crate::strings::StringTable;

/// Binary format version from the component header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion(pub u32);

impl FormatVersion {
    pub const BASELINE: FormatVersion = FormatVersion(16);

    /// First version with the problems list after the version word.
    const PROBLEMS_SINCE: u32 = 17;
    /// First version whose `AssertInitializer` starts with `isSynthetic`.
    /// Older encoders wrote the tag followed directly by the statement.
    const ASSERT_SYNTHETIC_SINCE: u32 = 16;

    /// Versions whose header layout is understood.
    pub fn is_known(self) -> bool {
        self.0 >= Self::BASELINE.0
    }

    pub fn has_problems(self) -> bool {
        self.0 >= Self::PROBLEMS_SINCE
    }

    pub fn assert_has_synthetic(self) -> bool {
        self.0 >= Self::ASSERT_SYNTHETIC_SINCE
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::BASELINE
    }
}

/// Whether `AssertInitializer` carries the leading `isSynthetic` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntheticFlag {
    /// Decide from the header's format version, see
    /// [`FormatVersion::assert_has_synthetic`].
    #[default]
    Auto,
    Present,
    Absent,
}

impl SyntheticFlag {
    pub fn is_present(self, version: FormatVersion) -> bool {
        match self {
            SyntheticFlag::Auto => version.assert_has_synthetic(),
            SyntheticFlag::Present => true,
            SyntheticFlag::Absent => false,
        }
    }
}

impl std::str::FromStr for SyntheticFlag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(SyntheticFlag::Auto),
            "present" => Ok(SyntheticFlag::Present),
            "absent" => Ok(SyntheticFlag::Absent),
            other => Err(format!("expected auto, present or absent, got `{other}`")),
        }
    }
}

/// Knobs for a decode pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub assert_synthetic: SyntheticFlag,
    /// Decode libraries on the rayon pool. Only honored when the crate is
    /// built with the `parallel` feature.
    pub parallel: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assert_synthetic(mut self, flag: SyntheticFlag) -> Self {
        self.assert_synthetic = flag;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    strings: Arc<StringTable>,
    names: Arc<CanonicalNames>,
    options: DecodeOptions,
    version: FormatVersion,
}

impl Session {
    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    pub fn canonical_names(&self) -> &CanonicalNames {
        &self.names
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn resolver(&self) -> NameResolver<'_> {
        NameResolver::new(&self.strings, &self.names)
    }

    /// Whether `AssertInitializer` nodes start with an `isSynthetic` byte.
    pub fn assert_has_synthetic(&self) -> bool {
        self.options.assert_synthetic.is_present(self.version)
    }
}

#[derive(Debug, Default)]
pub struct SessionBuilder {
    strings: Option<Arc<StringTable>>,
    names: CanonicalNames,
    options: DecodeOptions,
    version: FormatVersion,
}

impl SessionBuilder {
    pub fn new(version: FormatVersion, options: DecodeOptions) -> Self {
        SessionBuilder {
            version,
            options,
            ..Default::default()
        }
    }

    /// Attaches the string table. A second attach fails.
    pub fn attach_strings(&mut self, strings: StringTable) -> Result<&mut Self> {
        if self.strings.is_some() {
            return Err(DecodeError::StringTableAttached);
        }
        self.strings = Some(Arc::new(strings));
        Ok(self)
    }

    pub fn has_strings(&self) -> bool {
        self.strings.is_some()
    }

    pub fn canonical_names(&mut self, names: CanonicalNames) -> &mut Self {
        self.names = names;
        self
    }

    /// Builds the session. Resolving names requires the string table, so a
    /// builder without one is rejected.
    pub fn build(self) -> Result<Session> {
        let strings = self
            .strings
            .ok_or_else(|| DecodeError::format("no string table attached to the session"))?;
        Ok(Session {
            strings,
            names: Arc::new(self.names),
            options: self.options,
            version: self.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn session_is_shareable() {
        assert_send_sync::<Session>();
    }

    #[test]
    fn string_table_attaches_once() {
        let mut builder = SessionBuilder::default();
        builder.attach_strings(StringTable::default()).unwrap();
        let err = builder.attach_strings(StringTable::default()).unwrap_err();
        assert!(matches!(err, DecodeError::StringTableAttached));
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(builder.build().is_ok());
    }

    #[test]
    fn build_requires_strings() {
        assert!(SessionBuilder::default().build().is_err());
    }

    #[test]
    fn synthetic_flag_resolution() {
        let (v9, v16, v17) = (FormatVersion(9), FormatVersion(16), FormatVersion(17));
        assert!(SyntheticFlag::Auto.is_present(v16));
        assert!(SyntheticFlag::Auto.is_present(v17));
        assert!(!SyntheticFlag::Auto.is_present(v9));
        assert!(!SyntheticFlag::Auto.is_present(FormatVersion(0)));
        assert!(SyntheticFlag::Present.is_present(v9));
        assert!(!SyntheticFlag::Absent.is_present(v16));
        assert_eq!("absent".parse::<SyntheticFlag>(), Ok(SyntheticFlag::Absent));
        assert!("maybe".parse::<SyntheticFlag>().is_err());
    }
}
