//! `dill-parser` - A decoder for Dart kernel binaries (`.dill`)
//!
//! This crate reads a kernel component into a typed node graph. Sections
//! are located through the directory at the end of the file, and every
//! library, class and procedure is decoded from its own bounds-checked
//! window over one shared buffer. [`ComponentFile`] decodes everything up
//! front; [`ComponentView`] decodes single declarations on request.

pub mod class;
pub mod component;
pub mod error;
pub mod index;
pub mod ir;
pub mod library;
pub mod metadata;
pub mod names;
pub mod reader;
pub mod session;
pub mod source;
pub mod strings;
pub mod view;
pub mod window;

pub use class::Class;
pub use component::{ComponentFile, Diagnostic, Diagnostics, Header};
pub use error::{DecodeError, ErrorKind, NodeFamily, Result};
pub use index::ComponentIndex;
pub use library::Library;
pub use names::{CanonicalNameRef, Name, NameResolver};
pub use reader::Reader;
pub use session::{DecodeOptions, FormatVersion, Session, SessionBuilder, SyntheticFlag};
pub use strings::{StringRef, StringTable};
pub use view::ComponentView;
pub use window::ByteWindow;
