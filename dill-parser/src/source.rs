//! The source table (`UriSource`): one entry per file URI referenced by the
//! component, with optional embedded source text and line starts.

use crate::error::{DecodeError, Result};
use crate::names::UriRef;
use crate::window::ByteWindow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInfo {
    pub uri: String,
    /// Embedded source text; empty when the compiler omitted it.
    pub source: String,
    /// Absolute byte offset of each line start.
    pub line_starts: Vec<u32>,
}

impl SourceInfo {
    pub fn read(window: &mut ByteWindow) -> Result<Self> {
        let uri = utf8(window, "source uri")?;
        let source = utf8(window, "source text")?;

        // Encoded as line lengths: [0, 10, 25] is stored as [0, 10, 15].
        let count = window.read_uint()? as usize;
        let mut line_starts = Vec::with_capacity(count.min(window.remaining()));
        let mut previous = 0u32;
        for _ in 0..count {
            previous = previous
                .checked_add(window.read_uint()?)
                .ok_or_else(|| DecodeError::format(format!("line starts of {uri} overflow")))?;
            line_starts.push(previous);
        }

        Ok(SourceInfo {
            uri,
            source,
            line_starts,
        })
    }

    /// 1-based `(line, column)` of a file offset.
    pub fn location(&self, offset: u32) -> Option<(u32, u32)> {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(0) => return None,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[line];
        Some((line as u32 + 1, column + 1))
    }
}

fn utf8(window: &mut ByteWindow, context: &'static str) -> Result<String> {
    let bytes = window.read_byte_list()?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| DecodeError::InvalidUtf8 { context })
}

#[derive(Debug, Clone, Default)]
pub struct UriSource {
    pub sources: Vec<SourceInfo>,
    /// The ith entry is the byte offset of the ith source.
    pub source_index: Vec<u32>,
}

impl UriSource {
    pub fn read(window: &mut ByteWindow) -> Result<Self> {
        let count = window.read_u32()? as usize;
        let mut sources = Vec::with_capacity(count.min(window.remaining()));
        for _ in 0..count {
            sources.push(SourceInfo::read(window)?);
        }
        let source_index = window.read_u32s(count)?;
        log::debug!("source table: {} uris", sources.len());
        Ok(UriSource {
            sources,
            source_index,
        })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, uri: UriRef) -> Option<&SourceInfo> {
        self.sources.get(uri.0 as usize)
    }
}
