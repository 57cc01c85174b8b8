//! The component string table.

use std::fmt;

use crate::error::{DecodeError, Result};
use crate::window::ByteWindow;

/// Biased index into the [`StringTable`]. `0` is the absent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringRef(pub u32);

impl StringRef {
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Physical slot in the table, or `None` for the absent string.
    pub fn slot(self) -> Option<usize> {
        self.0.checked_sub(1).map(|slot| slot as usize)
    }
}

impl fmt::Display for StringRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "str#{}", self.0)
    }
}

/// Decoded strings, in table order.
///
/// Wire layout: `List<UInt> endOffsets` (first entry `0`) followed by a
/// UTF-8 blob of `endOffsets.last` bytes. String `i` spans
/// `[endOffsets[i], endOffsets[i + 1])`.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<Box<str>>,
}

impl StringTable {
    pub fn read(window: &mut ByteWindow) -> Result<Self> {
        let count = window.read_uint()? as usize;
        let mut end_offsets = Vec::with_capacity(count.min(window.remaining()));
        for _ in 0..count {
            end_offsets.push(window.read_uint()? as usize);
        }

        match end_offsets.first() {
            Some(0) => {}
            Some(first) => {
                return Err(DecodeError::format(format!(
                    "string table first offset was {first}, not 0"
                )));
            }
            None => return Err(DecodeError::format("string table has no offsets")),
        }

        let blob_len = end_offsets.last().copied().unwrap_or_default();
        let blob = window.read_bytes(blob_len)?;

        let mut strings = Vec::with_capacity(end_offsets.len() - 1);
        for pair in end_offsets.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if end < start {
                return Err(DecodeError::format(format!(
                    "string table offsets decrease ({start} -> {end})"
                )));
            }
            let bytes = blob.get(start..end).ok_or_else(|| {
                DecodeError::format(format!(
                    "string table offset {end} is past the {blob_len} byte blob"
                ))
            })?;
            let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 {
                context: "string table",
            })?;
            strings.push(Box::from(text));
        }

        log::debug!("string table: {} strings, {} bytes", strings.len(), blob_len);
        Ok(StringTable { strings })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Looks up a biased reference. The null reference yields `Ok(None)`.
    pub fn get(&self, reference: StringRef) -> Result<Option<&str>> {
        let Some(slot) = reference.slot() else {
            return Ok(None);
        };
        self.strings
            .get(slot)
            .map(|s| Some(&**s))
            .ok_or(DecodeError::InvalidReference {
                kind: "string",
                index: reference.0,
                len: self.strings.len(),
            })
    }

    /// Like [`StringTable::get`] but maps the null reference to `""`.
    pub fn text(&self, reference: StringRef) -> Result<&str> {
        Ok(self.get(reference)?.unwrap_or(""))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(|s| &**s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_bytes(offsets: &[u8], blob: &[u8]) -> Vec<u8> {
        let mut bytes = vec![offsets.len() as u8];
        bytes.extend_from_slice(offsets);
        bytes.extend_from_slice(blob);
        bytes
    }

    #[test]
    fn decodes_consecutive_strings() {
        let mut window = ByteWindow::new(table_bytes(&[0, 5, 10], b"helloworld"));
        let table = StringTable::read(&mut window).unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["hello", "world"]);
        assert_eq!(window.remaining(), 0);

        assert_eq!(table.get(StringRef(0)).unwrap(), None);
        assert_eq!(table.get(StringRef(1)).unwrap(), Some("hello"));
        assert_eq!(table.get(StringRef(2)).unwrap(), Some("world"));
        assert!(table.get(StringRef(3)).is_err());
    }

    #[test]
    fn multibyte_strings_split_on_byte_offsets() {
        let mut window = ByteWindow::new(table_bytes(&[0, 2, 9], "élan λx".as_bytes()));
        let table = StringTable::read(&mut window).unwrap();
        assert_eq!(table.iter().collect::<Vec<_>>(), vec!["é", "lan λx"]);
    }

    #[test]
    fn rejects_nonzero_first_offset() {
        let mut window = ByteWindow::new(table_bytes(&[1, 5, 10], b"helloworld"));
        assert!(StringTable::read(&mut window).is_err());
    }

    #[test]
    fn rejects_truncated_blob() {
        let mut window = ByteWindow::new(table_bytes(&[0, 5, 10], b"hello"));
        assert!(StringTable::read(&mut window).is_err());
    }
}
