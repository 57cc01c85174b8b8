//! Metadata: an opaque payload blob plus a mapping table from node offsets
//! to payload offsets.
//!
//! The mapping table is written back to front, so it is decoded from the
//! last word towards the first:
//!
//! ```text
//! MetadataMapping {
//!   UInt32 tag;  // fixed-width string reference
//!   RList<Pair<UInt32, UInt32>> nodeOffsetToMetadataOffset;
//! }
//! RList<MetadataMapping> metadataMappings;
//! ```
//!
//! where `RList<T>` is `T[length]` followed by `UInt32 length`.

use indexmap::IndexMap;

use crate::error::{DecodeError, Result};
use crate::strings::{StringRef, StringTable};
use crate::window::ByteWindow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataMapping {
    pub tag: StringRef,
    /// `(node offset, metadata offset)` pairs in file order. Node offsets are
    /// absolute, metadata offsets are relative to the payload blob.
    pub entries: Vec<(u32, u32)>,
}

impl MetadataMapping {
    /// Payload offset recorded for the node at absolute `node_offset`.
    pub fn metadata_offset(&self, node_offset: u32) -> Option<u32> {
        self.entries
            .iter()
            .find(|(node, _)| *node == node_offset)
            .map(|(_, metadata)| *metadata)
    }
}

fn truncated(words: usize) -> DecodeError {
    DecodeError::format(format!("metadata mapping table of {words} words is truncated"))
}

/// Decodes the mapping table, returning mappings in file order.
pub fn read_mappings(window: &ByteWindow) -> Result<Vec<MetadataMapping>> {
    if window.len() % 4 != 0 {
        return Err(DecodeError::format(format!(
            "metadata mapping section length {} is not a multiple of 4",
            window.len()
        )));
    }
    let mut cursor = window.clone();
    cursor.set_position(0)?;
    let words = cursor.read_u32s(window.len() / 4)?;
    let Some((&count, _)) = words.split_last() else {
        return Ok(Vec::new());
    };

    // One past the last word of the mapping being decoded.
    let mut end = words.len() - 1;
    let mut mappings = Vec::with_capacity((count as usize).min(end));
    for _ in 0..count {
        let length_at = end.checked_sub(1).ok_or_else(|| truncated(words.len()))?;
        let length = words[length_at] as usize;
        let pairs_at = length
            .checked_mul(2)
            .and_then(|pair_words| length_at.checked_sub(pair_words))
            .ok_or_else(|| truncated(words.len()))?;
        let tag_at = pairs_at.checked_sub(1).ok_or_else(|| truncated(words.len()))?;

        let entries = words[pairs_at..length_at]
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();
        mappings.push(MetadataMapping {
            tag: StringRef(words[tag_at]),
            entries,
        });
        end = tag_at;
    }

    mappings.reverse();
    log::debug!("metadata: {} mappings", mappings.len());
    Ok(mappings)
}

/// Metadata of a component: the shared payload window and its mappings
/// keyed by tag name.
#[derive(Debug, Clone)]
pub struct Metadata {
    payloads: ByteWindow,
    mappings: IndexMap<String, MetadataMapping>,
}

impl Metadata {
    pub fn new(
        payloads: ByteWindow,
        mappings: Vec<MetadataMapping>,
        strings: &StringTable,
    ) -> Result<Self> {
        let mut keyed = IndexMap::with_capacity(mappings.len());
        for mapping in mappings {
            let name = strings.text(mapping.tag)?.to_owned();
            if keyed.contains_key(&name) {
                return Err(DecodeError::format(format!(
                    "metadata tag `{name}` is mapped twice"
                )));
            }
            keyed.insert(name, mapping);
        }
        Ok(Metadata {
            payloads,
            mappings: keyed,
        })
    }

    pub fn payloads(&self) -> &ByteWindow {
        &self.payloads
    }

    pub fn mappings(&self) -> &IndexMap<String, MetadataMapping> {
        &self.mappings
    }

    pub fn mapping(&self, tag: &str) -> Option<&MetadataMapping> {
        self.mappings.get(tag)
    }

    /// Window starting at the payload `tag` attached to the node at absolute
    /// `node_offset`. The payload's length is known only to its producer.
    pub fn payload(&self, tag: &str, node_offset: u32) -> Result<Option<ByteWindow>> {
        let Some(offset) = self
            .mapping(tag)
            .and_then(|mapping| mapping.metadata_offset(node_offset))
        else {
            return Ok(None);
        };
        self.payloads.window_from(offset as usize).map(Some)
    }
}
