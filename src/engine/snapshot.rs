//! On-disk snapshot of a [`MemoryIndex`].
//!
//! A snapshot directory holds two files:
//!
//! - `metadata.json`: format version, creation time, document count and
//!   field names.
//! - `index.bin`: a little-endian header (magic, version, payload length),
//!   the bincode-encoded index, and a CRC32 of the payload.
//!
//! Anything that prevents a faithful load (missing files, bad magic, version
//! mismatch, checksum mismatch, undecodable payload) is reported as
//! [`RicochetError::IndexUnavailable`].

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::memory::MemoryIndex;
use crate::engine::reader::IndexReader;
use crate::error::{Result, RicochetError};

pub const METADATA_FILE: &str = "metadata.json";
pub const INDEX_FILE: &str = "index.bin";

/// "RCHT" in little-endian byte order.
const MAGIC: u32 = 0x5448_4352;
pub const FORMAT_VERSION: u32 = 1;

/// Human-readable description of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub doc_count: u64,
    pub fields: Vec<String>,
}

/// Write `index` to `dir`, creating the directory if needed.
pub fn write(index: &MemoryIndex, dir: &Path) -> Result<IndexMetadata> {
    fs::create_dir_all(dir)?;

    let payload = bincode::serialize(index)?;
    let checksum = crc32fast::hash(&payload);

    let mut out = BufWriter::new(File::create(dir.join(INDEX_FILE))?);
    out.write_u32::<LittleEndian>(MAGIC)?;
    out.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    out.write_u64::<LittleEndian>(payload.len() as u64)?;
    out.write_all(&payload)?;
    out.write_u32::<LittleEndian>(checksum)?;
    out.flush()?;

    let metadata = IndexMetadata {
        format_version: FORMAT_VERSION,
        created_at: Utc::now(),
        doc_count: index.doc_count(),
        fields: index.field_names().into_iter().map(str::to_string).collect(),
    };
    let mut meta_out = BufWriter::new(File::create(dir.join(METADATA_FILE))?);
    serde_json::to_writer_pretty(&mut meta_out, &metadata)?;
    meta_out.flush()?;

    Ok(metadata)
}

/// Read the metadata of the snapshot in `dir`.
pub fn read_metadata(dir: &Path) -> Result<IndexMetadata> {
    let path = dir.join(METADATA_FILE);
    let file = File::open(&path).map_err(|e| {
        RicochetError::index_unavailable(format!("cannot open {}: {e}", path.display()))
    })?;
    let metadata: IndexMetadata = serde_json::from_reader(file).map_err(|e| {
        RicochetError::index_unavailable(format!("malformed {}: {e}", path.display()))
    })?;

    if metadata.format_version != FORMAT_VERSION {
        return Err(RicochetError::index_unavailable(format!(
            "unsupported format version {} (expected {FORMAT_VERSION})",
            metadata.format_version
        )));
    }

    Ok(metadata)
}

/// Load the snapshot in `dir`.
pub fn read(dir: &Path) -> Result<MemoryIndex> {
    let metadata = read_metadata(dir)?;

    let path = dir.join(INDEX_FILE);
    let mut bytes = Vec::new();
    File::open(&path)
        .and_then(|mut file| file.read_to_end(&mut bytes))
        .map_err(|e| {
            RicochetError::index_unavailable(format!("cannot read {}: {e}", path.display()))
        })?;

    let index = decode(&bytes)?;
    if index.doc_count() != metadata.doc_count {
        return Err(RicochetError::index_unavailable(format!(
            "document count mismatch: metadata says {}, index holds {}",
            metadata.doc_count,
            index.doc_count()
        )));
    }

    Ok(index)
}

fn decode(bytes: &[u8]) -> Result<MemoryIndex> {
    let truncated = |_: std::io::Error| RicochetError::index_unavailable("truncated index file");

    let mut cursor = Cursor::new(bytes);
    let magic = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    if magic != MAGIC {
        return Err(RicochetError::index_unavailable(format!(
            "bad magic number {magic:#010x}"
        )));
    }

    let version = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    if version != FORMAT_VERSION {
        return Err(RicochetError::index_unavailable(format!(
            "unsupported format version {version} (expected {FORMAT_VERSION})"
        )));
    }

    let len = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
    let start = cursor.position() as usize;
    let end = usize::try_from(len)
        .ok()
        .and_then(|len| start.checked_add(len))
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| RicochetError::index_unavailable("truncated index file"))?;
    let payload = &bytes[start..end];

    cursor.set_position(end as u64);
    let stored_checksum = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    let checksum = crc32fast::hash(payload);
    if checksum != stored_checksum {
        return Err(RicochetError::index_unavailable(format!(
            "checksum mismatch: stored {stored_checksum:#010x}, computed {checksum:#010x}"
        )));
    }

    bincode::deserialize(payload)
        .map_err(|e| RicochetError::index_unavailable(format!("undecodable index payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::document::Document;
    use tempfile::TempDir;

    fn sample_index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        let doc = index.push_document(Document::builder().add_text("id", "p1").build());
        index.index_field(
            doc,
            "paragraph",
            &["alpha".to_string(), "beta".to_string()],
            true,
        );
        index
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let index = sample_index();

        let metadata = write(&index, temp_dir.path()).unwrap();
        assert_eq!(metadata.doc_count, 1);
        assert_eq!(metadata.fields, vec!["paragraph"]);

        let loaded = read(temp_dir.path()).unwrap();
        assert_eq!(loaded, index);
        assert_eq!(read_metadata(temp_dir.path()).unwrap(), metadata);
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = read(&temp_dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RicochetError::IndexUnavailable(_)));
    }

    #[test]
    fn test_corrupt_payload_fails_checksum() {
        let temp_dir = TempDir::new().unwrap();
        write(&sample_index(), temp_dir.path()).unwrap();

        let path = temp_dir.path().join(INDEX_FILE);
        let mut bytes = fs::read(&path).unwrap();
        let middle = 16 + (bytes.len() - 20) / 2;
        bytes[middle] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        let err = read(temp_dir.path()).unwrap_err();
        match err {
            RicochetError::IndexUnavailable(msg) => assert!(msg.contains("checksum")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_magic_and_truncation() {
        assert!(matches!(
            decode(b"NOPE").unwrap_err(),
            RicochetError::IndexUnavailable(_)
        ));
        assert!(matches!(
            decode(&[0x52, 0x43]).unwrap_err(),
            RicochetError::IndexUnavailable(_)
        ));

        let mut header = Vec::new();
        header.write_u32::<LittleEndian>(MAGIC).unwrap();
        header.write_u32::<LittleEndian>(FORMAT_VERSION).unwrap();
        header.write_u64::<LittleEndian>(1_000).unwrap();
        assert!(matches!(
            decode(&header).unwrap_err(),
            RicochetError::IndexUnavailable(_)
        ));
    }
}
