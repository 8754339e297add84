//! RST dependency (`.rsd`) file parsing
//!
//! Each usable line is a tab-separated record with at least eight fields.
//! Only two of them matter here: field 0 is the discourse unit's identifier
//! and field 6 is the identifier of its head (0 for a root). Lines with
//! fewer than eight fields are dropped without complaint.

use crate::bytes::{parse_head, parse_id, split_fields};
use crate::tree::{Head, NodeId};
use bstr::ByteSlice;
use flate2::read::MultiGzDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Minimum number of fields on a usable line
pub const MIN_FIELDS: usize = 8;

const ID_FIELD: usize = 0;
const HEAD_FIELD: usize = 6;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One dependency record: a node and the node that governs it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub id: NodeId,
    /// Governing node, 0 for a root; negative heads attach nowhere
    pub head: Head,
}

impl Record {
    pub fn new(id: NodeId, head: Head) -> Self {
        Self { id, head }
    }

    pub fn is_root(&self) -> bool {
        self.head == 0
    }
}

/// Which of the two required fields failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Head,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Id => write!(f, "ID"),
            Field::Head => write!(f, "HEAD"),
        }
    }
}

/// A required field is not an integer (or, for ID, is negative)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {line_num}: invalid {field} field {value:?}")]
pub struct ParseError {
    pub line_num: usize,
    pub field: Field,
    pub value: String,
}

/// Error reading records from a file
#[derive(Debug, Error)]
pub enum RsdError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Parse the records of one document, in file order
pub fn parse_records(data: &[u8]) -> Result<Vec<Record>, ParseError> {
    let mut records = Vec::new();
    for (idx, line) in data.lines().enumerate() {
        if let Some(record) = parse_line(line, idx + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Read and parse one `.rsd` file
///
/// Gzip-compressed files are recognised by their magic bytes and
/// decompressed on the fly, whatever their extension.
pub fn read_records(path: &Path) -> Result<Vec<Record>, RsdError> {
    let io_err = |source| RsdError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut data = std::fs::read(path).map_err(io_err)?;
    if data.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::with_capacity(data.len() * 4);
        MultiGzDecoder::new(data.as_slice())
            .read_to_end(&mut inflated)
            .map_err(io_err)?;
        data = inflated;
    }

    Ok(parse_records(&data)?)
}

/// Parse a single line; `None` for lines too short to be a record
fn parse_line(line: &[u8], line_num: usize) -> Result<Option<Record>, ParseError> {
    let mut fields = split_fields(line);
    let Some(id) = fields.next() else {
        return Ok(None);
    };
    // nth counts from the field after ID
    let Some(head) = fields.nth(HEAD_FIELD - ID_FIELD - 1) else {
        return Ok(None);
    };
    if fields.nth(MIN_FIELDS - HEAD_FIELD - 2).is_none() {
        return Ok(None);
    }

    let id = parse_field(id, Field::Id, line_num, parse_id)?;
    let head = parse_field(head, Field::Head, line_num, parse_head)?;
    Ok(Some(Record { id, head }))
}

fn parse_field<T>(
    bytes: &[u8],
    field: Field,
    line_num: usize,
    parse: impl FnOnce(&[u8]) -> Option<T>,
) -> Result<T, ParseError> {
    parse(bytes).ok_or_else(|| ParseError {
        line_num,
        field,
        value: bytes.to_str_lossy().into_owned(),
    })
}
