//! Byte layout of the AAMVA compliance string carried by the PDF417 barcode.
//!
//! ```plain
//! @ LF RS CR "ANSI " IIIIII VV JJ NN   header (21 bytes)
//! TT OOOO LLLL                          one designator per subfile (10 bytes)
//! TT CODEvalue LF CODEvalue ... CR      subfile bodies
//! ```
use serde::Serialize;

use super::{
    error::DecodingError,
    registry::AamvaVersion,
    subfile::SubfileType,
};

pub const COMPLIANCE_INDICATOR: u8 = b'@';

pub const DATA_ELEMENT_SEPARATOR: u8 = b'\n';

pub const RECORD_SEPARATOR: u8 = 0x1e;

pub const SEGMENT_TERMINATOR: u8 = b'\r';

pub const FILE_TYPE: [u8; 5] = *b"ANSI ";

pub const HEADER_SIZE: usize = 4 + 5 + 6 + 2 + 2 + 2;

pub const SUBFILE_DESIGNATOR_SIZE: usize = 2 + 4 + 4;

/// Largest offset or length a designator can express.
pub const MAX_DESIGNATOR_VALUE: usize = 9999;

/// Control characters framing the file, as read from (or written to) the
/// header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Separators {
    pub data_element: u8,
    pub record: u8,
    pub segment_terminator: u8,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            data_element: DATA_ELEMENT_SEPARATOR,
            record: RECORD_SEPARATOR,
            segment_terminator: SEGMENT_TERMINATOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub compliance_indicator: u8,
    pub separators: Separators,
    pub file_type: String,
    pub iin: String,
    pub aamva_version: AamvaVersion,
    pub jurisdiction_version: u8,
    pub number_of_entries: u8,
    pub designators: Vec<SubfileDesignator>,
}

impl Header {
    pub fn new(iin: String, aamva_version: AamvaVersion, jurisdiction_version: u8) -> Self {
        Self {
            compliance_indicator: COMPLIANCE_INDICATOR,
            separators: Separators::default(),
            file_type: String::from_utf8_lossy(&FILE_TYPE).into_owned(),
            iin,
            aamva_version,
            jurisdiction_version,
            number_of_entries: 0,
            designators: Vec::new(),
        }
    }

    /// Size of the header and designators, i.e. the offset of the first
    /// subfile.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + SUBFILE_DESIGNATOR_SIZE * self.designators.len()
    }

    pub fn encode(&self, out: &mut String) {
        out.push(self.compliance_indicator as char);
        out.push(self.separators.data_element as char);
        out.push(self.separators.record as char);
        out.push(self.separators.segment_terminator as char);
        out.push_str(&self.file_type);
        out.push_str(&self.iin);
        push_digits(out, self.aamva_version.number() as usize, 2);
        push_digits(out, self.jurisdiction_version as usize, 2);
        push_digits(out, self.number_of_entries as usize, 2);

        for designator in &self.designators {
            designator.encode(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubfileDesignator {
    pub subfile_type: SubfileType,

    /// Byte offset of the subfile from the start of the file.
    pub offset: usize,

    /// Byte length of the subfile, type and segment terminator included.
    pub length: usize,
}

impl SubfileDesignator {
    pub fn encode(&self, out: &mut String) {
        out.push_str(self.subfile_type.as_str());
        push_digits(out, self.offset, 4);
        push_digits(out, self.length, 4);
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

fn push_digits(out: &mut String, value: usize, width: usize) {
    out.push_str(&format!("{value:0width$}"));
}

/// Bounds-checked reader over the raw file.
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodingError> {
        let end = self.position + N;
        let bytes = self.data.get(self.position..end).ok_or(DecodingError::Truncated {
            needed: end,
            available: self.data.len(),
        })?;

        let mut buffer = [0; N];
        buffer.copy_from_slice(bytes);
        self.position = end;
        Ok(buffer)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodingError> {
        self.read_array::<1>().map(|[b]| b)
    }

    /// Reads a fixed-width decimal number.
    pub fn read_digits<const N: usize>(&mut self, field: &'static str) -> Result<usize, DecodingError> {
        let offset = self.position;
        decode_digits(&self.read_array::<N>()?)
            .ok_or(DecodingError::InvalidHeaderField { field, offset })
    }
}

pub(crate) fn decode_digit(d: u8) -> Option<usize> {
    if d.is_ascii_digit() {
        Some((d - b'0') as usize)
    } else {
        None
    }
}

pub(crate) fn decode_digits(digits: &[u8]) -> Option<usize> {
    digits
        .iter()
        .try_fold(0usize, |acc, d| Some(acc * 10 + decode_digit(*d)?))
}
