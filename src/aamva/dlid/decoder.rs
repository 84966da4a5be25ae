//! Compliance string parsing.
//!
//! In strict mode any malformation is an error. Otherwise the decoder
//! recovers where it can and records a [`DecodeWarning`] instead; only an
//! unreadable header is always fatal.
use std::fmt;

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::{
    config::DecodeOptions,
    error::DecodingError,
    pdf_417::{
        decode_digits, Cursor, Header, SubfileDesignator, Separators, COMPLIANCE_INDICATOR,
        FILE_TYPE, HEADER_SIZE, SUBFILE_DESIGNATOR_SIZE,
    },
    registry::AamvaVersion,
    subfile::{DlSubfile, FieldCode, JurisdictionSubfile, Subfile, SubfileType},
    validation::{ValidationResult, Validator},
};

/// Malformation the decoder recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeWarning {
    /// Byte offset of the problem, when it has one.
    pub offset: Option<usize>,
    pub message: String,
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "byte {offset}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFile {
    pub header: Header,
    pub subfiles: Vec<Subfile>,

    /// Always empty after a strict decode.
    pub warnings: Vec<DecodeWarning>,
}

impl DecodedFile {
    pub fn subfile(&self, subfile_type: &str) -> Option<&Subfile> {
        self.subfiles
            .iter()
            .find(|s| s.subfile_type().as_str() == subfile_type)
    }

    /// First DL or ID subfile.
    pub fn document(&self) -> Option<&DlSubfile> {
        self.subfiles.iter().find_map(Subfile::as_dl)
    }

    /// Validates the subfiles against the version and IIN of the header.
    pub fn validate(&self, strict: bool) -> ValidationResult {
        Validator::new(self.header.aamva_version)
            .strict(strict)
            .with_iin(self.header.iin.as_str())
            .validate(&self.subfiles)
    }
}

pub fn decode(input: impl AsRef<[u8]>, strict: bool) -> Result<DecodedFile, DecodingError> {
    decode_with(input, &DecodeOptions { strict })
}

pub fn decode_with(input: impl AsRef<[u8]>, options: &DecodeOptions) -> Result<DecodedFile, DecodingError> {
    let mut decoder = Decoder {
        data: input.as_ref(),
        strict: options.strict,
        warnings: Vec::new(),
    };

    let header = decoder.header()?;
    debug!(
        iin = %header.iin,
        version = %header.aamva_version,
        entries = header.number_of_entries,
        "decoding compliance string"
    );

    let subfiles = decoder.subfiles(&header)?;
    Ok(DecodedFile {
        header,
        subfiles,
        warnings: decoder.warnings,
    })
}

/// Field as cut out of a subfile body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawField<'a> {
    Field {
        code: FieldCode,
        value: &'a [u8],

        /// Offset of the code within the body.
        offset: usize,
    },

    /// Bytes that do not start with a field code.
    Garbage { offset: usize },
}

/// Splits a body whose fields are delimited by `separator`.
pub(crate) fn split_separated(content: &[u8], separator: u8) -> Vec<RawField<'_>> {
    let mut fields = Vec::new();
    let mut offset = 0;

    for piece in content.split(|b| *b == separator) {
        match FieldCode::from_bytes(piece) {
            Some(code) => fields.push(RawField::Field {
                code,
                value: &piece[3..],
                offset,
            }),
            None if piece.is_empty() => (),
            None => fields.push(RawField::Garbage { offset }),
        }

        offset += piece.len() + 1;
    }

    fields
}

/// Splits a body of directly concatenated fields. A value runs up to the
/// next code `recognizes` accepts.
pub(crate) fn split_concatenated(
    content: &[u8],
    recognizes: impl Fn(FieldCode) -> bool,
) -> Vec<RawField<'_>> {
    let code_at = |p: usize| FieldCode::from_bytes(&content[p..]).filter(|c| recognizes(*c));
    let boundary = |from: usize| {
        (from..content.len())
            .find(|p| code_at(*p).is_some())
            .unwrap_or(content.len())
    };

    let mut fields = Vec::new();
    let mut position = 0;

    if !content.is_empty() && code_at(0).is_none() {
        fields.push(RawField::Garbage { offset: 0 });
        position = boundary(0);
    }

    while let Some(code) = (position < content.len()).then(|| code_at(position)).flatten() {
        let end = boundary(position + 3);
        fields.push(RawField::Field {
            code,
            value: &content[position + 3..end],
            offset: position,
        });
        position = end;
    }

    fields
}

/// Codes that may open a field of a `subfile_type` subfile: registry
/// elements for DL and ID subfiles, codes prefixed by the subfile type
/// otherwise.
pub(crate) fn recognizer(subfile_type: SubfileType) -> impl Fn(FieldCode) -> bool {
    let document = subfile_type.document_kind().is_some();
    move |code| {
        if document {
            code.element().is_some()
        } else {
            code.as_bytes()[..2] == subfile_type.as_bytes()[..]
        }
    }
}

/// Located subfile, before field splitting.
struct RawSubfile<'a> {
    subfile_type: SubfileType,

    /// Absolute offset of the subfile type.
    start: usize,

    /// Absolute offset of `content`.
    content_start: usize,

    /// Fields, without the subfile type and the segment terminator.
    content: &'a [u8],

    /// Whether the segment terminator was found.
    complete: bool,

    /// Absolute end of the subfile.
    end: usize,
}

struct Decoder<'a> {
    data: &'a [u8],
    strict: bool,
    warnings: Vec<DecodeWarning>,
}

impl<'a> Decoder<'a> {
    /// Fails in strict mode, records a warning otherwise.
    fn tolerate(&mut self, offset: Option<usize>, error: DecodingError) -> Result<(), DecodingError> {
        if self.strict {
            return Err(error);
        }

        warn!(?offset, %error, "recovered from malformed compliance string");
        self.warnings.push(DecodeWarning {
            offset,
            message: error.to_string(),
        });
        Ok(())
    }

    fn header(&mut self) -> Result<Header, DecodingError> {
        if self.data.first() != Some(&COMPLIANCE_INDICATOR) {
            return Err(DecodingError::MissingComplianceIndicator);
        }

        if self.data.len() < HEADER_SIZE {
            return Err(DecodingError::Truncated {
                needed: HEADER_SIZE,
                available: self.data.len(),
            });
        }

        let mut cursor = Cursor::new(self.data);
        let compliance_indicator = cursor.read_u8()?;

        let [data_element, record, segment_terminator] = cursor.read_array::<3>()?;
        let separators = Separators {
            data_element,
            record,
            segment_terminator,
        };
        let expected = Separators::default();
        let read = [data_element, record, segment_terminator];
        if read.iter().any(u8::is_ascii_alphanumeric) {
            return Err(DecodingError::InvalidHeaderField {
                field: "separators",
                offset: 1,
            });
        }
        if let Some(i) = read
            .iter()
            .zip([expected.data_element, expected.record, expected.segment_terminator])
            .position(|(a, b)| *a != b)
        {
            let offset = 1 + i;
            self.tolerate(Some(offset), DecodingError::UnexpectedControlCharacter { offset })?;
        }

        let file_type = cursor.read_array::<5>()?;
        if file_type != FILE_TYPE {
            self.tolerate(Some(4), DecodingError::InvalidFileType)?;
        }

        let iin_offset = cursor.position();
        let iin = cursor.read_array::<6>()?;
        if decode_digits(&iin).is_none() {
            return Err(DecodingError::InvalidHeaderField {
                field: "iin",
                offset: iin_offset,
            });
        }

        let version = cursor.read_digits::<2>("aamva_version")?;
        let aamva_version = AamvaVersion::new(version as u8)?;
        let jurisdiction_version = cursor.read_digits::<2>("jurisdiction_version")? as u8;
        let number_of_entries = cursor.read_digits::<2>("number_of_entries")? as u8;

        let mut designators = Vec::with_capacity(number_of_entries as usize);
        for _ in 0..number_of_entries {
            let offset = cursor.position();
            let raw = match cursor.read_array::<SUBFILE_DESIGNATOR_SIZE>() {
                Ok(raw) => raw,
                Err(e) => {
                    self.tolerate(Some(offset), e)?;
                    break;
                }
            };

            let Some(subfile_type) = SubfileType::from_bytes(&raw) else {
                self.tolerate(
                    Some(offset),
                    DecodingError::InvalidHeaderField {
                        field: "subfile_type",
                        offset,
                    },
                )?;
                continue;
            };

            let (Some(subfile_offset), Some(length)) =
                (decode_digits(&raw[2..6]), decode_digits(&raw[6..]))
            else {
                self.tolerate(
                    Some(offset + 2),
                    DecodingError::InvalidHeaderField {
                        field: "subfile_designator",
                        offset: offset + 2,
                    },
                )?;
                continue;
            };

            designators.push(SubfileDesignator {
                subfile_type,
                offset: subfile_offset,
                length,
            });
        }

        Ok(Header {
            compliance_indicator,
            separators,
            file_type: String::from_utf8_lossy(&file_type).into_owned(),
            iin: String::from_utf8_lossy(&iin).into_owned(),
            aamva_version,
            jurisdiction_version,
            number_of_entries,
            designators,
        })
    }

    fn subfiles(&mut self, header: &Header) -> Result<Vec<Subfile>, DecodingError> {
        let separators = header.separators;
        let mut end = HEADER_SIZE + SUBFILE_DESIGNATOR_SIZE * header.number_of_entries as usize;
        let mut last_type = None;
        let mut raw_subfiles = Vec::with_capacity(header.designators.len());

        for designator in &header.designators {
            let Some(raw) = self.slice(designator, end, &separators)? else {
                continue;
            };

            // Subfiles follow each other with nothing in between.
            if raw.start != end {
                self.tolerate(
                    Some(raw.start),
                    DecodingError::MisplacedSubfile {
                        subfile_type: raw.subfile_type.to_string(),
                        start: raw.start,
                        expected: end,
                    },
                )?;
            }

            end = raw.end;
            last_type = Some(raw.subfile_type);
            raw_subfiles.push(raw);
        }

        if end < self.data.len() {
            let count = self.data.len() - end;
            let error = match last_type {
                Some(subfile_type) => DecodingError::TrailingData {
                    subfile_type: subfile_type.to_string(),
                    count,
                },
                None => DecodingError::TrailingHeaderData { count },
            };
            self.tolerate(Some(end), error)?;
        }

        // A file is either separated or concatenated throughout.
        let separated = raw_subfiles
            .iter()
            .any(|raw| raw.content.contains(&separators.data_element));

        raw_subfiles
            .into_iter()
            .map(|raw| self.fields(raw, separated, separators.data_element))
            .collect()
    }

    /// Locates the subfile of `designator`, returning `None` when it cannot
    /// be found.
    fn slice(
        &mut self,
        designator: &SubfileDesignator,
        search_from: usize,
        separators: &Separators,
    ) -> Result<Option<RawSubfile<'a>>, DecodingError> {
        let data = self.data;
        let subfile_type = designator.subfile_type;
        let marker = subfile_type.as_bytes();

        if designator.offset >= data.len() {
            self.tolerate(
                Some(designator.offset),
                DecodingError::Truncated {
                    needed: designator.end(),
                    available: data.len(),
                },
            )?;
            return Ok(None);
        }

        let start = if data[designator.offset..].starts_with(marker) {
            designator.offset
        } else {
            self.tolerate(
                Some(designator.offset),
                DecodingError::SubfileTypeMismatch {
                    expected: subfile_type.to_string(),
                    offset: designator.offset,
                },
            )?;

            let found = data
                .get(search_from..)
                .and_then(|rest| rest.windows(2).position(|w| w == marker))
                .map(|p| p + search_from);

            match found {
                Some(start) => {
                    debug!(%subfile_type, declared = designator.offset, start, "relocated subfile");
                    start
                }
                None => return Ok(None),
            }
        };

        let available = data.len() - start;
        let length = if designator.length > available {
            self.tolerate(
                Some(start),
                DecodingError::LengthMismatch {
                    subfile_type: subfile_type.to_string(),
                    declared: designator.length,
                    available,
                },
            )?;
            available
        } else {
            designator.length
        };

        trace!(%subfile_type, start, length, "subfile boundary");

        let content_start = (start + 2).min(start + length);
        let body = &data[content_start..start + length];

        let (content, complete) = match body
            .iter()
            .position(|b| *b == separators.segment_terminator)
        {
            Some(t) => {
                if t + 1 < body.len() {
                    self.tolerate(
                        Some(content_start + t + 1),
                        DecodingError::TrailingData {
                            subfile_type: subfile_type.to_string(),
                            count: body.len() - t - 1,
                        },
                    )?;
                }
                (&body[..t], true)
            }
            None => {
                self.tolerate(
                    Some(start + length),
                    DecodingError::MissingSegmentTerminator {
                        subfile_type: subfile_type.to_string(),
                    },
                )?;
                (body, false)
            }
        };

        Ok(Some(RawSubfile {
            subfile_type,
            start,
            content_start,
            content,
            complete,
            end: start + length,
        }))
    }

    fn fields(
        &mut self,
        raw: RawSubfile<'a>,
        separated: bool,
        separator: u8,
    ) -> Result<Subfile, DecodingError> {
        let subfile_type = raw.subfile_type;

        let mut fields = if separated {
            split_separated(raw.content, separator)
        } else {
            split_concatenated(raw.content, recognizer(subfile_type))
        };

        // Without a terminator the last field may be cut short.
        if !raw.complete && !(separated && raw.content.ends_with(&[separator])) {
            if let Some(RawField::Field { code, .. }) = fields.pop() {
                debug!(%subfile_type, %code, "dropped unterminated field");
            }
        }

        let mut subfile: Subfile = match subfile_type.document_kind() {
            Some(kind) => DlSubfile::with_kind(kind).into(),
            None => JurisdictionSubfile::new(subfile_type).into(),
        };

        for field in fields {
            match field {
                RawField::Garbage { offset } => {
                    let offset = raw.content_start + offset;
                    self.tolerate(
                        Some(offset),
                        DecodingError::UnparseableField {
                            subfile_type: subfile_type.to_string(),
                            offset,
                        },
                    )?;
                }
                RawField::Field {
                    code,
                    value,
                    offset,
                } => {
                    let offset = raw.content_start + offset;
                    let Ok(value) = std::str::from_utf8(value) else {
                        self.tolerate(
                            Some(offset),
                            DecodingError::InvalidUtf8 {
                                code: code.to_string(),
                            },
                        )?;
                        continue;
                    };

                    if subfile.add_field(code.as_str(), value).is_err() {
                        self.tolerate(
                            Some(offset),
                            DecodingError::DuplicateField {
                                subfile_type: subfile_type.to_string(),
                                code: code.to_string(),
                            },
                        )?;
                    }
                }
            }
        }

        Ok(subfile)
    }
}
