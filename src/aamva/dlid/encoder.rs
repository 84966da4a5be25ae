//! Compliance string serialization.
use tracing::{debug, trace};

use super::{
    config::{EncodeOptions, FieldDelimiting},
    decoder::{recognizer, split_concatenated, RawField},
    error::EncodingError,
    pdf_417::{
        Header, SubfileDesignator, DATA_ELEMENT_SEPARATOR, HEADER_SIZE, MAX_DESIGNATOR_VALUE,
        SEGMENT_TERMINATOR, SUBFILE_DESIGNATOR_SIZE,
    },
    registry::AamvaVersion,
    subfile::{FieldCode, Subfile},
    validation::Validator,
};

/// Most subfiles the two digit entry count can declare.
const MAX_SUBFILES: usize = 99;

/// Encodes `subfiles`, in order, under the default options for `version`.
pub fn encode(subfiles: &[Subfile], version: AamvaVersion, iin: &str) -> Result<String, EncodingError> {
    encode_with(subfiles, iin, &EncodeOptions::new(version))
}

pub fn encode_with(
    subfiles: &[Subfile],
    iin: &str,
    options: &EncodeOptions,
) -> Result<String, EncodingError> {
    if subfiles.is_empty() {
        return Err(EncodingError::NoSubfiles);
    }

    if !subfiles.iter().any(|s| matches!(s, Subfile::Dl(_))) {
        return Err(EncodingError::MissingDocument);
    }

    if subfiles.len() > MAX_SUBFILES {
        return Err(EncodingError::TooManySubfiles(subfiles.len()));
    }

    if options.jurisdiction_version > 99 {
        return Err(EncodingError::InvalidJurisdictionVersion(
            options.jurisdiction_version,
        ));
    }

    let iin = normalize_iin(iin)?;
    let version = options.version;

    if options.validate {
        let result = Validator::new(version)
            .strict(options.strict)
            .with_iin(iin.as_str())
            .validate(subfiles);

        if !result.is_valid() {
            return Err(EncodingError::Validation(result.summary()));
        }
    }

    let bodies = subfiles
        .iter()
        .map(|subfile| encode_subfile(subfile, version, options.delimiting))
        .collect::<Result<Vec<_>, _>>()?;

    // Without a single separator the decoder reads the file as concatenated.
    if options.delimiting == FieldDelimiting::Separated
        && !bodies.iter().any(|b| b.contains(DATA_ELEMENT_SEPARATOR as char))
    {
        for (subfile, body) in subfiles.iter().zip(&bodies) {
            let content = &body[2..body.len() - 1];
            check_boundaries(subfile, &subfile.encoding_order(version), content)?;
        }
    }

    let mut header = Header::new(iin, version, options.jurisdiction_version);
    header.number_of_entries = subfiles.len() as u8;

    let mut offset = HEADER_SIZE + SUBFILE_DESIGNATOR_SIZE * subfiles.len();
    for (subfile, body) in subfiles.iter().zip(&bodies) {
        let designator = SubfileDesignator {
            subfile_type: subfile.subfile_type(),
            offset,
            length: body.len(),
        };

        if designator.offset > MAX_DESIGNATOR_VALUE || designator.length > MAX_DESIGNATOR_VALUE {
            return Err(EncodingError::SubfileTooLarge {
                subfile_type: designator.subfile_type.to_string(),
                end: designator.end(),
            });
        }

        trace!(
            subfile_type = %designator.subfile_type,
            offset = designator.offset,
            length = designator.length,
            "subfile designator"
        );
        offset = designator.end();
        header.designators.push(designator);
    }

    let mut out = String::with_capacity(offset);
    header.encode(&mut out);
    for body in &bodies {
        out.push_str(body);
    }

    debug!(
        iin = %header.iin,
        version = %version,
        subfiles = subfiles.len(),
        bytes = out.len(),
        "encoded compliance string"
    );
    Ok(out)
}

/// Keeps the digits of `iin`, left-padded with zeros to six.
fn normalize_iin(iin: &str) -> Result<String, EncodingError> {
    let iin = iin.trim();
    if iin.is_empty() || iin.len() > 6 || !iin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EncodingError::InvalidIin(iin.to_owned()));
    }

    Ok(format!("{iin:0>6}"))
}

/// Checks the fields of `subfile` and renders its body, subfile type and
/// segment terminator included.
fn encode_subfile(
    subfile: &Subfile,
    version: AamvaVersion,
    delimiting: FieldDelimiting,
) -> Result<String, EncodingError> {
    let subfile_type = subfile.subfile_type();

    if let Subfile::Dl(dl) = subfile {
        if let Some(missing) = dl.kind().mandatory_elements(version).find(|e| dl.get(*e).is_none()) {
            return Err(EncodingError::MissingMandatoryField {
                subfile_type: subfile_type.to_string(),
                code: missing.code(),
            });
        }

        for (e, value) in dl.elements() {
            let definition = e.definition();
            let length = value.chars().count();
            if length > definition.max_length {
                return Err(EncodingError::FieldTooLong {
                    code: definition.code,
                    length,
                    max: definition.max_length,
                });
            }
        }
    }

    let fields = subfile.encoding_order(version);
    if let Some((code, _)) = fields
        .iter()
        .find(|(_, value)| value.chars().any(|c| c.is_ascii_control()))
    {
        return Err(EncodingError::InvalidCharacter {
            code: code.to_string(),
        });
    }

    let mut content = String::new();
    for (i, (code, value)) in fields.iter().enumerate() {
        if i > 0 && delimiting == FieldDelimiting::Separated {
            content.push(DATA_ELEMENT_SEPARATOR as char);
        }
        content.push_str(code.as_str());
        content.push_str(value);
    }

    if delimiting == FieldDelimiting::Concatenated {
        check_boundaries(subfile, &fields, &content)?;
    }

    let mut body = String::with_capacity(2 + content.len() + 1);
    body.push_str(subfile_type.as_str());
    body.push_str(&content);
    body.push(SEGMENT_TERMINATOR as char);
    Ok(body)
}

/// Ensures a concatenated body splits back into exactly `fields`.
fn check_boundaries(
    subfile: &Subfile,
    fields: &[(FieldCode, &str)],
    content: &str,
) -> Result<(), EncodingError> {
    let subfile_type = subfile.subfile_type();
    let decoded = split_concatenated(content.as_bytes(), recognizer(subfile_type));

    let mismatch = fields.iter().enumerate().find(|(i, (code, value))| {
        !matches!(
            decoded.get(*i),
            Some(RawField::Field { code: c, value: v, .. }) if c == code && *v == value.as_bytes()
        )
    });

    match mismatch {
        Some((_, (code, _))) => Err(EncodingError::AmbiguousBoundary {
            subfile_type: subfile_type.to_string(),
            code: code.to_string(),
        }),
        None if decoded.len() != fields.len() => Err(EncodingError::AmbiguousBoundary {
            subfile_type: subfile_type.to_string(),
            code: fields.last().map(|(c, _)| c.to_string()).unwrap_or_default(),
        }),
        None => Ok(()),
    }
}
