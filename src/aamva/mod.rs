pub mod dlid;

pub use dlid::{
    get_field_definition, get_iin_by_state, get_mandatory_fields, get_state_by_iin, AamvaVersion,
    DataElement, DecodedFile, DecodingError, DlSubfile, EncodingError, JurisdictionSubfile,
    Subfile, ValidationError, ValidationResult,
};

/// Encodes a driver license from `(code, value)` pairs.
///
/// The issuer IIN is looked up from the address jurisdiction (`DAJ`), which
/// also names the jurisdiction subfile holding `jurisdiction_fields`.
pub fn encode_license_data<K, V>(
    fields: &[(K, V)],
    jurisdiction_fields: Option<&[(K, V)]>,
    version: &str,
) -> Result<String, EncodingError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let version: AamvaVersion = version.parse()?;

    let mut dl = DlSubfile::new();
    for (code, value) in fields {
        dl.add_field(code.as_ref(), value.as_ref())?;
    }

    let abbr = dl
        .get(DataElement::AddressJurisdictionCode)
        .ok_or(EncodingError::MissingMandatoryField {
            subfile_type: dl.subfile_type().to_string(),
            code: DataElement::AddressJurisdictionCode.code(),
        })?;
    let iin = get_iin_by_state(abbr).ok_or_else(|| EncodingError::UnknownJurisdiction(abbr.to_owned()))?;

    let jurisdiction = match jurisdiction_fields {
        Some(jurisdiction_fields) if !jurisdiction_fields.is_empty() => {
            let mut subfile = JurisdictionSubfile::for_jurisdiction(abbr)?;
            for (code, value) in jurisdiction_fields {
                subfile.add_field(code.as_ref(), value.as_ref())?;
            }
            Some(subfile)
        }
        _ => None,
    };

    let mut subfiles = vec![Subfile::from(dl)];
    subfiles.extend(jurisdiction.map(Subfile::from));
    dlid::encode(&subfiles, version, iin)
}

pub fn decode_license_data(input: &str, strict: bool) -> Result<DecodedFile, DecodingError> {
    dlid::decode(input, strict)
}

pub fn validate_license_data(
    subfiles: &[Subfile],
    version: &str,
    strict: bool,
) -> Result<ValidationResult, ValidationError> {
    let version: AamvaVersion = version.parse()?;
    Ok(dlid::validate(subfiles, version, strict))
}
