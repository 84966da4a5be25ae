/// AAMVA DL/ID Card Design Standard.
///
/// See: <https://www.aamva.org/assets/best-practices,-guides,-standards,-manuals,-whitepapers/aamva-dl-id-card-design-standard-(2020)>
mod macros;

pub(crate) use macros::*;

pub mod types;

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod format;
pub mod iin;
pub mod pdf_417;
pub mod registry;
pub mod subfile;
pub mod validation;

pub use config::{DecodeOptions, EncodeOptions, FieldDelimiting};
pub use decoder::{decode, decode_with, DecodeWarning, DecodedFile};
pub use encoder::{encode, encode_with};
pub use error::{DecodingError, EncodingError, SubfileError, UnknownFieldError, ValidationError};
pub use iin::{get_iin_by_state, get_state_by_iin, Jurisdiction};
pub use pdf_417::{Header, Separators, SubfileDesignator};
pub use registry::{
    get_field_definition, get_mandatory_fields, validate_field, AamvaVersion, DataElement,
    DocumentKind, UnsupportedVersion,
};
pub use subfile::{DlSubfile, FieldCode, JurisdictionSubfile, Subfile, SubfileType};
pub use types::{Category, DataType, FieldDefinition, InvalidFieldValue};
pub use validation::{validate, IssueCode, Severity, ValidationIssue, ValidationResult, Validator};
