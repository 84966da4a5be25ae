use super::registry::UnsupportedVersion;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field code `{0}`")]
pub struct UnknownFieldError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubfileError {
    #[error("invalid field code `{0}`: expected three uppercase ASCII letters")]
    InvalidFieldCode(String),

    #[error("invalid subfile type `{0}`: expected two uppercase ASCII letters")]
    InvalidSubfileType(String),

    #[error("field `{code}` is already set to a different value")]
    DuplicateField { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("no subfile to encode")]
    NoSubfiles,

    #[error("no DL or ID subfile to encode")]
    MissingDocument,

    #[error("mandatory field `{code}` is missing from the {subfile_type} subfile")]
    MissingMandatoryField {
        subfile_type: String,
        code: &'static str,
    },

    #[error("field `{code}` is {length} characters long, maximum is {max}")]
    FieldTooLong {
        code: &'static str,
        length: usize,
        max: usize,
    },

    #[error("field `{code}` contains a reserved control character")]
    InvalidCharacter { code: String },

    #[error("value of field `{code}` in subfile `{subfile_type}` would not decode back without separators")]
    AmbiguousBoundary { subfile_type: String, code: String },

    #[error("invalid issuer identification number `{0}`")]
    InvalidIin(String),

    #[error("no issuer identification number known for jurisdiction `{0}`")]
    UnknownJurisdiction(String),

    #[error("jurisdiction version {0} does not fit in two digits")]
    InvalidJurisdictionVersion(u8),

    #[error("{0} subfiles do not fit in a header (maximum is 99)")]
    TooManySubfiles(usize),

    #[error("subfile `{subfile_type}` ends at byte {end}, past the 9999 addressable by a designator")]
    SubfileTooLarge { subfile_type: String, end: usize },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Version(#[from] UnsupportedVersion),

    #[error(transparent)]
    Subfile(#[from] SubfileError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodingError {
    #[error("missing compliance indicator at byte 0")]
    MissingComplianceIndicator,

    #[error("input truncated: {needed} bytes needed, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("invalid header field `{field}` at byte {offset}")]
    InvalidHeaderField { field: &'static str, offset: usize },

    #[error("invalid file type")]
    InvalidFileType,

    #[error("unexpected control character at byte {offset}")]
    UnexpectedControlCharacter { offset: usize },

    #[error("subfile `{subfile_type}` declares {declared} bytes but only {available} are available")]
    LengthMismatch {
        subfile_type: String,
        declared: usize,
        available: usize,
    },

    #[error("subfile `{expected}` not found at byte {offset}")]
    SubfileTypeMismatch { expected: String, offset: usize },

    #[error("unparseable field in subfile `{subfile_type}` at byte {offset}")]
    UnparseableField { subfile_type: String, offset: usize },

    #[error("subfile `{subfile_type}` has no segment terminator")]
    MissingSegmentTerminator { subfile_type: String },

    #[error("{count} trailing bytes after the segment terminator of subfile `{subfile_type}`")]
    TrailingData { subfile_type: String, count: usize },

    #[error("{count} bytes follow a header that declares no subfiles")]
    TrailingHeaderData { count: usize },

    #[error("subfile `{subfile_type}` starts at byte {start}, expected {expected}")]
    MisplacedSubfile {
        subfile_type: String,
        start: usize,
        expected: usize,
    },

    #[error("field `{code}` appears twice in subfile `{subfile_type}`")]
    DuplicateField { subfile_type: String, code: String },

    #[error("field `{code}` is not valid UTF-8")]
    InvalidUtf8 { code: String },

    #[error(transparent)]
    Version(#[from] UnsupportedVersion),
}

/// Validator misconfiguration. Data problems are reported as
/// [`ValidationIssue`](super::validation::ValidationIssue)s instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error(transparent)]
    Version(#[from] UnsupportedVersion),
}
