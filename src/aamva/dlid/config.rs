use serde::{Deserialize, Serialize};

use super::registry::AamvaVersion;

/// How the fields of a subfile body are delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDelimiting {
    /// Every field but the last is followed by the data element separator.
    #[default]
    Separated,

    /// Fields follow each other directly. A value then ends where the next
    /// known field code starts, which is ambiguous when a value contains a
    /// field code.
    ///
    /// In DL and ID subfiles only registry codes start a field, so an
    /// unregistered code such as `DZZ` is read as part of the previous value.
    Concatenated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    pub version: AamvaVersion,
    pub jurisdiction_version: u8,

    /// Run the validator first and refuse to encode invalid data.
    pub validate: bool,

    /// Strictness of the pre-encode validation.
    pub strict: bool,

    pub delimiting: FieldDelimiting,
}

impl EncodeOptions {
    pub fn new(version: AamvaVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn validated(mut self, strict: bool) -> Self {
        self.validate = true;
        self.strict = strict;
        self
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            version: AamvaVersion::LATEST,
            jurisdiction_version: 0,
            validate: false,
            strict: false,
            delimiting: FieldDelimiting::Separated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Fail on any malformation instead of recovering.
    pub strict: bool,
}
