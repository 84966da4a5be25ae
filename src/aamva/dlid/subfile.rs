use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{ser::SerializeStruct, Serialize};

use super::{
    error::SubfileError,
    registry::{AamvaVersion, DataElement, DocumentKind},
};

/// Three letter data element identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldCode([u8; 3]);

impl FieldCode {
    pub fn new(code: &str) -> Result<Self, SubfileError> {
        Self::from_bytes(code.as_bytes())
            .filter(|_| code.len() == 3)
            .ok_or_else(|| SubfileError::InvalidFieldCode(code.to_owned()))
    }

    /// Reads a code from the first three bytes of `bytes`, if they form one.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [a, b, c, ..] if [a, b, c].iter().all(|x| x.is_ascii_uppercase()) => {
                Some(Self([*a, *b, *c]))
            }
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Only uppercase ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn element(&self) -> Option<DataElement> {
        DataElement::from_id(&self.0)
    }
}

impl From<DataElement> for FieldCode {
    fn from(value: DataElement) -> Self {
        let b = value.code().as_bytes();
        Self([b[0], b[1], b[2]])
    }
}

impl FromStr for FieldCode {
    type Err = SubfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FieldCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldCode({})", self.as_str())
    }
}

impl Serialize for FieldCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Two letter subfile type, e.g. `DL` or `ZC`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubfileType([u8; 2]);

impl SubfileType {
    pub const DL: Self = Self(*b"DL");
    pub const ID: Self = Self(*b"ID");

    pub fn new(subfile_type: &str) -> Result<Self, SubfileError> {
        Self::from_bytes(subfile_type.as_bytes())
            .filter(|_| subfile_type.len() == 2)
            .ok_or_else(|| SubfileError::InvalidSubfileType(subfile_type.to_owned()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [a, b, ..] if a.is_ascii_uppercase() && b.is_ascii_uppercase() => Some(Self([*a, *b])),
            _ => None,
        }
    }

    /// Type of the jurisdiction-specific subfile of `abbr`: `Z` followed by
    /// the first letter of the postal abbreviation.
    pub fn for_jurisdiction(abbr: &str) -> Result<Self, SubfileError> {
        match abbr.trim().as_bytes().first() {
            Some(c) if c.is_ascii_alphabetic() => Ok(Self([b'Z', c.to_ascii_uppercase()])),
            _ => Err(SubfileError::InvalidSubfileType(format!("Z{abbr}"))),
        }
    }

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }

    pub fn document_kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_subfile_type(self.as_str())
    }
}

impl From<DocumentKind> for SubfileType {
    fn from(value: DocumentKind) -> Self {
        match value {
            DocumentKind::DriverLicense => Self::DL,
            DocumentKind::IdCard => Self::ID,
        }
    }
}

impl fmt::Display for SubfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for SubfileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubfileType({})", self.as_str())
    }
}

impl Serialize for SubfileType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

fn insert_entry<K: PartialEq>(
    entries: &mut Vec<(K, String)>,
    key: K,
    code: impl fmt::Display,
    value: String,
) -> Result<(), SubfileError> {
    match entries.iter().find(|(k, _)| *k == key) {
        Some((_, existing)) if *existing == value => Ok(()),
        Some(_) => Err(SubfileError::DuplicateField {
            code: code.to_string(),
        }),
        None => {
            entries.push((key, value));
            Ok(())
        }
    }
}

fn replace_entry<K: PartialEq>(entries: &mut Vec<(K, String)>, key: K, value: String) -> Option<String> {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some((_, existing)) => Some(std::mem::replace(existing, value)),
        None => {
            entries.push((key, value));
            None
        }
    }
}

/// Driver license (`DL`) or identification card (`ID`) subfile.
///
/// Registry elements are kept apart from unknown codes, which land in the
/// extension bucket. Both keep insertion order.
#[derive(Debug, Clone)]
pub struct DlSubfile {
    kind: DocumentKind,
    fields: Vec<(DataElement, String)>,
    extensions: Vec<(FieldCode, String)>,
}

impl DlSubfile {
    pub fn new() -> Self {
        Self::with_kind(DocumentKind::DriverLicense)
    }

    pub fn id_card() -> Self {
        Self::with_kind(DocumentKind::IdCard)
    }

    pub fn with_kind(kind: DocumentKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            extensions: Vec::new(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn subfile_type(&self) -> SubfileType {
        self.kind.into()
    }

    /// Adds a field.
    ///
    /// Fails if `code` is not a field code, or if it is already present with
    /// a different value.
    pub fn add_field(&mut self, code: &str, value: impl Into<String>) -> Result<(), SubfileError> {
        let code = FieldCode::new(code)?;
        let value = value.into();
        match code.element() {
            Some(e) => insert_entry(&mut self.fields, e, code, value),
            None => insert_entry(&mut self.extensions, code, code, value),
        }
    }

    /// Sets a field, returning its previous value.
    pub fn set_field(
        &mut self,
        code: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, SubfileError> {
        let code = FieldCode::new(code)?;
        Ok(match code.element() {
            Some(e) => replace_entry(&mut self.fields, e, value.into()),
            None => replace_entry(&mut self.extensions, code, value.into()),
        })
    }

    pub fn set(&mut self, element: DataElement, value: impl Into<String>) -> Option<String> {
        replace_entry(&mut self.fields, element, value.into())
    }

    pub fn remove_field(&mut self, code: &str) -> Option<String> {
        let code = FieldCode::new(code).ok()?;
        match code.element() {
            Some(e) => {
                let i = self.fields.iter().position(|(k, _)| *k == e)?;
                Some(self.fields.remove(i).1)
            }
            None => {
                let i = self.extensions.iter().position(|(k, _)| *k == code)?;
                Some(self.extensions.remove(i).1)
            }
        }
    }

    pub fn get(&self, element: DataElement) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == element)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_field(&self, code: &str) -> Option<&str> {
        match DataElement::from_code(code) {
            Some(e) => self.get(e),
            None => self
                .extensions
                .iter()
                .find(|(k, _)| k.as_str() == code)
                .map(|(_, v)| v.as_str()),
        }
    }

    pub fn has_field(&self, code: &str) -> bool {
        self.get_field(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registry elements, in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = (DataElement, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Codes unknown to the registry, in insertion order.
    pub fn extensions(&self) -> impl Iterator<Item = (FieldCode, &str)> {
        self.extensions.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn fields(&self) -> impl Iterator<Item = (FieldCode, &str)> {
        self.elements()
            .map(|(k, v)| (FieldCode::from(k), v))
            .chain(self.extensions())
    }

    /// Fields in wire order: the mandatory elements of `version` in header
    /// order, then the remaining elements and the extensions in insertion
    /// order.
    pub fn encoding_order(&self, version: AamvaVersion) -> Vec<(FieldCode, &str)> {
        let mandatory: Vec<DataElement> = self.kind.mandatory_elements(version).collect();
        let mut result: Vec<(FieldCode, &str)> = mandatory
            .iter()
            .filter_map(|e| self.get(*e).map(|v| (FieldCode::from(*e), v)))
            .collect();

        result.extend(
            self.elements()
                .filter(|(e, _)| !mandatory.contains(e))
                .map(|(e, v)| (FieldCode::from(e), v)),
        );
        result.extend(self.extensions());
        result
    }
}

impl Default for DlSubfile {
    fn default() -> Self {
        Self::new()
    }
}

/// Equality on the code to value mapping, regardless of field order.
impl PartialEq for DlSubfile {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && field_map(self.fields()) == field_map(other.fields())
    }
}

impl Eq for DlSubfile {}

/// Jurisdiction-specific subfile (`Z` + jurisdiction letter), holding
/// jurisdiction-defined field codes.
#[derive(Debug, Clone)]
pub struct JurisdictionSubfile {
    subfile_type: SubfileType,
    fields: Vec<(FieldCode, String)>,
}

impl JurisdictionSubfile {
    pub fn new(subfile_type: SubfileType) -> Self {
        Self {
            subfile_type,
            fields: Vec::new(),
        }
    }

    pub fn for_jurisdiction(abbr: &str) -> Result<Self, SubfileError> {
        Ok(Self::new(SubfileType::for_jurisdiction(abbr)?))
    }

    pub fn subfile_type(&self) -> SubfileType {
        self.subfile_type
    }

    pub fn add_field(&mut self, code: &str, value: impl Into<String>) -> Result<(), SubfileError> {
        let code = FieldCode::new(code)?;
        insert_entry(&mut self.fields, code, code, value.into())
    }

    pub fn set_field(
        &mut self,
        code: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, SubfileError> {
        let code = FieldCode::new(code)?;
        Ok(replace_entry(&mut self.fields, code, value.into()))
    }

    pub fn get_field(&self, code: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_str() == code)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_field(&self, code: &str) -> bool {
        self.get_field(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (FieldCode, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl PartialEq for JurisdictionSubfile {
    fn eq(&self, other: &Self) -> bool {
        self.subfile_type == other.subfile_type && field_map(self.fields()) == field_map(other.fields())
    }
}

impl Eq for JurisdictionSubfile {}

fn field_map<'a>(fields: impl Iterator<Item = (FieldCode, &'a str)>) -> BTreeMap<FieldCode, &'a str> {
    fields.collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subfile {
    Dl(DlSubfile),
    Jurisdiction(JurisdictionSubfile),
}

impl Subfile {
    pub fn subfile_type(&self) -> SubfileType {
        match self {
            Self::Dl(s) => s.subfile_type(),
            Self::Jurisdiction(s) => s.subfile_type(),
        }
    }

    pub fn as_dl(&self) -> Option<&DlSubfile> {
        match self {
            Self::Dl(s) => Some(s),
            Self::Jurisdiction(_) => None,
        }
    }

    pub fn add_field(&mut self, code: &str, value: impl Into<String>) -> Result<(), SubfileError> {
        match self {
            Self::Dl(s) => s.add_field(code, value),
            Self::Jurisdiction(s) => s.add_field(code, value),
        }
    }

    pub fn get_field(&self, code: &str) -> Option<&str> {
        match self {
            Self::Dl(s) => s.get_field(code),
            Self::Jurisdiction(s) => s.get_field(code),
        }
    }

    /// Value of `code`, or `default` when absent.
    pub fn get_field_or<'a>(&'a self, code: &str, default: &'a str) -> &'a str {
        self.get_field(code).unwrap_or(default)
    }

    pub fn has_field(&self, code: &str) -> bool {
        self.get_field(code).is_some()
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Dl(s) => s.len(),
            Self::Jurisdiction(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> Box<dyn Iterator<Item = (FieldCode, &str)> + '_> {
        match self {
            Self::Dl(s) => Box::new(s.fields()),
            Self::Jurisdiction(s) => Box::new(s.fields()),
        }
    }

    /// Fields in the order they are written to a compliance string.
    pub fn encoding_order(&self, version: AamvaVersion) -> Vec<(FieldCode, &str)> {
        match self {
            Self::Dl(s) => s.encoding_order(version),
            Self::Jurisdiction(s) => s.fields().collect(),
        }
    }

    /// Code to value mapping, sorted by code.
    pub fn field_map(&self) -> BTreeMap<FieldCode, &str> {
        field_map(self.fields())
    }
}

impl From<DlSubfile> for Subfile {
    fn from(value: DlSubfile) -> Self {
        Self::Dl(value)
    }
}

impl From<JurisdictionSubfile> for Subfile {
    fn from(value: JurisdictionSubfile) -> Self {
        Self::Jurisdiction(value)
    }
}

struct FieldsInOrder<'a>(&'a Subfile);

impl Serialize for FieldsInOrder<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.fields())
    }
}

impl Serialize for Subfile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Subfile", 2)?;
        s.serialize_field("subfile_type", &self.subfile_type())?;
        s.serialize_field("fields", &FieldsInOrder(self))?;
        s.end()
    }
}
