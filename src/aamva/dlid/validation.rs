//! Compliance checks over a set of subfiles.
//!
//! Problems found in the data are returned as [`ValidationIssue`]s inside a
//! [`ValidationResult`]; every check runs, nothing short-circuits.
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{ser::SerializeStruct, Serialize};

use super::{
    iin::get_iin_by_state,
    registry::{AamvaVersion, DataElement},
    subfile::{DlSubfile, Subfile},
    types::{parse_date, InvalidFieldValue},
};

/// Field name of issues not tied to a single field.
pub const GLOBAL: &str = "GLOBAL";

/// Oldest plausible age at issue, in years.
const MAX_AGE: i32 = 120;

/// Dates whose format and order the date checks own.
const KEY_DATES: [DataElement; 3] = [
    DataElement::DateOfBirth,
    DataElement::DocumentIssueDate,
    DataElement::DocumentExpirationDate,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("ERROR"),
            Self::Warning => f.write_str("WARNING"),
            Self::Info => f.write_str("INFO"),
        }
    }
}

/// Machine-readable issue identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    MissingDlSubfile,
    MissingMandatoryField,
    InvalidFieldFormat,
    UnknownField,
    InvalidEnumValue,
    InvalidDateFormat,
    InvalidDateSequence,
    UnusualAge,
    IinMismatch,
    UnknownJurisdiction,
}

impl IssueCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingDlSubfile => "MISSING_DL_SUBFILE",
            Self::MissingMandatoryField => "MISSING_MANDATORY_FIELD",
            Self::InvalidFieldFormat => "INVALID_FIELD_FORMAT",
            Self::UnknownField => "UNKNOWN_FIELD",
            Self::InvalidEnumValue => "INVALID_ENUM_VALUE",
            Self::InvalidDateFormat => "INVALID_DATE_FORMAT",
            Self::InvalidDateSequence => "INVALID_DATE_SEQUENCE",
            Self::UnusualAge => "UNUSUAL_AGE",
            Self::IinMismatch => "IIN_MISMATCH",
            Self::UnknownJurisdiction => "UNKNOWN_JURISDICTION",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Field code, or [`GLOBAL`].
    pub field: String,
    pub severity: Severity,
    pub message: String,
    pub code: IssueCode,
}

impl ValidationIssue {
    pub fn new(
        field: impl Into<String>,
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            severity,
            message: message.into(),
            code,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level_char = match self.severity {
            Severity::Error => 'E',
            Severity::Warning => 'W',
            Severity::Info => 'I',
        };
        write!(f, "[{level_char}] {} {}: {}", self.code, self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no issue has [`Severity::Error`], whatever the number of
    /// warnings.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Info)
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn by_code(&self, code: IssueCode) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.code == code)
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// One line listing every error.
    pub fn summary(&self) -> String {
        self.errors()
            .map(|i| format!("{} {}: {}", i.code, i.field, i.message))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn push(
        &mut self,
        field: impl Into<String>,
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
    ) {
        self.issues
            .push(ValidationIssue::new(field, severity, code, message))
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationResult", 2)?;
        s.serialize_field("is_valid", &self.is_valid())?;
        s.serialize_field("issues", &self.issues)?;
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    version: AamvaVersion,
    strict: bool,
    iin: Option<String>,
}

impl Validator {
    pub fn new(version: AamvaVersion) -> Self {
        Self {
            version,
            strict: false,
            iin: None,
        }
    }

    /// In strict mode IIN mismatches are errors and unknown fields warnings.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// IIN of the document header, checked against the address
    /// jurisdiction.
    pub fn with_iin(mut self, iin: impl Into<String>) -> Self {
        self.iin = Some(iin.into());
        self
    }

    pub fn validate(&self, subfiles: &[Subfile]) -> ValidationResult {
        let mut result = ValidationResult::new();

        let mut documents = subfiles.iter().filter_map(Subfile::as_dl).peekable();
        if documents.peek().is_none() {
            result.push(
                GLOBAL,
                Severity::Error,
                IssueCode::MissingDlSubfile,
                "no DL or ID subfile",
            );
        }

        for dl in documents {
            self.check_presence(dl, &mut result);
            self.check_format(dl, &mut result);
            self.check_enumerations(dl, &mut result);
            self.check_dates(dl, &mut result);
            self.check_iin(dl, &mut result);
        }

        result
    }

    fn check_presence(&self, dl: &DlSubfile, result: &mut ValidationResult) {
        for e in dl.kind().mandatory_elements(self.version) {
            if dl.get(e).is_none() {
                result.push(
                    e.code(),
                    Severity::Error,
                    IssueCode::MissingMandatoryField,
                    format!(
                        "{} ({}) is mandatory in version {} {} subfiles",
                        e.definition().name,
                        e,
                        self.version,
                        dl.subfile_type()
                    ),
                );
            }
        }
    }

    fn is_mandatory(&self, dl: &DlSubfile, element: DataElement) -> bool {
        dl.kind()
            .mandatory_elements(self.version)
            .any(|e| e == element)
    }

    fn check_format(&self, dl: &DlSubfile, result: &mut ValidationResult) {
        for (e, value) in dl.elements() {
            let definition = e.definition();
            let outcome = if value.is_empty() {
                if self.is_mandatory(dl, e) && !definition.allow_empty {
                    Err(InvalidFieldValue::Empty { code: e.code() })
                } else {
                    Ok(())
                }
            } else {
                definition.validate(value)
            };

            // Unparseable key dates are reported by the date checks.
            if let Err(error) = outcome {
                if matches!(error, InvalidFieldValue::InvalidDate { .. })
                    && KEY_DATES.contains(&e)
                {
                    continue;
                }
                result.push(
                    e.code(),
                    Severity::Error,
                    IssueCode::InvalidFieldFormat,
                    error.to_string(),
                );
            }
        }

        let severity = if self.strict {
            Severity::Warning
        } else {
            Severity::Info
        };
        for (code, _) in dl.extensions() {
            result.push(
                code.as_str(),
                severity,
                IssueCode::UnknownField,
                format!("`{code}` is not a registered data element"),
            );
        }
    }

    fn check_enumerations(&self, dl: &DlSubfile, result: &mut ValidationResult) {
        for (e, value) in dl.elements() {
            let Some(allowed) = e.allowed_values() else {
                continue;
            };

            if !value.is_empty() && !allowed.iter().any(|a| *a == value) {
                result.push(
                    e.code(),
                    Severity::Error,
                    IssueCode::InvalidEnumValue,
                    format!("{value:?} is not one of {}", allowed.join(", ")),
                );
            }
        }
    }

    fn check_dates(&self, dl: &DlSubfile, result: &mut ValidationResult) {
        let mut date = |e: DataElement| -> Option<NaiveDate> {
            let value = dl.get(e).filter(|v| !v.is_empty())?;
            let parsed = parse_date(value);
            if parsed.is_none() {
                result.push(
                    e.code(),
                    Severity::Error,
                    IssueCode::InvalidDateFormat,
                    format!("{value:?} is not a valid MMDDYYYY date"),
                );
            }
            parsed
        };

        let birth = date(DataElement::DateOfBirth);
        let issue = date(DataElement::DocumentIssueDate);
        let expiration = date(DataElement::DocumentExpirationDate);

        let mut sequence = |field: DataElement, earlier: NaiveDate, later: NaiveDate, what: &str| {
            if earlier >= later {
                result.push(
                    field.code(),
                    Severity::Error,
                    IssueCode::InvalidDateSequence,
                    format!("{what} ({earlier} is not before {later})"),
                );
            }
        };

        match (birth, issue, expiration) {
            (b, Some(i), e) => {
                if let Some(b) = b {
                    sequence(DataElement::DocumentIssueDate, b, i, "document issued before birth");
                }
                if let Some(e) = e {
                    sequence(
                        DataElement::DocumentExpirationDate,
                        i,
                        e,
                        "document expires before it is issued",
                    );
                }
            }
            (Some(b), None, Some(e)) => {
                sequence(DataElement::DocumentExpirationDate, b, e, "document expires before birth");
            }
            _ => (),
        }

        if let (Some(birth), Some(issue)) = (birth, issue) {
            let age = age_at(birth, issue);
            if !(0..=MAX_AGE).contains(&age) {
                result.push(
                    DataElement::DateOfBirth.code(),
                    Severity::Warning,
                    IssueCode::UnusualAge,
                    format!("cardholder is {age} years old at issue"),
                );
            }
        }
    }

    fn check_iin(&self, dl: &DlSubfile, result: &mut ValidationResult) {
        let Some(iin) = &self.iin else {
            return;
        };

        let Some(abbr) = dl
            .get(DataElement::AddressJurisdictionCode)
            .filter(|v| !v.is_empty())
        else {
            return;
        };

        match get_iin_by_state(abbr) {
            Some(expected) if expected != iin.as_str() => {
                let severity = if self.strict {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                result.push(
                    DataElement::AddressJurisdictionCode.code(),
                    severity,
                    IssueCode::IinMismatch,
                    format!("jurisdiction {abbr} has IIN {expected}, header declares {iin}"),
                );
            }
            Some(_) => (),
            None => result.push(
                DataElement::AddressJurisdictionCode.code(),
                Severity::Warning,
                IssueCode::UnknownJurisdiction,
                format!("no IIN is registered for jurisdiction {abbr:?}"),
            ),
        }
    }
}

/// Age in whole years on `day`; negative when `day` precedes `birth`.
fn age_at(birth: NaiveDate, day: NaiveDate) -> i32 {
    let years = day.year() - birth.year();
    if (day.month(), day.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

pub fn validate(subfiles: &[Subfile], version: AamvaVersion, strict: bool) -> ValidationResult {
    Validator::new(version).strict(strict).validate(subfiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license(fields: &[(&str, &str)]) -> Vec<Subfile> {
        let mut dl = DlSubfile::new();
        for (code, value) in fields {
            dl.add_field(code, *value).unwrap();
        }
        vec![dl.into()]
    }

    fn codes(result: &ValidationResult) -> Vec<&'static str> {
        result.issues.iter().map(|i| i.code.code()).collect()
    }

    #[test]
    fn missing_dl_subfile() {
        let result = validate(&[], AamvaVersion::V2020, false);
        assert!(!result.is_valid());
        assert_eq!(codes(&result), ["MISSING_DL_SUBFILE"]);
        assert_eq!(result.issues[0].field, GLOBAL);
    }

    #[test]
    fn presence_is_checked_per_version() {
        let result = validate(&license(&[]), AamvaVersion::V2020, false);
        assert_eq!(result.errors().count(), 18);
        assert!(result.by_code(IssueCode::MissingMandatoryField).any(|i| i.field == "DAC"));

        let legacy = AamvaVersion::new(2).unwrap();
        let result = validate(&license(&[]), legacy, false);
        assert!(result.by_code(IssueCode::MissingMandatoryField).any(|i| i.field == "DCT"));
        assert!(!result.by_code(IssueCode::MissingMandatoryField).any(|i| i.field == "DAC"));
    }

    #[test]
    fn empty_values() {
        let result = validate(
            &license(&[("DCB", ""), ("DCS", ""), ("DAH", "")]),
            AamvaVersion::V2020,
            false,
        );
        let format: Vec<_> = result
            .by_code(IssueCode::InvalidFieldFormat)
            .map(|i| i.field.as_str())
            .collect();
        assert_eq!(format, ["DCS"]);
    }

    #[test]
    fn enumerations() {
        let result = validate(&license(&[("DAY", "PUR"), ("DDE", "N")]), AamvaVersion::V2020, false);
        let enums: Vec<_> = result
            .by_code(IssueCode::InvalidEnumValue)
            .map(|i| i.field.as_str())
            .collect();
        assert_eq!(enums, ["DAY"]);
    }

    #[test]
    fn date_format_and_sequence() {
        let result = validate(
            &license(&[("DBB", "13011990"), ("DBD", "01012020"), ("DBA", "01012010")]),
            AamvaVersion::V2020,
            false,
        );
        assert_eq!(result.by_code(IssueCode::InvalidDateFormat).count(), 1);
        let sequence: Vec<_> = result.by_code(IssueCode::InvalidDateSequence).collect();
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence[0].field, "DBA");
    }

    #[test]
    fn other_dates_are_format_checked() {
        let result = validate(
            &license(&[("DBB", "01011990"), ("DDB", "13452020"), ("DDH", "99999999")]),
            AamvaVersion::V2020,
            false,
        );
        let format: Vec<_> = result
            .by_code(IssueCode::InvalidFieldFormat)
            .map(|i| (i.field.as_str(), i.severity))
            .collect();
        assert_eq!(format, [("DDB", Severity::Error), ("DDH", Severity::Error)]);
        assert_eq!(result.by_code(IssueCode::InvalidDateFormat).count(), 0);

        let result = validate(&license(&[("DBB", "13011990")]), AamvaVersion::V2020, false);
        assert_eq!(result.by_code(IssueCode::InvalidDateFormat).count(), 1);
        assert!(!result.by_code(IssueCode::InvalidFieldFormat).any(|i| i.field == "DBB"));
    }

    #[test]
    fn issue_before_birth() {
        let result = validate(
            &license(&[("DBB", "01012000"), ("DBD", "01011990"), ("DBA", "01012030")]),
            AamvaVersion::V2020,
            false,
        );
        let sequence: Vec<_> = result.by_code(IssueCode::InvalidDateSequence).collect();
        assert_eq!(sequence.len(), 1);
        assert_eq!(sequence[0].field, "DBD");

        let age: Vec<_> = result.by_code(IssueCode::UnusualAge).collect();
        assert_eq!(age.len(), 1);
        assert_eq!(age[0].severity, Severity::Warning);
    }

    #[test]
    fn very_old_cardholder() {
        let result = validate(
            &license(&[("DBB", "01011890"), ("DBD", "01012020")]),
            AamvaVersion::V2020,
            false,
        );
        assert_eq!(result.by_code(IssueCode::UnusualAge).count(), 1);
        assert_eq!(result.by_code(IssueCode::InvalidDateSequence).count(), 0);
    }

    #[test]
    fn age_counts_whole_years() {
        let birth = NaiveDate::from_ymd_opt(1990, 6, 15).unwrap();
        assert_eq!(age_at(birth, NaiveDate::from_ymd_opt(2020, 6, 14).unwrap()), 29);
        assert_eq!(age_at(birth, NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()), 30);
        assert_eq!(age_at(birth, NaiveDate::from_ymd_opt(1989, 1, 1).unwrap()), -2);
    }

    #[test]
    fn iin_mismatch_severity_follows_strictness() {
        let subfiles = license(&[("DAJ", "CA")]);

        let lenient = Validator::new(AamvaVersion::V2020)
            .with_iin("636001")
            .validate(&subfiles);
        let issue = lenient.by_code(IssueCode::IinMismatch).next().unwrap();
        assert_eq!(issue.severity, Severity::Warning);

        let strict = Validator::new(AamvaVersion::V2020)
            .strict(true)
            .with_iin("636001")
            .validate(&subfiles);
        let issue = strict.by_code(IssueCode::IinMismatch).next().unwrap();
        assert_eq!(issue.severity, Severity::Error);

        let matching = Validator::new(AamvaVersion::V2020)
            .with_iin("636014")
            .validate(&subfiles);
        assert_eq!(matching.by_code(IssueCode::IinMismatch).count(), 0);
    }

    #[test]
    fn unknown_fields_are_informational() {
        let subfiles = license(&[("DZZ", "X")]);
        let result = validate(&subfiles, AamvaVersion::V2020, false);
        assert_eq!(
            result.by_code(IssueCode::UnknownField).next().unwrap().severity,
            Severity::Info
        );

        let result = validate(&subfiles, AamvaVersion::V2020, true);
        assert_eq!(
            result.by_code(IssueCode::UnknownField).next().unwrap().severity,
            Severity::Warning
        );
    }

    #[test]
    fn display_and_summary() {
        let result = validate(&license(&[("DBC", "X")]), AamvaVersion::V2020, false);
        let issue = result.by_code(IssueCode::InvalidEnumValue).next().unwrap();
        assert_eq!(
            issue.to_string(),
            "[E] INVALID_ENUM_VALUE DBC: \"X\" is not one of 1, 2, 9"
        );
        assert!(result.summary().contains("INVALID_ENUM_VALUE DBC"));
    }
}
