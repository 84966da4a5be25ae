use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// `strftime` layout of every AAMVA date element (MMDDYYYY).
pub const DATE_FORMAT: &str = "%m%d%Y";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFieldValue {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("mandatory field `{code}` is empty")]
    Empty { code: &'static str },

    #[error("field `{code}` is {length} characters long, maximum is {max}")]
    TooLong {
        code: &'static str,
        length: usize,
        max: usize,
    },

    #[error("field `{code}` must be {data_type}, found {value}")]
    InvalidCharacters {
        code: &'static str,
        data_type: DataType,
        value: MaybeAscii,
    },

    #[error("field `{code}` is not a valid MMDDYYYY date: {value}")]
    InvalidDate { code: &'static str, value: MaybeAscii },
}

/// Field value as shown in error messages.
#[derive(Clone, PartialEq, Eq)]
pub struct MaybeAscii(pub String);

impl fmt::Display for MaybeAscii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_ascii() {
            write!(f, "{:?}", self.0)
        } else {
            write!(f, "\"{}\"", self.0.escape_default())
        }
    }
}

impl fmt::Debug for MaybeAscii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// ASCII character class.
pub trait CharClass {
    fn contains(c: char) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Alpha;

impl CharClass for Alpha {
    fn contains(c: char) -> bool {
        c.is_ascii_alphabetic() || c == ' '
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Numeric;

impl CharClass for Numeric {
    fn contains(c: char) -> bool {
        c.is_ascii_digit()
    }
}

/// Letters, digits, space and the punctuation found in names and addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlphaNumeric;

impl AlphaNumeric {
    const PUNCTUATION: &'static str = "-.,'/#&()";
}

impl CharClass for AlphaNumeric {
    fn contains(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == ' ' || Self::PUNCTUATION.contains(c)
    }
}

fn all_in<C: CharClass>(value: &str) -> bool {
    value.chars().all(C::contains)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Alpha,
    AlphaNumeric,
    Numeric,
    Date,
}

impl DataType {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Alpha => all_in::<Alpha>(value),
            Self::AlphaNumeric => all_in::<AlphaNumeric>(value),
            Self::Numeric => all_in::<Numeric>(value),
            Self::Date => parse_date(value).is_some(),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alpha => f.write_str("alphabetic"),
            Self::AlphaNumeric => f.write_str("alphanumeric"),
            Self::Numeric => f.write_str("numeric"),
            Self::Date => f.write_str("a MMDDYYYY date"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Mandatory,
    Optional,
}

/// Static description of one data element.
///
/// `category` is the element's classification under the current (2020)
/// standard. Version-specific mandatory sets are available from
/// [`get_mandatory_fields`](super::registry::get_mandatory_fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDefinition {
    pub code: &'static str,
    pub name: &'static str,
    pub data_type: DataType,
    pub max_length: usize,
    pub category: Category,

    /// An empty value stands for "none" (e.g. no restrictions).
    pub allow_empty: bool,
}

impl FieldDefinition {
    pub fn is_mandatory(&self) -> bool {
        self.category == Category::Mandatory
    }

    pub fn validate(&self, value: &str) -> Result<(), InvalidFieldValue> {
        if value.is_empty() {
            return if self.is_mandatory() && !self.allow_empty {
                Err(InvalidFieldValue::Empty { code: self.code })
            } else {
                Ok(())
            };
        }

        let length = value.chars().count();
        if length > self.max_length {
            return Err(InvalidFieldValue::TooLong {
                code: self.code,
                length,
                max: self.max_length,
            });
        }

        if self.data_type.accepts(value) {
            Ok(())
        } else if self.data_type == DataType::Date {
            Err(InvalidFieldValue::InvalidDate {
                code: self.code,
                value: MaybeAscii(value.to_owned()),
            })
        } else {
            Err(InvalidFieldValue::InvalidCharacters {
                code: self.code,
                data_type: self.data_type,
                value: MaybeAscii(value.to_owned()),
            })
        }
    }
}

/// Parses an AAMVA MMDDYYYY date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !all_in::<Numeric>(value) {
        return None;
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(data_type: DataType, max_length: usize, category: Category) -> FieldDefinition {
        FieldDefinition {
            code: "TST",
            name: "Test",
            data_type,
            max_length,
            category,
            allow_empty: false,
        }
    }

    #[test]
    fn alpha_accepts_letters_and_space_only() {
        assert!(DataType::Alpha.accepts("BRO"));
        assert!(DataType::Alpha.accepts("NEW YORK"));
        assert!(!DataType::Alpha.accepts("B1O"));
        assert!(!DataType::Alpha.accepts("O'NEIL"));
    }

    #[test]
    fn alphanumeric_accepts_address_punctuation() {
        assert!(DataType::AlphaNumeric.accepts("123 MAIN ST, APT #4"));
        assert!(DataType::AlphaNumeric.accepts("O'NEIL-SMITH"));
        assert!(!DataType::AlphaNumeric.accepts("A\nB"));
        assert!(!DataType::AlphaNumeric.accepts("NAÏVE"));
    }

    #[test]
    fn dates_must_be_real_calendar_days() {
        assert_eq!(
            parse_date("02291992"),
            NaiveDate::from_ymd_opt(1992, 2, 29)
        );
        assert_eq!(parse_date("02291993"), None);
        assert_eq!(parse_date("1311990"), None);
        assert_eq!(parse_date("13011990"), None);
        assert_eq!(parse_date("+1011990"), None);
    }

    #[test]
    fn mandatory_values_cannot_be_empty() {
        let def = definition(DataType::AlphaNumeric, 5, Category::Mandatory);
        assert_eq!(
            def.validate(""),
            Err(InvalidFieldValue::Empty { code: "TST" })
        );

        let def = definition(DataType::AlphaNumeric, 5, Category::Optional);
        assert_eq!(def.validate(""), Ok(()));

        let def = FieldDefinition {
            allow_empty: true,
            ..definition(DataType::AlphaNumeric, 5, Category::Mandatory)
        };
        assert_eq!(def.validate(""), Ok(()));
    }

    #[test]
    fn length_limit_is_inclusive() {
        let def = definition(DataType::Numeric, 3, Category::Optional);
        assert_eq!(def.validate("123"), Ok(()));
        assert!(matches!(
            def.validate("1234"),
            Err(InvalidFieldValue::TooLong {
                length: 4,
                max: 3,
                ..
            })
        ));
    }

    #[test]
    fn error_message_quotes_the_value() {
        let def = definition(DataType::Numeric, 3, Category::Optional);
        let error = def.validate("1X").unwrap_err();
        assert_eq!(error.to_string(), "field `TST` must be numeric, found \"1X\"");
    }
}
