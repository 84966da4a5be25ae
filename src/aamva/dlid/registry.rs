//! Catalog of AAMVA DL/ID data elements.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    data_elements,
    error::UnknownFieldError,
    types::{FieldDefinition, InvalidFieldValue},
};

data_elements! {
    /// Data element of a DL or ID subfile.
    pub enum DataElement {
        /// Jurisdiction-specific vehicle class (DCA).
        VehicleClass: "DCA" { "Jurisdiction-specific vehicle class", AlphaNumeric, 6, Mandatory },

        /// Jurisdiction-specific restriction codes (DCB).
        RestrictionCodes: "DCB" { "Jurisdiction-specific restriction codes", AlphaNumeric, 12, Mandatory, empty },

        /// Jurisdiction-specific endorsement codes (DCD).
        EndorsementCodes: "DCD" { "Jurisdiction-specific endorsement codes", AlphaNumeric, 5, Mandatory, empty },

        /// Document Expiration Date (DBA).
        DocumentExpirationDate: "DBA" { "Document expiration date", Date, 8, Mandatory },

        /// Customer Family Name (DCS).
        CustomerFamilyName: "DCS" { "Customer family name", AlphaNumeric, 40, Mandatory },

        /// Customer First Name (DAC).
        CustomerFirstName: "DAC" { "Customer first name", AlphaNumeric, 40, Mandatory },

        /// Document Issue Date (DBD).
        DocumentIssueDate: "DBD" { "Document issue date", Date, 8, Mandatory },

        /// Date of Birth (DBB).
        DateOfBirth: "DBB" { "Date of birth", Date, 8, Mandatory },

        /// Physical Description - Sex (DBC).
        Sex: "DBC" { "Physical description - sex", Numeric, 1, Mandatory },

        /// Physical Description - Eye Color (DAY).
        EyeColor: "DAY" { "Physical description - eye color", Alpha, 3, Mandatory },

        /// Physical Description - Height (DAU).
        Height: "DAU" { "Physical description - height", AlphaNumeric, 6, Mandatory },

        /// Address - Street 1 (DAG).
        AddressStreet1: "DAG" { "Address - street 1", AlphaNumeric, 35, Mandatory },

        /// Address - City (DAI).
        AddressCity: "DAI" { "Address - city", AlphaNumeric, 20, Mandatory },

        /// Address - Jurisdiction Code (DAJ).
        AddressJurisdictionCode: "DAJ" { "Address - jurisdiction code", Alpha, 2, Mandatory },

        /// Address - Postal Code (DAK).
        AddressPostalCode: "DAK" { "Address - postal code", AlphaNumeric, 11, Mandatory },

        /// Customer ID Number (DAQ).
        CustomerIdNumber: "DAQ" { "Customer ID number", AlphaNumeric, 25, Mandatory },

        /// Document Discriminator (DCF).
        DocumentDiscriminator: "DCF" { "Document discriminator", AlphaNumeric, 25, Mandatory },

        /// Country Identification (DCG).
        CountryIdentification: "DCG" { "Country identification", Alpha, 3, Mandatory },

        /// Customer Middle Name(s) (DAD).
        CustomerMiddleName: "DAD" { "Customer middle name(s)", AlphaNumeric, 40, Optional, empty },

        /// Customer given names, versions 01 to 03 (DCT).
        CustomerGivenNames: "DCT" { "Customer given names", AlphaNumeric, 80, Optional },

        /// Family name truncation (DDE).
        FamilyNameTruncation: "DDE" { "Family name truncation", Alpha, 1, Optional },

        /// First name truncation (DDF).
        FirstNameTruncation: "DDF" { "First name truncation", Alpha, 1, Optional },

        /// Middle name truncation (DDG).
        MiddleNameTruncation: "DDG" { "Middle name truncation", Alpha, 1, Optional },

        /// Second line of street portion of the cardholder address (DAH).
        AddressStreet2: "DAH" { "Address - street 2", AlphaNumeric, 35, Optional },

        /// Cardholder weight in pounds (DAW).
        WeightInPounds: "DAW" { "Physical description - weight (pounds)", Numeric, 3, Optional },

        /// Cardholder weight in kilograms (DAX).
        WeightInKilograms: "DAX" { "Physical description - weight (kilograms)", Numeric, 3, Optional },

        /// Hair color (DAZ).
        HairColor: "DAZ" { "Hair color", Alpha, 12, Optional },

        /// Place (Country and municipality and/or state/province) of birth
        /// (DCI).
        PlaceOfBirth: "DCI" { "Place of birth", AlphaNumeric, 33, Optional },

        /// String of letters and/or numbers that identifies when, where, and by
        /// whom a driver license/ID card was made (DCJ).
        AuditInformation: "DCJ" { "Audit information", AlphaNumeric, 25, Optional },

        /// String of letters and/or numbers that is affixed to the raw
        /// materials (card stock, laminate, etc.) used in producing driver
        /// licenses and ID cards (DCK).
        InventoryControlNumber: "DCK" { "Inventory control number", AlphaNumeric, 25, Optional },

        /// Other family name by which cardholder is known (DBN).
        AkaFamilyName: "DBN" { "Alias / AKA family name", AlphaNumeric, 10, Optional },

        /// Other given name by which cardholder is known (DBG).
        AkaGivenName: "DBG" { "Alias / AKA given name", AlphaNumeric, 15, Optional },

        /// Other suffix by which cardholder is known (DBS).
        AkaSuffixName: "DBS" { "Alias / AKA suffix name", AlphaNumeric, 5, Optional },

        /// Name Suffix (DCU).
        NameSuffix: "DCU" { "Name suffix", AlphaNumeric, 5, Optional },

        /// Approximate weight range of the cardholder (DCE).
        WeightRange: "DCE" { "Physical description - weight range", Numeric, 1, Optional },

        /// Codes for race or ethnicity of the cardholder, as defined in AAMVA
        /// D20 (DCL).
        RaceOrEthnicity: "DCL" { "Race / ethnicity", Alpha, 3, Optional },

        /// Standard vehicle classification code(s) for cardholder (DCM).
        StandardVehicleClass: "DCM" { "Standard vehicle classification", AlphaNumeric, 4, Optional },

        /// Standard endorsement code(s) for cardholder (DCN).
        StandardEndorsementCode: "DCN" { "Standard endorsement code", AlphaNumeric, 5, Optional },

        /// Standard restriction code(s) for cardholder (DCO).
        StandardRestrictionCode: "DCO" { "Standard restriction code", AlphaNumeric, 12, Optional },

        /// Text that explains the jurisdiction-specific code(s) for
        /// classifications of vehicles cardholder is authorized to drive (DCP).
        VehicleClassDescription: "DCP" { "Jurisdiction-specific vehicle classification description", AlphaNumeric, 50, Optional },

        /// Text that explains the jurisdiction-specific code(s) that indicates
        /// additional driving privileges granted to the cardholder beyond the
        /// vehicle class (DCQ).
        EndorsementCodeDescription: "DCQ" { "Jurisdiction-specific endorsement code description", AlphaNumeric, 50, Optional },

        /// Text describing the jurisdiction-specific restriction code(s) that
        /// curtail driving privileges (DCR).
        RestrictionCodeDescription: "DCR" { "Jurisdiction-specific restriction code description", AlphaNumeric, 50, Optional },

        /// DHS required field that indicates compliance (DDA).
        ComplianceType: "DDA" { "Compliance type", Alpha, 1, Optional },

        /// DHS required field that indicates date of the most recent version
        /// change or modification to the visible format of the DL/ID (DDB).
        CardRevisionDate: "DDB" { "Card revision date", Date, 8, Optional },

        /// Date on which the hazardous material endorsement granted by the
        /// document is no longer valid (DDC).
        HazmatEndorsementExpirationDate: "DDC" { "HAZMAT endorsement expiration date", Date, 8, Optional },

        /// DHS required field that indicates that the cardholder has temporary
        /// lawful status = "1" (DDD).
        LimitedDurationDocumentIndicator: "DDD" { "Limited duration document indicator", Numeric, 1, Optional },

        /// Date on which the cardholder turns 18 years old (DDH).
        Under18Until: "DDH" { "Under 18 until", Date, 8, Optional },

        /// Date on which the cardholder turns 19 years old (DDI).
        Under19Until: "DDI" { "Under 19 until", Date, 8, Optional },

        /// Date on which the cardholder turns 21 years old (DDJ).
        Under21Until: "DDJ" { "Under 21 until", Date, 8, Optional },

        /// Field that indicates that the cardholder is an organ donor = "1"
        /// (DDK).
        OrganDonorIndicator: "DDK" { "Organ donor indicator", Numeric, 1, Optional },

        /// Field that indicates that the cardholder is a veteran = "1" (DDL).
        VeteranIndicator: "DDL" { "Veteran indicator", Numeric, 1, Optional }
    }
}

impl DataElement {
    /// Closed value set of enumerated elements.
    pub fn allowed_values(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::Sex => Some(&["1", "2", "9"]),
            Self::EyeColor => Some(&[
                "BLK", "BLU", "BRO", "GRY", "GRN", "HAZ", "MAR", "PNK", "DIC", "UNK",
            ]),
            Self::HairColor => Some(&[
                "BAL", "BLK", "BLN", "BRO", "GRY", "RED", "SDY", "WHI", "UNK",
            ]),
            Self::RaceOrEthnicity => Some(&["AI", "AP", "BK", "H", "O", "U", "W"]),
            Self::ComplianceType => Some(&["F", "N"]),
            Self::FamilyNameTruncation | Self::FirstNameTruncation | Self::MiddleNameTruncation => {
                Some(&["T", "N", "U"])
            }
            _ => None,
        }
    }
}

impl fmt::Display for DataElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Mandatory elements of a 2020 (version 10) DL subfile, in header order.
const MANDATORY_2020: [DataElement; 18] = [
    DataElement::VehicleClass,
    DataElement::RestrictionCodes,
    DataElement::EndorsementCodes,
    DataElement::DocumentExpirationDate,
    DataElement::CustomerFamilyName,
    DataElement::CustomerFirstName,
    DataElement::DocumentIssueDate,
    DataElement::DateOfBirth,
    DataElement::Sex,
    DataElement::EyeColor,
    DataElement::Height,
    DataElement::AddressStreet1,
    DataElement::AddressCity,
    DataElement::AddressJurisdictionCode,
    DataElement::AddressPostalCode,
    DataElement::CustomerIdNumber,
    DataElement::DocumentDiscriminator,
    DataElement::CountryIdentification,
];

/// Mandatory elements of versions 01 to 03, which carry all given names in
/// `DCT`.
const MANDATORY_LEGACY: [DataElement; 18] = [
    DataElement::VehicleClass,
    DataElement::RestrictionCodes,
    DataElement::EndorsementCodes,
    DataElement::DocumentExpirationDate,
    DataElement::CustomerFamilyName,
    DataElement::CustomerGivenNames,
    DataElement::DocumentIssueDate,
    DataElement::DateOfBirth,
    DataElement::Sex,
    DataElement::EyeColor,
    DataElement::Height,
    DataElement::AddressStreet1,
    DataElement::AddressCity,
    DataElement::AddressJurisdictionCode,
    DataElement::AddressPostalCode,
    DataElement::CustomerIdNumber,
    DataElement::DocumentDiscriminator,
    DataElement::CountryIdentification,
];

/// Driving privilege elements, not carried by ID card subfiles.
const DRIVING_PRIVILEGES: [DataElement; 3] = [
    DataElement::VehicleClass,
    DataElement::RestrictionCodes,
    DataElement::EndorsementCodes,
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported AAMVA version `{0}`")]
pub struct UnsupportedVersion(pub String);

/// AAMVA standard version number, as written in the file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AamvaVersion(u8);

impl AamvaVersion {
    /// AAMVA DL/ID Card Design Standard (2020).
    pub const V2020: Self = Self(10);

    pub const LATEST: Self = Self::V2020;

    pub fn new(number: u8) -> Result<Self, UnsupportedVersion> {
        if (1..=Self::LATEST.0).contains(&number) {
            Ok(Self(number))
        } else {
            Err(UnsupportedVersion(number.to_string()))
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Versions 01 to 03, before the first/middle name split.
    pub fn is_legacy(&self) -> bool {
        self.0 <= 3
    }

    pub fn mandatory_elements(&self) -> &'static [DataElement] {
        if self.is_legacy() {
            &MANDATORY_LEGACY
        } else {
            &MANDATORY_2020
        }
    }
}

impl Default for AamvaVersion {
    fn default() -> Self {
        Self::LATEST
    }
}

impl FromStr for AamvaVersion {
    type Err = UnsupportedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(UnsupportedVersion(s.to_owned()));
        }

        let number: u8 = s.parse().map_err(|_| UnsupportedVersion(s.to_owned()))?;
        Self::new(number).map_err(|_| UnsupportedVersion(s.to_owned()))
    }
}

impl TryFrom<String> for AamvaVersion {
    type Error = UnsupportedVersion;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AamvaVersion> for String {
    fn from(value: AamvaVersion) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AamvaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Kind of document described by a DL-family subfile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DocumentKind {
    /// Driver license (`DL` subfile).
    DriverLicense,

    /// Identification card (`ID` subfile).
    IdCard,
}

impl DocumentKind {
    pub fn subfile_type(&self) -> &'static str {
        match self {
            Self::DriverLicense => "DL",
            Self::IdCard => "ID",
        }
    }

    pub fn from_subfile_type(subfile_type: &str) -> Option<Self> {
        match subfile_type {
            "DL" => Some(Self::DriverLicense),
            "ID" => Some(Self::IdCard),
            _ => None,
        }
    }

    /// Mandatory elements in header order.
    pub fn mandatory_elements(self, version: AamvaVersion) -> impl Iterator<Item = DataElement> {
        version
            .mandatory_elements()
            .iter()
            .copied()
            .filter(move |e| self == Self::DriverLicense || !DRIVING_PRIVILEGES.contains(e))
    }
}

pub fn get_field_definition(code: &str) -> Result<&'static FieldDefinition, UnknownFieldError> {
    DataElement::from_code(code)
        .map(|e| e.definition())
        .ok_or_else(|| UnknownFieldError(code.to_owned()))
}

/// Codes of the elements a DL subfile must carry under `version`, in header
/// order.
pub fn get_mandatory_fields(version: AamvaVersion) -> Vec<&'static str> {
    version
        .mandatory_elements()
        .iter()
        .map(DataElement::code)
        .collect()
}

pub fn validate_field(code: &str, value: &str) -> Result<(), InvalidFieldValue> {
    get_field_definition(code)
        .map_err(|e| InvalidFieldValue::UnknownField(e.0))?
        .validate(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::aamva::dlid::types::{Category, DataType};

    #[test]
    fn codes_are_unique() {
        let codes: HashSet<_> = DataElement::LIST.iter().map(DataElement::code).collect();
        assert_eq!(codes.len(), DataElement::COUNT);
    }

    #[test]
    fn definitions_line_up_with_variants() {
        for e in DataElement::LIST {
            assert_eq!(e.definition().code, e.code());
            assert_eq!(DataElement::from_code(e.code()), Some(e));
            assert!(e.definition().max_length > 0);
        }
    }

    #[test]
    fn lookup_by_code() {
        let def = get_field_definition("DAQ").unwrap();
        assert_eq!(def.name, "Customer ID number");
        assert_eq!(def.data_type, DataType::AlphaNumeric);
        assert_eq!(def.max_length, 25);
        assert_eq!(def.category, Category::Mandatory);

        assert_eq!(
            get_field_definition("ZZZ"),
            Err(UnknownFieldError("ZZZ".to_owned()))
        );
    }

    #[test]
    fn mandatory_sets_differ_by_version() {
        let current = get_mandatory_fields(AamvaVersion::V2020);
        let legacy = get_mandatory_fields(AamvaVersion::new(3).unwrap());

        assert!(current.contains(&"DAC"));
        assert!(!current.contains(&"DCT"));
        assert!(legacy.contains(&"DCT"));
        assert!(!legacy.contains(&"DAC"));

        for e in AamvaVersion::V2020.mandatory_elements() {
            assert!(e.definition().is_mandatory());
        }
    }

    #[test]
    fn id_cards_have_no_driving_privileges() {
        let id: Vec<_> = DocumentKind::IdCard
            .mandatory_elements(AamvaVersion::V2020)
            .collect();
        assert_eq!(id.len(), 15);
        assert!(!id.contains(&DataElement::VehicleClass));
        assert!(id.contains(&DataElement::CustomerIdNumber));
    }

    #[test]
    fn version_parsing() {
        assert_eq!("10".parse::<AamvaVersion>(), Ok(AamvaVersion::V2020));
        assert_eq!("08".parse::<AamvaVersion>().unwrap().number(), 8);
        assert_eq!("8".parse::<AamvaVersion>().unwrap().to_string(), "08");
        assert!("00".parse::<AamvaVersion>().is_err());
        assert!("11".parse::<AamvaVersion>().is_err());
        assert!("1O".parse::<AamvaVersion>().is_err());
        assert!("010".parse::<AamvaVersion>().is_err());
    }

    #[test]
    fn validate_field_checks_type_and_length() {
        assert_eq!(validate_field("DAQ", &"X".repeat(25)), Ok(()));
        assert!(matches!(
            validate_field("DAQ", &"X".repeat(26)),
            Err(InvalidFieldValue::TooLong { .. })
        ));
        assert!(matches!(
            validate_field("DBB", "19900101"),
            Err(InvalidFieldValue::InvalidDate { .. })
        ));
        assert!(matches!(
            validate_field("DBC", "M"),
            Err(InvalidFieldValue::InvalidCharacters { .. })
        ));
        assert_eq!(validate_field("DCB", ""), Ok(()));
        assert!(matches!(
            validate_field("DCS", ""),
            Err(InvalidFieldValue::Empty { code: "DCS" })
        ));
        assert!(matches!(
            validate_field("QQQ", "1"),
            Err(InvalidFieldValue::UnknownField(_))
        ));
    }

    #[test]
    fn enumerations() {
        assert_eq!(DataElement::Sex.allowed_values(), Some(&["1", "2", "9"][..]));
        assert!(DataElement::EyeColor
            .allowed_values()
            .is_some_and(|v| v.contains(&"BRO")));
        assert_eq!(DataElement::CustomerIdNumber.allowed_values(), None);
    }
}
