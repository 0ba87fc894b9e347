//! FiRa BLE OOB discovery advertisements.
//!
//! UWB capable devices advertise themselves over BLE with a GAP
//! "Service Data - 16-bit UUID" AD structure. The service data carries a
//! sequence of self-describing fields, each starting with a header byte whose
//! high nibble is the field type and low nibble the payload length.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod advertisement;
pub use advertisement::*;

pub mod indication;
pub use indication::*;

pub mod regulatory;
pub use regulatory::*;

pub mod profile;
pub use profile::*;

pub mod vendor;
pub use vendor::*;

/// GAP AD type for "Service Data - 16-bit UUID"
pub const SERVICE_DATA_AD_TYPE: u8 = 0x16;

/// FiRa Connector Primary service
pub const FIRA_CP_SERVICE_UUID: u16 = 0xFFF3;

/// FiRa Connector Secondary service
pub const FIRA_CS_SERVICE_UUID: u16 = 0xFFF4;

/// Length byte, AD type and the 16-bit UUID
pub const ADVERTISEMENT_HEADER_LEN: usize = 4;

/// Field payload lengths live in a nibble
pub const MAX_FIELD_PAYLOAD_LEN: usize = 0x0F;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    UwbIndicationData = 0x1,
    VendorSpecificData = 0x2,
    UwbRegulatoryInfo = 0x3,
    FiraProfileSupportInfo = 0x4,
}

impl TryFrom<u8> for FieldType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0x1 => Self::UwbIndicationData,
            0x2 => Self::VendorSpecificData,
            0x3 => Self::UwbRegulatoryInfo,
            0x4 => Self::FiraProfileSupportInfo,
            _ => return Err(value),
        })
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::UwbIndicationData => "uwb indication data",
                Self::VendorSpecificData => "vendor specific data",
                Self::UwbRegulatoryInfo => "uwb regulatory info",
                Self::FiraProfileSupportInfo => "fira profile support info",
            }
        )
    }
}

/// Errors building or parsing a single advertisement field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("payload is {len} bytes, at most {max} fit in a field")]
    TooLong { len: usize, max: usize },

    #[error("payload is {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    #[error("payload length {0} doesn't match the field layout")]
    BadLength(usize),

    #[error("{0}")]
    InvalidValue(String),
}

impl FieldError {
    pub fn invalid<S: ToString + ?Sized>(s: &S) -> Self {
        Self::InvalidValue(s.to_string())
    }
}

/// Reasons a byte buffer isn't a valid FiRa discovery advertisement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("service data is {0} bytes, need at least 4")]
    TooShort(usize),

    #[error("length byte says {declared} but {actual} bytes follow it")]
    LengthMismatch { declared: u8, actual: usize },

    #[error("AD type {0:#04x} is not service data")]
    BadDataType(u8),

    #[error("service UUID {0:#06x} is not a FiRa service")]
    UnknownServiceUuid(u16),

    #[error("{field_type:#03x} field declares {declared} bytes but only {remaining} remain")]
    TruncatedField {
        field_type: u8,
        declared: usize,
        remaining: usize,
    },

    #[error("unknown field type {0:#03x}")]
    UnknownFieldType(u8),

    #[error("duplicate {0} field")]
    DuplicateField(FieldType),

    #[error("bad {0} field: {1}")]
    InvalidField(FieldType, FieldError),

    #[error("vendor specific data present in both service data and manufacturer data")]
    ConflictingVendorData,
}

/// Make sure a payload fits in a field's length nibble
pub(crate) fn check_payload_len(len: usize) -> Result<(), FieldError> {
    if len > MAX_FIELD_PAYLOAD_LEN {
        Err(FieldError::TooLong {
            len,
            max: MAX_FIELD_PAYLOAD_LEN,
        })
    } else {
        Ok(())
    }
}

/// Append a complete field (header byte and payload) to `buf`.
///
/// Payload length has already been validated when the field value was built.
pub(crate) fn write_field(buf: &mut Vec<u8>, field_type: FieldType, payload: &[u8]) {
    let header = ((field_type as u8) << 4) | (payload.len() as u8 & 0x0F);
    buf.push(header);
    buf.extend_from_slice(payload);
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(0x1, Some(FieldType::UwbIndicationData))]
    #[case(0x2, Some(FieldType::VendorSpecificData))]
    #[case(0x3, Some(FieldType::UwbRegulatoryInfo))]
    #[case(0x4, Some(FieldType::FiraProfileSupportInfo))]
    #[case(0x0, None)]
    #[case(0x5, None)]
    #[case(0xF, None)]
    fn test_field_type_from_u8(#[case] raw: u8, #[case] expected: Option<FieldType>) {
        assert_eq!(FieldType::try_from(raw).ok(), expected);
    }

    #[test]
    fn test_write_field() {
        let mut buf = Vec::new();
        write_field(&mut buf, FieldType::UwbRegulatoryInfo, &[0xAA, 0xBB]);
        assert_eq!(buf, vec![0x32, 0xAA, 0xBB]);
    }

    #[test]
    fn test_check_payload_len() {
        assert!(check_payload_len(0).is_ok());
        assert!(check_payload_len(15).is_ok());
        assert_eq!(
            check_payload_len(16),
            Err(FieldError::TooLong { len: 16, max: 15 })
        );
    }
}
