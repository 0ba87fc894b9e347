use serde::{Deserialize, Serialize};

use super::{FieldError, MAX_FIELD_PAYLOAD_LEN};
use crate::utils::{bytes_from_hex, bytes_to_hex};

const VENDOR_ID_LEN: usize = 2;

/// Largest opaque payload that still fits next to the vendor id
pub const MAX_VENDOR_DATA_LEN: usize = MAX_FIELD_PAYLOAD_LEN - VENDOR_ID_LEN;

/// A vendor specific data block. It can be carried as a field in the
/// service data or on its own as BLE manufacturer specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVendorData", into = "RawVendorData")]
pub struct VendorSpecificData {
    vendor_id: u16,
    data: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawVendorData {
    vendor_id: u16,
    /// hex
    #[serde(default)]
    data: String,
}

impl TryFrom<RawVendorData> for VendorSpecificData {
    type Error = FieldError;

    fn try_from(value: RawVendorData) -> Result<Self, Self::Error> {
        let data = bytes_from_hex(&value.data).map_err(|e| FieldError::invalid(&e))?;
        Self::new(value.vendor_id, data)
    }
}

impl From<VendorSpecificData> for RawVendorData {
    fn from(value: VendorSpecificData) -> Self {
        Self {
            vendor_id: value.vendor_id,
            data: bytes_to_hex(&value.data),
        }
    }
}

impl VendorSpecificData {
    pub fn new(vendor_id: u16, data: Vec<u8>) -> Result<Self, FieldError> {
        if data.len() > MAX_VENDOR_DATA_LEN {
            return Err(FieldError::TooLong {
                len: data.len(),
                max: MAX_VENDOR_DATA_LEN,
            });
        }
        Ok(Self { vendor_id, data })
    }

    pub fn vendor_id(&self) -> u16 {
        self.vendor_id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(VENDOR_ID_LEN + self.data.len());
        buf.extend_from_slice(&self.vendor_id.to_le_bytes());
        buf.extend_from_slice(&self.data);
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, FieldError> {
        if data.len() < VENDOR_ID_LEN {
            return Err(FieldError::TooShort {
                len: data.len(),
                min: VENDOR_ID_LEN,
            });
        }
        Self::new(
            u16::from_le_bytes([data[0], data[1]]),
            data[VENDOR_ID_LEN..].to_vec(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_vendor_bytes() {
        let vendor = VendorSpecificData::new(0x00E0, vec![0xDE, 0xAD]).expect("valid");
        assert_eq!(vendor.to_bytes(), vec![0xE0, 0x00, 0xDE, 0xAD]);
        assert_eq!(
            VendorSpecificData::from_bytes(&[0xE0, 0x00, 0xDE, 0xAD]).expect("parse"),
            vendor
        );
    }

    #[test]
    fn test_vendor_data_limits() {
        assert!(VendorSpecificData::new(1, vec![0; 13]).is_ok());
        assert_eq!(
            VendorSpecificData::new(1, vec![0; 14]),
            Err(FieldError::TooLong { len: 14, max: 13 })
        );
        assert!(VendorSpecificData::from_bytes(&[0x01]).is_err());
    }

    #[test]
    fn test_vendor_json() {
        let vendor: VendorSpecificData =
            serde_json::from_str(r#"{"vendor-id": 76, "data": "0102"}"#).expect("json");
        assert_eq!(vendor.vendor_id(), 76);
        assert_eq!(vendor.data(), &[0x01, 0x02]);
        assert!(serde_json::from_str::<VendorSpecificData>(r#"{"vendor-id": 76, "data": "zz"}"#)
            .is_err());
    }
}
