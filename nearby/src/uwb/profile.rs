use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::{check_payload_len, FieldError, MAX_FIELD_PAYLOAD_LEN};

/// Highest profile id a 15 byte bitmap can express
pub const MAX_FIRA_PROFILE_ID: u8 = (MAX_FIELD_PAYLOAD_LEN * 8 - 1) as u8;

/// The FiRa profile support field: a little endian bitmap where bit `n`
/// being set means profile id `n` is supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawProfileSupportInfo", into = "RawProfileSupportInfo")]
pub struct FiraProfileSupportInfo {
    bitmap: Vec<u8>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawProfileSupportInfo {
    profile_ids: Vec<u8>,
}

impl TryFrom<RawProfileSupportInfo> for FiraProfileSupportInfo {
    type Error = FieldError;

    fn try_from(value: RawProfileSupportInfo) -> Result<Self, Self::Error> {
        Self::from_profile_ids(&value.profile_ids)
    }
}

impl From<FiraProfileSupportInfo> for RawProfileSupportInfo {
    fn from(value: FiraProfileSupportInfo) -> Self {
        Self {
            profile_ids: value.profile_ids(),
        }
    }
}

impl FiraProfileSupportInfo {
    pub fn from_profile_ids(ids: &[u8]) -> Result<Self, FieldError> {
        if let Some(bad) = ids.iter().find(|it| **it > MAX_FIRA_PROFILE_ID) {
            return Err(FieldError::InvalidValue(format!(
                "profile id {} is larger than {}",
                bad, MAX_FIRA_PROFILE_ID
            )));
        }
        let len = ids.iter().max().map(|it| (*it as usize / 8) + 1).unwrap_or(1);
        let mut bitmap = vec![0u8; len];
        for id in ids {
            bitmap[*id as usize / 8] |= 1 << (id % 8);
        }
        Ok(Self { bitmap })
    }

    /// Supported profile ids in ascending order
    pub fn profile_ids(&self) -> Vec<u8> {
        self.bitmap
            .iter()
            .enumerate()
            .flat_map(|(byte, bits)| {
                (0..8u8)
                    .filter(move |bit| bits & (1 << bit) != 0)
                    .map(move |bit| (byte * 8) as u8 + bit)
            })
            .collect()
    }

    pub fn supports(&self, profile_id: u8) -> bool {
        self.bitmap
            .get(profile_id as usize / 8)
            .map(|b| b & (1 << (profile_id % 8)) != 0)
            .unwrap_or(false)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bitmap.clone()
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, FieldError> {
        if data.is_empty() {
            return Err(FieldError::TooShort { len: 0, min: 1 });
        }
        check_payload_len(data.len())?;
        Ok(Self {
            bitmap: data.to_vec(),
        })
    }
}

impl std::fmt::Display for FiraProfileSupportInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.profile_ids().iter().join(", "))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(&[1], vec![0x02])]
    #[case(&[0, 9], vec![0x01, 0x02])]
    #[case(&[], vec![0x00])]
    #[case(&[119], {let mut v = vec![0u8; 15]; v[14] = 0x80; v})]
    fn test_profile_bitmap(#[case] ids: &[u8], #[case] expected: Vec<u8>) {
        let info = FiraProfileSupportInfo::from_profile_ids(ids).expect("valid");
        assert_eq!(info.to_bytes(), expected);
        assert_eq!(info.profile_ids(), ids.to_vec());
    }

    #[test]
    fn test_profile_id_out_of_range() {
        assert!(FiraProfileSupportInfo::from_profile_ids(&[120]).is_err());
    }

    #[test]
    fn test_supports() {
        let info = FiraProfileSupportInfo::from_bytes(&[0x05]).expect("parse");
        assert!(info.supports(0));
        assert!(!info.supports(1));
        assert!(info.supports(2));
        assert!(!info.supports(100));
        assert_eq!(info.to_string(), "[0, 2]");
    }

    #[test]
    fn test_bad_lengths() {
        assert!(FiraProfileSupportInfo::from_bytes(&[]).is_err());
        assert!(FiraProfileSupportInfo::from_bytes(&[0u8; 16]).is_err());
    }
}
