use serde::{Deserialize, Serialize};

use super::{check_payload_len, FieldError};

const OUTDOORS_TRANSMISSION_PERMITTED_BIT: u8 = 0x08;
const INDOOR_BIT: u8 = 0x80;
const MAX_TX_POWER_MASK: u8 = 0x7F;

/// Info byte, country code and timestamp
const REGULATORY_FIXED_LEN: usize = 7;
const CHANNEL_POWER_LEN: usize = 2;

/// Where the advertiser learned which regulatory domain it is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceOfInfo {
    UserDefined,
    SatelliteNavigationSystem,
    CellularSystem,
    AnchorLocation,
}

impl SourceOfInfo {
    fn nibble(&self) -> u8 {
        match self {
            Self::UserDefined => 0x8,
            Self::SatelliteNavigationSystem => 0x4,
            Self::CellularSystem => 0x2,
            Self::AnchorLocation => 0x1,
        }
    }

    fn from_nibble(nibble: u8) -> Option<Self> {
        Some(match nibble {
            0x8 => Self::UserDefined,
            0x4 => Self::SatelliteNavigationSystem,
            0x2 => Self::CellularSystem,
            0x1 => Self::AnchorLocation,
            _ => return None,
        })
    }
}

/// A contiguous run of UWB channels and the power allowed on them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChannelPowerInfo {
    pub first_channel: u8,
    pub num_channels: u8,
    pub is_indoor: bool,
    pub max_transmit_power_level: u8,
}

impl ChannelPowerInfo {
    fn validate(&self) -> Result<(), FieldError> {
        if self.first_channel > 0x0F || self.num_channels > 0x0F {
            return Err(FieldError::InvalidValue(format!(
                "channel range {}+{} doesn't fit in two nibbles",
                self.first_channel, self.num_channels
            )));
        }
        if self.max_transmit_power_level > MAX_TX_POWER_MASK {
            return Err(FieldError::InvalidValue(format!(
                "max transmit power level {} doesn't fit in 7 bits",
                self.max_transmit_power_level
            )));
        }
        Ok(())
    }

    fn to_bytes(&self) -> [u8; CHANNEL_POWER_LEN] {
        let mut power = self.max_transmit_power_level & MAX_TX_POWER_MASK;
        if self.is_indoor {
            power |= INDOOR_BIT;
        }
        [(self.first_channel << 4) | (self.num_channels & 0x0F), power]
    }

    fn from_bytes(data: &[u8]) -> Self {
        Self {
            first_channel: data[0] >> 4,
            num_channels: data[0] & 0x0F,
            is_indoor: data[1] & INDOOR_BIT != 0,
            max_transmit_power_level: data[1] & MAX_TX_POWER_MASK,
        }
    }
}

/// The UWB regulatory info field.
///
/// The country code is kept as the two bytes seen on the wire. Decoding
/// accepts whatever the advertiser sent there, only [RegulatoryInfo::new]
/// insists on an ISO 3166 alpha-2 code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRegulatoryInfo", into = "RawRegulatoryInfo")]
pub struct RegulatoryInfo {
    source_of_info: SourceOfInfo,
    outdoors_transmission_permitted: bool,
    country_code: [u8; 2],
    timestamp_secs: u32,
    channel_power_info: Vec<ChannelPowerInfo>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawRegulatoryInfo {
    source_of_info: SourceOfInfo,
    #[serde(default)]
    outdoors_transmission_permitted: bool,
    country_code: String,
    timestamp_secs: u32,
    #[serde(default)]
    channel_power_info: Vec<ChannelPowerInfo>,
}

impl TryFrom<RawRegulatoryInfo> for RegulatoryInfo {
    type Error = FieldError;

    fn try_from(value: RawRegulatoryInfo) -> Result<Self, Self::Error> {
        Self::new(
            value.source_of_info,
            value.outdoors_transmission_permitted,
            &value.country_code,
            value.timestamp_secs,
            value.channel_power_info,
        )
    }
}

impl From<RegulatoryInfo> for RawRegulatoryInfo {
    fn from(value: RegulatoryInfo) -> Self {
        Self {
            source_of_info: value.source_of_info,
            outdoors_transmission_permitted: value.outdoors_transmission_permitted,
            country_code: value.country_code(),
            timestamp_secs: value.timestamp_secs,
            channel_power_info: value.channel_power_info,
        }
    }
}

fn validate_country_code(code: &str) -> Result<[u8; 2], FieldError> {
    match code.as_bytes() {
        [a, b] if a.is_ascii_uppercase() && b.is_ascii_uppercase() => Ok([*a, *b]),
        _ => Err(FieldError::InvalidValue(format!(
            "country code `{}` is not two upper case ASCII letters",
            code
        ))),
    }
}

impl RegulatoryInfo {
    pub fn new(
        source_of_info: SourceOfInfo,
        outdoors_transmission_permitted: bool,
        country_code: &str,
        timestamp_secs: u32,
        channel_power_info: Vec<ChannelPowerInfo>,
    ) -> Result<Self, FieldError> {
        check_payload_len(REGULATORY_FIXED_LEN + channel_power_info.len() * CHANNEL_POWER_LEN)?;
        let country_code = validate_country_code(country_code)?;
        for cpi in &channel_power_info {
            cpi.validate()?;
        }
        Ok(Self {
            source_of_info,
            outdoors_transmission_permitted,
            country_code,
            timestamp_secs,
            channel_power_info,
        })
    }

    pub fn source_of_info(&self) -> SourceOfInfo {
        self.source_of_info
    }

    pub fn outdoors_transmission_permitted(&self) -> bool {
        self.outdoors_transmission_permitted
    }

    pub fn country_code(&self) -> String {
        String::from_utf8_lossy(&self.country_code).into_owned()
    }

    pub fn country_code_bytes(&self) -> [u8; 2] {
        self.country_code
    }

    /// Seconds since the epoch at which the info was last refreshed
    pub fn timestamp_secs(&self) -> u32 {
        self.timestamp_secs
    }

    pub fn channel_power_info(&self) -> &[ChannelPowerInfo] {
        &self.channel_power_info
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            REGULATORY_FIXED_LEN + self.channel_power_info.len() * CHANNEL_POWER_LEN,
        );
        let mut info = self.source_of_info.nibble() << 4;
        if self.outdoors_transmission_permitted {
            info |= OUTDOORS_TRANSMISSION_PERMITTED_BIT;
        }
        buf.push(info);
        buf.extend_from_slice(&self.country_code);
        buf.extend_from_slice(&self.timestamp_secs.to_be_bytes());
        for cpi in &self.channel_power_info {
            buf.extend_from_slice(&cpi.to_bytes());
        }
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, FieldError> {
        if data.len() < REGULATORY_FIXED_LEN {
            return Err(FieldError::TooShort {
                len: data.len(),
                min: REGULATORY_FIXED_LEN,
            });
        }
        check_payload_len(data.len())?;

        let rest = &data[REGULATORY_FIXED_LEN..];
        if rest.len() % CHANNEL_POWER_LEN != 0 {
            return Err(FieldError::BadLength(data.len()));
        }

        let source_of_info = SourceOfInfo::from_nibble(data[0] >> 4).ok_or_else(|| {
            FieldError::InvalidValue(format!("unknown source of info {:#03x}", data[0] >> 4))
        })?;

        Ok(Self {
            source_of_info,
            outdoors_transmission_permitted: data[0] & OUTDOORS_TRANSMISSION_PERMITTED_BIT != 0,
            country_code: [data[1], data[2]],
            timestamp_secs: u32::from_be_bytes([data[3], data[4], data[5], data[6]]),
            channel_power_info: rest
                .chunks(CHANNEL_POWER_LEN)
                .map(ChannelPowerInfo::from_bytes)
                .collect(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[fixture]
    fn channel_5() -> ChannelPowerInfo {
        ChannelPowerInfo {
            first_channel: 5,
            num_channels: 1,
            is_indoor: true,
            max_transmit_power_level: 20,
        }
    }

    #[rstest]
    fn test_regulatory_bytes(channel_5: ChannelPowerInfo) {
        let info = RegulatoryInfo::new(
            SourceOfInfo::CellularSystem,
            true,
            "US",
            0x6500_0000,
            vec![channel_5],
        )
        .expect("valid");

        let bytes = info.to_bytes();
        assert_eq!(
            bytes,
            vec![0x28, b'U', b'S', 0x65, 0x00, 0x00, 0x00, 0x51, 0x94]
        );
        assert_eq!(RegulatoryInfo::from_bytes(&bytes).expect("parse"), info);
    }

    #[rstest]
    #[case("us")]
    #[case("USA")]
    #[case("U1")]
    fn test_bad_country_code(#[case] code: &str) {
        let res = RegulatoryInfo::new(SourceOfInfo::UserDefined, false, code, 0, vec![]);
        assert!(matches!(res, Err(FieldError::InvalidValue(_))));
    }

    #[rstest]
    fn test_too_many_channels(channel_5: ChannelPowerInfo) {
        let res = RegulatoryInfo::new(SourceOfInfo::UserDefined, false, "FR", 0, vec![channel_5; 5]);
        assert!(matches!(res, Err(FieldError::TooLong { len: 17, .. })));
    }

    #[rstest]
    fn test_channel_out_of_range(mut channel_5: ChannelPowerInfo) {
        channel_5.first_channel = 16;
        let res = RegulatoryInfo::new(SourceOfInfo::UserDefined, false, "FR", 0, vec![channel_5]);
        assert!(res.is_err());
    }

    #[test]
    fn test_decode_keeps_unvalidated_country_code() {
        let data = [0x10, b'u', 0x00, 0, 0, 0, 0x2A, 0x51, 0x14];
        let info = RegulatoryInfo::from_bytes(&data).expect("parse");
        assert_eq!(info.source_of_info(), SourceOfInfo::AnchorLocation);
        assert_eq!(info.country_code_bytes(), [b'u', 0x00]);
        assert_eq!(info.timestamp_secs(), 42);
        assert_eq!(info.to_bytes(), data.to_vec());
    }

    #[test]
    fn test_json_country_code() {
        let info = RegulatoryInfo::new(SourceOfInfo::UserDefined, false, "JP", 7, vec![])
            .expect("valid");
        let json = serde_json::to_string(&info).expect("serialize");
        assert!(json.contains(r#""country-code":"JP""#));
        let back: RegulatoryInfo = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, info);
    }

    #[rstest]
    #[case(&[0x80, b'U', b'S', 0, 0, 0])]
    #[case(&[0x80, b'U', b'S', 0, 0, 0, 0, 0x51])]
    #[case(&[0x30, b'U', b'S', 0, 0, 0, 0])]
    fn test_bad_payloads(#[case] data: &[u8]) {
        assert!(RegulatoryInfo::from_bytes(data).is_err());
    }
}
