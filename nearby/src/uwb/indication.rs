use serde::{Deserialize, Serialize};

use super::{check_payload_len, FieldError};

const FIRA_UWB_SUPPORT_BIT: u8 = 0x80;
const ISO14443_SUPPORT_BIT: u8 = 0x40;
const REGULATORY_INFO_IN_AD_BIT: u8 = 0x20;
const REGULATORY_INFO_IN_OOB_BIT: u8 = 0x10;
const PROFILE_INFO_IN_AD_BIT: u8 = 0x08;
const PROFILE_INFO_IN_OOB_BIT: u8 = 0x04;
const DUAL_GAP_ROLE_BIT: u8 = 0x02;

const STATIC_INDICATION_BIT: u8 = 0x80;
const SEC_ID_MASK: u8 = 0x7F;

/// Capabilities byte and RSSI threshold
const INDICATION_FIXED_LEN: usize = 2;
const SECURE_COMPONENT_LEN: usize = 2;

/// Capability flags from the first byte of the indication data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndicationFlags {
    #[serde(default)]
    pub fira_uwb_support: bool,
    #[serde(default)]
    pub iso14443_support: bool,
    #[serde(default)]
    pub regulatory_info_available_in_ad: bool,
    #[serde(default)]
    pub regulatory_info_available_in_oob: bool,
    #[serde(default)]
    pub profile_info_available_in_ad: bool,
    #[serde(default)]
    pub profile_info_available_in_oob: bool,
    #[serde(default)]
    pub dual_gap_role_support: bool,
}

impl From<u8> for IndicationFlags {
    fn from(value: u8) -> Self {
        Self {
            fira_uwb_support: value & FIRA_UWB_SUPPORT_BIT != 0,
            iso14443_support: value & ISO14443_SUPPORT_BIT != 0,
            regulatory_info_available_in_ad: value & REGULATORY_INFO_IN_AD_BIT != 0,
            regulatory_info_available_in_oob: value & REGULATORY_INFO_IN_OOB_BIT != 0,
            profile_info_available_in_ad: value & PROFILE_INFO_IN_AD_BIT != 0,
            profile_info_available_in_oob: value & PROFILE_INFO_IN_OOB_BIT != 0,
            dual_gap_role_support: value & DUAL_GAP_ROLE_BIT != 0,
        }
    }
}

impl From<IndicationFlags> for u8 {
    fn from(value: IndicationFlags) -> Self {
        let mut flags = 0u8;
        let bits = [
            (value.fira_uwb_support, FIRA_UWB_SUPPORT_BIT),
            (value.iso14443_support, ISO14443_SUPPORT_BIT),
            (value.regulatory_info_available_in_ad, REGULATORY_INFO_IN_AD_BIT),
            (value.regulatory_info_available_in_oob, REGULATORY_INFO_IN_OOB_BIT),
            (value.profile_info_available_in_ad, PROFILE_INFO_IN_AD_BIT),
            (value.profile_info_available_in_oob, PROFILE_INFO_IN_OOB_BIT),
            (value.dual_gap_role_support, DUAL_GAP_ROLE_BIT),
        ];
        for (set, bit) in bits {
            if set {
                flags |= bit;
            }
        }
        flags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecureComponentType {
    Static,
    Ese,
    DiscreteEse,
    Uicc,
    Other(u8),
}

impl From<u8> for SecureComponentType {
    fn from(value: u8) -> Self {
        match value {
            0x0 => Self::Static,
            0x1 => Self::Ese,
            0x2 => Self::DiscreteEse,
            0x3 => Self::Uicc,
            v => Self::Other(v),
        }
    }
}

impl From<SecureComponentType> for u8 {
    fn from(value: SecureComponentType) -> Self {
        match value {
            SecureComponentType::Static => 0x0,
            SecureComponentType::Ese => 0x1,
            SecureComponentType::DiscreteEse => 0x2,
            SecureComponentType::Uicc => 0x3,
            SecureComponentType::Other(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecureComponentProtocolType {
    FiraOobAdministrative,
    Iso7816,
    Other(u8),
}

impl From<u8> for SecureComponentProtocolType {
    fn from(value: u8) -> Self {
        match value {
            0x1 => Self::FiraOobAdministrative,
            0x2 => Self::Iso7816,
            v => Self::Other(v),
        }
    }
}

impl From<SecureComponentProtocolType> for u8 {
    fn from(value: SecureComponentProtocolType) -> Self {
        match value {
            SecureComponentProtocolType::FiraOobAdministrative => 0x1,
            SecureComponentProtocolType::Iso7816 => 0x2,
            SecureComponentProtocolType::Other(v) => v,
        }
    }
}

/// One secure element the device exposes for the OOB session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SecureComponentInfo {
    pub static_indication: bool,
    /// 7 bit secure element id
    pub sec_id: u8,
    pub component_type: SecureComponentType,
    pub protocol_type: SecureComponentProtocolType,
}

impl SecureComponentInfo {
    fn validate(&self) -> Result<(), FieldError> {
        if self.sec_id & !SEC_ID_MASK != 0 {
            return Err(FieldError::InvalidValue(format!(
                "sec id {:#04x} doesn't fit in 7 bits",
                self.sec_id
            )));
        }
        let ty: u8 = self.component_type.into();
        let proto: u8 = self.protocol_type.into();
        if ty > 0x0F || proto > 0x0F {
            return Err(FieldError::invalid(
                "secure component type and protocol are 4 bit values",
            ));
        }
        Ok(())
    }

    fn to_bytes(&self) -> [u8; SECURE_COMPONENT_LEN] {
        let mut first = self.sec_id & SEC_ID_MASK;
        if self.static_indication {
            first |= STATIC_INDICATION_BIT;
        }
        let ty: u8 = self.component_type.into();
        let proto: u8 = self.protocol_type.into();
        [first, (ty << 4) | (proto & 0x0F)]
    }

    fn from_bytes(data: &[u8]) -> Self {
        Self {
            static_indication: data[0] & STATIC_INDICATION_BIT != 0,
            sec_id: data[0] & SEC_ID_MASK,
            component_type: SecureComponentType::from(data[1] >> 4),
            protocol_type: SecureComponentProtocolType::from(data[1] & 0x0F),
        }
    }
}

/// The UWB indication data field: what the advertiser can do and where the
/// rest of its information can be found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIndicationData", rename_all = "kebab-case")]
pub struct UwbIndicationData {
    flags: IndicationFlags,
    bluetooth_rssi_threshold_dbm: i8,
    secure_components: Vec<SecureComponentInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawIndicationData {
    #[serde(default)]
    flags: IndicationFlags,
    bluetooth_rssi_threshold_dbm: i8,
    #[serde(default)]
    secure_components: Vec<SecureComponentInfo>,
}

impl TryFrom<RawIndicationData> for UwbIndicationData {
    type Error = FieldError;

    fn try_from(value: RawIndicationData) -> Result<Self, Self::Error> {
        Self::new(
            value.flags,
            value.bluetooth_rssi_threshold_dbm,
            value.secure_components,
        )
    }
}

impl UwbIndicationData {
    pub fn new(
        flags: IndicationFlags,
        bluetooth_rssi_threshold_dbm: i8,
        secure_components: Vec<SecureComponentInfo>,
    ) -> Result<Self, FieldError> {
        check_payload_len(INDICATION_FIXED_LEN + secure_components.len() * SECURE_COMPONENT_LEN)?;
        for sc in &secure_components {
            sc.validate()?;
        }
        Ok(Self {
            flags,
            bluetooth_rssi_threshold_dbm,
            secure_components,
        })
    }

    pub fn flags(&self) -> &IndicationFlags {
        &self.flags
    }

    pub fn bluetooth_rssi_threshold_dbm(&self) -> i8 {
        self.bluetooth_rssi_threshold_dbm
    }

    pub fn secure_components(&self) -> &[SecureComponentInfo] {
        &self.secure_components
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            INDICATION_FIXED_LEN + self.secure_components.len() * SECURE_COMPONENT_LEN,
        );
        buf.push(self.flags.into());
        buf.push(self.bluetooth_rssi_threshold_dbm as u8);
        for sc in &self.secure_components {
            buf.extend_from_slice(&sc.to_bytes());
        }
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, FieldError> {
        if data.len() < INDICATION_FIXED_LEN {
            return Err(FieldError::TooShort {
                len: data.len(),
                min: INDICATION_FIXED_LEN,
            });
        }
        check_payload_len(data.len())?;

        let rest = &data[INDICATION_FIXED_LEN..];
        if rest.len() % SECURE_COMPONENT_LEN != 0 {
            return Err(FieldError::BadLength(data.len()));
        }

        let secure_components = rest
            .chunks(SECURE_COMPONENT_LEN)
            .map(SecureComponentInfo::from_bytes)
            .collect();

        Ok(Self {
            flags: IndicationFlags::from(data[0]),
            bluetooth_rssi_threshold_dbm: data[1] as i8,
            secure_components,
        })
    }
}
