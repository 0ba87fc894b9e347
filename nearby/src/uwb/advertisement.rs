use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{
    write_field, DecodeError, FieldError, FieldType, FiraProfileSupportInfo, RegulatoryInfo,
    UwbIndicationData, VendorSpecificData, ADVERTISEMENT_HEADER_LEN, FIRA_CP_SERVICE_UUID,
    FIRA_CS_SERVICE_UUID, SERVICE_DATA_AD_TYPE,
};

/// The two 16-bit service UUIDs a FiRa device may advertise under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceUuid {
    ConnectorPrimary,
    ConnectorSecondary,
}

impl ServiceUuid {
    pub fn as_u16(&self) -> u16 {
        match self {
            Self::ConnectorPrimary => FIRA_CP_SERVICE_UUID,
            Self::ConnectorSecondary => FIRA_CS_SERVICE_UUID,
        }
    }
}

impl TryFrom<u16> for ServiceUuid {
    type Error = DecodeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            FIRA_CP_SERVICE_UUID => Ok(Self::ConnectorPrimary),
            FIRA_CS_SERVICE_UUID => Ok(Self::ConnectorSecondary),
            _ => Err(DecodeError::UnknownServiceUuid(value)),
        }
    }
}

impl Display for ServiceUuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}", self.as_u16())
    }
}

/// A decoded FiRa BLE OOB discovery advertisement.
///
/// Values are built either through [DiscoveryAdvertisement::new] from already
/// validated fields or by [DiscoveryAdvertisement::from_bytes], and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveryAdvertisement {
    service_uuid: ServiceUuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uwb_indication_data: Option<UwbIndicationData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    regulatory_info: Option<RegulatoryInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fira_profile_support_info: Option<FiraProfileSupportInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    vendor_specific_data: Vec<VendorSpecificData>,
}

fn invalid_field(field_type: FieldType) -> impl FnOnce(FieldError) -> DecodeError {
    move |err| DecodeError::InvalidField(field_type, err)
}

fn set_once<T>(slot: &mut Option<T>, field_type: FieldType, value: T) -> Result<(), DecodeError> {
    if slot.is_some() {
        return Err(DecodeError::DuplicateField(field_type));
    }
    *slot = Some(value);
    Ok(())
}

impl DiscoveryAdvertisement {
    pub fn new(
        service_uuid: ServiceUuid,
        uwb_indication_data: Option<UwbIndicationData>,
        regulatory_info: Option<RegulatoryInfo>,
        fira_profile_support_info: Option<FiraProfileSupportInfo>,
        vendor_specific_data: Vec<VendorSpecificData>,
    ) -> Self {
        Self {
            service_uuid,
            uwb_indication_data,
            regulatory_info,
            fira_profile_support_info,
            vendor_specific_data,
        }
    }

    pub fn service_uuid(&self) -> ServiceUuid {
        self.service_uuid
    }

    pub fn uwb_indication_data(&self) -> Option<&UwbIndicationData> {
        self.uwb_indication_data.as_ref()
    }

    pub fn regulatory_info(&self) -> Option<&RegulatoryInfo> {
        self.regulatory_info.as_ref()
    }

    pub fn fira_profile_support_info(&self) -> Option<&FiraProfileSupportInfo> {
        self.fira_profile_support_info.as_ref()
    }

    pub fn vendor_specific_data(&self) -> &[VendorSpecificData] {
        &self.vendor_specific_data
    }

    /// Parse BLE service data, and optionally the manufacturer specific data
    /// seen in the same scan record, into an advertisement.
    ///
    /// Any structural problem is logged and returned; callers should treat
    /// an error as "not a FiRa device".
    pub fn from_bytes(
        service_data: &[u8],
        manufacturer_data: Option<&[u8]>,
    ) -> Result<Self, DecodeError> {
        let res = Self::decode(service_data, manufacturer_data);
        if let Err(e) = &res {
            log::warn!("not a FiRa discovery advertisement: {}", e);
        }
        res
    }

    fn decode(service_data: &[u8], manufacturer_data: Option<&[u8]>) -> Result<Self, DecodeError> {
        if service_data.len() < ADVERTISEMENT_HEADER_LEN {
            return Err(DecodeError::TooShort(service_data.len()));
        }

        let declared = service_data[0];
        if declared as usize != service_data.len() - 1 {
            return Err(DecodeError::LengthMismatch {
                declared,
                actual: service_data.len() - 1,
            });
        }

        if service_data[1] != SERVICE_DATA_AD_TYPE {
            return Err(DecodeError::BadDataType(service_data[1]));
        }

        let service_uuid =
            ServiceUuid::try_from(u16::from_le_bytes([service_data[2], service_data[3]]))?;

        let mut adv = Self::new(service_uuid, None, None, None, Vec::new());

        let mut rest = &service_data[ADVERTISEMENT_HEADER_LEN..];
        while let Some((&header, tail)) = rest.split_first() {
            let raw_type = header >> 4;
            let len = (header & 0x0F) as usize;
            if len > tail.len() {
                return Err(DecodeError::TruncatedField {
                    field_type: raw_type,
                    declared: len,
                    remaining: tail.len(),
                });
            }
            let (payload, next) = tail.split_at(len);
            rest = next;

            let field_type =
                FieldType::try_from(raw_type).map_err(DecodeError::UnknownFieldType)?;
            log::trace!("{} field with {} byte payload", field_type, len);

            match field_type {
                FieldType::UwbIndicationData => set_once(
                    &mut adv.uwb_indication_data,
                    field_type,
                    UwbIndicationData::from_bytes(payload).map_err(invalid_field(field_type))?,
                )?,
                FieldType::UwbRegulatoryInfo => set_once(
                    &mut adv.regulatory_info,
                    field_type,
                    RegulatoryInfo::from_bytes(payload).map_err(invalid_field(field_type))?,
                )?,
                FieldType::FiraProfileSupportInfo => set_once(
                    &mut adv.fira_profile_support_info,
                    field_type,
                    FiraProfileSupportInfo::from_bytes(payload)
                        .map_err(invalid_field(field_type))?,
                )?,
                FieldType::VendorSpecificData => adv.vendor_specific_data.push(
                    VendorSpecificData::from_bytes(payload).map_err(invalid_field(field_type))?,
                ),
            }
        }

        if let Some(mfr) = manufacturer_data.filter(|it| !it.is_empty()) {
            if !adv.vendor_specific_data.is_empty() {
                return Err(DecodeError::ConflictingVendorData);
            }
            adv.vendor_specific_data.push(
                VendorSpecificData::from_bytes(mfr)
                    .map_err(invalid_field(FieldType::VendorSpecificData))?,
            );
        }

        Ok(adv)
    }

    /// Encode the advertisement as BLE service data.
    ///
    /// Vendor data is only placed in the service data when
    /// `include_vendor_specific_data` is set; otherwise callers are expected
    /// to send [DiscoveryAdvertisement::manufacturer_specific_data_bytes]
    /// separately. The leading length byte is truncated to 8 bits.
    pub fn to_bytes(&self, include_vendor_specific_data: bool) -> Vec<u8> {
        let uuid = self.service_uuid.as_u16().to_le_bytes();
        let mut buf = vec![0, SERVICE_DATA_AD_TYPE, uuid[0], uuid[1]];

        if let Some(ind) = &self.uwb_indication_data {
            write_field(&mut buf, FieldType::UwbIndicationData, &ind.to_bytes());
        }
        if let Some(reg) = &self.regulatory_info {
            write_field(&mut buf, FieldType::UwbRegulatoryInfo, &reg.to_bytes());
        }
        if let Some(profile) = &self.fira_profile_support_info {
            write_field(&mut buf, FieldType::FiraProfileSupportInfo, &profile.to_bytes());
        }
        if include_vendor_specific_data {
            for vendor in &self.vendor_specific_data {
                write_field(&mut buf, FieldType::VendorSpecificData, &vendor.to_bytes());
            }
        }

        let len = buf.len() - 1;
        if len > u8::MAX as usize {
            log::warn!("advertisement payload is {} bytes, length byte will wrap", len);
        }
        buf[0] = len as u8;
        buf
    }

    /// Payload of the first vendor entry, for use as manufacturer specific data
    pub fn manufacturer_specific_data_bytes(&self) -> Option<Vec<u8>> {
        self.vendor_specific_data.first().map(|it| it.to_bytes())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::uwb::{
        ChannelPowerInfo, IndicationFlags, SecureComponentInfo, SecureComponentProtocolType,
        SecureComponentType, SourceOfInfo, MAX_FIRA_PROFILE_ID,
    };
    use rstest::*;

    #[fixture]
    fn full_adv() -> DiscoveryAdvertisement {
        let ind = UwbIndicationData::new(
            IndicationFlags {
                fira_uwb_support: true,
                regulatory_info_available_in_ad: true,
                profile_info_available_in_ad: true,
                ..Default::default()
            },
            -80,
            vec![],
        )
        .expect("indication");
        let reg = RegulatoryInfo::new(
            SourceOfInfo::SatelliteNavigationSystem,
            false,
            "DE",
            1_700_000_000,
            vec![ChannelPowerInfo {
                first_channel: 9,
                num_channels: 1,
                is_indoor: false,
                max_transmit_power_level: 14,
            }],
        )
        .expect("regulatory");
        let profile = FiraProfileSupportInfo::from_profile_ids(&[1, 2]).expect("profile");
        DiscoveryAdvertisement::new(
            ServiceUuid::ConnectorPrimary,
            Some(ind),
            Some(reg),
            Some(profile),
            vec![],
        )
    }

    #[fixture]
    fn vendor() -> VendorSpecificData {
        VendorSpecificData::new(0x0075, vec![0x01, 0x02, 0x03]).expect("vendor")
    }

    #[rstest]
    fn test_round_trip(full_adv: DiscoveryAdvertisement) {
        let bytes = full_adv.to_bytes(false);
        assert_eq!(bytes[0] as usize, bytes.len() - 1);
        assert_eq!(&bytes[1..4], &[0x16, 0xF3, 0xFF]);
        let parsed = DiscoveryAdvertisement::from_bytes(&bytes, None).expect("decode");
        assert_eq!(parsed, full_adv);
    }

    fn secure_components(count: u8) -> Vec<SecureComponentInfo> {
        (0..count)
            .map(|i| SecureComponentInfo {
                static_indication: i % 2 == 0,
                sec_id: 0x10 + i,
                component_type: SecureComponentType::Ese,
                protocol_type: SecureComponentProtocolType::Iso7816,
            })
            .collect()
    }

    fn channels(count: u8) -> Vec<ChannelPowerInfo> {
        (0..count)
            .map(|i| ChannelPowerInfo {
                first_channel: 5 + i,
                num_channels: 1,
                is_indoor: i % 2 == 1,
                max_transmit_power_level: 127 - i,
            })
            .collect()
    }

    #[rstest]
    #[case(Some(0), None, None, 2)]
    #[case(Some(6), None, None, 14)]
    #[case(None, Some(0), None, 7)]
    #[case(None, Some(4), None, 15)]
    #[case(None, None, Some(vec![0]), 1)]
    #[case(None, None, Some(vec![3, MAX_FIRA_PROFILE_ID]), 15)]
    fn test_round_trip_field_sizes(
        #[case] components: Option<u8>,
        #[case] channel_count: Option<u8>,
        #[case] profile_ids: Option<Vec<u8>>,
        #[case] payload_len: usize,
    ) {
        let ind = components.map(|n| {
            UwbIndicationData::new(IndicationFlags::default(), -40, secure_components(n))
                .expect("indication")
        });
        let reg = channel_count.map(|n| {
            RegulatoryInfo::new(SourceOfInfo::UserDefined, true, "GB", 0x0102_0304, channels(n))
                .expect("regulatory")
        });
        let profile = profile_ids
            .map(|ids| FiraProfileSupportInfo::from_profile_ids(&ids).expect("profile"));
        let adv = DiscoveryAdvertisement::new(ServiceUuid::ConnectorSecondary, ind, reg, profile, vec![]);

        let bytes = adv.to_bytes(true);
        assert_eq!(bytes.len(), ADVERTISEMENT_HEADER_LEN + 1 + payload_len);
        assert_eq!(bytes[0] as usize, bytes.len() - 1);
        assert_eq!(bytes[4] & 0x0F, payload_len as u8);
        let parsed = DiscoveryAdvertisement::from_bytes(&bytes, None).expect("decode");
        assert_eq!(parsed, adv);
    }

    #[test]
    fn test_round_trip_all_fields_at_max() {
        let adv = DiscoveryAdvertisement::new(
            ServiceUuid::ConnectorPrimary,
            Some(
                UwbIndicationData::new(IndicationFlags::default(), 0, secure_components(6))
                    .expect("indication"),
            ),
            Some(
                RegulatoryInfo::new(SourceOfInfo::CellularSystem, false, "NL", u32::MAX, channels(4))
                    .expect("regulatory"),
            ),
            Some(FiraProfileSupportInfo::from_profile_ids(&[MAX_FIRA_PROFILE_ID]).expect("profile")),
            vec![],
        );
        let bytes = adv.to_bytes(false);
        assert_eq!(bytes.len(), ADVERTISEMENT_HEADER_LEN + 15 + 16 + 16);
        assert_eq!(DiscoveryAdvertisement::from_bytes(&bytes, None).expect("decode"), adv);
    }

    #[test]
    fn test_header_only() {
        let adv = DiscoveryAdvertisement::from_bytes(&[0x03, 0x16, 0xF4, 0xFF], None)
            .expect("decode");
        assert_eq!(adv.service_uuid(), ServiceUuid::ConnectorSecondary);
        assert!(adv.uwb_indication_data().is_none());
        assert!(adv.regulatory_info().is_none());
        assert!(adv.fira_profile_support_info().is_none());
        assert!(adv.vendor_specific_data().is_empty());
    }

    #[rstest]
    #[case(&[], DecodeError::TooShort(0))]
    #[case(&[0x02, 0x16, 0xF3], DecodeError::TooShort(3))]
    #[case(&[0x04, 0x16, 0xF3, 0xFF], DecodeError::LengthMismatch { declared: 4, actual: 3 })]
    #[case(&[0x03, 0xFF, 0xF3, 0xFF], DecodeError::BadDataType(0xFF))]
    #[case(&[0x03, 0x16, 0xF5, 0xFF], DecodeError::UnknownServiceUuid(0xFFF5))]
    #[case(
        &[0x05, 0x16, 0xF3, 0xFF, 0x13, 0x00],
        DecodeError::TruncatedField { field_type: 1, declared: 3, remaining: 1 }
    )]
    #[case(&[0x04, 0x16, 0xF3, 0xFF, 0x50], DecodeError::UnknownFieldType(5))]
    #[case(
        &[0x09, 0x16, 0xF3, 0xFF, 0x12, 0x80, 0x00, 0x12, 0x80, 0x00],
        DecodeError::DuplicateField(FieldType::UwbIndicationData)
    )]
    #[case(
        &[0x05, 0x16, 0xF3, 0xFF, 0x11, 0x80],
        DecodeError::InvalidField(
            FieldType::UwbIndicationData,
            FieldError::TooShort { len: 1, min: 2 },
        )
    )]
    fn test_decode_errors(#[case] data: &[u8], #[case] expected: DecodeError) {
        assert_eq!(DiscoveryAdvertisement::from_bytes(data, None), Err(expected));
    }

    #[rstest]
    fn test_conflicting_vendor_sources(vendor: VendorSpecificData) {
        let adv = DiscoveryAdvertisement::new(
            ServiceUuid::ConnectorPrimary,
            None,
            None,
            None,
            vec![vendor.clone()],
        );
        let bytes = adv.to_bytes(true);
        assert_eq!(
            DiscoveryAdvertisement::from_bytes(&bytes, Some(vendor.to_bytes().as_slice())),
            Err(DecodeError::ConflictingVendorData)
        );
        assert_eq!(
            DiscoveryAdvertisement::from_bytes(&bytes, Some(&[][..])).expect("empty mfr data"),
            adv
        );
    }

    #[rstest]
    fn test_manufacturer_data_only(full_adv: DiscoveryAdvertisement, vendor: VendorSpecificData) {
        let bytes = full_adv.to_bytes(false);
        let adv = DiscoveryAdvertisement::from_bytes(&bytes, Some(vendor.to_bytes().as_slice()))
            .expect("decode");
        assert_eq!(adv.vendor_specific_data(), &[vendor]);
        assert_eq!(adv.uwb_indication_data(), full_adv.uwb_indication_data());
    }

    #[rstest]
    fn test_vendor_out_of_band(vendor: VendorSpecificData) {
        let second = VendorSpecificData::new(0x0006, vec![]).expect("vendor");
        let adv = DiscoveryAdvertisement::new(
            ServiceUuid::ConnectorSecondary,
            None,
            None,
            None,
            vec![vendor.clone(), second.clone()],
        );

        assert_eq!(adv.to_bytes(false), vec![0x03, 0x16, 0xF4, 0xFF]);
        assert_eq!(
            adv.manufacturer_specific_data_bytes(),
            Some(vec![0x75, 0x00, 0x01, 0x02, 0x03])
        );

        let inline = adv.to_bytes(true);
        assert_eq!(
            inline,
            vec![0x0C, 0x16, 0xF4, 0xFF, 0x25, 0x75, 0x00, 0x01, 0x02, 0x03, 0x22, 0x06, 0x00]
        );
        let parsed = DiscoveryAdvertisement::from_bytes(&inline, None).expect("decode");
        assert_eq!(parsed.vendor_specific_data(), &[vendor, second]);
    }

    #[test]
    fn test_no_manufacturer_data() {
        let adv = DiscoveryAdvertisement::new(ServiceUuid::ConnectorPrimary, None, None, None, vec![]);
        assert_eq!(adv.manufacturer_specific_data_bytes(), None);
    }

    #[rstest]
    fn test_json(full_adv: DiscoveryAdvertisement) {
        let json = serde_json::to_string(&full_adv).expect("serialize");
        let back: DiscoveryAdvertisement = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, full_adv);
    }
}
