use std::fmt::{self, Display};
use std::str::FromStr;

use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref MAC_REGEX: Regex =
        Regex::new(r"^([0-9A-Fa-f]{2})(?::([0-9A-Fa-f]{2})){5}$").expect("valid regex");
}

/// A Bluetooth device address, always displayed in the upper case,
/// colon separated form Android uses (`AA:BB:CC:DD:EE:FF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> &[u8; 6] {
        &self.0
    }
}

impl Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.0.iter().map(|b| format!("{:02X}", b)).join(":")
        )
    }
}

impl FromStr for MacAddress {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !MAC_REGEX.is_match(s) {
            return Err(crate::Error::InvalidMac(s.into()));
        }
        let mut octets = [0u8; 6];
        for (i, part) in s.split(':').enumerate() {
            octets[i] =
                u8::from_str_radix(part, 16).map_err(|_| crate::Error::InvalidMac(s.into()))?;
        }
        Ok(Self(octets))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(value: MacAddress) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("AA:BB:CC:DD:EE:FF", [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF])]
    #[case("aa:bb:cc:dd:ee:ff", [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF])]
    #[case(" 00:11:22:33:44:55 ", [0x00, 0x11, 0x22, 0x33, 0x44, 0x55])]
    fn test_parse_mac(#[case] input: &str, #[case] octets: [u8; 6]) {
        let mac: MacAddress = input.parse().expect("valid mac");
        assert_eq!(mac.octets(), &octets);
    }

    #[rstest]
    #[case("AA:BB:CC:DD:EE")]
    #[case("AA-BB-CC-DD-EE-FF")]
    #[case("AABBCCDDEEFF")]
    #[case("GG:BB:CC:DD:EE:FF")]
    fn test_parse_bad_mac(#[case] input: &str) {
        assert!(input.parse::<MacAddress>().is_err());
    }

    #[test]
    fn test_display_mac() {
        let mac = MacAddress::new([0x0A, 0x1B, 0x2C, 0x3D, 0x4E, 0x5F]);
        assert_eq!(mac.to_string(), "0A:1B:2C:3D:4E:5F");
    }
}
