use std::fs::File;
use std::io::{stdin, BufReader, Read};
use std::path::PathBuf;

use anyhow::Context;
use clap::{self, Args};

use nearby::utils::bytes_to_hex;
use nearby::uwb::DiscoveryAdvertisement;

#[derive(Args)]
pub struct Encode {
    /// Leave vendor data out of the service data and print it separately as
    /// manufacturer specific data
    #[arg(long, action = clap::ArgAction::SetTrue, default_value_t = false)]
    no_vendor: bool,

    /// JSON file describing the advertisement, `-` for stdin
    #[arg()]
    file: PathBuf,
}

/// Hex lines printed for an advertisement
pub(crate) fn encode_lines(adv: &DiscoveryAdvertisement, include_vendor: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "service data: {}",
        bytes_to_hex(&adv.to_bytes(include_vendor))
    )];
    if !include_vendor {
        if let Some(mfr) = adv.manufacturer_specific_data_bytes() {
            lines.push(format!("manufacturer data: {}", bytes_to_hex(&mfr)));
        }
    }
    lines
}

impl Encode {
    fn read_input(&self) -> anyhow::Result<String> {
        let mut content = String::new();
        if self.file.as_os_str() == "-" {
            stdin()
                .read_to_string(&mut content)
                .with_context(|| "reading stdin")?;
        } else {
            let f = File::open(&self.file)
                .with_context(|| format!("opening {}", self.file.display()))?;
            BufReader::new(f)
                .read_to_string(&mut content)
                .with_context(|| format!("reading {}", self.file.display()))?;
        }
        Ok(content)
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let content = self.read_input()?;
        let adv: DiscoveryAdvertisement =
            serde_json::from_str(&content).with_context(|| "parsing advertisement JSON")?;
        log::debug!("encoding {:?}", adv);

        for line in encode_lines(&adv, !self.no_vendor) {
            println!("{}", line);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    const ADV_JSON: &str = r#"{
        "service-uuid": "connector-primary",
        "uwb-indication-data": {
            "flags": {"fira-uwb-support": true},
            "bluetooth-rssi-threshold-dbm": -70
        },
        "vendor-specific-data": [{"vendor-id": 76, "data": "01"}]
    }"#;

    #[rstest]
    #[case(true, vec!["service data: 0a16f3ff1280ba234c0001"])]
    #[case(false, vec!["service data: 0616f3ff1280ba", "manufacturer data: 4c0001"])]
    fn test_encode_lines(#[case] include_vendor: bool, #[case] expected: Vec<&str>) {
        let adv: DiscoveryAdvertisement = serde_json::from_str(ADV_JSON).expect("json");
        assert_eq!(encode_lines(&adv, include_vendor), expected);
    }
}
