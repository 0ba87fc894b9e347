use std::io::{stdout, Write};

use anyhow::Context;
use clap::{self, Args};

use nearby::utils::bytes_to_hex;
use nearby::uwb::{DiscoveryAdvertisement, RegulatoryInfo, UwbIndicationData};

use crate::parsers::{HexBytes, HexValueParser};

#[derive(Args)]
pub struct Decode {
    /// Manufacturer specific data seen alongside the service data, as hex
    #[arg(short, long, value_parser = HexValueParser)]
    manufacturer_data: Option<HexBytes>,

    /// Print the advertisement as JSON
    #[arg(long, action = clap::ArgAction::SetTrue, default_value_t = false)]
    json: bool,

    /// Service data AD structure as hex, starting with the length byte
    #[arg(value_parser = HexValueParser)]
    service_data: HexBytes,
}

impl Decode {
    pub fn run(&self) -> anyhow::Result<()> {
        let adv = DiscoveryAdvertisement::from_bytes(
            &self.service_data.0,
            self.manufacturer_data.as_ref().map(|it| it.0.as_slice()),
        )
        .with_context(|| format!("decoding {}", bytes_to_hex(&self.service_data.0)))?;

        let mut out = stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut out, &adv)?;
            writeln!(out)?;
        } else {
            print_advertisement(&mut out, &adv)?;
        }
        Ok(())
    }
}

fn print_indication(out: &mut impl Write, ind: &UwbIndicationData) -> anyhow::Result<()> {
    let flags = ind.flags();
    writeln!(out, "uwb indication data:")?;
    writeln!(out, "  fira uwb support: {}", flags.fira_uwb_support)?;
    writeln!(out, "  iso 14443 support: {}", flags.iso14443_support)?;
    writeln!(
        out,
        "  regulatory info in ad/oob: {}/{}",
        flags.regulatory_info_available_in_ad, flags.regulatory_info_available_in_oob
    )?;
    writeln!(
        out,
        "  profile info in ad/oob: {}/{}",
        flags.profile_info_available_in_ad, flags.profile_info_available_in_oob
    )?;
    writeln!(out, "  dual gap role: {}", flags.dual_gap_role_support)?;
    writeln!(
        out,
        "  bluetooth rssi threshold: {} dBm",
        ind.bluetooth_rssi_threshold_dbm()
    )?;
    for sc in ind.secure_components() {
        writeln!(
            out,
            "  secure component {:#04x}: {:?} over {:?}{}",
            sc.sec_id,
            sc.component_type,
            sc.protocol_type,
            if sc.static_indication { " (static)" } else { "" }
        )?;
    }
    Ok(())
}

fn print_regulatory(out: &mut impl Write, reg: &RegulatoryInfo) -> anyhow::Result<()> {
    writeln!(out, "regulatory info:")?;
    writeln!(out, "  source: {:?}", reg.source_of_info())?;
    writeln!(
        out,
        "  outdoors transmission permitted: {}",
        reg.outdoors_transmission_permitted()
    )?;
    writeln!(out, "  country: {}", reg.country_code())?;
    writeln!(out, "  timestamp: {}", reg.timestamp_secs())?;
    for cpi in reg.channel_power_info() {
        writeln!(
            out,
            "  channels {}+{}: max power {}{}",
            cpi.first_channel,
            cpi.num_channels,
            cpi.max_transmit_power_level,
            if cpi.is_indoor { " (indoor)" } else { "" }
        )?;
    }
    Ok(())
}

fn print_advertisement(out: &mut impl Write, adv: &DiscoveryAdvertisement) -> anyhow::Result<()> {
    writeln!(out, "service uuid: {}", adv.service_uuid())?;
    if let Some(ind) = adv.uwb_indication_data() {
        print_indication(out, ind)?;
    }
    if let Some(reg) = adv.regulatory_info() {
        print_regulatory(out, reg)?;
    }
    if let Some(profile) = adv.fira_profile_support_info() {
        writeln!(out, "fira profiles: {}", profile)?;
    }
    for vendor in adv.vendor_specific_data() {
        writeln!(
            out,
            "vendor {:#06x}: {}",
            vendor.vendor_id(),
            bytes_to_hex(vendor.data())
        )?;
    }
    Ok(())
}
