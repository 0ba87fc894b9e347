use std::path::PathBuf;

use anyhow::Context;
use clap::{self, Args};

use nearby::config::{default_config_path, SimulationConfig};
use nearby::fastpair::{
    Collaborators, LoggingFootprints, PairingProgressHandler, PreferencesBuilder, StaticConnection,
};
use nearby::utils::maybe_key_fingerprint;

#[derive(Args)]
pub struct Simulate {
    /// Scenario file, defaults to `$NEARBY_CONFIG` or the user config dir
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Simulate {
    pub fn run(&self) -> anyhow::Result<()> {
        let path = match &self.config {
            Some(p) => p.clone(),
            None => default_config_path().with_context(|| "finding the default config")?,
        };
        let cfg = SimulationConfig::parse(&path)
            .with_context(|| format!("loading scenario from {}", path.display()))?;

        let collaborators = Collaborators::logging(cfg.flow.half_sheet_foreground);
        let handler = drive(&cfg, &collaborators);

        println!(
            "{} {} flow for {} by {} ended {} (events {} / {})",
            if handler.is_subsequent_pairing() {
                "subsequent"
            } else {
                "initial"
            },
            handler.flow().name(),
            handler.item().display_name(),
            handler.company_name(),
            handler.stage(),
            handler.pair_start_event_code(),
            handler.pair_end_event_code(),
        );
        Ok(())
    }
}

/// Play the orchestrator: invoke every callback of one pairing attempt in
/// order and return the handler once the attempt is over.
fn drive(cfg: &SimulationConfig, collaborators: &Collaborators) -> PairingProgressHandler {
    let mut handler = PairingProgressHandler::create(
        cfg.item.clone(),
        &cfg.company_name,
        cfg.account_key.clone(),
        collaborators,
    );
    let flow = &cfg.flow;
    let private_address = cfg.item.mac_address().to_string();
    let public_address = flow.public_address.to_string();

    handler.on_pairing_started();

    if flow.wait_for_unlock && !handler.skip_waiting_screen_unlock() {
        handler.on_wait_for_screen_unlock();
        handler.on_screen_unlocked();
    }

    let mut prefs = PreferencesBuilder::new();
    handler.on_setup_preferences_builder(&mut prefs);
    log::debug!("pairing with {:?}", prefs.build());

    handler.on_ready_to_pair();
    handler.on_pairing_setup_completed();

    if let Some(passkey) = flow.passkey {
        handler.on_handle_passkey_confirmation(&private_address, passkey);
    }

    if let Some(err) = &flow.fail {
        handler.on_pairing_failed(err);
        return handler;
    }

    let connection = StaticConnection::new(flow.existing_account_key.clone());
    if let Some(name) = handler.on_paired_callback_called(
        &connection,
        cfg.account_key.as_deref(),
        &LoggingFootprints,
        &public_address,
    ) {
        log::info!("device renamed to {}", name);
    }

    let cache_key = handler.key_for_local_cache(cfg.account_key.as_deref(), &connection, &[]);
    log::info!(
        "caching {} under account key {}",
        private_address,
        maybe_key_fingerprint(cache_key.as_deref())
    );

    handler.on_pairing_success(&public_address);
    handler
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use nearby::fastpair::{EventCode, FlowVariant, PairingStage};
    use rstest::*;

    fn scenario(extra_root: &str, extra_item: &str, extra_flow: &str) -> SimulationConfig {
        let dir = tempfile::tempdir().expect("tmp dir");
        let file = dir.path().join("simulate.toml");
        let content = format!(
            r#"
company-name = "Acme"
{extra_root}

[item]
mac = "12:34:56:78:9A:BC"
{extra_item}

[flow]
public-address = "AA:BB:CC:DD:EE:FF"
{extra_flow}
"#
        );
        fs::write(&file, content).expect("write scenario");
        SimulationConfig::parse(&file).expect("parse scenario")
    }

    #[rstest]
    #[case("", "", "", PairingStage::Succeeded, EventCode::MagicPairEnd)]
    #[case("", "", "fail = \"timeout\"", PairingStage::Failed, EventCode::MagicPairEnd)]
    #[case(
        "account-key = \"04112233445566778899aabbccddeeff\"",
        "auth-key = \"AQIDBA==\"",
        "passkey = 123456\nwait-for-unlock = true",
        PairingStage::Succeeded,
        EventCode::SubsequentPairEnd
    )]
    fn test_drive(
        #[case] root: &str,
        #[case] item: &str,
        #[case] flow: &str,
        #[case] stage: PairingStage,
        #[case] end_code: EventCode,
    ) {
        let cfg = scenario(root, item, flow);
        let handler = drive(&cfg, &Collaborators::logging(false));
        assert_eq!(handler.stage(), stage);
        assert_eq!(handler.pair_end_event_code(), end_code);
        assert_eq!(handler.company_name(), "Acme");
        assert_eq!(
            handler.is_subsequent_pairing(),
            end_code == EventCode::SubsequentPairEnd
        );
        assert_eq!(
            matches!(handler.flow(), FlowVariant::Notification(_)),
            end_code == EventCode::SubsequentPairEnd
        );
    }
}
