//! The UI and account services a pairing handler talks to.
//!
//! Every call is fire-and-forget: the handler never waits on or inspects the
//! result of a side effect. The `Logging*` implementations only record what
//! would have been shown, which is what the CLI uses.

use blanket::blanket;

use super::DiscoveryItem;
use crate::utils::maybe_key_fingerprint;

/// The partial screen sheet used for initial pairing
#[blanket(derive(Ref, Box))]
pub trait HalfSheetManager: Send + Sync {
    fn show_pairing_half_sheet(&self, item: &DiscoveryItem);
    fn show_passkey_confirmation(&self, device: &str, passkey: u32);
    fn show_pairing_success_half_sheet(&self, address: &str);
    fn show_pairing_failed(&self);

    /// Keep the sheet from dismissing itself while pairing is underway
    fn disable_dismiss_runnable(&self);

    /// Tear down the controller so the device isn't paired again behind
    /// the user's back
    fn destroy_bluetooth_pair_controller(&self);

    fn notify_pairing_process_done(&self, success: bool, address: &str, item: &DiscoveryItem);

    /// Whether the half sheet is currently in the foreground
    fn half_sheet_foreground_state(&self) -> bool;
}

/// Heads up notifications used for subsequent pairing
#[blanket(derive(Ref, Box))]
pub trait NotificationManager: Send + Sync {
    fn show_connecting_notification(&self, item: &DiscoveryItem);
    fn show_pairing_succeeded_notification(
        &self,
        item: &DiscoveryItem,
        battery_level: i32,
        companion_app: Option<String>,
    );
    fn show_pairing_failed_notification(&self, item: &DiscoveryItem, account_key: Option<Vec<u8>>);
    fn notify_pairing_process_done(
        &self,
        success: bool,
        for_manual_pairing: bool,
        private_address: &str,
        public_address: Option<String>,
    );
}

/// The live connection to the device being paired
#[blanket(derive(Ref, Box))]
pub trait FastPairConnection: Send + Sync {
    /// Account key the device already had before this attempt
    fn existing_account_key(&self) -> Option<Vec<u8>>;
}

/// Cloud sync registration for paired devices
#[blanket(derive(Ref, Box))]
pub trait FootprintsDeviceManager: Send + Sync {
    fn opt_in(&self, item: &DiscoveryItem, account_key: &[u8]);
}

#[derive(Default)]
pub struct LoggingHalfSheetManager {
    foreground: bool,
}

impl LoggingHalfSheetManager {
    pub fn new(foreground: bool) -> Self {
        Self { foreground }
    }
}

impl HalfSheetManager for LoggingHalfSheetManager {
    fn show_pairing_half_sheet(&self, item: &DiscoveryItem) {
        log::info!("[half sheet] pairing {}", item.display_name());
    }

    fn show_passkey_confirmation(&self, device: &str, passkey: u32) {
        log::info!("[half sheet] confirm passkey {:06} for {}", passkey, device);
    }

    fn show_pairing_success_half_sheet(&self, address: &str) {
        log::info!("[half sheet] paired with {}", address);
    }

    fn show_pairing_failed(&self) {
        log::info!("[half sheet] pairing failed");
    }

    fn disable_dismiss_runnable(&self) {
        log::debug!("[half sheet] auto dismiss disabled");
    }

    fn destroy_bluetooth_pair_controller(&self) {
        log::debug!("[half sheet] pair controller destroyed");
    }

    fn notify_pairing_process_done(&self, success: bool, address: &str, item: &DiscoveryItem) {
        log::info!(
            "[half sheet] pairing {} done for {} (success: {})",
            item.display_name(),
            address,
            success
        );
    }

    fn half_sheet_foreground_state(&self) -> bool {
        self.foreground
    }
}

#[derive(Default)]
pub struct LoggingNotificationManager;

impl NotificationManager for LoggingNotificationManager {
    fn show_connecting_notification(&self, item: &DiscoveryItem) {
        log::info!("[notification] connecting to {}", item.display_name());
    }

    fn show_pairing_succeeded_notification(
        &self,
        item: &DiscoveryItem,
        battery_level: i32,
        companion_app: Option<String>,
    ) {
        log::info!(
            "[notification] {} connected, battery {}, companion app {}",
            item.display_name(),
            battery_level,
            companion_app.as_deref().unwrap_or("<none>")
        );
    }

    fn show_pairing_failed_notification(&self, item: &DiscoveryItem, account_key: Option<Vec<u8>>) {
        log::info!(
            "[notification] couldn't connect to {} (account key {})",
            item.display_name(),
            maybe_key_fingerprint(account_key.as_deref())
        );
    }

    fn notify_pairing_process_done(
        &self,
        success: bool,
        for_manual_pairing: bool,
        private_address: &str,
        public_address: Option<String>,
    ) {
        log::info!(
            "[notification] pairing done for {} / {} (success: {}, manual: {})",
            private_address,
            public_address.as_deref().unwrap_or("<none>"),
            success,
            for_manual_pairing
        );
    }
}

#[derive(Default)]
pub struct LoggingFootprints;

impl FootprintsDeviceManager for LoggingFootprints {
    fn opt_in(&self, item: &DiscoveryItem, account_key: &[u8]) {
        log::info!(
            "[footprints] opted {} in with account key {}",
            item.mac_address(),
            maybe_key_fingerprint(Some(account_key))
        );
    }
}

/// A connection whose existing account key is fixed up front
#[derive(Debug, Clone, Default)]
pub struct StaticConnection {
    existing_account_key: Option<Vec<u8>>,
}

impl StaticConnection {
    pub fn new(existing_account_key: Option<Vec<u8>>) -> Self {
        Self {
            existing_account_key,
        }
    }
}

impl FastPairConnection for StaticConnection {
    fn existing_account_key(&self) -> Option<Vec<u8>> {
        self.existing_account_key.clone()
    }
}
