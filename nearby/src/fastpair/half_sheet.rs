use std::sync::Arc;

use super::{DiscoveryItem, HalfSheetManager, ProgressLogger};

/// Initial pairing, driven through the half sheet
pub struct HalfSheetFlow {
    manager: Arc<dyn HalfSheetManager>,
}

impl HalfSheetFlow {
    pub fn new(manager: Arc<dyn HalfSheetManager>) -> Self {
        Self { manager }
    }

    pub(super) fn on_pairing_started(&self, item: &DiscoveryItem, logger: &dyn ProgressLogger) {
        if self.manager.half_sheet_foreground_state() {
            logger.verbose("half sheet already in the foreground");
        } else {
            self.manager.show_pairing_half_sheet(item);
        }
        self.manager.disable_dismiss_runnable();
    }

    pub(super) fn on_handle_passkey_confirmation(&self, device: &str, passkey: u32) {
        self.manager.show_passkey_confirmation(device, passkey);
    }

    pub(super) fn on_paired(&self, address: &str) {
        self.manager.show_pairing_success_half_sheet(address);
    }

    pub(super) fn on_pairing_failed(&self) {
        self.manager.show_pairing_failed();
        self.manager.destroy_bluetooth_pair_controller();
    }

    pub(super) fn on_pairing_success(&self, address: &str, item: &DiscoveryItem) {
        self.manager.notify_pairing_process_done(true, address, item);
        self.manager.destroy_bluetooth_pair_controller();
    }
}
