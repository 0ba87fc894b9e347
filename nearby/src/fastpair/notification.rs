use std::sync::Arc;

use super::{DiscoveryItem, NotificationManager, BATTERY_LEVEL_UNKNOWN};

/// Subsequent pairing, driven through heads up notifications
pub struct NotificationFlow {
    manager: Arc<dyn NotificationManager>,
}

impl NotificationFlow {
    pub fn new(manager: Arc<dyn NotificationManager>) -> Self {
        Self { manager }
    }

    pub(super) fn on_ready_to_pair(&self, item: &DiscoveryItem) {
        self.manager.show_connecting_notification(item);
    }

    pub(super) fn on_paired(&self, item: &DiscoveryItem) {
        // No battery source is wired up yet
        let battery_level = BATTERY_LEVEL_UNKNOWN;
        self.manager.show_pairing_succeeded_notification(
            item,
            battery_level,
            item.app_name().map(String::from),
        );
    }

    pub(super) fn on_pairing_failed(&self, item: &DiscoveryItem, account_key: Option<&[u8]>) {
        self.manager
            .show_pairing_failed_notification(item, account_key.map(<[u8]>::to_vec));
        self.manager.notify_pairing_process_done(
            false,
            false,
            &item.mac_address().to_string(),
            None,
        );
    }

    pub(super) fn on_pairing_success(&self, address: &str, item: &DiscoveryItem) {
        self.manager.notify_pairing_process_done(
            true,
            false,
            &item.mac_address().to_string(),
            Some(address.into()),
        );
    }
}
