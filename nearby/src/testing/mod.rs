use mockall::mock;
use rstest::fixture;

use crate::fastpair::{DiscoveryItem, PairingEvent};

mock! {
    pub HalfSheetManager {

    }

    impl crate::fastpair::HalfSheetManager for HalfSheetManager {
        fn show_pairing_half_sheet(&self, item: &DiscoveryItem);
        fn show_passkey_confirmation(&self, device: &str, passkey: u32);
        fn show_pairing_success_half_sheet(&self, address: &str);
        fn show_pairing_failed(&self);
        fn disable_dismiss_runnable(&self);
        fn destroy_bluetooth_pair_controller(&self);
        fn notify_pairing_process_done(&self, success: bool, address: &str, item: &DiscoveryItem);
        fn half_sheet_foreground_state(&self) -> bool;
    }
}

mock! {
    pub NotificationManager {

    }

    impl crate::fastpair::NotificationManager for NotificationManager {
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
}

mock! {
    pub FastPairConnection {

    }

    impl crate::fastpair::FastPairConnection for FastPairConnection {
        fn existing_account_key(&self) -> Option<Vec<u8>>;
    }
}

mock! {
    pub FootprintsDeviceManager {

    }

    impl crate::fastpair::FootprintsDeviceManager for FootprintsDeviceManager {
        fn opt_in(&self, item: &DiscoveryItem, account_key: &[u8]);
    }
}

mock! {
    pub EventLogger {

    }

    impl crate::fastpair::EventLogger for EventLogger {
        fn log_event(&self, event: &PairingEvent);
    }
}

mock! {
    pub ProgressLogger {

    }

    impl crate::fastpair::ProgressLogger for ProgressLogger {
        fn verbose(&self, msg: &str);
        fn warn(&self, msg: &str);
    }
}

/// Accepts any number of log lines
#[fixture]
pub fn quiet_logger() -> MockProgressLogger {
    let mut logger = MockProgressLogger::new();
    logger.expect_verbose().return_const(());
    logger.expect_warn().return_const(());
    logger
}

/// Accepts any number of telemetry events
#[fixture]
pub fn quiet_events() -> MockEventLogger {
    let mut events = MockEventLogger::new();
    events.expect_log_event().return_const(());
    events
}

#[fixture]
pub fn account_key() -> Vec<u8> {
    vec![
        0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE,
        0xFF,
    ]
}

/// A provisioned device with a companion app
#[fixture]
pub fn fp_item() -> DiscoveryItem {
    DiscoveryItem::new("12:34:56:78:9A:BC".parse().expect("valid mac"))
        .with_authentication_public_key(vec![0x42; 64])
        .with_title("Acme Buds")
        .with_app_name("Acme Audio")
}
