//! Fast Pair pairing progress handling.
//!
//! An orchestrator (the Bluetooth pairing code, or the `simulate` command)
//! creates one [PairingProgressHandler] per pairing attempt and drives it
//! through its callbacks. The handler turns each step into UI and telemetry
//! side effects through the injected collaborators.

use thiserror::Error;

pub mod item;
pub use item::DiscoveryItem;

pub mod events;
pub use events::{EventCode, EventLogger, LoggingEventLogger, PairingEvent, PairingOutcome};

pub mod logging;
pub use logging::{LogFacade, ProgressLogger};

pub mod managers;
pub use managers::*;

pub mod preferences;
pub use preferences::{Preferences, PreferencesBuilder};

mod half_sheet;
pub use half_sheet::HalfSheetFlow;

mod notification;
pub use notification::NotificationFlow;

pub mod handler;
pub use handler::{Collaborators, FlowVariant, PairingProgressHandler, PairingStage};

/// Battery level reported to the paired notification when it isn't known
pub const BATTERY_LEVEL_UNKNOWN: i32 = -1;

/// Why a pairing attempt failed, as reported by the orchestrator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PairingError {
    #[error("pairing timed out")]
    Timeout,

    #[error("bonding with the device failed")]
    BondFailed,

    #[error("passkey mismatch")]
    PasskeyMismatch,

    #[error("{0}")]
    Other(String),
}

impl std::str::FromStr for PairingError {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "timeout" => Self::Timeout,
            "bond-failed" => Self::BondFailed,
            "passkey-mismatch" => Self::PasskeyMismatch,
            _ => {
                return Err(crate::Error::new_generic(&format!(
                    "unknown pairing failure `{}`, expected timeout, bond-failed or passkey-mismatch",
                    s
                )))
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("timeout", PairingError::Timeout)]
    #[case("bond-failed", PairingError::BondFailed)]
    #[case("passkey-mismatch", PairingError::PasskeyMismatch)]
    fn test_parse_pairing_error(#[case] raw: &str, #[case] expected: PairingError) {
        assert_eq!(raw.parse::<PairingError>().expect("parse"), expected);
    }

    #[test]
    fn test_parse_unknown_pairing_error() {
        assert!(matches!(
            "meteor".parse::<PairingError>(),
            Err(crate::Error::Generic(_))
        ));
    }
}
