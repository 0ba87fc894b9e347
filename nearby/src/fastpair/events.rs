use std::fmt::Display;

use blanket::blanket;

use super::PairingError;
use crate::utils::MacAddress;

/// Telemetry event codes reported at the start and end of a pairing attempt
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCode {
    MagicPairStart = 1010,
    MagicPairEnd = 1020,
    SubsequentPairStart = 1110,
    SubsequentPairEnd = 1120,
}

impl EventCode {
    pub fn start(subsequent: bool) -> Self {
        if subsequent {
            Self::SubsequentPairStart
        } else {
            Self::MagicPairStart
        }
    }

    pub fn end(subsequent: bool) -> Self {
        if subsequent {
            Self::SubsequentPairEnd
        } else {
            Self::MagicPairEnd
        }
    }

    pub fn value(&self) -> i32 {
        *self as i32
    }
}

impl Display for EventCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::MagicPairStart => "MAGIC_PAIR_START",
            Self::MagicPairEnd => "MAGIC_PAIR_END",
            Self::SubsequentPairStart => "SUBSEQUENT_PAIR_START",
            Self::SubsequentPairEnd => "SUBSEQUENT_PAIR_END",
        };
        write!(f, "{}({})", name, self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingOutcome {
    Success,
    Failure(PairingError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairingEvent {
    Start {
        code: EventCode,
        device: MacAddress,
    },
    End {
        code: EventCode,
        device: MacAddress,
        outcome: PairingOutcome,
    },
}

impl PairingEvent {
    pub fn code(&self) -> EventCode {
        match self {
            Self::Start { code, .. } | Self::End { code, .. } => *code,
        }
    }
}

/// Sink for pairing telemetry
#[blanket(derive(Ref, Box))]
pub trait EventLogger: Send + Sync {
    fn log_event(&self, event: &PairingEvent);
}

/// [EventLogger] that writes events to the `log` facade
#[derive(Default)]
pub struct LoggingEventLogger;

impl EventLogger for LoggingEventLogger {
    fn log_event(&self, event: &PairingEvent) {
        match event {
            PairingEvent::Start { code, device } => {
                log::info!("event {} for {}", code, device)
            }
            PairingEvent::End {
                code,
                device,
                outcome: PairingOutcome::Success,
            } => log::info!("event {} for {}: success", code, device),
            PairingEvent::End {
                code,
                device,
                outcome: PairingOutcome::Failure(err),
            } => log::info!("event {} for {}: failed ({})", code, device, err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(true, EventCode::SubsequentPairStart, EventCode::SubsequentPairEnd)]
    #[case(false, EventCode::MagicPairStart, EventCode::MagicPairEnd)]
    fn test_event_codes(
        #[case] subsequent: bool,
        #[case] start: EventCode,
        #[case] end: EventCode,
    ) {
        assert_eq!(EventCode::start(subsequent), start);
        assert_eq!(EventCode::end(subsequent), end);
    }

    #[test]
    fn test_event_code_display() {
        assert_eq!(EventCode::MagicPairEnd.to_string(), "MAGIC_PAIR_END(1020)");
    }
}
