use blanket::blanket;

/// Diagnostic logger handed to a [super::PairingProgressHandler]
#[blanket(derive(Ref, Box))]
pub trait ProgressLogger: Send + Sync {
    fn verbose(&self, msg: &str);
    fn warn(&self, msg: &str);
}

pub const DEFAULT_LOG_TARGET: &str = "nearby::fastpair";

/// [ProgressLogger] that forwards to the `log` facade
pub struct LogFacade {
    target: String,
}

impl LogFacade {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Default for LogFacade {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_TARGET)
    }
}

impl ProgressLogger for LogFacade {
    fn verbose(&self, msg: &str) {
        log::debug!(target: &self.target, "{}", msg);
    }

    fn warn(&self, msg: &str) {
        log::warn!(target: &self.target, "{}", msg);
    }
}
