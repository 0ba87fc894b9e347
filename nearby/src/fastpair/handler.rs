use std::fmt::Display;
use std::sync::Arc;

use super::{
    DiscoveryItem, EventCode, EventLogger, FastPairConnection, FootprintsDeviceManager,
    HalfSheetFlow, HalfSheetManager, LogFacade, LoggingEventLogger, LoggingHalfSheetManager,
    LoggingNotificationManager, NotificationFlow, NotificationManager, PairingError,
    PairingEvent, PairingOutcome, PreferencesBuilder, ProgressLogger,
};
use crate::utils::maybe_key_fingerprint;

/// Where a pairing attempt is, as far as the handler has been told.
///
/// Only used for diagnostics: the orchestrator decides the order of the
/// callbacks and the handler never refuses one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingStage {
    Created,
    Started,
    WaitingForScreenUnlock,
    ScreenUnlocked,
    ReadyToPair,
    SetupCompleted,
    PasskeyConfirmation,
    PairedCallbackCalled,
    Succeeded,
    Failed,
}

impl PairingStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl Display for PairingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::WaitingForScreenUnlock => "waiting for screen unlock",
            Self::ScreenUnlocked => "screen unlocked",
            Self::ReadyToPair => "ready to pair",
            Self::SetupCompleted => "setup completed",
            Self::PasskeyConfirmation => "passkey confirmation",
            Self::PairedCallbackCalled => "paired callback called",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Everything a handler needs from the outside world
#[derive(Clone)]
pub struct Collaborators {
    pub half_sheet: Arc<dyn HalfSheetManager>,
    pub notifications: Arc<dyn NotificationManager>,
    pub events: Arc<dyn EventLogger>,
    pub logger: Arc<dyn ProgressLogger>,
}

impl Collaborators {
    /// Collaborators that only write to the `log` facade
    pub fn logging(half_sheet_foreground: bool) -> Self {
        Self {
            half_sheet: Arc::new(LoggingHalfSheetManager::new(half_sheet_foreground)),
            notifications: Arc::new(LoggingNotificationManager),
            events: Arc::new(LoggingEventLogger),
            logger: Arc::new(LogFacade::default()),
        }
    }
}

pub enum FlowVariant {
    Notification(NotificationFlow),
    HalfSheet(HalfSheetFlow),
}

impl FlowVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Notification(_) => "notification",
            Self::HalfSheet(_) => "half sheet",
        }
    }
}

/// Turns the callbacks of a single pairing attempt into UI and telemetry
/// side effects.
///
/// Callbacks never fail; a failed attempt is reported through
/// [PairingProgressHandler::on_pairing_failed].
pub struct PairingProgressHandler {
    item: DiscoveryItem,
    company_name: String,
    account_key: Option<Vec<u8>>,
    subsequent: bool,
    flow: FlowVariant,
    events: Arc<dyn EventLogger>,
    logger: Arc<dyn ProgressLogger>,
    stage: PairingStage,
}

impl PairingProgressHandler {
    /// Pick the flow for a new pairing attempt.
    ///
    /// A device that carries an authentication key and comes with an account
    /// key is being paired again, which is done through notifications.
    /// Everything else is an initial pairing shown in the half sheet.
    pub fn create(
        item: DiscoveryItem,
        company_name: &str,
        account_key: Option<Vec<u8>>,
        collaborators: &Collaborators,
    ) -> Self {
        let subsequent = item.has_authentication_public_key() && account_key.is_some();
        let flow = if subsequent {
            FlowVariant::Notification(NotificationFlow::new(Arc::clone(
                &collaborators.notifications,
            )))
        } else {
            FlowVariant::HalfSheet(HalfSheetFlow::new(Arc::clone(&collaborators.half_sheet)))
        };

        collaborators.logger.verbose(&format!(
            "{} flow for {} from {} (account key {})",
            flow.name(),
            item.mac_address(),
            company_name,
            maybe_key_fingerprint(account_key.as_deref())
        ));

        Self {
            item,
            company_name: company_name.into(),
            account_key,
            subsequent,
            flow,
            events: Arc::clone(&collaborators.events),
            logger: Arc::clone(&collaborators.logger),
            stage: PairingStage::Created,
        }
    }

    pub fn item(&self) -> &DiscoveryItem {
        &self.item
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn flow(&self) -> &FlowVariant {
        &self.flow
    }

    pub fn stage(&self) -> PairingStage {
        self.stage
    }

    pub fn is_subsequent_pairing(&self) -> bool {
        self.subsequent
    }

    pub fn pair_start_event_code(&self) -> EventCode {
        EventCode::start(self.subsequent)
    }

    pub fn pair_end_event_code(&self) -> EventCode {
        EventCode::end(self.subsequent)
    }

    fn enter(&mut self, next: PairingStage) {
        if self.stage.is_terminal() {
            self.logger.warn(&format!(
                "{}: {} after pairing already {}",
                self.item.mac_address(),
                next,
                self.stage
            ));
            return;
        }
        self.logger.verbose(&format!(
            "{}: {} -> {}",
            self.item.mac_address(),
            self.stage,
            next
        ));
        self.stage = next;
    }

    pub fn on_pairing_started(&mut self) {
        self.enter(PairingStage::Started);
        self.events.log_event(&PairingEvent::Start {
            code: self.pair_start_event_code(),
            device: *self.item.mac_address(),
        });
        match &self.flow {
            FlowVariant::HalfSheet(flow) => flow.on_pairing_started(&self.item, self.logger.as_ref()),
            FlowVariant::Notification(_) => {}
        }
    }

    pub fn on_wait_for_screen_unlock(&mut self) {
        self.enter(PairingStage::WaitingForScreenUnlock);
    }

    pub fn on_screen_unlocked(&mut self) {
        self.enter(PairingStage::ScreenUnlocked);
    }

    /// Whether the orchestrator may start pairing while the screen is
    /// locked. Neither flow allows it so the result is always seen as a
    /// heads up.
    pub fn skip_waiting_screen_unlock(&self) -> bool {
        match &self.flow {
            FlowVariant::HalfSheet(_) | FlowVariant::Notification(_) => false,
        }
    }

    pub fn on_ready_to_pair(&mut self) {
        self.enter(PairingStage::ReadyToPair);
        match &self.flow {
            FlowVariant::Notification(flow) => flow.on_ready_to_pair(&self.item),
            FlowVariant::HalfSheet(_) => {}
        }
    }

    pub fn on_setup_preferences_builder(&self, _builder: &mut PreferencesBuilder) {
        self.logger.verbose(&format!(
            "{}: {} flow keeps the default preferences",
            self.item.mac_address(),
            self.flow.name()
        ));
    }

    pub fn on_pairing_setup_completed(&mut self) {
        self.enter(PairingStage::SetupCompleted);
    }

    pub fn on_handle_passkey_confirmation(&mut self, device: &str, passkey: u32) {
        self.enter(PairingStage::PasskeyConfirmation);
        match &self.flow {
            FlowVariant::HalfSheet(flow) => flow.on_handle_passkey_confirmation(device, passkey),
            FlowVariant::Notification(_) => self
                .logger
                .verbose(&format!("{}: passkey confirmation handled elsewhere", device)),
        }
    }

    /// Called once the device is bonded. Returns a display name for the
    /// device if the flow has a better one than the item's; neither does.
    pub fn on_paired_callback_called(
        &mut self,
        connection: &dyn FastPairConnection,
        account_key: Option<&[u8]>,
        footprints: &dyn FootprintsDeviceManager,
        address: &str,
    ) -> Option<String> {
        self.enter(PairingStage::PairedCallbackCalled);
        self.opt_in_footprints_for_initial_pairing(connection, account_key, footprints);
        match &self.flow {
            FlowVariant::HalfSheet(flow) => flow.on_paired(address),
            FlowVariant::Notification(flow) => flow.on_paired(&self.item),
        }
        None
    }

    fn opt_in_footprints_for_initial_pairing(
        &self,
        connection: &dyn FastPairConnection,
        account_key: Option<&[u8]>,
        footprints: &dyn FootprintsDeviceManager,
    ) {
        let Some(key) = account_key else {
            self.logger.verbose("no account key, not opting in");
            return;
        };
        if !self.item.has_authentication_public_key() {
            self.logger
                .verbose("device has no authentication key, not opting in");
            return;
        }
        let existing = connection.existing_account_key();
        if existing.as_deref() == Some(key) {
            self.logger.verbose(&format!(
                "account key {} already registered",
                maybe_key_fingerprint(Some(key))
            ));
            return;
        }
        footprints.opt_in(&self.item, key);
    }

    /// Key to file the device under in the local cache: the new account key,
    /// or the one the device already had.
    pub fn key_for_local_cache(
        &self,
        account_key: Option<&[u8]>,
        connection: &dyn FastPairConnection,
        _shared_secret: &[u8],
    ) -> Option<Vec<u8>> {
        match account_key {
            Some(key) => Some(key.to_vec()),
            None => connection.existing_account_key(),
        }
    }

    pub fn on_pairing_failed(&mut self, error: &PairingError) {
        self.enter(PairingStage::Failed);
        self.logger.warn(&format!(
            "pairing {} failed: {}",
            self.item.mac_address(),
            error
        ));
        self.events.log_event(&PairingEvent::End {
            code: self.pair_end_event_code(),
            device: *self.item.mac_address(),
            outcome: PairingOutcome::Failure(error.clone()),
        });
        match &self.flow {
            FlowVariant::HalfSheet(flow) => flow.on_pairing_failed(),
            FlowVariant::Notification(flow) => {
                flow.on_pairing_failed(&self.item, self.account_key.as_deref())
            }
        }
    }

    pub fn on_pairing_success(&mut self, address: &str) {
        self.enter(PairingStage::Succeeded);
        self.events.log_event(&PairingEvent::End {
            code: self.pair_end_event_code(),
            device: *self.item.mac_address(),
            outcome: PairingOutcome::Success,
        });
        match &self.flow {
            FlowVariant::HalfSheet(flow) => flow.on_pairing_success(address, &self.item),
            FlowVariant::Notification(flow) => flow.on_pairing_success(address, &self.item),
        }
    }
}
