use std::time::Duration;

/// Connection tuning shared by every step of a pairing attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub gatt_operation_timeout: Duration,
    pub gatt_connection_timeout: Duration,
    pub num_connect_attempts: u32,
    pub pairing_timeout: Duration,
    pub enable_bond_before_pairing: bool,
    pub accept_passkey: bool,
    pub ignore_discovery_error: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            gatt_operation_timeout: Duration::from_secs(3),
            gatt_connection_timeout: Duration::from_secs(15),
            num_connect_attempts: 2,
            pairing_timeout: Duration::from_secs(15),
            enable_bond_before_pairing: false,
            accept_passkey: true,
            ignore_discovery_error: true,
        }
    }
}

/// Handed to the handler before pairing begins so a flow can adjust the
/// connection behaviour.
#[derive(Debug, Clone, Default)]
pub struct PreferencesBuilder {
    prefs: Preferences,
}

impl PreferencesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gatt_operation_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.prefs.gatt_operation_timeout = timeout;
        self
    }

    pub fn gatt_connection_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.prefs.gatt_connection_timeout = timeout;
        self
    }

    pub fn num_connect_attempts(&mut self, attempts: u32) -> &mut Self {
        self.prefs.num_connect_attempts = attempts;
        self
    }

    pub fn pairing_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.prefs.pairing_timeout = timeout;
        self
    }

    pub fn enable_bond_before_pairing(&mut self, enable: bool) -> &mut Self {
        self.prefs.enable_bond_before_pairing = enable;
        self
    }

    pub fn accept_passkey(&mut self, accept: bool) -> &mut Self {
        self.prefs.accept_passkey = accept;
        self
    }

    pub fn ignore_discovery_error(&mut self, ignore: bool) -> &mut Self {
        self.prefs.ignore_discovery_error = ignore;
        self
    }

    pub fn build(&self) -> Preferences {
        self.prefs.clone()
    }
}
