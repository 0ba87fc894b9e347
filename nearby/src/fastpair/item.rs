use crate::utils::MacAddress;

/// A Fast Pair peripheral found by the scanner.
///
/// The handler only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryItem {
    mac_address: MacAddress,
    authentication_public_key: Option<Vec<u8>>,
    title: Option<String>,
    app_name: Option<String>,
    trigger_id: Option<String>,
}

impl DiscoveryItem {
    pub fn new(mac_address: MacAddress) -> Self {
        Self {
            mac_address,
            authentication_public_key: None,
            title: None,
            app_name: None,
            trigger_id: None,
        }
    }

    /// secp256r1 public key the device was provisioned with
    pub fn with_authentication_public_key(mut self, key: Vec<u8>) -> Self {
        self.authentication_public_key = Some(key);
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Name of the companion app shown in the paired notification
    pub fn with_app_name(mut self, app_name: &str) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_trigger_id(mut self, trigger_id: &str) -> Self {
        self.trigger_id = Some(trigger_id.into());
        self
    }

    pub fn mac_address(&self) -> &MacAddress {
        &self.mac_address
    }

    pub fn authentication_public_key(&self) -> Option<&[u8]> {
        self.authentication_public_key.as_deref()
    }

    pub fn has_authentication_public_key(&self) -> bool {
        self.authentication_public_key.is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn app_name(&self) -> Option<&str> {
        self.app_name.as_deref()
    }

    pub fn trigger_id(&self) -> Option<&str> {
        self.trigger_id.as_deref()
    }

    /// What to call the device in logs and UI
    pub fn display_name(&self) -> String {
        match &self.title {
            Some(t) => t.clone(),
            None => self.mac_address.to_string(),
        }
    }
}
