use std::borrow::Cow;
use std::env;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use toml::{Table, Value};

use crate::fastpair::{DiscoveryItem, PairingError};
use crate::utils::{bytes_from_hex, read_file, unbase64, MacAddress};

/// Env var overriding the simulation config location
pub const CONFIG_ENV: &str = "NEARBY_CONFIG";

#[derive(Debug)]
pub enum Error {
    InvalidType,
    MissingKey,
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::InvalidType => "InvalidType",
                Self::MissingKey => "MissingKey",
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// A view of one TOML table that knows where it lives, so errors can name
/// the full key path (`flow.passkey`) and the file.
pub struct ConfigMap<'c> {
    path: &'c Path,
    name: Option<Cow<'c, str>>,
    table: &'c Table,
}

/// Parse `file` as TOML and hand the root table to `f`
pub fn parse_config<R, F>(file: &Path, f: F) -> crate::Result<R>
where
    F: FnOnce(&ConfigMap) -> crate::Result<R>,
{
    let as_str = read_file(file)?;
    parse_config_str(file, &as_str, f)
}

/// Same as [parse_config] for TOML that is already in memory. `file` is only
/// used in error messages.
pub fn parse_config_str<R, F>(file: &Path, content: &str, f: F) -> crate::Result<R>
where
    F: FnOnce(&ConfigMap) -> crate::Result<R>,
{
    let table: Table = toml::from_str(content).map_err(|e| crate::Error::new_cfg(file, &e))?;

    let base = ConfigMap {
        name: None,
        path: file,
        table: &table,
    };

    f(&base)
}

impl<'c> ConfigMap<'c> {
    fn get_full_path(&self) -> Option<&str> {
        self.name.as_ref().map(|it| it.as_ref())
    }

    fn key_path<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match self.get_full_path() {
            None => Cow::Borrowed(key),
            Some(v) => Cow::Owned(format!("{}.{}", v, key)),
        }
    }

    /// Helper to create a crate::Error for a missing key
    pub fn missing_key(&self, key: &str) -> crate::Error {
        crate::Error::new_cfg(self.path, &format!("missing key: {}", self.key_path(key)))
    }

    /// Helper to create a crate::Error for an invalid key
    pub fn invalid_key(&self, key: &str, expected: &str) -> crate::Error {
        crate::Error::new_cfg(
            self.path,
            &format!(
                "invalid value for key: {} (expected {})",
                self.key_path(key),
                expected
            ),
        )
    }

    fn lookup_error(&self, err: Error, key: &str, expected: &str) -> crate::Error {
        match err {
            Error::InvalidType => self.invalid_key(key, expected),
            Error::MissingKey => self.missing_key(key),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    fn get(&self, key: &str) -> Option<&'c Value> {
        self.table.get(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.maybe_get_int(key)?.ok_or(Error::MissingKey)
    }

    pub fn maybe_get_int(&self, key: &str) -> Result<Option<i64>> {
        match self.get(key) {
            Some(v) => v.as_integer().map(Some).ok_or(Error::InvalidType),
            None => Ok(None),
        }
    }

    /// An optional integer that has to fit in a `u32`
    pub fn maybe_get_u32(&self, key: &str) -> crate::Result<Option<u32>> {
        match self.maybe_get_int(key) {
            Ok(None) => Ok(None),
            Ok(Some(v)) => u32::try_from(v)
                .map(Some)
                .map_err(|_| self.invalid_key(key, "unsigned 32 bit int")),
            Err(e) => Err(self.lookup_error(e, key, "int")),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<&'c str> {
        self.maybe_get_str(key)?.ok_or(Error::MissingKey)
    }

    pub fn maybe_get_str(&self, key: &str) -> Result<Option<&'c str>> {
        match self.get(key) {
            Some(v) => v.as_str().map(Some).ok_or(Error::InvalidType),
            None => Ok(None),
        }
    }

    pub fn maybe_get_str_typecheck(&self, key: &str) -> crate::Result<Option<&'c str>> {
        self.maybe_get_str(key)
            .map_err(|_| self.invalid_key(key, "string"))
    }

    pub fn must_get_str(&self, key: &str) -> crate::Result<&'c str> {
        self.get_str(key)
            .map_err(|e| self.lookup_error(e, key, "string"))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get(key)
            .ok_or(Error::MissingKey)?
            .as_bool()
            .ok_or(Error::InvalidType)
    }

    /// Like [ConfigMap::get_bool] but a missing key gives `default` and a
    /// non boolean value is an error
    pub fn get_bool_or(&self, key: &str, default: bool) -> crate::Result<bool> {
        match self.get_bool(key) {
            Ok(v) => Ok(v),
            Err(Error::MissingKey) => Ok(default),
            Err(Error::InvalidType) => Err(self.invalid_key(key, "bool")),
        }
    }

    /// Hex encoded bytes such as account keys
    pub fn maybe_get_hex(&self, key: &str) -> crate::Result<Option<Vec<u8>>> {
        self.maybe_get_str_typecheck(key)?
            .map(|s| bytes_from_hex(s).map_err(|_| self.invalid_key(key, "hex string")))
            .transpose()
    }

    pub fn maybe_get_base64(&self, key: &str) -> crate::Result<Option<Vec<u8>>> {
        self.maybe_get_str_typecheck(key)?
            .map(|s| unbase64(s).map_err(|_| self.invalid_key(key, "base64 string")))
            .transpose()
    }

    pub fn must_get_mac(&self, key: &str) -> crate::Result<MacAddress> {
        self.must_get_str(key)?
            .parse()
            .map_err(|_| self.invalid_key(key, "MAC address"))
    }

    pub fn maybe_get_map(&'c self, key: &'c str) -> Result<Option<ConfigMap<'c>>> {
        match self.get(key) {
            Some(v) => match v.as_table() {
                Some(table) => {
                    let name = match self.get_full_path() {
                        Some(parents) => Cow::Owned(format!("{parents}.{key}")),
                        None => Cow::Borrowed(key),
                    };
                    Ok(Some(Self {
                        name: Some(name),
                        path: self.path,
                        table,
                    }))
                }
                None => Err(Error::InvalidType),
            },
            None => Ok(None),
        }
    }

    pub fn must_get_map(&'c self, key: &'c str) -> crate::Result<ConfigMap<'c>> {
        match self.maybe_get_map(key) {
            Ok(Some(v)) => Ok(v),
            Ok(None) => Err(self.missing_key(key)),
            Err(e) => Err(self.lookup_error(e, key, "table")),
        }
    }
}

/// How the simulated orchestrator should drive the handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    pub public_address: MacAddress,
    pub passkey: Option<u32>,
    pub wait_for_unlock: bool,
    pub existing_account_key: Option<Vec<u8>>,
    pub half_sheet_foreground: bool,
    pub fail: Option<PairingError>,
}

/// A complete pairing scenario for the `simulate` command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub company_name: String,
    pub account_key: Option<Vec<u8>>,
    pub item: DiscoveryItem,
    pub flow: FlowConfig,
}

impl SimulationConfig {
    pub fn parse(file: &Path) -> crate::Result<Self> {
        parse_config(file, Self::from_map)
    }

    pub fn from_map(cfg: &ConfigMap) -> crate::Result<Self> {
        let company_name = cfg.must_get_str("company-name")?.to_string();
        let account_key = cfg.maybe_get_hex("account-key")?;

        let item_cfg = cfg.must_get_map("item")?;
        let mut item = DiscoveryItem::new(item_cfg.must_get_mac("mac")?);
        if let Some(key) = item_cfg.maybe_get_base64("auth-key")? {
            item = item.with_authentication_public_key(key);
        }
        if let Some(title) = item_cfg.maybe_get_str_typecheck("title")? {
            item = item.with_title(title);
        }
        if let Some(app) = item_cfg.maybe_get_str_typecheck("app-name")? {
            item = item.with_app_name(app);
        }
        if let Some(trigger) = item_cfg.maybe_get_str_typecheck("trigger-id")? {
            item = item.with_trigger_id(trigger);
        }

        let flow_cfg = cfg.must_get_map("flow")?;
        let fail = match flow_cfg.maybe_get_str_typecheck("fail")? {
            Some(s) => Some(
                s.parse::<PairingError>()
                    .map_err(|_| flow_cfg.invalid_key("fail", "timeout, bond-failed or passkey-mismatch"))?,
            ),
            None => None,
        };
        let flow = FlowConfig {
            public_address: flow_cfg.must_get_mac("public-address")?,
            passkey: flow_cfg.maybe_get_u32("passkey")?,
            wait_for_unlock: flow_cfg.get_bool_or("wait-for-unlock", false)?,
            existing_account_key: flow_cfg.maybe_get_hex("existing-account-key")?,
            half_sheet_foreground: flow_cfg.get_bool_or("half-sheet-foreground", false)?,
            fail,
        };

        Ok(Self {
            company_name,
            account_key,
            item,
            flow,
        })
    }
}

fn config_path_from(env_value: Option<String>, base: Option<BaseDirs>) -> crate::Result<PathBuf> {
    if let Some(value) = env_value {
        if value.trim().is_empty() {
            return Err(crate::Error::InvalidEnv(CONFIG_ENV.into(), "empty".into()));
        }
        return Ok(PathBuf::from(value));
    }
    let base = base.ok_or(crate::Error::NoBaseDirs)?;
    Ok(base.config_dir().join("nearby").join("simulate.toml"))
}

/// `$NEARBY_CONFIG`, falling back to `simulate.toml` in the user's config dir
pub fn default_config_path() -> crate::Result<PathBuf> {
    config_path_from(env::var(CONFIG_ENV).ok(), BaseDirs::new())
}
