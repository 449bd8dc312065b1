//! Status codes shown as badges in the console, and the keys that label them.

use crate::error::NlsError;
use crate::facade::ResourceFacade;
use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use strum::{EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};
use xc_nls_core::LocaleTag;
use xc_nls_toml::{DEFAULT_STATUS_NAMESPACE, StatusLabelsConfig};

/// Lifecycle state of a VM.
#[derive(Clone, Copy, Debug, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq)]
pub enum VmState {
    #[strum(serialize = "VM_CREATED")]
    Created,
    #[strum(serialize = "VM_STOPPED")]
    Stopped,
    #[strum(serialize = "VM_STOPPING")]
    Stopping,
    #[strum(serialize = "VM_REBOOTING")]
    Rebooting,
    #[strum(serialize = "VM_REBOOTED")]
    Rebooted,
    #[strum(serialize = "VM_PAUSED")]
    Paused,
    #[strum(serialize = "VM_SUSPENDING")]
    Suspending,
    #[strum(serialize = "VM_SUSPENDED")]
    Suspended,
    #[strum(serialize = "VM_RUNNING")]
    Running,
    #[strum(serialize = "VM_LOCKED")]
    Locked,
    #[strum(serialize = "VM_ASLEEP")]
    Asleep,
}

/// Management state of a synchronized desktop image.
#[derive(Clone, Copy, Debug, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DesktopState {
    Publishing,
    BackingUp,
    Downloading,
    Updating,
    ForceUpdating,
    Ready,
    Locked,
    RemoteLocked,
    Unmanaged,
}

/// State of a sync/transfer operation.
#[derive(Clone, Copy, Debug, EnumIter, EnumString, Eq, Hash, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncOpState {
    Preparing,
    PreparationFailed,
    TransferPending,
    ComputingDigest,
    TransferActive,
    TransferPaused,
    TransferFailed,
    TransferNetintStalled,
    TransferAdmctlStalled,
    InstallingImage,
    TransferFinished,
    ShutdownRequired,
    CleanShutdownRequired,
    BackgroundFailed,
}

/// Any status code that can be turned into a label.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, derive_more::From)]
pub enum StatusCode {
    Vm(VmState),
    Desktop(DesktopState),
    SyncOp(SyncOpState),
}

impl StatusCode {
    /// Every status code, VM states first.
    pub fn all() -> impl Iterator<Item = StatusCode> {
        VmState::iter()
            .map(Self::Vm)
            .chain(DesktopState::iter().map(Self::Desktop))
            .chain(SyncOpState::iter().map(Self::SyncOp))
    }

    /// Upper-snake-case name, also the default resource key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Vm(state) => state.into(),
            Self::Desktop(state) => state.into(),
            Self::SyncOp(state) => state.into(),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatusCode {
    type Err = NlsError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        VmState::from_str(name)
            .map(Self::Vm)
            .or_else(|_| DesktopState::from_str(name).map(Self::Desktop))
            .or_else(|_| SyncOpState::from_str(name).map(Self::SyncOp))
            .map_err(|_| NlsError::UnknownStatusCode(name.to_string()))
    }
}

/// Maps each status code to the key of its label.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusLabelTable {
    namespace: String,
    keys: FxHashMap<StatusCode, String>,
}

impl Default for StatusLabelTable {
    fn default() -> Self {
        Self::new(DEFAULT_STATUS_NAMESPACE)
    }
}

impl StatusLabelTable {
    /// A table keying every code by its own name.
    pub fn new(namespace: impl Into<String>) -> Self {
        let keys = StatusCode::all()
            .map(|code| (code, code.name().to_string()))
            .collect();
        Self {
            namespace: namespace.into(),
            keys,
        }
    }

    /// A table without any entries; every code has to be added explicitly.
    pub fn empty(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            keys: FxHashMap::default(),
        }
    }

    pub fn with_key(mut self, code: impl Into<StatusCode>, key: impl Into<String>) -> Self {
        self.keys.insert(code.into(), key.into());
        self
    }

    /// Applies overrides given by status code name, e.g. `("VM_PAUSED", "VM_RUNNING")`.
    pub fn with_overrides<I, C, K>(mut self, overrides: I) -> Result<Self, NlsError>
    where
        I: IntoIterator<Item = (C, K)>,
        C: AsRef<str>,
        K: Into<String>,
    {
        for (code, key) in overrides {
            let code = code.as_ref().parse::<StatusCode>()?;
            self.keys.insert(code, key.into());
        }
        Ok(self)
    }

    pub fn from_config(config: &StatusLabelsConfig) -> Result<Self, NlsError> {
        Self::new(config.namespace.clone()).with_overrides(&config.keys)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key_for(&self, code: StatusCode) -> Option<&str> {
        self.keys.get(&code).map(String::as_str)
    }

    /// Checks that every status code has a non-empty key.
    pub fn validate(&self) -> Result<(), NlsError> {
        match StatusCode::all().find(|code| self.key_for(*code).is_none_or(str::is_empty)) {
            Some(code) => Err(NlsError::UnknownStatusCode(code.name().to_string())),
            None => Ok(()),
        }
    }
}

/// Resolves status codes to display labels through a [`ResourceFacade`].
#[derive(Debug)]
pub struct StatusLabelMapper {
    facade: Arc<ResourceFacade>,
    table: StatusLabelTable,
}

impl StatusLabelMapper {
    /// Validates `table` up front so lookups never meet an unmapped code.
    pub fn new(facade: Arc<ResourceFacade>, table: StatusLabelTable) -> Result<Self, NlsError> {
        table.validate()?;
        Ok(Self { facade, table })
    }

    pub fn table(&self) -> &StatusLabelTable {
        &self.table
    }

    pub async fn label_for(
        &self,
        code: impl Into<StatusCode>,
        locale: &LocaleTag,
    ) -> Result<String, NlsError> {
        let code = code.into();
        let key = self
            .table
            .key_for(code)
            .ok_or_else(|| NlsError::UnknownStatusCode(code.name().to_string()))?;

        self.facade
            .resolve_text(self.table.namespace(), key, locale, &[])
            .await
    }

    /// Checks that the default locale's bundle defines every mapped key.
    pub async fn verify_default_bundle(&self) -> Result<(), NlsError> {
        let bundle = self.facade.default_bundle(self.table.namespace()).await?;

        for code in StatusCode::all() {
            let key = self
                .table
                .key_for(code)
                .ok_or_else(|| NlsError::UnknownStatusCode(code.name().to_string()))?;
            if !bundle.contains_key(key) {
                return Err(NlsError::KeyNotFound {
                    namespace: self.table.namespace().to_string(),
                    key: key.to_string(),
                });
            }
        }

        Ok(())
    }
}
