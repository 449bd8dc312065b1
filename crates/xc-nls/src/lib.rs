#![doc = include_str!("../README.md")]

mod error;
mod facade;
mod manager;
mod status;

pub use error::NlsError;
pub use facade::{ResourceFacade, missing_translation};
pub use manager::NlsManager;
pub use status::{
    DesktopState, StatusCode, StatusLabelMapper, StatusLabelTable, SyncOpState, VmState,
};

pub use xc_nls_core::{
    Bundle, BundleFormat, BundleId, BundleLoader, BundleStore, DirectoryLoader, EmbeddedLoader,
    FallbackChain, FormatArg, FormatError, LoadError, LocaleTag, RawBundle, StaticLoader,
};
pub use xc_nls_toml::{NlsConfig, NlsConfigError};
