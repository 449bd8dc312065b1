#![doc = include_str!("../README.md")]

pub mod bundle;
pub mod fallback;
pub mod loader;
pub mod locale;
pub mod number;
pub mod source;
pub mod store;
pub mod template;

pub use bundle::{Bundle, BundleId, RawBundle};
pub use fallback::{FallbackChain, fallback_chain};
pub use loader::{BundleLoader, DirectoryLoader, EmbeddedLoader, LoadError, StaticLoader};
pub use locale::LocaleTag;
pub use number::NumberFormatter;
pub use source::{BundleFormat, BundleParseError};
pub use store::BundleStore;
pub use template::{FormatArg, FormatError, Template, render};
