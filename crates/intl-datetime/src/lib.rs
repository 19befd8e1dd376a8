#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![doc(html_favicon_url = "https://zino.cc/assets/zino-logo.png")]
#![doc(html_logo_url = "https://zino.cc/assets/zino-logo.svg")]

pub mod datetime;
pub mod error;
pub mod extension;
pub mod state;
pub mod validation;

/// A JSON value.
pub type JsonValue = serde_json::Value;

/// A JSON key-value type.
pub type Map = serde_json::Map<String, JsonValue>;

/// A TOML table.
pub type TomlTable = toml::Table;

/// An allocation-optimized string.
pub type SharedString = std::borrow::Cow<'static, str>;
