//! # relay-core
//!
//! Core types for the message-relay bot: [`User`], [`Message`] and reply context,
//! environment configuration ([`RelayConfig`]) and tracing initialization.
//! Transport-agnostic; the platform adapter converts its own types into these
//! before handing them to `relay-storage`.

pub mod config;
pub mod error;
pub mod logger;
pub mod types;


pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use logger::init_tracing;
pub use types::{Message, ReplyTo, User};
