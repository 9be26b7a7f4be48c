//! Typed Rust client for the Zenziva SMS gateway.
//!
//! The crate is split into a domain layer of strong types (package routes,
//! validated values, decoded replies and send history), a transport layer for
//! wire-format details (form encoding, XML decoding), and a small client layer
//! that validates, resolves the endpoint, sends, and records the outcome.
//!
//! ```rust,no_run
//! use zenziva::{PackageType, SendOverrides, ZenzivaClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), zenziva::ZenzivaError> {
//!     let mut client = ZenzivaClient::builder("userkey", "passkey")
//!         .package_type(PackageType::Masking)
//!         .build()?;
//!     let outcome = client
//!         .send_with(SendOverrides::new().to("081234567890").message("hello"))
//!         .await?;
//!     if !outcome.is_success() {
//!         eprintln!("send failed: {:?}", client.last_error());
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{SendOverrides, ZenzivaClient, ZenzivaClientBuilder, ZenzivaError};
pub use domain::{
    History, MessageStatus, MessageText, PackageType, Password, PhoneNumber, ProviderResponse,
    SendOutcome, Subdomain, Username, ValidationError,
};
pub use transport::DecodeError;
