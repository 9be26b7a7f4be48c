//! Domain layer: strong types with validation and invariants (no I/O).

mod package;
mod response;
mod validation;
mod value;

pub use package::{DOMAIN, PackageType, SCHEME};
pub use response::{History, MessageStatus, ProviderResponse, SUCCESS_TEXT, SendOutcome};
pub use validation::ValidationError;
pub use value::{MessageText, Password, PhoneNumber, Subdomain, Username};
