//! Transport layer: wire-format details (form encoding, XML decoding).

mod send_sms;
mod xml;

pub use send_sms::{SendSmsForm, encode_send_sms_form};
pub use xml::{DecodeError, decode_xml_response};
