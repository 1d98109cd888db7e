//! XML envelope codec.
//!
//! Requests are read with a small scanner that only understands what the
//! protocol uses: elements, attributes, the predefined entities, and skippable
//! prologue, comment and text content. It collects the attributes of
//! `Msg-Info` and of the nested `PSD-Fields/core` and `PSD-Fields/xhdr`
//! elements. Responses are written straight into a byte buffer in the fixed
//! `HDRadio-Envelope/MSAC-Response` shape.

mod attributes;
mod decode;
mod encode;

pub use self::attributes::Attributes;
pub use self::decode::{MsacRequest, PsdFields};
pub use self::encode::ResponseEnvelope;

pub(crate) const ENVELOPE: &str = "HDRadio-Envelope";
pub(crate) const REQUEST: &str = "MSAC-Request";
pub(crate) const RESPONSE: &str = "MSAC-Response";
pub(crate) const MSG_INFO: &str = "Msg-Info";
pub(crate) const LOT_INFO: &str = "Lot-Info";
pub(crate) const PSD_FIELDS: &str = "PSD-Fields";
pub(crate) const PSD_CORE: &str = "core";
pub(crate) const PSD_XHDR: &str = "xhdr";
