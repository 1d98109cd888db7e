//! `PSD Send`: program service data plus its extended header.

use crate::connection::ConnectionError;
use crate::entities::{PsdRecord, XhdrRecord};
use crate::envelope::{MsacRequest, PSD_CORE, PSD_FIELDS, PSD_XHDR, REQUEST, ResponseEnvelope};

use super::router::{Opcode, Router};

/// Requires `PSD-Fields` with both `core` and `xhdr` children; their
/// attributes are optional.
pub(super) fn handle(
    router: &Router,
    request: &MsacRequest,
) -> Result<ResponseEnvelope, ConnectionError> {
    let fields = request
        .psd()
        .ok_or_else(|| ConnectionError::missing_element(REQUEST, PSD_FIELDS))?;
    let core = fields
        .core
        .as_ref()
        .ok_or_else(|| ConnectionError::missing_element(PSD_FIELDS, PSD_CORE))?;
    let xhdr = fields
        .xhdr
        .as_ref()
        .ok_or_else(|| ConnectionError::missing_element(PSD_FIELDS, PSD_XHDR))?;

    router
        .hooks()
        .on_psd_update(PsdRecord::from_attributes(core), XhdrRecord::from_attributes(xhdr));
    Ok(ResponseEnvelope::new(Opcode::PsdSend.as_str()).response_attribute("returnString", "OK"))
}
