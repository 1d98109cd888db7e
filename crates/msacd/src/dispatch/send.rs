//! `Async Send` and `Sync Pre Send`.

use crate::connection::ConnectionError;
use crate::entities::{OutgoingImage, SendKind, unique_tag};
use crate::envelope::{MSG_INFO, MsacRequest, ResponseEnvelope};

use super::router::{Opcode, Router};

/// Allocates a lot, tags the request, and notifies the hooks.
///
/// Only `Sync Pre Send` reads `songDuration`; a missing or unparsable value
/// counts as zero.
pub(super) fn handle(
    router: &Router,
    request: &MsacRequest,
    kind: SendKind,
) -> Result<ResponseEnvelope, ConnectionError> {
    let opcode = match kind {
        SendKind::Async => Opcode::AsyncSend,
        SendKind::SyncPreSend => Opcode::SyncPreSend,
    };
    let info = request.info();
    let data_service_name = info.require(MSG_INFO, "dataServiceName")?.to_string();
    let file_name = info.require(MSG_INFO, "fileName")?.to_string();
    let duration = match kind {
        SendKind::Async => 0,
        SendKind::SyncPreSend => info.get_i32("songDuration").unwrap_or(0),
    };

    let unique_tag = unique_tag((router.clock)())?;
    let lot_id = router.lots.allocate();

    let response = ResponseEnvelope::new(opcode.as_str())
        .response_attribute("uniqueTag", &unique_tag)
        .response_attribute("returnString", "OK")
        .response_attribute("MSAC-OS", &router.advertised_os)
        .response_attribute("MSAC-Version", &router.advertised_version)
        .info_attribute("dataServiceName", &data_service_name)
        .info_attribute("state", "Pending")
        .lot(lot_id);

    router.hooks().on_async_or_sync_send(OutgoingImage {
        kind,
        data_service_name,
        file_name,
        lot_id,
        unique_tag,
        duration,
    });
    Ok(response)
}
