//! `Direct File Copy`: a raw file payload follows the envelope.

use std::io::Read;

use tracing::debug;

use crate::connection::{ConnectionBuffer, ConnectionError, read_payload};
use crate::envelope::{MSG_INFO, MsacRequest, ResponseEnvelope};

use super::router::{DISPATCH_TARGET, Opcode, Router};

/// Validates the header, reads exactly `fileSize` payload bytes, and
/// notifies the hooks.
///
/// Validation happens before any payload byte is consumed, so a rejected
/// request leaves the payload unread.
pub(super) fn handle<S: Read>(
    router: &Router,
    request: &MsacRequest,
    connection: &mut ConnectionBuffer<S>,
) -> Result<ResponseEnvelope, ConnectionError> {
    let info = request.info();
    let destination = info.require(MSG_INFO, "fileDestination")?;
    let file_size = info.require_i32(MSG_INFO, "fileSize")?;
    let offset = info.require_i32(MSG_INFO, "offset")?;

    if offset != 0 {
        return Err(ConnectionError::violation(format!(
            "only whole-file transfers are supported; got offset {offset}"
        )));
    }
    let size = usize::try_from(file_size).map_err(|_| {
        ConnectionError::violation(format!("fileSize must not be negative; got {file_size}"))
    })?;
    if size > router.max_file_bytes {
        return Err(ConnectionError::violation(format!(
            "fileSize {size} exceeds the {} byte limit",
            router.max_file_bytes
        )));
    }

    let buffered = connection.available().min(size);
    let data = read_payload(connection, size)?;
    debug!(
        target: DISPATCH_TARGET,
        file_destination = destination,
        bytes = size,
        buffered,
        "direct file copy payload received"
    );

    router.hooks().on_direct_file_copy(destination, data);
    Ok(ResponseEnvelope::new(Opcode::DirectFileCopy.as_str())
        .response_attribute("returnString", "OK"))
}
