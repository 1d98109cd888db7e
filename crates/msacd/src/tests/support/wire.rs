//! Request builders and a response reader speaking the wire format.

use std::io::{self, Read};

use crate::connection::find_delimiter;

/// Wraps a `Msg-Info` element and any siblings in a request envelope.
pub(crate) fn request_envelope(msg_info_attributes: &str, siblings: &str) -> Vec<u8> {
    format!(
        "<HDRadio-Envelope><MSAC-Request><Msg-Info {msg_info_attributes}/>{siblings}</MSAC-Request></HDRadio-Envelope>"
    )
    .into_bytes()
}

pub(crate) fn async_send(service: &str, file: &str) -> Vec<u8> {
    request_envelope(
        &format!("msgType=\"Async Send\" dataServiceName=\"{service}\" fileName=\"{file}\""),
        "",
    )
}

pub(crate) fn sync_pre_send(service: &str, file: &str, duration: &str) -> Vec<u8> {
    request_envelope(
        &format!(
            "msgType=\"Sync Pre Send\" dataServiceName=\"{service}\" fileName=\"{file}\" songDuration=\"{duration}\""
        ),
        "",
    )
}

pub(crate) fn direct_file_copy(destination: &str, size: i64, offset: i64) -> Vec<u8> {
    request_envelope(
        &format!(
            "msgType=\"Direct File Copy\" fileDestination=\"{destination}\" fileSize=\"{size}\" offset=\"{offset}\""
        ),
        "",
    )
}

pub(crate) fn psd_send(core: &str, xhdr: &str) -> Vec<u8> {
    request_envelope(
        "msgType=\"PSD Send\"",
        &format!("<PSD-Fields><core {core}/><xhdr {xhdr}/></PSD-Fields>"),
    )
}

/// Reads one response envelope, or `None` if the peer closed first.
pub(crate) fn read_envelope<R: Read>(reader: &mut R, pending: &mut Vec<u8>) -> io::Result<Option<String>> {
    let mut chunk = [0_u8; 512];
    loop {
        if let Some(start) = find_delimiter(pending) {
            let rest = pending.split_off(start + crate::connection::ENVELOPE_END.len());
            let envelope = std::mem::replace(pending, rest);
            return String::from_utf8(envelope)
                .map(Some)
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error));
        }
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            return Ok(None);
        }
        pending.extend_from_slice(&chunk[..read]);
    }
}
