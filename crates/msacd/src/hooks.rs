//! Notification hooks consumed by the host application.

use std::sync::Arc;

use crate::connection::ConnectionError;
use crate::entities::{OutgoingImage, PsdRecord, XhdrRecord};

const HOOKS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::hooks");

/// Receives the outcome of each handled request.
///
/// Every hook runs on the connection thread before the response is sent, so
/// a hook observes requests in arrival order and may block the client.
pub trait MsacHooks: Send + Sync {
    /// A Direct File Copy payload was received in full.
    fn on_direct_file_copy(&self, file_destination: &str, data: Vec<u8>);

    /// An Async Send or Sync Pre Send was accepted.
    fn on_async_or_sync_send(&self, image: OutgoingImage);

    /// A PSD Send was accepted.
    fn on_psd_update(&self, psd: PsdRecord, xhdr: XhdrRecord);

    /// A connection ended with an error.
    fn on_connection_error(&self, error: &ConnectionError);
}

impl<T> MsacHooks for Arc<T>
where
    T: MsacHooks + ?Sized,
{
    fn on_direct_file_copy(&self, file_destination: &str, data: Vec<u8>) {
        (**self).on_direct_file_copy(file_destination, data);
    }

    fn on_async_or_sync_send(&self, image: OutgoingImage) {
        (**self).on_async_or_sync_send(image);
    }

    fn on_psd_update(&self, psd: PsdRecord, xhdr: XhdrRecord) {
        (**self).on_psd_update(psd, xhdr);
    }

    fn on_connection_error(&self, error: &ConnectionError) {
        (**self).on_connection_error(error);
    }
}

/// Default hooks that record every notification using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHooks;

impl StructuredHooks {
    /// Builds the default hooks.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MsacHooks for StructuredHooks {
    fn on_direct_file_copy(&self, file_destination: &str, data: Vec<u8>) {
        tracing::info!(
            target: HOOKS_TARGET,
            event = "direct_file_copy",
            file_destination,
            bytes = data.len(),
            "direct file copy received"
        );
    }

    fn on_async_or_sync_send(&self, image: OutgoingImage) {
        tracing::info!(
            target: HOOKS_TARGET,
            event = "outgoing_image",
            kind = ?image.kind,
            data_service = %image.data_service_name,
            file_name = %image.file_name,
            lot_id = image.lot_id,
            unique_tag = %image.unique_tag,
            duration = image.duration,
            "outgoing image queued"
        );
    }

    fn on_psd_update(&self, psd: PsdRecord, xhdr: XhdrRecord) {
        tracing::info!(
            target: HOOKS_TARGET,
            event = "psd_update",
            title = %psd.title,
            artist = %psd.artist,
            album = %psd.album,
            genre = %psd.genre,
            mime_type = %xhdr.mime_type,
            trigger = xhdr.trigger,
            lot_id = xhdr.lot_id,
            "program service data updated"
        );
    }

    fn on_connection_error(&self, error: &ConnectionError) {
        tracing::warn!(
            target: HOOKS_TARGET,
            event = "connection_error",
            kind = ?error.kind(),
            error = %error,
            "client connection failed"
        );
    }
}
