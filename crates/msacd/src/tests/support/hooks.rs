//! Hooks double that records every notification.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::connection::{ConnectionError, ConnectionErrorKind};
use crate::entities::{OutgoingImage, PsdRecord, XhdrRecord};
use crate::hooks::MsacHooks;

/// One recorded hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notification {
    DirectFileCopy { destination: String, data: Vec<u8> },
    Send(OutgoingImage),
    Psd(PsdRecord, XhdrRecord),
    Error(ConnectionErrorKind),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingHooks {
    events: Mutex<Vec<Notification>>,
    panic_for_service: Option<String>,
}

impl RecordingHooks {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Panics instead of recording sends addressed to `service`.
    pub(crate) fn panicking_for(service: &str) -> Arc<Self> {
        Arc::new(Self {
            panic_for_service: Some(service.to_string()),
            ..Self::default()
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub(crate) fn events(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub(crate) fn errors(&self) -> Vec<ConnectionErrorKind> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                Notification::Error(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn images(&self) -> Vec<OutgoingImage> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                Notification::Send(image) => Some(image.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Notification) {
        self.lock().push(event);
    }
}

impl MsacHooks for RecordingHooks {
    fn on_direct_file_copy(&self, file_destination: &str, data: Vec<u8>) {
        self.record(Notification::DirectFileCopy {
            destination: file_destination.to_string(),
            data,
        });
    }

    fn on_async_or_sync_send(&self, image: OutgoingImage) {
        if self.panic_for_service.as_deref() == Some(image.data_service_name.as_str()) {
            panic!("hook rejected {}", image.data_service_name);
        }
        self.record(Notification::Send(image));
    }

    fn on_psd_update(&self, psd: PsdRecord, xhdr: XhdrRecord) {
        self.record(Notification::Psd(psd, xhdr));
    }

    fn on_connection_error(&self, error: &ConnectionError) {
        self.record(Notification::Error(error.kind()));
    }
}
