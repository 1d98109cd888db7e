//! Test helpers for the transport module.

use std::io;
use std::net::TcpStream;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::ConnectionHandler;

pub(crate) struct CountingHandler {
    count: Arc<AtomicUsize>,
    accept_failures: AtomicUsize,
}

impl CountingHandler {
    pub(crate) fn new() -> (Arc<AtomicUsize>, Arc<Self>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = Arc::new(Self {
            count: Arc::clone(&count),
            accept_failures: AtomicUsize::new(0),
        });
        (count, handler)
    }

    pub(crate) fn accept_failures(&self) -> usize {
        self.accept_failures.load(Ordering::SeqCst)
    }
}

impl ConnectionHandler for CountingHandler {
    fn handle(&self, _stream: TcpStream) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn accept_failed(&self, _error: io::Error) {
        self.accept_failures.fetch_add(1, Ordering::SeqCst);
    }
}
