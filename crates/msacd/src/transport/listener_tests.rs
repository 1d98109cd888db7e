//! Tests for the socket listener.

use std::io::Read;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use msac_config::ListenEndpoint;

use super::listener::SocketListener;
use super::{ConnectionHandler, CountingHandler, ListenerError};

#[derive(Clone)]
struct CountingFixture {
    count: Arc<AtomicUsize>,
    handler: Arc<CountingHandler>,
}

#[fixture]
fn counting_fixture() -> CountingFixture {
    let (count, handler) = CountingHandler::new();
    CountingFixture { count, handler }
}

#[fixture]
fn tcp_endpoint() -> ListenEndpoint {
    ListenEndpoint::tcp("127.0.0.1", 0)
}

fn wait_for_count(count: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if count.load(Ordering::SeqCst) >= expected {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[rstest]
fn tcp_listener_accepts_connections(
    tcp_endpoint: ListenEndpoint,
    counting_fixture: CountingFixture,
) {
    let listener = SocketListener::bind(&tcp_endpoint).expect("bind tcp listener");
    let addr = listener
        .local_addr()
        .expect("listener should report local address");
    let CountingFixture { count, handler } = counting_fixture;
    let handler: Arc<dyn ConnectionHandler> = handler;
    let handle = listener
        .start(Arc::new(AtomicBool::new(false)), handler)
        .expect("start listener");

    TcpStream::connect(addr).expect("connect first client");
    TcpStream::connect(addr).expect("connect second client");

    assert!(wait_for_count(&count, 2), "expected two connections");
    handle.shutdown();
    handle.join().expect("join listener");
}

#[rstest]
fn shutdown_closes_the_listening_socket(
    tcp_endpoint: ListenEndpoint,
    counting_fixture: CountingFixture,
) {
    let listener = SocketListener::bind(&tcp_endpoint).expect("bind tcp listener");
    let addr = listener.local_addr().expect("local address");
    let handle = listener
        .start(Arc::new(AtomicBool::new(false)), counting_fixture.handler)
        .expect("start listener");

    handle.shutdown();
    handle.join().expect("join listener");

    let rebound = TcpListener::bind(addr);
    assert!(rebound.is_ok(), "port should be free after shutdown");
}

#[rstest]
fn run_returns_once_shutdown_is_set(
    tcp_endpoint: ListenEndpoint,
    counting_fixture: CountingFixture,
) {
    let listener = SocketListener::bind(&tcp_endpoint).expect("bind tcp listener");
    let shutdown = Arc::new(AtomicBool::new(true));
    listener
        .run(shutdown, counting_fixture.handler)
        .expect("run listener");
    assert_eq!(counting_fixture.count.load(Ordering::SeqCst), 0);
}

#[rstest]
fn clients_are_served_one_at_a_time(tcp_endpoint: ListenEndpoint) {
    struct HoldingHandler {
        served: AtomicUsize,
    }

    impl ConnectionHandler for HoldingHandler {
        fn handle(&self, mut stream: TcpStream) {
            let mut sink = Vec::new();
            let _ = stream.read_to_end(&mut sink);
            self.served.fetch_add(1, Ordering::SeqCst);
        }
    }

    let listener = SocketListener::bind(&tcp_endpoint).expect("bind tcp listener");
    let addr: SocketAddr = listener.local_addr().expect("local address");
    let handler = Arc::new(HoldingHandler {
        served: AtomicUsize::new(0),
    });
    let handle = listener
        .start(Arc::new(AtomicBool::new(false)), Arc::clone(&handler) as Arc<dyn ConnectionHandler>)
        .expect("start listener");

    let first = TcpStream::connect(addr).expect("connect first client");
    let second = TcpStream::connect(addr).expect("connect second client");
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(handler.served.load(Ordering::SeqCst), 0);

    drop(first);
    assert!(wait_for_count(&handler.served, 1), "first client released");
    drop(second);
    assert!(wait_for_count(&handler.served, 2), "second client served");

    handle.shutdown();
    handle.join().expect("join listener");
}

fn refused_within(addr: SocketAddr, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if TcpStream::connect(addr).is_err() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[rstest]
fn shutdown_closes_socket_while_a_client_is_served(tcp_endpoint: ListenEndpoint) {
    struct DrainingHandler {
        served: AtomicUsize,
    }

    impl ConnectionHandler for DrainingHandler {
        fn handle(&self, mut stream: TcpStream) {
            let mut sink = Vec::new();
            let _ = stream.read_to_end(&mut sink);
            self.served.fetch_add(1, Ordering::SeqCst);
        }
    }

    let listener = SocketListener::bind(&tcp_endpoint).expect("bind tcp listener");
    let addr = listener.local_addr().expect("local address");
    let handler = Arc::new(DrainingHandler {
        served: AtomicUsize::new(0),
    });
    let handle = listener
        .start(Arc::new(AtomicBool::new(false)), handler.clone() as Arc<dyn ConnectionHandler>)
        .expect("start listener");

    let client = TcpStream::connect(addr).expect("connect client");
    std::thread::sleep(Duration::from_millis(100));
    handle.shutdown();
    std::thread::sleep(Duration::from_millis(100));

    assert!(
        refused_within(addr, Duration::from_secs(2)),
        "listening socket should close while the client is still connected"
    );
    assert_eq!(handler.served.load(Ordering::SeqCst), 0);

    drop(client);
    handle.join().expect("join listener");
    assert_eq!(handler.served.load(Ordering::SeqCst), 1);
}

#[rstest]
fn panicking_worker_does_not_stop_the_listener(tcp_endpoint: ListenEndpoint) {
    struct PanickingHandler {
        calls: AtomicUsize,
    }

    impl ConnectionHandler for PanickingHandler {
        fn handle(&self, _stream: TcpStream) {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first client rejected");
            }
        }
    }

    let listener = SocketListener::bind(&tcp_endpoint).expect("bind tcp listener");
    let addr = listener.local_addr().expect("local address");
    let handler = Arc::new(PanickingHandler {
        calls: AtomicUsize::new(0),
    });
    let handle = listener
        .start(Arc::new(AtomicBool::new(false)), handler.clone() as Arc<dyn ConnectionHandler>)
        .expect("start listener");

    TcpStream::connect(addr).expect("connect first client");
    assert!(wait_for_count(&handler.calls, 1), "first client handled");
    TcpStream::connect(addr).expect("connect second client");
    assert!(wait_for_count(&handler.calls, 2), "second client handled");

    handle.shutdown();
    handle.join().expect("listener survives a worker panic");
}

#[rstest]
fn bind_reports_address_in_use(tcp_endpoint: ListenEndpoint) {
    let existing = SocketListener::bind(&tcp_endpoint).expect("bind first listener");
    let port = existing.local_addr().expect("local address").port();

    let error = SocketListener::bind(&ListenEndpoint::tcp("127.0.0.1", port))
        .expect_err("second bind should fail");
    assert!(matches!(error, ListenerError::BindTcp { .. }));
}

#[rstest]
fn bind_reports_unresolvable_host() {
    let error = SocketListener::bind(&ListenEndpoint::tcp("host.invalid", 10000))
        .expect_err("resolution should fail");
    assert!(matches!(
        error,
        ListenerError::Resolve { .. } | ListenerError::ResolveEmpty { .. }
    ));
}

#[rstest]
fn counting_handler_starts_without_accept_failures(counting_fixture: CountingFixture) {
    assert_eq!(counting_fixture.handler.accept_failures(), 0);
    counting_fixture
        .handler
        .accept_failed(std::io::Error::other("accept failed"));
    assert_eq!(counting_fixture.handler.accept_failures(), 1);
}
