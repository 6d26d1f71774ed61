//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use fasttea::config::{AppKind, Config, RuntimeConfig};
use fasttea::error::ReduceError;
use fasttea::executor::CommandRegistry;
use fasttea::message::{Command, Message};
use fasttea::mvi::{AppState, Intent, Reducer, Transition};
use fasttea::runtime::{EventBus, Runtime, RuntimeEvent, RuntimeHandle, Session};
use fasttea::server::{AppServer, ServerHandle};
use fasttea::view::{Node, View};
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;
use tokio::sync::broadcast;

/// Find an available port for testing.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to free port");
    listener.local_addr().unwrap().port()
}

/// Wait until a TCP connection to `addr` succeeds.
pub async fn wait_for_server(addr: SocketAddr, timeout: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Start an HTTP server for `app` on a free port.
pub async fn start_server(app: AppKind, max_sessions: usize) -> (SocketAddr, ServerHandle) {
    let mut config = Config::default();
    config.app = app;
    config.sessions.max_sessions = max_sessions;
    config.server.shutdown_grace_seconds = 1;

    let mut server = AppServer::new(&config);
    let addr = server
        .try_bind(&format!("127.0.0.1:{}", free_port()))
        .await
        .expect("Failed to bind");
    let handle = server.handle();
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    assert!(wait_for_server(addr, Duration::from_secs(2)).await);
    (addr, handle)
}

/// Receive events until one matches, or panic after a timeout.
pub async fn next_matching<F>(events: &mut broadcast::Receiver<RuntimeEvent>, mut pred: F) -> RuntimeEvent
where
    F: FnMut(&RuntimeEvent) -> bool,
{
    let deadline = Duration::from_secs(2);
    tokio::time::timeout(deadline, async {
        loop {
            let event = events.recv().await.expect("event bus closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

// -- Counter app ---------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counter {
    pub count: i64,
    pub label: String,
}

impl AppState for Counter {}

pub enum CounterIntent {
    Add(i64),
    Label(String),
    Emit(String),
    Fail,
    Panic,
}

impl Intent for CounterIntent {
    fn from_message(message: &Message) -> Result<Option<Self>, ReduceError> {
        let value = message.value.as_ref();
        let intent = match message.action.as_str() {
            "add" => CounterIntent::Add(value.and_then(|v| v.to_i64()).unwrap_or(1)),
            "label" => CounterIntent::Label(value.map(|v| v.to_string()).unwrap_or_default()),
            "emit" => CounterIntent::Emit(value.map(|v| v.to_string()).unwrap_or_default()),
            "fail" => CounterIntent::Fail,
            "panic" => CounterIntent::Panic,
            _ => return Ok(None),
        };
        Ok(Some(intent))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CounterApp;

impl Reducer for CounterApp {
    type State = Counter;
    type Intent = CounterIntent;

    fn reduce(&self, state: &Counter, intent: CounterIntent) -> Result<Transition<Counter>, ReduceError> {
        match intent {
            CounterIntent::Add(n) => Ok(Transition::next(Counter {
                count: state.count + n,
                ..state.clone()
            })),
            CounterIntent::Label(label) => Ok(Transition::next(Counter {
                label,
                ..state.clone()
            })),
            CounterIntent::Emit(action) => Ok(Transition::with_command(
                Counter {
                    count: state.count + 1,
                    ..state.clone()
                },
                Command::new(action),
            )),
            CounterIntent::Fail => Err(ReduceError::Rejected("counter refused".into())),
            CounterIntent::Panic => panic!("counter exploded"),
        }
    }
}

/// Label that makes the view panic.
pub const UNRENDERABLE: &str = "unrenderable";

impl View<Counter> for CounterApp {
    fn view(&self, state: &Counter) -> Node {
        assert_ne!(state.label, UNRENDERABLE, "label cannot be drawn");
        Node::element("div").children([
            Node::element("span")
                .attr("id", "count")
                .with_text(state.count.to_string()),
            Node::element("span")
                .attr("id", "label")
                .with_text(state.label.as_str()),
        ])
    }
}

pub fn spawn_counter(registry: CommandRegistry, bus: EventBus) -> RuntimeHandle<Counter> {
    let session = Session::new(CounterApp, CounterApp, Counter::default());
    Runtime::spawn(session, registry, bus, &RuntimeConfig::default())
}
