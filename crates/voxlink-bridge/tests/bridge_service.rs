//! End-to-end bridge service tests over a scripted in-memory transport.
//!
//! Uses the paused tokio clock so backoff timing is asserted exactly
//! instead of waited out.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use voxlink_bridge::{
    run, BridgeError, BridgeEvent, Connection, ConnectionState, Connector, ReconnectPolicy,
    Transport,
};
use voxlink_core::protocol::{NativeMessage, OutboundCommand};

/// One scripted step of a transport's inbound side.
#[derive(Clone)]
enum Inbound {
    /// Deliver this message.
    Emit(NativeMessage),
    /// Close the channel (recv returns Ok(None)).
    Close,
}

/// What a single connect attempt does.
#[derive(Clone)]
enum Attempt {
    Fail,
    Succeed(Vec<Inbound>),
}

struct ScriptedConnector {
    attempts: Mutex<VecDeque<Attempt>>,
    connect_calls: AtomicU32,
    sent: Arc<Mutex<Vec<OutboundCommand>>>,
}

impl ScriptedConnector {
    fn new(attempts: Vec<Attempt>) -> Arc<Self> {
        Arc::new(Self {
            attempts: Mutex::new(attempts.into()),
            connect_calls: AtomicU32::new(0),
            sent: Arc::new(Mutex::new(Vec::new())),
        })
    }
}

/// Local wrapper so the foreign `Connector` trait can be implemented over
/// a shared handle to the script.
struct ConnectorHandle(Arc<ScriptedConnector>);

#[async_trait]
impl Connector for ConnectorHandle {
    async fn connect(&self) -> Result<Box<dyn Transport>, BridgeError> {
        self.0.connect_calls.fetch_add(1, Ordering::SeqCst);
        let attempt = self
            .0
            .attempts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Attempt::Fail);
        match attempt {
            Attempt::Fail => Err(BridgeError::Spawn("scripted failure".to_string())),
            Attempt::Succeed(script) => Ok(Box::new(ScriptedTransport {
                script: script.into(),
                sent: Arc::clone(&self.0.sent),
            })),
        }
    }
}

struct ScriptedTransport {
    script: VecDeque<Inbound>,
    sent: Arc<Mutex<Vec<OutboundCommand>>>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, command: &OutboundCommand) -> Result<(), BridgeError> {
        self.sent.lock().unwrap().push(command.clone());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<NativeMessage>, BridgeError> {
        match self.script.pop_front() {
            Some(Inbound::Emit(msg)) => Ok(Some(msg)),
            Some(Inbound::Close) => Ok(None),
            // Script exhausted: channel stays open and quiet.
            None => std::future::pending().await,
        }
    }
}

struct Harness {
    connector: Arc<ScriptedConnector>,
    commands: mpsc::Sender<OutboundCommand>,
    events: mpsc::Receiver<BridgeEvent>,
    shutdown: Arc<Notify>,
}

fn spawn_service(attempts: Vec<Attempt>) -> Harness {
    let connector = ScriptedConnector::new(attempts);
    let connection = Connection::new(
        Box::new(ConnectorHandle(Arc::clone(&connector))),
        ReconnectPolicy::default(),
    );
    let (cmd_tx, cmd_rx) = mpsc::channel(16);
    let (event_tx, event_rx) = mpsc::channel(64);
    let shutdown = Arc::new(Notify::new());

    tokio::spawn(run(connection, cmd_rx, event_tx, Arc::clone(&shutdown)));

    Harness {
        connector,
        commands: cmd_tx,
        events: event_rx,
        shutdown,
    }
}

async fn next_state(harness: &mut Harness) -> ConnectionState {
    loop {
        match harness.events.recv().await.expect("service stopped early") {
            BridgeEvent::StateChanged(state) => return state,
            _ => continue,
        }
    }
}

#[tokio::test(start_paused = true)]
async fn reconnect_backoff_is_linear_and_caps_at_five() {
    let started = tokio::time::Instant::now();
    let mut harness = spawn_service(Vec::new()); // every attempt fails

    // 1 initial connect + 5 scheduled retries, then terminal Error.
    loop {
        if next_state(&mut harness).await == ConnectionState::Error {
            break;
        }
    }

    // Delays were 2s + 4s + 6s + 8s + 10s.
    assert_eq!(started.elapsed(), Duration::from_secs(30));
    assert_eq!(harness.connector.connect_calls.load(Ordering::SeqCst), 6);

    // No sixth retry is ever scheduled.
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(harness.connector.connect_calls.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn handshake_ack_completes_connection_and_commands_flow() {
    let mut harness = spawn_service(vec![Attempt::Succeed(vec![Inbound::Emit(
        NativeMessage::HandshakeAck,
    )])]);

    assert_eq!(next_state(&mut harness).await, ConnectionState::Connecting);
    assert_eq!(next_state(&mut harness).await, ConnectionState::Connected);

    harness
        .commands
        .send(OutboundCommand::StartRecording)
        .await
        .unwrap();

    // The ack itself is still routed onward as a message.
    match harness.events.recv().await.unwrap() {
        BridgeEvent::Message(NativeMessage::HandshakeAck) => {}
        other => panic!("expected forwarded ack, got {:?}", other),
    }

    // Give the service a turn to process the queued command.
    tokio::task::yield_now().await;
    assert_eq!(
        harness.connector.sent.lock().unwrap().as_slice(),
        [OutboundCommand::Handshake, OutboundCommand::StartRecording]
    );

    harness.shutdown.notify_one();
}

#[tokio::test(start_paused = true)]
async fn send_while_connecting_is_rejected_without_io() {
    let mut harness = spawn_service(vec![Attempt::Succeed(Vec::new())]); // no ack ever arrives

    assert_eq!(next_state(&mut harness).await, ConnectionState::Connecting);

    harness
        .commands
        .send(OutboundCommand::StopRecording)
        .await
        .unwrap();

    match harness.events.recv().await.unwrap() {
        BridgeEvent::SendFailed { command, error } => {
            assert_eq!(command, OutboundCommand::StopRecording);
            assert!(error.contains("not connected"));
        }
        other => panic!("expected SendFailed, got {:?}", other),
    }

    // Only the handshake ever hit the wire.
    assert_eq!(
        harness.connector.sent.lock().unwrap().as_slice(),
        [OutboundCommand::Handshake]
    );

    harness.shutdown.notify_one();
}

#[tokio::test(start_paused = true)]
async fn unacknowledged_handshake_times_out_into_backoff() {
    let started = tokio::time::Instant::now();
    let mut harness = spawn_service(vec![
        Attempt::Succeed(Vec::new()), // channel opens but the ack never comes
        Attempt::Succeed(vec![Inbound::Emit(NativeMessage::HandshakeAck)]),
    ]);

    assert_eq!(next_state(&mut harness).await, ConnectionState::Connecting);
    assert_eq!(next_state(&mut harness).await, ConnectionState::Disconnected);
    assert_eq!(next_state(&mut harness).await, ConnectionState::Connecting);
    assert_eq!(next_state(&mut harness).await, ConnectionState::Connected);

    // 10s handshake timeout, then the regular 2s first-retry backoff.
    assert_eq!(started.elapsed(), Duration::from_secs(12));
    assert_eq!(harness.connector.connect_calls.load(Ordering::SeqCst), 2);

    harness.shutdown.notify_one();
}

#[tokio::test(start_paused = true)]
async fn messages_before_ack_are_forwarded_without_state_change() {
    let mut harness = spawn_service(vec![Attempt::Succeed(vec![
        Inbound::Emit(NativeMessage::Transcription {
            text: "early".to_string(),
        }),
        Inbound::Emit(NativeMessage::HandshakeAck),
    ])]);

    assert_eq!(next_state(&mut harness).await, ConnectionState::Connecting);

    // The transcription arrives while still Connecting and is routed anyway.
    match harness.events.recv().await.unwrap() {
        BridgeEvent::Message(NativeMessage::Transcription { text }) => {
            assert_eq!(text, "early");
        }
        other => panic!("expected forwarded transcription, got {:?}", other),
    }

    assert_eq!(next_state(&mut harness).await, ConnectionState::Connected);
    harness.shutdown.notify_one();
}

#[tokio::test(start_paused = true)]
async fn unknown_message_types_are_dropped() {
    let mut harness = spawn_service(vec![Attempt::Succeed(vec![
        Inbound::Emit(NativeMessage::Unknown),
        Inbound::Emit(NativeMessage::HandshakeAck),
    ])]);

    assert_eq!(next_state(&mut harness).await, ConnectionState::Connecting);

    // The next event after Connecting must be the Connected transition;
    // the unknown message never surfaces.
    match harness.events.recv().await.unwrap() {
        BridgeEvent::StateChanged(ConnectionState::Connected) => {}
        other => panic!("expected Connected, got {:?}", other),
    }

    harness.shutdown.notify_one();
}

#[tokio::test(start_paused = true)]
async fn channel_close_after_connect_reconnects_with_fresh_backoff() {
    let started = tokio::time::Instant::now();
    let mut harness = spawn_service(vec![
        Attempt::Succeed(vec![
            Inbound::Emit(NativeMessage::HandshakeAck),
            Inbound::Close,
        ]),
        Attempt::Succeed(vec![Inbound::Emit(NativeMessage::HandshakeAck)]),
    ]);

    assert_eq!(next_state(&mut harness).await, ConnectionState::Connecting);
    assert_eq!(next_state(&mut harness).await, ConnectionState::Connected);
    assert_eq!(next_state(&mut harness).await, ConnectionState::Disconnected);
    assert_eq!(next_state(&mut harness).await, ConnectionState::Connecting);
    assert_eq!(next_state(&mut harness).await, ConnectionState::Connected);

    // Attempts were reset by the first ack, so the retry waited 2s.
    assert_eq!(started.elapsed(), Duration::from_secs(2));
    assert_eq!(harness.connector.connect_calls.load(Ordering::SeqCst), 2);

    harness.shutdown.notify_one();
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_backoff_sleep() {
    let mut harness = spawn_service(Vec::new());

    // Wait for the first Disconnected (backoff armed), then shut down.
    assert_eq!(next_state(&mut harness).await, ConnectionState::Disconnected);
    harness.shutdown.notify_one();

    // The service must stop: its event sender drops, closing the channel.
    while harness.events.recv().await.is_some() {}
    assert!(harness.connector.connect_calls.load(Ordering::SeqCst) <= 2);
}
