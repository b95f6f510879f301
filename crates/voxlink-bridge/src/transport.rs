//! Transport seam between the connection manager and the engine process.
//!
//! The [`Connector`] trait opens a fresh [`Transport`] per connection
//! attempt; the production implementation spawns the engine as a child
//! process and frames messages over its stdio pipes. Tests substitute an
//! in-memory transport.

use async_trait::async_trait;
use tokio::io::{BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use voxlink_core::protocol::{NativeMessage, OutboundCommand};

use crate::error::BridgeError;
use crate::framing::{read_frame, write_frame};

/// One live channel to the engine process.
///
/// `recv` returning `Ok(None)` means the channel closed cleanly; any error
/// is treated the same way by the connection manager (disconnect + backoff).
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, command: &OutboundCommand) -> Result<(), BridgeError>;
    async fn recv(&mut self) -> Result<Option<NativeMessage>, BridgeError>;
}

/// Opens a fresh transport for each connection attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Transport>, BridgeError>;
}

/// Spawns the speech engine as a child process speaking framed JSON on stdio.
pub struct EngineProcessConnector {
    command: String,
    args: Vec<String>,
}

impl EngineProcessConnector {
    pub fn new(command: String, args: Vec<String>) -> Self {
        Self { command, args }
    }
}

#[async_trait]
impl Connector for EngineProcessConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, BridgeError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BridgeError::Spawn(format!("{}: {}", self.command, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::Spawn("engine stdin not piped".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::Spawn("engine stdout not piped".to_string()))?;

        tracing::info!(command = %self.command, pid = child.id(), "Engine process spawned");

        Ok(Box::new(EngineProcessTransport {
            _child: child,
            writer: BufWriter::new(stdin),
            reader: BufReader::new(stdout),
        }))
    }
}

/// Transport over a spawned engine child process.
///
/// Dropping the transport kills the child (`kill_on_drop`), which is what
/// tears down the channel on panel shutdown.
struct EngineProcessTransport {
    _child: Child,
    writer: BufWriter<ChildStdin>,
    reader: BufReader<ChildStdout>,
}

#[async_trait]
impl Transport for EngineProcessTransport {
    async fn send(&mut self, command: &OutboundCommand) -> Result<(), BridgeError> {
        write_frame(&mut self.writer, command).await
    }

    async fn recv(&mut self) -> Result<Option<NativeMessage>, BridgeError> {
        read_frame(&mut self.reader).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_failure_is_spawn_error() {
        let connector = EngineProcessConnector::new(
            "/nonexistent/voxlink-engine-binary".to_string(),
            Vec::new(),
        );
        let result = connector.connect().await;
        match result {
            Err(BridgeError::Spawn(msg)) => assert!(msg.contains("voxlink-engine-binary")),
            other => panic!("expected Spawn error, got {:?}", other.map(|_| ())),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_child_eof_yields_none() {
        // `true` exits immediately without writing anything, so the first
        // read hits EOF on a frame boundary.
        let connector = EngineProcessConnector::new("true".to_string(), Vec::new());
        let mut transport = connector.connect().await.unwrap();
        let msg = transport.recv().await.unwrap();
        assert!(msg.is_none());
    }
}
