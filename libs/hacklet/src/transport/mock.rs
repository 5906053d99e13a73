//! Mock Transport for Testing
//!
//! Scripted transport for exercising the session without a dongle attached.
//! Clones share state, so a test can keep a handle to inspect what the session
//! wrote after handing the transport over.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::traits::{Transport, TransportError, TransportStats};

#[derive(Debug, Default)]
struct MockTransportState {
    /// Bytes the device will "send", consumed front to back
    receive_queue: VecDeque<u8>,
    /// Every frame written, in order
    sent_data: Vec<Vec<u8>>,
    /// Every read length requested, in order
    read_requests: Vec<usize>,
    /// Number of write calls seen, including failed ones
    write_calls: usize,
    close_count: usize,
    closed: bool,
    /// Zero-based index of the write call that should fail
    fail_write_at: Option<usize>,
    fail_reads: bool,
    stats: TransportStats,
}

/// Mock transport implementation
#[derive(Debug, Clone)]
pub struct MockTransport {
    name: String,
    state: Arc<Mutex<MockTransportState>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a mock transport with an empty receive queue
    pub fn new() -> Self {
        Self {
            name: "Mock Transport".to_string(),
            state: Arc::new(Mutex::new(MockTransportState::default())),
        }
    }

    /// Append canned device bytes to the receive queue
    pub async fn add_receive_data(&self, data: &[u8]) {
        let mut state = self.state.lock().await;
        state.receive_queue.extend(data.iter().copied());
    }

    /// All frames written so far
    pub async fn sent_data(&self) -> Vec<Vec<u8>> {
        self.state.lock().await.sent_data.clone()
    }

    /// All read lengths requested so far
    pub async fn read_requests(&self) -> Vec<usize> {
        self.state.lock().await.read_requests.clone()
    }

    /// Bytes still waiting in the receive queue
    pub async fn pending_receive_bytes(&self) -> usize {
        self.state.lock().await.receive_queue.len()
    }

    /// Number of times `close` was called
    pub async fn close_count(&self) -> usize {
        self.state.lock().await.close_count
    }

    /// Fail the write call with zero-based index `index`
    pub async fn fail_write_at(&self, index: usize) {
        self.state.lock().await.fail_write_at = Some(index);
    }

    /// Make every subsequent read fail
    pub async fn set_receive_failure(&self, should_fail: bool) {
        self.state.lock().await.fail_reads = should_fail;
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;

        if state.closed {
            return Err(TransportError::NotConnected);
        }

        let call = state.write_calls;
        state.write_calls += 1;
        if state.fail_write_at == Some(call) {
            return Err(TransportError::SendFailed("Mock send failure".to_string()));
        }

        state.sent_data.push(data.to_vec());
        state.stats.record_sent(data.len());
        debug!("Mock transport sent {} bytes", data.len());
        Ok(())
    }

    /// Reads exactly `len` bytes from the receive queue
    ///
    /// When fewer than `len` bytes are queued they are consumed and the read
    /// times out, like a serial line that stalls mid-record.
    async fn read(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock().await;

        if state.closed {
            return Err(TransportError::NotConnected);
        }

        state.read_requests.push(len);

        if state.fail_reads {
            return Err(TransportError::ReceiveFailed(
                "Mock receive failure".to_string(),
            ));
        }

        let available = state.receive_queue.len();
        if available < len {
            state.receive_queue.clear();
            return Err(TransportError::Timeout(format!(
                "{available} of {len} bytes queued"
            )));
        }

        let data: Vec<u8> = state.receive_queue.drain(..len).collect();
        state.stats.record_received(data.len());
        debug!("Mock transport received {} bytes", data.len());
        Ok(data)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.close_count += 1;
        state.closed = true;
        Ok(())
    }

    fn stats(&self) -> TransportStats {
        self.state
            .try_lock()
            .map(|state| state.stats.clone())
            .unwrap_or_default()
    }
}
