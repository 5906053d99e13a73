//! Dongle session
//!
//! A [`Session`] is one conversation with the dongle. It is only usable
//! between a successful boot sequence (boot, boot confirm, lock) and close.
//! [`Dongle::open_session`] scopes that lifetime: it acquires the transport,
//! boots, runs the caller's operation and then closes the transport on every
//! path.
//!
//! ```text
//!   Closed ──boot ok──▶ Open ──scope exit / close──▶ Closed
//!     │
//!     └──boot failed──▶ transport released, operation never runs
//! ```

use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

use crate::error::{DongleError, Result};
use crate::logger::{Direction, NoopPacketLogger, PacketLogger};
use crate::protocol::{
    remaining_length, AckResponse, BootConfirmResponse, BootResponse, Command, Decode,
    FixedLength, HandshakeResponse, LockResponse, SamplesResponse, HEADER_CHUNK_LEN,
};
use crate::transport::{SerialTransport, SerialTransportConfig, Transport, TransportStats};

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
}

/// Replies gathered during the boot sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootReport {
    pub boot: BootResponse,
    pub boot_confirm: BootConfirmResponse,
    pub lock: LockResponse,
}

/// Entry point for talking to a dongle
#[derive(Debug, Clone)]
pub struct Dongle {
    logger: Arc<dyn PacketLogger>,
}

impl Default for Dongle {
    fn default() -> Self {
        Self::new()
    }
}

impl Dongle {
    /// Create a dongle driver that does not log packets
    pub fn new() -> Self {
        Self {
            logger: Arc::new(NoopPacketLogger),
        }
    }

    /// Create a dongle driver reporting to `logger`
    pub fn with_logger(logger: Arc<dyn PacketLogger>) -> Self {
        Self { logger }
    }

    /// Open the serial port, boot the dongle and run `operation` in the session
    ///
    /// The port is closed when this returns, whatever the outcome.
    pub async fn open_session<R, F>(&self, config: SerialTransportConfig, operation: F) -> Result<R>
    where
        F: for<'s> FnOnce(&'s mut Session<SerialTransport>) -> BoxFuture<'s, Result<R>>,
    {
        let transport = SerialTransport::open(config)?;
        self.open_session_with(transport, operation).await
    }

    /// Boot the dongle over `transport` and run `operation` in the session
    ///
    /// The transport is closed exactly once before this returns. An error from
    /// the boot sequence or the operation takes precedence over a close error.
    pub async fn open_session_with<T, R, F>(&self, transport: T, operation: F) -> Result<R>
    where
        T: Transport,
        F: for<'s> FnOnce(&'s mut Session<T>) -> BoxFuture<'s, Result<R>>,
    {
        let mut session = Session::new(transport, Arc::clone(&self.logger));

        // A panic inside the operation still drops the transport with the session
        let booted = session.open().await.map(|_| ());
        let result = match booted {
            Ok(()) => operation(&mut session).await,
            Err(e) => Err(e),
        };
        let closed = session.close().await;

        match (result, closed) {
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
            (Ok(value), Ok(())) => Ok(value),
        }
    }
}

/// One conversation with the dongle
#[derive(Debug)]
pub struct Session<T: Transport> {
    /// `None` once the transport has been released
    transport: Option<T>,
    state: SessionState,
    boot_report: Option<BootReport>,
    logger: Arc<dyn PacketLogger>,
}

impl<T: Transport> Session<T> {
    /// Wrap `transport` in a closed session
    pub fn new(transport: T, logger: Arc<dyn PacketLogger>) -> Self {
        Self {
            transport: Some(transport),
            state: SessionState::Closed,
            boot_report: None,
            logger,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open && self.transport.is_some()
    }

    /// Replies from the boot sequence, once the session is open
    pub fn boot_report(&self) -> Option<&BootReport> {
        self.boot_report.as_ref()
    }

    /// Statistics of the owned transport, `None` after close
    pub fn transport_stats(&self) -> Option<TransportStats> {
        self.transport.as_ref().map(Transport::stats)
    }

    /// Run the boot sequence: boot, boot confirm, lock
    ///
    /// Any failure leaves the session closed. On an open session this returns
    /// the existing report without touching the dongle.
    pub async fn open(&mut self) -> Result<&BootReport> {
        if self.state != SessionState::Open {
            let report = self.boot().await?;
            self.boot_report = Some(report);
            self.state = SessionState::Open;
        }
        self.boot_report.as_ref().ok_or(DongleError::SessionNotOpen)
    }

    async fn boot(&mut self) -> Result<BootReport> {
        let name = match self.transport.as_ref() {
            Some(transport) => transport.name().to_string(),
            None => return Err(DongleError::transport("transport already released")),
        };
        debug!("Booting dongle on {}", name);

        self.logger.log_event("Booting");
        let boot: BootResponse = self.exchange(Command::BootRequest).await?;
        let boot_confirm: BootConfirmResponse = self.exchange(Command::BootConfirmRequest).await?;
        self.logger.log_event("Booting complete");

        self.logger.log_event("Locking network");
        let lock: LockResponse = self.exchange(Command::LockRequest).await?;
        self.logger.log_event("Locking complete");

        Ok(BootReport {
            boot,
            boot_confirm,
            lock,
        })
    }

    /// Close the session and release the transport
    ///
    /// Closing twice is a no-op; the transport sees a single close.
    pub async fn close(&mut self) -> Result<()> {
        self.state = SessionState::Closed;
        match self.transport.take() {
            Some(mut transport) => {
                transport.close().await?;
                debug!("Session closed on {}", transport.name());
                Ok(())
            },
            None => Ok(()),
        }
    }

    /// Select the network with `network_id`
    pub async fn select_network(&mut self, network_id: u16) -> Result<HandshakeResponse> {
        self.require_session()?;
        self.exchange(Command::HandshakeRequest { network_id }).await
    }

    /// Request the samples stored for `channel_id` on `network_id`
    pub async fn request_samples(
        &mut self,
        network_id: u16,
        channel_id: u16,
    ) -> Result<SamplesResponse> {
        self.require_session()?;

        let _ack: AckResponse = self
            .exchange(Command::SamplesRequest {
                network_id,
                channel_id,
            })
            .await?;

        let frame = self.receive_samples_frame().await?;
        SamplesResponse::decode(&frame)
    }

    fn require_session(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(DongleError::SessionNotOpen)
        }
    }

    fn transport_mut(&mut self) -> Result<&mut T> {
        self.transport.as_mut().ok_or(DongleError::SessionNotOpen)
    }

    async fn transmit(&mut self, command: Command) -> Result<()> {
        let frame = command.encode();
        self.logger.log_packet(Direction::Tx, &frame);
        self.transport_mut()?.write(&frame).await?;
        Ok(())
    }

    async fn receive(&mut self, len: usize) -> Result<Vec<u8>> {
        let data = self.transport_mut()?.read(len).await?;
        self.logger.log_packet(Direction::Rx, &data);
        if data.len() != len {
            return Err(DongleError::transport(format!(
                "expected {len} bytes, stream delivered {}",
                data.len()
            )));
        }
        Ok(data)
    }

    /// Send `command` and decode its fixed-length reply
    async fn exchange<R: FixedLength>(&mut self, command: Command) -> Result<R> {
        self.transmit(command).await?;
        let reply = self.receive(R::LEN).await?;
        R::decode(&reply)
    }

    /// Read a samples reply whose length is announced in its own header
    async fn receive_samples_frame(&mut self) -> Result<Vec<u8>> {
        let mut frame = self.receive(HEADER_CHUNK_LEN).await?;
        let remaining = remaining_length(&frame)?;
        let body = self.receive(remaining).await?;
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, TransportError};

    const BOOT_REPLY_HEAD: [u8; 4] = [0x02, 0x40, 0x84, 0x16];
    const BOOT_CONFIRM_REPLY: [u8; 6] = [0x02, 0x40, 0x80, 0x01, 0x10, 0xD1];
    const LOCK_REPLY: [u8; 6] = [0x02, 0xA0, 0xF9, 0x01, 0x00, 0x58];

    async fn queue_boot_replies(mock: &MockTransport) {
        let mut boot = BOOT_REPLY_HEAD.to_vec();
        boot.extend_from_slice(&[0x00; 22]);
        boot.push(0x00);
        mock.add_receive_data(&boot).await;
        mock.add_receive_data(&BOOT_CONFIRM_REPLY).await;
        mock.add_receive_data(&LOCK_REPLY).await;
    }

    fn session(mock: &MockTransport) -> Session<MockTransport> {
        Session::new(mock.clone(), Arc::new(NoopPacketLogger))
    }

    #[tokio::test]
    async fn test_operations_before_open_do_no_io() {
        let mock = MockTransport::new();
        let mut session = session(&mock);

        assert_eq!(
            session.select_network(1).await,
            Err(DongleError::SessionNotOpen)
        );
        assert_eq!(
            session.request_samples(1, 2).await,
            Err(DongleError::SessionNotOpen)
        );
        assert!(mock.sent_data().await.is_empty());
        assert!(mock.read_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_open_runs_boot_sequence_in_order() {
        let mock = MockTransport::new();
        queue_boot_replies(&mock).await;
        let mut session = session(&mock);

        let report = session.open().await.unwrap().clone();
        assert_eq!(report.boot_confirm.status, 0x10);
        assert!(session.is_open());

        assert_eq!(
            mock.sent_data().await,
            vec![
                Command::BootRequest.encode(),
                Command::BootConfirmRequest.encode(),
                Command::LockRequest.encode(),
            ]
        );
        assert_eq!(mock.read_requests().await, vec![27, 6, 6]);
    }

    #[tokio::test]
    async fn test_boot_decode_failure_leaves_session_closed() {
        let mock = MockTransport::new();
        // Zeroed bytes where the boot reply should be
        mock.add_receive_data(&[0x00; 27]).await;
        let mut session = session(&mock);

        let err = session.open().await.unwrap_err();
        assert!(err.is_decode());
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(mock.sent_data().await.len(), 1);
    }

    #[tokio::test]
    async fn test_operations_after_close_do_no_io() {
        let mock = MockTransport::new();
        queue_boot_replies(&mock).await;
        let mut session = session(&mock);
        session.open().await.unwrap();

        session.close().await.unwrap();
        session.close().await.unwrap();
        assert_eq!(mock.close_count().await, 1);

        let writes = mock.sent_data().await.len();
        assert_eq!(
            session.select_network(7).await,
            Err(DongleError::SessionNotOpen)
        );
        assert_eq!(mock.sent_data().await.len(), writes);
        assert!(session.transport_stats().is_none());
    }

    #[tokio::test]
    async fn test_open_twice_does_not_reboot() {
        let mock = MockTransport::new();
        queue_boot_replies(&mock).await;
        let mut session = session(&mock);

        let first = session.open().await.unwrap().clone();
        let second = session.open().await.unwrap().clone();

        assert_eq!(first, second);
        assert!(session.is_open());
        assert_eq!(mock.sent_data().await.len(), 3);
        assert_eq!(mock.read_requests().await, vec![27, 6, 6]);
    }

    /// Transport that hands back fewer bytes than requested
    #[derive(Debug)]
    struct ShortReadTransport;

    #[async_trait::async_trait]
    impl Transport for ShortReadTransport {
        fn name(&self) -> &str {
            "short"
        }

        async fn write(&mut self, _data: &[u8]) -> std::result::Result<(), TransportError> {
            Ok(())
        }

        async fn read(&mut self, len: usize) -> std::result::Result<Vec<u8>, TransportError> {
            Ok(vec![0x02; len / 2])
        }

        async fn close(&mut self) -> std::result::Result<(), TransportError> {
            Ok(())
        }

        fn stats(&self) -> TransportStats {
            TransportStats::default()
        }
    }

    #[tokio::test]
    async fn test_short_read_is_transport_failure() {
        let mut session = Session::new(ShortReadTransport, Arc::new(NoopPacketLogger));

        let err = session.open().await.unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("expected 27 bytes"));
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_reopen_after_close_fails() {
        let mock = MockTransport::new();
        let mut session = session(&mock);
        session.close().await.unwrap();

        let err = session.open().await.unwrap_err();
        assert!(err.is_transport());
    }
}
