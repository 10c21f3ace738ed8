//! Pattern-replying learner client.
//!
//! The client is a passive responder: the environment speaks twice (a reward
//! and one bit), the client answers with the next byte of its pattern. It
//! never interprets what it receives beyond logging it.

use crate::bits::BitDecoder;
use crate::config::Config;
use crate::error::ClientError;
use crate::pattern::Pattern;
use crate::protocol::{Action, Feedback, Outbound, Session, SessionStats, Stage};
use crate::shutdown::Shutdown;
use crate::transport::{Channel, ZmqChannel};
use bytes::Bytes;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Serve loop tuning.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// How long each wait on the channel lasts before the stop flag is checked.
    pub poll_interval: Duration,
    /// Give up on a message after this long. `None` waits forever.
    pub recv_timeout: Option<Duration>,
    /// Return after this many replies. `None` runs until stopped.
    pub max_cycles: Option<u64>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            recv_timeout: None,
            max_cycles: None,
        }
    }
}

impl From<&Config> for ClientOptions {
    fn from(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval,
            recv_timeout: config.recv_timeout,
            max_cycles: config.max_cycles,
        }
    }
}

/// Why the serve loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// The shutdown signal was raised.
    Stopped,
    /// `max_cycles` replies were sent.
    Completed,
}

/// Learner client. Owns its channel and session state exclusively.
pub struct Client<C: Channel = ZmqChannel> {
    channel: C,
    session: Session,
    decoder: BitDecoder,
    options: ClientOptions,
}

impl Client<ZmqChannel> {
    /// Open the PAIR channel described by `config`.
    pub fn connect(config: &Config) -> Result<Self, ClientError> {
        let channel = ZmqChannel::connect(&config.endpoint, config.linger)?;
        debug!(endpoint = channel.endpoint(), "Channel ready");
        Ok(Self::new(channel, config.pattern.clone(), ClientOptions::from(config)))
    }
}

impl<C: Channel> Client<C> {
    pub fn new(channel: C, pattern: Pattern, options: ClientOptions) -> Self {
        Self {
            channel,
            session: Session::new(pattern),
            decoder: BitDecoder::new(),
            options,
        }
    }

    /// Get the running totals for testing
    #[cfg(test)]
    pub fn stats(&self) -> &SessionStats {
        self.session.stats()
    }

    /// Get the current stage for testing
    #[cfg(test)]
    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    /// Send the greeting. Does nothing once it has been sent.
    pub fn handshake(&mut self) -> Result<(), ClientError> {
        if self.session.stage() != Stage::Handshake {
            return Ok(());
        }
        self.send(Outbound::Handshake)?;
        info!("Handshake sent");
        Ok(())
    }

    /// Answer the environment until `shutdown` fires or `max_cycles` is hit.
    ///
    /// Sends the handshake first if [`Client::handshake`] was not called.
    pub fn serve(&mut self, shutdown: &Shutdown) -> Result<ServeOutcome, ClientError> {
        self.handshake()?;

        loop {
            if shutdown.is_triggered() {
                return Ok(ServeOutcome::Stopped);
            }

            if self.session.stage() == Stage::Reward {
                if let Some(max) = self.options.max_cycles {
                    if self.session.cycles() >= max {
                        return Ok(ServeOutcome::Completed);
                    }
                }
            }

            match self.session.next_action() {
                Action::Send(outbound) => self.send(outbound)?,
                Action::Receive(stage) => {
                    let Some(message) = self.receive(stage, shutdown)? else {
                        return Ok(ServeOutcome::Stopped);
                    };
                    self.acknowledge(stage, &message);
                }
            }
        }
    }

    /// Close the channel and return the session totals.
    pub fn shutdown(self) -> Result<SessionStats, ClientError> {
        let stats = self.session.stats().clone();
        self.channel.close().map_err(ClientError::Teardown)?;
        info!(
            cycles = stats.cycles,
            total_reward = stats.total_reward,
            "Connection closed"
        );
        Ok(stats)
    }

    fn send(&mut self, outbound: Outbound) -> Result<(), ClientError> {
        let stage = self.session.stage();
        let payload = outbound.payload();
        self.channel
            .send(&payload)
            .map_err(|source| ClientError::Send { stage, source })?;

        if let Outbound::Reply(byte) = outbound {
            trace!(
                cycle = self.session.cycles(),
                reply = %char::from(byte),
                "Sent reply"
            );
        }
        self.session.complete();
        Ok(())
    }

    /// Wait for one message, in slices so the stop flag stays responsive.
    ///
    /// The channel is polled at least once, even with a zero timeout.
    /// `Ok(None)` means shutdown was requested while waiting.
    fn receive(&mut self, stage: Stage, shutdown: &Shutdown) -> Result<Option<Bytes>, ClientError> {
        let started = Instant::now();

        loop {
            let wait = match self.options.recv_timeout {
                Some(timeout) => timeout
                    .saturating_sub(started.elapsed())
                    .min(self.options.poll_interval),
                None => self.options.poll_interval,
            };

            match self.channel.recv(wait) {
                Ok(Some(message)) => return Ok(Some(message)),
                Ok(None) => {}
                // A signal handler ran (Ctrl+C); the flag decides what happens next
                Err(zmq::Error::EINTR) => trace!(%stage, "Wait interrupted"),
                Err(source) => return Err(ClientError::Recv { stage, source }),
            }

            if shutdown.is_triggered() {
                return Ok(None);
            }

            if let Some(timeout) = self.options.recv_timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(ClientError::Timeout { stage, waited });
                }
            }
        }
    }

    fn acknowledge(&mut self, stage: Stage, message: &[u8]) {
        match stage {
            Stage::Reward => match self.session.record_reward(message) {
                Feedback::Reward(value) => debug!(reward = value, "Reward"),
                Feedback::Unparsed => {
                    debug!(raw = ?String::from_utf8_lossy(message), "Unrecognized reward")
                }
            },
            Stage::Observation => {
                trace!(bit = ?String::from_utf8_lossy(message), "Observation");
                if let Some(c) = self.decoder.push(message) {
                    debug!(%c, "Environment said");
                }
            }
            Stage::Handshake | Stage::Reply => {}
        }
        self.session.complete();
    }
}
