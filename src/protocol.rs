//! Learner side of the environment protocol.
//!
//! The environment drives the conversation. After the learner's one-time
//! handshake, every cycle is:
//!
//! ```text
//! env     -> learner: <reward>       e.g. "1", "0", "-1"
//! env     -> learner: <bit>          "0" or "1"
//! learner -> env:     <reply byte>   next byte of the pattern
//! ```
//!
//! [`Session`] owns the cycle counter and enforces that ordering; it does no
//! I/O of its own.

use crate::pattern::Pattern;
use std::fmt;

/// Literal greeting sent once after connecting (no terminator).
pub const HANDSHAKE: &[u8] = b"hello";

/// Position in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Greeting not sent yet.
    Handshake,
    /// Waiting for the reward acknowledgement.
    Reward,
    /// Waiting for the environment's bit.
    Observation,
    /// Both acknowledgements in, reply due.
    Reply,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Handshake => "handshake",
            Stage::Reward => "reward",
            Stage::Observation => "observation",
            Stage::Reply => "reply",
        };
        f.write_str(name)
    }
}

/// What the session needs next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(Outbound),
    Receive(Stage),
}

/// Outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Handshake,
    Reply(u8),
}

impl Outbound {
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Outbound::Handshake => HANDSHAKE.to_vec(),
            Outbound::Reply(byte) => vec![*byte],
        }
    }
}

/// Interpretation of a reward message. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Reward(i64),
    Unparsed,
}

impl Feedback {
    pub fn parse(message: &[u8]) -> Self {
        std::str::from_utf8(message)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .map(Feedback::Reward)
            .unwrap_or(Feedback::Unparsed)
    }
}

/// Running totals for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Replies sent.
    pub cycles: u64,
    /// Sum of parsed rewards.
    pub total_reward: i64,
    /// Rewards greater than zero.
    pub positive_rewards: u64,
    /// Reward messages that were not integers.
    pub unparsed_rewards: u64,
}

/// Conversation state: current stage, cycle counter and pattern.
#[derive(Debug)]
pub struct Session {
    pattern: Pattern,
    stage: Stage,
    stats: SessionStats,
}

impl Session {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            stage: Stage::Handshake,
            stats: SessionStats::default(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Number of replies sent so far; indexes the pattern.
    pub fn cycles(&self) -> u64 {
        self.stats.cycles
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn next_action(&self) -> Action {
        match self.stage {
            Stage::Handshake => Action::Send(Outbound::Handshake),
            Stage::Reward => Action::Receive(Stage::Reward),
            Stage::Observation => Action::Receive(Stage::Observation),
            Stage::Reply => Action::Send(Outbound::Reply(self.pattern.reply(self.stats.cycles))),
        }
    }

    /// Record a reward message. Returns how it was read.
    pub fn record_reward(&mut self, message: &[u8]) -> Feedback {
        let feedback = Feedback::parse(message);
        match feedback {
            Feedback::Reward(value) => {
                self.stats.total_reward = self.stats.total_reward.saturating_add(value);
                if value > 0 {
                    self.stats.positive_rewards += 1;
                }
            }
            Feedback::Unparsed => self.stats.unparsed_rewards += 1,
        }
        feedback
    }

    /// Mark the current action as done and move to the next stage.
    pub fn complete(&mut self) {
        self.stage = match self.stage {
            Stage::Handshake => Stage::Reward,
            Stage::Reward => Stage::Observation,
            Stage::Observation => Stage::Reply,
            Stage::Reply => {
                self.stats.cycles = self.stats.cycles.wrapping_add(1);
                Stage::Reward
            }
        };
    }
}
