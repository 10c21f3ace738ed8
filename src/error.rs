//! Client error type.

use crate::protocol::Stage;
use std::time::Duration;

/// Errors raised while talking to the environment
#[derive(Debug)]
pub enum ClientError {
    /// Creating or configuring the socket failed.
    Socket(zmq::Error),
    /// The endpoint was rejected.
    Connect { endpoint: String, source: zmq::Error },
    Send { stage: Stage, source: zmq::Error },
    Recv { stage: Stage, source: zmq::Error },
    /// Nothing arrived within the configured receive timeout.
    Timeout { stage: Stage, waited: Duration },
    /// Closing the socket or destroying the context failed.
    Teardown(zmq::Error),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Socket(e) => write!(f, "Failed to create socket: {}", e),
            ClientError::Connect { endpoint, source } => {
                write!(f, "Failed to connect to '{}': {}", endpoint, source)
            }
            ClientError::Send { stage, source } => {
                write!(f, "Failed to send {} message: {}", stage, source)
            }
            ClientError::Recv { stage, source } => {
                write!(f, "Failed to receive {} message: {}", stage, source)
            }
            ClientError::Timeout { stage, waited } => {
                write!(
                    f,
                    "Timed out after {}ms waiting for {} message",
                    waited.as_millis(),
                    stage
                )
            }
            ClientError::Teardown(e) => write!(f, "Failed to close connection: {}", e),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Socket(e) | ClientError::Teardown(e) => Some(e),
            ClientError::Connect { source, .. }
            | ClientError::Send { source, .. }
            | ClientError::Recv { source, .. } => Some(source),
            ClientError::Timeout { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_names_stage() {
        let err = ClientError::Recv {
            stage: Stage::Observation,
            source: zmq::Error::ETERM,
        };
        assert!(err.to_string().contains("observation"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_timeout_display() {
        let err = ClientError::Timeout {
            stage: Stage::Reward,
            waited: Duration::from_millis(250),
        };
        assert_eq!(
            err.to_string(),
            "Timed out after 250ms waiting for reward message"
        );
        assert!(err.source().is_none());
    }
}
