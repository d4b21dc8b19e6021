//! Errors raised while hosting the download listener.
//!
//! Messages stay constant; the listener address and grace period travel as
//! fields so callers can log them without parsing text.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Result alias for API server operations.
pub type ApiServerResult<T> = std::result::Result<T, ApiServerError>;

/// Errors raised while binding, serving or draining the listener.
#[derive(Debug, Error)]
pub enum ApiServerError {
    /// Binding the listener failed.
    #[error("failed to bind download listener")]
    Bind {
        /// Address attempted.
        addr: SocketAddr,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The accept loop failed while serving.
    #[error("download listener terminated unexpectedly")]
    Serve {
        /// Address the listener was bound to.
        addr: SocketAddr,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Downloads were still streaming when the shutdown grace period ran out.
    #[error("in-flight downloads outlived the shutdown grace period")]
    DrainTimeout {
        /// Address the listener was bound to.
        addr: SocketAddr,
        /// Grace period that elapsed.
        grace: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages_are_constant_and_sources_preserved() -> anyhow::Result<()> {
        let addr: SocketAddr = "127.0.0.1:8080".parse()?;
        let bind = ApiServerError::Bind {
            addr,
            source: io::Error::new(io::ErrorKind::AddrInUse, "busy"),
        };
        assert_eq!(bind.to_string(), "failed to bind download listener");
        assert!(bind.source().is_some());

        let serve = ApiServerError::Serve {
            addr,
            source: io::Error::new(io::ErrorKind::BrokenPipe, "lost"),
        };
        assert_eq!(serve.to_string(), "download listener terminated unexpectedly");
        assert!(serve.source().is_some());

        let drain = ApiServerError::DrainTimeout {
            addr,
            grace: Duration::from_secs(30),
        };
        assert_eq!(
            drain.to_string(),
            "in-flight downloads outlived the shutdown grace period"
        );
        assert!(drain.source().is_none());
        Ok(())
    }
}
