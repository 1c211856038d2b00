use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::checks::{Connector, TcpOutcome};

/// Plain tokio connect. The name in `host` is resolved as part of the attempt
/// and counts against the same timeout.
pub struct TokioConnector;

#[async_trait]
impl Connector for TokioConnector {
    async fn connect(&self, host: &str, port: u16, connect_timeout: Duration) -> TcpOutcome {
        match timeout(connect_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => {
                release(stream, host, port).await;
                TcpOutcome::Open
            }
            Ok(Err(e)) => TcpOutcome::Failed(e.to_string()),
            // The pending connect future (and its socket) is dropped here.
            Err(_elapsed) => TcpOutcome::TimedOut,
        }
    }
}

/// Closes a probe connection. Teardown errors are logged, never returned.
async fn release(mut stream: TcpStream, host: &str, port: u16) {
    if let Err(e) = stream.shutdown().await {
        debug!("Closing probe connection to {host}:{port} failed: {e}");
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const TIMEOUT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn connect_to_listening_port_is_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let outcome = TokioConnector.connect("127.0.0.1", port, TIMEOUT).await;
        assert_eq!(outcome, TcpOutcome::Open);
    }

    #[tokio::test]
    async fn connect_to_closed_port_is_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let outcome = TokioConnector.connect("127.0.0.1", port, TIMEOUT).await;
        assert!(matches!(outcome, TcpOutcome::Failed(_)), "{outcome:?}");
    }

    #[tokio::test]
    async fn connect_to_unresolvable_name_fails() {
        let outcome = TokioConnector.connect("bad-host.invalid", 80, TIMEOUT).await;
        assert!(
            matches!(outcome, TcpOutcome::Failed(_) | TcpOutcome::TimedOut),
            "{outcome:?}"
        );
    }

    /// Relies on TEST-NET-3 being silently dropped rather than rejected.
    #[tokio::test]
    #[ignore]
    async fn connect_without_answer_times_out() {
        let outcome = TokioConnector
            .connect("203.0.113.1", 5985, Duration::from_millis(300))
            .await;
        assert_eq!(outcome, TcpOutcome::TimedOut);
    }
}
