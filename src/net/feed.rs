//! Live oracle feed over `/ws/oracle/{bond_id}`.
//!
//! DESIGN
//! ======
//! A subscription is a scoped resource. `connect` opens the socket, spawns
//! one reader task, and returns a [`FeedSubscription`] whose
//! [`FeedDisposer`] is the only release hook: disposing (or dropping) it
//! signals the reader to send a close frame and exit.
//!
//! There is no heartbeat and no reconnect. When the server goes away the
//! update channel closes and the caller keeps whatever it already received.

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::types::ApiError;

/// Buffered text frames per subscription before the reader waits.
const FEED_BUFFER: usize = 64;

type FeedStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Map an HTTP base URL to the websocket feed URL for one bond.
///
/// # Errors
///
/// Returns [`ApiError::InvalidBaseUrl`] for anything but `http://` or `https://`.
pub fn feed_url(base_url: &str, bond_id: &str) -> Result<String, ApiError> {
    let base = base_url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/ws/oracle/{bond_id}"));
    }
    if let Some(rest) = base.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/ws/oracle/{bond_id}"));
    }
    Err(ApiError::InvalidBaseUrl(base_url.to_owned()))
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Release handle for a live feed.
///
/// Dropping the disposer releases the feed as well; `dispose` just makes the
/// release explicit at the call site.
#[derive(Debug)]
pub struct FeedDisposer {
    shutdown: Option<oneshot::Sender<()>>,
}

impl FeedDisposer {
    #[must_use]
    pub fn new(shutdown: oneshot::Sender<()>) -> Self {
        Self { shutdown: Some(shutdown) }
    }

    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl Drop for FeedDisposer {
    fn drop(&mut self) {
        self.release();
    }
}

/// An open feed: incoming text frames plus the disposer that closes them.
#[derive(Debug)]
pub struct FeedSubscription {
    bond_id: String,
    updates: mpsc::Receiver<String>,
    disposer: FeedDisposer,
}

impl FeedSubscription {
    #[must_use]
    pub fn new(bond_id: impl Into<String>, updates: mpsc::Receiver<String>, disposer: FeedDisposer) -> Self {
        Self { bond_id: bond_id.into(), updates, disposer }
    }

    #[must_use]
    pub fn bond_id(&self) -> &str {
        &self.bond_id
    }

    /// Wait for the next raw frame. `None` once the feed has ended.
    pub async fn recv(&mut self) -> Option<String> {
        self.updates.recv().await
    }

    /// Take an already-buffered frame without waiting.
    ///
    /// # Errors
    ///
    /// [`TryRecvError::Empty`] when nothing is buffered yet,
    /// [`TryRecvError::Disconnected`] once the feed has ended and drained.
    pub fn try_recv(&mut self) -> Result<String, TryRecvError> {
        self.updates.try_recv()
    }

    /// Release the connection.
    pub fn dispose(self) {
        self.disposer.dispose();
    }
}

// =============================================================================
// CONNECT
// =============================================================================

/// Open the feed at `url` (see [`feed_url`]).
///
/// # Errors
///
/// Returns [`ApiError::WsConnect`] when the handshake fails.
pub async fn connect(url: &str, bond_id: &str) -> Result<FeedSubscription, ApiError> {
    let (stream, _) = connect_async(url)
        .await
        .map_err(|error| ApiError::WsConnect(Box::new(error)))?;
    tracing::info!(%bond_id, "oracle feed connected");

    let (tx, rx) = mpsc::channel(FEED_BUFFER);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(pump(stream, tx, shutdown_rx, bond_id.to_owned()));

    Ok(FeedSubscription::new(bond_id, rx, FeedDisposer::new(shutdown_tx)))
}

async fn pump(mut stream: FeedStream, tx: mpsc::Sender<String>, mut shutdown: oneshot::Receiver<()>, bond_id: String) {
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                let _ = stream.close(None).await;
                tracing::debug!(%bond_id, "oracle feed released");
                return;
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    if tx.send(text.as_str().to_owned()).await.is_err() {
                        let _ = stream.close(None).await;
                        return;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!(%bond_id, "oracle feed closed by server");
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    tracing::warn!(%bond_id, %error, "oracle feed read failed");
                    return;
                }
            },
        }
    }
}
