use std::{fmt, sync::Arc};

use chrono::NaiveTime;
use tokio::sync::RwLock;

/// Broker connection state as exposed on the live endpoint.
///
/// The display strings are part of the wire contract — the dashboard shows
/// them verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connected,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionStatus::Disconnected => "Desconectado",
            ConnectionStatus::Connected => "Conectado",
            ConnectionStatus::Error => "Error",
        };
        f.write_str(s)
    }
}

/// The most recent decoded reading plus broker status.
///
/// Rebuilt from zero-values on every restart — history lives in the store,
/// this never touches disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveState {
    pub humidity: f64,
    pub distance: i64,
    pub connection: ConnectionStatus,
    /// Time of day the last valid message was processed.
    pub last_update: Option<NaiveTime>,
}

/// Shared handle to the single process-wide `LiveState`.
///
/// Wrapped in `Arc` so it can be cheaply cloned into the ingestion task and
/// the request handlers. Uses `tokio::sync::RwLock` so concurrent readers
/// never block each other, and a reader can never observe a half-written
/// snapshot.
#[derive(Clone, Default)]
pub struct LiveStateCache {
    inner: Arc<RwLock<LiveState>>,
}

impl LiveStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace humidity, distance and last-update time as one unit.
    /// Connection status is left alone — it has its own setter.
    pub async fn update(&self, humidity: f64, distance: i64, at: NaiveTime) {
        let mut state = self.inner.write().await;
        state.humidity = humidity;
        state.distance = distance;
        state.last_update = Some(at);
    }

    /// Set the broker connection status, independently of the reading fields.
    pub async fn set_status(&self, status: ConnectionStatus) {
        self.inner.write().await.connection = status;
    }

    /// Return a consistent copy of the current state.
    pub async fn snapshot(&self) -> LiveState {
        self.inner.read().await.clone()
    }
}
