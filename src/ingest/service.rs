use std::time::Duration;

use chrono::Local;
use rumqttc::{AsyncClient, Event, EventLoop, Packet, QoS};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::{
    ingest::models::Reading,
    live_state::{ConnectionStatus, LiveStateCache},
    storage::ReadingStore,
};

/// Subscribes to the telemetry topic hierarchy and turns each inbound
/// message into a cache update plus a durable append.
///
/// Messages are processed strictly one at a time, in delivery order; a slow
/// append throttles cache freshness during bursts rather than reordering or
/// interleaving updates.
pub struct IngestService {
    client: AsyncClient,
    topic_filter: String,
    cache: LiveStateCache,
    store: ReadingStore,
}

impl IngestService {
    pub fn new(
        client: AsyncClient,
        base_topic: &str,
        cache: LiveStateCache,
        store: ReadingStore,
    ) -> Self {
        Self {
            client,
            // Base topic and all descendants.
            topic_filter: format!("{}/#", base_topic.trim_end_matches('/')),
            cache,
            store,
        }
    }

    /// Drive the broker event loop for the lifetime of the process.
    /// Spawn this via `tokio::spawn`.
    ///
    /// rumqttc reconnects on the next `poll()` after an error, so connection
    /// failures only surface here as a status flip and a short backoff —
    /// never as an exit.
    pub async fn run(self, mut eventloop: EventLoop) {
        info!(topic = %self.topic_filter, "Ingestion loop started");

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!(topic = %self.topic_filter, "Connected to broker, subscribing");
                    self.cache.set_status(ConnectionStatus::Connected).await;

                    // Subscribe (or re-subscribe after a reconnect).
                    if let Err(e) = self
                        .client
                        .subscribe(self.topic_filter.as_str(), QoS::AtMostOnce)
                        .await
                    {
                        error!(topic = %self.topic_filter, error = %e, "Subscribe failed");
                        self.cache.set_status(ConnectionStatus::Error).await;
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.handle_message(&publish.topic, &publish.payload).await;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "Broker connection error");
                    self.cache.set_status(ConnectionStatus::Error).await;
                    sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    /// Process one inbound message end to end.
    ///
    /// Undecodable payloads are dropped without touching cache or store. On
    /// a valid payload the cache is updated first; an append failure is
    /// logged and the reading is lost for history purposes (at-most-once),
    /// but the live view already reflects it.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) {
        let reading = match Reading::decode(payload) {
            Ok(reading) => reading,
            Err(e) => {
                warn!(topic = %topic, error = %e, "Dropping undecodable message");
                return;
            }
        };

        self.cache
            .update(reading.humidity, reading.distance, Local::now().time())
            .await;

        if let Err(e) = self.store.append(reading.humidity, reading.distance).await {
            error!(error = %e, "Failed to persist reading");
        }

        info!(
            topic = %topic,
            humidity = reading.humidity,
            distance = reading.distance,
            "Reading processed"
        );
    }
}

#[cfg(test)]
mod tests {
    use rumqttc::MqttOptions;
    use sqlx::SqlitePool;

    use super::*;

    // AsyncClient does not connect until its event loop is polled, so a
    // handler-level test never touches the network.
    fn make_service(pool: SqlitePool) -> (IngestService, LiveStateCache, ReadingStore) {
        let options = MqttOptions::new("test-client", "localhost", 1883);
        let (client, _eventloop) = AsyncClient::new(options, 10);

        let cache = LiveStateCache::new();
        let store = ReadingStore::new(pool);
        let service = IngestService::new(client, "A9/Test/Sensores", cache.clone(), store.clone());
        (service, cache, store)
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn valid_message_updates_cache_and_store(pool: SqlitePool) {
        let (service, cache, store) = make_service(pool);

        service
            .handle_message("A9/Test/Sensores", br#"{"Humedad": 55.3, "Distancia": 120}"#)
            .await;

        let state = cache.snapshot().await;
        assert_eq!(state.humidity, 55.3);
        assert_eq!(state.distance, 120);
        assert!(state.last_update.is_some());

        let rows = store.recent(1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].humedad, 55.3);
        assert_eq!(rows[0].distancia, "120");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn last_message_wins(pool: SqlitePool) {
        let (service, cache, store) = make_service(pool);

        service
            .handle_message("A9/Test/Sensores", br#"{"Humedad": 40.0, "Distancia": 10}"#)
            .await;
        service
            .handle_message("A9/Test/Sensores", br#"{"Humedad": 70.0, "Distancia": 300}"#)
            .await;

        let state = cache.snapshot().await;
        assert_eq!(state.humidity, 70.0);
        assert_eq!(state.distance, 300);

        let rows = store.recent(10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].distancia, "300");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn malformed_message_leaves_everything_untouched(pool: SqlitePool) {
        let (service, cache, store) = make_service(pool);

        service
            .handle_message("A9/Test/Sensores", br#"{"Humedad": 55.3, "Distancia": 120}"#)
            .await;
        let before = cache.snapshot().await;

        service.handle_message("A9/Test/Sensores", b"definitely not json").await;

        assert_eq!(cache.snapshot().await, before);
        assert_eq!(store.recent(10).await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn append_failure_still_updates_cache(pool: SqlitePool) {
        sqlx::query("DROP TABLE SENSORES").execute(&pool).await.unwrap();
        let (service, cache, _store) = make_service(pool);

        service
            .handle_message("A9/Test/Sensores", br#"{"Humedad": 33.0, "Distancia": 7}"#)
            .await;

        let state = cache.snapshot().await;
        assert_eq!(state.humidity, 33.0);
        assert_eq!(state.distance, 7);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn empty_object_defaults_to_zero_reading(pool: SqlitePool) {
        let (service, cache, store) = make_service(pool);

        service.handle_message("A9/Test/Sensores/sub", b"{}").await;

        let state = cache.snapshot().await;
        assert_eq!(
            (state.humidity, state.distance),
            (0.0, 0),
        );
        assert!(state.last_update.is_some());
        assert_eq!(store.recent(1).await.unwrap()[0].distancia, "0");
    }

    #[tokio::test]
    async fn topic_filter_gets_wildcard_suffix() {
        let options = MqttOptions::new("test-client", "localhost", 1883);
        let (client, _eventloop) = AsyncClient::new(options, 10);
        let cache = LiveStateCache::new();

        // No pool needed just to inspect the filter; build one lazily.
        let pool = SqlitePool::connect_lazy("sqlite::memory:").unwrap();
        let service =
            IngestService::new(client, "A9/Isaac/Sensores/", cache, ReadingStore::new(pool));
        assert_eq!(service.topic_filter, "A9/Isaac/Sensores/#");
    }
}
