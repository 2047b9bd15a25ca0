// src/realtime.rs
//
// Fan-out en proceso de eventos hacia los clientes SSE conectados. Entrega
// a lo más una vez: un suscriptor que se atrasa más allá de la capacidad del
// canal pierde los eventos intermedios.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeEvent {
    // Destinatario; los eventos se filtran por usuario en el stream
    pub user_id: Uuid,
    // Tópico para el filtro opcional del query string (?topics=...)
    pub topic: String,
    pub kind: String,
    pub payload: Value,
}

#[derive(Clone)]
pub struct RealtimeHub {
    tx: broadcast::Sender<RealtimeEvent>,
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    // Sin suscriptores el send falla; eso es normal y se ignora
    pub fn publish(&self, event: RealtimeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event_for(user_id: Uuid) -> RealtimeEvent {
        RealtimeEvent {
            user_id,
            topic: "notifications".into(),
            kind: "SYSTEM_ALERT".into(),
            payload: json!({"title": "hola"}),
        }
    }

    #[tokio::test]
    async fn publicar_llega_a_los_suscriptores() {
        let hub = RealtimeHub::new();
        let mut rx = hub.subscribe();

        let user_id = Uuid::new_v4();
        hub.publish(event_for(user_id));

        let received = rx.recv().await.expect("evento publicado");
        assert_eq!(received.user_id, user_id);
        assert_eq!(received.topic, "notifications");
    }

    #[test]
    fn publicar_sin_suscriptores_no_falla() {
        let hub = RealtimeHub::new();
        hub.publish(event_for(Uuid::new_v4()));
        assert_eq!(hub.subscriber_count(), 0);
    }
}
