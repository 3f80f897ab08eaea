//! Line ingestion: parse, filter, count, bucket and publish.

use tokio::sync::mpsc;

use pv_protocol::TraceEvent;
use pv_trace_tools::parse_line;

use crate::state::AppState;

/// Run one raw line through the pipeline.
///
/// Returns the event if it was parsed and admitted. Unparseable lines and
/// filtered events return `None` and leave no trace in the state.
///
/// The core lock is held until the event is published, so a concurrent
/// filter update never acknowledges before an event it would reject.
pub async fn ingest_line(state: &AppState, line: &str) -> Option<TraceEvent> {
    let event = parse_line(line)?;

    let mut core = state.core.lock().await;
    if !core.filters.admits(&event) {
        tracing::trace!(
            operation = %event.operation,
            category = %event.category,
            "event filtered"
        );
        return None;
    }

    core.stats.record(&event);
    core.buckets.append(event.clone());
    state.hub.publish(&event).await;
    drop(core);

    Some(event)
}

/// Consume lines in arrival order until the source closes.
pub async fn run(state: AppState, mut lines: mpsc::Receiver<String>) {
    let mut admitted: u64 = 0;
    while let Some(line) = lines.recv().await {
        if let Some(event) = ingest_line(&state, &line).await {
            admitted += 1;
            tracing::debug!(
                process = %event.process_name,
                operation = %event.operation,
                severity = %event.severity,
                "event admitted"
            );
        }
    }
    tracing::info!(admitted, "line source closed, ingestion stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::handle_message;
    use pv_protocol::{FilterUpdate, ServerMessage};

    const WRITE: &str = r"21:06:14.1822 System (4.6048) FileIO/Write 'C:\WINDOWS\system32\Logfiles\WMI\RtBackup\EtwRTwtrace-rt.etl' offset: 72, size: 65392 -> SUCCESS";
    const REG: &str = r"21:06:14.2000 svchost.exe (880.12) Registry/QueryValue 'HKLM\SYSTEM\Select' -> SUCCESS";

    #[tokio::test]
    async fn admitted_event_is_counted_bucketed_and_published() {
        let state = AppState::default();
        let mut sub = state.hub.register().await;

        let event = ingest_line(&state, WRITE).await.unwrap();
        assert_eq!(event.process_name, "System");

        assert_eq!(state.core.lock().await.stats.total_events(), 1);
        assert_eq!(state.core.lock().await.buckets.pending(), 1);

        let text = sub.rx.recv().await.unwrap();
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["processName"], "System");
        assert_eq!(json["severity"], "low");
        assert_eq!(json["details"], "offset: 72, size: 65392");
    }

    #[tokio::test]
    async fn garbage_line_leaves_no_trace() {
        let state = AppState::default();
        let mut sub = state.hub.register().await;

        assert!(ingest_line(&state, "Session started at 21:06").await.is_none());
        assert_eq!(state.core.lock().await.stats.total_events(), 0);
        assert!(sub.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn filtered_event_is_dropped_everywhere() {
        let state = AppState::default();
        state.core.lock().await.filters.apply(FilterUpdate {
            categories: Some(vec!["Registry".into()]),
            ..Default::default()
        });
        let mut sub = state.hub.register().await;

        assert!(ingest_line(&state, WRITE).await.is_none());
        assert!(ingest_line(&state, REG).await.is_some());

        let snapshot = state.core.lock().await.stats.snapshot();
        assert_eq!(snapshot.total_events, 1);
        assert!(!snapshot.per_category.contains_key("FileIO"));
        assert_eq!(state.core.lock().await.buckets.pending(), 1);

        let text = sub.rx.recv().await.unwrap();
        assert!(text.as_str().contains("svchost.exe"));
        assert!(sub.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn run_processes_in_order_until_closed() {
        let state = AppState::default();
        let mut sub = state.hub.register().await;
        let (tx, rx) = mpsc::channel(8);

        tx.send(REG.to_string()).await.unwrap();
        tx.send("noise".to_string()).await.unwrap();
        tx.send(WRITE.to_string()).await.unwrap();
        drop(tx);

        run(state.clone(), rx).await;

        let first = sub.rx.recv().await.unwrap();
        let second = sub.rx.recv().await.unwrap();
        assert!(first.as_str().contains("svchost.exe"));
        assert!(second.as_str().contains(r#""processName":"System""#));
        assert_eq!(state.core.lock().await.stats.total_events(), 2);
    }

    /// Let spawned tasks run until they park on the core lock.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn spawn_filter_update(state: &AppState) -> tokio::task::JoinHandle<Option<ServerMessage>> {
        let state = state.clone();
        tokio::spawn(async move {
            handle_message(&state, r#"{"type":"filters","categories":["Registry"]}"#).await
        })
    }

    fn spawn_ingest(state: &AppState) -> tokio::task::JoinHandle<Option<TraceEvent>> {
        let state = state.clone();
        tokio::spawn(async move { ingest_line(&state, WRITE).await })
    }

    #[tokio::test]
    async fn filter_update_ahead_of_ingestion_rejects_event() {
        let state = AppState::default();
        let mut sub = state.hub.register().await;

        let guard = state.core.lock().await;
        let update = spawn_filter_update(&state);
        settle().await;
        let ingest = spawn_ingest(&state);
        settle().await;
        drop(guard);

        assert!(matches!(
            update.await.unwrap(),
            Some(ServerMessage::FiltersAck(_))
        ));
        assert!(ingest.await.unwrap().is_none());
        assert!(sub.rx.try_recv().is_err());
        assert_eq!(state.core.lock().await.stats.total_events(), 0);
    }

    #[tokio::test]
    async fn ingestion_ahead_of_filter_update_publishes_before_ack() {
        let state = AppState::default();
        let mut sub = state.hub.register().await;

        let guard = state.core.lock().await;
        let ingest = spawn_ingest(&state);
        settle().await;
        let update = spawn_filter_update(&state);
        settle().await;
        drop(guard);

        assert!(ingest.await.unwrap().is_some());
        assert!(update.await.unwrap().is_some());
        let text = sub.rx.try_recv().unwrap();
        assert!(text.as_str().contains(r#""category":"FileIO""#));
        assert_eq!(state.core.lock().await.stats.total_events(), 1);

        assert!(ingest_line(&state, WRITE).await.is_none());
        assert_eq!(state.core.lock().await.stats.total_events(), 1);
    }
}
