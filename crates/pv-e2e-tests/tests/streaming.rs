//! E2E tests for event fan-out, process batches and stats broadcasts.

mod helpers;

use helpers::{READ_LINE, REG_LINE, TestServer, WRITE_LINE, expect_silence, next_json};
use pv_server::{flush, pipeline};

/// Every connected subscriber gets each admitted event as a flat object.
#[tokio::test]
async fn e2e_event_reaches_all_subscribers() {
    let srv = TestServer::start().await;
    let mut a = srv.connect().await;
    let mut b = srv.connect_path("/ws").await;

    pipeline::ingest_line(&srv.state, WRITE_LINE).await.unwrap();

    for client in [&mut a, &mut b] {
        let event = next_json(client).await;
        assert!(event.get("type").is_none());
        assert_eq!(event["timestamp"], "21:06:14.1822");
        assert_eq!(event["processName"], "System");
        assert_eq!(event["processId"], "4");
        assert_eq!(event["threadId"], "6048");
        assert_eq!(event["category"], "FileIO");
        assert_eq!(event["operation"], "Write");
        assert_eq!(
            event["target"],
            r"C:\WINDOWS\system32\Logfiles\WMI\RtBackup\EtwRTwtrace-rt.etl"
        );
        assert_eq!(event["targetShort"].as_str().unwrap().chars().count(), 40);
        assert_eq!(event["details"], "offset: 72, size: 65392");
        assert_eq!(event["result"], "SUCCESS");
        assert_eq!(event["severity"], "low");
    }
}

/// Unparseable lines never reach subscribers.
#[tokio::test]
async fn e2e_garbage_is_not_streamed() {
    let srv = TestServer::start().await;
    let mut client = srv.connect().await;

    assert!(
        pipeline::ingest_line(&srv.state, "wtrace: session started")
            .await
            .is_none()
    );
    expect_silence(&mut client, 200).await;
}

/// A flush groups buffered events per process, in first-seen order.
#[tokio::test]
async fn e2e_process_batches_after_flush() {
    let srv = TestServer::start().await;
    let mut client = srv.connect().await;

    for line in [READ_LINE, REG_LINE, READ_LINE] {
        pipeline::ingest_line(&srv.state, line).await.unwrap();
    }
    for _ in 0..3 {
        next_json(&mut client).await;
    }

    assert_eq!(flush::flush_batches(&srv.state).await, 2);

    let first = next_json(&mut client).await;
    assert_eq!(first["type"], "ProcessBatch");
    assert_eq!(first["processName"], "explorer.exe");
    assert_eq!(first["count"], 2);
    assert_eq!(first["events"].as_array().unwrap().len(), 2);

    let second = next_json(&mut client).await;
    assert_eq!(second["processName"], "svchost.exe");
    assert_eq!(second["count"], 1);

    assert_eq!(flush::flush_batches(&srv.state).await, 0);
    expect_silence(&mut client, 200).await;
}

/// Stats broadcast counts every admitted event by category.
#[tokio::test]
async fn e2e_stats_broadcast() {
    let srv = TestServer::start().await;
    let mut client = srv.connect().await;

    for line in [WRITE_LINE, READ_LINE, REG_LINE] {
        pipeline::ingest_line(&srv.state, line).await.unwrap();
        next_json(&mut client).await;
    }

    assert!(flush::broadcast_stats(&srv.state).await);
    let stats = next_json(&mut client).await;
    assert_eq!(
        stats,
        serde_json::json!({
            "type": "stats",
            "events": 3,
            "perCategory": {"FileIO": 2, "Registry": 1},
        })
    );
}
