//! Reporter worker tests

use std::collections::HashSet;

use deploy_reporter::settings::ReporterSettings;
use deploy_reporter::upstream::ChannelUpstream;
use deploy_reporter::workers::reporter::{spawn, Options};
use deploy_reporter::{NodeUid, ProxyReporter, ReporterError};
use serde_json::json;

use crate::common::msg;

#[tokio::test]
async fn test_concurrent_producers_forward_each_change_once() {
    let (upstream, mut deltas) = ChannelUpstream::channel();
    let settings = ReporterSettings::default();
    let (handle, join) = spawn(
        ProxyReporter::with_settings(upstream, &settings),
        &Options::from(&settings.worker),
        Box::pin(std::future::pending::<()>()),
    );

    let mut producers = Vec::new();
    for uid in 0..8 {
        let handle = handle.clone();
        producers.push(tokio::spawn(async move {
            for _ in 0..3 {
                handle
                    .report(msg(json!({"nodes": [{"uid": uid, "status": "deploying", "progress": 50}]})))
                    .await?;
            }
            Ok::<(), ReporterError>(())
        }));
    }
    for producer in producers {
        producer.await.unwrap().unwrap();
    }

    drop(handle);
    let reporter = join.await.unwrap();
    assert_eq!(reporter.nodes().len(), 8);

    let mut seen = HashSet::new();
    while let Ok(delta) = deltas.try_recv() {
        assert_eq!(delta.nodes().len(), 1);
        assert!(seen.insert(delta.nodes()[0].uid.clone()));
    }
    assert_eq!(seen.len(), 8);
    assert!(seen.contains(&Some(NodeUid::Int(7))));
}

#[tokio::test]
async fn test_validation_errors_reach_the_producer() {
    let (upstream, mut deltas) = ChannelUpstream::channel();
    let (handle, _join) = spawn(
        ProxyReporter::new(upstream),
        &Options::default(),
        Box::pin(std::future::pending::<()>()),
    );

    let err = handle
        .report(msg(json!({"nodes": [{"uid": 1, "progress": 10}]})))
        .await
        .unwrap_err();
    assert!(err.as_validation().is_some());

    handle
        .report(msg(json!({"nodes": [{"uid": 1, "status": "deploying", "progress": 10}]})))
        .await
        .unwrap();
    assert_eq!(
        deltas.recv().await,
        Some(msg(json!({"nodes": [{"uid": 1, "status": "deploying", "progress": 10}]})))
    );
}

#[tokio::test]
async fn test_upstream_errors_reach_the_producer() {
    let (upstream, deltas) = ChannelUpstream::channel();
    drop(deltas);
    let (handle, _join) = spawn(
        ProxyReporter::new(upstream),
        &Options::default(),
        Box::pin(std::future::pending::<()>()),
    );

    let err = handle
        .report(msg(json!({"status": "error", "error_type": "deploy"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ReporterError::Upstream(_)));
    assert!(!handle.is_closed());
}
