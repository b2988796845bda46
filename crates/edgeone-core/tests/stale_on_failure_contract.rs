//! Architectural Contract Test: Stale on Failure
//!
//! Constraints verified:
//! - A failed refresh never clears or partially replaces the published set
//! - Before the first success, readers see an empty set
//! - A successful empty result replaces the set
//!
//! If this test fails, someone has added:
//! - Clearing the store on error
//! - Publishing partial results

mod common;

use std::net::IpAddr;

use common::*;
use edgeone_core::{CancellationToken, EdgeOneIpRange, RefreshEvent, SourceConfig, SourceKind};

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_last_good_set() {
    let privileged = ScriptedSource::always("teo", Vec::new());
    let public = ScriptedSource::new(
        "public",
        vec![
            Step::Ok(vec!["10.0.0.0/8", "192.168.0.0/16"]),
            Step::Fail("connection refused"),
            Step::Fail("connection refused"),
        ],
    );
    let registry = registry_with(&privileged, &public);

    let (range, mut rx) = EdgeOneIpRange::provision(
        SourceConfig::new().with_interval_secs(60),
        &registry,
        CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(next_published(&mut rx).await, (SourceKind::Public, 1));

    let mut failures = 0;
    while failures < 2 {
        if let RefreshEvent::FetchFailed { source, error } = next_event(&mut rx).await {
            assert_eq!(source, SourceKind::Public);
            assert!(error.contains("connection refused"));
            failures += 1;

            assert_eq!(
                rendered(&range.get_ip_ranges()),
                vec!["10.0.0.0/8", "192.168.0.0/16"]
            );
            assert_eq!(range.generation(), 1);
        }
    }

    let ip: IpAddr = "10.1.2.3".parse().unwrap();
    assert!(range.contains(&ip));

    range.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn initial_failure_leaves_store_empty() {
    let privileged = ScriptedSource::always("teo", Vec::new());
    let public = ScriptedSource::failing("public", "dns error");
    let registry = registry_with(&privileged, &public);

    let (range, mut rx) =
        EdgeOneIpRange::provision(SourceConfig::new(), &registry, CancellationToken::new())
            .unwrap();

    loop {
        if let RefreshEvent::FetchFailed { .. } = next_event(&mut rx).await {
            break;
        }
    }

    assert!(range.get_ip_ranges().is_empty());
    assert_eq!(range.generation(), 0);

    range.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn parse_failure_keeps_previous_set() {
    let privileged = ScriptedSource::always("teo", Vec::new());
    let public = ScriptedSource::new(
        "public",
        vec![Step::Ok(vec!["10.0.0.0/8"]), Step::Ok(vec!["10.0.0.0/8", "not-a-cidr"])],
    );
    let registry = registry_with(&privileged, &public);

    let (range, mut rx) = EdgeOneIpRange::provision(
        SourceConfig::new().with_interval_secs(60),
        &registry,
        CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(next_published(&mut rx).await, (SourceKind::Public, 1));

    loop {
        if let RefreshEvent::FetchFailed { error, .. } = next_event(&mut rx).await {
            assert!(error.contains("not-a-cidr"));
            break;
        }
    }

    assert_eq!(rendered(&range.get_ip_ranges()), vec!["10.0.0.0/8"]);

    range.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn empty_success_replaces_set() {
    let privileged = ScriptedSource::always("teo", Vec::new());
    let public = ScriptedSource::new(
        "public",
        vec![Step::Ok(vec!["10.0.0.0/8"]), Step::Ok(Vec::new())],
    );
    let registry = registry_with(&privileged, &public);

    let (range, mut rx) = EdgeOneIpRange::provision(
        SourceConfig::new().with_interval_secs(60),
        &registry,
        CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(next_published(&mut rx).await, (SourceKind::Public, 1));
    assert_eq!(range.get_ip_ranges().len(), 1);

    assert_eq!(next_published(&mut rx).await, (SourceKind::Public, 2));
    assert!(range.get_ip_ranges().is_empty());

    range.shutdown().await.unwrap();
}
