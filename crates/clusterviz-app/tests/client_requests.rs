mod common;

use std::num::NonZeroU32;

use anyhow::Result;
use clusterviz_app::{ClientError, SimulationClient};
use clusterviz_core::{AlgorithmId, AlgorithmParams, DebugState, ResetParams, SnapshotError};
use common::{KMEANS_SNAPSHOT, MockServer, ok};

fn steps(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).expect("non-zero step count")
}

#[tokio::test]
async fn fetch_snapshot_decodes_kmeans_payload() -> Result<()> {
    let server = MockServer::start(vec![ok(KMEANS_SNAPSHOT)]).await;
    let snapshot = server.client().fetch_snapshot().await?;

    assert_eq!(server.requests(), ["GET /data"]);
    assert_eq!(snapshot.point_count(), 3);
    assert_eq!(snapshot.cluster_count(), 2);
    assert!(matches!(snapshot.debug, DebugState::KMeans { ref means } if means.len() == 2));
    Ok(())
}

#[tokio::test]
async fn advance_sends_one_request_per_step() -> Result<()> {
    let server = MockServer::start(vec![ok(""), ok(""), ok("")]).await;
    server.client().advance(steps(3)).await?;
    assert_eq!(server.requests(), vec!["GET /next"; 3]);
    Ok(())
}

#[tokio::test]
async fn advance_stops_at_first_failure() {
    let server = MockServer::start(vec![
        ok(""),
        (500, "boom".to_string()),
        ok(""),
    ])
    .await;
    let err = server
        .client()
        .advance(steps(3))
        .await
        .expect_err("second step fails");

    match err {
        ClientError::Status {
            endpoint,
            status,
            body,
        } => {
            assert_eq!(endpoint, SimulationClient::NEXT);
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(server.requests().len(), 2, "third step must not be sent");
}

#[tokio::test]
async fn reset_passes_parameters_as_query() -> Result<()> {
    let server = MockServer::start(vec![ok("")]).await;
    let params = ResetParams::new(150, 4, 2.5)?;
    server.client().reset(&params).await?;
    assert_eq!(
        server.requests(),
        ["GET /reset?num_elems=150&num_clusters=4&cluster_radius=2.5"]
    );
    Ok(())
}

#[tokio::test]
async fn select_algorithm_sends_id_then_params() -> Result<()> {
    let server = MockServer::start(vec![ok("")]).await;
    let params = AlgorithmParams::new().eps(0.3).min_pts(4);
    server
        .client()
        .select_algorithm(&AlgorithmId::new("1"), &params)
        .await?;
    assert_eq!(
        server.requests(),
        ["GET /set_clusterer?id=1&eps=0.3&min_pts=4"]
    );
    Ok(())
}

#[tokio::test]
async fn list_algorithms_accepts_numeric_ids() -> Result<()> {
    let server = MockServer::start(vec![ok(
        r#"[{"id":0,"name":"K-Means"},{"id":"ap","name":"Affinity Propagation"}]"#,
    )])
    .await;
    let algorithms = server.client().list_algorithms().await?;

    assert_eq!(server.requests(), ["GET /clusterers"]);
    assert_eq!(algorithms.len(), 2);
    assert_eq!(algorithms[0].id.as_str(), "0");
    assert_eq!(algorithms[1].id.as_str(), "ap");
    assert_eq!(algorithms[1].name, "Affinity Propagation");
    Ok(())
}

#[tokio::test]
async fn malformed_snapshot_is_rejected_before_rendering() {
    let server = MockServer::start(vec![ok(
        r#"{"points":[{"x":0,"y":0}],"clusters":[[0,5]]}"#,
    )])
    .await;
    let err = server
        .client()
        .fetch_snapshot()
        .await
        .expect_err("dangling member id");
    assert!(matches!(
        err,
        ClientError::MalformedSnapshot(SnapshotError::MemberOutOfRange { .. })
    ));
}

#[tokio::test]
async fn invalid_json_is_reported_as_malformed() {
    let server = MockServer::start(vec![ok("{\"points\": [")]).await;
    let err = server
        .client()
        .fetch_snapshot()
        .await
        .expect_err("truncated JSON");
    assert!(matches!(
        err,
        ClientError::MalformedSnapshot(SnapshotError::Decode(_))
    ));
}

#[tokio::test]
async fn unreachable_server_is_a_request_error() -> Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let http = reqwest::Client::builder().no_proxy().build()?;
    let client = SimulationClient::with_http(http, &format!("http://{addr}"))?;
    let err = client.fetch_snapshot().await.expect_err("connection refused");
    assert!(matches!(
        err,
        ClientError::Request {
            endpoint: SimulationClient::DATA,
            ..
        }
    ));
    Ok(())
}
