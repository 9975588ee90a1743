//! HTTP ingestion sink against a mock endpoint.

use mapscout_core::{EnrichedEstablishment, SearchResultSet, SearchTerm, Timestamp, UserId};
use mapscout_scanner::{forward_all, IngestionSink, ResultPayload, ResultSink, SinkError, SnapshotSink};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn payload() -> ResultPayload {
    let establishments = vec![
        EnrichedEstablishment {
            name: "Casa Zero".to_string(),
            phone: "71988887777".to_string(),
            ..EnrichedEstablishment::default()
        },
        EnrichedEstablishment {
            name: "Sem Telefone".to_string(),
            ..EnrichedEstablishment::default()
        },
    ];
    ResultPayload {
        result_set: SearchResultSet::new(
            SearchTerm::new("acarajé").expect("term"),
            Timestamp::now(),
            establishments,
        ),
        user_id: UserId::generate(),
    }
}

fn ingestion(server: &MockServer) -> IngestionSink {
    IngestionSink::new(format!("{}/ingest", server.uri()), Duration::from_secs(5))
        .expect("client builds")
}

#[tokio::test]
async fn test_ingestion_posts_json() {
    let server = MockServer::start().await;
    let p = payload();

    Mock::given(method("POST"))
        .and(path("/ingest"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "search_term": "acarajé",
            "phone_numbers": ["71988887777"],
            "user_id": p.user_id.as_str(),
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    ingestion(&server).forward(&p).await.expect("accepted");
}

#[tokio::test]
async fn test_ingestion_rejects_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = ingestion(&server).forward(&payload()).await.unwrap_err();
    assert!(matches!(err, SinkError::Status(503)));
}

#[tokio::test]
async fn test_forward_all_counts_deliveries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let sinks: Vec<Box<dyn ResultSink>> = vec![
        Box::new(ingestion(&server)),
        Box::new(SnapshotSink::new(dir.path().join("out.json"))),
    ];

    assert_eq!(forward_all(&sinks, &payload()).await, 1);
    assert!(dir.path().join("out.json").exists());
}
