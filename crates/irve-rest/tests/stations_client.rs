//! Integration tests for `StationsClient` using wiremock HTTP mocks.

use irve_core::Station;
use irve_rest::{StationsClient, UploadError};
use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

fn test_client(base_url: &str) -> StationsClient {
    StationsClient::new(base_url, "service-key", 5, "irve-sync-test/0.1")
        .expect("client construction should not fail")
}

fn station(id: &str) -> Station {
    Station {
        id: id.to_owned(),
        name: format!("Station {id}"),
        address: String::new(),
        city: "Nantes".to_owned(),
        region: "44000".to_owned(),
        latitude: 47.2184,
        longitude: -1.5536,
        power_kw: 22.0,
        connector_types: Some(vec!["Type 2".to_owned()]),
        available: true,
        price_per_hour: None,
        operator: "Inconnu".to_owned(),
        access_type: "public".to_owned(),
        description: String::new(),
    }
}

/// Matches upsert bodies that contain a station with the given id.
struct ContainsId(&'static str);

impl Match for ContainsId {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<Vec<Value>>(&request.body)
            .map(|rows| rows.iter().any(|r| r["id"] == self.0))
            .unwrap_or(false)
    }
}

fn body_ids(request: &Request) -> Vec<String> {
    serde_json::from_slice::<Vec<Value>>(&request.body)
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn upsert_sends_auth_and_merge_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/stations_irve"))
        .and(header("apikey", "service-key"))
        .and(header("authorization", "Bearer service-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .upsert_stations(&[station("A"), station("B")])
        .await
        .expect("upsert should succeed");

    let requests = server.received_requests().await.unwrap();
    let prefer = requests[0]
        .headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(prefer, "resolution=merge-duplicates,return=minimal");

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["id"], "A");
    assert_eq!(body[0]["region"], "44000");
    assert!(body[0]["price_per_hour"].is_null());
}

#[tokio::test]
async fn ok_and_no_content_are_accepted() {
    for status in [200, 204] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        assert!(
            client.upsert_stations(&[station("A")]).await.is_ok(),
            "status {status} should be accepted"
        );
    }
}

#[tokio::test]
async fn other_statuses_carry_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"code":"22P02","message":"bad"}"#),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.upsert_stations(&[station("A")]).await.unwrap_err();
    match err {
        UploadError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("22P02"));
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn accepted_2xx_is_narrow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(matches!(
        client.upsert_stations(&[station("A")]).await,
        Err(UploadError::UnexpectedStatus { status: 202, .. })
    ));
}

#[tokio::test]
async fn isolation_drops_only_the_rejected_station() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(ContainsId("C"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let batch = [station("A"), station("B"), station("C"), station("D")];
    let report = client.upsert_with_isolation(&batch).await;

    assert_eq!(report.uploaded, 3);
    assert_eq!(report.requests, 5);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].item.id, "C");

    let sent: Vec<Vec<String>> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(body_ids)
        .collect();
    assert_eq!(
        sent,
        vec![
            vec!["A", "B", "C", "D"],
            vec!["A", "B"],
            vec!["C", "D"],
            vec!["C"],
            vec!["D"],
        ]
    );
}

#[tokio::test]
async fn isolation_treats_transport_failure_as_rejection() {
    let client = test_client("http://127.0.0.1:1");
    let batch = [station("A"), station("B")];
    let report = client.upsert_with_isolation(&batch).await;
    assert_eq!(report.uploaded, 0);
    assert_eq!(report.requests, 3);
    assert!(report
        .rejected
        .iter()
        .all(|r| matches!(r.error, UploadError::Http(_))));
}
