use httpmock::prelude::*;
use legislator_finance::adapters::{export, render};
use legislator_finance::core::session::{Completion, ViewStatus};
use legislator_finance::domain::model::DisplayAmount;
use legislator_finance::{AppError, CandidateView, OpenSecretsClient};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

const CID: &str = "N00007360";

fn client_for(server: &MockServer) -> OpenSecretsClient {
    OpenSecretsClient::new(server.url("/api/"), "test-key", Duration::from_secs(5))
}

fn mock_method<'a>(server: &'a MockServer, method: &str, body: serde_json::Value) -> httpmock::Mock<'a> {
    let method = method.to_string();
    server.mock(move |when, then| {
        when.method(GET)
            .path("/api/")
            .query_param("method", method.as_str())
            .query_param("cid", CID)
            .query_param("cycle", "2024")
            .query_param("output", "json");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

fn summary_body() -> serde_json::Value {
    json!({
        "response": {
            "summary": {
                "@attributes": {
                    "cand_name": "Pelosi, Nancy",
                    "cid": CID,
                    "cycle": "2024",
                    "state": "CA",
                    "party": "D",
                    "chamber": "H",
                    "first_elected": "1987",
                    "next_election": "2024",
                    "total": "16456478.66",
                    "spent": "14290120.3",
                    "cash_on_hand": "1234567",
                    "debt": "0",
                    "source": "https://www.opensecrets.org",
                    "last_updated": "06/30/2024"
                }
            }
        }
    })
}

#[tokio::test]
async fn test_profile_combines_summary_sectors_and_contributors() {
    let server = MockServer::start();
    let summary = mock_method(&server, "candSummary", summary_body());
    let sectors = mock_method(
        &server,
        "candSector",
        json!({
            "response": {"sectors": {
                "@attributes": {"cand_name": "Pelosi, Nancy"},
                "sector": [
                    {"@attributes": {"sector_name": "Finance/Insur/RealEst", "sectorid": "F", "total": "1200000"}},
                    {"@attributes": {"sector_name": "Lawyers & Lobbyists", "sectorid": "K", "total": "abc"}}
                ]
            }}
        }),
    );
    // a single contributor arrives as a bare object
    let contributors = mock_method(
        &server,
        "candContrib",
        json!({
            "response": {"contributors": {
                "@attributes": {"cand_name": "Pelosi, Nancy"},
                "contributor": {"@attributes": {"org_name": "Acme Corp", "total": "52,500"}}
            }}
        }),
    );

    let mut view = CandidateView::new(client_for(&server), 2024);
    view.open(CID).await.unwrap();

    summary.assert_hits(1);
    sectors.assert_hits(1);
    contributors.assert_hits(1);

    let profile = view.current().unwrap();
    assert_eq!(profile.summary.name, "Pelosi, Nancy");
    assert_eq!(profile.summary.total.currency(), "$16,456,478.66");
    assert_eq!(profile.summary.cash_on_hand.currency(), "$1,234,567");
    assert_eq!(profile.summary.debt.currency(), "$0");

    assert_eq!(profile.sectors.len(), 2);
    assert_eq!(profile.sectors[1].amount, DisplayAmount::Unavailable);
    assert_eq!(profile.sector_chart[0].value, 1_200_000);
    assert_eq!(profile.sector_chart[1].value, 0);

    assert_eq!(profile.contributors.len(), 1);
    assert_eq!(profile.contributors[0].amount.currency(), "$52,500");
    assert_eq!(profile.contributor_chart[0].value, 52_500);

    let card = render::render_candidate(profile, 20);
    assert!(card.contains("Total Raised: $16,456,478.66"));
    assert!(card.contains("Acme Corp: $52,500"));
    assert!(card.contains("Go back: /"));
}

#[tokio::test]
async fn test_missing_contributor_collection_is_empty_not_error() {
    let server = MockServer::start();
    mock_method(&server, "candSummary", summary_body());
    mock_method(
        &server,
        "candSector",
        json!({"response": {"sectors": {"@attributes": {"cand_name": "Pelosi, Nancy"}}}}),
    );
    mock_method(
        &server,
        "candContrib",
        json!({"response": {"contributors": {"@attributes": {"cand_name": "Pelosi, Nancy"}}}}),
    );

    let mut view = CandidateView::new(client_for(&server), 2024);
    view.open(CID).await.unwrap();

    let profile = view.current().unwrap();
    assert!(profile.sectors.is_empty());
    assert!(profile.contributor_chart.is_empty());
}

#[tokio::test]
async fn test_any_failed_request_publishes_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/").query_param("method", "candSummary");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(json!({"response": {}}));
    });
    mock_method(&server, "candSector", json!({"response": {"sectors": {}}}));
    mock_method(&server, "candContrib", json!({"response": {"contributors": {}}}));

    let mut view = CandidateView::new(client_for(&server), 2024);
    let err = view.open(CID).await.unwrap_err();

    assert!(matches!(err, AppError::Parse(_)));
    assert!(view.current().is_none());
}

#[tokio::test]
async fn test_export_and_json_are_reproducible() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    mock_method(&server, "candSummary", summary_body());
    mock_method(
        &server,
        "candSector",
        json!({"response": {"sectors": {"sector": [
            {"@attributes": {"sector_name": "Health", "total": "200000"}}
        ]}}}),
    );
    mock_method(
        &server,
        "candContrib",
        json!({"response": {"contributors": {"contributor": []}}}),
    );

    let mut view = CandidateView::new(client_for(&server), 2024);
    view.open(CID).await.unwrap();
    let first = serde_json::to_string(view.current().unwrap()).unwrap();
    view.open(CID).await.unwrap();
    let second = serde_json::to_string(view.current().unwrap()).unwrap();
    assert_eq!(first, second);

    let path = temp_dir.path().join("out/charts.csv");
    export::export_profile_csv(view.current().unwrap(), &path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    assert_eq!(csv, "series,name,value\nsectors,Health,200000\n");
}

#[tokio::test]
async fn test_failure_for_superseded_candidate_is_dropped() {
    let server = MockServer::start();
    mock_method(&server, "candSummary", summary_body());
    mock_method(&server, "candSector", json!({"response": {"sectors": {}}}));
    mock_method(&server, "candContrib", json!({"response": {"contributors": {}}}));
    // nothing is mocked for the older candidate, so its requests fail

    let mut view = CandidateView::new(client_for(&server), 2024);
    let older = view.begin("N00000001");
    let newer = view.begin(CID);
    let (older_profile, newer_profile) = tokio::join!(view.load(&older), view.load(&newer));
    assert!(older_profile.is_err());

    assert_eq!(view.apply(newer, newer_profile).unwrap(), Completion::Applied);
    assert_eq!(view.apply(older, older_profile).unwrap(), Completion::Stale);
    assert_eq!(view.current().unwrap().summary.cid, CID);
    assert_eq!(view.status(), &ViewStatus::Ready { key: CID.into() });
}
