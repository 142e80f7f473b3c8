use std::io::{Read, Write};
use std::net::TcpListener;

use user_insights::models::{ChartOutput, ChartRequest, DomainSort};
use user_insights::{AnalyticsCore, ApiClient, AppError, FetchError};

fn serve_once(status_line: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    std::thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}

/// Ten users, six on a.com and four on b.com, names of increasing length.
fn user_fixture_json() -> String {
    let users: Vec<serde_json::Value> = (0..10)
        .map(|index| {
            serde_json::json!({
                "id": index + 1,
                "name": "n".repeat(10 + index),
                "username": format!("user{index}"),
                "email": if index < 6 {
                    format!("User{index}@A.com")
                } else {
                    format!("User{index}@B.com")
                },
                "phone": "555-0100",
                "website": "example.org",
            })
        })
        .collect();
    serde_json::to_string(&users).expect("fixture json")
}

#[tokio::test]
async fn full_action_sequence_from_refresh_to_export() {
    let dir = tempfile::tempdir().expect("tempdir");
    let endpoint = serve_once("200 OK", user_fixture_json());
    let core = AnalyticsCore::with_client(dir.path(), ApiClient::with_endpoint(&endpoint))
        .expect("core");

    let refresh = core.refresh_from_source().await.expect("refresh");
    assert_eq!(refresh.fetched, 10);
    assert_eq!(refresh.stored, 10);

    // the refresh alone does not populate the session
    assert!(matches!(core.overview(), Err(AppError::NoDataLoaded)));

    let load = core.load_from_store().expect("load");
    assert_eq!(load.loaded, 10);

    let overview = core.overview().expect("overview");
    assert_eq!(overview.record_count, 10);
    assert_eq!(overview.column_count, 6);
    assert_eq!(overview.unique_domains, 2);

    let output = core
        .render_chart(&ChartRequest::HorizontalBars {
            sort: DomainSort::Alphabetical,
            color: "#636efa".to_string(),
        })
        .expect("render");
    let ChartOutput::HorizontalBars { bars, .. } = output else {
        panic!("expected horizontal bars");
    };
    assert_eq!(bars.len(), 2);
    assert_eq!((bars[0].domain.as_str(), bars[0].count), ("a.com", 6));
    assert_eq!((bars[1].domain.as_str(), bars[1].count), ("b.com", 4));

    let export = core.export_records().expect("export");
    assert_eq!(export.file_name, "usuarios.csv");

    let mut reader = csv::Reader::from_reader(export.content.as_slice());
    let exported_ids: Vec<String> = reader
        .records()
        .map(|row| row.expect("row").get(0).expect("id column").to_string())
        .collect();
    let mut sorted_ids: Vec<i64> = exported_ids
        .iter()
        .map(|id| id.parse().expect("numeric id"))
        .collect();
    sorted_ids.sort_unstable();
    assert_eq!(sorted_ids, (1..=10).collect::<Vec<i64>>());

    let stats = core.export_stats().expect("stats export");
    assert_eq!(stats.file_name, "estadisticas_usuarios.csv");
    let stats_text = String::from_utf8(stats.content).expect("utf8");
    assert!(stats_text.lines().any(|line| line == "count,10"));

    assert!(core.clear_loaded().expect("clear"));
    assert!(matches!(core.export_records(), Err(AppError::NoDataLoaded)));
}

#[tokio::test]
async fn failed_refresh_leaves_the_store_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");

    // first session seeds the store
    {
        let endpoint = serve_once("200 OK", user_fixture_json());
        let core = AnalyticsCore::with_client(dir.path(), ApiClient::with_endpoint(&endpoint))
            .expect("core");
        core.refresh_from_source().await.expect("seed refresh");
    }

    // second session hits a failing endpoint
    let endpoint = serve_once("404 Not Found", r#"{"error":"gone"}"#.to_string());
    let core = AnalyticsCore::with_client(dir.path(), ApiClient::with_endpoint(&endpoint))
        .expect("core");

    match core.refresh_from_source().await {
        Err(AppError::Fetch(FetchError::BadStatus(code))) => assert_eq!(code, 404),
        other => panic!("expected BadStatus, got {other:?}"),
    }

    // prior contents still load
    let load = core.load_from_store().expect("load");
    assert_eq!(load.loaded, 10);
}

#[tokio::test]
async fn duplicate_ids_from_the_source_resolve_to_last_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let body = serde_json::to_string(&serde_json::json!([
        {"id": 1, "name": "First Version", "email": "first@a.com"},
        {"id": 1, "name": "Second Version", "email": "second@b.com"},
        {"id": 2, "name": "Other", "email": "other@a.com"}
    ]))
    .expect("json");
    let endpoint = serve_once("200 OK", body);
    let core = AnalyticsCore::with_client(dir.path(), ApiClient::with_endpoint(&endpoint))
        .expect("core");

    let refresh = core.refresh_from_source().await.expect("refresh");
    assert_eq!(refresh.fetched, 3);
    assert_eq!(refresh.stored, 2);

    core.load_from_store().expect("load");
    let records = core.loaded_records().expect("records");
    let first = records
        .iter()
        .find(|record| record.base.id == 1)
        .expect("id 1 present");
    assert_eq!(first.base.name, "Second Version");
}
