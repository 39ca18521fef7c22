//! CKAN client against a local stub of the action API.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use geoboundaries::catalog::ckan::{merge_existing, Package};
use geoboundaries::catalog::payload::CatalogResource;
use geoboundaries::catalog::{CatalogDataset, CatalogPublisher, CkanClient};
use geoboundaries::config::Configuration;
use geoboundaries::data::builder::{generate_dataset, BuildContext};
use geoboundaries::data::dataset::{BuildOutcome, PublishedDataset};
use geoboundaries::data::grouping::get_data;
use geoboundaries::error::CatalogError;
use geoboundaries::fetch::LocalFile;
use geoboundaries::location::{CountryTable, Locations};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/apiinput.json");

#[derive(Debug, Clone)]
struct Recorded {
    path: String,
    authorization: Option<String>,
    body: serde_json::Value,
}

type Responder = dyn Fn(&str, &serde_json::Value) -> (u16, serde_json::Value) + Send + Sync;

/// Serves `expected` requests, one connection each, then stops.
fn spawn_stub(expected: usize, respond: Box<Responder>) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&recorded);
    thread::spawn(move || {
        for stream in listener.incoming().take(expected) {
            let Ok(mut stream) = stream else { continue };
            if let Some(request) = read_request(&mut stream) {
                let (status, body) = respond(&request.path, &request.body);
                log.lock().unwrap().push(request);
                write_response(&mut stream, status, &body);
            }
        }
    });
    (format!("http://{addr}"), recorded)
}

fn read_request(stream: &mut TcpStream) -> Option<Recorded> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).ok()?;
    let path = request_line.split_whitespace().nth(1)?.to_string();

    let mut content_length = 0usize;
    let mut authorization = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    let body = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    Some(Recorded {
        path,
        authorization,
        body,
    })
}

fn write_response(stream: &mut TcpStream, status: u16, body: &serde_json::Value) {
    let payload = body.to_string();
    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len()
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn afghanistan() -> (PublishedDataset, CatalogDataset) {
    let config = Configuration::default();
    let boundaries = get_data(&LocalFile::new(FIXTURE), &config.url, &config.excluded_income_groups)
        .expect("fixture should load");
    let locations = Locations::default();
    let ctx = BuildContext::from_config(&config, &CountryTable, &locations);
    let BuildOutcome::Published(published) =
        generate_dataset(&ctx, "AFG", &boundaries["AFG"]).expect("build")
    else {
        panic!("AFG should be published");
    };
    let payload = CatalogDataset::from_published(&published, &config.dataset, &config.tag_vocabulary);
    (published, payload)
}

fn not_found() -> (u16, serde_json::Value) {
    (
        404,
        serde_json::json!({
            "success": false,
            "error": {"__type": "Not Found Error", "message": "Not found"}
        }),
    )
}

fn package_with(resources: Vec<serde_json::Value>) -> (u16, serde_json::Value) {
    (
        200,
        serde_json::json!({"success": true, "result": {"id": "pkg-1", "resources": resources}}),
    )
}

fn resources_in_order(names: &[&String]) -> Vec<serde_json::Value> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| serde_json::json!({"id": format!("res-{i}"), "name": name, "url": format!("https://example.org/{name}")}))
        .collect()
}

#[test]
fn payload_matches_catalog_shape() {
    let (_, payload) = afghanistan();
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(value["name"], "geoboundaries-admin-boundaries-for-afghanistan");
    assert_eq!(value["groups"], serde_json::json!([{"name": "afg"}]));
    assert_eq!(value["data_update_frequency"], "0");
    assert_eq!(value["subnational"], "1");
    assert_eq!(value["dataset_date"], "[2014-01-01T00:00:00 TO 2014-12-31T23:59:59]");
    assert_eq!(value["dataset_source"], "ArcGIS HubgeoBoundaries");
    assert_eq!(
        value["tags"],
        serde_json::json!([
            {"name": "administrative boundaries-divisions", "vocabulary_id": "4e61d464-4943-4e97-973a-84673c1aaa87"},
            {"name": "geodata", "vocabulary_id": "4e61d464-4943-4e97-973a-84673c1aaa87"},
            {"name": "gazetteer", "vocabulary_id": "4e61d464-4943-4e97-973a-84673c1aaa87"}
        ])
    );
    assert!(value["notes"]
        .as_str()
        .unwrap()
        .starts_with("This dataset contains the following administrative boundaries: ADM0, ADM1, ADM2.  \n  \n"));
    assert!(value.get("id").is_none());
    let resources = value["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 12);
    assert_eq!(resources[3]["format"], "shp");
    assert_eq!(resources[0]["resource_type"], "api");
    assert_eq!(resources[0]["url_type"], "api");
}

#[test]
fn creates_missing_dataset_without_reorder_when_order_matches() {
    let (published, payload) = afghanistan();
    let names: Vec<&String> = published.resource_names.iter().collect();
    let created = resources_in_order(&names);
    let (base_url, recorded) = spawn_stub(
        2,
        Box::new(move |path, _body| {
            if path.ends_with("package_show") {
                not_found()
            } else {
                package_with(created.clone())
            }
        }),
    );

    let client = CkanClient::new(&base_url, "secret-key", "test-agent").unwrap();
    let report = client
        .publish(&payload, &published.resource_names, "batch-1")
        .expect("publish should succeed");
    assert!(report.created);
    assert!(!report.reordered);
    assert_eq!(report.package_id, "pkg-1");

    let requests = recorded.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, "/api/3/action/package_show");
    assert_eq!(requests[0].body["id"], "geoboundaries-admin-boundaries-for-afghanistan");
    assert_eq!(requests[1].path, "/api/3/action/package_create");
    assert_eq!(requests[1].authorization.as_deref(), Some("secret-key"));
    assert_eq!(requests[1].body["batch"], "batch-1");
    assert!(requests[1].body["updated_by_script"]
        .as_str()
        .unwrap()
        .starts_with("GeoBoundaries ("));
}

#[test]
fn updates_existing_dataset_and_restores_resource_order() {
    let (published, payload) = afghanistan();
    let mut shuffled: Vec<&String> = published.resource_names.iter().collect();
    shuffled.reverse();
    let returned = resources_in_order(&shuffled);
    let existing = returned.clone();
    let (base_url, recorded) = spawn_stub(
        3,
        Box::new(move |path, _body| {
            if path.ends_with("package_show") {
                package_with(existing.clone())
            } else if path.ends_with("package_update") {
                package_with(returned.clone())
            } else {
                (200, serde_json::json!({"success": true, "result": {"order": []}}))
            }
        }),
    );

    let client = CkanClient::new(&base_url, "secret-key", "test-agent").unwrap();
    let report = client
        .publish(&payload, &published.resource_names, "batch-2")
        .expect("publish should succeed");
    assert!(!report.created);
    assert!(report.reordered);

    let requests = recorded.lock().unwrap();
    assert_eq!(requests[1].path, "/api/3/action/package_update");
    assert_eq!(requests[1].body["id"], "pkg-1");
    // Resource ids carry over by name.
    assert_eq!(requests[1].body["resources"][0]["id"], "res-11");
    assert_eq!(requests[2].path, "/api/3/action/package_resource_reorder");
    let order: Vec<&str> = requests[2].body["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| id.as_str().unwrap())
        .collect();
    let expected: Vec<String> = (0..12).rev().map(|i| format!("res-{i}")).collect();
    assert_eq!(order, expected);
}

#[test]
fn rejected_write_surfaces_catalog_error() {
    let (published, payload) = afghanistan();
    let (base_url, _recorded) = spawn_stub(
        2,
        Box::new(|path, _body| {
            if path.ends_with("package_show") {
                not_found()
            } else {
                (
                    403,
                    serde_json::json!({
                        "success": false,
                        "error": {"__type": "Authorization Error", "message": "Access denied"}
                    }),
                )
            }
        }),
    );

    let client = CkanClient::new(&base_url, "bad-key", "test-agent").unwrap();
    let err = client
        .publish(&payload, &published.resource_names, "batch-3")
        .unwrap_err();
    match err {
        CatalogError::Rejected {
            action,
            status,
            message,
        } => {
            assert_eq!(action, "package_create");
            assert_eq!(status, 403);
            assert!(message.contains("Access denied"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn merge_drops_ids_for_new_resources() {
    let (_, payload) = afghanistan();
    let previous = Package {
        id: "pkg-9".to_string(),
        resources: vec![CatalogResource {
            id: Some("old-1".to_string()),
            name: "geoBoundaries-AFG-ADM0.geojson".to_string(),
            url: "https://example.org/old".to_string(),
            description: String::new(),
            format: "geojson".to_string(),
            resource_type: "api".to_string(),
            url_type: "api".to_string(),
        }],
    };
    let merged = merge_existing(&payload, &previous);
    assert_eq!(merged.id.as_deref(), Some("pkg-9"));
    assert_eq!(merged.resources[1].id.as_deref(), Some("old-1"));
    assert!(merged.resources.iter().filter(|r| r.id.is_some()).count() == 1);
    assert_eq!(merged.resources[1].url, payload.resources[1].url);
}
