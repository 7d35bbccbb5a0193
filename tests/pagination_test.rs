//! Listing pagination across the platform's paging conventions

mod common;

use common::*;
use harness_migrate::client::HttpMethod;
use harness_migrate::pagination::{fetch_all, PaginationSpec};
use harness_migrate::utils::Throttle;
use proptest::prelude::*;
use serde_json::{json, Value};

fn identifiers(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| item["identifier"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_page_index_listing_collects_every_page() {
    let all = items(23);
    let source = all.clone();
    let transport = FakeTransport::new(move |request| {
        ok_json(paged(&source, cursor(request, "pageIndex"), 10))
    });

    let spec = PaginationSpec::page_index_query("/ng/api/connectors").with_page_size(10);
    let fetched = fetch_all(transport.as_ref(), &spec, &[], &Throttle::disabled()).await;

    assert_eq!(identifiers(&fetched), identifiers(&all));
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_offset_listing_advances_by_items() {
    let all = items(7);
    let source = all.clone();
    let transport = FakeTransport::new(move |request| {
        let offset = cursor(request, "offset");
        let end = (offset + 3).min(source.len());
        ok_json(json!({"data": {"content": source[offset.min(end)..end].to_vec()}}))
    });

    let spec = PaginationSpec::offset_query("/cv/api/monitored-service")
        .with_page_size(3)
        .with_total_pages_path(None);
    let fetched = fetch_all(transport.as_ref(), &spec, &[], &Throttle::disabled()).await;

    assert_eq!(fetched.len(), 7);
    let offsets: Vec<Option<String>> = transport
        .requests()
        .iter()
        .map(|request| request.query_value("offset").map(str::to_string))
        .collect();
    assert_eq!(
        offsets,
        vec![Some("0".into()), Some("3".into()), Some("6".into())]
    );
}

#[tokio::test]
async fn test_body_listing_sends_cursor_in_body() {
    let all = items(5);
    let source = all.clone();
    let transport = FakeTransport::new(move |request| {
        ok_json(paged(&source, cursor(request, "page"), 2))
    });

    let spec = PaginationSpec::body(
        "/pipeline/api/pipelines/list",
        json!({"filterType": "PipelineSetup"}),
    )
    .with_page_size(2);
    let scope = vec![
        ("orgIdentifier".to_string(), "eng".to_string()),
        ("projectIdentifier".to_string(), "web".to_string()),
    ];
    let fetched = fetch_all(transport.as_ref(), &spec, &scope, &Throttle::disabled()).await;

    assert_eq!(fetched.len(), 5);
    let requests = transport.requests();
    assert_eq!(requests.len(), 3);
    for (page, request) in requests.iter().enumerate() {
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.query_value("projectIdentifier"), Some("web"));
        let body = request.json_body().unwrap();
        assert_eq!(body["page"], json!(page));
        assert_eq!(body["filterType"], json!("PipelineSetup"));
    }
}

#[tokio::test]
async fn test_bare_array_listing_with_unwrap() {
    let transport = FakeTransport::new(|request| {
        let page = cursor(request, "page");
        let batch: Vec<Value> = match page {
            0 => vec![
                json!({"policy": {"identifier": "p1"}}),
                json!({"policy": {"identifier": "p2"}}),
            ],
            _ => vec![json!({"policy": {"identifier": "p3"}})],
        };
        ok_json(Value::Array(batch))
    });

    let spec = PaginationSpec::page_size_query("/pm/api/v1/policies")
        .with_params("page", "per_page")
        .with_content_path("")
        .with_total_pages_path(None)
        .with_unwrap_key("policy")
        .with_page_size(2);
    let fetched = fetch_all(transport.as_ref(), &spec, &[], &Throttle::disabled()).await;

    assert_eq!(identifiers(&fetched), vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_error_mid_walk_returns_partial_result() {
    let all = items(30);
    let source = all.clone();
    let transport = FakeTransport::new(move |request| match cursor(request, "page") {
        2 => status(500, "internal error"),
        page => ok_json(paged(&source, page, 10)),
    });

    let spec = PaginationSpec::page_size_query("/ng/api/environmentsV2").with_page_size(10);
    let fetched = fetch_all(transport.as_ref(), &spec, &[], &Throttle::disabled()).await;

    assert_eq!(identifiers(&fetched), identifiers(&all[..20]));
}

#[tokio::test]
async fn test_transport_failure_on_first_page_yields_nothing() {
    let transport = FakeTransport::new(|_| {
        Err(harness_migrate::MigrationError::api_error(0, "connection refused"))
    });
    let spec = PaginationSpec::page_size_query("/ng/api/environmentsV2");
    let fetched = fetch_all(transport.as_ref(), &spec, &[], &Throttle::disabled()).await;

    assert!(fetched.is_empty());
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_still_waits_out_the_throttle() {
    let transport = FakeTransport::new(|_| {
        Err(harness_migrate::MigrationError::api_error(0, "connection reset"))
    });
    let spec = PaginationSpec::page_size_query("/ng/api/environmentsV2");
    let throttle = Throttle::from_millis(250);

    let start = tokio::time::Instant::now();
    fetch_all(transport.as_ref(), &spec, &[], &throttle).await;
    fetch_all(transport.as_ref(), &spec, &[], &throttle).await;

    assert_eq!(transport.request_count(), 2);
    assert!(start.elapsed() >= std::time::Duration::from_millis(500));
}

#[tokio::test]
async fn test_page_ceiling_stops_endless_listing() {
    // Always a full page and no total: only the ceiling ends the walk.
    let transport = FakeTransport::new(|_| {
        ok_json(json!({"data": {"content": [{"identifier": "a"}, {"identifier": "b"}]}}))
    });

    let spec = PaginationSpec::page_size_query("/ng/api/gitx-webhooks")
        .with_total_pages_path(None)
        .with_page_size(2)
        .with_max_pages(4);
    let fetched = fetch_all(transport.as_ref(), &spec, &[], &Throttle::disabled()).await;

    assert_eq!(transport.request_count(), 4);
    assert_eq!(fetched.len(), 8);
}

#[tokio::test]
async fn test_total_pages_as_string_is_honored() {
    let transport = FakeTransport::new(|_| {
        ok_json(json!({"data": {"content": [{"identifier": "a"}], "totalPages": "1"}}))
    });

    let spec = PaginationSpec::page_size_query("/ng/api/servicesV2").with_page_size(1);
    let fetched = fetch_all(transport.as_ref(), &spec, &[], &Throttle::disabled()).await;

    assert_eq!(fetched.len(), 1);
    assert_eq!(transport.request_count(), 1);
}

proptest! {
    #[test]
    fn test_fetch_all_requests_one_call_per_page((count, page_size) in listing_strategy()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let all = items(count);
        let source = all.clone();
        let transport = FakeTransport::new(move |request| {
            ok_json(paged(&source, cursor(request, "pageIndex"), page_size))
        });
        let spec = PaginationSpec::page_index_query("/ng/api/connectors").with_page_size(page_size);

        let fetched = runtime.block_on(fetch_all(
            transport.as_ref(),
            &spec,
            &[],
            &Throttle::disabled(),
        ));

        // An empty listing still costs the first call.
        let expected_calls = count.div_ceil(page_size).max(1);
        prop_assert_eq!(identifiers(&fetched), identifiers(&all));
        prop_assert_eq!(transport.request_count(), expected_calls);
    }
}
