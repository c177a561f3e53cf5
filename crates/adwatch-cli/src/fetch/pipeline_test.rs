use adwatch_db::{connect_pool, run_migrations, PoolConfig};
use chrono::TimeZone;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
}

async fn memory_pool() -> SqlitePool {
    let pool = connect_pool("sqlite::memory:", PoolConfig::default())
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

fn endpoint(server: &MockServer) -> ArchiveEndpoint {
    ArchiveEndpoint {
        url: format!("{}/ads_archive", server.uri()),
        timeout_secs: 5,
        user_agent: "adwatch-test/0.1".to_string(),
    }
}

fn request(max_results: usize, filters: FilterConfig) -> FetchRequest {
    FetchRequest {
        token: Some("test-token".to_string()),
        country: Country::Code("ES".to_string()),
        filters,
        max_results,
    }
}

fn open_filters() -> FilterConfig {
    FilterConfig {
        filter_infoproducts: false,
        ..FilterConfig::default()
    }
}

fn ad(id: &str, page: &str, start: &str, body: &str, impressions: &str) -> Value {
    json!({
        "id": id,
        "page_name": page,
        "ad_creative_bodies": [body],
        "ad_snapshot_url": format!("https://archive.example.test/render?id={id}"),
        "ad_delivery_start_time": start,
        "impressions": {"lower_bound": impressions, "upper_bound": "999,999"},
        "spend": {"lower_bound": "100", "upper_bound": "199"},
        "currency": "EUR"
    })
}

async fn mount_first_page(server: &MockServer, body: Value, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/ads_archive"))
        .and(query_param("access_token", "test-token"))
        .and(query_param("ad_reached_countries", r#"["ES"]"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn stored_ids(pool: &SqlitePool) -> Vec<String> {
    sqlx::query_scalar::<_, String>("SELECT id FROM ad_records ORDER BY id")
        .fetch_all(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let server = MockServer::start().await;
    mount_first_page(&server, json!({"data": []}), 0).await;
    let pool = memory_pool().await;

    for token in [None, Some("   ".to_string())] {
        let mut req = request(10, open_filters());
        req.token = token;
        let result = run_fetch_pipeline(&pool, &endpoint(&server), &req, now(), |_| {}).await;
        assert!(matches!(result, Err(FetchError::MissingCredential)));
    }
}

#[tokio::test]
async fn zero_max_results_makes_no_request() {
    let server = MockServer::start().await;
    mount_first_page(&server, json!({"data": []}), 0).await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(0, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert!(report.ads.is_empty());
    assert_eq!(report.pages_fetched, 0);
    assert!(report.is_complete());
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recent_ad_is_dropped_and_page_counts_one() {
    let server = MockServer::start().await;
    mount_first_page(
        &server,
        json!({"data": [
            ad("a-15", "Academia", "2026-10-02T12:00:00+0000", "Oferta", "1,000"),
            ad("a-5", "Academia", "2026-10-12T12:00:00+0000", "Oferta", "1,000"),
        ]}),
        1,
    )
    .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(500, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.ads.len(), 1);
    assert_eq!(report.ads[0].id, "a-15");
    assert_eq!(report.ads[0].days_active, 15);
    assert_eq!(report.rejections.filtered, 1);
    assert_eq!(report.pages.len(), 1);
    assert_eq!(report.pages[0].page_name, "Academia");
    assert_eq!(report.pages[0].active_ad_count, 1);
    assert_eq!(stored_ids(&pool).await, vec!["a-15"]);
    assert!(report.is_complete());
}

#[tokio::test]
async fn infoproduct_keyword_is_accepted_with_filter_on() {
    let server = MockServer::start().await;
    mount_first_page(
        &server,
        json!({"data": [
            ad(
                "c-1",
                "Ventas Pro",
                "2026-09-01T00:00:00+0000",
                "Toma nuestro curso de ventas",
                "10"
            ),
            ad("c-2", "Tienda", "2026-09-01T00:00:00+0000", "Zapatillas al 50%", "10"),
        ]}),
        1,
    )
    .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(500, FilterConfig::default()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    let ids: Vec<&str> = report.ads.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["c-1"]);
    assert_eq!(report.ads[0].body_text, "Toma nuestro curso de ventas");
}

#[tokio::test]
async fn thousands_separated_impressions_mark_a_winner() {
    let server = MockServer::start().await;
    mount_first_page(
        &server,
        json!({"data": [ad("w-1", "P", "2026-09-01", "Oferta", "150,000")]}),
        1,
    )
    .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(500, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.ads[0].impressions, 150_000);
    assert!(report.ads[0].is_winner);
    let row = adwatch_db::get_ad(&pool, "w-1").await.unwrap().unwrap();
    assert_eq!(row.impressions, "150000");
}

#[tokio::test]
async fn cap_stops_the_walk_without_requesting_the_next_page() {
    let server = MockServer::start().await;
    let next = format!("{}/page2?access_token=test-token&after=C2", server.uri());
    mount_first_page(
        &server,
        json!({
            "data": [
                ad("d-1", "P", "2026-09-01", "Oferta", "10"),
                ad("d-2", "P", "2026-09-01", "Oferta", "20"),
            ],
            "paging": {"next": next}
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ad("d-3", "P", "2026-09-01", "Oferta", "30")]
        })))
        .expect(0)
        .mount(&server)
        .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(1, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.ads.len(), 1);
    assert_eq!(report.ads[0].id, "d-1");
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(stored_ids(&pool).await, vec!["d-1"]);
}

// ---------------------------------------------------------------------------
// Walk behaviour
// ---------------------------------------------------------------------------

#[tokio::test]
async fn follows_cursor_and_orders_batch_by_impressions() {
    let server = MockServer::start().await;
    let next = format!("{}/page2?access_token=test-token&after=C2", server.uri());
    mount_first_page(
        &server,
        json!({
            "data": [ad("p-1", "Uno", "2026-09-01", "Oferta", "5")],
            "paging": {"next": next}
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .and(query_param("after", "C2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                ad("p-2", "Dos", "2026-09-01", "Oferta", "500"),
                ad("p-3", "Dos", "2026-09-01", "Oferta", "5"),
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let pool = memory_pool().await;

    let mut seen = Vec::new();
    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(4, open_filters()),
        now(),
        |p| seen.push(p),
    )
    .await
    .unwrap();

    let ids: Vec<&str> = report.ads.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["p-2", "p-1", "p-3"]);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.pages[0].page_name, "Dos");
    assert_eq!(report.pages[0].active_ad_count, 2);
    assert_eq!(report.pages[0].summed_impressions, 505);

    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].accepted, 1);
    assert!((seen[0].fraction() - 0.25).abs() < f64::EPSILON);
    assert!((seen[1].fraction() - 0.75).abs() < f64::EPSILON);
}

#[tokio::test]
async fn transport_failure_keeps_partial_results() {
    let server = MockServer::start().await;
    let next = format!("{}/page2?access_token=test-token&after=C2", server.uri());
    mount_first_page(
        &server,
        json!({
            "data": [ad("k-1", "P", "2026-09-01", "Oferta", "10")],
            "paging": {"next": next}
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(500, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.ads.len(), 1);
    assert_eq!(stored_ids(&pool).await, vec!["k-1"]);
    assert!(!report.is_complete());
    assert!(matches!(
        report.aborted,
        Some(ArchiveError::UnexpectedStatus { status: 502, .. })
    ));
}

#[tokio::test]
async fn unreadable_items_are_counted_and_skipped() {
    let server = MockServer::start().await;
    mount_first_page(
        &server,
        json!({"data": [
            {"page_name": "no id"},
            {"id": "u-1", "page_name": "P", "ad_delivery_start_time": "someday"},
            ad("u-2", "P", "2026-09-01", "Oferta", "not a number"),
        ]}),
        1,
    )
    .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(500, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.rejections.unreadable, 2);
    assert_eq!(report.ads.len(), 1);
    assert_eq!(report.ads[0].impressions, 0);
}

#[tokio::test]
async fn store_failures_are_reported_per_record() {
    let server = MockServer::start().await;
    mount_first_page(
        &server,
        json!({"data": [ad("s-1", "P", "2026-09-01", "Oferta", "10")]}),
        1,
    )
    .await;
    let pool = memory_pool().await;
    sqlx::query("DROP TABLE ad_records")
        .execute(&pool)
        .await
        .unwrap();

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(500, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.ads.len(), 1);
    assert_eq!(report.store_failures.len(), 1);
    assert_eq!(report.store_failures[0].0, "s-1");
    assert!(report.aborted.is_none());
}

#[tokio::test]
async fn repeated_ad_id_keeps_one_batch_entry() {
    let server = MockServer::start().await;
    let next = format!("{}/page2?access_token=test-token&after=C2", server.uri());
    mount_first_page(
        &server,
        json!({
            "data": [
                ad("dup", "Academia", "2026-09-01", "Oferta", "10"),
                ad("solo", "Otra", "2026-09-01", "Oferta", "1"),
            ],
            "paging": {"next": next}
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ad("dup", "Academia", "2026-09-01", "Oferta nueva", "40")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(500, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    let ids: Vec<&str> = report.ads.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["dup", "solo"]);
    assert_eq!(report.ads[0].body_text, "Oferta nueva");
    assert_eq!(report.ads[0].impressions, 40);

    let academia = report
        .pages
        .iter()
        .find(|p| p.page_name == "Academia")
        .expect("page aggregate");
    assert_eq!(academia.active_ad_count, 1);
    assert_eq!(academia.summed_impressions, 40);
    assert_eq!(stored_ids(&pool).await, vec!["dup", "solo"]);
}

#[tokio::test]
async fn repeated_ad_id_does_not_count_toward_the_cap_twice() {
    let server = MockServer::start().await;
    mount_first_page(
        &server,
        json!({"data": [
            ad("r-1", "P", "2026-09-01", "Oferta", "10"),
            ad("r-1", "P", "2026-09-01", "Oferta", "10"),
            ad("r-2", "P", "2026-09-01", "Oferta", "10"),
        ]}),
        1,
    )
    .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(2, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.ads.len(), 2);
    assert_eq!(report.pages[0].active_ad_count, 2);
}

#[tokio::test]
async fn self_referencing_cursor_stops_at_the_page_limit() {
    let server = MockServer::start().await;
    let looping = format!("{}/loop?access_token=test-token&after=SAME", server.uri());
    mount_first_page(
        &server,
        json!({
            "data": [ad("first", "P", "2026-09-01", "Oferta", "10")],
            "paging": {"next": looping}
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [ad("again", "P", "2026-09-01", "Oferta", "20")],
            "paging": {"next": looping}
        })))
        .expect(u64::try_from(MAX_PAGES - 1).unwrap())
        .mount(&server)
        .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(500, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.pages_fetched, MAX_PAGES);
    assert!(matches!(
        report.aborted,
        Some(ArchiveError::PaginationLimit { max_pages }) if max_pages == MAX_PAGES
    ));
    let ids: Vec<&str> = report.ads.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["again", "first"]);
    assert_eq!(stored_ids(&pool).await, vec!["again", "first"]);
}

#[tokio::test]
async fn relative_cursor_stops_the_walk_and_keeps_results() {
    let server = MockServer::start().await;
    mount_first_page(
        &server,
        json!({
            "data": [ad("rel-1", "P", "2026-09-01", "Oferta", "10")],
            "paging": {"next": "/ads_archive?access_token=test-token&after=C2"}
        }),
        1,
    )
    .await;
    let pool = memory_pool().await;

    let report = run_fetch_pipeline(
        &pool,
        &endpoint(&server),
        &request(500, open_filters()),
        now(),
        |_| {},
    )
    .await
    .unwrap();

    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.ads.len(), 1);
    assert_eq!(stored_ids(&pool).await, vec!["rel-1"]);
    match report.aborted {
        Some(ArchiveError::InvalidUrl { url, .. }) => {
            assert_eq!(url, "/ads_archive");
        }
        other => panic!("expected InvalidUrl, got {other:?}"),
    }
}

#[test]
fn progress_fraction_is_clamped() {
    let progress = FetchProgress {
        pages: 3,
        accepted: 12,
        max_results: 10,
    };
    assert!((progress.fraction() - 1.0).abs() < f64::EPSILON);
}
