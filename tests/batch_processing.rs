//! Batch-level tests of `ImprintExtractor` with in-process fakes.
//!
//! `StaticFetcher` serves canned pages and `ScriptedModel` answers prompts
//! from a script, so these tests exercise ordering, counting, deadlines and
//! the locator strategies without network access. They need the `testing`
//! feature: `cargo test --features testing`.

use std::sync::Arc;
use std::time::Duration;

use imprint_reader::testing::{ScriptedModel, StaticFetcher};
use imprint_reader::{BatchRequest, BatchResult, Config, ImprintExtractor, ValidationError};

const FIELDS_REPLY: &str = r#"{
    "company_name": "Example GmbH",
    "managing_directors": ["Jane Doe", "John Roe"],
    "address": {"street": "Hauptstr. 1", "city": "Berlin", "postal_code": "10115", "country": "Germany"},
    "phone": "+49 30 123456",
    "email": "info@example.de",
    "registration_number": "HRB 12345",
    "vat_id": "DE123456789"
}"#;

fn extractor(fetcher: &StaticFetcher, model: &ScriptedModel, config: Config) -> ImprintExtractor {
    ImprintExtractor::from_parts(Arc::new(fetcher.clone()), Arc::new(model.clone()), config)
}

/// A site whose homepage links straight to its imprint.
fn with_site(fetcher: StaticFetcher, host: &str) -> StaticFetcher {
    fetcher
        .with_page(
            &format!("https://{host}"),
            r#"<nav><a href="/">Home</a><a href="/impressum">Impressum</a></nav>"#,
        )
        .with_page(
            &format!("https://{host}/impressum"),
            "<h1>Impressum</h1><p>Example GmbH, Hauptstr. 1, 10115 Berlin</p>",
        )
}

fn request(urls: &[&str]) -> BatchRequest {
    BatchRequest {
        urls: urls.iter().map(|u| u.to_string()).collect(),
    }
}

fn assert_consistent(batch: &BatchResult) {
    assert_eq!(batch.total_urls, batch.results.len());
    assert_eq!(
        batch.successful_extractions + batch.failed_extractions,
        batch.total_urls
    );
    assert_eq!(
        batch.successful_extractions,
        batch.results.iter().filter(|r| r.success).count()
    );
    for result in &batch.results {
        assert_eq!(result.success, result.error_message.is_none());
        if !result.success {
            assert!(result.imprint_url.is_none());
            assert!(result.fields.is_empty());
        }
    }
}

#[tokio::test]
async fn test_results_keep_input_order() {
    let fetcher = with_site(with_site(StaticFetcher::new(), "a.de"), "c.de");
    let model = ScriptedModel::new().with_fields_reply(FIELDS_REPLY);
    let batch = extractor(&fetcher, &model, Config::default())
        .process_batch(request(&["a.de", "b.de", "  ", "c.de"]))
        .await
        .unwrap();

    let originals: Vec<&str> = batch
        .results
        .iter()
        .map(|r| r.original_url.as_str())
        .collect();
    assert_eq!(originals, ["a.de", "b.de", "  ", "c.de"]);
    assert!(batch.results[0].success);
    assert!(!batch.results[1].success);
    assert!(!batch.results[2].success);
    assert!(batch.results[3].success);
    assert_eq!(batch.successful_extractions, 2);
    assert_eq!(batch.failed_extractions, 2);
    assert_eq!(batch.success_rate_percent, 50.0);
    assert_consistent(&batch);
}

#[tokio::test]
async fn test_all_successful_batch() {
    let fetcher = with_site(with_site(StaticFetcher::new(), "a.de"), "b.de");
    let model = ScriptedModel::new().with_fields_reply(FIELDS_REPLY);
    let batch = extractor(&fetcher, &model, Config::default())
        .process_batch(request(&["a.de", "https://b.de"]))
        .await
        .unwrap();

    assert_eq!(batch.success_rate_percent, 100.0);
    assert_consistent(&batch);

    let first = &batch.results[0];
    assert_eq!(first.imprint_url.as_deref(), Some("https://a.de/impressum"));
    assert_eq!(first.fields.company_name, "Example GmbH");
    assert_eq!(first.fields.managing_directors, "Jane Doe; John Roe");
    assert_eq!(first.fields.street, "Hauptstr. 1");
    assert_eq!(first.fields.postal_code, "10115");
    assert_eq!(first.fields.vat_id, "DE123456789");
    assert_eq!(first.fields.website, "");
    // Keyword matches never consult the model for link selection
    assert_eq!(model.link_selection_calls(), 0);
    assert_eq!(model.field_extraction_calls(), 2);
}

#[tokio::test]
async fn test_all_failed_batch() {
    let batch = extractor(&StaticFetcher::new(), &ScriptedModel::new(), Config::default())
        .process_batch(request(&["a.de", "b.de", "ftp://c.de"]))
        .await
        .unwrap();

    assert_eq!(batch.successful_extractions, 0);
    assert_eq!(batch.failed_extractions, 3);
    assert_eq!(batch.success_rate_percent, 0.0);
    assert_consistent(&batch);
    assert!(batch.results[2]
        .error_message
        .as_deref()
        .unwrap()
        .starts_with("Invalid URL"));
}

#[tokio::test]
async fn test_oversized_request_is_rejected() {
    let fetcher = StaticFetcher::new();
    let urls: Vec<String> = (0..101).map(|i| format!("site{i}.de")).collect();
    let err = extractor(&fetcher, &ScriptedModel::new(), Config::default())
        .process_batch(BatchRequest { urls })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Maximum 100 URLs allowed per request");
    assert!(fetcher.requests().is_empty());
}

#[tokio::test]
async fn test_empty_request_is_rejected() {
    let err = extractor(&StaticFetcher::new(), &ScriptedModel::new(), Config::default())
        .process_batch(BatchRequest { urls: vec![] })
        .await
        .unwrap_err();
    assert_eq!(err, ValidationError::Empty);
}

#[tokio::test]
async fn test_homepage_without_links_reports_no_imprint() {
    let fetcher = StaticFetcher::new().with_page("https://a.de", "<p>Coming soon</p>");
    let model = ScriptedModel::new();
    let batch = extractor(&fetcher, &model, Config::default())
        .process_batch(request(&["a.de"]))
        .await
        .unwrap();

    let result = &batch.results[0];
    assert!(!result.success);
    assert_eq!(result.error_message.as_deref(), Some("No imprint page found"));
    assert!(result.imprint_url.is_none());
    assert!(model.prompts().is_empty());
    assert!(fetcher.was_requested("https://a.de/impressum"));
}

#[tokio::test]
async fn test_model_selected_link() {
    let fetcher = StaticFetcher::new()
        .with_page(
            "https://a.de",
            r#"<a href="/ueber-uns">Über uns</a><a href="/anbieter">Anbieter</a>"#,
        )
        .with_page("https://a.de/anbieter", "<p>Example GmbH</p>");
    let model = ScriptedModel::new()
        .with_link_reply("https://a.de/anbieter")
        .with_fields_reply(r#"{"company_name": "Example GmbH"}"#);
    let batch = extractor(&fetcher, &model, Config::default())
        .process_batch(request(&["a.de"]))
        .await
        .unwrap();

    let result = &batch.results[0];
    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(result.imprint_url.as_deref(), Some("https://a.de/anbieter"));
    assert_eq!(model.link_selection_calls(), 1);
}

#[tokio::test]
async fn test_hub_page_leads_to_nested_imprint() {
    let fetcher = StaticFetcher::new()
        .with_page("https://a.de", r#"<a href="/legal">Legal</a>"#)
        .with_page(
            "https://a.de/legal",
            r#"<a href="/legal/privacy">Privacy</a><a href="/legal/imprint">Imprint</a>"#,
        )
        .with_page("https://a.de/legal/imprint", "<p>Example GmbH</p>");
    let model = ScriptedModel::new()
        .with_link_reply("NONE")
        .with_fields_reply(r#"{"company_name": "Example GmbH"}"#);
    let batch = extractor(&fetcher, &model, Config::default())
        .process_batch(request(&["a.de"]))
        .await
        .unwrap();

    let result = &batch.results[0];
    assert!(result.success, "{:?}", result.error_message);
    assert_eq!(
        result.imprint_url.as_deref(),
        Some("https://a.de/legal/imprint")
    );
}

#[tokio::test]
async fn test_slow_url_times_out_without_blocking_others() {
    let fetcher = with_site(with_site(StaticFetcher::new(), "fast.de"), "slow.de")
        .with_delay("https://slow.de", Duration::from_secs(5));
    let model = ScriptedModel::new().with_fields_reply(FIELDS_REPLY);
    let config = Config {
        max_concurrency: 2,
        url_timeout: Duration::from_millis(200),
        ..Default::default()
    };

    let started = std::time::Instant::now();
    let batch = extractor(&fetcher, &model, config)
        .process_batch(request(&["slow.de", "fast.de"]))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(
        batch.results[0].error_message.as_deref(),
        Some("Processing timeout")
    );
    assert!(batch.results[1].success);
    assert_consistent(&batch);
}

#[tokio::test]
async fn test_batch_timeout_fills_unfinished_slots() {
    let fetcher = with_site(with_site(StaticFetcher::new(), "fast.de"), "slow.de")
        .with_delay("https://slow.de", Duration::from_secs(30));
    let model = ScriptedModel::new().with_fields_reply(FIELDS_REPLY);
    let config = Config {
        url_timeout: Duration::from_secs(60),
        batch_timeout: Duration::from_millis(300),
        ..Default::default()
    };

    let started = std::time::Instant::now();
    let batch = extractor(&fetcher, &model, config)
        .process_batch(request(&["fast.de", "slow.de"]))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(batch.results[0].success);
    assert_eq!(
        batch.results[1].error_message.as_deref(),
        Some("Batch timeout")
    );
    assert_eq!(batch.failed_extractions, 1);
    assert_consistent(&batch);
}

#[tokio::test]
async fn test_concurrency_limit_queues_urls() {
    let mut fetcher = StaticFetcher::new();
    let hosts: Vec<String> = (0..4).map(|i| format!("site{i}.de")).collect();
    for host in &hosts {
        fetcher = with_site(fetcher, host)
            .with_delay(&format!("https://{host}"), Duration::from_millis(100));
    }
    let model = ScriptedModel::new().with_fields_reply(FIELDS_REPLY);
    let config = Config {
        max_concurrency: 1,
        ..Default::default()
    };

    let started = std::time::Instant::now();
    let urls: Vec<&str> = hosts.iter().map(String::as_str).collect();
    let batch = extractor(&fetcher, &model, config)
        .process_batch(request(&urls))
        .await
        .unwrap();

    // One pipeline at a time means the homepage delays add up
    assert!(started.elapsed() >= Duration::from_millis(400));
    assert_eq!(batch.successful_extractions, 4);
    assert_consistent(&batch);
}
