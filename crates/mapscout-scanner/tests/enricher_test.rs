//! Detail enrichment paths against scripted detail pages.

mod common;

use common::{place_url, FakeBrowser, FakeDetail};
use mapscout_browser::SessionProvider;
use mapscout_core::{CandidateStub, PipelineConfig, SelectorConfig};
use mapscout_scanner::{DetailEnricher, Enrichment, MapsExtractor, PhonePatterns, ScanError};
use std::time::Duration;
use tokio::time::Instant;

fn stub(index: usize) -> CandidateStub {
    CandidateStub {
        name: format!("Lugar {index}"),
        rating: "4,1".to_string(),
        review_count: "10".to_string(),
        address: format!("Rua {index}"),
        hours: "Aberto".to_string(),
        detail_ref: place_url(index),
    }
}

struct Fixture {
    extractor: MapsExtractor,
    patterns: PhonePatterns,
    selectors: SelectorConfig,
    pipeline: PipelineConfig,
}

impl Fixture {
    fn new() -> Self {
        let selectors = SelectorConfig::default();
        Self {
            extractor: MapsExtractor::new(&selectors, None).expect("selectors compile"),
            patterns: PhonePatterns::for_area_code("71").expect("area code"),
            selectors,
            pipeline: PipelineConfig::default(),
        }
    }

    fn enricher(&self) -> DetailEnricher<'_> {
        DetailEnricher::new(&self.extractor, &self.patterns, &self.selectors, &self.pipeline)
    }
}

#[tokio::test(start_paused = true)]
async fn test_primary_path_merges_detail_fields() {
    let browser = FakeBrowser::with_feed(1, 1, 1);
    browser.add_detail(0, FakeDetail::full("Casa do Sabor", "(71) 3333-0000"));
    let session = browser.open().await.expect("open");
    let fixture = Fixture::new();
    let start = Instant::now();

    let enrichment = fixture.enricher().enrich(&session, stub(0)).await.expect("enrich");

    let record = match enrichment {
        Enrichment::Primary(record) => record,
        other => panic!("expected primary path, got {other:?}"),
    };
    assert_eq!(record.name, "Casa do Sabor");
    assert_eq!(record.phone, "(71) 3333-0000");
    assert_eq!(record.address, "Av. Sete, 100");
    assert_eq!(record.website, "https://example.com/site");
    assert_eq!(record.num_reviews, "87");
    assert_eq!(record.rating, "4,8");
    assert_eq!(record.category, "Restaurante");
    assert_eq!(record.review_count, "10");
    assert_eq!(record.detail_ref, place_url(0));
    assert_eq!(start.elapsed(), fixture.pipeline.detail_settle());
}

#[tokio::test(start_paused = true)]
async fn test_fallback_recovers_phone_from_text() {
    let browser = FakeBrowser::with_feed(1, 1, 1);
    browser.add_detail(0, FakeDetail::text_only("Pedidos: (71) 98888-7777 todos os dias"));
    let session = browser.open().await.expect("open");
    let fixture = Fixture::new();
    let start = Instant::now();

    let enrichment = fixture.enricher().enrich(&session, stub(0)).await.expect("enrich");

    let record = match enrichment {
        Enrichment::Fallback(record) => record,
        other => panic!("expected fallback path, got {other:?}"),
    };
    assert_eq!(record.phone, "71988887777");
    assert_eq!(record.name, "Lugar 0");
    assert_eq!(record.address, "Rua 0");
    assert!(record.website.is_empty());

    // Both marker waits run concurrently, so one timeout elapses, not two.
    let pipeline = &fixture.pipeline;
    assert_eq!(
        start.elapsed(),
        pipeline.marker_timeout() + pipeline.detail_settle() + pipeline.fallback_wait()
    );
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_detail_falls_back_to_body_text_phone() {
    let browser = FakeBrowser::with_feed(1, 1, 1);
    browser.add_detail(
        0,
        FakeDetail::unrated(
            "Casa Nova",
            "(71) 3333-0000",
            "Casa Nova sem avaliações Ligue 71 98765-4321",
        ),
    );
    let session = browser.open().await.expect("open");
    let fixture = Fixture::new();
    let start = Instant::now();

    let enrichment = fixture.enricher().enrich(&session, stub(0)).await.expect("enrich");

    let record = match enrichment {
        Enrichment::Fallback(record) => record,
        other => panic!("expected fallback path, got {other:?}"),
    };
    // Only the phone comes from the page; everything else stays as listed.
    assert_eq!(record.phone, "71987654321");
    assert_eq!(record.name, "Lugar 0");
    assert_eq!(record.address, "Rua 0");
    assert_eq!(record.rating, "4,1");
    assert!(record.category.is_empty());
    assert!(record.num_reviews.is_empty());

    // Markers were present, so no marker timeout elapsed.
    let pipeline = &fixture.pipeline;
    assert_eq!(
        start.elapsed(),
        pipeline.detail_settle() + pipeline.fallback_wait()
    );
}

#[tokio::test(start_paused = true)]
async fn test_fallback_without_phone_keeps_stub() {
    let browser = FakeBrowser::with_feed(1, 1, 1);
    browser.add_detail(0, FakeDetail::text_only("Sem contato disponível"));
    let session = browser.open().await.expect("open");
    let fixture = Fixture::new();

    let record = fixture
        .enricher()
        .enrich(&session, stub(0))
        .await
        .expect("enrich")
        .into_establishment();

    assert!(record.phone.is_empty());
    assert_eq!(record.name, "Lugar 0");
    assert_eq!(record.rating, "4,1");
}

#[tokio::test(start_paused = true)]
async fn test_navigation_failure_is_an_error() {
    let browser = FakeBrowser::with_feed(1, 1, 1);
    browser.add_detail(0, FakeDetail::unreachable());
    let session = browser.open().await.expect("open");
    let fixture = Fixture::new();

    let result = fixture.enricher().enrich(&session, stub(0)).await;

    assert!(matches!(result, Err(ScanError::Browser(_))));
}

#[tokio::test(start_paused = true)]
async fn test_empty_detail_ref_is_skipped() {
    let browser = FakeBrowser::with_feed(1, 1, 1);
    let session = browser.open().await.expect("open");
    let fixture = Fixture::new();
    let mut linkless = stub(0);
    linkless.detail_ref.clear();
    let start = Instant::now();

    let enrichment = fixture.enricher().enrich(&session, linkless).await.expect("enrich");

    assert!(!enrichment.visited());
    assert_eq!(enrichment.into_establishment().name, "Lugar 0");
    assert!(browser.state().navigations.is_empty());
    assert_eq!(start.elapsed(), Duration::ZERO);
}
