//! Standalone number scan over the scripted browser.

mod common;

use common::{place_url, FakeBrowser, FakeDetail};
use mapscout_scanner::scan_page_numbers;

#[tokio::test]
async fn test_scan_returns_distinct_numbers() {
    let browser = FakeBrowser::with_feed(0, 0, 0);
    browser.add_detail(
        0,
        FakeDetail::text_only("WhatsApp (71) 99999-0000, fixo 71 3333-2222, de novo (71) 99999-0000"),
    );

    let numbers = scan_page_numbers(&browser, &place_url(0)).await;

    assert_eq!(numbers, vec!["(71) 99999-0000", "71 3333-2222"]);
    assert_eq!(browser.state().closed, 1);
}

#[tokio::test]
async fn test_scan_failures_yield_empty_list() {
    let browser = FakeBrowser::with_feed(0, 0, 0);
    browser.add_detail(0, FakeDetail::unreachable());
    assert!(scan_page_numbers(&browser, &place_url(0)).await.is_empty());
    assert_eq!(browser.state().closed, 1);

    browser.state().fail_open = true;
    assert!(scan_page_numbers(&browser, &place_url(0)).await.is_empty());
}
