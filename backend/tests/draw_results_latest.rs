//! Behavioural tests for draw result ingestion against the in-memory store.
use std::collections::BTreeMap;
use std::sync::Arc;

use lottery_backend::domain::attribute::WireValue;
use lottery_backend::domain::ports::DrawResultRepository;
use lottery_backend::domain::{DrawResultDraft, DrawResultService, ErrorKind, PrizeTier};
use lottery_backend::outbound::dynamodb::StoreFailure;
use lottery_backend::outbound::persistence::DocumentDrawResultRepository;
use lottery_backend::test_support::InMemoryDocumentStore;
use lottery_backend::test_support::clock::SettableClock;
use rstest::{fixture, rstest};

const RESULTS: &str = "lotofacil_results";

fn draft(contest: u32) -> DrawResultDraft {
    DrawResultDraft {
        contest,
        draw_date: "2024-02-10".into(),
        numbers: ["13", "02", "25"].map(str::to_owned).to_vec(),
        prizes: BTreeMap::from([
            (
                "fifteen".to_owned(),
                PrizeTier {
                    winners: 2,
                    prize: 812_345.67,
                },
            ),
            (
                "eleven".to_owned(),
                PrizeTier {
                    winners: 120_344,
                    prize: 6.0,
                },
            ),
        ]),
        accumulated: false,
        next_contest_estimate: 1_700_000.0,
        next_contest_date: "2024-02-12".into(),
        next_contest: contest + 1,
        lucky_team: String::new(),
        lucky_month: String::new(),
    }
}

struct Harness {
    store: Arc<InMemoryDocumentStore>,
    repository: Arc<DocumentDrawResultRepository>,
    service: DrawResultService<DocumentDrawResultRepository>,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryDocumentStore::new());
    let repository = Arc::new(DocumentDrawResultRepository::new(store.clone(), RESULTS));
    let service = DrawResultService::new(
        repository.clone(),
        Arc::new(SettableClock::at_midnight(2024, 2, 11)),
    );
    Harness {
        store,
        repository,
        service,
    }
}

#[rstest]
#[tokio::test]
async fn latest_reads_the_table_in_a_single_scan(harness: Harness) {
    harness
        .service
        .save_results(vec![draft(3_010), draft(3_012), draft(3_011)])
        .await
        .expect("saved");

    let latest = harness.service.latest_result().await.expect("latest");
    assert_eq!(latest.contest, 3_012);
    assert_eq!(harness.store.scan_count(), 1);
}

#[rstest]
#[tokio::test]
async fn latest_on_an_empty_table_is_not_found(harness: Harness) {
    let err = harness.service.latest_result().await.expect_err("empty");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.message(), "No results found");
    assert_eq!(harness.store.scan_count(), 1);
}

#[rstest]
#[tokio::test]
async fn stored_results_read_back_unchanged(harness: Harness) {
    let saved = harness
        .service
        .save_results(vec![draft(3_010)])
        .await
        .expect("saved");
    let stored = harness
        .repository
        .find_by_id(&saved[0].id)
        .await
        .expect("found");

    assert_eq!(stored, saved[0]);
    assert_eq!(stored.numbers, ["02", "13", "25"]);
    assert_eq!(stored.prizes["fifteen"].prize, 812_345.67);
}

#[rstest]
#[tokio::test]
async fn numbers_are_stored_as_a_string_set(harness: Harness) {
    harness
        .service
        .save_results(vec![draft(3_010)])
        .await
        .expect("saved");

    let items = harness.store.wire_items(RESULTS);
    assert!(matches!(
        items[0].get("numbers"),
        Some(WireValue::StringSet(set)) if set.len() == 3
    ));
}

#[rstest]
#[tokio::test]
async fn contest_lookup_filters_the_scan(harness: Harness) {
    harness
        .service
        .save_results(vec![draft(3_010), draft(3_011)])
        .await
        .expect("saved");

    let found = harness
        .repository
        .find_by_contest(3_011)
        .await
        .expect("scan")
        .expect("present");
    assert_eq!(found.next_contest, 3_012);
    assert!(
        harness
            .repository
            .find_by_contest(9_999)
            .await
            .expect("scan")
            .is_none()
    );
}

#[rstest]
#[tokio::test]
async fn throttling_surfaces_as_a_retryable_error(harness: Harness) {
    harness.store.fail_next(StoreFailure::new(
        "ProvisionedThroughputExceededException",
        "slow down",
    ));

    let err = harness
        .service
        .save_results(vec![draft(3_010)])
        .await
        .expect_err("throttled");
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert!(err.is_retryable());
    assert_eq!(harness.store.item_count(RESULTS), 0);
}
