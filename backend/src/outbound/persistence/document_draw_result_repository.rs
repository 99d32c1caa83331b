//! Document-store-backed `DrawResultRepository` implementation.
//!
//! The results table has no index on `contest`, so contest lookups and
//! `latest` read the whole table with a scan. `latest` issues exactly one
//! scan request and picks the highest contest client side.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{DocumentStore, DrawResultRepository, ScanRequest};
use crate::domain::{DomainError, DrawResult};

use super::draw_result_mapper::{CONTEST, DrawResultMapper};
use super::table::Table;

/// `DrawResultRepository` over a [`DocumentStore`] table.
#[derive(Clone)]
pub struct DocumentDrawResultRepository {
    table: Table<DrawResultMapper>,
}

impl DocumentDrawResultRepository {
    pub fn new(store: Arc<dyn DocumentStore>, table: impl Into<String>) -> Self {
        Self {
            table: Table::new(store, table),
        }
    }
}

#[async_trait]
impl DrawResultRepository for DocumentDrawResultRepository {
    async fn save(&self, result: &DrawResult) -> Result<DrawResult, DomainError> {
        self.table.put(result).await?;
        debug!(result_id = %result.id, contest = result.contest, "draw result stored");
        Ok(result.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<DrawResult, DomainError> {
        self.table.get(id).await
    }

    async fn find_by_contest(&self, contest: u32) -> Result<Option<DrawResult>, DomainError> {
        let request = ScanRequest::new()
            .filter("#contest = :contest")
            .name("#contest", CONTEST)
            .value(":contest", contest);
        Ok(self.table.scan(&request).await?.into_iter().next())
    }

    async fn latest(&self) -> Result<Option<DrawResult>, DomainError> {
        let results = self.table.scan(&ScanRequest::new()).await?;
        debug!(scanned = results.len(), "picking latest draw result");
        Ok(results.into_iter().max_by_key(|result| result.contest))
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        self.table.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribute::{Item, NativeValue};
    use crate::domain::ports::MockDocumentStore;
    use rstest::rstest;

    fn stored(id: &str, contest: u32) -> Item {
        let mut item = Item::new();
        item.insert("id".into(), id.into());
        item.insert("contest".into(), contest.into());
        item.insert("drawDate".into(), "2024-01-01T00:00:00.000Z".into());
        item.insert("numbers".into(), vec!["01".to_owned()].into());
        item.insert("prizes".into(), Item::new().into());
        item.insert("accumulated".into(), false.into());
        item.insert("nextContestEstimate".into(), 0_u32.into());
        item.insert("nextContestDate".into(), "2024-01-03".into());
        item.insert("nextContest".into(), (contest + 1).into());
        item.insert("luckyTeam".into(), "".into());
        item.insert("luckyMonth".into(), "".into());
        item.insert("createdAt".into(), "2024-01-01T00:00:00.000Z".into());
        item.insert("updatedAt".into(), "2024-01-01T00:00:00.000Z".into());
        item
    }

    #[rstest]
    #[tokio::test]
    async fn latest_scans_once_and_takes_the_highest_contest() {
        let mut store = MockDocumentStore::new();
        store
            .expect_scan()
            .withf(|table, request| table == "results" && request.filter.is_none())
            .times(1)
            .returning(|_, _| Ok(vec![stored("a", 7), stored("b", 12), stored("c", 9)]));
        let repository = DocumentDrawResultRepository::new(Arc::new(store), "results");

        let latest = repository.latest().await.expect("scan succeeds");
        assert_eq!(latest.map(|result| result.id), Some("b".to_owned()));
    }

    #[rstest]
    #[tokio::test]
    async fn latest_of_an_empty_table_is_none() {
        let mut store = MockDocumentStore::new();
        store.expect_scan().times(1).returning(|_, _| Ok(Vec::new()));
        let repository = DocumentDrawResultRepository::new(Arc::new(store), "results");

        assert!(repository.latest().await.expect("scan succeeds").is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn find_by_contest_filters_on_contest() {
        let mut store = MockDocumentStore::new();
        store
            .expect_scan()
            .withf(|_, request| {
                request.filter.as_deref() == Some("#contest = :contest")
                    && request.params.values.get(":contest") == Some(&NativeValue::from(12_u32))
            })
            .times(1)
            .returning(|_, _| Ok(vec![stored("b", 12)]));
        let repository = DocumentDrawResultRepository::new(Arc::new(store), "results");

        let found = repository.find_by_contest(12).await.expect("scan succeeds");
        assert_eq!(found.map(|result| result.contest), Some(12));
    }
}
