use chrono::{ DateTime, NaiveDateTime };
use sea_orm::{
    ActiveModelTrait,
    ActiveValue,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    TransactionTrait,
};
use serde::Serialize;

use crate::db::entity::asset_snapshot;
use crate::error::{ AppError, Result };
use crate::providers::MarketRecord;

/// Row counts produced by one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Clone)]
pub struct AssetSnapshotRepository {
    db: DatabaseConnection,
}

/// Parse an upstream "last updated" value into a naive UTC instant.
///
/// The trailing `Z` is stripped before parsing. Strings carrying an explicit
/// offset are accepted as RFC 3339 and shifted to UTC.
pub fn parse_upstream_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    let naive = trimmed.strip_suffix('Z').unwrap_or(trimmed);

    if let Ok(parsed) = naive.parse::<NaiveDateTime>() {
        return Ok(parsed);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.naive_utc())
        .map_err(|e| AppError::Parse(format!("Invalid upstream timestamp {:?}: {}", raw, e)))
}

impl AssetSnapshotRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_all(&self) -> Result<Vec<asset_snapshot::Model>> {
        let snapshots = asset_snapshot::Entity
            ::find()
            .order_by_asc(asset_snapshot::Column::Id)
            .all(&self.db).await?;

        Ok(snapshots)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<asset_snapshot::Model>> {
        let snapshot = asset_snapshot::Entity
            ::find()
            .filter(asset_snapshot::Column::Name.eq(name))
            .one(&self.db).await?;

        Ok(snapshot)
    }

    /// Merge fetched records into the stored snapshots.
    ///
    /// Existing rows (matched on `name`) are updated in place, unknown names
    /// are inserted. The whole batch runs in one transaction: any failure,
    /// including a malformed timestamp, leaves the table as it was.
    pub async fn reconcile(&self, records: &[MarketRecord]) -> Result<ReconcileSummary> {
        let txn = self.db.begin().await?;
        let mut summary = ReconcileSummary::default();

        for record in records {
            let updated_at = parse_upstream_timestamp(&record.last_updated)?;

            let existing = asset_snapshot::Entity
                ::find()
                .filter(asset_snapshot::Column::Name.eq(record.id.as_str()))
                .one(&txn).await?;

            if let Some(existing) = existing {
                let mut active: asset_snapshot::ActiveModel = existing.into();
                active.market_cap = ActiveValue::Set(Some(record.market_cap));
                active.price = ActiveValue::Set(Some(record.current_price));
                active.percent_change = ActiveValue::Set(Some(record.price_change_percentage_24h));
                active.updated_at = ActiveValue::Set(Some(updated_at));
                active.update(&txn).await?;
                summary.updated += 1;
            } else {
                let snapshot = asset_snapshot::ActiveModel {
                    id: ActiveValue::NotSet,
                    name: ActiveValue::Set(record.id.clone()),
                    market_cap: ActiveValue::Set(Some(record.market_cap)),
                    price: ActiveValue::Set(Some(record.current_price)),
                    percent_change: ActiveValue::Set(Some(record.price_change_percentage_24h)),
                    updated_at: ActiveValue::Set(Some(updated_at)),
                };
                snapshot.insert(&txn).await?;
                summary.inserted += 1;
            }
        }

        txn.commit().await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::PaginatorTrait;

    use crate::db::test_support::setup_db;

    fn record(id: &str, market_cap: f64, price: f64, change: f64, last_updated: &str) -> MarketRecord {
        MarketRecord {
            id: id.to_string(),
            market_cap,
            current_price: price,
            price_change_percentage_24h: change,
            last_updated: last_updated.to_string(),
        }
    }

    fn new_year() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_milli_opt(0, 0, 0, 0).unwrap()
    }

    async fn row_count(repo: &AssetSnapshotRepository) -> u64 {
        asset_snapshot::Entity::find().count(&repo.db).await.unwrap()
    }

    #[test]
    fn test_parse_strips_trailing_z() {
        assert_eq!(parse_upstream_timestamp("2024-01-01T00:00:00.000Z").unwrap(), new_year());
        assert_eq!(parse_upstream_timestamp("2024-01-01T00:00:00").unwrap(), new_year());
    }

    #[test]
    fn test_parse_normalizes_offsets() {
        assert_eq!(parse_upstream_timestamp("2024-01-01T02:00:00+02:00").unwrap(), new_year());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_upstream_timestamp("yesterday"), Err(AppError::Parse(_))));
        assert!(matches!(parse_upstream_timestamp(""), Err(AppError::Parse(_))));
    }

    #[tokio::test]
    async fn test_insert_into_empty_store() {
        let repo = AssetSnapshotRepository::new(setup_db().await);

        let summary = repo
            .reconcile(&[record("bitcoin", 1.2e12, 43000.5, 2.3, "2024-01-01T00:00:00.000Z")]).await
            .unwrap();

        assert_eq!(summary, ReconcileSummary { inserted: 1, updated: 0 });

        let rows = repo.find_all().await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.name, "bitcoin");
        assert_eq!(row.market_cap, Some(1.2e12));
        assert_eq!(row.price, Some(43000.5));
        assert_eq!(row.percent_change, Some(2.3));
        assert_eq!(row.updated_at, Some(new_year()));
    }

    #[tokio::test]
    async fn test_existing_row_updated_in_place() {
        let repo = AssetSnapshotRepository::new(setup_db().await);

        repo.reconcile(&[record("ethereum", 2.0e11, 2200.0, -1.0, "2024-01-01T00:00:00.000Z")]).await
            .unwrap();
        let before = repo.find_by_name("ethereum").await.unwrap().unwrap();

        let summary = repo
            .reconcile(&[record("ethereum", 2.1e11, 2300.0, 4.5, "2024-01-01T00:10:00.000Z")]).await
            .unwrap();
        assert_eq!(summary, ReconcileSummary { inserted: 0, updated: 1 });

        let after = repo.find_by_name("ethereum").await.unwrap().unwrap();
        assert_eq!(after.id, before.id);
        assert_eq!(after.market_cap, Some(2.1e11));
        assert_eq!(after.price, Some(2300.0));
        assert_eq!(after.percent_change, Some(4.5));
        assert_eq!(
            after.updated_at,
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 10, 0).unwrap())
        );
        assert_eq!(row_count(&repo).await, 1);
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let repo = AssetSnapshotRepository::new(setup_db().await);
        let batch = [record("bitcoin", 1.2e12, 43000.5, 2.3, "2024-01-01T00:00:00.000Z")];

        repo.reconcile(&batch).await.unwrap();
        repo.reconcile(&batch).await.unwrap();

        assert_eq!(row_count(&repo).await, 1);
        let row = repo.find_by_name("bitcoin").await.unwrap().unwrap();
        assert_eq!(row.price, Some(43000.5));
    }

    #[tokio::test]
    async fn test_zero_defaults_are_stored_not_null() {
        let repo = AssetSnapshotRepository::new(setup_db().await);

        repo.reconcile(&[record("dogecoin", 0.0, 0.08, 0.0, "2024-01-01T00:00:00.000Z")]).await
            .unwrap();

        let row = repo.find_by_name("dogecoin").await.unwrap().unwrap();
        assert_eq!(row.market_cap, Some(0.0));
        assert_eq!(row.percent_change, Some(0.0));
    }

    #[tokio::test]
    async fn test_duplicate_names_in_one_batch_collapse() {
        let repo = AssetSnapshotRepository::new(setup_db().await);

        let summary = repo
            .reconcile(
                &[
                    record("solana", 1.0e10, 100.0, 1.0, "2024-01-01T00:00:00.000Z"),
                    record("solana", 1.1e10, 110.0, 2.0, "2024-01-01T00:05:00.000Z"),
                ]
            ).await
            .unwrap();

        assert_eq!(summary, ReconcileSummary { inserted: 1, updated: 1 });
        assert_eq!(row_count(&repo).await, 1);
        assert_eq!(repo.find_by_name("solana").await.unwrap().unwrap().price, Some(110.0));
    }

    #[tokio::test]
    async fn test_malformed_timestamp_rolls_back_batch() {
        let repo = AssetSnapshotRepository::new(setup_db().await);
        repo.reconcile(&[record("bitcoin", 1.0e12, 40000.0, 0.5, "2024-01-01T00:00:00.000Z")]).await
            .unwrap();

        let result = repo.reconcile(
            &[
                record("bitcoin", 1.3e12, 45000.0, 3.0, "2024-01-02T00:00:00.000Z"),
                record("ethereum", 2.0e11, 2200.0, 1.0, "not-a-timestamp"),
            ]
        ).await;

        assert!(matches!(result, Err(AppError::Parse(_))));
        assert_eq!(row_count(&repo).await, 1);
        let bitcoin = repo.find_by_name("bitcoin").await.unwrap().unwrap();
        assert_eq!(bitcoin.price, Some(40000.0));
        assert_eq!(bitcoin.updated_at, Some(new_year()));
    }
}
