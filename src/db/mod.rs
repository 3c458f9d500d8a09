pub mod entity;
pub use entity::*;

mod asset_snapshot_repository;
pub use asset_snapshot_repository::{
    parse_upstream_timestamp,
    AssetSnapshotRepository,
    ReconcileSummary,
};
