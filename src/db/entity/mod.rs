pub mod asset_snapshot;
pub mod alert;

pub use asset_snapshot::Entity as AssetSnapshot;
pub use alert::Entity as Alert;
