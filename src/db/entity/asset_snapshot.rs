use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Latest known market values for one tracked asset.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset_snapshots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String, // upstream asset id, e.g. "bitcoin"
    pub market_cap: Option<f64>,
    pub price: Option<f64>,
    pub percent_change: Option<f64>,
    pub updated_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
