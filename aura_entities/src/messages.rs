use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per utterance. Timestamps are stored as UTC microseconds so
/// ordering is exact on every backend.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub conversation_id: String,
    pub sender: String,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    pub timestamp_us: i64,
    pub sentiment: Option<f32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
