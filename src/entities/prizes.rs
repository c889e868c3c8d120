use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 奖品履约方式
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentType {
    #[sea_orm(string_value = "digital")]
    Digital,
    #[sea_orm(string_value = "physical")]
    Physical,
}

impl std::fmt::Display for FulfillmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentType::Digital => write!(f, "digital"),
            FulfillmentType::Physical => write!(f, "physical"),
        }
    }
}

/// 奖品配置实体
/// 说明:
/// - rank: 奖品等级, 1 为最佳; 开奖时按 rank 升序依次分配
/// - quantity: 该奖品名额数, 每分配一名中奖者消耗一个
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub drawing_id: i64,
    pub sponsor_id: Option<i64>,
    pub name: String,
    pub rank: i32,
    pub quantity: i32,
    pub fulfillment_type: FulfillmentType,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
