use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽奖券实体
/// 说明:
/// - ticket_number 在开奖前为 NULL, 开奖时按创建顺序分配 1..N (同一抽奖内唯一)
/// - purchase_transaction_id 指向支付本券的积分 spend 流水
/// - 一张券最多中一个奖品
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub drawing_id: i64,
    pub user_id: i64,
    pub ticket_number: Option<i64>,
    pub purchase_transaction_id: i64,
    pub is_winner: bool,
    pub prize_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
