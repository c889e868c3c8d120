use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 积分交易类型
/// - Earn / Adjust 增加余额, Spend / Expire 减少余额
/// - amount 恒为正数, 方向由类型决定而非符号
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[sea_orm(string_value = "earn")]
    Earn,
    #[sea_orm(string_value = "spend")]
    Spend,
    #[sea_orm(string_value = "adjust")]
    Adjust,
    #[sea_orm(string_value = "expire")]
    Expire,
}

impl TransactionType {
    /// 该类型是否为扣减方向
    pub fn is_debit(&self) -> bool {
        matches!(self, TransactionType::Spend | TransactionType::Expire)
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Earn => write!(f, "earn"),
            TransactionType::Spend => write!(f, "spend"),
            TransactionType::Adjust => write!(f, "adjust"),
            TransactionType::Expire => write!(f, "expire"),
        }
    }
}

/// 积分流水实体
/// 说明:
/// - 每笔成功的余额变更恰好产生一条记录, 创建后不可变
/// - balance_after 为交易提交后的余额快照 (与账户余额严格一致)
/// - reference_type / reference_id 标记业务来源 (如 ticket_purchase -> drawing_id)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub balance_after: i64,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
