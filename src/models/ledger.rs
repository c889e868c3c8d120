use crate::entities::{TransactionType, point_transaction_entity as point_transactions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 记账请求 (earn / spend / adjust / expire)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ApplyTransactionRequest {
    pub transaction_type: TransactionType,
    /// 恒为正数, 方向由 transaction_type 决定
    pub amount: i64,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointTransactionResponse {
    pub id: i64,
    pub user_id: i64,
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub balance_after: i64,
    pub reference_type: Option<String>,
    pub reference_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<point_transactions::Model> for PointTransactionResponse {
    fn from(txn: point_transactions::Model) -> Self {
        Self {
            id: txn.id,
            user_id: txn.user_id,
            transaction_type: txn.transaction_type,
            amount: txn.amount,
            balance_after: txn.balance_after,
            reference_type: txn.reference_type,
            reference_id: txn.reference_id,
            created_at: txn.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub user_id: i64,
    pub balance: i64,
    pub version: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransactionQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
