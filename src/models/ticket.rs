use crate::entities::ticket_entity as tickets;
use crate::models::PointTransactionResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PurchaseTicketsRequest {
    pub user_id: i64,
    /// 购买张数, 至少 1
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    pub id: i64,
    pub drawing_id: i64,
    pub user_id: i64,
    pub ticket_number: Option<i64>,
    pub purchase_transaction_id: i64,
    pub is_winner: bool,
    pub prize_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<tickets::Model> for TicketResponse {
    fn from(t: tickets::Model) -> Self {
        Self {
            id: t.id,
            drawing_id: t.drawing_id,
            user_id: t.user_id,
            ticket_number: t.ticket_number,
            purchase_transaction_id: t.purchase_transaction_id,
            is_winner: t.is_winner,
            prize_id: t.prize_id,
            created_at: t.created_at,
        }
    }
}

/// 购票结果: 本次签发的券 + 支付这批券的 spend 流水
#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseTicketsResponse {
    pub tickets: Vec<TicketResponse>,
    pub transaction: PointTransactionResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TicketQuery {
    pub user_id: i64,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
