use crate::entities::{FulfillmentType, prize_entity as prizes};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePrizeRequest {
    pub name: String,
    /// 1 = 最佳奖品, 开奖按 rank 升序分配
    pub rank: i32,
    pub quantity: i32,
    pub fulfillment_type: FulfillmentType,
    pub sponsor_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PrizeResponse {
    pub id: i64,
    pub drawing_id: i64,
    pub sponsor_id: Option<i64>,
    pub name: String,
    pub rank: i32,
    pub quantity: i32,
    pub fulfillment_type: FulfillmentType,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<prizes::Model> for PrizeResponse {
    fn from(p: prizes::Model) -> Self {
        Self {
            id: p.id,
            drawing_id: p.drawing_id,
            sponsor_id: p.sponsor_id,
            name: p.name,
            rank: p.rank,
            quantity: p.quantity,
            fulfillment_type: p.fulfillment_type,
            created_at: p.created_at,
        }
    }
}
