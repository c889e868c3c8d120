use crate::entities::{FulfillmentStatus, prize_fulfillment_entity as fulfillments};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 中奖人提交的收货地址
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ConfirmAddressRequest {
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShipRequest {
    pub tracking_number: String,
    pub carrier: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FulfillmentResponse {
    pub id: i64,
    pub ticket_id: i64,
    pub prize_id: i64,
    pub user_id: i64,
    pub status: FulfillmentStatus,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub notified_at: Option<DateTime<Utc>>,
    pub address_confirmed_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub forfeit_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<fulfillments::Model> for FulfillmentResponse {
    fn from(f: fulfillments::Model) -> Self {
        Self {
            id: f.id,
            ticket_id: f.ticket_id,
            prize_id: f.prize_id,
            user_id: f.user_id,
            status: f.status,
            address_line1: f.address_line1,
            address_line2: f.address_line2,
            city: f.city,
            state: f.state,
            postal_code: f.postal_code,
            country: f.country,
            tracking_number: f.tracking_number,
            carrier: f.carrier,
            notified_at: f.notified_at,
            address_confirmed_at: f.address_confirmed_at,
            shipped_at: f.shipped_at,
            delivered_at: f.delivered_at,
            forfeit_at: f.forfeit_at,
            created_at: f.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FulfillmentQuery {
    pub user_id: i64,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
