use crate::entities::{DrawingStatus, DrawingType, drawing_entity as drawings};
use crate::models::TicketResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDrawingRequest {
    pub drawing_type: DrawingType,
    /// 单张抽奖券价格 (积分)
    pub ticket_cost_points: i64,
    pub drawing_time: DateTime<Utc>,
    pub ticket_sales_close: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrawingResponse {
    pub id: i64,
    pub drawing_type: DrawingType,
    pub ticket_cost_points: i64,
    pub drawing_time: DateTime<Utc>,
    pub ticket_sales_close: DateTime<Utc>,
    pub status: DrawingStatus,
    pub total_tickets: i64,
    pub random_seed: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<drawings::Model> for DrawingResponse {
    fn from(d: drawings::Model) -> Self {
        Self {
            id: d.id,
            drawing_type: d.drawing_type,
            ticket_cost_points: d.ticket_cost_points,
            drawing_time: d.drawing_time,
            ticket_sales_close: d.ticket_sales_close,
            status: d.status,
            total_tickets: d.total_tickets,
            random_seed: d.random_seed,
            completed_at: d.completed_at,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DrawingQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<DrawingStatus>,
}

/// 开奖结果: 抽奖最终状态 + 中奖券列表
#[derive(Debug, Serialize, ToSchema)]
pub struct CloseDrawingResponse {
    pub drawing: DrawingResponse,
    pub winning_tickets: Vec<TicketResponse>,
}
