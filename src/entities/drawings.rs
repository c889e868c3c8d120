use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 抽奖周期类型
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum DrawingType {
    #[sea_orm(string_value = "daily")]
    Daily,
    #[sea_orm(string_value = "weekly")]
    Weekly,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "annual")]
    Annual,
}

impl std::fmt::Display for DrawingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawingType::Daily => write!(f, "daily"),
            DrawingType::Weekly => write!(f, "weekly"),
            DrawingType::Monthly => write!(f, "monthly"),
            DrawingType::Annual => write!(f, "annual"),
        }
    }
}

/// 抽奖状态
/// 生命周期: draft -> scheduled -> open -> closed -> completed
/// 任意未完成状态均可 -> cancelled
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum DrawingStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl DrawingStatus {
    /// 生命周期合法迁移表 (集中在一处, 避免散落的条件判断)
    pub fn can_transition_to(&self, next: DrawingStatus) -> bool {
        use DrawingStatus::*;
        matches!(
            (*self, next),
            (Draft, Scheduled)
                | (Scheduled, Open)
                | (Open, Closed)
                | (Closed, Completed)
                | (Draft, Cancelled)
                | (Scheduled, Cancelled)
                | (Open, Cancelled)
                | (Closed, Cancelled)
        )
    }
}

impl std::fmt::Display for DrawingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawingStatus::Draft => write!(f, "draft"),
            DrawingStatus::Scheduled => write!(f, "scheduled"),
            DrawingStatus::Open => write!(f, "open"),
            DrawingStatus::Closed => write!(f, "closed"),
            DrawingStatus::Completed => write!(f, "completed"),
            DrawingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 抽奖活动实体
/// 说明:
/// - total_tickets: 售出券数的累计计数, 购票时原子递增
/// - random_seed: 开奖时一次性写入, 用于审计重放 (同一 seed 恒产生同一排列)
/// - 仅 status = open 时允许购票
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "drawings")]
pub struct Model {
    #[sea_orm(primary_key)]
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
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
