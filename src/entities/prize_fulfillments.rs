use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 履约状态
/// 状态机 (初始 pending, 终态 delivered / forfeited):
/// ```text
/// pending           -> winner_notified
/// winner_notified   -> address_confirmed | address_invalid
/// address_confirmed -> shipped
/// address_invalid   -> forfeited
/// shipped           -> delivered
/// 任意非终态         -> forfeited
/// ```
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "winner_notified")]
    WinnerNotified,
    #[sea_orm(string_value = "address_confirmed")]
    AddressConfirmed,
    #[sea_orm(string_value = "address_invalid")]
    AddressInvalid,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "forfeited")]
    Forfeited,
}

impl FulfillmentStatus {
    /// 终态后任何字段都不允许再变更
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FulfillmentStatus::Delivered | FulfillmentStatus::Forfeited
        )
    }

    /// 合法迁移表 (状态机的唯一事实来源)
    pub fn can_transition_to(&self, next: FulfillmentStatus) -> bool {
        use FulfillmentStatus::*;
        if self.is_terminal() {
            return false;
        }
        match (*self, next) {
            (Pending, WinnerNotified) => true,
            (WinnerNotified, AddressConfirmed) => true,
            (WinnerNotified, AddressInvalid) => true,
            (AddressConfirmed, Shipped) => true,
            (Shipped, Delivered) => true,
            // 任意非终态均可被没收 (管理操作或超时)
            (_, Forfeited) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentStatus::Pending => write!(f, "pending"),
            FulfillmentStatus::WinnerNotified => write!(f, "winner_notified"),
            FulfillmentStatus::AddressConfirmed => write!(f, "address_confirmed"),
            FulfillmentStatus::AddressInvalid => write!(f, "address_invalid"),
            FulfillmentStatus::Shipped => write!(f, "shipped"),
            FulfillmentStatus::Delivered => write!(f, "delivered"),
            FulfillmentStatus::Forfeited => write!(f, "forfeited"),
        }
    }
}

/// 中奖履约实体
/// 说明:
/// - 与中奖券 1:1, 开奖标记中奖时创建, 初始 pending
/// - 每次状态迁移打上对应时间戳
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prize_fulfillments")]
pub struct Model {
    #[sea_orm(primary_key)]
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
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
