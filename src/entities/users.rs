use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 用户实体 (积分账户宿主)
/// - points_balance: 当前积分余额, 不变量: 永远 >= 0
/// - balance_version: 乐观并发版本号, 每次成功的余额变更恰好 +1
///
/// 余额/版本只允许 LedgerService 写入
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    pub points_balance: i64,
    pub balance_version: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
