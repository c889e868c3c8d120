use crate::entities::{
    TransactionType, point_transaction_entity as point_transactions, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    BalanceResponse, PaginatedResponse, PaginationParams, PointTransactionResponse,
    TransactionQuery,
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// 积分账本服务 — 余额的唯一写入方
///
/// 提交协议:
/// 1. 读取 (points_balance, balance_version)
/// 2. 校验 amount > 0 且新余额 >= 0
/// 3. 先写入不可变流水 (balance_after 为快照)
/// 4. 以 `WHERE balance_version = <观察值>` 守卫的 CAS 更新账户
/// 5. CAS 落空 (0 行受影响) 则补偿删除刚写入的流水并返回
///    ConcurrentModification, 由调用方带新状态重试
#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 对单个账户应用一笔余额变更, 成功返回流水记录。
    ///
    /// 服务自身不做去重; 需要跨重试 exactly-once 的调用方应通过
    /// reference_id 自行去重。
    pub async fn apply(
        &self,
        user_id: i64,
        transaction_type: TransactionType,
        amount: i64,
        reference_type: Option<String>,
        reference_id: Option<i64>,
    ) -> AppResult<point_transactions::Model> {
        self.apply_on(
            &self.pool,
            user_id,
            transaction_type,
            amount,
            reference_type,
            reference_id,
        )
        .await
    }

    /// 与 `apply` 相同, 但在调用方提供的连接/事务上执行。
    /// TicketService 用它把积分扣减并入自己的购票事务。
    pub(crate) async fn apply_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
        transaction_type: TransactionType,
        amount: i64,
        reference_type: Option<String>,
        reference_id: Option<i64>,
    ) -> AppResult<point_transactions::Model> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Transaction amount must be positive".to_string(),
            ));
        }

        let user = users::Entity::find_by_id(user_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {user_id}")))?;

        self.apply_at(
            conn,
            user_id,
            user.points_balance,
            user.balance_version,
            transaction_type,
            amount,
            reference_type,
            reference_id,
        )
        .await
    }

    /// 针对一个已观察到的 (balance, version) 的单次 CAS 提交尝试。
    #[allow(clippy::too_many_arguments)]
    async fn apply_at<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: i64,
        observed_balance: i64,
        observed_version: i64,
        transaction_type: TransactionType,
        amount: i64,
        reference_type: Option<String>,
        reference_id: Option<i64>,
    ) -> AppResult<point_transactions::Model> {
        let new_balance = if transaction_type.is_debit() {
            observed_balance - amount
        } else {
            observed_balance + amount
        };
        if new_balance < 0 {
            return Err(AppError::InsufficientBalance(format!(
                "Balance {observed_balance} is less than requested {amount}"
            )));
        }

        // 先写流水, 拿到 balance_after 快照
        let record = point_transactions::ActiveModel {
            user_id: Set(user_id),
            transaction_type: Set(transaction_type),
            amount: Set(amount),
            balance_after: Set(new_balance),
            reference_type: Set(reference_type),
            reference_id: Set(reference_id),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        // 版本守卫的账户更新: 同一版本下最多一个写入者胜出
        let update_result = users::Entity::update_many()
            .col_expr(users::Column::PointsBalance, Expr::value(new_balance))
            .col_expr(
                users::Column::BalanceVersion,
                Expr::value(observed_version + 1),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(users::Column::Id.eq(user_id))
            .filter(users::Column::BalanceVersion.eq(observed_version))
            .exec(conn)
            .await?;

        if update_result.rows_affected == 0 {
            // 竞争失败: 补偿删除刚写入的流水, 保证无可观察的持久变更
            point_transactions::Entity::delete_by_id(record.id)
                .exec(conn)
                .await?;
            return Err(AppError::ConcurrentModification);
        }

        Ok(record)
    }

    /// 读取当前余额与版本
    pub async fn get_balance(&self, user_id: i64) -> AppResult<BalanceResponse> {
        let user = users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User not found: {user_id}")))?;
        Ok(BalanceResponse {
            user_id: user.id,
            balance: user.points_balance,
            version: user.balance_version,
        })
    }

    /// 获取积分流水（分页, 倒序）
    pub async fn list_transactions(
        &self,
        user_id: i64,
        query: &TransactionQuery,
    ) -> AppResult<PaginatedResponse<PointTransactionResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset();
        let limit = params.get_limit();

        let base_query =
            point_transactions::Entity::find().filter(point_transactions::Column::UserId.eq(user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(point_transactions::Column::CreatedAt, Order::Desc)
            .order_by(point_transactions::Column::Id, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<PointTransactionResponse> =
            items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(20),
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::MigratorTrait;
    use sea_orm::{ConnectOptions, Database};

    async fn setup() -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:".to_string());
        options.max_connections(1);
        let db = Database::connect(options).await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn create_user(db: &DatabaseConnection, balance: i64) -> i64 {
        let user = users::ActiveModel {
            username: Set("alice".to_string()),
            points_balance: Set(balance),
            balance_version: Set(0),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();
        user.id
    }

    async fn transaction_count(db: &DatabaseConnection, user_id: i64) -> u64 {
        point_transactions::Entity::find()
            .filter(point_transactions::Column::UserId.eq(user_id))
            .count(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn earn_then_spend_tracks_balance_and_version() {
        let db = setup().await;
        let user_id = create_user(&db, 0).await;
        let service = LedgerService::new(db.clone());

        let earned = service
            .apply(user_id, TransactionType::Earn, 500, None, None)
            .await
            .unwrap();
        assert_eq!(earned.amount, 500);
        assert_eq!(earned.balance_after, 500);

        let spent = service
            .apply(user_id, TransactionType::Spend, 200, None, None)
            .await
            .unwrap();
        assert_eq!(spent.balance_after, 300);

        let balance = service.get_balance(user_id).await.unwrap();
        assert_eq!(balance.balance, 300);
        // 每次成功提交版本恰好 +1
        assert_eq!(balance.version, 2);
        assert_eq!(transaction_count(&db, user_id).await, 2);
    }

    #[tokio::test]
    async fn overdraw_commits_nothing() {
        let db = setup().await;
        let user_id = create_user(&db, 100).await;
        let service = LedgerService::new(db.clone());

        let err = service
            .apply(user_id, TransactionType::Spend, 101, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance(_)));

        let balance = service.get_balance(user_id).await.unwrap();
        assert_eq!(balance.balance, 100);
        assert_eq!(balance.version, 0);
        assert_eq!(transaction_count(&db, user_id).await, 0);
    }

    #[tokio::test]
    async fn non_positive_amount_is_rejected() {
        let db = setup().await;
        let user_id = create_user(&db, 100).await;
        let service = LedgerService::new(db.clone());

        for amount in [0, -5] {
            let err = service
                .apply(user_id, TransactionType::Earn, amount, None, None)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
        }
        assert_eq!(transaction_count(&db, user_id).await, 0);
    }

    #[tokio::test]
    async fn stale_version_loses_cas_and_leaves_no_record() {
        let db = setup().await;
        let user_id = create_user(&db, 1000).await;
        let service = LedgerService::new(db.clone());

        // 另一写入者先提交, 把版本推进到 1
        service
            .apply(user_id, TransactionType::Spend, 100, None, None)
            .await
            .unwrap();

        // 拿着过期版本 0 的写入者必须输掉 CAS
        let err = service
            .apply_at(
                &db,
                user_id,
                1000,
                0,
                TransactionType::Spend,
                100,
                None,
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConcurrentModification));

        // 补偿删除后只剩先提交的那一笔
        assert_eq!(transaction_count(&db, user_id).await, 1);
        let balance = service.get_balance(user_id).await.unwrap();
        assert_eq!(balance.balance, 900);
        assert_eq!(balance.version, 1);
    }

    #[tokio::test]
    async fn adjust_and_expire_directions() {
        let db = setup().await;
        let user_id = create_user(&db, 50).await;
        let service = LedgerService::new(db.clone());

        let up = service
            .apply(user_id, TransactionType::Adjust, 25, None, None)
            .await
            .unwrap();
        assert_eq!(up.balance_after, 75);

        let down = service
            .apply(user_id, TransactionType::Expire, 75, None, None)
            .await
            .unwrap();
        assert_eq!(down.balance_after, 0);
    }

    #[tokio::test]
    async fn final_balance_equals_sum_of_committed_transactions() {
        let db = setup().await;
        let user_id = create_user(&db, 0).await;
        let service = LedgerService::new(db.clone());

        let ops = [
            (TransactionType::Earn, 300),
            (TransactionType::Spend, 120),
            (TransactionType::Earn, 40),
            (TransactionType::Spend, 400), // 失败: 余额不足
            (TransactionType::Expire, 20),
        ];
        for (t, amount) in ops {
            let _ = service.apply(user_id, t, amount, None, None).await;
        }

        let committed = point_transactions::Entity::find()
            .filter(point_transactions::Column::UserId.eq(user_id))
            .all(&db)
            .await
            .unwrap();
        let signed_sum: i64 = committed
            .iter()
            .map(|t| {
                if t.transaction_type.is_debit() {
                    -t.amount
                } else {
                    t.amount
                }
            })
            .sum();

        let balance = service.get_balance(user_id).await.unwrap();
        assert_eq!(balance.balance, signed_sum);
        assert_eq!(balance.balance, 200);
        // 每笔提交流水的 balance_after 都非负
        assert!(committed.iter().all(|t| t.balance_after >= 0));
    }
}
