use crate::entities::{
    DrawingStatus, TransactionType, drawing_entity as drawings,
    point_transaction_entity as point_transactions, ticket_entity as tickets,
};
use crate::error::{AppError, AppResult};
use crate::models::{PaginatedResponse, PaginationParams, TicketQuery, TicketResponse};
use crate::services::LedgerService;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

pub const TICKET_PURCHASE_REFERENCE: &str = "ticket_purchase";

/// 购票服务
///
/// 积分扣减、抽奖券写入与 total_tickets 递增在同一个数据库事务内完成;
/// 任何一步失败整体回滚, 不存在"扣了积分没发券"的中间态。
#[derive(Clone)]
pub struct TicketService {
    pool: DatabaseConnection,
    ledger_service: LedgerService,
}

impl TicketService {
    pub fn new(pool: DatabaseConnection, ledger_service: LedgerService) -> Self {
        Self {
            pool,
            ledger_service,
        }
    }

    /// 购买 quantity 张抽奖券
    ///
    /// 1. 校验抽奖存在且 status = open (任何写入之前)
    /// 2. 扣减 quantity * ticket_cost_points 积分 (spend 流水)
    /// 3. 写入 quantity 条券记录 (券号未分配)
    /// 4. 以 status = open 守卫原子递增 total_tickets; 若开奖已把状态迁走
    ///    则整体回滚
    pub async fn purchase(
        &self,
        drawing_id: i64,
        user_id: i64,
        quantity: i64,
    ) -> AppResult<(Vec<tickets::Model>, point_transactions::Model)> {
        if quantity < 1 {
            return Err(AppError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let drawing = drawings::Entity::find_by_id(drawing_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::DrawingNotFound(drawing_id))?;
        if drawing.status != DrawingStatus::Open {
            return Err(AppError::DrawingNotOpen(format!(
                "Drawing {drawing_id} is {}, tickets can only be purchased while open",
                drawing.status
            )));
        }

        let cost = quantity
            .checked_mul(drawing.ticket_cost_points)
            .ok_or_else(|| AppError::ValidationError("Ticket cost overflow".to_string()))?;

        let txn = self.pool.begin().await?;

        // 积分扣减并入本事务; InsufficientBalance / ConcurrentModification
        // 原样向上传播, 事务随 Err 丢弃而回滚
        let payment = self
            .ledger_service
            .apply_on(
                &txn,
                user_id,
                TransactionType::Spend,
                cost,
                Some(TICKET_PURCHASE_REFERENCE.to_string()),
                Some(drawing_id),
            )
            .await?;

        let mut issued = Vec::with_capacity(quantity as usize);
        for _ in 0..quantity {
            let ticket = tickets::ActiveModel {
                drawing_id: Set(drawing_id),
                user_id: Set(user_id),
                ticket_number: Set(None),
                purchase_transaction_id: Set(payment.id),
                is_winner: Set(false),
                prize_id: Set(None),
                created_at: Set(Some(Utc::now())),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            issued.push(ticket);
        }

        // 计数递增以 status = open 守卫, 与开奖的 open -> closed 闸门互斥
        let update_result = drawings::Entity::update_many()
            .col_expr(
                drawings::Column::TotalTickets,
                Expr::col(drawings::Column::TotalTickets).add(quantity),
            )
            .col_expr(drawings::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(drawings::Column::Id.eq(drawing_id))
            .filter(drawings::Column::Status.eq(DrawingStatus::Open))
            .exec(&txn)
            .await?;

        if update_result.rows_affected == 0 {
            // 开奖已经开始, 本次购票作废 (回滚扣款与发券)
            return Err(AppError::DrawingNotOpen(format!(
                "Drawing {drawing_id} left open state during purchase"
            )));
        }

        txn.commit().await?;

        Ok((issued, payment))
    }

    /// 获取用户在某个抽奖下的券（分页）
    pub async fn list_user_tickets(
        &self,
        drawing_id: i64,
        query: &TicketQuery,
    ) -> AppResult<PaginatedResponse<TicketResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset();
        let limit = params.get_limit();

        let base_query = tickets::Entity::find()
            .filter(tickets::Column::DrawingId.eq(drawing_id))
            .filter(tickets::Column::UserId.eq(query.user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(tickets::Column::Id, Order::Asc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<TicketResponse> = items_models.into_iter().map(Into::into).collect();

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
    use crate::entities::{DrawingType, user_entity as users};
    use chrono::Duration;
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
        users::ActiveModel {
            username: Set("bob".to_string()),
            points_balance: Set(balance),
            balance_version: Set(0),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn create_drawing(db: &DatabaseConnection, cost: i64, status: DrawingStatus) -> i64 {
        drawings::ActiveModel {
            drawing_type: Set(DrawingType::Weekly),
            ticket_cost_points: Set(cost),
            drawing_time: Set(Utc::now() + Duration::days(1)),
            ticket_sales_close: Set(Utc::now() + Duration::hours(12)),
            status: Set(status),
            total_tickets: Set(0),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    fn service(db: &DatabaseConnection) -> TicketService {
        TicketService::new(db.clone(), LedgerService::new(db.clone()))
    }

    #[tokio::test]
    async fn purchase_issues_tickets_and_one_spend() {
        let db = setup().await;
        let user_id = create_user(&db, 1000).await;
        let drawing_id = create_drawing(&db, 100, DrawingStatus::Open).await;

        let (issued, payment) = service(&db).purchase(drawing_id, user_id, 3).await.unwrap();

        assert_eq!(issued.len(), 3);
        assert_eq!(payment.transaction_type, TransactionType::Spend);
        assert_eq!(payment.amount, 300);
        assert_eq!(payment.balance_after, 700);
        assert_eq!(payment.reference_type.as_deref(), Some("ticket_purchase"));
        assert_eq!(payment.reference_id, Some(drawing_id));
        assert!(issued.iter().all(|t| t.ticket_number.is_none()));
        assert!(
            issued
                .iter()
                .all(|t| t.purchase_transaction_id == payment.id)
        );

        let drawing = drawings::Entity::find_by_id(drawing_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(drawing.total_tickets, 3);
    }

    #[tokio::test]
    async fn insufficient_balance_issues_nothing() {
        let db = setup().await;
        let user_id = create_user(&db, 250).await;
        let drawing_id = create_drawing(&db, 100, DrawingStatus::Open).await;

        let err = service(&db)
            .purchase(drawing_id, user_id, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance(_)));

        let ticket_count = tickets::Entity::find()
            .filter(tickets::Column::DrawingId.eq(drawing_id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(ticket_count, 0);
        let txn_count = point_transactions::Entity::find()
            .filter(point_transactions::Column::UserId.eq(user_id))
            .count(&db)
            .await
            .unwrap();
        assert_eq!(txn_count, 0);
        let drawing = drawings::Entity::find_by_id(drawing_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(drawing.total_tickets, 0);
    }

    #[tokio::test]
    async fn purchase_rejected_unless_open() {
        let db = setup().await;
        let user_id = create_user(&db, 1000).await;

        for status in [
            DrawingStatus::Draft,
            DrawingStatus::Scheduled,
            DrawingStatus::Closed,
            DrawingStatus::Completed,
            DrawingStatus::Cancelled,
        ] {
            let drawing_id = create_drawing(&db, 100, status).await;
            let err = service(&db)
                .purchase(drawing_id, user_id, 1)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::DrawingNotOpen(_)));
        }
    }

    #[tokio::test]
    async fn missing_drawing_and_bad_quantity() {
        let db = setup().await;
        let user_id = create_user(&db, 1000).await;

        let err = service(&db).purchase(9999, user_id, 1).await.unwrap_err();
        assert!(matches!(err, AppError::DrawingNotFound(9999)));

        let drawing_id = create_drawing(&db, 100, DrawingStatus::Open).await;
        let err = service(&db)
            .purchase(drawing_id, user_id, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
