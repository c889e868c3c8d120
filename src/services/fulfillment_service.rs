use crate::entities::{FulfillmentStatus, prize_fulfillment_entity as fulfillments};
use crate::error::{AppError, AppResult};
use crate::models::{
    ConfirmAddressRequest, FulfillmentQuery, FulfillmentResponse, PaginatedResponse,
    PaginationParams, ShipRequest,
};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// 中奖履约服务
///
/// 状态机合法性统一由 FulfillmentStatus::can_transition_to 判定;
/// 终态 (delivered / forfeited) 之后任何变更一律拒绝。
#[derive(Clone)]
pub struct FulfillmentService {
    pool: DatabaseConnection,
    forfeit_grace_days: i64,
}

impl FulfillmentService {
    pub fn new(pool: DatabaseConnection, forfeit_grace_days: i64) -> Self {
        Self {
            pool,
            forfeit_grace_days,
        }
    }

    pub async fn get(&self, fulfillment_id: i64) -> AppResult<FulfillmentResponse> {
        let model = self.load(fulfillment_id).await?;
        Ok(model.into())
    }

    /// 用户的履约记录（分页, 倒序）
    pub async fn list_by_user(
        &self,
        query: &FulfillmentQuery,
    ) -> AppResult<PaginatedResponse<FulfillmentResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset();
        let limit = params.get_limit();

        let base_query =
            fulfillments::Entity::find().filter(fulfillments::Column::UserId.eq(query.user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(fulfillments::Column::CreatedAt, Order::Desc)
            .order_by(fulfillments::Column::Id, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<FulfillmentResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(20),
            total,
        ))
    }

    /// pending -> winner_notified
    pub async fn notify(&self, fulfillment_id: i64) -> AppResult<FulfillmentResponse> {
        let model = self
            .load_for_transition(fulfillment_id, FulfillmentStatus::WinnerNotified)
            .await?;
        let mut am = model.into_active_model();
        am.status = Set(FulfillmentStatus::WinnerNotified);
        am.notified_at = Set(Some(Utc::now()));
        am.updated_at = Set(Some(Utc::now()));
        Ok(am.update(&self.pool).await?.into())
    }

    /// winner_notified -> address_confirmed | address_invalid
    ///
    /// 地址格式不合法不是错误: 记录提交内容并落入 address_invalid,
    /// 等待重新联系或宽限期后没收。
    pub async fn confirm_address(
        &self,
        fulfillment_id: i64,
        request: ConfirmAddressRequest,
    ) -> AppResult<FulfillmentResponse> {
        let valid = is_deliverable(&request);
        let target = if valid {
            FulfillmentStatus::AddressConfirmed
        } else {
            FulfillmentStatus::AddressInvalid
        };
        let model = self.load_for_transition(fulfillment_id, target).await?;

        let mut am = model.into_active_model();
        am.status = Set(target);
        am.address_line1 = Set(Some(request.address_line1));
        am.address_line2 = Set(request.address_line2);
        am.city = Set(Some(request.city));
        am.state = Set(request.state);
        am.postal_code = Set(Some(request.postal_code));
        am.country = Set(request.country);
        if valid {
            am.address_confirmed_at = Set(Some(Utc::now()));
        }
        am.updated_at = Set(Some(Utc::now()));
        Ok(am.update(&self.pool).await?.into())
    }

    /// address_confirmed -> shipped, 运单号与承运商均为必填
    pub async fn ship(
        &self,
        fulfillment_id: i64,
        request: ShipRequest,
    ) -> AppResult<FulfillmentResponse> {
        if request.tracking_number.trim().is_empty() || request.carrier.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Both tracking_number and carrier are required".to_string(),
            ));
        }
        let model = self
            .load_for_transition(fulfillment_id, FulfillmentStatus::Shipped)
            .await?;
        let mut am = model.into_active_model();
        am.status = Set(FulfillmentStatus::Shipped);
        am.tracking_number = Set(Some(request.tracking_number));
        am.carrier = Set(Some(request.carrier));
        am.shipped_at = Set(Some(Utc::now()));
        am.updated_at = Set(Some(Utc::now()));
        Ok(am.update(&self.pool).await?.into())
    }

    /// shipped -> delivered (终态)
    pub async fn deliver(&self, fulfillment_id: i64) -> AppResult<FulfillmentResponse> {
        let model = self
            .load_for_transition(fulfillment_id, FulfillmentStatus::Delivered)
            .await?;
        let mut am = model.into_active_model();
        am.status = Set(FulfillmentStatus::Delivered);
        am.delivered_at = Set(Some(Utc::now()));
        am.updated_at = Set(Some(Utc::now()));
        Ok(am.update(&self.pool).await?.into())
    }

    /// 任意非终态 -> forfeited (终态, 管理操作或超时)
    pub async fn forfeit(&self, fulfillment_id: i64) -> AppResult<FulfillmentResponse> {
        let model = self
            .load_for_transition(fulfillment_id, FulfillmentStatus::Forfeited)
            .await?;
        let mut am = model.into_active_model();
        am.status = Set(FulfillmentStatus::Forfeited);
        am.forfeit_at = Set(Some(Utc::now()));
        am.updated_at = Set(Some(Utc::now()));
        Ok(am.update(&self.pool).await?.into())
    }

    /// 宽限期扫描: 没收停留在 address_invalid 或无人认领的
    /// winner_notified 超过宽限期的记录, 返回处理条数
    pub async fn forfeit_overdue(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(self.forfeit_grace_days);
        let stale = fulfillments::Entity::find()
            .filter(
                fulfillments::Column::Status.is_in([
                    FulfillmentStatus::AddressInvalid,
                    FulfillmentStatus::WinnerNotified,
                ]),
            )
            .filter(fulfillments::Column::UpdatedAt.lt(cutoff))
            .all(&self.pool)
            .await?;

        let mut count = 0u64;
        for model in stale {
            let id = model.id;
            let mut am = model.into_active_model();
            am.status = Set(FulfillmentStatus::Forfeited);
            am.forfeit_at = Set(Some(Utc::now()));
            am.updated_at = Set(Some(Utc::now()));
            am.update(&self.pool).await?;
            log::info!("Fulfillment {id} forfeited after grace period");
            count += 1;
        }
        Ok(count)
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn load(&self, fulfillment_id: i64) -> AppResult<fulfillments::Model> {
        fulfillments::Entity::find_by_id(fulfillment_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fulfillment not found: {fulfillment_id}")))
    }

    /// 终态检查优先于迁移表检查: 终态后的一切变更都报 FulfillmentTerminal
    async fn load_for_transition(
        &self,
        fulfillment_id: i64,
        target: FulfillmentStatus,
    ) -> AppResult<fulfillments::Model> {
        let model = self.load(fulfillment_id).await?;
        if model.status.is_terminal() {
            return Err(AppError::FulfillmentTerminal(format!(
                "Fulfillment {fulfillment_id} is already {}",
                model.status
            )));
        }
        if !model.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition(format!(
                "Fulfillment {fulfillment_id} cannot go {} -> {target}",
                model.status
            )));
        }
        Ok(model)
    }
}

fn is_deliverable(request: &ConfirmAddressRequest) -> bool {
    !request.address_line1.trim().is_empty()
        && !request.city.trim().is_empty()
        && !request.postal_code.trim().is_empty()
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

    async fn create_fulfillment(db: &DatabaseConnection, status: FulfillmentStatus) -> i64 {
        use std::sync::atomic::{AtomicI64, Ordering};
        static NEXT_TICKET_ID: AtomicI64 = AtomicI64::new(1);
        fulfillments::ActiveModel {
            ticket_id: Set(NEXT_TICKET_ID.fetch_add(1, Ordering::Relaxed)),
            prize_id: Set(1),
            user_id: Set(1),
            status: Set(status),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    fn valid_address() -> ConfirmAddressRequest {
        ConfirmAddressRequest {
            address_line1: "1 Main St".to_string(),
            address_line2: None,
            city: "Springfield".to_string(),
            state: Some("IL".to_string()),
            postal_code: "62701".to_string(),
            country: Some("US".to_string()),
        }
    }

    #[tokio::test]
    async fn happy_path_reaches_delivered_with_all_timestamps() {
        let db = setup().await;
        let id = create_fulfillment(&db, FulfillmentStatus::Pending).await;
        let service = FulfillmentService::new(db.clone(), 30);

        let notified = service.notify(id).await.unwrap();
        assert_eq!(notified.status, FulfillmentStatus::WinnerNotified);
        assert!(notified.notified_at.is_some());

        let confirmed = service.confirm_address(id, valid_address()).await.unwrap();
        assert_eq!(confirmed.status, FulfillmentStatus::AddressConfirmed);
        assert!(confirmed.address_confirmed_at.is_some());

        let shipped = service
            .ship(
                id,
                ShipRequest {
                    tracking_number: "1Z999".to_string(),
                    carrier: "UPS".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(shipped.status, FulfillmentStatus::Shipped);
        assert!(shipped.shipped_at.is_some());

        let delivered = service.deliver(id).await.unwrap();
        assert_eq!(delivered.status, FulfillmentStatus::Delivered);
        assert!(delivered.notified_at.is_some());
        assert!(delivered.address_confirmed_at.is_some());
        assert!(delivered.shipped_at.is_some());
        assert!(delivered.delivered_at.is_some());
    }

    #[tokio::test]
    async fn malformed_address_lands_in_address_invalid() {
        let db = setup().await;
        let id = create_fulfillment(&db, FulfillmentStatus::WinnerNotified).await;
        let service = FulfillmentService::new(db.clone(), 30);

        let mut address = valid_address();
        address.postal_code = "  ".to_string();
        let updated = service.confirm_address(id, address).await.unwrap();
        assert_eq!(updated.status, FulfillmentStatus::AddressInvalid);
        assert!(updated.address_confirmed_at.is_none());

        // address_invalid 只能走向 forfeited
        let err = service
            .ship(
                id,
                ShipRequest {
                    tracking_number: "t".to_string(),
                    carrier: "c".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        let forfeited = service.forfeit(id).await.unwrap();
        assert_eq!(forfeited.status, FulfillmentStatus::Forfeited);
        assert!(forfeited.forfeit_at.is_some());
    }

    #[tokio::test]
    async fn ship_requires_tracking_and_carrier() {
        let db = setup().await;
        let id = create_fulfillment(&db, FulfillmentStatus::AddressConfirmed).await;
        let service = FulfillmentService::new(db.clone(), 30);

        let err = service
            .ship(
                id,
                ShipRequest {
                    tracking_number: String::new(),
                    carrier: "UPS".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn every_unlisted_transition_is_rejected() {
        use FulfillmentStatus::*;
        let db = setup().await;
        let service = FulfillmentService::new(db.clone(), 30);

        // (起点, 操作目标, 是否合法)
        let table: &[(FulfillmentStatus, FulfillmentStatus, bool)] = &[
            (Pending, WinnerNotified, true),
            (Pending, AddressConfirmed, false),
            (Pending, Shipped, false),
            (Pending, Delivered, false),
            (Pending, Forfeited, true),
            (WinnerNotified, WinnerNotified, false),
            (WinnerNotified, AddressConfirmed, true),
            (WinnerNotified, Shipped, false),
            (WinnerNotified, Delivered, false),
            (WinnerNotified, Forfeited, true),
            (AddressConfirmed, WinnerNotified, false),
            (AddressConfirmed, Shipped, true),
            (AddressConfirmed, Delivered, false),
            (AddressConfirmed, Forfeited, true),
            (AddressInvalid, WinnerNotified, false),
            (AddressInvalid, Shipped, false),
            (AddressInvalid, Delivered, false),
            (AddressInvalid, Forfeited, true),
            (Shipped, WinnerNotified, false),
            (Shipped, AddressConfirmed, false),
            (Shipped, Delivered, true),
            (Shipped, Forfeited, true),
        ];
        for &(from, to, allowed) in table {
            assert_eq!(
                from.can_transition_to(to),
                allowed,
                "transition {from} -> {to}"
            );
        }

        // 对照服务层: 从 pending 直接 deliver 必须报 InvalidTransition
        let id = create_fulfillment(&db, Pending).await;
        let err = service.deliver(id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[tokio::test]
    async fn terminal_states_refuse_everything() {
        let db = setup().await;
        let service = FulfillmentService::new(db.clone(), 30);

        for terminal in [FulfillmentStatus::Delivered, FulfillmentStatus::Forfeited] {
            let id = create_fulfillment(&db, terminal).await;

            let err = service.notify(id).await.unwrap_err();
            assert!(matches!(err, AppError::FulfillmentTerminal(_)));

            // 地址更新也不例外
            let err = service
                .confirm_address(id, valid_address())
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::FulfillmentTerminal(_)));

            let err = service.forfeit(id).await.unwrap_err();
            assert!(matches!(err, AppError::FulfillmentTerminal(_)));
        }
    }

    #[tokio::test]
    async fn winner_from_close_flows_through_to_delivered() {
        use crate::entities::{
            DrawingStatus, DrawingType, FulfillmentType, drawing_entity as drawings,
            user_entity as users,
        };
        use crate::models::CreatePrizeRequest;
        use crate::services::{DrawingService, LedgerService, TicketService};
        use chrono::Duration;

        let db = setup().await;
        let user = users::ActiveModel {
            username: Set("ivy".to_string()),
            points_balance: Set(1000),
            balance_version: Set(0),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let drawing = drawings::ActiveModel {
            drawing_type: Set(DrawingType::Weekly),
            ticket_cost_points: Set(100),
            drawing_time: Set(Utc::now() - Duration::minutes(1)),
            ticket_sales_close: Set(Utc::now() - Duration::minutes(5)),
            status: Set(DrawingStatus::Open),
            total_tickets: Set(0),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let drawing_svc = DrawingService::new(db.clone());
        let prize = drawing_svc
            .add_prize(
                drawing.id,
                CreatePrizeRequest {
                    name: "Grand prize".to_string(),
                    rank: 1,
                    quantity: 1,
                    fulfillment_type: FulfillmentType::Physical,
                    sponsor_id: None,
                },
            )
            .await
            .unwrap();

        let tickets_svc = TicketService::new(db.clone(), LedgerService::new(db.clone()));
        tickets_svc.purchase(drawing.id, user.id, 3).await.unwrap();

        let (_, winners) = drawing_svc.close(drawing.id).await.unwrap();
        assert_eq!(winners.len(), 1);

        // 开奖创建的履约记录接线正确: 指向中奖券、奖品与持有人
        let service = FulfillmentService::new(db.clone(), 30);
        let pending = fulfillments::Entity::find()
            .filter(fulfillments::Column::TicketId.eq(winners[0].id))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.status, FulfillmentStatus::Pending);
        assert_eq!(pending.prize_id, prize.id);
        assert_eq!(pending.user_id, user.id);

        // 同一条记录走完整条快乐路径
        service.notify(pending.id).await.unwrap();
        let confirmed = service
            .confirm_address(pending.id, valid_address())
            .await
            .unwrap();
        assert_eq!(confirmed.status, FulfillmentStatus::AddressConfirmed);
        service
            .ship(
                pending.id,
                ShipRequest {
                    tracking_number: "1Z42".to_string(),
                    carrier: "DHL".to_string(),
                },
            )
            .await
            .unwrap();
        let delivered = service.deliver(pending.id).await.unwrap();
        assert_eq!(delivered.status, FulfillmentStatus::Delivered);
        assert_eq!(delivered.ticket_id, winners[0].id);
    }

    #[tokio::test]
    async fn overdue_sweep_forfeits_stale_records() {
        let db = setup().await;
        let service = FulfillmentService::new(db.clone(), 30);

        let stale_id = create_fulfillment(&db, FulfillmentStatus::AddressInvalid).await;
        let fresh_id = create_fulfillment(&db, FulfillmentStatus::AddressInvalid).await;
        let confirmed_id = create_fulfillment(&db, FulfillmentStatus::AddressConfirmed).await;

        // 把一条记录的 updated_at 拨回宽限期之前
        let stale = fulfillments::Entity::find_by_id(stale_id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        let mut am = stale.into_active_model();
        am.updated_at = Set(Some(Utc::now() - Duration::days(31)));
        am.update(&db).await.unwrap();

        let swept = service.forfeit_overdue().await.unwrap();
        assert_eq!(swept, 1);

        let stale = service.get(stale_id).await.unwrap();
        assert_eq!(stale.status, FulfillmentStatus::Forfeited);
        assert!(stale.forfeit_at.is_some());
        // 未过期与已确认地址的记录不受影响
        assert_eq!(
            service.get(fresh_id).await.unwrap().status,
            FulfillmentStatus::AddressInvalid
        );
        assert_eq!(
            service.get(confirmed_id).await.unwrap().status,
            FulfillmentStatus::AddressConfirmed
        );
    }
}
