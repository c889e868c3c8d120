use crate::entities::{
    DrawingStatus, FulfillmentStatus, drawing_entity as drawings,
    prize_entity as prizes, prize_fulfillment_entity as fulfillments, ticket_entity as tickets,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDrawingRequest, CreatePrizeRequest, DrawingQuery, DrawingResponse, PaginatedResponse,
    PaginationParams, PrizeResponse,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 从 seed 字符串构造确定性随机数发生器。
/// md5 两次级联扩展出 32 字节种子; 同一 seed 恒得到同一随机流,
/// 开奖结果可由存档的 seed 审计重放。
fn seed_rng(seed: &str) -> StdRng {
    let first = md5::compute(seed.as_bytes());
    let second = md5::compute(first.0);
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(&first.0);
    bytes[16..].copy_from_slice(&second.0);
    StdRng::from_seed(bytes)
}

/// 1..=n 的确定性随机排列
pub(crate) fn seeded_permutation(seed: &str, n: usize) -> Vec<i64> {
    let mut numbers: Vec<i64> = (1..=n as i64).collect();
    numbers.shuffle(&mut seed_rng(seed));
    numbers
}

fn generate_seed() -> String {
    format!("{:032x}", rand::thread_rng().r#gen::<u128>())
}

/// 抽奖活动服务: 生命周期管理 + 开奖引擎
#[derive(Clone)]
pub struct DrawingService {
    pool: DatabaseConnection,
}

impl DrawingService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 创建抽奖活动 (draft)
    pub async fn create(&self, request: CreateDrawingRequest) -> AppResult<DrawingResponse> {
        if request.ticket_cost_points <= 0 {
            return Err(AppError::ValidationError(
                "Ticket cost must be positive".to_string(),
            ));
        }
        if request.ticket_sales_close > request.drawing_time {
            return Err(AppError::ValidationError(
                "Ticket sales must close no later than the drawing time".to_string(),
            ));
        }

        let model = drawings::ActiveModel {
            drawing_type: Set(request.drawing_type),
            ticket_cost_points: Set(request.ticket_cost_points),
            drawing_time: Set(request.drawing_time),
            ticket_sales_close: Set(request.ticket_sales_close),
            status: Set(DrawingStatus::Draft),
            total_tickets: Set(0),
            created_at: Set(Some(Utc::now())),
            updated_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(model.into())
    }

    pub async fn get(&self, drawing_id: i64) -> AppResult<DrawingResponse> {
        let drawing = self.load(drawing_id).await?;
        Ok(drawing.into())
    }

    /// 抽奖活动列表（分页, 可按状态过滤）
    pub async fn list(&self, query: &DrawingQuery) -> AppResult<PaginatedResponse<DrawingResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let offset = params.get_offset();
        let limit = params.get_limit();

        let mut base_query = drawings::Entity::find();
        if let Some(status) = query.status {
            base_query = base_query.filter(drawings::Column::Status.eq(status));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items_models = base_query
            .order_by(drawings::Column::DrawingTime, Order::Desc)
            .limit(limit as u64)
            .offset(offset as u64)
            .all(&self.pool)
            .await?;

        let items: Vec<DrawingResponse> = items_models.into_iter().map(Into::into).collect();

        Ok(PaginatedResponse::new(
            items,
            params.page.unwrap_or(1),
            params.page_size.unwrap_or(20),
            total,
        ))
    }

    /// draft -> scheduled
    pub async fn schedule(&self, drawing_id: i64) -> AppResult<DrawingResponse> {
        let updated = self
            .transition_status(drawing_id, DrawingStatus::Scheduled)
            .await?;
        Ok(updated.into())
    }

    /// scheduled -> open (开放售票)
    pub async fn open(&self, drawing_id: i64) -> AppResult<DrawingResponse> {
        let updated = self
            .transition_status(drawing_id, DrawingStatus::Open)
            .await?;
        Ok(updated.into())
    }

    /// 任意未完成状态 -> cancelled
    pub async fn cancel(&self, drawing_id: i64) -> AppResult<DrawingResponse> {
        let updated = self
            .transition_status(drawing_id, DrawingStatus::Cancelled)
            .await?;
        Ok(updated.into())
    }

    /// 为抽奖添加奖品（开奖前）
    pub async fn add_prize(
        &self,
        drawing_id: i64,
        request: CreatePrizeRequest,
    ) -> AppResult<PrizeResponse> {
        if request.rank < 1 {
            return Err(AppError::ValidationError(
                "Prize rank must be at least 1".to_string(),
            ));
        }
        if request.quantity < 1 {
            return Err(AppError::ValidationError(
                "Prize quantity must be at least 1".to_string(),
            ));
        }

        let drawing = self.load(drawing_id).await?;
        if !matches!(
            drawing.status,
            DrawingStatus::Draft | DrawingStatus::Scheduled | DrawingStatus::Open
        ) {
            return Err(AppError::ValidationError(format!(
                "Prizes cannot be added to a {} drawing",
                drawing.status
            )));
        }

        let model = prizes::ActiveModel {
            drawing_id: Set(drawing_id),
            sponsor_id: Set(request.sponsor_id),
            name: Set(request.name),
            rank: Set(request.rank),
            quantity: Set(request.quantity),
            fulfillment_type: Set(request.fulfillment_type),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(model.into())
    }

    /// 奖品列表（rank 升序）
    pub async fn list_prizes(&self, drawing_id: i64) -> AppResult<Vec<PrizeResponse>> {
        self.load(drawing_id).await?;
        let list = prizes::Entity::find()
            .filter(prizes::Column::DrawingId.eq(drawing_id))
            .order_by_asc(prizes::Column::Rank)
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 开奖
    ///
    /// 仅当 status = open 且已过 ticket_sales_close 时有效。流程:
    /// 1. 状态守卫 CAS open -> closed (单写者闸门, 与购票/二次开奖互斥)
    /// 2. 按创建顺序为每张券分配券号 1..N
    /// 3. 复用或生成 random_seed, 由 seed 导出 1..N 的确定性随机排列
    /// 4. 按 rank 升序遍历奖品, 沿排列分配中奖券直到名额耗尽;
    ///    一张券最多中一个奖; 奖品名额多于券数只是非致命缺口
    /// 5. 每张中奖券创建 pending 履约记录
    /// 6. closed -> completed, 打 completed_at
    pub async fn close(&self, drawing_id: i64) -> AppResult<(drawings::Model, Vec<tickets::Model>)> {
        let drawing = self.load(drawing_id).await?;
        let now = Utc::now();
        if drawing.status != DrawingStatus::Open {
            return Err(AppError::DrawingNotReady(format!(
                "Drawing {drawing_id} is {}, only an open drawing can be closed",
                drawing.status
            )));
        }
        if now < drawing.ticket_sales_close {
            return Err(AppError::DrawingNotReady(format!(
                "Drawing {drawing_id} ticket sales close at {}",
                drawing.ticket_sales_close
            )));
        }

        let txn = self.pool.begin().await?;

        // 单写者闸门: 竞争的第二个 close (或迟到的购票) 观察到 0 行。
        // 闸门与后续开奖写入同属一个事务, 中途失败时随事务一起回滚,
        // 抽奖回到 open, 可直接重试
        let gate = drawings::Entity::update_many()
            .col_expr(drawings::Column::Status, Expr::value(DrawingStatus::Closed))
            .col_expr(drawings::Column::UpdatedAt, Expr::value(now))
            .filter(drawings::Column::Id.eq(drawing_id))
            .filter(drawings::Column::Status.eq(DrawingStatus::Open))
            .exec(&txn)
            .await?;
        if gate.rows_affected == 0 {
            return Err(AppError::DrawingNotReady(format!(
                "Drawing {drawing_id} is already being closed"
            )));
        }

        // 闸门之后计数已冻结, 重读拿最终状态
        let drawing = drawings::Entity::find_by_id(drawing_id)
            .one(&txn)
            .await?
            .ok_or(AppError::DrawingNotFound(drawing_id))?;

        // 按创建顺序分配券号 1..N
        let ticket_models = tickets::Entity::find()
            .filter(tickets::Column::DrawingId.eq(drawing_id))
            .order_by_asc(tickets::Column::Id)
            .all(&txn)
            .await?;
        let total = ticket_models.len();
        if total as i64 != drawing.total_tickets {
            log::warn!(
                "Drawing {drawing_id} ticket count mismatch: counter {} vs rows {total}",
                drawing.total_tickets
            );
        }

        let mut numbered = Vec::with_capacity(total);
        for (index, ticket) in ticket_models.into_iter().enumerate() {
            let mut am = ticket.into_active_model();
            am.ticket_number = Set(Some(index as i64 + 1));
            numbered.push(am.update(&txn).await?);
        }

        // seed 只写一次; 已有 seed 时复用以保证重放一致
        let seed = drawing
            .random_seed
            .clone()
            .unwrap_or_else(generate_seed);
        let permutation = seeded_permutation(&seed, total);

        let prize_list = prizes::Entity::find()
            .filter(prizes::Column::DrawingId.eq(drawing_id))
            .order_by_asc(prizes::Column::Rank)
            .order_by_asc(prizes::Column::Id)
            .all(&txn)
            .await?;

        let mut taken = vec![false; total];
        let mut winners = Vec::new();
        for prize in &prize_list {
            let mut remaining = prize.quantity;
            for &number in &permutation {
                if remaining == 0 {
                    break;
                }
                let index = (number - 1) as usize;
                if taken[index] {
                    // 已被更高 rank 的奖品占用
                    continue;
                }
                taken[index] = true;
                remaining -= 1;

                let mut am = numbered[index].clone().into_active_model();
                am.is_winner = Set(true);
                am.prize_id = Set(Some(prize.id));
                let winner = am.update(&txn).await?;

                fulfillments::ActiveModel {
                    ticket_id: Set(winner.id),
                    prize_id: Set(prize.id),
                    user_id: Set(winner.user_id),
                    status: Set(FulfillmentStatus::Pending),
                    created_at: Set(Some(Utc::now())),
                    updated_at: Set(Some(Utc::now())),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                winners.push(winner);
            }
            if remaining > 0 {
                // 奖品名额超过券数: 非致命缺口, 剩余名额不分配
                log::info!(
                    "Drawing {drawing_id} prize {} ({}) short by {remaining} winners",
                    prize.id,
                    prize.name
                );
            }
        }

        // closed -> completed
        let mut am = drawing.into_active_model();
        am.status = Set(DrawingStatus::Completed);
        am.random_seed = Set(Some(seed));
        am.completed_at = Set(Some(Utc::now()));
        am.updated_at = Set(Some(Utc::now()));
        let completed = am.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Drawing {drawing_id} closed: {total} tickets, {} winners",
            winners.len()
        );

        Ok((completed, winners))
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn load(&self, drawing_id: i64) -> AppResult<drawings::Model> {
        drawings::Entity::find_by_id(drawing_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::DrawingNotFound(drawing_id))
    }

    /// 生命周期迁移, 合法性由 DrawingStatus::can_transition_to 集中判定
    async fn transition_status(
        &self,
        drawing_id: i64,
        next: DrawingStatus,
    ) -> AppResult<drawings::Model> {
        let drawing = self.load(drawing_id).await?;
        if !drawing.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "Drawing {drawing_id} cannot go {} -> {next}",
                drawing.status
            )));
        }
        let mut am = drawing.into_active_model();
        am.status = Set(next);
        am.updated_at = Set(Some(Utc::now()));
        Ok(am.update(&self.pool).await?)
    }
}
