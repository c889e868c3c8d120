use crate::models::*;
use crate::services::{DrawingService, TicketService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/drawings",
    tag = "drawings",
    request_body = CreateDrawingRequest,
    responses(
        (status = 200, description = "创建成功", body = DrawingResponse),
        (status = 400, description = "参数错误")
    )
)]
/// 创建抽奖活动 (draft 状态)
pub async fn create_drawing(
    service: web::Data<DrawingService>,
    body: web::Json<CreateDrawingRequest>,
) -> Result<HttpResponse> {
    match service.create(body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/drawings",
    tag = "drawings",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)"),
        ("status" = Option<String>, Query, description = "按状态过滤")
    ),
    responses(
        (status = 200, description = "获取列表成功", body = PaginatedResponse<DrawingResponse>)
    )
)]
/// 抽奖活动列表（分页）
pub async fn list_drawings(
    service: web::Data<DrawingService>,
    query: web::Query<DrawingQuery>,
) -> Result<HttpResponse> {
    match service.list(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/drawings/{id}",
    tag = "drawings",
    params(("id" = i64, Path, description = "抽奖ID")),
    responses(
        (status = 200, description = "获取成功", body = DrawingResponse),
        (status = 404, description = "抽奖不存在")
    )
)]
pub async fn get_drawing(
    service: web::Data<DrawingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/drawings/{id}/schedule",
    tag = "drawings",
    params(("id" = i64, Path, description = "抽奖ID")),
    responses(
        (status = 200, description = "已排期", body = DrawingResponse),
        (status = 400, description = "非法状态迁移")
    )
)]
/// draft -> scheduled
pub async fn schedule_drawing(
    service: web::Data<DrawingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.schedule(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/drawings/{id}/open",
    tag = "drawings",
    params(("id" = i64, Path, description = "抽奖ID")),
    responses(
        (status = 200, description = "已开放售票", body = DrawingResponse),
        (status = 400, description = "非法状态迁移")
    )
)]
/// scheduled -> open
pub async fn open_drawing(
    service: web::Data<DrawingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.open(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/drawings/{id}/cancel",
    tag = "drawings",
    params(("id" = i64, Path, description = "抽奖ID")),
    responses(
        (status = 200, description = "已取消", body = DrawingResponse),
        (status = 400, description = "非法状态迁移")
    )
)]
/// 任意未完成状态 -> cancelled
pub async fn cancel_drawing(
    service: web::Data<DrawingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.cancel(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/drawings/{id}/close",
    tag = "drawings",
    params(("id" = i64, Path, description = "抽奖ID")),
    responses(
        (status = 200, description = "开奖完成", body = CloseDrawingResponse),
        (status = 400, description = "未到开奖条件"),
        (status = 404, description = "抽奖不存在")
    )
)]
/// 开奖: 分配券号、按存档 seed 选取中奖者、创建履约记录
pub async fn close_drawing(
    service: web::Data<DrawingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.close(path.into_inner()).await {
        Ok((drawing, winners)) => {
            let data = CloseDrawingResponse {
                drawing: drawing.into(),
                winning_tickets: winners.into_iter().map(Into::into).collect(),
            };
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/drawings/{id}/prizes",
    tag = "drawings",
    params(("id" = i64, Path, description = "抽奖ID")),
    request_body = CreatePrizeRequest,
    responses(
        (status = 200, description = "奖品已添加", body = PrizeResponse),
        (status = 400, description = "抽奖已关闭或参数错误")
    )
)]
/// 添加奖品（开奖前）
pub async fn add_prize(
    service: web::Data<DrawingService>,
    path: web::Path<i64>,
    body: web::Json<CreatePrizeRequest>,
) -> Result<HttpResponse> {
    match service.add_prize(path.into_inner(), body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/drawings/{id}/prizes",
    tag = "drawings",
    params(("id" = i64, Path, description = "抽奖ID")),
    responses(
        (status = 200, description = "获取奖品列表成功", body = [PrizeResponse])
    )
)]
/// 奖品列表（rank 升序）
pub async fn get_prizes(
    service: web::Data<DrawingService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.list_prizes(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/drawings/{id}/tickets",
    tag = "tickets",
    params(("id" = i64, Path, description = "抽奖ID")),
    request_body = PurchaseTicketsRequest,
    responses(
        (status = 200, description = "购票成功", body = PurchaseTicketsResponse),
        (status = 400, description = "余额不足或抽奖未开放"),
        (status = 409, description = "并发冲突, 请重试")
    )
)]
/// 购买抽奖券: 扣积分、发券、计数递增在同一事务内完成
pub async fn purchase_tickets(
    service: web::Data<TicketService>,
    path: web::Path<i64>,
    body: web::Json<PurchaseTicketsRequest>,
) -> Result<HttpResponse> {
    let drawing_id = path.into_inner();
    let request = body.into_inner();
    match service
        .purchase(drawing_id, request.user_id, request.quantity)
        .await
    {
        Ok((tickets, transaction)) => {
            let data = PurchaseTicketsResponse {
                tickets: tickets.into_iter().map(Into::into).collect(),
                transaction: transaction.into(),
            };
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/drawings/{id}/tickets",
    tag = "tickets",
    params(
        ("id" = i64, Path, description = "抽奖ID"),
        ("user_id" = i64, Query, description = "用户ID"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    responses(
        (status = 200, description = "获取券列表成功", body = PaginatedResponse<TicketResponse>)
    )
)]
/// 用户在该抽奖下的券（分页）
pub async fn get_tickets(
    service: web::Data<TicketService>,
    path: web::Path<i64>,
    query: web::Query<TicketQuery>,
) -> Result<HttpResponse> {
    match service
        .list_user_tickets(path.into_inner(), &query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn drawing_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/drawings")
            .route("", web::post().to(create_drawing))
            .route("", web::get().to(list_drawings))
            .route("/{id}", web::get().to(get_drawing))
            .route("/{id}/schedule", web::post().to(schedule_drawing))
            .route("/{id}/open", web::post().to(open_drawing))
            .route("/{id}/cancel", web::post().to(cancel_drawing))
            .route("/{id}/close", web::post().to(close_drawing))
            .route("/{id}/prizes", web::post().to(add_prize))
            .route("/{id}/prizes", web::get().to(get_prizes))
            .route("/{id}/tickets", web::post().to(purchase_tickets))
            .route("/{id}/tickets", web::get().to(get_tickets)),
    );
}
