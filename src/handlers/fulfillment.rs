use crate::models::*;
use crate::services::FulfillmentService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/fulfillments/{id}",
    tag = "fulfillments",
    params(("id" = i64, Path, description = "履约ID")),
    responses(
        (status = 200, description = "获取成功", body = FulfillmentResponse),
        (status = 404, description = "履约记录不存在")
    )
)]
pub async fn get_fulfillment(
    service: web::Data<FulfillmentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/fulfillments",
    tag = "fulfillments",
    params(
        ("user_id" = i64, Query, description = "用户ID"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    responses(
        (status = 200, description = "获取列表成功", body = PaginatedResponse<FulfillmentResponse>)
    )
)]
/// 用户的履约记录（分页, 倒序）
pub async fn list_fulfillments(
    service: web::Data<FulfillmentService>,
    query: web::Query<FulfillmentQuery>,
) -> Result<HttpResponse> {
    match service.list_by_user(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/fulfillments/{id}/notify",
    tag = "fulfillments",
    params(("id" = i64, Path, description = "履约ID")),
    responses(
        (status = 200, description = "已通知中奖者", body = FulfillmentResponse),
        (status = 400, description = "非法状态迁移"),
        (status = 409, description = "履约已终结")
    )
)]
/// pending -> winner_notified
pub async fn notify(
    service: web::Data<FulfillmentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.notify(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/fulfillments/{id}/address",
    tag = "fulfillments",
    params(("id" = i64, Path, description = "履约ID")),
    request_body = ConfirmAddressRequest,
    responses(
        (status = 200, description = "地址已记录 (confirmed 或 invalid)", body = FulfillmentResponse),
        (status = 400, description = "非法状态迁移"),
        (status = 409, description = "履约已终结")
    )
)]
/// winner_notified -> address_confirmed | address_invalid
pub async fn confirm_address(
    service: web::Data<FulfillmentService>,
    path: web::Path<i64>,
    body: web::Json<ConfirmAddressRequest>,
) -> Result<HttpResponse> {
    match service
        .confirm_address(path.into_inner(), body.into_inner())
        .await
    {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/fulfillments/{id}/ship",
    tag = "fulfillments",
    params(("id" = i64, Path, description = "履约ID")),
    request_body = ShipRequest,
    responses(
        (status = 200, description = "已发货", body = FulfillmentResponse),
        (status = 400, description = "缺少运单信息或非法状态迁移"),
        (status = 409, description = "履约已终结")
    )
)]
/// address_confirmed -> shipped
pub async fn ship(
    service: web::Data<FulfillmentService>,
    path: web::Path<i64>,
    body: web::Json<ShipRequest>,
) -> Result<HttpResponse> {
    match service.ship(path.into_inner(), body.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/fulfillments/{id}/deliver",
    tag = "fulfillments",
    params(("id" = i64, Path, description = "履约ID")),
    responses(
        (status = 200, description = "已签收 (终态)", body = FulfillmentResponse),
        (status = 400, description = "非法状态迁移"),
        (status = 409, description = "履约已终结")
    )
)]
/// shipped -> delivered
pub async fn deliver(
    service: web::Data<FulfillmentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.deliver(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/fulfillments/{id}/forfeit",
    tag = "fulfillments",
    params(("id" = i64, Path, description = "履约ID")),
    responses(
        (status = 200, description = "已没收 (终态)", body = FulfillmentResponse),
        (status = 409, description = "履约已终结")
    )
)]
/// 任意非终态 -> forfeited (管理操作)
pub async fn forfeit(
    service: web::Data<FulfillmentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.forfeit(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn fulfillment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/fulfillments")
            .route("", web::get().to(list_fulfillments))
            .route("/{id}", web::get().to(get_fulfillment))
            .route("/{id}/notify", web::post().to(notify))
            .route("/{id}/address", web::post().to(confirm_address))
            .route("/{id}/ship", web::post().to(ship))
            .route("/{id}/deliver", web::post().to(deliver))
            .route("/{id}/forfeit", web::post().to(forfeit)),
    );
}
