use crate::models::*;
use crate::services::LedgerService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/ledger/{user_id}/transactions",
    tag = "ledger",
    params(
        ("user_id" = i64, Path, description = "账户用户ID")
    ),
    request_body = ApplyTransactionRequest,
    responses(
        (status = 200, description = "记账成功", body = PointTransactionResponse),
        (status = 400, description = "余额不足或参数错误"),
        (status = 404, description = "用户不存在"),
        (status = 409, description = "并发冲突, 请重试")
    )
)]
/// 对账户应用一笔积分变更 (earn / spend / adjust / expire)
pub async fn apply_transaction(
    service: web::Data<LedgerService>,
    path: web::Path<i64>,
    body: web::Json<ApplyTransactionRequest>,
) -> Result<HttpResponse> {
    let user_id = path.into_inner();
    let request = body.into_inner();
    match service
        .apply(
            user_id,
            request.transaction_type,
            request.amount,
            request.reference_type,
            request.reference_id,
        )
        .await
    {
        Ok(txn) => {
            let data = PointTransactionResponse::from(txn);
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/ledger/{user_id}/balance",
    tag = "ledger",
    params(
        ("user_id" = i64, Path, description = "账户用户ID")
    ),
    responses(
        (status = 200, description = "获取余额成功", body = BalanceResponse),
        (status = 404, description = "用户不存在")
    )
)]
/// 获取账户当前余额与版本
pub async fn get_balance(
    service: web::Data<LedgerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match service.get_balance(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/ledger/{user_id}/transactions",
    tag = "ledger",
    params(
        ("user_id" = i64, Path, description = "账户用户ID"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    responses(
        (status = 200, description = "获取流水成功", body = PaginatedResponse<PointTransactionResponse>)
    )
)]
/// 分页获取账户积分流水（倒序）
pub async fn get_transactions(
    service: web::Data<LedgerService>,
    path: web::Path<i64>,
    query: web::Query<TransactionQuery>,
) -> Result<HttpResponse> {
    match service
        .list_transactions(path.into_inner(), &query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn ledger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/ledger")
            .route(
                "/{user_id}/transactions",
                web::post().to(apply_transaction),
            )
            .route("/{user_id}/transactions", web::get().to(get_transactions))
            .route("/{user_id}/balance", web::get().to(get_balance)),
    );
}
