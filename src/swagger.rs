use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    DrawingStatus, DrawingType, FulfillmentStatus, FulfillmentType, TransactionType,
};
use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::ledger::apply_transaction,
        handlers::ledger::get_balance,
        handlers::ledger::get_transactions,
        handlers::drawing::create_drawing,
        handlers::drawing::list_drawings,
        handlers::drawing::get_drawing,
        handlers::drawing::schedule_drawing,
        handlers::drawing::open_drawing,
        handlers::drawing::cancel_drawing,
        handlers::drawing::close_drawing,
        handlers::drawing::add_prize,
        handlers::drawing::get_prizes,
        handlers::drawing::purchase_tickets,
        handlers::drawing::get_tickets,
        handlers::fulfillment::get_fulfillment,
        handlers::fulfillment::list_fulfillments,
        handlers::fulfillment::notify,
        handlers::fulfillment::confirm_address,
        handlers::fulfillment::ship,
        handlers::fulfillment::deliver,
        handlers::fulfillment::forfeit,
    ),
    components(
        schemas(
            ApplyTransactionRequest,
            PointTransactionResponse,
            BalanceResponse,
            TransactionType,
            CreateDrawingRequest,
            DrawingResponse,
            CloseDrawingResponse,
            DrawingType,
            DrawingStatus,
            CreatePrizeRequest,
            PrizeResponse,
            FulfillmentType,
            PurchaseTicketsRequest,
            PurchaseTicketsResponse,
            TicketResponse,
            ConfirmAddressRequest,
            ShipRequest,
            FulfillmentResponse,
            FulfillmentStatus,
        )
    ),
    tags(
        (name = "ledger", description = "积分账本"),
        (name = "drawings", description = "抽奖活动与开奖"),
        (name = "tickets", description = "抽奖券购买"),
        (name = "fulfillments", description = "中奖履约")
    )
)]
pub struct ApiDoc;

/// Swagger UI 路由配置
pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
