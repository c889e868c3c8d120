use sea_orm_migration::prelude::*;

/// Users (积分账户宿主行)
/// - points_balance: 当前积分余额, 永远 >= 0
/// - balance_version: 乐观锁版本号, 每次成功变更 +1
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    PointsBalance,
    BalanceVersion,
    CreatedAt,
    UpdatedAt,
}

/// Point Transactions (积分流水, 不可变)
/// - amount 永远为正, 方向由 transaction_type 决定
/// - balance_after 为本笔交易后的余额快照
#[derive(DeriveIden)]
enum PointTransactions {
    Table,
    Id,
    UserId,
    TransactionType,
    Amount,
    BalanceAfter,
    ReferenceType,
    ReferenceId,
    CreatedAt,
}

/// Drawings (抽奖活动)
#[derive(DeriveIden)]
enum Drawings {
    Table,
    Id,
    DrawingType,
    TicketCostPoints,
    DrawingTime,
    TicketSalesClose,
    Status,
    TotalTickets,
    RandomSeed,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}

/// Tickets (抽奖券)
/// - ticket_number 开奖前为 NULL, 开奖时按创建顺序分配 1..N
#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    DrawingId,
    UserId,
    TicketNumber,
    PurchaseTransactionId,
    IsWinner,
    PrizeId,
    CreatedAt,
}

/// Prizes (奖品配置)
/// - rank 越小优先级越高 (1 = 最佳奖品)
#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    DrawingId,
    SponsorId,
    Name,
    Rank,
    Quantity,
    FulfillmentType,
    CreatedAt,
}

/// Prize Fulfillments (中奖履约记录, 与中奖券 1:1)
#[derive(DeriveIden)]
enum PrizeFulfillments {
    Table,
    Id,
    TicketId,
    PrizeId,
    UserId,
    Status,
    AddressLine1,
    AddressLine2,
    City,
    State,
    PostalCode,
    Country,
    TrackingNumber,
    Carrier,
    NotifiedAt,
    AddressConfirmedAt,
    ShippedAt,
    DeliveredAt,
    ForfeitAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 用户表 (积分账户)
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(
                        ColumnDef::new(Users::PointsBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::BalanceVersion)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 积分流水表
        manager
            .create_table(
                Table::create()
                    .table(PointTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::BalanceAfter)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointTransactions::ReferenceType).string())
                    .col(ColumnDef::new(PointTransactions::ReferenceId).big_integer())
                    .col(
                        ColumnDef::new(PointTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_point_transactions_user_created")
                    .table(PointTransactions::Table)
                    .col(PointTransactions::UserId)
                    .col(PointTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 抽奖活动表
        manager
            .create_table(
                Table::create()
                    .table(Drawings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Drawings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Drawings::DrawingType).string().not_null())
                    .col(
                        ColumnDef::new(Drawings::TicketCostPoints)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Drawings::DrawingTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Drawings::TicketSalesClose)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Drawings::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(
                        ColumnDef::new(Drawings::TotalTickets)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Drawings::RandomSeed).string())
                    .col(ColumnDef::new(Drawings::CompletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Drawings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Drawings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 抽奖券表
        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::DrawingId).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Tickets::TicketNumber).big_integer())
                    .col(
                        ColumnDef::new(Tickets::PurchaseTransactionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tickets::IsWinner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tickets::PrizeId).big_integer())
                    .col(
                        ColumnDef::new(Tickets::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_drawing")
                    .table(Tickets::Table)
                    .col(Tickets::DrawingId)
                    .to_owned(),
            )
            .await?;

        // 同一抽奖内券号唯一 (NULL 不参与唯一性约束)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_drawing_number_unique")
                    .table(Tickets::Table)
                    .col(Tickets::DrawingId)
                    .col(Tickets::TicketNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 奖品表
        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::DrawingId).big_integer().not_null())
                    .col(ColumnDef::new(Prizes::SponsorId).big_integer())
                    .col(ColumnDef::new(Prizes::Name).string().not_null())
                    .col(ColumnDef::new(Prizes::Rank).integer().not_null())
                    .col(ColumnDef::new(Prizes::Quantity).integer().not_null())
                    .col(ColumnDef::new(Prizes::FulfillmentType).string().not_null())
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_drawing_rank")
                    .table(Prizes::Table)
                    .col(Prizes::DrawingId)
                    .col(Prizes::Rank)
                    .to_owned(),
            )
            .await?;

        // 履约记录表
        manager
            .create_table(
                Table::create()
                    .table(PrizeFulfillments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrizeFulfillments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrizeFulfillments::TicketId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizeFulfillments::PrizeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizeFulfillments::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizeFulfillments::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(PrizeFulfillments::AddressLine1).string())
                    .col(ColumnDef::new(PrizeFulfillments::AddressLine2).string())
                    .col(ColumnDef::new(PrizeFulfillments::City).string())
                    .col(ColumnDef::new(PrizeFulfillments::State).string())
                    .col(ColumnDef::new(PrizeFulfillments::PostalCode).string())
                    .col(ColumnDef::new(PrizeFulfillments::Country).string())
                    .col(ColumnDef::new(PrizeFulfillments::TrackingNumber).string())
                    .col(ColumnDef::new(PrizeFulfillments::Carrier).string())
                    .col(ColumnDef::new(PrizeFulfillments::NotifiedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PrizeFulfillments::AddressConfirmedAt)
                            .timestamp_with_time_zone(),
                    )
                    .col(ColumnDef::new(PrizeFulfillments::ShippedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(PrizeFulfillments::DeliveredAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(PrizeFulfillments::ForfeitAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(PrizeFulfillments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PrizeFulfillments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 一张中奖券只允许一条履约记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prize_fulfillments_ticket_unique")
                    .table(PrizeFulfillments::Table)
                    .col(PrizeFulfillments::TicketId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prize_fulfillments_user")
                    .table(PrizeFulfillments::Table)
                    .col(PrizeFulfillments::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PrizeFulfillments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Prizes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Drawings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
