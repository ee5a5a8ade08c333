use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Restaurants {
    Table,
    Id,
    Name,
    Latitude,
    Longitude,
    GeofenceRadiusM,
    UtcOffsetMinutes,
    LunchStart,
    LunchEnd,
    DinnerStart,
    DinnerEnd,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    RestaurantId,
    Name,
    Description,
    Probability,
    MaxPerDay,
    MaxPerWeek,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Fingerprints {
    Table,
    Id,
    Hash,
    RestaurantId,
    CreatedAt,
    ExpiresAt,
    LastPlayedOn,
    LastPlayedWindow,
    NotifyEmail,
    NotifyPhone,
}

#[derive(DeriveIden)]
enum DailyPrizePools {
    Table,
    Id,
    PrizeId,
    RestaurantId,
    PoolDate,
    Allocated,
    Claimed,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PrizeClaims {
    Table,
    Id,
    Code,
    PrizeId,
    PoolId,
    FingerprintId,
    RestaurantId,
    Status,
    IssuedAt,
    ExpiresAt,
    RedeemedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Initial schema for the review-and-win engine.
///
/// The two uniqueness guarantees the services rely on:
/// - fingerprints unique per (hash, restaurant_id)
/// - daily_prize_pools unique per (prize_id, pool_date)
/// plus the globally unique prize_claims.code.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("service_window"))
                    .values(vec![Alias::new("lunch"), Alias::new("dinner")])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("claim_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("claimed"),
                        Alias::new("expired"),
                    ])
                    .to_owned(),
            )
            .await?;

        // restaurant directory snapshot consumed by the gate
        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restaurants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Restaurants::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Restaurants::Latitude).double().not_null())
                    .col(ColumnDef::new(Restaurants::Longitude).double().not_null())
                    .col(
                        ColumnDef::new(Restaurants::GeofenceRadiusM)
                            .double()
                            .not_null()
                            .default(100.0),
                    )
                    .col(
                        ColumnDef::new(Restaurants::UtcOffsetMinutes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Restaurants::LunchStart).time().not_null())
                    .col(ColumnDef::new(Restaurants::LunchEnd).time().not_null())
                    .col(ColumnDef::new(Restaurants::DinnerStart).time().not_null())
                    .col(ColumnDef::new(Restaurants::DinnerEnd).time().not_null())
                    .col(
                        ColumnDef::new(Restaurants::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Restaurants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Restaurants::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

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
                    .col(
                        ColumnDef::new(Prizes::RestaurantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Prizes::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Prizes::Description).text().null())
                    .col(ColumnDef::new(Prizes::Probability).double().not_null())
                    .col(ColumnDef::new(Prizes::MaxPerDay).integer().null())
                    .col(ColumnDef::new(Prizes::MaxPerWeek).integer().null())
                    .col(
                        ColumnDef::new(Prizes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Prizes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_restaurant")
                    .table(Prizes::Table)
                    .col(Prizes::RestaurantId)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Prizes::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_prize_restaurant")
                            .from_tbl(Prizes::Table)
                            .from_col(Prizes::RestaurantId)
                            .to_tbl(Restaurants::Table)
                            .to_col(Restaurants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Fingerprints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Fingerprints::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Fingerprints::Hash).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Fingerprints::RestaurantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Fingerprints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Fingerprints::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Fingerprints::LastPlayedOn).date().null())
                    .col(
                        ColumnDef::new(Fingerprints::LastPlayedWindow)
                            .custom(Alias::new("service_window"))
                            .null(),
                    )
                    .col(ColumnDef::new(Fingerprints::NotifyEmail).string_len(255).null())
                    .col(ColumnDef::new(Fingerprints::NotifyPhone).string_len(64).null())
                    .to_owned(),
            )
            .await?;

        // one identity per (device hash, restaurant)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fingerprints_hash_restaurant_unique")
                    .table(Fingerprints::Table)
                    .col(Fingerprints::Hash)
                    .col(Fingerprints::RestaurantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Fingerprints::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_fingerprint_restaurant")
                            .from_tbl(Fingerprints::Table)
                            .from_col(Fingerprints::RestaurantId)
                            .to_tbl(Restaurants::Table)
                            .to_col(Restaurants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DailyPrizePools::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DailyPrizePools::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DailyPrizePools::PrizeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyPrizePools::RestaurantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DailyPrizePools::PoolDate).date().not_null())
                    .col(
                        ColumnDef::new(DailyPrizePools::Allocated)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DailyPrizePools::Claimed)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyPrizePools::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // lazily provisioned, at most one pool per (prize, day)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_prize_pools_prize_date_unique")
                    .table(DailyPrizePools::Table)
                    .col(DailyPrizePools::PrizeId)
                    .col(DailyPrizePools::PoolDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_daily_prize_pools_restaurant_date")
                    .table(DailyPrizePools::Table)
                    .col(DailyPrizePools::RestaurantId)
                    .col(DailyPrizePools::PoolDate)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(DailyPrizePools::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_daily_prize_pool_prize")
                            .from_tbl(DailyPrizePools::Table)
                            .from_col(DailyPrizePools::PrizeId)
                            .to_tbl(Prizes::Table)
                            .to_col(Prizes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PrizeClaims::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrizeClaims::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PrizeClaims::Code).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PrizeClaims::PrizeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PrizeClaims::PoolId).big_integer().not_null())
                    .col(
                        ColumnDef::new(PrizeClaims::FingerprintId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizeClaims::RestaurantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizeClaims::Status)
                            .custom(Alias::new("claim_status"))
                            .not_null()
                            .default(Expr::cust("'pending'::claim_status")),
                    )
                    .col(
                        ColumnDef::new(PrizeClaims::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizeClaims::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizeClaims::RedeemedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // redemption codes are unique system-wide
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prize_claims_code_unique")
                    .table(PrizeClaims::Table)
                    .col(PrizeClaims::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prize_claims_fingerprint")
                    .table(PrizeClaims::Table)
                    .col(PrizeClaims::FingerprintId)
                    .to_owned(),
            )
            .await?;

        // the cleanup sweep scans pending claims by expiry
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prize_claims_status_expires")
                    .table(PrizeClaims::Table)
                    .col(PrizeClaims::Status)
                    .col(PrizeClaims::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(PrizeClaims::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_prize_claim_prize")
                            .from_tbl(PrizeClaims::Table)
                            .from_col(PrizeClaims::PrizeId)
                            .to_tbl(Prizes::Table)
                            .to_col(Prizes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(PrizeClaims::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_prize_claim_pool")
                            .from_tbl(PrizeClaims::Table)
                            .from_col(PrizeClaims::PoolId)
                            .to_tbl(DailyPrizePools::Table)
                            .to_col(DailyPrizePools::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // drop order: claims -> pools -> fingerprints -> prizes -> restaurants
        manager
            .drop_table(Table::drop().if_exists().table(PrizeClaims::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(DailyPrizePools::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Fingerprints::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Prizes::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Restaurants::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_type(Type::drop().name(Alias::new("claim_status")).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("service_window")).to_owned())
            .await?;

        Ok(())
    }
}
