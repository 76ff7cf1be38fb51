use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_catalog_tables::Migration),
            Box::new(m20240601_000002_create_party_tables::Migration),
            Box::new(m20240601_000003_create_discount_tables::Migration),
            Box::new(m20240601_000004_create_order_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240601_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Products::Name).string().not_null())
                        .col(ColumnDef::new(Products::Description).string())
                        .col(ColumnDef::new(Products::Unit).string())
                        .col(
                            ColumnDef::new(Products::Price)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::IsVariable)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductVariations::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductVariations::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductVariations::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(ProductVariations::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(ProductVariations::Price)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_variations_product")
                                .from(ProductVariations::Table, ProductVariations::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductVariations::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        Name,
        Description,
        Unit,
        Price,
        IsVariable,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ProductVariations {
        Table,
        Id,
        ProductId,
        Sku,
        Price,
    }
}

mod m20240601_000002_create_party_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_party_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Companies::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Companies::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Companies::Name).string().not_null())
                        .col(
                            ColumnDef::new(Companies::Nit)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Companies::Email).string().not_null())
                        .col(ColumnDef::new(Companies::Phone).string())
                        .col(
                            ColumnDef::new(Companies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Addresses::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Addresses::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Addresses::UserId).uuid())
                        .col(ColumnDef::new(Addresses::Street).string().not_null())
                        .col(ColumnDef::new(Addresses::City).string().not_null())
                        .col(ColumnDef::new(Addresses::State).string().not_null())
                        .col(ColumnDef::new(Addresses::PostalCode).string().not_null())
                        .col(ColumnDef::new(Addresses::Country).string().not_null())
                        .col(
                            ColumnDef::new(Addresses::IsDefault)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_addresses_lookup")
                        .table(Addresses::Table)
                        .col(Addresses::Street)
                        .col(Addresses::City)
                        .col(Addresses::PostalCode)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Addresses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Companies::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Companies {
        Table,
        Id,
        Name,
        Nit,
        Email,
        Phone,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Addresses {
        Table,
        Id,
        UserId,
        Street,
        City,
        State,
        PostalCode,
        Country,
        IsDefault,
    }
}

mod m20240601_000003_create_discount_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_discount_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Discounts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Discounts::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Discounts::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Discounts::DiscountType)
                                .string_len(16)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Discounts::Value)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Discounts::StartDate).date().not_null())
                        .col(ColumnDef::new(Discounts::EndDate).date().not_null())
                        .col(ColumnDef::new(Discounts::MaxUsesTotal).integer())
                        .col(ColumnDef::new(Discounts::MaxUsesPerUser).integer())
                        .col(
                            ColumnDef::new(Discounts::TimesUsed)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Discounts::ApplicableToTransport)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Discounts::Status).string_len(16).not_null())
                        .col(
                            ColumnDef::new(Discounts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Discounts::UpdatedAt)
                                .timestamp_with_time_zone(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(UserDiscounts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserDiscounts::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(UserDiscounts::Email).string().not_null())
                        .col(ColumnDef::new(UserDiscounts::DiscountId).uuid().not_null())
                        .col(
                            ColumnDef::new(UserDiscounts::TimesUsed)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(UserDiscounts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_discounts_discount")
                                .from(UserDiscounts::Table, UserDiscounts::DiscountId)
                                .to(Discounts::Table, Discounts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // One counter row per (email, discount); the index also turns a
            // concurrent first-redemption race into a constraint violation.
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_user_discounts_email_discount")
                        .table(UserDiscounts::Table)
                        .col(UserDiscounts::Email)
                        .col(UserDiscounts::DiscountId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserDiscounts::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Discounts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Discounts {
        Table,
        Id,
        Code,
        DiscountType,
        Value,
        StartDate,
        EndDate,
        MaxUsesTotal,
        MaxUsesPerUser,
        TimesUsed,
        ApplicableToTransport,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum UserDiscounts {
        Table,
        Id,
        Email,
        DiscountId,
        TimesUsed,
        CreatedAt,
    }
}

mod m20240601_000004_create_order_tables {
    use sea_orm_migration::prelude::*;

    use super::m20240601_000001_create_catalog_tables::{ProductVariations, Products};
    use super::m20240601_000002_create_party_tables::{Addresses, Companies};
    use super::m20240601_000003_create_discount_tables::Discounts;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Orders::CustomOrderId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Orders::Firstname).string())
                        .col(ColumnDef::new(Orders::Lastname).string())
                        .col(ColumnDef::new(Orders::Email).string().not_null())
                        .col(ColumnDef::new(Orders::Phone).string().not_null())
                        .col(ColumnDef::new(Orders::DocumentType).string())
                        .col(ColumnDef::new(Orders::DocumentNumber).string())
                        .col(ColumnDef::new(Orders::CompanyId).uuid())
                        .col(ColumnDef::new(Orders::CompanyName).string())
                        .col(ColumnDef::new(Orders::AddressId).uuid().not_null())
                        .col(ColumnDef::new(Orders::DeliveryDate).date().not_null())
                        .col(ColumnDef::new(Orders::DeliverySlot).time().not_null())
                        .col(
                            ColumnDef::new(Orders::Subtotal)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::TransportCost)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::DiscountId).uuid())
                        .col(
                            ColumnDef::new(Orders::DiscountValue)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::DiscountOnTransport)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::Tax).decimal_len(10, 2))
                        .col(ColumnDef::new(Orders::Total).decimal_len(10, 2).not_null())
                        .col(
                            ColumnDef::new(Orders::PaymentStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::ShippingStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::OrderStatus)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::IsTemporary)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Orders::PaymentMethod)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp_with_time_zone())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_address")
                                .from(Orders::Table, Orders::AddressId)
                                .to(Addresses::Table, Addresses::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_company")
                                .from(Orders::Table, Orders::CompanyId)
                                .to(Companies::Table, Companies::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_discount")
                                .from(Orders::Table, Orders::DiscountId)
                                .to(Discounts::Table, Discounts::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_order_status")
                        .table(Orders::Table)
                        .col(Orders::OrderStatus)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ProductId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::VariationId).uuid())
                        .col(ColumnDef::new(OrderItems::ProductName).string().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::Subtotal)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::Tax).decimal_len(10, 2))
                        .col(
                            ColumnDef::new(OrderItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_product")
                                .from(OrderItems::Table, OrderItems::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_variation")
                                .from(OrderItems::Table, OrderItems::VariationId)
                                .to(ProductVariations::Table, ProductVariations::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderStatusLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderStatusLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderStatusLogs::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrderStatusLogs::Field)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderStatusLogs::PreviousValue)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderStatusLogs::NewValue).string().not_null())
                        .col(
                            ColumnDef::new(OrderStatusLogs::ChangedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_status_logs_order")
                                .from(OrderStatusLogs::Table, OrderStatusLogs::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_status_logs_order_id")
                        .table(OrderStatusLogs::Table)
                        .col(OrderStatusLogs::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_status_logs_changed_at")
                        .table(OrderStatusLogs::Table)
                        .col(OrderStatusLogs::ChangedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderStatusLogs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        CustomOrderId,
        Firstname,
        Lastname,
        Email,
        Phone,
        DocumentType,
        DocumentNumber,
        CompanyId,
        CompanyName,
        AddressId,
        DeliveryDate,
        DeliverySlot,
        Subtotal,
        TransportCost,
        DiscountId,
        DiscountValue,
        DiscountOnTransport,
        Tax,
        Total,
        PaymentStatus,
        ShippingStatus,
        OrderStatus,
        IsTemporary,
        PaymentMethod,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ProductId,
        VariationId,
        ProductName,
        Quantity,
        UnitPrice,
        Subtotal,
        Tax,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderStatusLogs {
        Table,
        Id,
        OrderId,
        Field,
        PreviousValue,
        NewValue,
        ChangedAt,
    }
}
