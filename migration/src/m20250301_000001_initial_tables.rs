use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Owner::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Owner::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Owner::Plan).string().not_null())
                    .col(ColumnDef::new(Owner::LinkLimit).integer().not_null())
                    .col(
                        ColumnDef::new(Owner::ActiveLinkCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Owner::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Link::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Link::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Link::OwnerId).string().not_null())
                    .col(ColumnDef::new(Link::Token).string().not_null().unique_key())
                    .col(ColumnDef::new(Link::Destination).text().not_null())
                    .col(ColumnDef::new(Link::Title).string().null())
                    .col(ColumnDef::new(Link::Description).text().null())
                    .col(
                        ColumnDef::new(Link::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Link::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Link::MaxClicks).integer().null())
                    .col(
                        ColumnDef::new(Link::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Link::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_links_owner")
                            .from(Link::Table, Link::OwnerId)
                            .to(Owner::Table, Owner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // token 的唯一索引是冲突检测的权威来源
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_token")
                    .table(Link::Table)
                    .col(Link::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_owner_id")
                    .table(Link::Table)
                    .col(Link::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_created_at")
                    .table(Link::Table)
                    .col(Link::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Click::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Click::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Click::LinkId).string().not_null())
                    .col(
                        ColumnDef::new(Click::OccurredAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Click::IpAddress).string().null())
                    .col(ColumnDef::new(Click::Country).string().null())
                    .col(ColumnDef::new(Click::City).string().null())
                    .col(ColumnDef::new(Click::Referrer).text().null())
                    .col(ColumnDef::new(Click::UserAgent).text().null())
                    .col(ColumnDef::new(Click::DeviceType).string().null())
                    .col(ColumnDef::new(Click::Browser).string().null())
                    .col(ColumnDef::new(Click::Os).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_clicks_link")
                            .from(Click::Table, Click::LinkId)
                            .to(Link::Table, Link::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_link_id")
                    .table(Click::Table)
                    .col(Click::LinkId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_clicks_occurred_at")
                    .table(Click::Table)
                    .col(Click::OccurredAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Click::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Link::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Owner::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Owner {
    #[sea_orm(iden = "owners")]
    Table,
    Id,
    Plan,
    LinkLimit,
    ActiveLinkCount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Link {
    #[sea_orm(iden = "links")]
    Table,
    Id,
    OwnerId,
    Token,
    Destination,
    Title,
    Description,
    CreatedAt,
    ExpiresAt,
    MaxClicks,
    ClickCount,
    IsActive,
}

#[derive(DeriveIden)]
enum Click {
    #[sea_orm(iden = "clicks")]
    Table,
    Id,
    LinkId,
    OccurredAt,
    IpAddress,
    Country,
    City,
    Referrer,
    UserAgent,
    DeviceType,
    Browser,
    Os,
}
