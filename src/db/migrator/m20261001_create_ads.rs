use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ads::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ads::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Ads::Title).string().not_null())
                    .col(ColumnDef::new(Ads::StartAtMs).big_integer().not_null())
                    .col(ColumnDef::new(Ads::EndAtMs).big_integer().not_null())
                    .col(ColumnDef::new(Ads::AgeStart).integer().null())
                    .col(ColumnDef::new(Ads::AgeEnd).integer().null())
                    .col(ColumnDef::new(Ads::Genders).text().null())
                    .col(ColumnDef::new(Ads::Countries).text().null())
                    .col(ColumnDef::new(Ads::Platforms).text().null())
                    .col(
                        ColumnDef::new(Ads::CreatedAt)
                            .string()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ads_end_at")
                    .table(Ads::Table)
                    .col(Ads::EndAtMs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ads_window")
                    .table(Ads::Table)
                    .col(Ads::StartAtMs)
                    .col(Ads::EndAtMs)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ads::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Ads {
    Table,
    Id,
    Title,
    StartAtMs,
    EndAtMs,
    AgeStart,
    AgeEnd,
    Genders,
    Countries,
    Platforms,
    CreatedAt,
}
