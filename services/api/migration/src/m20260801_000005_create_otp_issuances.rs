use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpIssuances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpIssuances::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtpIssuances::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(OtpIssuances::Purpose)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpIssuances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtpIssuances::Table, OtpIssuances::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Supports the rate-limit window count.
        manager
            .create_index(
                Index::create()
                    .table(OtpIssuances::Table)
                    .col(OtpIssuances::UserId)
                    .col(OtpIssuances::Purpose)
                    .col(OtpIssuances::CreatedAt)
                    .name("idx_otp_issuances_user_purpose_created")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpIssuances::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpIssuances {
    Table,
    Id,
    UserId,
    Purpose,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
