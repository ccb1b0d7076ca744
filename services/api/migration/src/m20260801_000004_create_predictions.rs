use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Predictions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Predictions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Predictions::UserId).uuid().not_null())
                    .col(ColumnDef::new(Predictions::PatientId).uuid())
                    .col(
                        ColumnDef::new(Predictions::ModelKind)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Predictions::Label).string().not_null())
                    .col(ColumnDef::new(Predictions::Confidence).double().not_null())
                    .col(ColumnDef::new(Predictions::Entropy).double())
                    .col(ColumnDef::new(Predictions::Probabilities).json_binary().not_null())
                    .col(
                        ColumnDef::new(Predictions::ImageFilename)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Predictions::Notes).text())
                    .col(
                        ColumnDef::new(Predictions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Predictions::Table, Predictions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Predictions::Table, Predictions::PatientId)
                            .to(Patients::Table, Patients::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Predictions::Table)
                    .col(Predictions::UserId)
                    .col(Predictions::CreatedAt)
                    .name("idx_predictions_user_created")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Predictions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Predictions {
    Table,
    Id,
    UserId,
    PatientId,
    ModelKind,
    Label,
    Confidence,
    Entropy,
    Probabilities,
    ImageFilename,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}

#[derive(Iden)]
enum Patients {
    Table,
    Id,
}
