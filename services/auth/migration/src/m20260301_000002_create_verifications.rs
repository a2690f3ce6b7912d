use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Verifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Verifications::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Verifications::SubjectId).uuid().not_null())
                    .col(ColumnDef::new(Verifications::Purpose).string().not_null())
                    .col(ColumnDef::new(Verifications::Code).string().not_null())
                    .col(ColumnDef::new(Verifications::Payload).text())
                    .col(
                        ColumnDef::new(Verifications::Destination)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Verifications::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Verifications::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Verifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Verifications::Table, Verifications::SubjectId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One active record per (subject, purpose); dispatch upserts against this index.
        manager
            .create_index(
                Index::create()
                    .table(Verifications::Table)
                    .col(Verifications::SubjectId)
                    .col(Verifications::Purpose)
                    .unique()
                    .name("uq_verifications_subject_purpose")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Verifications::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Verifications {
    Table,
    Id,
    SubjectId,
    Purpose,
    Code,
    Payload,
    Destination,
    Attempts,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
