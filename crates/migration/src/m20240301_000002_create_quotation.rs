//! Create `quotation` table with FK to `project`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quotation::Table)
                    .if_not_exists()
                    .col(uuid(Quotation::Id).primary_key())
                    .col(uuid(Quotation::ProjectId).not_null())
                    .col(string_len(Quotation::Number, 64).unique_key().not_null())
                    .col(big_integer(Quotation::Amount).not_null())
                    .col(string_len(Quotation::Status, 32).not_null())
                    .col(
                        ColumnDef::new(Quotation::ValidUntil)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp_with_time_zone(Quotation::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quotation_project")
                            .from(Quotation::Table, Quotation::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Quotation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Quotation { Table, Id, ProjectId, Number, Amount, Status, ValidUntil, CreatedAt }

#[derive(DeriveIden)]
enum Project { Table, Id }
