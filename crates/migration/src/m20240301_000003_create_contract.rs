//! Create `contract` table with FK to `project`.
//!
//! `quotation_id` is informational only; a contract may outlive its quotation.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contract::Table)
                    .if_not_exists()
                    .col(uuid(Contract::Id).primary_key())
                    .col(uuid(Contract::ProjectId).not_null())
                    .col(ColumnDef::new(Contract::QuotationId).uuid().null())
                    .col(string_len(Contract::Number, 64).unique_key().not_null())
                    .col(big_integer(Contract::Amount).not_null())
                    .col(string_len(Contract::Status, 32).not_null())
                    .col(
                        ColumnDef::new(Contract::SignedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp_with_time_zone(Contract::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_project")
                            .from(Contract::Table, Contract::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Contract::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Contract { Table, Id, ProjectId, QuotationId, Number, Amount, Status, SignedAt, CreatedAt }

#[derive(DeriveIden)]
enum Project { Table, Id }
