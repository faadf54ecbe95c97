use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Project: list filters by status and customer
        manager
            .create_index(
                Index::create()
                    .name("idx_project_status")
                    .table(Project::Table)
                    .col(Project::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_project_customer")
                    .table(Project::Table)
                    .col(Project::Customer)
                    .to_owned(),
            )
            .await?;

        // Quotation / Contract: lookups by project
        manager
            .create_index(
                Index::create()
                    .name("idx_quotation_project")
                    .table(Quotation::Table)
                    .col(Quotation::ProjectId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_contract_project")
                    .table(Contract::Table)
                    .col(Contract::ProjectId)
                    .to_owned(),
            )
            .await?;

        // MaintenanceRequest: open requests per contract
        manager
            .create_index(
                Index::create()
                    .name("idx_maintenance_request_contract_status")
                    .table(MaintenanceRequest::Table)
                    .col(MaintenanceRequest::ContractId)
                    .col(MaintenanceRequest::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_maintenance_request_contract_status").table(MaintenanceRequest::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_contract_project").table(Contract::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_quotation_project").table(Quotation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_project_customer").table(Project::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_project_status").table(Project::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Project { Table, Status, Customer }

#[derive(DeriveIden)]
enum Quotation { Table, ProjectId }

#[derive(DeriveIden)]
enum Contract { Table, ProjectId }

#[derive(DeriveIden)]
enum MaintenanceRequest { Table, ContractId, Status }
