#![cfg(test)]
use sea_orm::{ActiveModelTrait, DatabaseConnection};
use migration::MigratorTrait;
use models::{contract, db::connect_in_memory, project, set_all};

/// Fresh in-memory SQLite database with every migration applied. Each call
/// returns an isolated database, so tests never see each other's rows.
pub async fn memory_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Insert a project and a signed contract for it, bypassing the stores.
pub async fn seed_contract(db: &DatabaseConnection) -> Result<contract::Model, anyhow::Error> {
    let p = project::Model::new("Seed project", "Seed customer", 1_000);
    set_all::<_, project::ActiveModel>(p.clone()).insert(db).await?;
    let c = contract::Model::signed(p.id, None, "C-SEED", 1_000);
    set_all::<_, contract::ActiveModel>(c.clone()).insert(db).await?;
    Ok(c)
}
