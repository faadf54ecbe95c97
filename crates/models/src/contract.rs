use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{project, timestamp_now};

pub mod status {
    pub const SIGNED: &str = "signed";
    pub const ACTIVE: &str = "active";
    pub const TERMINATED: &str = "terminated";
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub quotation_id: Option<Uuid>,
    pub number: String,
    pub amount: i64,
    pub status: String,
    pub signed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Project }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Project => Entity::belongs_to(project::Entity)
                .from(Column::ProjectId)
                .to(project::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Contract signed now for the given amount.
    pub fn signed(project_id: Uuid, quotation_id: Option<Uuid>, number: &str, amount: i64) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            project_id,
            quotation_id,
            number: number.to_string(),
            amount,
            status: status::SIGNED.to_string(),
            signed_at: Some(now),
            created_at: now,
        }
    }
}
