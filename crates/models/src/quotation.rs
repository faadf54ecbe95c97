use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{project, timestamp_now};

pub mod status {
    pub const DRAFT: &str = "draft";
    pub const SENT: &str = "sent";
    pub const ACCEPTED: &str = "accepted";
    pub const REJECTED: &str = "rejected";
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quotation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub number: String,
    pub amount: i64,
    pub status: String,
    pub valid_until: Option<DateTimeWithTimeZone>,
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
    pub fn new(project_id: Uuid, number: &str, amount: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            number: number.to_string(),
            amount,
            status: status::DRAFT.to_string(),
            valid_until: None,
            created_at: timestamp_now(),
        }
    }
}
