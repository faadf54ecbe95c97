use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{contract, timestamp_now};

pub mod status {
    pub const OPEN: &str = "open";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const CLOSED: &str = "closed";
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenance_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contract_id: Uuid,
    pub title: String,
    pub category: String,
    pub priority: i32,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub closed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Contract }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Contract => Entity::belongs_to(contract::Entity)
                .from(Column::ContractId)
                .to(contract::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn open(contract_id: Uuid, title: &str, category: &str, priority: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id,
            title: title.to_string(),
            category: category.to_string(),
            priority,
            status: status::OPEN.to_string(),
            created_at: timestamp_now(),
            closed_at: None,
        }
    }
}
