use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::timestamp_now;

pub mod status {
    pub const PLANNED: &str = "planned";
    pub const ACTIVE: &str = "active";
    pub const ON_HOLD: &str = "on_hold";
    pub const CLOSED: &str = "closed";
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub customer: String,
    pub status: String,
    /// Budget in minor currency units.
    pub budget: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// New planned project with a fresh id.
    pub fn new(name: &str, customer: &str, budget: i64) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            customer: customer.to_string(),
            status: status::PLANNED.to_string(),
            budget,
            created_at: now,
            updated_at: now,
        }
    }
}
