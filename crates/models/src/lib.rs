pub mod errors;
pub mod db;
pub mod project;
pub mod quotation;
pub mod contract;
pub mod maintenance_request;

use chrono::{SubsecRound, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Iterable, ModelTrait};

/// Current time at microsecond precision, matching what Postgres stores.
pub fn timestamp_now() -> DateTimeWithTimeZone {
    Utc::now().trunc_subsecs(6).into()
}

/// Active model with every column marked `Set` from `model`, so that an
/// UPDATE writes the whole row rather than only changed fields.
pub fn set_all<M, A>(model: M) -> A
where
    M: ModelTrait + IntoActiveModel<A>,
    A: ActiveModelTrait<Entity = M::Entity>,
{
    let values: Vec<_> = <M::Entity as EntityTrait>::Column::iter()
        .map(|col| (col, model.get(col)))
        .collect();
    let mut am = model.into_active_model();
    for (col, value) in values {
        am.set(col, value);
    }
    am
}
