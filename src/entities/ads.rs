use sea_orm::entity::prelude::*;

/// One admitted ad.
///
/// Window bounds are unix milliseconds so that SQLite compares them
/// numerically. A NULL targeting column means the dimension is unconditioned;
/// otherwise it holds a sorted JSON array of canonical values.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub start_at_ms: i64,
    pub end_at_ms: i64,
    pub age_start: Option<i32>,
    pub age_end: Option<i32>,
    pub genders: Option<String>,
    pub countries: Option<String>,
    pub platforms: Option<String>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
