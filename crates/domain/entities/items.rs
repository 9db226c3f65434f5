use diesel::prelude::*;

use crate::infra::db::postgres::schema::items;

#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = items)]
pub struct ItemEntity {
    pub id: i32,
    pub name: String,
    pub price: i32,
    pub barcode: Option<String>,
}
