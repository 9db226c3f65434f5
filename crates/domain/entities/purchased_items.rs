use diesel::prelude::*;

use crate::infra::db::postgres::schema::purchased_items;

#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = purchased_items)]
pub struct PurchasedItemEntity {
    pub id: i32,
    pub customer_id: String,
    pub item_id: i32,
    pub payment_id: String,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = purchased_items)]
pub struct InsertPurchasedItemEntity {
    pub customer_id: String,
    pub item_id: i32,
    pub payment_id: String,
    pub amount: i32,
}
