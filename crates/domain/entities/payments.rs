use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::payments;

#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
    pub id: String,
    pub customer_id: String,
    pub is_checked: bool,
    pub checkout_date: Option<DateTime<Utc>>,
}

/// New payments always start unchecked; the column default takes care of `is_checked`.
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub id: String,
    pub customer_id: String,
}
