use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{Connection, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{items, payments, purchased_items},
    },
};
use domain::{
    entities::{
        payments::{InsertPaymentEntity, PaymentEntity},
        purchased_items::{InsertPurchasedItemEntity, PurchasedItemEntity},
    },
    repositories::payments::PaymentRepository,
    value_objects::{items::PricedLine, pagination::Page},
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn create_payment_with_items(
        &self,
        payment: InsertPaymentEntity,
        purchased: Vec<InsertPurchasedItemEntity>,
    ) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = conn.transaction::<PaymentEntity, diesel::result::Error, _>(|tx| {
            let payment = insert_into(payments::table)
                .values(&payment)
                .returning(PaymentEntity::as_returning())
                .get_result::<PaymentEntity>(tx)?;

            insert_into(purchased_items::table)
                .values(&purchased)
                .execute(tx)?;

            Ok(payment)
        })?;

        Ok(result)
    }

    async fn find_unchecked_payment(
        &self,
        payment_id: &str,
        customer_id: &str,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::id.eq(payment_id))
            .filter(payments::customer_id.eq(customer_id))
            .filter(payments::is_checked.eq(false))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn find_purchased_items(&self, payment_id: &str) -> Result<Vec<PricedLine>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = purchased_items::table
            .inner_join(items::table)
            .filter(purchased_items::payment_id.eq(payment_id))
            .select((PurchasedItemEntity::as_select(), items::price))
            .order(purchased_items::id.asc())
            .load::<(PurchasedItemEntity, i32)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(purchased, unit_price)| {
                PricedLine::new(purchased.item_id, purchased.amount, unit_price)
            })
            .collect())
    }

    async fn mark_checked(
        &self,
        payment_id: &str,
        customer_id: &str,
        checkout_date: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // The row lock serialises concurrent checks: the loser re-reads is_checked = true and gets nothing.
        let payment = conn.transaction::<Option<PaymentEntity>, diesel::result::Error, _>(|tx| {
            let locked = payments::table
                .filter(payments::id.eq(payment_id))
                .filter(payments::customer_id.eq(customer_id))
                .filter(payments::is_checked.eq(false))
                .select(payments::id)
                .for_update()
                .first::<String>(tx)
                .optional()?;

            let Some(locked_id) = locked else {
                return Ok(None);
            };

            let updated = update(payments::table.find(locked_id))
                .set((
                    payments::is_checked.eq(true),
                    payments::checkout_date.eq(Some(checkout_date)),
                ))
                .returning(PaymentEntity::as_returning())
                .get_result::<PaymentEntity>(tx)?;

            Ok(Some(updated))
        })?;

        Ok(payment)
    }

    async fn list_payments(&self, page: Page) -> Result<Vec<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = payments::table
            .select(PaymentEntity::as_select())
            .order(payments::id.asc())
            .offset(page.offset)
            .limit(page.limit)
            .load::<PaymentEntity>(&mut conn)?;

        Ok(results)
    }

    async fn list_payments_by_customer(
        &self,
        customer_id: &str,
        page: Page,
    ) -> Result<Vec<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = payments::table
            .filter(payments::customer_id.eq(customer_id))
            .select(PaymentEntity::as_select())
            .order(payments::id.asc())
            .offset(page.offset)
            .limit(page.limit)
            .load::<PaymentEntity>(&mut conn)?;

        Ok(results)
    }
}
