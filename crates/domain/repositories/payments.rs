use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

use crate::domain::{
    entities::{
        payments::{InsertPaymentEntity, PaymentEntity},
        purchased_items::InsertPurchasedItemEntity,
    },
    value_objects::{items::PricedLine, pagination::Page},
};

#[automock]
#[async_trait]
pub trait PaymentRepository {
    /// Inserts the payment and all of its purchased items in a single transaction.
    async fn create_payment_with_items(
        &self,
        payment: InsertPaymentEntity,
        purchased_items: Vec<InsertPurchasedItemEntity>,
    ) -> Result<PaymentEntity>;

    async fn find_unchecked_payment(
        &self,
        payment_id: &str,
        customer_id: &str,
    ) -> Result<Option<PaymentEntity>>;

    async fn find_purchased_items(&self, payment_id: &str) -> Result<Vec<PricedLine>>;

    /// Locks the unchecked payment row and flips it to checked.
    /// Returns `None` when no unchecked payment matches, e.g. another request already checked it.
    async fn mark_checked(
        &self,
        payment_id: &str,
        customer_id: &str,
        checkout_date: DateTime<Utc>,
    ) -> Result<Option<PaymentEntity>>;

    async fn list_payments(&self, page: Page) -> Result<Vec<PaymentEntity>>;

    async fn list_payments_by_customer(
        &self,
        customer_id: &str,
        page: Page,
    ) -> Result<Vec<PaymentEntity>>;
}
