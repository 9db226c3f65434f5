use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{entities::payments::PaymentEntity, value_objects::items::PendingItem};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentSheetModel {
    pub customer_id: String,
    pub pending_items: Vec<PendingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckPaymentModel {
    pub customer_id: String,
}

/// Everything the mobile client needs to present the Stripe payment sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSheetDto {
    pub payment_intent: String,
    pub ephemeral_key: String,
    pub customer: String,
    pub publishable_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDto {
    pub id: String,
    pub customer_id: String,
    pub is_checked: bool,
    pub checkout_date: Option<DateTime<Utc>>,
}

impl From<PaymentEntity> for PaymentDto {
    fn from(value: PaymentEntity) -> Self {
        Self {
            id: value.id,
            customer_id: value.customer_id,
            is_checked: value.is_checked,
            checkout_date: value.checkout_date,
        }
    }
}
