use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use crates::{
    domain::{
        entities::{payments::InsertPaymentEntity, purchased_items::InsertPurchasedItemEntity},
        repositories::{
            customers::CustomerRepository, items::ItemRepository, payments::PaymentRepository,
        },
        value_objects::{
            items::{PendingItem, PricedLine, order_total},
            pagination::Page,
            payments::{PaymentDto, PaymentSheetDto},
        },
    },
    payments::stripe_client::{StripeClient, StripeCustomer, StripePaymentIntent},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_ephemeral_key(&self, customer_id: &str) -> AnyResult<String>;

    async fn retrieve_customer(&self, customer_id: &str) -> AnyResult<Option<StripeCustomer>>;

    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        customer_id: &str,
        idempotency_key: &str,
    ) -> AnyResult<StripePaymentIntent>;

    async fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> AnyResult<Option<StripePaymentIntent>>;

    async fn cancel_payment_intent(&self, payment_intent_id: &str) -> AnyResult<()>;
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_ephemeral_key(&self, customer_id: &str) -> AnyResult<String> {
        self.create_ephemeral_key(customer_id).await
    }

    async fn retrieve_customer(&self, customer_id: &str) -> AnyResult<Option<StripeCustomer>> {
        self.retrieve_customer(customer_id).await
    }

    async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        customer_id: &str,
        idempotency_key: &str,
    ) -> AnyResult<StripePaymentIntent> {
        self.create_payment_intent(amount, currency, customer_id, idempotency_key)
            .await
    }

    async fn retrieve_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> AnyResult<Option<StripePaymentIntent>> {
        self.retrieve_payment_intent(payment_intent_id).await
    }

    async fn cancel_payment_intent(&self, payment_intent_id: &str) -> AnyResult<()> {
        self.cancel_payment_intent(payment_intent_id).await
    }
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Condition(String),
    #[error("payment gateway request failed: {0}")]
    Gateway(anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::Condition(_) => StatusCode::BAD_REQUEST,
            PaymentError::Gateway(_) => StatusCode::BAD_GATEWAY,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, PaymentError>;

/// Settlement settings shared by every payment sheet.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub currency: String,
    pub publishable_key: String,
}

pub struct PaymentUseCase<C, I, P, G>
where
    C: CustomerRepository + Send + Sync + 'static,
    I: ItemRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    customer_repo: Arc<C>,
    item_repo: Arc<I>,
    payment_repo: Arc<P>,
    gateway: Arc<G>,
    settings: CheckoutSettings,
}

impl<C, I, P, G> PaymentUseCase<C, I, P, G>
where
    C: CustomerRepository + Send + Sync + 'static,
    I: ItemRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    pub fn new(
        customer_repo: Arc<C>,
        item_repo: Arc<I>,
        payment_repo: Arc<P>,
        gateway: Arc<G>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            customer_repo,
            item_repo,
            payment_repo,
            gateway,
            settings,
        }
    }

    pub async fn create_payment_sheet(
        &self,
        customer_id: &str,
        pending_items: Vec<PendingItem>,
    ) -> UseCaseResult<PaymentSheetDto> {
        info!(
            %customer_id,
            line_count = pending_items.len(),
            "payments: create payment sheet requested"
        );

        if pending_items.is_empty() {
            warn!(%customer_id, "payments: empty cart submitted");
            return Err(PaymentError::Condition("No item to pay for.".to_string()));
        }
        if let Some(line) = pending_items.iter().find(|line| line.amount <= 0) {
            warn!(
                %customer_id,
                item_id = line.id,
                amount = line.amount,
                "payments: non-positive quantity submitted"
            );
            return Err(PaymentError::Condition(
                "Item amount must be positive.".to_string(),
            ));
        }

        let customer = self
            .customer_repo
            .find_by_id(customer_id)
            .await
            .map_err(|err| {
                error!(%customer_id, db_error = ?err, "payments: failed to load customer");
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(%customer_id, "payments: customer not found");
                PaymentError::NotFound("Customer not found.".to_string())
            })?;

        let item_ids: Vec<i32> = pending_items.iter().map(|line| line.id).collect();
        let items = self
            .item_repo
            .find_by_ids(item_ids)
            .await
            .map_err(|err| {
                error!(%customer_id, db_error = ?err, "payments: failed to load items");
                PaymentError::Internal(err)
            })?;

        // All or nothing: an unknown or repeated id leaves the counts unequal.
        if items.len() != pending_items.len() {
            warn!(
                %customer_id,
                requested = pending_items.len(),
                found = items.len(),
                "payments: pending items do not resolve to known items"
            );
            return Err(PaymentError::NotFound("Item not found.".to_string()));
        }

        let mut lines = Vec::with_capacity(pending_items.len());
        for pending in &pending_items {
            let item = items
                .iter()
                .find(|item| item.id == pending.id)
                .ok_or_else(|| PaymentError::NotFound("Item not found.".to_string()))?;
            lines.push(PricedLine::new(item.id, pending.amount, item.price));
        }

        let total = order_total(lines).ok_or_else(|| {
            warn!(%customer_id, "payments: order total overflows");
            PaymentError::Condition("Order total is too large.".to_string())
        })?;

        let ephemeral_key = self
            .gateway
            .create_ephemeral_key(&customer.id)
            .await
            .map_err(|err| {
                error!(%customer_id, error = ?err, "payments: failed to create ephemeral key");
                PaymentError::Gateway(err)
            })?;

        let gateway_customer = self
            .gateway
            .retrieve_customer(&customer.id)
            .await
            .map_err(|err| {
                error!(%customer_id, error = ?err, "payments: failed to retrieve gateway customer");
                PaymentError::Gateway(err)
            })?
            .filter(|gateway_customer| !gateway_customer.deleted)
            .ok_or_else(|| {
                warn!(%customer_id, "payments: customer unknown to the gateway");
                PaymentError::NotFound("Customer not found.".to_string())
            })?;

        let idempotency_key = Uuid::new_v4().to_string();
        let intent = self
            .gateway
            .create_payment_intent(
                total,
                &self.settings.currency,
                &gateway_customer.id,
                &idempotency_key,
            )
            .await
            .map_err(|err| {
                error!(
                    %customer_id,
                    total,
                    error = ?err,
                    "payments: failed to create payment intent"
                );
                PaymentError::Gateway(err)
            })?;

        let client_secret = intent.client_secret.clone().ok_or_else(|| {
            error!(
                %customer_id,
                payment_intent_id = %intent.id,
                "payments: payment intent has no client secret"
            );
            PaymentError::Gateway(anyhow::anyhow!("payment intent client secret is missing"))
        })?;

        let payment = InsertPaymentEntity {
            id: intent.id.clone(),
            customer_id: customer.id.clone(),
        };
        let purchased_items = pending_items
            .iter()
            .map(|pending| InsertPurchasedItemEntity {
                customer_id: customer.id.clone(),
                item_id: pending.id,
                payment_id: intent.id.clone(),
                amount: pending.amount,
            })
            .collect();

        if let Err(err) = self
            .payment_repo
            .create_payment_with_items(payment, purchased_items)
            .await
        {
            error!(
                %customer_id,
                payment_intent_id = %intent.id,
                db_error = ?err,
                "payments: failed to persist payment, cancelling payment intent"
            );
            self.cancel_orphaned_intent(&intent.id).await;
            return Err(PaymentError::Internal(err));
        }

        info!(
            %customer_id,
            payment_intent_id = %intent.id,
            total,
            "payments: payment sheet created"
        );

        Ok(PaymentSheetDto {
            payment_intent: client_secret,
            ephemeral_key,
            customer: gateway_customer.id,
            publishable_key: self.settings.publishable_key.clone(),
        })
    }

    pub async fn check_payment(
        &self,
        payment_intent_id: &str,
        customer_id: &str,
    ) -> UseCaseResult<PaymentDto> {
        info!(
            %payment_intent_id,
            %customer_id,
            "payments: check payment requested"
        );

        self.payment_repo
            .find_unchecked_payment(payment_intent_id, customer_id)
            .await
            .map_err(|err| {
                error!(
                    %payment_intent_id,
                    db_error = ?err,
                    "payments: failed to load payment"
                );
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(
                    %payment_intent_id,
                    %customer_id,
                    "payments: payment not found or already checked"
                );
                PaymentError::NotFound("Payment not found or already checked.".to_string())
            })?;

        let intent = self
            .gateway
            .retrieve_payment_intent(payment_intent_id)
            .await
            .map_err(|err| {
                error!(
                    %payment_intent_id,
                    error = ?err,
                    "payments: failed to retrieve payment intent"
                );
                PaymentError::Gateway(err)
            })?
            .ok_or_else(|| {
                warn!(%payment_intent_id, "payments: payment intent unknown to the gateway");
                PaymentError::NotFound("Payment intent not found.".to_string())
            })?;

        if !intent.status.is_succeeded() {
            warn!(
                %payment_intent_id,
                status = %intent.status,
                "payments: payment intent has not succeeded"
            );
            return Err(PaymentError::Condition(
                "Unsuccessful payment intent.".to_string(),
            ));
        }

        let lines = self
            .payment_repo
            .find_purchased_items(payment_intent_id)
            .await
            .map_err(|err| {
                error!(
                    %payment_intent_id,
                    db_error = ?err,
                    "payments: failed to load purchased items"
                );
                PaymentError::Internal(err)
            })?;

        let expected = order_total(lines).ok_or_else(|| {
            PaymentError::Condition("Order total is too large.".to_string())
        })?;

        if expected != intent.amount_received {
            error!(
                %payment_intent_id,
                %customer_id,
                expected,
                amount_received = intent.amount_received,
                "payments: price does not match amount received"
            );
            return Err(PaymentError::Condition(
                "Price does not match with amount paid.".to_string(),
            ));
        }

        let payment = self
            .payment_repo
            .mark_checked(payment_intent_id, customer_id, Utc::now())
            .await
            .map_err(|err| {
                error!(
                    %payment_intent_id,
                    db_error = ?err,
                    "payments: failed to mark payment checked"
                );
                PaymentError::Internal(err)
            })?
            .ok_or_else(|| {
                warn!(
                    %payment_intent_id,
                    %customer_id,
                    "payments: payment was checked concurrently"
                );
                PaymentError::NotFound("Payment not found or already checked.".to_string())
            })?;

        info!(
            %payment_intent_id,
            %customer_id,
            amount_received = intent.amount_received,
            "payments: payment checked"
        );

        Ok(PaymentDto::from(payment))
    }

    pub async fn list_payments(&self, page: Page) -> UseCaseResult<Vec<PaymentDto>> {
        let page = Page::new(page.offset, page.limit);
        let payments = self.payment_repo.list_payments(page).await.map_err(|err| {
            error!(db_error = ?err, "payments: failed to list payments");
            PaymentError::Internal(err)
        })?;

        Ok(payments.into_iter().map(PaymentDto::from).collect())
    }

    pub async fn list_payments_by_customer(
        &self,
        customer_id: &str,
        page: Page,
    ) -> UseCaseResult<Vec<PaymentDto>> {
        let page = Page::new(page.offset, page.limit);
        let payments = self
            .payment_repo
            .list_payments_by_customer(customer_id, page)
            .await
            .map_err(|err| {
                error!(
                    %customer_id,
                    db_error = ?err,
                    "payments: failed to list customer payments"
                );
                PaymentError::Internal(err)
            })?;

        Ok(payments.into_iter().map(PaymentDto::from).collect())
    }

    async fn cancel_orphaned_intent(&self, payment_intent_id: &str) {
        match self.gateway.cancel_payment_intent(payment_intent_id).await {
            Ok(()) => info!(%payment_intent_id, "payments: orphaned payment intent cancelled"),
            Err(err) => error!(
                %payment_intent_id,
                error = ?err,
                "payments: failed to cancel orphaned payment intent, manual cleanup required"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::{
        entities::{customers::CustomerEntity, items::ItemEntity, payments::PaymentEntity},
        repositories::{
            customers::MockCustomerRepository, items::MockItemRepository,
            payments::MockPaymentRepository,
        },
        value_objects::enums::payment_intent_statuses::PaymentIntentStatus,
    };
    use mockall::predicate::eq;
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    };

    type TestUseCase = PaymentUseCase<
        MockCustomerRepository,
        MockItemRepository,
        MockPaymentRepository,
        MockPaymentGateway,
    >;

    const CUSTOMER_ID: &str = "cus_test";
    const INTENT_ID: &str = "pi_test";

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            currency: "xof".to_string(),
            publishable_key: "pk_test".to_string(),
        }
    }

    fn use_case(
        customer_repo: MockCustomerRepository,
        item_repo: MockItemRepository,
        payment_repo: MockPaymentRepository,
        gateway: MockPaymentGateway,
    ) -> TestUseCase {
        PaymentUseCase::new(
            Arc::new(customer_repo),
            Arc::new(item_repo),
            Arc::new(payment_repo),
            Arc::new(gateway),
            settings(),
        )
    }

    fn sample_customer() -> CustomerEntity {
        CustomerEntity {
            id: CUSTOMER_ID.to_string(),
            name: Some("Awa".to_string()),
            email: Some("awa@example.com".to_string()),
            created_at: Utc::now(),
        }
    }

    fn sample_item(id: i32, price: i32) -> ItemEntity {
        ItemEntity {
            id,
            name: format!("item-{id}"),
            price,
            barcode: None,
        }
    }

    fn sample_intent(status: PaymentIntentStatus, amount: i64, received: i64) -> StripePaymentIntent {
        StripePaymentIntent {
            id: INTENT_ID.to_string(),
            client_secret: Some(format!("{INTENT_ID}_secret")),
            status,
            amount,
            amount_received: received,
            currency: "xof".to_string(),
            customer: Some(CUSTOMER_ID.to_string()),
        }
    }

    fn unchecked_payment() -> PaymentEntity {
        PaymentEntity {
            id: INTENT_ID.to_string(),
            customer_id: CUSTOMER_ID.to_string(),
            is_checked: false,
            checkout_date: None,
        }
    }

    fn customer_found() -> MockCustomerRepository {
        let mut customer_repo = MockCustomerRepository::new();
        customer_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(sample_customer())));
        customer_repo
    }

    fn gateway_for_sheet(expected_total: i64) -> MockPaymentGateway {
        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_ephemeral_key()
            .times(1)
            .returning(|_| Ok("ek_secret".to_string()));
        gateway.expect_retrieve_customer().times(1).returning(|id| {
            Ok(Some(StripeCustomer {
                id: id.to_string(),
                deleted: false,
            }))
        });
        gateway
            .expect_create_payment_intent()
            .with(
                eq(expected_total),
                eq("xof"),
                eq(CUSTOMER_ID),
                mockall::predicate::always(),
            )
            .times(1)
            .returning(|amount, _, _, _| {
                Ok(sample_intent(
                    PaymentIntentStatus::RequiresPaymentMethod,
                    amount,
                    0,
                ))
            });
        gateway
    }

    #[tokio::test]
    async fn creates_sheet_with_one_payment_and_all_purchased_items() {
        let mut item_repo = MockItemRepository::new();
        item_repo
            .expect_find_by_ids()
            .with(eq(vec![1, 2]))
            .times(1)
            .returning(|_| Ok(vec![sample_item(1, 150), sample_item(2, 1000)]));

        let persisted = Arc::new(Mutex::new(None));
        let persisted_clone = Arc::clone(&persisted);
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_create_payment_with_items()
            .times(1)
            .returning(move |payment, purchased| {
                *persisted_clone.lock().unwrap() = Some((payment.clone(), purchased));
                Ok(PaymentEntity {
                    id: payment.id,
                    customer_id: payment.customer_id,
                    is_checked: false,
                    checkout_date: None,
                })
            });

        let usecase = use_case(
            customer_found(),
            item_repo,
            payment_repo,
            gateway_for_sheet(2 * 150 + 3 * 1000),
        );

        let sheet = usecase
            .create_payment_sheet(
                CUSTOMER_ID,
                vec![
                    PendingItem { id: 1, amount: 2 },
                    PendingItem { id: 2, amount: 3 },
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            sheet,
            PaymentSheetDto {
                payment_intent: format!("{INTENT_ID}_secret"),
                ephemeral_key: "ek_secret".to_string(),
                customer: CUSTOMER_ID.to_string(),
                publishable_key: "pk_test".to_string(),
            }
        );

        let (payment, purchased) = persisted.lock().unwrap().take().unwrap();
        assert_eq!(payment.id, INTENT_ID);
        assert_eq!(payment.customer_id, CUSTOMER_ID);
        assert_eq!(purchased.len(), 2);
        assert!(purchased.iter().all(|row| row.payment_id == INTENT_ID));
        assert_eq!(
            purchased
                .iter()
                .map(|row| (row.item_id, row.amount))
                .collect::<Vec<_>>(),
            vec![(1, 2), (2, 3)]
        );
    }

    #[tokio::test]
    async fn unknown_item_fails_before_touching_gateway_or_store() {
        let mut item_repo = MockItemRepository::new();
        item_repo
            .expect_find_by_ids()
            .returning(|_| Ok(vec![sample_item(1, 100), sample_item(2, 200)]));

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_create_payment_with_items().never();

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_create_ephemeral_key().never();
        gateway.expect_create_payment_intent().never();

        let usecase = use_case(customer_found(), item_repo, payment_repo, gateway);

        let err = usecase
            .create_payment_sheet(
                CUSTOMER_ID,
                vec![
                    PendingItem { id: 1, amount: 1 },
                    PendingItem { id: 2, amount: 1 },
                    PendingItem { id: 3, amount: 1 },
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound(_)));
    }

    #[tokio::test]
    async fn repeated_item_id_is_treated_as_not_found() {
        let mut item_repo = MockItemRepository::new();
        item_repo
            .expect_find_by_ids()
            .returning(|_| Ok(vec![sample_item(1, 100)]));

        let usecase = use_case(
            customer_found(),
            item_repo,
            MockPaymentRepository::new(),
            MockPaymentGateway::new(),
        );

        let err = usecase
            .create_payment_sheet(
                CUSTOMER_ID,
                vec![
                    PendingItem { id: 1, amount: 1 },
                    PendingItem { id: 1, amount: 2 },
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let mut customer_repo = MockCustomerRepository::new();
        customer_repo.expect_find_by_id().returning(|_| Ok(None));

        let mut item_repo = MockItemRepository::new();
        item_repo.expect_find_by_ids().never();

        let usecase = use_case(
            customer_repo,
            item_repo,
            MockPaymentRepository::new(),
            MockPaymentGateway::new(),
        );

        let err = usecase
            .create_payment_sheet(CUSTOMER_ID, vec![PendingItem { id: 1, amount: 1 }])
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::NotFound(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_cart_and_non_positive_quantities_are_rejected() {
        let usecase = use_case(
            MockCustomerRepository::new(),
            MockItemRepository::new(),
            MockPaymentRepository::new(),
            MockPaymentGateway::new(),
        );

        let err = usecase
            .create_payment_sheet(CUSTOMER_ID, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Condition(_)));

        let err = usecase
            .create_payment_sheet(CUSTOMER_ID, vec![PendingItem { id: 1, amount: 0 }])
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Condition(_)));
    }

    #[tokio::test]
    async fn failed_persistence_cancels_the_payment_intent() {
        let mut item_repo = MockItemRepository::new();
        item_repo
            .expect_find_by_ids()
            .returning(|_| Ok(vec![sample_item(1, 500)]));

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_create_payment_with_items()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("connection reset")));

        let mut gateway = gateway_for_sheet(500);
        gateway
            .expect_cancel_payment_intent()
            .times(1)
            .returning(|id| {
                assert_eq!(id, INTENT_ID);
                Ok(())
            });

        let usecase = use_case(customer_found(), item_repo, payment_repo, gateway);

        let err = usecase
            .create_payment_sheet(CUSTOMER_ID, vec![PendingItem { id: 1, amount: 1 }])
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Internal(_)));
    }

    #[tokio::test]
    async fn gateway_failure_is_reported_as_gateway_error() {
        let mut item_repo = MockItemRepository::new();
        item_repo
            .expect_find_by_ids()
            .returning(|_| Ok(vec![sample_item(1, 500)]));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_ephemeral_key()
            .returning(|_| Err(anyhow::anyhow!("timed out")));

        let mut payment_repo = MockPaymentRepository::new();
        payment_repo.expect_create_payment_with_items().never();

        let usecase = use_case(customer_found(), item_repo, payment_repo, gateway);

        let err = usecase
            .create_payment_sheet(CUSTOMER_ID, vec![PendingItem { id: 1, amount: 1 }])
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Gateway(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }

    fn succeeded_gateway(received: i64) -> MockPaymentGateway {
        let mut gateway = MockPaymentGateway::new();
        gateway.expect_retrieve_payment_intent().returning(move |_| {
            Ok(Some(sample_intent(
                PaymentIntentStatus::Succeeded,
                received,
                received,
            )))
        });
        gateway
    }

    #[tokio::test]
    async fn check_marks_payment_once_and_rejects_the_replay() {
        let checked = Arc::new(AtomicBool::new(false));

        let mut payment_repo = MockPaymentRepository::new();
        let checked_for_find = Arc::clone(&checked);
        payment_repo
            .expect_find_unchecked_payment()
            .times(2)
            .returning(move |_, _| {
                if checked_for_find.load(Ordering::SeqCst) {
                    Ok(None)
                } else {
                    Ok(Some(unchecked_payment()))
                }
            });
        payment_repo.expect_find_purchased_items().times(1).returning(|_| {
            Ok(vec![PricedLine::new(1, 2, 150), PricedLine::new(2, 2, 150)])
        });
        let checked_for_mark = Arc::clone(&checked);
        payment_repo
            .expect_mark_checked()
            .times(1)
            .returning(move |id, customer_id, checkout_date| {
                checked_for_mark.store(true, Ordering::SeqCst);
                Ok(Some(PaymentEntity {
                    id: id.to_string(),
                    customer_id: customer_id.to_string(),
                    is_checked: true,
                    checkout_date: Some(checkout_date),
                }))
            });

        let usecase = use_case(
            MockCustomerRepository::new(),
            MockItemRepository::new(),
            payment_repo,
            succeeded_gateway(600),
        );

        let payment = usecase.check_payment(INTENT_ID, CUSTOMER_ID).await.unwrap();
        assert!(payment.is_checked);
        assert!(payment.checkout_date.is_some());
        assert_eq!(payment.id, INTENT_ID);

        let err = usecase
            .check_payment(INTENT_ID, CUSTOMER_ID)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotFound(_)));
    }

    #[tokio::test]
    async fn unsuccessful_intent_is_a_condition_failure_without_mutation() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_unchecked_payment()
            .returning(|_, _| Ok(Some(unchecked_payment())));
        payment_repo.expect_find_purchased_items().never();
        payment_repo.expect_mark_checked().never();

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_retrieve_payment_intent().returning(|_| {
            Ok(Some(sample_intent(PaymentIntentStatus::Processing, 600, 0)))
        });

        let usecase = use_case(
            MockCustomerRepository::new(),
            MockItemRepository::new(),
            payment_repo,
            gateway,
        );

        let err = usecase
            .check_payment(INTENT_ID, CUSTOMER_ID)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Condition(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn price_mismatch_is_rejected_without_mutation() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_unchecked_payment()
            .returning(|_, _| Ok(Some(unchecked_payment())));
        payment_repo.expect_find_purchased_items().returning(|_| {
            Ok(vec![PricedLine::new(1, 2, 150), PricedLine::new(2, 2, 150)])
        });
        payment_repo.expect_mark_checked().never();

        let usecase = use_case(
            MockCustomerRepository::new(),
            MockItemRepository::new(),
            payment_repo,
            succeeded_gateway(500),
        );

        let err = usecase
            .check_payment(INTENT_ID, CUSTOMER_ID)
            .await
            .unwrap_err();
        assert!(
            matches!(err, PaymentError::Condition(ref message) if message.contains("does not match"))
        );
    }

    #[tokio::test]
    async fn missing_payment_short_circuits_before_the_gateway() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_unchecked_payment()
            .returning(|_, _| Ok(None));

        let mut gateway = MockPaymentGateway::new();
        gateway.expect_retrieve_payment_intent().never();

        let usecase = use_case(
            MockCustomerRepository::new(),
            MockItemRepository::new(),
            payment_repo,
            gateway,
        );

        let err = usecase
            .check_payment(INTENT_ID, CUSTOMER_ID)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotFound(_)));
    }

    #[tokio::test]
    async fn intent_unknown_to_gateway_is_not_found() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_unchecked_payment()
            .returning(|_, _| Ok(Some(unchecked_payment())));
        payment_repo.expect_mark_checked().never();

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_retrieve_payment_intent()
            .returning(|_| Ok(None));

        let usecase = use_case(
            MockCustomerRepository::new(),
            MockItemRepository::new(),
            payment_repo,
            gateway,
        );

        let err = usecase
            .check_payment(INTENT_ID, CUSTOMER_ID)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotFound(_)));
    }

    #[tokio::test]
    async fn losing_a_concurrent_check_reports_not_found() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_find_unchecked_payment()
            .returning(|_, _| Ok(Some(unchecked_payment())));
        payment_repo
            .expect_find_purchased_items()
            .returning(|_| Ok(vec![PricedLine::new(1, 3, 200)]));
        // The other request flipped the row between our read and the locked update.
        payment_repo
            .expect_mark_checked()
            .times(1)
            .returning(|_, _, _| Ok(None));

        let usecase = use_case(
            MockCustomerRepository::new(),
            MockItemRepository::new(),
            payment_repo,
            succeeded_gateway(600),
        );

        let err = usecase
            .check_payment(INTENT_ID, CUSTOMER_ID)
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_payments_clamps_the_page_size() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_list_payments()
            .with(eq(Page {
                offset: 0,
                limit: 100,
            }))
            .times(1)
            .returning(|_| Ok(vec![unchecked_payment()]));

        let usecase = use_case(
            MockCustomerRepository::new(),
            MockItemRepository::new(),
            payment_repo,
            MockPaymentGateway::new(),
        );

        let payments = usecase
            .list_payments(Page {
                offset: -3,
                limit: 1_000,
            })
            .await
            .unwrap();
        assert_eq!(payments.len(), 1);
        assert!(!payments[0].is_checked);
    }

    #[tokio::test]
    async fn list_payments_by_customer_surfaces_store_errors() {
        let mut payment_repo = MockPaymentRepository::new();
        payment_repo
            .expect_list_payments_by_customer()
            .returning(|_, _| Err(anyhow::anyhow!("pool timed out")));

        let usecase = use_case(
            MockCustomerRepository::new(),
            MockItemRepository::new(),
            payment_repo,
            MockPaymentGateway::new(),
        );

        let err = usecase
            .list_payments_by_customer(CUSTOMER_ID, Page::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Internal(_)));
    }
}
