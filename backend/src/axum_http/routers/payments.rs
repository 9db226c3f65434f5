use crate::{
    axum_http::error_responses::ErrorResponse,
    usecases::payments::{PaymentGateway, PaymentUseCase},
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::domain::{
    repositories::{
        customers::CustomerRepository, items::ItemRepository, payments::PaymentRepository,
    },
    value_objects::{
        pagination::{Page, PageQuery},
        payments::{CheckPaymentModel, CreatePaymentSheetModel},
    },
};
use std::sync::Arc;
use tracing::{info, warn};

pub fn routes<C, I, P, G>(usecase: Arc<PaymentUseCase<C, I, P, G>>) -> Router
where
    C: CustomerRepository + Send + Sync + 'static,
    I: ItemRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            get(list_payments::<C, I, P, G>).post(create_payment_sheet::<C, I, P, G>),
        )
        .route(
            "/:customer_id",
            get(list_payments_by_customer::<C, I, P, G>),
        )
        .route(
            "/check/:payment_intent_id",
            post(check_payment::<C, I, P, G>),
        )
        .with_state(usecase)
}

fn parse_page(query: PageQuery) -> Result<Page, ErrorResponse> {
    Page::try_from(query).map_err(|message| {
        warn!(%message, "payments: invalid pagination");
        ErrorResponse::new(StatusCode::BAD_REQUEST, message)
    })
}

pub async fn list_payments<C, I, P, G>(
    State(usecase): State<Arc<PaymentUseCase<C, I, P, G>>>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse
where
    C: CustomerRepository + Send + Sync + 'static,
    I: ItemRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let page = match parse_page(query) {
        Ok(page) => page,
        Err(err) => return err.into_response(),
    };

    match usecase.list_payments(page).await {
        Ok(payments) => Json(payments).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list_payments_by_customer<C, I, P, G>(
    State(usecase): State<Arc<PaymentUseCase<C, I, P, G>>>,
    Path(customer_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> impl IntoResponse
where
    C: CustomerRepository + Send + Sync + 'static,
    I: ItemRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    let page = match parse_page(query) {
        Ok(page) => page,
        Err(err) => return err.into_response(),
    };

    match usecase.list_payments_by_customer(&customer_id, page).await {
        Ok(payments) => Json(payments).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn create_payment_sheet<C, I, P, G>(
    State(usecase): State<Arc<PaymentUseCase<C, I, P, G>>>,
    Json(model): Json<CreatePaymentSheetModel>,
) -> impl IntoResponse
where
    C: CustomerRepository + Send + Sync + 'static,
    I: ItemRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    info!(customer_id = %model.customer_id, "payments: payment sheet request received");
    match usecase
        .create_payment_sheet(&model.customer_id, model.pending_items)
        .await
    {
        Ok(sheet) => Json(sheet).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn check_payment<C, I, P, G>(
    State(usecase): State<Arc<PaymentUseCase<C, I, P, G>>>,
    Path(payment_intent_id): Path<String>,
    Json(model): Json<CheckPaymentModel>,
) -> impl IntoResponse
where
    C: CustomerRepository + Send + Sync + 'static,
    I: ItemRepository + Send + Sync + 'static,
    P: PaymentRepository + Send + Sync + 'static,
    G: PaymentGateway + Send + Sync + 'static,
{
    info!(%payment_intent_id, "payments: check request received");
    match usecase
        .check_payment(&payment_intent_id, &model.customer_id)
        .await
    {
        Ok(payment) => Json(payment).into_response(),
        Err(err) => err.into_response(),
    }
}
