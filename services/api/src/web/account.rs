//! services/api/src/web/account.rs
//!
//! The protected profile endpoint.

use axum::{extract::State, Extension, Json};
use eventify_core::{AuthError, Purchase, PublicProfile, SessionSnapshot};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpError};
use crate::web::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub age: i32,
    pub gender: String,
    pub state: String,
}

impl From<PublicProfile> for UserView {
    fn from(p: PublicProfile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            firstname: p.firstname,
            lastname: p.lastname,
            age: p.age,
            gender: p.gender,
            state: p.state,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseView {
    pub event: String,
    pub date: String,
    pub location: String,
    pub ticket_type: String,
    pub quantity: u32,
    pub total_price: u32,
}

impl From<Purchase> for PurchaseView {
    fn from(p: Purchase) -> Self {
        Self {
            event: p.event,
            date: p.date,
            location: p.location,
            ticket_type: p.ticket_type,
            quantity: p.quantity,
            total_price: p.total_price,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub user: UserView,
    pub purchase_history: Vec<PurchaseView>,
}

/// GET /account - Profile and purchase history of the logged-in user
#[utoipa::path(
    get,
    path = "/account",
    responses(
        (status = 200, description = "Profile and purchase history", body = AccountResponse),
        (status = 401, description = "No valid session", body = ErrorResponse),
        (status = 404, description = "The account no longer exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn account_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionSnapshot>,
) -> Result<Json<AccountResponse>, HttpError> {
    let account = state
        .accounts
        .find_by_id(session.user_id)
        .await
        .map_err(AuthError::from)?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    let purchases = state
        .purchases
        .purchases_for(account.id)
        .await
        .map_err(AuthError::from)?;

    Ok(Json(AccountResponse {
        user: PublicProfile::from(account).into(),
        purchase_history: purchases.into_iter().map(PurchaseView::from).collect(),
    }))
}
