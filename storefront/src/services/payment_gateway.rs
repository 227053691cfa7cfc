// storefront/src/services/payment_gateway.rs

//! Simulated card gateway. Authorizes any positive amount and hands back a
//! reference that is stored on the order.

use crate::errors::{AppError, Result as AppResult};
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct CardAuthorization {
  pub reference: String,
  pub amount: i64,
}

#[instrument(skip(payer_email), fields(payer = %payer_email))]
pub async fn authorize_card_payment(amount: i64, payer_email: &str) -> AppResult<CardAuthorization> {
  if amount <= 0 {
    warn!("Refusing to authorize a non-positive card amount.");
    return Err(AppError::Payment("Amount must be greater than zero".to_string()));
  }
  // Simulated gateway round trip.
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;

  let reference = format!("card_{}", Uuid::new_v4().simple());
  info!(%reference, "Card payment authorized.");
  Ok(CardAuthorization { reference, amount })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn positive_amount_is_authorized() {
    let auth = authorize_card_payment(2500, "anna@example.com").await.unwrap();
    assert_eq!(auth.amount, 2500);
    assert!(auth.reference.starts_with("card_"));
  }

  #[tokio::test]
  async fn zero_amount_is_a_payment_error() {
    let err = authorize_card_payment(0, "anna@example.com").await.unwrap_err();
    assert!(matches!(err, AppError::Payment(_)));
  }
}
