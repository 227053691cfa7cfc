// storefront/src/services/notifier.rs

//! Order confirmation "delivery". Nothing leaves the process; the message is
//! rendered and logged.

use anyhow::{bail, Result};
use tracing::info;

use crate::models::Order;

#[derive(Debug)]
pub struct SentConfirmation {
  pub to: String,
  pub subject: String,
  pub body_preview: String,
}

pub async fn send_order_confirmation(order: &Order) -> Result<SentConfirmation> {
  if order.email.trim().is_empty() {
    bail!("order {} has no contact email", order.id);
  }

  let subject = format!("Order #{} received", order.id);
  let mut body = format!(
    "Hello, {}! We received your order #{} for {} and will contact you at {}.\n",
    order.full_name, order.id, order.total_amount, order.phone
  );
  for item in &order.items {
    body.push_str(&format!("- {} x{} = {}\n", item.name, item.quantity, item.price * i64::from(item.quantity)));
  }
  if order.cashback_earned > 0 {
    body.push_str(&format!("Cashback credited: {}\n", order.cashback_earned));
  }

  tokio::time::sleep(std::time::Duration::from_millis(5)).await;

  let body_preview = body.chars().take(60).collect::<String>();
  info!(to = %order.email, %subject, order_id = order.id, "Order confirmation sent.");

  Ok(SentConfirmation {
    to: order.email.clone(),
    subject,
    body_preview,
  })
}
