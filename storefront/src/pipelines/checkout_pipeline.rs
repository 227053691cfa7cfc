// storefront/src/pipelines/checkout_pipeline.rs

use crate::errors::AppError;
use crate::models::{NewOrder, NewOrderItem, PaymentMethod};
use crate::pipelines::contexts::CheckoutCtxData;
use crate::services::{notifier, payment_gateway, pricing};
use crate::workflow::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{debug, info, warn};

pub const STEPS: &[(&str, bool)] = &[
  ("validate_checkout", false),
  ("collect_items", false),
  ("settle_with_balance", false),
  ("settle_with_card", false),
  ("persist_order", false),
  ("send_confirmation", true), // Optional
];

pub fn register_checkout_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<CheckoutCtxData>::new(STEPS);

  p.skip_if("settle_with_balance", |data| data.payment_method != PaymentMethod::Balance);
  p.skip_if("settle_with_card", |data| data.payment_method != PaymentMethod::Card);

  // Step 1: Required contact fields and sane quantities.
  p.on_root("validate_checkout", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let mut guard = ctx_data.write();
    guard.full_name = guard.full_name.trim().to_string();
    guard.email = guard.email.trim().to_string();
    guard.phone = guard.phone.trim().to_string();
    guard.delivery_address = guard.delivery_address.trim().to_string();
    guard.comment = guard.comment.trim().to_string();

    let missing: Vec<&str> = [
      ("full_name", guard.full_name.is_empty()),
      ("email", guard.email.is_empty()),
      ("phone", guard.phone.is_empty()),
      ("delivery_address", guard.delivery_address.is_empty()),
    ]
    .into_iter()
    .filter_map(|(field, empty)| empty.then_some(field))
    .collect();
    if !missing.is_empty() {
      warn!(?missing, "Checkout rejected: required fields are empty.");
      return Err(AppError::Validation(format!("Missing required fields: {}", missing.join(", "))));
    }
    if !guard.email.contains('@') {
      return Err(AppError::Validation("A valid email is required.".to_string()));
    }
    if guard.requested.iter().any(|line| line.quantity < 1) {
      return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
    }
    Ok(PipelineControl::Continue)
  });

  // Step 2: Resolve lines against the catalog, falling back to the buyer's cart.
  p.on_root("collect_items", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let (store, user_id, requested) = {
      let guard = ctx_data.read();
      (guard.app_state.store.clone(), guard.user_id, guard.requested.clone())
    };

    let (items, cart_item_ids) = if requested.is_empty() {
      let lines = match user_id {
        Some(user_id) => store.cart_lines(user_id).await?,
        None => Vec::new(),
      };
      let cart_item_ids: Vec<i64> = lines.iter().map(|line| line.id).collect();
      let items: Vec<NewOrderItem> = lines
        .into_iter()
        .map(|line| NewOrderItem {
          plant_id: line.plant_id,
          name: line.name,
          price: line.price,
          quantity: line.quantity,
        })
        .collect();
      (items, cart_item_ids)
    } else {
      let mut items = Vec::with_capacity(requested.len());
      for line in requested {
        let plant = store
          .get_plant(line.plant_id)
          .await?
          .ok_or_else(|| AppError::NotFound(format!("Plant {} not found", line.plant_id)))?;
        items.push(NewOrderItem {
          plant_id: plant.id,
          name: plant.name,
          price: plant.price,
          quantity: line.quantity,
        });
      }
      (items, Vec::new())
    };

    if items.is_empty() {
      return Err(AppError::Validation("Order has no items.".to_string()));
    }
    let total = pricing::cart_total(items.iter().map(|i| (i.price, i.quantity)))?;
    debug!(
      lines = items.len(),
      total,
      from_cart = !cart_item_ids.is_empty(),
      "Checkout items collected."
    );

    let mut guard = ctx_data.write();
    guard.items = items;
    guard.cart_item_ids = cart_item_ids;
    guard.total_amount = total;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  // Step 3a: Balance payments need a signed-in buyer who can cover the total.
  p.on_root("settle_with_balance", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let (store, user_id, total) = {
      let guard = ctx_data.read();
      (guard.app_state.store.clone(), guard.user_id, guard.total_amount)
    };
    let user_id = user_id.ok_or_else(|| AppError::Auth("Sign in to pay with balance".to_string()))?;
    let user = store
      .get_user(user_id)
      .await?
      .ok_or_else(|| AppError::Auth("Session user no longer exists".to_string()))?;

    if !pricing::can_pay_with_balance(user.balance, total) {
      warn!(user_id, balance = user.balance, total, "Insufficient balance for checkout.");
      return Err(AppError::Payment("Insufficient balance".to_string()));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  // Step 3b: Card payments go through the gateway.
  p.on_root("settle_with_card", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let (total, email) = {
      let guard = ctx_data.read();
      (guard.total_amount, guard.email.clone())
    };
    let authorization = payment_gateway::authorize_card_payment(total, &email).await?;
    ctx_data.write().payment_reference = Some(authorization.reference);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  // Step 4: One atomic write for the order, debit, cashback and cart clear.
  p.on_root("persist_order", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let (store, new_order) = {
      let guard = ctx_data.read();
      let cashback = match guard.user_id {
        Some(_) => pricing::cashback_for(guard.total_amount, guard.app_state.config.cashback_percent),
        None => 0,
      };
      let new_order = NewOrder {
        user_id: guard.user_id,
        full_name: guard.full_name.clone(),
        email: guard.email.clone(),
        phone: guard.phone.clone(),
        delivery_address: guard.delivery_address.clone(),
        comment: guard.comment.clone(),
        payment_method: guard.payment_method,
        payment_reference: guard.payment_reference.clone(),
        items: guard.items.clone(),
        total_amount: guard.total_amount,
        cashback,
        cart_item_ids: guard.cart_item_ids.clone(),
      };
      (guard.app_state.store.clone(), new_order)
    };

    let placed = store.place_order(new_order).await?;
    info!(
      order_id = placed.order.id,
      total = placed.order.total_amount,
      cashback = placed.order.cashback_earned,
      "Order placed."
    );
    ctx_data.write().placed = Some(placed);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  // Step 5: Confirmation. Failures are logged by the pipeline and do not fail the order.
  p.on_root("send_confirmation", |ctx_data: ContextData<CheckoutCtxData>| async move {
    let order = ctx_data.read().placed.as_ref().map(|placed| placed.order.clone());
    let order = order.ok_or_else(|| anyhow::anyhow!("no placed order to confirm"))?;
    notifier::send_order_confirmation(&order).await?;
    ctx_data.write().confirmation_sent = true;
    Ok::<_, anyhow::Error>(PipelineControl::Continue)
  });

  workflows.register_pipeline(p);
}
