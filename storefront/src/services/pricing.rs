// storefront/src/services/pricing.rs

//! Money arithmetic shared by the cart, checkout and order storage.
//! Amounts are whole currency units held in `i64`.

use crate::errors::{AppError, Result};

/// Sum of `price * quantity` over the given lines.
///
/// Overflow is reported as a validation error rather than wrapping.
pub fn cart_total<I>(lines: I) -> Result<i64>
where
  I: IntoIterator<Item = (i64, i32)>,
{
  lines.into_iter().try_fold(0i64, |acc, (price, quantity)| {
    price
      .checked_mul(i64::from(quantity))
      .and_then(|line| acc.checked_add(line))
      .ok_or_else(|| AppError::Validation("Order total is out of range.".to_string()))
  })
}

/// Loyalty credit for an order: `floor(total * percent / 100)`.
pub fn cashback_for(total: i64, percent: u8) -> i64 {
  if total <= 0 {
    return 0;
  }
  // i128 keeps the intermediate product exact for any i64 total.
  (i128::from(total) * i128::from(percent) / 100) as i64
}

pub fn can_pay_with_balance(balance: i64, total: i64) -> bool {
  balance >= total
}

/// Accumulated cashback after crediting `earned`.
pub fn credit_cashback(current: i64, earned: i64) -> Result<i64> {
  current
    .checked_add(earned)
    .ok_or_else(|| AppError::Validation("Cashback total is out of range.".to_string()))
}

/// Cart line quantity after adding `extra` to an existing line.
pub fn merge_quantity(current: i32, extra: i32) -> Result<i32> {
  current
    .checked_add(extra)
    .ok_or_else(|| AppError::Validation("Quantity is out of range.".to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn total_is_sum_of_price_times_quantity() {
    assert_eq!(cart_total(vec![(2500, 2), (3500, 1), (1500, 3)]).unwrap(), 13_000);
    assert_eq!(cart_total(Vec::new()).unwrap(), 0);
  }

  #[test]
  fn total_overflow_is_rejected() {
    assert!(matches!(cart_total(vec![(i64::MAX, 2)]), Err(AppError::Validation(_))));
  }

  #[test]
  fn cashback_rounds_down() {
    assert_eq!(cashback_for(2500, 5), 125);
    assert_eq!(cashback_for(1999, 5), 99);
    assert_eq!(cashback_for(19, 5), 0);
    assert_eq!(cashback_for(1000, 0), 0);
    assert_eq!(cashback_for(1000, 100), 1000);
  }

  #[test]
  fn balance_must_cover_total() {
    assert!(can_pay_with_balance(5000, 5000));
    assert!(can_pay_with_balance(5001, 5000));
    assert!(!can_pay_with_balance(4999, 5000));
  }

  #[test]
  fn cashback_credit_overflow_is_rejected() {
    assert_eq!(credit_cashback(250, 125).unwrap(), 375);
    assert!(matches!(credit_cashback(i64::MAX, 125), Err(AppError::Validation(_))));
  }

  #[test]
  fn quantity_merge_overflow_is_rejected() {
    assert_eq!(merge_quantity(1, 2).unwrap(), 3);
    assert!(matches!(merge_quantity(i32::MAX, 1), Err(AppError::Validation(_))));
  }
}
