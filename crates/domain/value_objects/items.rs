use serde::{Deserialize, Serialize};

/// A cart line sent by the client: which item and how many of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingItem {
    pub id: i32,
    pub amount: i32,
}

/// A purchased quantity joined with the unit price of its item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub item_id: i32,
    pub amount: i32,
    pub unit_price: i32,
}

impl PricedLine {
    pub fn new(item_id: i32, amount: i32, unit_price: i32) -> Self {
        Self {
            item_id,
            amount,
            unit_price,
        }
    }

    pub fn subtotal(&self) -> Option<i64> {
        i64::from(self.amount).checked_mul(i64::from(self.unit_price))
    }
}

/// Sums `amount * unit_price` over all lines in minor currency units.
/// Returns `None` when the total does not fit in an `i64`.
pub fn order_total<I>(lines: I) -> Option<i64>
where
    I: IntoIterator<Item = PricedLine>,
{
    lines
        .into_iter()
        .try_fold(0_i64, |total, line| total.checked_add(line.subtotal()?))
}
