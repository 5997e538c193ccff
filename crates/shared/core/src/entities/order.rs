use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::values::{Price, Quantity};

/// Broker instruction side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// Correlation-level view of a broker order's state.
///
/// The execution collaborator owns the real order lifecycle; the core only
/// tracks enough to tie fills and failures back to a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderState {
    /// Handed to the execution collaborator
    Submitted,
    /// Collaborator reported a fill
    Filled,
    /// Collaborator reported a failure
    Rejected,
}

/// A single broker instruction belonging to a position.
///
/// Owned by the execution collaborator; recorded here for correlation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Uuid,
    /// Position this order belongs to
    pub position_id: Uuid,
    pub side: OrderSide,
    pub quantity: Quantity,
    pub state: OrderState,
    pub fill_price: Option<Price>,
    pub fill_quantity: Option<Quantity>,
    pub commission: Option<Decimal>,
    /// Broker error message when rejected
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Record a newly submitted order
    pub fn submitted(
        position_id: Uuid,
        side: OrderSide,
        quantity: Quantity,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            position_id,
            side,
            quantity,
            state: OrderState::Submitted,
            fill_price: None,
            fill_quantity: None,
            commission: None,
            error: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Apply a reported fill
    pub fn fill(
        &mut self,
        price: Price,
        quantity: Quantity,
        commission: Option<Decimal>,
        at: DateTime<Utc>,
    ) {
        self.state = OrderState::Filled;
        self.fill_price = Some(price);
        self.fill_quantity = Some(quantity);
        self.commission = commission;
        self.updated_at = at;
    }

    /// Apply a reported failure
    pub fn reject(&mut self, error: impl Into<String>, at: DateTime<Utc>) {
        self.state = OrderState::Rejected;
        self.error = Some(error.into());
        self.updated_at = at;
    }
}
