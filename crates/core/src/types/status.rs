//! Order status state machine.
//!
//! Every rule about which status edits an operator may make, and what data
//! each edit requires, lives in this one table. Call sites never branch on
//! status strings; they ask [`allowed_transition`] and act on the answer, so
//! adding a status cannot silently skip a call site.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// The forward path is `pending → paid → shipped`. `canceled` is reachable
/// from any live state and is terminal. Operators may also move an order
/// backward (e.g. `shipped → pending` after a mislabeled save); doing so
/// clears the shipment fields so stale tracking data never survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Canceled,
}

impl OrderStatus {
    /// All statuses an operator can pick from.
    pub const ALL: [Self; 4] = [Self::Pending, Self::Paid, Self::Shipped, Self::Canceled];

    /// Terminal states admit no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Canceled)
    }

    /// Human-facing label, e.g. for email subjects.
    #[must_use]
    pub const fn display(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Shipped => "Shipped",
            Self::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Shipped => write!(f, "shipped"),
            Self::Canceled => write!(f, "canceled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "shipped" => Ok(Self::Shipped),
            "canceled" => Ok(Self::Canceled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// What a permitted transition demands before it may be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionRule {
    /// Entering `paid` requires the operator to confirm which manual
    /// payment channel the money actually arrived through.
    pub requires_payment_method: bool,
    /// Entering `shipped` requires a carrier name and a tracking number.
    pub requires_shipment_fields: bool,
    /// Leaving `shipped` must wipe carrier/tracking/shipped-at so stale
    /// shipment data never shows on a non-shipped order.
    pub clears_shipment_fields: bool,
}

/// Why a transition was refused outright (before data requirements).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The stored status already equals the requested one; persisting it
    /// again would be a no-op and must not re-trigger side effects.
    #[error("order is already {0}")]
    NoChange(OrderStatus),

    /// The current status admits no further transitions.
    #[error("cannot change status of a {0} order")]
    Terminal(OrderStatus),
}

/// Look up the rule for moving an order from `from` to `to`.
///
/// # Errors
///
/// Returns [`TransitionError::NoChange`] when `from == to` and
/// [`TransitionError::Terminal`] when `from` is terminal.
pub fn allowed_transition(
    from: OrderStatus,
    to: OrderStatus,
) -> Result<TransitionRule, TransitionError> {
    if from == to {
        return Err(TransitionError::NoChange(from));
    }
    if from.is_terminal() {
        return Err(TransitionError::Terminal(from));
    }

    Ok(TransitionRule {
        requires_payment_method: to == OrderStatus::Paid,
        requires_shipment_fields: to == OrderStatus::Shipped,
        clears_shipment_fields: from == OrderStatus::Shipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path() {
        let rule = allowed_transition(OrderStatus::Pending, OrderStatus::Paid).expect("allowed");
        assert!(rule.requires_payment_method);
        assert!(!rule.requires_shipment_fields);

        let rule = allowed_transition(OrderStatus::Paid, OrderStatus::Shipped).expect("allowed");
        assert!(rule.requires_shipment_fields);
        assert!(!rule.clears_shipment_fields);
    }

    #[test]
    fn test_pending_straight_to_shipped_needs_tracking() {
        let rule = allowed_transition(OrderStatus::Pending, OrderStatus::Shipped).expect("allowed");
        assert!(rule.requires_shipment_fields);
    }

    #[test]
    fn test_leaving_shipped_clears_shipment_fields() {
        let rule = allowed_transition(OrderStatus::Shipped, OrderStatus::Pending).expect("allowed");
        assert!(rule.clears_shipment_fields);
        assert!(!rule.requires_shipment_fields);
    }

    #[test]
    fn test_cancel_reachable_from_any_live_state() {
        for from in [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Shipped] {
            assert!(allowed_transition(from, OrderStatus::Canceled).is_ok());
        }
    }

    #[test]
    fn test_canceled_is_terminal() {
        for to in [OrderStatus::Pending, OrderStatus::Paid, OrderStatus::Shipped] {
            assert_eq!(
                allowed_transition(OrderStatus::Canceled, to),
                Err(TransitionError::Terminal(OrderStatus::Canceled))
            );
        }
    }

    #[test]
    fn test_no_op_save_is_refused() {
        for status in OrderStatus::ALL {
            assert_eq!(
                allowed_transition(status, status),
                Err(TransitionError::NoChange(status))
            );
        }
    }

    #[test]
    fn test_status_round_trip_str() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.to_string().parse().expect("round trip");
            assert_eq!(parsed, status);
        }
        assert!("refunded".parse::<OrderStatus>().is_err());
    }
}
