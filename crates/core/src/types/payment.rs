//! Manual payment channels.
//!
//! Settlement is out-of-band: the system only issues destinations and
//! amounts, and an administrator confirms receipt by moving the order to
//! `paid`. There is no card gateway anywhere in the pipeline.

use serde::{Deserialize, Serialize};

/// The fixed set of manual payment channels offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_method", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cashapp,
    Zelle,
    Venmo,
    Bitcoin,
}

impl PaymentMethod {
    /// Every channel, in the order they are presented to the customer.
    pub const ALL: [Self; 4] = [Self::Cashapp, Self::Venmo, Self::Zelle, Self::Bitcoin];

    /// Human-facing channel name.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Cashapp => "Cash App",
            Self::Zelle => "Zelle",
            Self::Venmo => "Venmo",
            Self::Bitcoin => "Bitcoin",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cashapp => write!(f, "cashapp"),
            Self::Zelle => write!(f, "zelle"),
            Self::Venmo => write!(f, "venmo"),
            Self::Bitcoin => write!(f, "bitcoin"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cashapp" => Ok(Self::Cashapp),
            "zelle" => Ok(Self::Zelle),
            "venmo" => Ok(Self::Venmo),
            "bitcoin" => Ok(Self::Bitcoin),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_str() {
        for method in PaymentMethod::ALL {
            let parsed: PaymentMethod = method.to_string().parse().expect("round trip");
            assert_eq!(parsed, method);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Cashapp).expect("serialize");
        assert_eq!(json, "\"cashapp\"");
        let parsed: PaymentMethod = serde_json::from_str("\"bitcoin\"").expect("deserialize");
        assert_eq!(parsed, PaymentMethod::Bitcoin);
    }

    #[test]
    fn test_rejects_unknown() {
        assert!("paypal".parse::<PaymentMethod>().is_err());
    }
}
