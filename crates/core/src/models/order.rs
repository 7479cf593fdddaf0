//! Customer orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderStatus, Price, UserId};

/// A placed order.
///
/// `items` is a JSON string snapshot of the cart taken at checkout. It is
/// never linked back to live cart rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub shipping_address: String,
    pub total: Price,
    #[serde(default)]
    pub status: OrderStatus,
    /// Unique public identifier, assigned at creation and never changed.
    pub tracking_number: String,
    pub items: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Payload for placing an order.
///
/// Required fields are still optional or blank-able here so that each
/// missing one can be reported with its own message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub total: Option<Price>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub items: String,
}

/// A required order field, used to report which one is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    UserId,
    CustomerName,
    CustomerEmail,
    ShippingAddress,
    Total,
    Items,
}

impl std::fmt::Display for OrderField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::UserId => "User ID is required",
            Self::CustomerName => "Customer name is required",
            Self::CustomerEmail => "Customer email is required",
            Self::ShippingAddress => "Shipping address is required",
            Self::Total => "Order total is required",
            Self::Items => "Order items are required",
        };
        f.write_str(message)
    }
}

impl NewOrder {
    /// Check required fields in a fixed order, reporting the first missing one.
    ///
    /// # Errors
    ///
    /// Returns the first `OrderField` that is absent or blank.
    pub fn validate(&self) -> Result<(), OrderField> {
        if self.user_id.is_none_or(|id| id.as_i32() < 1) {
            return Err(OrderField::UserId);
        }
        if self.customer_name.trim().is_empty() {
            return Err(OrderField::CustomerName);
        }
        if self.customer_email.trim().is_empty() {
            return Err(OrderField::CustomerEmail);
        }
        if self.shipping_address.trim().is_empty() {
            return Err(OrderField::ShippingAddress);
        }
        if self.total.is_none() {
            return Err(OrderField::Total);
        }
        if self.items.trim().is_empty() {
            return Err(OrderField::Items);
        }
        Ok(())
    }
}

/// Public order-tracking view, safe to show to anyone holding the number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTracking {
    pub id: OrderId,
    pub tracking_number: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// First name only.
    pub customer_name: String,
    pub total: Price,
}

impl From<&Order> for OrderTracking {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            tracking_number: order.tracking_number.clone(),
            status: order.status,
            created_at: order.created_at,
            customer_name: order
                .customer_name
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_string(),
            total: order.total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete() -> NewOrder {
        NewOrder {
            user_id: Some(UserId::new(1)),
            customer_name: "Alice Liddell".to_string(),
            customer_email: "alice@example.com".to_string(),
            customer_phone: None,
            shipping_address: "221B Baker St".to_string(),
            total: Some(Price::parse("10").unwrap()),
            status: None,
            items: "[]".to_string(),
        }
    }

    #[test]
    fn test_validate_complete_order() {
        assert_eq!(complete().validate(), Ok(()));
    }

    #[test]
    fn test_validate_reports_each_field() {
        let mut order = complete();
        order.user_id = None;
        assert_eq!(order.validate(), Err(OrderField::UserId));

        let mut order = complete();
        order.customer_name = "  ".to_string();
        assert_eq!(order.validate(), Err(OrderField::CustomerName));

        let mut order = complete();
        order.customer_email.clear();
        assert_eq!(order.validate(), Err(OrderField::CustomerEmail));

        let mut order = complete();
        order.shipping_address.clear();
        assert_eq!(order.validate(), Err(OrderField::ShippingAddress));

        let mut order = complete();
        order.total = None;
        assert_eq!(order.validate(), Err(OrderField::Total));

        let mut order = complete();
        order.items.clear();
        assert_eq!(order.validate(), Err(OrderField::Items));
    }

    #[test]
    fn test_field_messages() {
        assert_eq!(OrderField::Total.to_string(), "Order total is required");
        assert_eq!(OrderField::Items.to_string(), "Order items are required");
    }
}
