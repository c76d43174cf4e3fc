//! Building the checkout event from a basket and a checkout request.

use domain::{Basket, BasketItem, CheckoutEvent};

use crate::orchestrator::CheckoutRequest;

/// Sums the item prices of a basket.
///
/// Quantities are not taken into account. Items whose price is missing or
/// not a number add nothing.
pub fn total_price(items: &[BasketItem]) -> f64 {
    items.iter().filter_map(BasketItem::price).sum()
}

/// Merges the checkout request with the stored basket.
///
/// The user name and the items always come from the basket; customer
/// details come from the request.
pub fn build_checkout_event(request: CheckoutRequest, basket: Basket) -> CheckoutEvent {
    CheckoutEvent {
        user_name: basket.user_name,
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        address: request.address,
        payment_method: request.payment_method,
        total_price: total_price(&basket.items),
        items: basket.items,
    }
}
