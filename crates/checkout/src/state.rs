//! Checkout state machine.

use serde::{Deserialize, Serialize};

/// How far a checkout has progressed.
///
/// State transitions:
/// ```text
/// Received ──► Validated ──► BasketLoaded ──► PayloadBuilt ──► EventPublished ──► BasketCleared
/// ```
///
/// A failure before `EventPublished` leaves no side effects. A checkout that
/// stops at `EventPublished` has succeeded but left the basket behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckoutState {
    /// The request arrived.
    #[default]
    Received,

    /// The request names a user.
    Validated,

    /// The user's basket exists and has items.
    BasketLoaded,

    /// The checkout event payload is ready.
    PayloadBuilt,

    /// The bus accepted the checkout event.
    EventPublished,

    /// The basket was deleted (terminal state).
    BasketCleared,
}

impl CheckoutState {
    /// Returns the state that follows this one, if any.
    pub fn next(&self) -> Option<CheckoutState> {
        match self {
            CheckoutState::Received => Some(CheckoutState::Validated),
            CheckoutState::Validated => Some(CheckoutState::BasketLoaded),
            CheckoutState::BasketLoaded => Some(CheckoutState::PayloadBuilt),
            CheckoutState::PayloadBuilt => Some(CheckoutState::EventPublished),
            CheckoutState::EventPublished => Some(CheckoutState::BasketCleared),
            CheckoutState::BasketCleared => None,
        }
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Received => "Received",
            CheckoutState::Validated => "Validated",
            CheckoutState::BasketLoaded => "BasketLoaded",
            CheckoutState::PayloadBuilt => "PayloadBuilt",
            CheckoutState::EventPublished => "EventPublished",
            CheckoutState::BasketCleared => "BasketCleared",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_received() {
        assert_eq!(CheckoutState::default(), CheckoutState::Received);
    }

    #[test]
    fn test_transitions_walk_every_state_once() {
        let mut state = CheckoutState::Received;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            state = next;
            visited.push(state);
        }
        assert_eq!(visited.len(), 6);
        assert_eq!(state, CheckoutState::BasketCleared);
    }

    #[test]
    fn test_display() {
        assert_eq!(CheckoutState::Received.to_string(), "Received");
        assert_eq!(CheckoutState::EventPublished.to_string(), "EventPublished");
        assert_eq!(CheckoutState::BasketCleared.to_string(), "BasketCleared");
    }
}
