//! Basket checkout orchestration.
//!
//! A checkout turns a user's basket into a checkout event on the bus:
//! 1. Validate the request
//! 2. Load the basket (it must exist and have items)
//! 3. Build the event payload
//! 4. Publish the event
//! 5. Delete the basket
//!
//! The basket is only deleted after the event was accepted by the bus, so a
//! failed publish never loses a basket. A failed delete after a successful
//! publish is reported as a warning on an otherwise successful checkout.

pub mod error;
pub mod orchestrator;
pub mod payload;
pub mod state;

pub use error::{CheckoutError, Result};
pub use orchestrator::{
    CheckoutOrchestrator, CheckoutOutcome, CheckoutRequest, CheckoutWarning, EventRouting,
};
pub use payload::{build_checkout_event, total_price};
pub use state::CheckoutState;
