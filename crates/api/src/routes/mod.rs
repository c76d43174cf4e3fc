pub mod baskets;
pub mod health;
pub mod metrics;
pub mod ordering;
pub mod orders;
pub mod products;
