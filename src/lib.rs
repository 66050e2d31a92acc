//! Giveaway
//!
//! Giveaway is a rule engine deciding whether free "giveaway" products may be added to a shopping
//! cart next to regular products, and whether a cart holding giveaways may proceed to checkout.
//! Catalog, cart and session state stay with the host platform and are reached through the
//! [`products::ProductClassifier`], [`cart::CartView`] and [`notices::SessionNotifier`] traits.

pub mod cart;
pub mod classification;
pub mod config;
pub mod eligibility;
pub mod fixtures;
pub mod notices;
pub mod prelude;
pub mod products;
pub mod report;
pub mod requests;
pub mod utils;
