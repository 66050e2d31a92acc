//! Giveaway prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLineItem, CartView},
    classification::Classifications,
    config::{ConfigKey, ConfigSource, ConfigurationError, RuleConfig, StoreConfig},
    eligibility::{
        CartAction, CartTotals, EligibilityError, EligibilityEvaluator, EvaluationResult,
        Violation,
    },
    notices::{CartGuard, RecordingNotifier, SessionNotifier, notice_for},
    products::{
        Catalog, InvalidProductIdError, LookupError, Product, ProductCatalog, ProductClassifier,
        ProductId,
    },
    requests::{AddToCartRequest, RequestError, UpdateCartRequest},
};
