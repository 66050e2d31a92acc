//! Notices
//!
//! Customer-facing messages for denied cart actions, and [`CartGuard`], which pairs an
//! evaluator with the session that displays them.

use rusty_money::{Money, iso::Currency};
use tracing::info;

use crate::{
    cart::{CartLineItem, CartView},
    config::RuleConfig,
    eligibility::{CartAction, EligibilityError, EligibilityEvaluator, Violation},
    products::ProductClassifier,
};

/// Prefix shared by every rejection notice.
pub const REJECTION_PREFIX: &str = "Cannot add item(s) to your shopping cart.";

/// One-way channel to the customer's session.
pub trait SessionNotifier {
    /// Queue a notice for display.
    fn notice(&mut self, message: String);
}

/// A notifier that keeps every message it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    messages: Vec<String>,
}

impl RecordingNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far, oldest first.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl SessionNotifier for RecordingNotifier {
    fn notice(&mut self, message: String) {
        self.messages.push(message);
    }
}

/// Message explaining why a cart action was refused.
pub fn notice_for(violation: Violation, rules: &RuleConfig, currency: &Currency) -> String {
    let detail = match violation {
        Violation::TooManyGiveaways => format!(
            "You can have only {} giveaway item(s) per cart.",
            rules.max_giveaway_qty
        ),
        Violation::NotEnoughNonGiveaways => format!(
            "The total number of items in your cart must be at least {}.",
            rules.min_non_giveaway_qty
        ),
        Violation::BelowMinTotal => format!(
            "The total of the cart must be at least {}.",
            Money::from_decimal(rules.min_cart_total, currency)
        ),
    };

    format!("{REJECTION_PREFIX} {detail}")
}

/// Guards cart actions, telling the customer why an action was refused.
#[derive(Debug)]
pub struct CartGuard<'r, C: ?Sized, N> {
    evaluator: EligibilityEvaluator<'r, C>,
    notifier: N,
}

impl<'r, C, N> CartGuard<'r, C, N>
where
    C: ProductClassifier + ?Sized,
    N: SessionNotifier,
{
    /// Create a guard from an evaluator and the session notifier.
    pub fn new(evaluator: EligibilityEvaluator<'r, C>, notifier: N) -> Self {
        Self {
            evaluator,
            notifier,
        }
    }

    /// Whether the action may go ahead. A refusal queues a notice on the session.
    ///
    /// # Errors
    ///
    /// Returns an [`EligibilityError`] if the evaluation could not be completed; no notice is
    /// sent in that case.
    pub fn allow<'a>(
        &mut self,
        cart: &impl CartView<'a>,
        candidates: &[CartLineItem<'a>],
        action: CartAction,
    ) -> Result<bool, EligibilityError> {
        let result = self.evaluator.evaluate_candidate(cart, candidates, action)?;

        if let Some(reason) = result.reason() {
            let message = notice_for(reason, self.evaluator.rules(), cart.currency());

            info!(%reason, "refused cart action");

            self.notifier.notice(message);

            return Ok(false);
        }

        Ok(true)
    }

    /// The evaluator used by this guard.
    pub fn evaluator(&self) -> &EligibilityEvaluator<'r, C> {
        &self.evaluator
    }

    /// The session notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Consume the guard, returning the notifier.
    pub fn into_notifier(self) -> N {
        self.notifier
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        products::{Catalog, Product, ProductId},
    };

    use super::*;

    #[test]
    fn notices_name_the_threshold() {
        let rules = RuleConfig::enabled("is_giveaway")
            .with_max_giveaway_qty(2)
            .with_min_non_giveaway_qty(3)
            .with_min_cart_total(Decimal::new(100, 0));

        assert_eq!(
            notice_for(Violation::TooManyGiveaways, &rules, GBP),
            "Cannot add item(s) to your shopping cart. You can have only 2 giveaway item(s) per cart."
        );
        assert_eq!(
            notice_for(Violation::NotEnoughNonGiveaways, &rules, GBP),
            "Cannot add item(s) to your shopping cart. The total number of items in your cart must be at least 3."
        );
        assert_eq!(
            notice_for(Violation::BelowMinTotal, &rules, GBP),
            format!(
                "{REJECTION_PREFIX} The total of the cart must be at least {}.",
                Money::from_decimal(Decimal::new(100, 0), GBP)
            )
        );
    }

    #[test]
    fn guard_notifies_only_on_refusal() -> TestResult {
        let giveaway = ProductId::new(10).ok_or("invalid id")?;
        let mut catalog = Catalog::new();
        catalog.insert(
            giveaway,
            Product::new("Tote bag", Money::from_minor(0, GBP)).with_attribute("is_giveaway", true),
        );

        let rules = RuleConfig::enabled("is_giveaway").with_max_giveaway_qty(1);
        let evaluator = EligibilityEvaluator::new(&rules, &catalog);
        let mut guard = CartGuard::new(evaluator, RecordingNotifier::new());

        let cart = Cart::new(GBP);
        let one = CartLineItem::new(giveaway, 1, Money::from_minor(0, GBP));

        assert!(guard.allow(&cart, &[one], CartAction::Add)?);
        assert!(guard.notifier().messages().is_empty());

        assert!(!guard.allow(&cart, &[one.with_quantity(2)], CartAction::Add)?);
        assert_eq!(
            guard.into_notifier().messages(),
            [notice_for(Violation::TooManyGiveaways, &rules, GBP)]
        );

        Ok(())
    }
}
