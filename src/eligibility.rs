//! Eligibility
//!
//! Decides whether giveaway products may join a cart. Every operation is a pure function of
//! the cart snapshot, the candidate lines and the [`RuleConfig`]; the only side effects are
//! reads from the [`ProductClassifier`].

use std::fmt;

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::{Span, debug};

use crate::{
    cart::{CartLineItem, CartView, lines_total},
    classification::Classifications,
    config::{ConfigKey, ConfigurationError, RuleConfig},
    products::{InvalidProductIdError, LookupError, ProductClassifier, ProductId},
};

/// Errors that stop an evaluation. Rule violations are reported through
/// [`EvaluationResult`] instead.
#[derive(Debug, Error)]
pub enum EligibilityError {
    /// The rules are disabled or incomplete.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A caller supplied a malformed product id.
    #[error(transparent)]
    InvalidProductId(#[from] InvalidProductIdError),

    /// A catalog or cart collaborator failed.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The cart operation being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    /// Candidate lines are added on top of the current cart.
    Add,

    /// Candidate lines replace the current cart.
    Update,
}

/// The first rule a projected cart breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// More giveaways than the per-cart maximum.
    TooManyGiveaways,

    /// Fewer non-giveaway products than required.
    NotEnoughNonGiveaways,

    /// Cart total below the configured minimum.
    BelowMinTotal,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Violation::TooManyGiveaways => "TOO_MANY_GIVEAWAYS",
            Violation::NotEnoughNonGiveaways => "NOT_ENOUGH_NON_GIVEAWAYS",
            Violation::BelowMinTotal => "BELOW_MIN_TOTAL",
        })
    }
}

/// Quantities and total of a cart, split by classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals<'a> {
    /// Summed quantity of giveaway lines
    pub giveaway_qty: u64,

    /// Summed quantity of non-giveaway lines
    pub non_giveaway_qty: u64,

    /// Cart total
    pub total: Money<'a, Currency>,
}

impl CartTotals<'_> {
    /// First threshold these totals break, checked in order: giveaway maximum, non-giveaway
    /// minimum, minimum total.
    pub fn violation(&self, rules: &RuleConfig) -> Option<Violation> {
        if self.giveaway_qty > u64::from(rules.max_giveaway_qty) {
            Some(Violation::TooManyGiveaways)
        } else if self.non_giveaway_qty < u64::from(rules.min_non_giveaway_qty) {
            Some(Violation::NotEnoughNonGiveaways)
        } else if *self.total.amount() < rules.min_cart_total {
            Some(Violation::BelowMinTotal)
        } else {
            None
        }
    }
}

/// Outcome of checking a cart action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationResult<'a> {
    reason: Option<Violation>,
    projected: Option<CartTotals<'a>>,
}

impl<'a> EvaluationResult<'a> {
    fn allowed(projected: Option<CartTotals<'a>>) -> Self {
        Self {
            reason: None,
            projected,
        }
    }

    fn denied(reason: Violation, projected: CartTotals<'a>) -> Self {
        Self {
            reason: Some(reason),
            projected: Some(projected),
        }
    }

    /// Whether the action may go ahead.
    pub fn is_allowed(&self) -> bool {
        self.reason.is_none()
    }

    /// The violated rule, when the action is denied.
    pub fn reason(&self) -> Option<Violation> {
        self.reason
    }

    /// The projected cart totals, when they had to be computed.
    pub fn projected(&self) -> Option<&CartTotals<'a>> {
        self.projected.as_ref()
    }
}

/// Evaluates the giveaway rules against carts.
pub struct EligibilityEvaluator<'r, C: ?Sized> {
    rules: &'r RuleConfig,
    classifier: &'r C,
}

impl<C: ?Sized> fmt::Debug for EligibilityEvaluator<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EligibilityEvaluator")
            .field("rules", self.rules)
            .finish_non_exhaustive()
    }
}

impl<'r, C> EligibilityEvaluator<'r, C>
where
    C: ProductClassifier + ?Sized,
{
    /// Create an evaluator over the given rules and classifier.
    pub fn new(rules: &'r RuleConfig, classifier: &'r C) -> Self {
        Self { rules, classifier }
    }

    /// Whether the rules are switched on.
    pub fn is_enabled(&self) -> bool {
        self.rules.enabled
    }

    /// The rules being evaluated.
    pub fn rules(&self) -> &'r RuleConfig {
        self.rules
    }

    fn active_rules(&self) -> Result<&'r RuleConfig, ConfigurationError> {
        if !self.rules.enabled {
            return Err(ConfigurationError::Disabled);
        }

        if self.rules.giveaway_attribute.is_empty() {
            return Err(ConfigurationError::MissingValue(
                ConfigKey::GiveawayAttribute,
            ));
        }

        Ok(self.rules)
    }

    /// Whether `product` is marked as a giveaway.
    ///
    /// # Errors
    ///
    /// - [`EligibilityError::Configuration`]: the rules are disabled.
    /// - [`EligibilityError::Lookup`]: the classifier failed, including for unknown products.
    pub fn classify(&self, product: ProductId) -> Result<bool, EligibilityError> {
        let rules = self.active_rules()?;

        Ok(self
            .classifier
            .is_giveaway(product, &rules.giveaway_attribute)?)
    }

    /// Classify every product referenced by `lines`.
    ///
    /// # Errors
    ///
    /// - [`EligibilityError::Configuration`]: the rules are disabled.
    /// - [`EligibilityError::Lookup`]: the classifier could not be read.
    pub fn classifications(
        &self,
        lines: &[CartLineItem<'_>],
    ) -> Result<Classifications, EligibilityError> {
        let rules = self.active_rules()?;

        Ok(Classifications::for_lines(
            self.classifier,
            &rules.giveaway_attribute,
            lines,
        )?)
    }

    /// Summed quantity of the giveaway (or non-giveaway) lines of `items`.
    ///
    /// Products unknown to the catalog count as non-giveaways.
    ///
    /// # Errors
    ///
    /// - [`EligibilityError::Configuration`]: the rules are disabled.
    /// - [`EligibilityError::Lookup`]: the classifier could not be read.
    pub fn aggregate(
        &self,
        items: &[CartLineItem<'_>],
        is_giveaway: bool,
    ) -> Result<u64, EligibilityError> {
        Ok(self.classifications(items)?.quantity(items, is_giveaway))
    }

    /// Quantities and grand total of the current cart.
    ///
    /// # Errors
    ///
    /// - [`EligibilityError::Configuration`]: the rules are disabled.
    /// - [`EligibilityError::Lookup`]: the cart or classifier could not be read.
    pub fn cart_totals<'a>(
        &self,
        cart: &impl CartView<'a>,
    ) -> Result<CartTotals<'a>, EligibilityError> {
        let items = cart.items()?;
        let flags = self.classifications(&items)?;

        Ok(CartTotals {
            giveaway_qty: flags.quantity(&items, true),
            non_giveaway_qty: flags.quantity(&items, false),
            total: cart.grand_total()?,
        })
    }

    /// Whether the customer may add another giveaway to the current cart.
    ///
    /// Requires fewer giveaways than the maximum, enough non-giveaways, a grand total at or
    /// above the minimum and at least one saleable giveaway in the catalog.
    ///
    /// # Errors
    ///
    /// - [`EligibilityError::Configuration`]: the rules are disabled.
    /// - [`EligibilityError::Lookup`]: the cart or catalog could not be read.
    #[tracing::instrument(
        name = "eligibility.can_add_giveaways",
        skip(self, cart),
        fields(
            giveaway_qty = tracing::field::Empty,
            non_giveaway_qty = tracing::field::Empty
        ),
        err
    )]
    pub fn can_add_giveaways<'a>(&self, cart: &impl CartView<'a>) -> Result<bool, EligibilityError> {
        let rules = self.active_rules()?;
        let totals = self.cart_totals(cart)?;

        let span = Span::current();
        span.record("giveaway_qty", totals.giveaway_qty);
        span.record("non_giveaway_qty", totals.non_giveaway_qty);

        if totals.giveaway_qty >= u64::from(rules.max_giveaway_qty)
            || totals.non_giveaway_qty < u64::from(rules.min_non_giveaway_qty)
            || *totals.total.amount() < rules.min_cart_total
        {
            return Ok(false);
        }

        Ok(self
            .classifier
            .has_saleable_giveaways(&rules.giveaway_attribute)?)
    }

    /// Check a pending add or update against the rules.
    ///
    /// For [`CartAction::Add`] the candidates are projected on top of the current cart; an add
    /// with no giveaway candidates is allowed without reading the cart. For
    /// [`CartAction::Update`] the candidates are the whole new cart. Thresholds only apply when
    /// at least one candidate is a giveaway.
    ///
    /// # Errors
    ///
    /// - [`EligibilityError::Configuration`]: the rules are disabled.
    /// - [`EligibilityError::Lookup`]: the cart or classifier could not be read.
    /// - [`EligibilityError::Money`]: a candidate is priced in another currency.
    #[tracing::instrument(
        name = "eligibility.evaluate_candidate",
        skip(self, cart, candidates),
        fields(
            candidate_count = candidates.len(),
            giveaway_qty = tracing::field::Empty,
            non_giveaway_qty = tracing::field::Empty,
            reason = tracing::field::Empty
        ),
        err
    )]
    pub fn evaluate_candidate<'a>(
        &self,
        cart: &impl CartView<'a>,
        candidates: &[CartLineItem<'a>],
        action: CartAction,
    ) -> Result<EvaluationResult<'a>, EligibilityError> {
        let rules = self.active_rules()?;
        let attribute = rules.giveaway_attribute.as_str();

        let candidate_flags = Classifications::for_lines(self.classifier, attribute, candidates)?;

        if !candidate_flags.any_giveaway(candidates) {
            debug!("no giveaway candidates, allowing");
            return Ok(EvaluationResult::allowed(None));
        }

        let currency = cart.currency();
        let candidate_total = lines_total(candidates, currency)?;

        let projected = match action {
            CartAction::Add => {
                let items = cart.items()?;
                let cart_flags = Classifications::for_lines(self.classifier, attribute, &items)?;

                CartTotals {
                    giveaway_qty: cart_flags.quantity(&items, true)
                        + candidate_flags.quantity(candidates, true),
                    non_giveaway_qty: cart_flags.quantity(&items, false)
                        + candidate_flags.quantity(candidates, false),
                    total: cart.grand_total()?.add(candidate_total)?,
                }
            }
            CartAction::Update => CartTotals {
                giveaway_qty: candidate_flags.quantity(candidates, true),
                non_giveaway_qty: candidate_flags.quantity(candidates, false),
                total: candidate_total,
            },
        };

        let span = Span::current();
        span.record("giveaway_qty", projected.giveaway_qty);
        span.record("non_giveaway_qty", projected.non_giveaway_qty);

        match projected.violation(rules) {
            Some(reason) => {
                span.record("reason", tracing::field::display(reason));
                debug!(%reason, "cart action denied");

                Ok(EvaluationResult::denied(reason, projected))
            }
            None => Ok(EvaluationResult::allowed(Some(projected))),
        }
    }

    /// Whether the current cart may proceed to checkout.
    ///
    /// An empty cart is always valid. Otherwise the cart needs at least one non-giveaway line,
    /// no more giveaways than the maximum, enough non-giveaways when it holds giveaways, and a
    /// grand total at or above the minimum.
    ///
    /// # Errors
    ///
    /// - [`EligibilityError::Configuration`]: the cart is not empty and the rules are disabled.
    /// - [`EligibilityError::Lookup`]: the cart or classifier could not be read.
    #[tracing::instrument(name = "eligibility.is_cart_valid_for_checkout", skip(self, cart), err)]
    pub fn is_cart_valid_for_checkout<'a>(
        &self,
        cart: &impl CartView<'a>,
    ) -> Result<bool, EligibilityError> {
        let items = cart.items()?;

        if items.is_empty() {
            return Ok(true);
        }

        let rules = self.active_rules()?;
        let flags = self.classifications(&items)?;

        let has_non_giveaway = items.iter().any(|line| !flags.is_giveaway(line.product()));
        let giveaway_qty = flags.quantity(&items, true);
        let non_giveaway_qty = flags.quantity(&items, false);

        let too_many_giveaways = giveaway_qty > u64::from(rules.max_giveaway_qty);
        let missing_non_giveaways =
            giveaway_qty > 0 && non_giveaway_qty < u64::from(rules.min_non_giveaway_qty);
        let below_min_total = *cart.grand_total()?.amount() < rules.min_cart_total;

        debug!(
            has_non_giveaway,
            too_many_giveaways, missing_non_giveaways, below_min_total, "checkout validity"
        );

        Ok(has_non_giveaway && !too_many_giveaways && !missing_non_giveaways && !below_min_total)
    }

    /// The giveaway list page to forward to, when forwarding is configured and the cart can
    /// still take giveaways.
    ///
    /// # Errors
    ///
    /// - [`EligibilityError::Lookup`]: the cart or catalog could not be read.
    pub fn giveaways_page<'a>(
        &self,
        cart: &impl CartView<'a>,
    ) -> Result<Option<&'static str>, EligibilityError> {
        let Some(page) = self.rules.giveaways_page() else {
            return Ok(None);
        };

        Ok(self.can_add_giveaways(cart)?.then_some(page))
    }
}
