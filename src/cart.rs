//! Cart

use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::products::{LookupError, ProductId};

/// Errors related to cart construction.
#[derive(Debug, Error)]
pub enum CartError {
    /// A line's currency differs from the cart currency (index, line currency, cart currency).
    #[error("Line {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),
}

/// One entry of the cart: a product, a quantity and the unit price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartLineItem<'a> {
    product: ProductId,
    quantity: u32,
    unit_price: Money<'a, Currency>,
}

impl<'a> CartLineItem<'a> {
    /// Creates a new line item.
    #[must_use]
    pub fn new(product: ProductId, quantity: u32, unit_price: Money<'a, Currency>) -> Self {
        Self {
            product,
            quantity,
            unit_price,
        }
    }

    /// Returns the product of the line.
    pub fn product(&self) -> ProductId {
        self.product
    }

    /// Returns the quantity of the line.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the unit price of the line.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the same line with a different quantity.
    #[must_use]
    pub fn with_quantity(self, quantity: u32) -> Self {
        Self { quantity, ..self }
    }

    /// Returns `quantity × unit price`.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the product does not fit in a decimal.
    pub fn line_total(&self) -> Result<Money<'a, Currency>, MoneyError> {
        self.unit_price
            .amount()
            .checked_mul(Decimal::from(self.quantity))
            .map(|amount| Money::from_decimal(amount, self.unit_price.currency()))
            .ok_or(MoneyError::Overflow)
    }
}

/// Sums the line totals of `lines`, starting from zero in `currency`.
///
/// # Errors
///
/// Returns a [`MoneyError`] if a line is priced in a different currency or the sum overflows.
pub fn lines_total<'a>(
    lines: &[CartLineItem<'a>],
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, MoneyError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            acc.add(line.line_total()?)
        })
}

/// Read-only view of the host's current cart.
pub trait CartView<'a> {
    /// Currency the cart is priced in.
    fn currency(&self) -> &'static Currency;

    /// Snapshot of the cart lines, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if the host cannot load the cart.
    fn items(&self) -> Result<Vec<CartLineItem<'a>>, LookupError>;

    /// Grand total of the cart.
    ///
    /// Defaults to the sum of line totals; hosts that apply discounts or fees may report
    /// their own figure.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if the cart cannot be read or its lines cannot be totalled.
    fn grand_total(&self) -> Result<Money<'a, Currency>, LookupError> {
        let items = self.items()?;

        lines_total(&items, self.currency())
            .map_err(|err| LookupError::Unavailable(err.to_string()))
    }
}

/// An in-memory cart.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    lines: Vec<CartLineItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a new cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if there was a currency mismatch error.
    pub fn with_lines(
        lines: impl Into<Vec<CartLineItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let lines = lines.into();

        lines.iter().enumerate().try_for_each(|(i, line)| {
            let line_currency = line.unit_price().currency();

            if line_currency == currency {
                Ok(())
            } else {
                Err(CartError::CurrencyMismatch(
                    i,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ))
            }
        })?;

        Ok(Cart { lines, currency })
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`MoneyError`] if there was a money arithmetic or currency mismatch error.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, MoneyError> {
        lines_total(&self.lines, self.currency)
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLineItem<'a>> {
        self.lines.iter()
    }

    /// Get the number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<'a> CartView<'a> for Cart<'a> {
    fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn items(&self) -> Result<Vec<CartLineItem<'a>>, LookupError> {
        Ok(self.lines.clone())
    }
}
