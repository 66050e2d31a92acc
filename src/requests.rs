//! Cart Requests
//!
//! Translates storefront add/update requests into candidate cart lines.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::{Cart, CartLineItem},
    products::{InvalidProductIdError, LookupError, ProductCatalog, ProductId},
};

/// Errors raised while reading a cart request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request named a malformed product id.
    #[error(transparent)]
    InvalidProductId(#[from] InvalidProductIdError),

    /// The catalog could not resolve the product.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Quantity used on the product page, validating the raw product id first.
///
/// # Errors
///
/// - [`RequestError::InvalidProductId`]: the id is not an integer greater than 0.
/// - [`RequestError::Lookup`]: the catalog does not know the product.
pub fn default_order_qty(
    catalog: &(impl ProductCatalog + ?Sized),
    raw_product: &str,
) -> Result<u32, RequestError> {
    let product = ProductId::parse(raw_product)?;

    Ok(catalog.default_order_qty(product)?)
}

/// An "add to cart" request.
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartRequest {
    /// Raw product id as posted
    pub product: String,

    /// Requested quantity; the catalog default applies when absent
    #[serde(default)]
    pub qty: Option<u32>,
}

impl AddToCartRequest {
    /// The candidate line this request would add.
    ///
    /// # Errors
    ///
    /// - [`RequestError::InvalidProductId`]: the id is not an integer greater than 0.
    /// - [`RequestError::Lookup`]: the catalog does not know the product.
    pub fn candidates(
        &self,
        catalog: &(impl ProductCatalog + ?Sized),
    ) -> Result<Vec<CartLineItem<'static>>, RequestError> {
        let product = ProductId::parse(&self.product)?;

        let qty = match self.qty {
            Some(qty) => qty,
            None => catalog.default_order_qty(product)?,
        };

        Ok(vec![CartLineItem::new(product, qty, catalog.price(product)?)])
    }
}

/// An "update cart" request: new quantities keyed by cart line index.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCartRequest {
    /// Line index -> new quantity
    pub lines: FxHashMap<usize, u32>,
}

impl UpdateCartRequest {
    /// A request that keeps every line of `cart` at its current quantity.
    #[must_use]
    pub fn from_cart(cart: &Cart<'_>) -> Self {
        Self {
            lines: cart
                .iter()
                .enumerate()
                .map(|(index, line)| (index, line.quantity()))
                .collect(),
        }
    }

    /// Set the new quantity of a line.
    #[must_use]
    pub fn with_line(mut self, line: usize, qty: u32) -> Self {
        self.lines.insert(line, qty);
        self
    }

    /// Candidate lines for the cart after the update, in cart order.
    ///
    /// Only lines named by the request are included; each keeps its product and unit price.
    /// Lines the cart no longer has are skipped.
    #[must_use]
    pub fn candidates<'a>(&self, cart: &Cart<'a>) -> Vec<CartLineItem<'a>> {
        cart.iter()
            .enumerate()
            .filter_map(|(index, line)| {
                self.lines
                    .get(&index)
                    .map(|qty| line.with_quantity(*qty))
            })
            .collect()
    }
}
