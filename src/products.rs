//! Products

use std::{fmt, num::NonZeroU32, str::FromStr};

use mockall::automock;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

/// A catalog identifier that was not a positive integer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("product id must be an integer greater than 0, got {0:?}")]
pub struct InvalidProductIdError(pub String);

/// Errors raised by the catalog collaborators.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    /// The product does not exist in the catalog.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The backing store could not answer the lookup.
    #[error("catalog lookup failed: {0}")]
    Unavailable(String),
}

/// Host catalog product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "i64")]
pub struct ProductId(NonZeroU32);

impl ProductId {
    /// Creates a product id, returning `None` for zero.
    #[must_use]
    pub fn new(id: u32) -> Option<Self> {
        NonZeroU32::new(id).map(Self)
    }

    /// Parses a raw identifier as supplied by a cart request.
    ///
    /// Surrounding whitespace is ignored. A value with a fractional part equal to zero
    /// (`"12.0"`) is accepted, matching how the storefront posts numeric fields.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidProductIdError`] if the value is not an integer greater than 0.
    pub fn parse(raw: &str) -> Result<Self, InvalidProductIdError> {
        let trimmed = raw.trim();
        let invalid = || InvalidProductIdError(raw.to_string());

        let integral = match trimmed.split_once('.') {
            Some((whole, fraction)) if !fraction.is_empty() && fraction.bytes().all(|b| b == b'0') => {
                whole
            }
            Some(_) => return Err(invalid()),
            None => trimmed,
        };

        let value = integral.parse::<i64>().map_err(|_err| invalid())?;

        Self::try_from(value).map_err(|_err| invalid())
    }

    /// Returns the raw identifier.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<i64> for ProductId {
    type Error = InvalidProductIdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| InvalidProductIdError(value.to_string()))
    }
}

impl FromStr for ProductId {
    type Err = InvalidProductIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Answers whether catalog products carry the giveaway marker attribute.
#[automock]
pub trait ProductClassifier {
    /// Returns the boolean value of `attribute` for a single product.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::ProductNotFound`] for unknown products, or
    /// [`LookupError::Unavailable`] if the store cannot be read.
    fn is_giveaway(&self, product: ProductId, attribute: &str) -> Result<bool, LookupError>;

    /// Classifies many products in one round-trip.
    ///
    /// Returns `Ok(None)` when the collaborator has no batch lookup, in which case callers
    /// fall back to [`ProductClassifier::is_giveaway`]. Products missing from the returned map
    /// are unknown to the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] if the store cannot be read.
    fn classify_all(
        &self,
        _products: &[ProductId],
        _attribute: &str,
    ) -> Result<Option<FxHashMap<ProductId, bool>>, LookupError> {
        Ok(None)
    }

    /// Whether at least one visible, saleable product is marked with `attribute`.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] if the store cannot be read.
    fn has_saleable_giveaways(&self, attribute: &str) -> Result<bool, LookupError>;
}

/// Catalog data needed to turn a cart request into candidate lines.
#[automock]
pub trait ProductCatalog {
    /// Current unit price of a product.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if the product cannot be found.
    fn price(&self, product: ProductId) -> Result<Money<'static, Currency>, LookupError>;

    /// Quantity used when a request does not state one.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] if the product cannot be found.
    fn default_order_qty(&self, product: ProductId) -> Result<u32, LookupError>;
}

/// Product
#[derive(Debug, Clone)]
pub struct Product {
    /// Product name
    pub name: String,

    /// Unit price
    pub price: Money<'static, Currency>,

    /// Boolean product attributes, keyed by attribute code
    pub attributes: FxHashMap<String, bool>,

    /// Whether the product can currently be bought
    pub saleable: bool,

    /// Whether the product is listed in the catalog
    pub visible: bool,

    /// Quantity suggested on the product page
    pub default_qty: Option<u32>,
}

impl Product {
    /// Creates a visible, saleable product without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Money<'static, Currency>) -> Self {
        Self {
            name: name.into(),
            price,
            attributes: FxHashMap::default(),
            saleable: true,
            visible: true,
            default_qty: None,
        }
    }

    /// Sets a boolean attribute.
    #[must_use]
    pub fn with_attribute(mut self, code: impl Into<String>, value: bool) -> Self {
        self.attributes.insert(code.into(), value);
        self
    }

    /// Returns the value of a boolean attribute, `false` when unset.
    pub fn attribute(&self, code: &str) -> bool {
        self.attributes.get(code).copied().unwrap_or(false)
    }
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: FxHashMap<ProductId, Product>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product.
    pub fn insert(&mut self, id: ProductId, product: Product) -> Option<Product> {
        self.products.insert(id, product)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::ProductNotFound`] if no product has this id.
    pub fn get(&self, id: ProductId) -> Result<&Product, LookupError> {
        self.products
            .get(&id)
            .ok_or(LookupError::ProductNotFound(id))
    }

    /// Number of products in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductClassifier for Catalog {
    fn is_giveaway(&self, product: ProductId, attribute: &str) -> Result<bool, LookupError> {
        Ok(self.get(product)?.attribute(attribute))
    }

    fn classify_all(
        &self,
        products: &[ProductId],
        attribute: &str,
    ) -> Result<Option<FxHashMap<ProductId, bool>>, LookupError> {
        let found = products
            .iter()
            .filter_map(|id| {
                self.products
                    .get(id)
                    .map(|product| (*id, product.attribute(attribute)))
            })
            .collect();

        Ok(Some(found))
    }

    fn has_saleable_giveaways(&self, attribute: &str) -> Result<bool, LookupError> {
        Ok(self
            .products
            .values()
            .any(|product| product.visible && product.saleable && product.attribute(attribute)))
    }
}

impl ProductCatalog for Catalog {
    fn price(&self, product: ProductId) -> Result<Money<'static, Currency>, LookupError> {
        Ok(self.get(product)?.price)
    }

    fn default_order_qty(&self, product: ProductId) -> Result<u32, LookupError> {
        Ok(self.get(product)?.default_qty.unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    fn id(raw: u32) -> Result<ProductId, InvalidProductIdError> {
        ProductId::new(raw).ok_or_else(|| InvalidProductIdError(raw.to_string()))
    }

    #[test]
    fn parse_accepts_positive_integers() -> TestResult {
        assert_eq!(ProductId::parse("42")?.get(), 42);
        assert_eq!(ProductId::parse(" 7 ")?.get(), 7);
        assert_eq!(ProductId::parse("12.0")?.get(), 12);

        Ok(())
    }

    #[test]
    fn parse_rejects_non_positive_and_non_integers() {
        for raw in ["0", "-3", "1.5", "abc", "", "12.", "4294967296"] {
            assert_eq!(
                ProductId::parse(raw),
                Err(InvalidProductIdError(raw.to_string())),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn try_from_i64_rejects_zero() {
        assert!(ProductId::try_from(0_i64).is_err());
        assert!(ProductId::try_from(-1_i64).is_err());
        assert!(ProductId::try_from(1_i64).is_ok());
    }

    #[test]
    fn catalog_classifies_by_attribute() -> TestResult {
        let mut catalog = Catalog::new();
        catalog.insert(
            id(1)?,
            Product::new("Tote bag", Money::from_minor(0, GBP)).with_attribute("is_giveaway", true),
        );
        catalog.insert(id(2)?, Product::new("Kettle", Money::from_minor(2_500, GBP)));

        assert!(catalog.is_giveaway(id(1)?, "is_giveaway")?);
        assert!(!catalog.is_giveaway(id(2)?, "is_giveaway")?);
        assert!(!catalog.is_giveaway(id(1)?, "other_flag")?);
        assert_eq!(
            catalog.is_giveaway(id(3)?, "is_giveaway"),
            Err(LookupError::ProductNotFound(id(3)?))
        );

        Ok(())
    }

    #[test]
    fn classify_all_omits_unknown_products() -> TestResult {
        let mut catalog = Catalog::new();
        catalog.insert(
            id(1)?,
            Product::new("Tote bag", Money::from_minor(0, GBP)).with_attribute("is_giveaway", true),
        );

        let classified = catalog
            .classify_all(&[id(1)?, id(9)?], "is_giveaway")?
            .unwrap_or_default();

        assert_eq!(classified.len(), 1);
        assert_eq!(classified.get(&id(1)?), Some(&true));

        Ok(())
    }

    #[test]
    fn saleable_giveaways_ignore_hidden_and_unsaleable_products() -> TestResult {
        let mut catalog = Catalog::new();
        let mut hidden =
            Product::new("Hidden", Money::from_minor(0, GBP)).with_attribute("is_giveaway", true);
        hidden.visible = false;
        catalog.insert(id(1)?, hidden);

        let mut sold_out =
            Product::new("Sold out", Money::from_minor(0, GBP)).with_attribute("is_giveaway", true);
        sold_out.saleable = false;
        catalog.insert(id(2)?, sold_out);

        assert!(!catalog.has_saleable_giveaways("is_giveaway")?);

        catalog.insert(
            id(3)?,
            Product::new("Sticker", Money::from_minor(0, GBP)).with_attribute("is_giveaway", true),
        );

        assert!(catalog.has_saleable_giveaways("is_giveaway")?);

        Ok(())
    }

    #[test]
    fn default_order_qty_falls_back_to_one() -> TestResult {
        let mut catalog = Catalog::new();
        let mut pack = Product::new("Pack", Money::from_minor(300, GBP));
        pack.default_qty = Some(6);
        catalog.insert(id(1)?, pack);
        catalog.insert(id(2)?, Product::new("Single", Money::from_minor(100, GBP)));

        assert_eq!(catalog.default_order_qty(id(1)?)?, 6);
        assert_eq!(catalog.default_order_qty(id(2)?)?, 1);
        assert_eq!(catalog.price(id(2)?)?, Money::from_minor(100, GBP));

        Ok(())
    }
}
