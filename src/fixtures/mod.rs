//! Fixtures
//!
//! YAML fixture sets: `products/<name>.yml` (the catalog), `carts/<name>.yml` (the current
//! cart) and `config/<name>.yml` (raw store configuration).

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartLineItem},
    config::{ConfigurationError, RuleConfig, StoreConfig},
    fixtures::{carts::CartFixture, products::ProductsFixture},
    products::{Catalog, Product, ProductId},
};

pub mod carts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Two product keys share one catalog id
    #[error("Duplicate product id {0}")]
    DuplicateProductId(ProductId),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoProducts,

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),

    /// Store configuration could not be turned into rules
    #[error("Invalid rule configuration: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Catalog built from the product fixtures
    catalog: Catalog,

    /// String key -> catalog id mappings for lookups
    product_keys: FxHashMap<String, ProductId>,

    /// Current cart lines
    lines: Vec<CartLineItem<'static>>,

    /// Raw store configuration
    store: StoreConfig,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: Catalog::new(),
            product_keys: FxHashMap::default(),
            lines: Vec::new(),
            store: StoreConfig::new(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if two products share an id, or
    /// if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            let id = product_fixture.id;
            let product: Product = product_fixture.try_into()?;
            let currency = product.price.currency();

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            if self.catalog.insert(id, product).is_some() {
                return Err(FixtureError::DuplicateProductId(id));
            }

            self.product_keys.insert(key, id);
        }

        Ok(self)
    }

    /// Load the current cart from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for line in fixture.lines {
            let candidate = self.line(&line.product, line.qty)?;

            self.lines.push(candidate);
        }

        Ok(self)
    }

    /// Load raw store configuration from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_config(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("config").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        self.store = StoreConfig::from_yaml(&contents)?;

        Ok(self)
    }

    /// Load a complete fixture set (products, cart, and config with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_cart(name)?
            .load_config(name)?;

        Ok(fixture)
    }

    /// Get a product id by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product_id(&self, key: &str) -> Result<ProductId, FixtureError> {
        self.product_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Build a cart line for the product with the given key, at its catalog price
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn line(&self, key: &str, qty: u32) -> Result<CartLineItem<'static>, FixtureError> {
        let id = self.product_id(key)?;
        let product = self
            .catalog
            .get(id)
            .map_err(|_err| FixtureError::ProductNotFound(key.to_string()))?;

        Ok(CartLineItem::new(id, qty, product.price))
    }

    /// Get the catalog
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Create a cart from the loaded lines
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded or if cart creation fails.
    pub fn cart(&self) -> Result<Cart<'static>, FixtureError> {
        let currency = self.currency()?;

        Ok(Cart::with_lines(self.lines.clone(), currency)?)
    }

    /// Parse the store configuration into rules
    ///
    /// # Errors
    ///
    /// Returns an error if the stored values are invalid.
    pub fn rules(&self) -> Result<RuleConfig, FixtureError> {
        Ok(RuleConfig::from_source(&self.store)?)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoProducts)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
