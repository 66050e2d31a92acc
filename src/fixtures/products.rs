//! Product Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{Product, ProductId},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Catalog id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product price (e.g., "2.99 GBP")
    pub price: String,

    /// Boolean attributes set to true
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Whether the product can be bought
    #[serde(default = "default_true")]
    pub saleable: bool,

    /// Whether the product is listed
    #[serde(default = "default_true")]
    pub visible: bool,

    /// Quantity suggested on the product page
    #[serde(default)]
    pub default_qty: Option<u32>,
}

fn default_true() -> bool {
    true
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let price = parse_price(fixture.id, &fixture.price)?;

        let mut product = Product::new(fixture.name, price);

        for attribute in fixture.attributes {
            product = product.with_attribute(attribute, true);
        }

        product.saleable = fixture.saleable;
        product.visible = fixture.visible;
        product.default_qty = fixture.default_qty;

        Ok(product)
    }
}

/// Parse the catalog price of `product` (e.g., "2.99 GBP") into money.
///
/// The amount keeps its full decimal precision and may use any ISO 4217 currency code.
///
/// # Errors
///
/// - [`FixtureError::InvalidPrice`]: the string is not "AMOUNT CURRENCY" or the amount is
///   negative or not a decimal.
/// - [`FixtureError::UnknownCurrency`]: the currency code is not an ISO currency.
pub fn parse_price(
    product: ProductId,
    raw: &str,
) -> Result<Money<'static, Currency>, FixtureError> {
    let invalid = || FixtureError::InvalidPrice(format!("product {product}: {raw:?}"));

    let mut parts = raw.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let amount = amount.parse::<Decimal>().map_err(|_err| invalid())?;

    if amount.is_sign_negative() {
        return Err(invalid());
    }

    let currency =
        iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    Ok(Money::from_decimal(amount, currency))
}
