//! Cart Fixtures

use serde::Deserialize;

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines in insertion order
    #[serde(default)]
    pub lines: Vec<LineFixture>,
}

/// Cart line fixture
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Product key reference
    pub product: String,

    /// Quantity
    pub qty: u32,
}
