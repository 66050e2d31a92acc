//! Classification
//!
//! Giveaway flags for every product touched by one evaluation. Flags are fetched in a single
//! batch when the classifier supports it, otherwise once per distinct product.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::warn;

use crate::{
    cart::CartLineItem,
    products::{LookupError, ProductClassifier, ProductId},
};

/// Giveaway flags keyed by product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classifications {
    flags: FxHashMap<ProductId, bool>,
}

impl Classifications {
    /// Classify every product referenced by `lines`.
    ///
    /// Products unknown to the catalog are recorded as non-giveaways.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] if the classifier cannot be read.
    pub fn for_lines<'l, 'a: 'l, C>(
        classifier: &C,
        attribute: &str,
        lines: impl IntoIterator<Item = &'l CartLineItem<'a>>,
    ) -> Result<Self, LookupError>
    where
        C: ProductClassifier + ?Sized,
    {
        let mut products: SmallVec<[ProductId; 8]> =
            lines.into_iter().map(CartLineItem::product).collect();

        products.sort_unstable();
        products.dedup();

        Self::for_products(classifier, attribute, &products)
    }

    /// Classify the given distinct products.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Unavailable`] if the classifier cannot be read.
    pub fn for_products<C>(
        classifier: &C,
        attribute: &str,
        products: &[ProductId],
    ) -> Result<Self, LookupError>
    where
        C: ProductClassifier + ?Sized,
    {
        let mut flags = FxHashMap::default();

        if products.is_empty() {
            return Ok(Self { flags });
        }

        if let Some(batch) = classifier.classify_all(products, attribute)? {
            for product in products {
                let is_giveaway = batch.get(product).copied().unwrap_or_else(|| {
                    warn!(%product, "product missing from catalog, treating as non-giveaway");
                    false
                });

                flags.insert(*product, is_giveaway);
            }

            return Ok(Self { flags });
        }

        for product in products {
            if flags.contains_key(product) {
                continue;
            }

            let is_giveaway = match classifier.is_giveaway(*product, attribute) {
                Ok(flag) => flag,
                Err(LookupError::ProductNotFound(_)) => {
                    warn!(%product, "product missing from catalog, treating as non-giveaway");
                    false
                }
                Err(err) => return Err(err),
            };

            flags.insert(*product, is_giveaway);
        }

        Ok(Self { flags })
    }

    /// Whether `product` was classified as a giveaway.
    ///
    /// Products that were not part of the classification are non-giveaways.
    pub fn is_giveaway(&self, product: ProductId) -> bool {
        self.flags.get(&product).copied().unwrap_or(false)
    }

    /// Whether any of `lines` is a giveaway.
    pub fn any_giveaway(&self, lines: &[CartLineItem<'_>]) -> bool {
        lines.iter().any(|line| self.is_giveaway(line.product()))
    }

    /// Sum of quantities of the lines whose flag equals `is_giveaway`.
    pub fn quantity(&self, lines: &[CartLineItem<'_>], is_giveaway: bool) -> u64 {
        lines
            .iter()
            .filter(|line| self.is_giveaway(line.product()) == is_giveaway)
            .map(|line| u64::from(line.quantity()))
            .sum()
    }

    /// Number of classified products.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether nothing was classified.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
