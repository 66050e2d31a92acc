//! Cart Report
//!
//! Renders cart lines with their giveaway classification, followed by the totals the rules
//! are checked against.

use std::io;

use rusty_money::MoneyError;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartLineItem,
    classification::Classifications,
    eligibility::CartTotals,
    products::{Catalog, ProductId},
};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A line references a product missing from the catalog.
    #[error("Missing product {0}")]
    MissingProduct(ProductId),

    /// A line total could not be computed.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Write a table of `lines` and a summary of `totals` to `out`.
///
/// # Errors
///
/// - [`ReportError::MissingProduct`]: a line's product is not in the catalog.
/// - [`ReportError::Money`]: a line total overflowed.
/// - [`ReportError::IO`]: writing to `out` failed.
pub fn write_report(
    mut out: impl io::Write,
    lines: &[CartLineItem<'_>],
    catalog: &Catalog,
    flags: &Classifications,
    totals: &CartTotals<'_>,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Product", "Name", "Qty", "Unit Price", "Line Total", "Giveaway"]);

    for line in lines {
        let product = catalog
            .get(line.product())
            .map_err(|_err| ReportError::MissingProduct(line.product()))?;

        builder.push_record([
            line.product().to_string(),
            product.name.clone(),
            line.quantity().to_string(),
            line.unit_price().to_string(),
            line.line_total()?.to_string(),
            if flags.is_giveaway(line.product()) {
                "yes".to_string()
            } else {
                String::new()
            },
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..5), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| ReportError::IO)?;

    writeln!(
        out,
        " Giveaways: {}\n Other items: {}\n Total: {}",
        totals.giveaway_qty, totals.non_giveaway_qty, totals.total
    )
    .map_err(|_err| ReportError::IO)
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::products::Product;

    use super::*;

    #[test]
    fn report_lists_lines_and_totals() -> TestResult {
        let regular = ProductId::new(1).ok_or("invalid id")?;
        let giveaway = ProductId::new(2).ok_or("invalid id")?;

        let mut catalog = Catalog::new();
        catalog.insert(regular, Product::new("Kettle", Money::from_minor(2_500, GBP)));
        catalog.insert(
            giveaway,
            Product::new("Tote bag", Money::from_minor(0, GBP)).with_attribute("is_giveaway", true),
        );

        let lines = [
            CartLineItem::new(regular, 2, Money::from_minor(2_500, GBP)),
            CartLineItem::new(giveaway, 1, Money::from_minor(0, GBP)),
        ];
        let flags = Classifications::for_lines(&catalog, "is_giveaway", &lines)?;
        let totals = CartTotals {
            giveaway_qty: 1,
            non_giveaway_qty: 2,
            total: Money::from_minor(5_000, GBP),
        };

        let mut out = Vec::new();
        write_report(&mut out, &lines, &catalog, &flags, &totals)?;
        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Kettle"), "kettle row missing:\n{rendered}");
        assert!(rendered.contains("Tote bag"), "tote bag row missing:\n{rendered}");
        assert!(rendered.contains("Giveaways: 1"), "summary missing:\n{rendered}");
        assert!(rendered.contains("Other items: 2"), "summary missing:\n{rendered}");

        Ok(())
    }

    #[test]
    fn report_errors_on_missing_product() -> TestResult {
        let unknown = ProductId::new(9).ok_or("invalid id")?;
        let lines = [CartLineItem::new(unknown, 1, Money::from_minor(100, GBP))];
        let totals = CartTotals {
            giveaway_qty: 0,
            non_giveaway_qty: 1,
            total: Money::from_minor(100, GBP),
        };

        let result = write_report(
            Vec::new(),
            &lines,
            &Catalog::new(),
            &Classifications::default(),
            &totals,
        );

        assert!(matches!(result, Err(ReportError::MissingProduct(id)) if id == unknown));

        Ok(())
    }
}
