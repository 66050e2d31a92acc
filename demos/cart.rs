//! Cart Example
//!
//! Checks a pending cart action against the giveaway rules of a fixture set and prints the
//! projected cart.
//!
//! Use `-f` to load a fixture set by name
//! Use `-a add -t <product id>` to add a product, `-a update -t <line index>` to change a line
//! Use `-q` to set the quantity
//! Set `RUST_LOG=debug` to see the evaluation spans

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use giveaway::{
    cart::{CartLineItem, CartView},
    eligibility::{CartAction, EligibilityEvaluator},
    fixtures::Fixture,
    notices::{CartGuard, RecordingNotifier},
    report::write_report,
    requests::{AddToCartRequest, UpdateCartRequest},
    utils::{ExampleCartArgs, LogFormat},
};

fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_target(true))
            .try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()?,
    }

    Ok(())
}

/// Cart Example
pub fn main() -> Result<()> {
    let args = ExampleCartArgs::parse();

    init_logging(args.log_format)?;

    let fixture = Fixture::from_set(&args.fixture)?;
    let catalog = fixture.catalog();
    let cart = fixture.cart()?;
    let rules = fixture.rules()?;
    let action = CartAction::from(args.action);

    let candidates: Vec<CartLineItem<'static>> = match action {
        CartAction::Add => AddToCartRequest {
            product: args.target.clone(),
            qty: args.qty,
        }
        .candidates(catalog)?,
        CartAction::Update => {
            let line = args
                .target
                .parse::<usize>()
                .context("update target must be a cart line index")?;
            let qty = args.qty.context("update requires a quantity")?;

            UpdateCartRequest::from_cart(&cart)
                .with_line(line, qty)
                .candidates(&cart)
        }
    };

    let evaluator = EligibilityEvaluator::new(&rules, catalog);
    let result = evaluator.evaluate_candidate(&cart, &candidates, action)?;

    let mut projected = match action {
        CartAction::Add => cart.items()?,
        CartAction::Update => Vec::new(),
    };
    projected.extend_from_slice(&candidates);

    let flags = evaluator.classifications(&projected)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if let Some(totals) = result.projected() {
        write_report(&mut handle, &projected, catalog, &flags, totals)?;
    } else {
        write_report(&mut handle, &projected, catalog, &flags, &evaluator.cart_totals(&cart)?)?;
    }

    let mut guard = CartGuard::new(evaluator, RecordingNotifier::new());
    let allowed = guard.allow(&cart, &candidates, action)?;

    writeln!(handle, "\nAllowed: {allowed}")?;

    for message in guard.notifier().messages() {
        writeln!(handle, "Notice: {message}")?;
    }

    writeln!(
        handle,
        "Checkout available: {}",
        guard.evaluator().is_cart_valid_for_checkout(&cart)?
    )?;

    if let Some(page) = guard.evaluator().giveaways_page(&cart)? {
        writeln!(handle, "Forward to: /{page}")?;
    }

    Ok(())
}
