//! Utils

use clap::{Parser, ValueEnum};

use crate::eligibility::CartAction;

/// Cart action selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Add the candidate on top of the current cart
    Add,
    /// Replace the quantity of a cart line
    Update,
}

impl From<ActionArg> for CartAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Add => CartAction::Add,
            ActionArg::Update => CartAction::Update,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Compact,
    /// Structured JSON output
    Json,
}

/// Arguments for the cart demo
#[derive(Debug, Parser)]
pub struct ExampleCartArgs {
    /// Fixture set to use for the catalog, cart & configuration
    #[clap(short, long, default_value = "storefront")]
    pub fixture: String,

    /// Cart action to check
    #[clap(short, long, value_enum, default_value_t = ActionArg::Add)]
    pub action: ActionArg,

    /// Product id to add, or cart line index to update
    #[clap(short, long)]
    pub target: String,

    /// Quantity; for adds the catalog default applies when omitted
    #[clap(short, long)]
    pub qty: Option<u32>,

    /// Log output format
    #[clap(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
