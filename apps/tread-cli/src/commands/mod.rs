//! # Command Handlers
//!
//! One module per top-level subcommand. Every handler writes to the `out`
//! it is given (stdout in production, a buffer in tests) and renders either
//! a text view or, with `--json`, the serialized records.
//!
//! ```text
//! commands/
//! ├── mod.rs         ◄─── Context, dispatch, shared formatting
//! ├── quote.rs       ◄─── Ad hoc quote (no database)
//! ├── promotions.rs
//! ├── tires.rs
//! ├── wheels.rs
//! ├── fitments.rs
//! ├── stock.rs
//! ├── transfer.rs    ◄─── import / export
//! └── seed.rs
//! ```

pub mod fitments;
pub mod promotions;
pub mod quote;
pub mod seed;
pub mod stock;
pub mod tires;
pub mod transfer;
pub mod wheels;

use serde::Serialize;
use std::io::Write;

use tread_core::{InventoryFilter, Money, PriceQuote};
use tread_db::Database;

use crate::cli::{Command, ListArgs};
use crate::error::AppResult;

/// What every database-backed handler needs.
#[derive(Debug, Clone)]
pub struct Context {
    pub db: Database,
    pub json: bool,
}

/// Runs a database-backed command.
pub async fn dispatch<W: Write>(command: Command, ctx: &Context, out: &mut W) -> AppResult<()> {
    match command {
        Command::Quote(args) => quote::run(args, ctx.json, out),
        Command::Promotions { command } => promotions::run(command, ctx, out).await,
        Command::Tires { command } => tires::run(command, ctx, out).await,
        Command::Wheels { command } => wheels::run(command, ctx, out).await,
        Command::Fitments { command } => fitments::run(command, ctx, out).await,
        Command::Stock { command } => stock::run(command, ctx, out).await,
        Command::Export { command } => transfer::export(command, ctx, out).await,
        Command::Import { command } => transfer::import(command, ctx, out).await,
        Command::Seed => seed::run(ctx, out).await,
    }
}

// =============================================================================
// Shared formatting
// =============================================================================

pub(crate) fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn filter_from(args: ListArgs) -> InventoryFilter {
    InventoryFilter {
        query: args.search,
        brand: args.brand,
    }
}

/// `฿1234.50`, or `-` when absent.
pub(crate) fn money_or_dash(money: Option<Money>) -> String {
    money.map_or_else(|| "-".to_string(), |m| m.to_string())
}

/// One-line summary of a quote for listings.
pub(crate) fn quote_summary(quote: &PriceQuote) -> String {
    match (quote.description(), quote.price_per_item(), quote.price_for_four()) {
        (Some(description), Some(per_item), Some(four)) => {
            format!("{description}: {per_item} each, {four} for 4")
        }
        (None, Some(per_item), Some(four)) => format!("{per_item} each, {four} for 4"),
        _ => "no price".to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tread_core::{compute_quote, Promotion};

    #[test]
    fn test_quote_summary() {
        assert_eq!(quote_summary(&PriceQuote::unavailable()), "no price");

        let plain = compute_quote(Some(Money::from_major(2500)), None);
        assert_eq!(quote_summary(&plain), "฿2500.00 each, ฿10000.00 for 4");

        let promo = Promotion {
            id: 1,
            name: "25 off".to_string(),
            promo_type: "percentage_discount".to_string(),
            value1: Some(25.into()),
            value2: None,
            is_active: true,
            created_at: chrono::Utc::now(),
        };
        let discounted = compute_quote(Some(Money::from_major(2000)), Some(&promo));
        assert_eq!(
            quote_summary(&discounted),
            "25% off: ฿1500.00 each, ฿6000.00 for 4"
        );
    }
}
