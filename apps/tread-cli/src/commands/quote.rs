//! `tread quote`: price a set of four without a database.
//!
//! Runs the same calculator the listings use, so a rule can be tried out
//! before it is saved as a promotion.

use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use tracing::debug;

use tread_core::{compute_quote, evaluate_promotion, Money, PriceQuote, Promotion};

use super::{money_or_dash, write_json};
use crate::cli::QuoteArgs;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
struct QuoteOutput {
    base_price: Option<Money>,
    quote: PriceQuote,
    /// Why the promotion was ignored, when it was.
    ignored_promotion: Option<String>,
}

fn ad_hoc_promotion(args: &QuoteArgs) -> Option<Promotion> {
    let promo_type = args.promo_type.clone()?;
    Some(Promotion {
        id: 0,
        name: "ad hoc".to_string(),
        promo_type,
        value1: args.value1,
        value2: args.value2,
        is_active: true,
        created_at: Utc::now(),
    })
}

pub fn run<W: Write>(args: QuoteArgs, json: bool, out: &mut W) -> AppResult<()> {
    let base = args.price.map(Money::from_decimal);
    let promotion = ad_hoc_promotion(&args);

    let quote = compute_quote(base, promotion.as_ref());
    let ignored_promotion = match (base, promotion.as_ref()) {
        (Some(base), Some(promo)) => match evaluate_promotion(base, Some(promo)) {
            Some(Err(invalid)) => Some(invalid.to_string()),
            None => Some(format!("unrecognised type or missing value for '{}'", promo.promo_type)),
            Some(Ok(_)) => None,
        },
        _ => None,
    };
    debug!(?base, promotional = quote.is_promotional(), "Quote computed");

    if json {
        return write_json(
            out,
            &QuoteOutput {
                base_price: base,
                quote,
                ignored_promotion,
            },
        );
    }

    writeln!(out, "Base price:     {}", money_or_dash(base))?;
    writeln!(out, "Promotion:      {}", quote.description().unwrap_or("none"))?;
    writeln!(out, "Price per item: {}", money_or_dash(quote.price_per_item()))?;
    writeln!(out, "Price for 4:    {}", money_or_dash(quote.price_for_four()))?;
    if let Some(reason) = ignored_promotion {
        writeln!(out, "Note: promotion ignored ({reason})")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::text;
    use rust_decimal::Decimal;

    fn args(price: Option<i64>, promo_type: Option<&str>, value1: Option<i64>, value2: Option<i64>) -> QuoteArgs {
        QuoteArgs {
            price: price.map(Decimal::from),
            promo_type: promo_type.map(str::to_string),
            value1: value1.map(Decimal::from),
            value2: value2.map(Decimal::from),
        }
    }

    #[test]
    fn test_buy_three_get_one() {
        let mut out = Vec::new();
        run(args(Some(2900), Some("buy_x_get_y"), Some(3), Some(1)), false, &mut out).unwrap();

        let text = text(out);
        assert!(text.contains("Buy 3 get 1 free"));
        assert!(text.contains("Price per item: ฿2175.00"));
        assert!(text.contains("Price for 4:    ฿8700.00"));
        assert!(!text.contains("ignored"));
    }

    #[test]
    fn test_invalid_promotion_falls_back_with_note() {
        let mut out = Vec::new();
        run(args(Some(1000), Some("percentage_discount"), Some(150), None), false, &mut out).unwrap();

        let text = text(out);
        assert!(text.contains("Promotion:      none"));
        assert!(text.contains("Price for 4:    ฿4000.00"));
        assert!(text.contains("promotion ignored"));
    }

    #[test]
    fn test_no_price() {
        let mut out = Vec::new();
        run(args(None, None, None, None), true, &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value["base_price"].is_null());
        assert!(value["quote"]["price_for_four"].is_null());
    }

    #[test]
    fn test_unknown_type_noted() {
        let mut out = Vec::new();
        run(args(Some(1000), Some("bogo"), Some(1), None), false, &mut out).unwrap();
        assert!(text(out).contains("unrecognised type"));
    }
}
