//! # Price Quotes
//!
//! Derives the effective per-item price, the price for a set of four, and a
//! human-readable description from a base price and an optional promotion.
//!
//! ## Evaluation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        compute_quote                                    │
//! │                                                                         │
//! │  base price missing? ──────────────────────────► all-empty quote        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  promotion missing / inactive? ────────┐                                │
//! │       │                                │                                │
//! │       ▼                                │                                │
//! │  tag unknown / parameter missing? ─────┤                                │
//! │       │                                │                                │
//! │       ▼                                │                                │
//! │  PromotionRule::apply(base)            │                                │
//! │       ├── Ok(discount) ──► quote at discounted price + description      │
//! │       └── Err(invalid) ────────────────┤                                │
//! │                                        ▼                                │
//! │                              quote at base price, no description        │
//! │                                                                         │
//! │  Every quote: price_for_four = price_per_item × 4                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rejected rule never reaches the caller as an error: its marker is
//! discarded and the base price stands. Callers that want to report a
//! misconfigured promotion can use [`evaluate_promotion`].

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::money::{format_two_places, Money};
use crate::promotion::{Promotion, PromotionRule};
use crate::QUOTE_SET_SIZE;

// =============================================================================
// Price Quote
// =============================================================================

/// Display prices for one priceable item.
///
/// Fields are private: every constructor derives `price_for_four` from
/// `price_per_item`, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    price_per_item: Option<Money>,
    price_for_four: Option<Money>,
    description: Option<String>,
}

impl PriceQuote {
    /// A quote with no prices, for items whose base price is unknown.
    pub const fn unavailable() -> Self {
        PriceQuote {
            price_per_item: None,
            price_for_four: None,
            description: None,
        }
    }

    /// `None` when the set-of-four price overflows.
    fn priced(price_per_item: Money, description: Option<String>) -> Option<Self> {
        let price_for_four = price_per_item.checked_multiply_quantity(QUOTE_SET_SIZE)?;
        Some(PriceQuote {
            price_per_item: Some(price_per_item),
            price_for_four: Some(price_for_four),
            description,
        })
    }

    /// The effective unit price.
    pub fn price_per_item(&self) -> Option<Money> {
        self.price_per_item
    }

    /// The effective price for a set of four.
    pub fn price_for_four(&self) -> Option<Money> {
        self.price_for_four
    }

    /// What discount was applied, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether a promotion changed the price.
    pub fn is_promotional(&self) -> bool {
        self.description.is_some()
    }
}

// =============================================================================
// Rule Evaluation
// =============================================================================

/// A promotion rule successfully applied to a base price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedDiscount {
    pub price_per_item: Money,
    pub description: String,
}

/// Why a configured rule could not price an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidPromotion {
    /// Buy-X-get-Y with X ≤ 0 or Y < 0.
    #[error("invalid promotion (X<=0 or Y<0)")]
    BuyGetOutOfRange,

    /// Buy-X-get-Y whose bundle X+Y is empty.
    #[error("invalid promotion (X+Y=0)")]
    BuyGetEmptyBundle,

    /// Percentage outside 0-100.
    #[error("invalid promotion (invalid percentage)")]
    PercentageOutOfRange,

    /// Fixed-price bundle with N ≤ 0.
    #[error("invalid promotion (N<=0)")]
    BundleSizeNotPositive,

    /// The parameters are too large for decimal arithmetic.
    #[error("invalid promotion (arithmetic overflow)")]
    Overflow,
}

impl PromotionRule {
    /// Applies the rule to a base unit price.
    ///
    /// | Rule | Valid when | Price per item |
    /// |---|---|---|
    /// | `BuyXGetY` | X > 0, Y ≥ 0, X+Y > 0 | base × X / (X+Y) |
    /// | `PercentageDiscount` | 0 ≤ p ≤ 100 | base × (1 − p/100) |
    /// | `FixedPricePerN` | N > 0 | total / N |
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use tread_core::money::Money;
    /// use tread_core::promotion::PromotionRule;
    ///
    /// let rule = PromotionRule::BuyXGetY { buy: Decimal::from(3), free: Decimal::from(1) };
    /// let applied = rule.apply(Money::from_major(1000)).unwrap();
    /// assert_eq!(applied.price_per_item, Money::from_major(750));
    /// assert_eq!(applied.description, "Buy 3 get 1 free");
    /// ```
    pub fn apply(&self, base: Money) -> Result<AppliedDiscount, InvalidPromotion> {
        let applied = self.discounted_unit_price(base)?;
        applied
            .price_per_item
            .checked_multiply_quantity(QUOTE_SET_SIZE)
            .ok_or(InvalidPromotion::Overflow)?;
        Ok(applied)
    }

    fn discounted_unit_price(&self, base: Money) -> Result<AppliedDiscount, InvalidPromotion> {
        match *self {
            PromotionRule::BuyXGetY { buy, free } => {
                if buy <= Decimal::ZERO || free < Decimal::ZERO {
                    return Err(InvalidPromotion::BuyGetOutOfRange);
                }
                let bundle = buy.checked_add(free).ok_or(InvalidPromotion::Overflow)?;
                if bundle <= Decimal::ZERO {
                    return Err(InvalidPromotion::BuyGetEmptyBundle);
                }
                let price = base
                    .amount()
                    .checked_mul(buy)
                    .and_then(|paid| paid.checked_div(bundle))
                    .ok_or(InvalidPromotion::Overflow)?;
                Ok(AppliedDiscount {
                    price_per_item: Money::from_decimal(price),
                    description: format!(
                        "Buy {} get {} free",
                        whole_number(buy),
                        whole_number(free)
                    ),
                })
            }

            PromotionRule::PercentageDiscount { percent } => {
                if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                    return Err(InvalidPromotion::PercentageOutOfRange);
                }
                let remaining = Decimal::ONE - percent / Decimal::ONE_HUNDRED;
                let price = base
                    .amount()
                    .checked_mul(remaining)
                    .ok_or(InvalidPromotion::Overflow)?;
                Ok(AppliedDiscount {
                    price_per_item: Money::from_decimal(price),
                    description: format!("{}% off", percent.normalize()),
                })
            }

            PromotionRule::FixedPricePerN { total, count } => {
                if count <= Decimal::ZERO {
                    return Err(InvalidPromotion::BundleSizeNotPositive);
                }
                let price = total
                    .checked_div(count)
                    .ok_or(InvalidPromotion::Overflow)?;
                Ok(AppliedDiscount {
                    price_per_item: Money::from_decimal(price),
                    description: format!(
                        "{} for {} items",
                        format_two_places(total),
                        whole_number(count)
                    ),
                })
            }
        }
    }
}

/// Renders a parameter as an integer, dropping any fraction.
fn whole_number(value: Decimal) -> Decimal {
    value.trunc().normalize()
}

// =============================================================================
// Calculator
// =============================================================================

/// Computes display prices for an item.
///
/// - No base price, or a base price too large to quote for four: every
///   field is empty.
/// - No promotion, an inactive one, an unknown tag, a missing parameter,
///   parameters out of range, or a discounted price whose set of four
///   overflows: the base price with no description.
/// - Otherwise: the discounted price and its description.
///
/// Pure: the same inputs always give the same quote.
///
/// ## Example
/// ```rust
/// use tread_core::money::Money;
/// use tread_core::quote::compute_quote;
///
/// let quote = compute_quote(Some(Money::from_major(1000)), None);
/// assert_eq!(quote.price_per_item(), Some(Money::from_major(1000)));
/// assert_eq!(quote.price_for_four(), Some(Money::from_major(4000)));
/// assert_eq!(quote.description(), None);
/// ```
pub fn compute_quote(base_price: Option<Money>, promotion: Option<&Promotion>) -> PriceQuote {
    let Some(base) = base_price else {
        return PriceQuote::unavailable();
    };

    let promotional = match evaluate_promotion(base, promotion) {
        Some(Ok(applied)) => PriceQuote::priced(applied.price_per_item, Some(applied.description)),
        Some(Err(_)) | None => None,
    };
    promotional
        .or_else(|| PriceQuote::priced(base, None))
        .unwrap_or_else(PriceQuote::unavailable)
}

/// Runs the promotion's rule against a base price without the fallback.
///
/// Returns `None` when no rule applies at all (no promotion, inactive,
/// unknown tag, missing parameter), otherwise the rule's outcome including
/// any invalid-configuration marker that [`compute_quote`] would discard.
pub fn evaluate_promotion(
    base: Money,
    promotion: Option<&Promotion>,
) -> Option<Result<AppliedDiscount, InvalidPromotion>> {
    let rule = promotion.filter(|p| p.is_active)?.rule()?;
    Some(rule.apply(base))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn promo(promo_type: &str, value1: Option<&str>, value2: Option<&str>) -> Promotion {
        Promotion {
            id: 7,
            name: "promo".to_string(),
            promo_type: promo_type.to_string(),
            value1: value1.map(|v| Decimal::from_str(v).unwrap()),
            value2: value2.map(|v| Decimal::from_str(v).unwrap()),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn inactive(mut promotion: Promotion) -> Promotion {
        promotion.is_active = false;
        promotion
    }

    fn baht(value: &str) -> Money {
        Money::from_decimal(Decimal::from_str(value).unwrap())
    }

    fn assert_base_price(quote: &PriceQuote, base: Money) {
        assert_eq!(quote.price_per_item(), Some(base));
        assert_eq!(quote.price_for_four(), Some(base * 4));
        assert_eq!(quote.description(), None);
    }

    #[test]
    fn test_no_promotion_uses_base_price() {
        for base in ["0", "1", "999.99", "1000", "12345.67"] {
            let quote = compute_quote(Some(baht(base)), None);
            assert_base_price(&quote, baht(base));
        }
    }

    #[test]
    fn test_missing_base_price_gives_empty_quote() {
        let promotion = promo("percentage_discount", Some("25"), None);
        let quote = compute_quote(None, Some(&promotion));
        assert_eq!(quote, PriceQuote::unavailable());
        assert_eq!(quote.price_per_item(), None);
        assert_eq!(quote.price_for_four(), None);
        assert_eq!(quote.description(), None);
    }

    #[test]
    fn test_inactive_promotion_matches_no_promotion() {
        let base = baht("1000");
        let promotions = [
            promo("buy_x_get_y", Some("3"), Some("1")),
            promo("percentage_discount", Some("25"), None),
            promo("fixed_price_per_n", Some("2900"), Some("3")),
            promo("percentage_discount", Some("150"), None),
            promo("unknown", None, None),
        ];

        let expected = compute_quote(Some(base), None);
        for promotion in promotions {
            let promotion = inactive(promotion);
            assert_eq!(compute_quote(Some(base), Some(&promotion)), expected);
        }
    }

    #[test]
    fn test_buy_three_get_one() {
        let promotion = promo("buy_x_get_y", Some("3"), Some("1"));
        let quote = compute_quote(Some(baht("1000")), Some(&promotion));

        assert_eq!(quote.price_per_item(), Some(baht("750")));
        assert_eq!(quote.price_for_four(), Some(baht("3000")));
        assert_eq!(quote.description(), Some("Buy 3 get 1 free"));
        assert!(quote.is_promotional());
    }

    #[test]
    fn test_buy_x_get_zero_is_valid() {
        let promotion = promo("buy_x_get_y", Some("2"), Some("0"));
        let quote = compute_quote(Some(baht("1000")), Some(&promotion));

        assert_eq!(quote.price_per_item(), Some(baht("1000")));
        assert_eq!(quote.description(), Some("Buy 2 get 0 free"));
    }

    #[test]
    fn test_buy_get_description_truncates_fractions() {
        let promotion = promo("buy_x_get_y", Some("3.9"), Some("1.2"));
        let quote = compute_quote(Some(baht("1000")), Some(&promotion));
        assert_eq!(quote.description(), Some("Buy 3 get 1 free"));
    }

    #[test]
    fn test_percentage_discount() {
        let promotion = promo("percentage_discount", Some("25"), None);
        let quote = compute_quote(Some(baht("1000")), Some(&promotion));

        assert_eq!(quote.price_per_item(), Some(baht("750")));
        assert_eq!(quote.price_for_four(), Some(baht("3000")));
        assert_eq!(quote.description(), Some("25% off"));
    }

    #[test]
    fn test_percentage_description_keeps_fraction() {
        let promotion = promo("percentage_discount", Some("12.50"), None);
        let quote = compute_quote(Some(baht("1000")), Some(&promotion));

        assert_eq!(quote.price_per_item(), Some(baht("875")));
        assert_eq!(quote.description(), Some("12.5% off"));
    }

    #[test]
    fn test_percentage_bounds_are_inclusive() {
        let free = promo("percentage_discount", Some("100"), None);
        let quote = compute_quote(Some(baht("1000")), Some(&free));
        assert_eq!(quote.price_per_item(), Some(Money::zero()));
        assert_eq!(quote.description(), Some("100% off"));

        let none_off = promo("percentage_discount", Some("0"), None);
        let quote = compute_quote(Some(baht("1000")), Some(&none_off));
        assert_eq!(quote.price_per_item(), Some(baht("1000")));
        assert_eq!(quote.description(), Some("0% off"));
    }

    #[test]
    fn test_fixed_price_per_n_ignores_base_price() {
        let promotion = promo("fixed_price_per_n", Some("2900"), Some("3"));

        for base in ["0", "1000", "5000"] {
            let quote = compute_quote(Some(baht(base)), Some(&promotion));
            let per_item = quote.price_per_item().unwrap();

            assert_eq!(per_item.round_to_cents(), baht("966.67"));
            assert_eq!(per_item.amount().round_dp(6), Decimal::from_str("966.666667").unwrap());
            assert_eq!(quote.price_for_four(), Some(per_item * 4));
            assert_eq!(
                quote.price_for_four().unwrap().amount().round_dp(6),
                Decimal::from_str("3866.666667").unwrap()
            );
            assert_eq!(quote.description(), Some("2900.00 for 3 items"));
        }
    }

    #[test]
    fn test_percentage_out_of_range_falls_back_silently() {
        for percent in ["150", "-5", "100.01"] {
            let promotion = promo("percentage_discount", Some(percent), None);
            let quote = compute_quote(Some(baht("1000")), Some(&promotion));
            assert_base_price(&quote, baht("1000"));
        }
    }

    #[test]
    fn test_buy_zero_get_zero_falls_back() {
        let promotion = promo("buy_x_get_y", Some("0"), Some("0"));
        let quote = compute_quote(Some(baht("1000")), Some(&promotion));
        assert_base_price(&quote, baht("1000"));
    }

    #[test]
    fn test_negative_free_count_falls_back() {
        let promotion = promo("buy_x_get_y", Some("3"), Some("-1"));
        let quote = compute_quote(Some(baht("1000")), Some(&promotion));
        assert_base_price(&quote, baht("1000"));
    }

    #[test]
    fn test_non_positive_bundle_size_falls_back() {
        for count in ["0", "-2"] {
            let promotion = promo("fixed_price_per_n", Some("2900"), Some(count));
            let quote = compute_quote(Some(baht("1000")), Some(&promotion));
            assert_base_price(&quote, baht("1000"));
        }
    }

    #[test]
    fn test_unknown_tag_or_missing_parameter_falls_back() {
        let cases = [
            promo("fixed_price_per_item", Some("500"), None),
            promo("buy_x_get_y", Some("3"), None),
            promo("fixed_price_per_n", Some("2900"), None),
            promo("percentage_discount", None, None),
        ];
        for promotion in cases {
            let quote = compute_quote(Some(baht("1000")), Some(&promotion));
            assert_base_price(&quote, baht("1000"));
        }
    }

    #[test]
    fn test_invalid_markers_are_distinguishable() {
        let base = baht("1000");
        let apply = |promotion: Promotion| evaluate_promotion(base, Some(&promotion));

        assert_eq!(
            apply(promo("buy_x_get_y", Some("0"), Some("1"))),
            Some(Err(InvalidPromotion::BuyGetOutOfRange))
        );
        assert_eq!(
            apply(promo("percentage_discount", Some("150"), None)),
            Some(Err(InvalidPromotion::PercentageOutOfRange))
        );
        assert_eq!(
            apply(promo("fixed_price_per_n", Some("2900"), Some("0"))),
            Some(Err(InvalidPromotion::BundleSizeNotPositive))
        );
        assert_eq!(apply(promo("nope", Some("1"), Some("1"))), None);
        assert_eq!(apply(inactive(promo("percentage_discount", Some("150"), None))), None);
    }

    #[test]
    fn test_empty_bundle_marker_is_reachable_directly() {
        // Unreachable through valid X/Y ranges; guarded all the same.
        let rule = PromotionRule::BuyXGetY {
            buy: Decimal::ONE,
            free: Decimal::NEGATIVE_ONE,
        };
        assert_eq!(rule.apply(baht("1000")), Err(InvalidPromotion::BuyGetOutOfRange));
        assert_eq!(
            InvalidPromotion::BuyGetEmptyBundle.to_string(),
            "invalid promotion (X+Y=0)"
        );
    }

    #[test]
    fn test_overflow_falls_back() {
        let promotion = promo("buy_x_get_y", Some("79228162514264337593543950335"), Some("0"));
        let base = Money::from_decimal(Decimal::MAX);
        assert_eq!(
            evaluate_promotion(base, Some(&promotion)),
            Some(Err(InvalidPromotion::Overflow))
        );
    }

    #[test]
    fn test_set_of_four_overflow_falls_back() {
        // 5e28 per item fits in a Decimal; four of them do not.
        let promotion = promo("fixed_price_per_n", Some("50000000000000000000000000000"), Some("1"));
        assert_eq!(
            evaluate_promotion(Money::from_major(1000), Some(&promotion)),
            Some(Err(InvalidPromotion::Overflow))
        );

        let quote = compute_quote(Some(Money::from_major(1000)), Some(&promotion));
        assert_base_price(&quote, Money::from_major(1000));
    }

    #[test]
    fn test_unpriceable_base_gives_empty_quote() {
        let base = Money::from_decimal(Decimal::MAX);
        assert_eq!(compute_quote(Some(base), None), PriceQuote::unavailable());

        let promotion = promo("percentage_discount", Some("10"), None);
        let discounted = compute_quote(Some(base), Some(&promotion));
        assert_eq!(discounted, PriceQuote::unavailable());
    }

    #[test]
    fn test_price_for_four_is_always_four_times_per_item() {
        let base_prices = ["0", "0.01", "999.99", "1000", "3333.33"];
        let promotions = [
            None,
            Some(promo("buy_x_get_y", Some("3"), Some("1"))),
            Some(promo("buy_x_get_y", Some("7"), Some("3"))),
            Some(promo("percentage_discount", Some("33.3"), None)),
            Some(promo("fixed_price_per_n", Some("2900"), Some("3"))),
            Some(promo("fixed_price_per_n", Some("1000"), Some("7"))),
            Some(promo("percentage_discount", Some("150"), None)),
        ];

        for base in base_prices {
            for promotion in &promotions {
                let quote = compute_quote(Some(baht(base)), promotion.as_ref());
                let per_item = quote.price_per_item().unwrap();
                assert_eq!(quote.price_for_four(), Some(per_item.multiply_quantity(4)));
            }
        }
    }

    #[test]
    fn test_quotes_are_deterministic() {
        let promotion = promo("fixed_price_per_n", Some("1000"), Some("7"));
        let first = compute_quote(Some(baht("1234.56")), Some(&promotion));
        let second = compute_quote(Some(baht("1234.56")), Some(&promotion));

        assert_eq!(first, second);
        assert_eq!(
            first.price_per_item().unwrap().amount().serialize(),
            second.price_per_item().unwrap().amount().serialize()
        );
    }
}
