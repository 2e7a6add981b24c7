//! # Demo Data
//!
//! `tread seed` fills an empty database with a small, realistic shop:
//! one promotion of each type, tires across common sizes (some on
//! promotion), and wheels with the cars they fit.
//!
//! ## Usage
//! ```bash
//! tread --db ./tread_dev.db seed
//! ```
//!
//! Seeding is skipped when any tire already exists, so running it twice
//! never duplicates stock.

use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use tracing::info;

use tread_core::{InventoryFilter, Money, NewFitment, NewPromotion, NewTire, NewWheel, PromotionType};

use super::{write_json, Context};
use crate::error::AppResult;

/// (name, type, value1, value2)
const PROMOTIONS: &[(&str, PromotionType, i64, Option<i64>)] = &[
    ("Buy 3 Get 1 Free", PromotionType::BuyXGetY, 3, Some(1)),
    ("10% Off Eco Range", PromotionType::PercentageDiscount, 10, None),
    ("Set of 4 for 9,999", PromotionType::FixedPricePerN, 9999, Some(4)),
];

/// (brand, model, size, price, quantity, index into PROMOTIONS, year)
const TIRES: &[(&str, &str, &str, i64, i64, Option<usize>, i32)] = &[
    ("Bridgestone", "Ecopia EP300", "185/65R15", 2350, 16, Some(1), 2024),
    ("Bridgestone", "Turanza T005", "215/55R17", 4200, 8, None, 2024),
    ("Michelin", "Primacy 4", "205/55R16", 3650, 12, Some(0), 2023),
    ("Michelin", "Pilot Sport 5", "225/45R18", 5900, 4, None, 2024),
    ("Dunlop", "Enasave EC300+", "185/60R15", 1990, 20, Some(2), 2024),
    ("Dunlop", "SP Sport LM705", "195/55R15", 2450, 0, None, 2023),
    ("Yokohama", "BluEarth-ES32", "195/65R15", 2190, 10, Some(1), 2024),
    ("Maxxis", "MA-P3", "175/70R13", 1450, 24, Some(0), 2022),
];

/// (brand, model, diameter, pcd, width, et, color, price, quantity, fits)
type WheelSeed = (
    &'static str,
    &'static str,
    f64,
    &'static str,
    f64,
    i64,
    &'static str,
    i64,
    i64,
    &'static [(&'static str, &'static str, i32, Option<i32>)],
);

const WHEELS: &[WheelSeed] = &[
    (
        "Lenso",
        "Project D Spec-E",
        15.0,
        "4x100",
        7.0,
        35,
        "Hyper Black",
        2900,
        8,
        &[("Honda", "City", 2014, Some(2019)), ("Toyota", "Yaris", 2013, None)],
    ),
    (
        "Enkei",
        "RPF1",
        17.0,
        "5x114.3",
        7.5,
        48,
        "Silver",
        6800,
        4,
        &[("Honda", "Civic", 2016, Some(2021)), ("Mazda", "3", 2014, Some(2018))],
    ),
    (
        "Cosmis",
        "XT-005R",
        18.0,
        "6x139.7",
        9.0,
        0,
        "Flat Black",
        5500,
        4,
        &[("Toyota", "Hilux Revo", 2015, None), ("Isuzu", "D-Max", 2012, None)],
    ),
];

#[derive(Debug, Default, Serialize)]
struct SeedSummary {
    skipped: bool,
    promotions: usize,
    tires: usize,
    wheels: usize,
    fitments: usize,
}

pub async fn run<W: Write>(ctx: &Context, out: &mut W) -> AppResult<()> {
    let summary = seed(ctx).await?;

    if ctx.json {
        return write_json(out, &summary);
    }
    if summary.skipped {
        writeln!(out, "Database already has tires; skipping seed.")?;
        return Ok(());
    }
    writeln!(out, "✓ {} promotions", summary.promotions)?;
    writeln!(out, "✓ {} tires", summary.tires)?;
    writeln!(out, "✓ {} wheels, {} fitments", summary.wheels, summary.fitments)?;
    Ok(())
}

async fn seed(ctx: &Context) -> AppResult<SeedSummary> {
    let existing = ctx.db.tires().list(&InventoryFilter::default()).await?.len();
    if existing > 0 {
        info!(existing, "Seed skipped");
        return Ok(SeedSummary {
            skipped: true,
            ..SeedSummary::default()
        });
    }

    let mut summary = SeedSummary::default();
    let inventory = ctx.db.inventory();

    let mut promotion_ids = Vec::with_capacity(PROMOTIONS.len());
    for &(name, promo_type, value1, value2) in PROMOTIONS {
        let promotion = ctx
            .db
            .promotions()
            .insert(&NewPromotion {
                name: name.to_string(),
                promo_type,
                value1: Decimal::from(value1),
                value2: value2.map(Decimal::from),
                is_active: true,
            })
            .await?;
        promotion_ids.push(promotion.id);
        summary.promotions += 1;
    }

    for &(brand, model, size, price, quantity, promotion, year) in TIRES {
        inventory
            .add_tire(&NewTire {
                brand: brand.to_string(),
                model: model.to_string(),
                size: size.to_string(),
                quantity,
                cost_sc: None,
                cost_dunlop: None,
                cost_online: None,
                wholesale_price1: None,
                wholesale_price2: None,
                price_per_item: Money::from_major(price),
                promotion_id: promotion.and_then(|index| promotion_ids.get(index).copied()),
                year_of_manufacture: Some(year),
            })
            .await?;
        summary.tires += 1;
    }

    for &(brand, model, diameter, pcd, width, et, color, price, quantity, fits) in WHEELS {
        let wheel = inventory
            .add_wheel(&NewWheel {
                brand: brand.to_string(),
                model: model.to_string(),
                diameter,
                pcd: pcd.to_string(),
                width,
                et: Some(et),
                color: Some(color.to_string()),
                quantity,
                cost: None,
                cost_online: None,
                wholesale_price1: None,
                wholesale_price2: None,
                retail_price: Money::from_major(price),
                image_filename: None,
            })
            .await?;
        summary.wheels += 1;

        for &(car_brand, car_model, year_start, year_end) in fits {
            ctx.db
                .fitments()
                .add(
                    wheel.id,
                    &NewFitment {
                        brand: car_brand.to_string(),
                        model: car_model.to_string(),
                        year_start,
                        year_end,
                    },
                )
                .await?;
            summary.fitments += 1;
        }
    }

    info!(
        promotions = summary.promotions,
        tires = summary.tires,
        wheels = summary.wheels,
        "Seed complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, text};
    use tread_core::StockItemKind;
    use tread_db::DEFAULT_HISTORY_LIMIT;

    #[tokio::test]
    async fn test_seed_populates_once() {
        let ctx = context().await;

        let mut out = Vec::new();
        run(&ctx, &mut out).await.unwrap();
        assert!(text(out).contains(&format!("✓ {} tires", TIRES.len())));

        let listings = ctx.db.tires().list(&InventoryFilter::default()).await.unwrap();
        assert_eq!(listings.len(), TIRES.len());
        assert!(listings.iter().any(|l| l.quote.is_promotional()));
        assert_eq!(ctx.db.promotions().list(false).await.unwrap().len(), PROMOTIONS.len());

        let stocked = TIRES.iter().filter(|t| t.4 > 0).count();
        let history = ctx
            .db
            .movements(StockItemKind::Tire)
            .recent(DEFAULT_HISTORY_LIMIT)
            .await
            .unwrap();
        assert_eq!(history.len(), stocked);

        let mut out = Vec::new();
        run(&ctx, &mut out).await.unwrap();
        assert!(text(out).contains("skipping seed"));
        assert_eq!(
            ctx.db.tires().list(&InventoryFilter::default()).await.unwrap().len(),
            TIRES.len()
        );
    }

    #[tokio::test]
    async fn test_seed_fitments() {
        let mut ctx = context().await;
        ctx.json = true;

        let mut out = Vec::new();
        run(&ctx, &mut out).await.unwrap();
        let summary: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let expected: usize = WHEELS.iter().map(|w| w.9.len()).sum();
        assert_eq!(summary["fitments"], expected);
        assert_eq!(summary["skipped"], false);
    }
}
