//! `tread tires ...`
//!
//! Listings show each tire with its quote: the promotional price per item
//! and for a set of four, or the base price when no promotion applies.

use std::io::Write;

use tread_core::{NewTire, TireListing};

use super::{filter_from, money_or_dash, quote_summary, write_json, Context};
use crate::cli::TireCommand;
use crate::error::{AppError, AppResult};

fn write_row<W: Write>(out: &mut W, listing: &TireListing) -> std::io::Result<()> {
    let tire = &listing.tire;
    writeln!(
        out,
        "{:>4}  {:<44} qty {:>3}  {}",
        tire.id,
        tire.label(),
        tire.quantity,
        quote_summary(&listing.quote)
    )
}

fn write_detail<W: Write>(out: &mut W, listing: &TireListing) -> std::io::Result<()> {
    let tire = &listing.tire;
    writeln!(out, "Tire #{}  {}", tire.id, tire.label())?;
    writeln!(out, "  Quantity:          {}", tire.quantity)?;
    writeln!(
        out,
        "  Year:              {}",
        tire.year_of_manufacture.map_or_else(|| "-".to_string(), |y| y.to_string())
    )?;
    writeln!(out, "  Base price:        {}", tire.price_per_item)?;
    writeln!(out, "  Cost (SC):         {}", money_or_dash(tire.cost_sc))?;
    writeln!(out, "  Cost (Dunlop):     {}", money_or_dash(tire.cost_dunlop))?;
    writeln!(out, "  Cost (online):     {}", money_or_dash(tire.cost_online))?;
    writeln!(out, "  Wholesale 1 / 2:   {} / {}", money_or_dash(tire.wholesale_price1), money_or_dash(tire.wholesale_price2))?;
    match &listing.promotion {
        Some(promo) if promo.is_active => writeln!(out, "  Promotion:         {} (#{})", promo.name, promo.id)?,
        Some(promo) => writeln!(out, "  Promotion:         {} (#{}, inactive)", promo.name, promo.id)?,
        None => writeln!(out, "  Promotion:         none")?,
    }
    writeln!(out, "  Quote:             {}", quote_summary(&listing.quote))
}

pub async fn run<W: Write>(command: TireCommand, ctx: &Context, out: &mut W) -> AppResult<()> {
    let repo = ctx.db.tires();

    match command {
        TireCommand::List(args) => {
            let listings = repo.list(&filter_from(args)).await?;
            if ctx.json {
                return write_json(out, &listings);
            }
            if listings.is_empty() {
                writeln!(out, "No tires found.")?;
            }
            for listing in &listings {
                write_row(out, listing)?;
            }
        }

        TireCommand::Show { id } => {
            let listing = repo
                .get_listing(id)
                .await?
                .ok_or_else(|| AppError::not_found("Tire", id))?;
            if ctx.json {
                return write_json(out, &listing);
            }
            write_detail(out, &listing)?;
        }

        TireCommand::Add(args) => {
            let listing = ctx.db.inventory().add_tire(&NewTire::from(args)).await?;
            if ctx.json {
                return write_json(out, &listing);
            }
            write!(out, "Added ")?;
            write_row(out, &listing)?;
        }

        TireCommand::Update { id, tire } => {
            repo.update(id, &NewTire::from(tire)).await?;
            let listing = repo
                .get_listing(id)
                .await?
                .ok_or_else(|| AppError::not_found("Tire", id))?;
            if ctx.json {
                return write_json(out, &listing);
            }
            write!(out, "Updated ")?;
            write_row(out, &listing)?;
        }

        TireCommand::Delete { id } => {
            ctx.db.inventory().delete_tire(id).await?;
            if ctx.json {
                return write_json(out, &serde_json::json!({ "deleted": id }));
            }
            writeln!(out, "Deleted tire {id}")?;
        }

        TireCommand::Brands => {
            let brands = repo.brands().await?;
            if ctx.json {
                return write_json(out, &brands);
            }
            for brand in &brands {
                writeln!(out, "{brand}")?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ListArgs, TireArgs};
    use crate::commands::test_support::{context, text};
    use rust_decimal::Decimal;
    use tread_core::{CoreError, NewPromotion, PromotionType};

    fn tire_args(brand: &str, size: &str, price: i64, quantity: i64) -> TireArgs {
        TireArgs {
            brand: brand.to_string(),
            model: "Ecopia".to_string(),
            size: size.to_string(),
            price: Decimal::from(price),
            quantity,
            cost_sc: None,
            cost_dunlop: None,
            cost_online: None,
            wholesale1: None,
            wholesale2: None,
            promotion: None,
            year: Some(2024),
        }
    }

    #[tokio::test]
    async fn test_add_list_show() {
        let ctx = context().await;
        let promo = ctx
            .db
            .promotions()
            .insert(&NewPromotion {
                name: "Bundle of 3".to_string(),
                promo_type: PromotionType::FixedPricePerN,
                value1: Decimal::from(2900),
                value2: Some(Decimal::from(3)),
                is_active: true,
            })
            .await
            .unwrap();

        let mut args = tire_args("Bridgestone", "205/55R16", 1100, 4);
        args.promotion = Some(promo.id);
        let mut out = Vec::new();
        run(TireCommand::Add(args), &ctx, &mut out).await.unwrap();
        assert!(text(out).contains("2900.00 for 3 items"));

        let mut out = Vec::new();
        run(
            TireCommand::List(ListArgs {
                search: Some("205".to_string()),
                brand: None,
            }),
            &ctx,
            &mut out,
        )
        .await
        .unwrap();
        let listed = text(out);
        assert!(listed.contains("Bridgestone Ecopia 205/55R16"));
        assert!(listed.contains("฿3866.67 for 4"));

        let id = ctx.db.tires().list(&Default::default()).await.unwrap()[0].tire.id;
        let mut out = Vec::new();
        run(TireCommand::Show { id }, &ctx, &mut out).await.unwrap();
        let shown = text(out);
        assert!(shown.contains("Base price:        ฿1100.00"));
        assert!(shown.contains("Bundle of 3"));
    }

    #[tokio::test]
    async fn test_show_missing() {
        let ctx = context().await;
        let mut out = Vec::new();
        let err = run(TireCommand::Show { id: 404 }, &ctx, &mut out).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_delete_in_stock_refused() {
        let ctx = context().await;
        let listing = ctx
            .db
            .inventory()
            .add_tire(&NewTire::from(tire_args("Dunlop", "195/65R15", 1800, 2)))
            .await
            .unwrap();

        let mut out = Vec::new();
        let err = run(TireCommand::Delete { id: listing.tire.id }, &ctx, &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Core(CoreError::StockRemaining { .. })));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_brands() {
        let ctx = context().await;
        let inventory = ctx.db.inventory();
        inventory.add_tire(&NewTire::from(tire_args("Yokohama", "185/65R15", 1500, 0))).await.unwrap();
        inventory.add_tire(&NewTire::from(tire_args("Dunlop", "185/65R15", 1500, 0))).await.unwrap();

        let mut out = Vec::new();
        run(TireCommand::Brands, &ctx, &mut out).await.unwrap();
        assert_eq!(text(out), "Dunlop\nYokohama\n");
    }
}
