//! `tread promotions ...`

use std::io::Write;

use tread_core::{NewPromotion, Promotion};

use super::{write_json, Context};
use crate::cli::PromotionCommand;
use crate::error::AppResult;

fn parameters(promotion: &Promotion) -> String {
    let value = |v: Option<rust_decimal::Decimal>| v.map_or_else(|| "-".to_string(), |d| d.normalize().to_string());
    format!("{} / {}", value(promotion.value1), value(promotion.value2))
}

fn write_row<W: Write>(out: &mut W, promotion: &Promotion) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>4}  {:<28} {:<20} {:<14} {}",
        promotion.id,
        promotion.name,
        promotion.promo_type,
        parameters(promotion),
        if promotion.is_active { "active" } else { "inactive" }
    )
}

pub async fn run<W: Write>(command: PromotionCommand, ctx: &Context, out: &mut W) -> AppResult<()> {
    let repo = ctx.db.promotions();

    match command {
        PromotionCommand::List { all } => {
            let promotions = repo.list(all).await?;
            if ctx.json {
                return write_json(out, &promotions);
            }
            if promotions.is_empty() {
                writeln!(out, "No promotions.")?;
            }
            for promotion in &promotions {
                write_row(out, promotion)?;
            }
        }

        PromotionCommand::Add(args) => {
            let created = repo.insert(&NewPromotion::from(args)).await?;
            if ctx.json {
                return write_json(out, &created);
            }
            write!(out, "Created ")?;
            write_row(out, &created)?;
        }

        PromotionCommand::Update { id, promotion } => {
            let updated = repo.update(id, &NewPromotion::from(promotion)).await?;
            if ctx.json {
                return write_json(out, &updated);
            }
            write!(out, "Updated ")?;
            write_row(out, &updated)?;
        }

        PromotionCommand::Delete { id } => {
            let unlinked = repo.delete(id).await?;
            if ctx.json {
                return write_json(out, &serde_json::json!({ "deleted": id, "unlinked_tires": unlinked }));
            }
            writeln!(out, "Deleted promotion {id}; {unlinked} tire(s) back to base price")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PromotionArgs;
    use crate::commands::test_support::{context, text};
    use crate::error::AppError;
    use rust_decimal::Decimal;
    use tread_core::PromotionType;
    use tread_db::DbError;

    fn args(name: &str, promo_type: PromotionType, value1: i64, value2: Option<i64>) -> PromotionArgs {
        PromotionArgs {
            name: name.to_string(),
            promo_type,
            value1: Decimal::from(value1),
            value2: value2.map(Decimal::from),
            inactive: false,
        }
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let ctx = context().await;

        let mut out = Vec::new();
        run(PromotionCommand::Add(args("Buy 3 get 1", PromotionType::BuyXGetY, 3, Some(1))), &ctx, &mut out)
            .await
            .unwrap();
        assert!(text(out).starts_with("Created"));

        let mut out = Vec::new();
        run(PromotionCommand::List { all: false }, &ctx, &mut out).await.unwrap();
        let text = text(out);
        assert!(text.contains("Buy 3 get 1"));
        assert!(text.contains("buy_x_get_y"));
        assert!(text.contains("3 / 1"));
    }

    #[tokio::test]
    async fn test_add_rejects_out_of_range() {
        let ctx = context().await;
        let mut out = Vec::new();
        let err = run(
            PromotionCommand::Add(args("Too much", PromotionType::PercentageDiscount, 120, None)),
            &ctx,
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Db(DbError::Validation(_))));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_delete_reports_unlinked() {
        let ctx = context().await;
        let promo = ctx
            .db
            .promotions()
            .insert(&NewPromotion::from(args("Ten off", PromotionType::PercentageDiscount, 10, None)))
            .await
            .unwrap();

        let mut out = Vec::new();
        run(PromotionCommand::Delete { id: promo.id }, &ctx, &mut out).await.unwrap();
        assert!(text(out).contains("0 tire(s)"));

        let mut out = Vec::new();
        let err = run(PromotionCommand::Delete { id: promo.id }, &ctx, &mut out).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_list_json() {
        let mut ctx = context().await;
        ctx.json = true;
        ctx.db
            .promotions()
            .insert(&NewPromotion::from(args("Bundle", PromotionType::FixedPricePerN, 2900, Some(3))))
            .await
            .unwrap();

        let mut out = Vec::new();
        run(PromotionCommand::List { all: true }, &ctx, &mut out).await.unwrap();
        let rows: Vec<Promotion> = serde_json::from_slice(&out).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].promo_type, "fixed_price_per_n");
    }
}
