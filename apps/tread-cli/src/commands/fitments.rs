//! `tread fitments ...`

use std::io::Write;

use tread_core::NewFitment;

use super::wheels::year_range;
use super::{write_json, Context};
use crate::cli::FitmentCommand;
use crate::error::{AppError, AppResult};

pub async fn run<W: Write>(command: FitmentCommand, ctx: &Context, out: &mut W) -> AppResult<()> {
    let repo = ctx.db.fitments();

    match command {
        FitmentCommand::List { wheel_id } => {
            if ctx.db.wheels().get_by_id(wheel_id).await?.is_none() {
                return Err(AppError::not_found("Wheel", wheel_id));
            }
            let fitments = repo.list_for_wheel(wheel_id).await?;
            if ctx.json {
                return write_json(out, &fitments);
            }
            if fitments.is_empty() {
                writeln!(out, "No fitments for wheel {wheel_id}.")?;
            }
            for fitment in &fitments {
                writeln!(out, "{:>4}  {} {} {}", fitment.id, fitment.brand, fitment.model, year_range(fitment))?;
            }
        }

        FitmentCommand::Add {
            wheel_id,
            brand,
            model,
            from,
            to,
        } => {
            let fitment = NewFitment {
                brand,
                model,
                year_start: from,
                year_end: to,
            };
            let added = repo.add(wheel_id, &fitment).await?;
            if ctx.json {
                return write_json(out, &added);
            }
            writeln!(
                out,
                "Added fitment {}: wheel {} fits {} {} {}",
                added.id,
                added.wheel_id,
                added.brand,
                added.model,
                year_range(&added)
            )?;
        }

        FitmentCommand::Delete { id } => {
            repo.delete(id).await?;
            if ctx.json {
                return write_json(out, &serde_json::json!({ "deleted": id }));
            }
            writeln!(out, "Deleted fitment {id}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, text};
    use tread_core::{Money, NewWheel};
    use tread_db::DbError;

    async fn wheel_id(ctx: &Context) -> i64 {
        ctx.db
            .wheels()
            .insert(&NewWheel {
                brand: "Lenso".to_string(),
                model: "Samurai".to_string(),
                diameter: 15.0,
                pcd: "4x100".to_string(),
                width: 7.0,
                et: Some(35),
                color: None,
                quantity: 0,
                cost: None,
                cost_online: None,
                wholesale_price1: None,
                wholesale_price2: None,
                retail_price: Money::from_major(2500),
                image_filename: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_add_list_delete() {
        let ctx = context().await;
        let wheel_id = wheel_id(&ctx).await;

        let mut out = Vec::new();
        run(
            FitmentCommand::Add {
                wheel_id,
                brand: "Toyota".to_string(),
                model: "Yaris".to_string(),
                from: 2014,
                to: None,
            },
            &ctx,
            &mut out,
        )
        .await
        .unwrap();
        assert!(text(out).contains("fits Toyota Yaris 2014-"));

        let mut out = Vec::new();
        run(FitmentCommand::List { wheel_id }, &ctx, &mut out).await.unwrap();
        assert!(text(out).contains("Toyota Yaris"));

        let id = ctx.db.fitments().list_for_wheel(wheel_id).await.unwrap()[0].id;
        let mut out = Vec::new();
        run(FitmentCommand::Delete { id }, &ctx, &mut out).await.unwrap();
        assert!(ctx.db.fitments().list_for_wheel(wheel_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_reversed_years() {
        let ctx = context().await;
        let wheel_id = wheel_id(&ctx).await;

        let mut out = Vec::new();
        let err = run(
            FitmentCommand::Add {
                wheel_id,
                brand: "Honda".to_string(),
                model: "Jazz".to_string(),
                from: 2020,
                to: Some(2010),
            },
            &ctx,
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Db(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_unknown_wheel() {
        let ctx = context().await;
        let mut out = Vec::new();
        let err = run(FitmentCommand::List { wheel_id: 31 }, &ctx, &mut out).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "Wheel", id: 31 }));
    }
}
