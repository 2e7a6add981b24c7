//! `tread wheels ...`

use serde::Serialize;
use std::io::Write;

use tread_core::{NewWheel, Wheel, WheelFitment};

use super::{filter_from, money_or_dash, write_json, Context};
use crate::cli::WheelCommand;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize)]
struct WheelDetail {
    #[serde(flatten)]
    wheel: Wheel,
    fitments: Vec<WheelFitment>,
}

fn write_row<W: Write>(out: &mut W, wheel: &Wheel) -> std::io::Result<()> {
    writeln!(
        out,
        "{:>4}  {:<36} {:>4}\"x{:<4} et {:<4} {:<10} qty {:>3}  {}",
        wheel.id,
        format!("{} {}", wheel.brand, wheel.model),
        wheel.diameter,
        wheel.width,
        wheel.et.map_or_else(|| "-".to_string(), |et| et.to_string()),
        wheel.color.as_deref().unwrap_or("-"),
        wheel.quantity,
        wheel.retail_price
    )
}

pub(crate) fn year_range(fitment: &WheelFitment) -> String {
    match fitment.year_end {
        Some(end) if end == fitment.year_start => end.to_string(),
        Some(end) => format!("{}-{}", fitment.year_start, end),
        None => format!("{}-", fitment.year_start),
    }
}

fn write_detail<W: Write>(out: &mut W, detail: &WheelDetail) -> std::io::Result<()> {
    let wheel = &detail.wheel;
    writeln!(out, "Wheel #{}  {}", wheel.id, wheel.label())?;
    writeln!(out, "  Width / ET:        {} / {}", wheel.width, wheel.et.map_or_else(|| "-".to_string(), |et| et.to_string()))?;
    writeln!(out, "  Color:             {}", wheel.color.as_deref().unwrap_or("-"))?;
    writeln!(out, "  Quantity:          {}", wheel.quantity)?;
    writeln!(out, "  Retail price:      {}", wheel.retail_price)?;
    writeln!(out, "  Cost / online:     {} / {}", money_or_dash(wheel.cost), money_or_dash(wheel.cost_online))?;
    writeln!(out, "  Wholesale 1 / 2:   {} / {}", money_or_dash(wheel.wholesale_price1), money_or_dash(wheel.wholesale_price2))?;
    if let Some(image) = &wheel.image_filename {
        writeln!(out, "  Image:             {image}")?;
    }
    if detail.fitments.is_empty() {
        writeln!(out, "  Fits:              (no fitments recorded)")?;
    }
    for fitment in &detail.fitments {
        writeln!(out, "  Fits:              {} {} {}", fitment.brand, fitment.model, year_range(fitment))?;
    }
    Ok(())
}

pub async fn run<W: Write>(command: WheelCommand, ctx: &Context, out: &mut W) -> AppResult<()> {
    let repo = ctx.db.wheels();

    match command {
        WheelCommand::List(args) => {
            let wheels = repo.list(&filter_from(args)).await?;
            if ctx.json {
                return write_json(out, &wheels);
            }
            if wheels.is_empty() {
                writeln!(out, "No wheels found.")?;
            }
            for wheel in &wheels {
                write_row(out, wheel)?;
            }
        }

        WheelCommand::Show { id } => {
            let wheel = repo.get_by_id(id).await?.ok_or_else(|| AppError::not_found("Wheel", id))?;
            let fitments = ctx.db.fitments().list_for_wheel(id).await?;
            let detail = WheelDetail { wheel, fitments };
            if ctx.json {
                return write_json(out, &detail);
            }
            write_detail(out, &detail)?;
        }

        WheelCommand::Add(args) => {
            let wheel = ctx.db.inventory().add_wheel(&NewWheel::from(args)).await?;
            if ctx.json {
                return write_json(out, &wheel);
            }
            write!(out, "Added ")?;
            write_row(out, &wheel)?;
        }

        WheelCommand::Update { id, wheel } => {
            let updated = repo.update(id, &NewWheel::from(wheel)).await?;
            if ctx.json {
                return write_json(out, &updated);
            }
            write!(out, "Updated ")?;
            write_row(out, &updated)?;
        }

        WheelCommand::Delete { id } => {
            ctx.db.inventory().delete_wheel(id).await?;
            if ctx.json {
                return write_json(out, &serde_json::json!({ "deleted": id }));
            }
            writeln!(out, "Deleted wheel {id}")?;
        }

        WheelCommand::Brands => {
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
