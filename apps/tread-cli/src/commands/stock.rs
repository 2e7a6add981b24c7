//! `tread stock ...`

use std::io::Write;

use tread_core::{MovementHistoryEntry, MovementType, StockMovement};

use super::{write_json, Context};
use crate::cli::{MovementArgs, StockCommand};
use crate::error::AppResult;

fn write_entry<W: Write>(out: &mut W, entry: &MovementHistoryEntry) -> std::io::Result<()> {
    let movement = &entry.movement;
    writeln!(
        out,
        "{}  {:<3} {:>4}  left {:>4}  {:<40} {}",
        movement.timestamp.format("%Y-%m-%d %H:%M"),
        movement.movement_type,
        movement.quantity_change,
        movement.remaining_quantity,
        entry.item_label,
        movement.notes.as_deref().unwrap_or("")
    )
}

async fn record<W: Write>(
    args: MovementArgs,
    movement_type: MovementType,
    ctx: &Context,
    out: &mut W,
) -> AppResult<()> {
    let recorded: StockMovement = ctx
        .db
        .inventory()
        .record_movement(args.kind.into(), args.id, movement_type, args.quantity, args.notes.as_deref())
        .await?;

    if ctx.json {
        return write_json(out, &recorded);
    }
    writeln!(
        out,
        "{} {} {} x{}; {} left",
        recorded.movement_type, recorded.kind, recorded.item_id, recorded.quantity_change, recorded.remaining_quantity
    )?;
    Ok(())
}

pub async fn run<W: Write>(command: StockCommand, ctx: &Context, out: &mut W) -> AppResult<()> {
    match command {
        StockCommand::In(args) => record(args, MovementType::In, ctx, out).await,
        StockCommand::Out(args) => record(args, MovementType::Out, ctx, out).await,
        StockCommand::History { kind, item, limit } => {
            let repo = ctx.db.movements(kind.into());
            let entries = match item {
                Some(item_id) => repo.for_item(item_id, limit).await?,
                None => repo.recent(limit).await?,
            };
            if ctx.json {
                return write_json(out, &entries);
            }
            if entries.is_empty() {
                writeln!(out, "No stock movements.")?;
            }
            for entry in &entries {
                write_entry(out, entry)?;
            }
            Ok(())
        }
    }
}
