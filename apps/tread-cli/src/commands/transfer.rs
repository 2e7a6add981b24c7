//! `tread export ...` and `tread import ...`
//!
//! Files are JSON arrays with one object per item. Export writes the columns
//! import reads back, plus the promotion and quote columns for tires.

use std::fs;
use std::io::Write;
use tracing::info;

use tread_core::import::ImportSummary;
use tread_core::InventoryFilter;

use super::{write_json, Context};
use crate::cli::{TransferArgs, TransferCommand};
use crate::error::{AppError, AppResult};

pub async fn export<W: Write>(command: TransferCommand, ctx: &Context, out: &mut W) -> AppResult<()> {
    let inventory = ctx.db.inventory();
    let (document, args) = match command {
        TransferCommand::Tires(args) => (inventory.export_tires(&filter(&args)).await?, args),
        TransferCommand::Wheels(args) => (inventory.export_wheels(&filter(&args)).await?, args),
    };

    match args.file {
        Some(path) => {
            fs::write(&path, document.as_bytes())?;
            info!(path = %path.display(), "Export written");
            writeln!(out, "Exported to {}", path.display())?;
        }
        None => writeln!(out, "{document}")?,
    }
    Ok(())
}

pub async fn import<W: Write>(command: TransferCommand, ctx: &Context, out: &mut W) -> AppResult<()> {
    let inventory = ctx.db.inventory();
    let summary = match command {
        TransferCommand::Tires(args) => inventory.import_tires(&read(&args)?).await?,
        TransferCommand::Wheels(args) => inventory.import_wheels(&read(&args)?).await?,
    };

    if ctx.json {
        return write_json(out, &summary);
    }
    write_summary(out, &summary)?;
    Ok(())
}

fn filter(args: &TransferArgs) -> InventoryFilter {
    InventoryFilter {
        query: args.search.clone(),
        brand: args.brand.clone(),
    }
}

fn read(args: &TransferArgs) -> AppResult<String> {
    let path = args
        .file
        .as_ref()
        .ok_or_else(|| AppError::Usage("import needs a file to read".to_string()))?;
    Ok(fs::read_to_string(path)?)
}

fn write_summary<W: Write>(out: &mut W, summary: &ImportSummary) -> std::io::Result<()> {
    writeln!(out, "{summary}")?;
    for error in &summary.errors {
        writeln!(out, "  {error}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, text};
    use tread_core::StockItemKind;
    use tread_db::DEFAULT_HISTORY_LIMIT;

    fn args(file: Option<std::path::PathBuf>) -> TransferArgs {
        TransferArgs {
            file,
            search: None,
            brand: None,
        }
    }

    #[tokio::test]
    async fn test_import_then_export_tires() {
        let ctx = context().await;
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("tires.json");
        fs::write(
            &source,
            r#"[
                {"brand": "Maxxis", "model": "MA-P3", "size": "185/60R15", "quantity": 8, "price_per_item": 1650},
                {"brand": "", "model": "Nameless", "size": "175/70R13"},
                {"brand": "Maxxis", "model": "MA-P3", "size": "185/60R15", "quantity": 5}
            ]"#,
        )
        .unwrap();

        let mut out = Vec::new();
        import(TransferCommand::Tires(args(Some(source))), &ctx, &mut out).await.unwrap();
        let report = text(out);
        assert!(report.starts_with("1 imported, 1 updated, 1 failed"));
        assert!(report.contains("row 3:"));

        let listings = ctx.db.tires().list(&InventoryFilter::default()).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].tire.quantity, 5);
        let history = ctx
            .db
            .movements(StockItemKind::Tire)
            .recent(DEFAULT_HISTORY_LIMIT)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);

        let target = dir.path().join("export.json");
        let mut out = Vec::new();
        export(TransferCommand::Tires(args(Some(target.clone()))), &ctx, &mut out).await.unwrap();
        assert!(text(out).starts_with("Exported to"));

        let rows: Vec<serde_json::Value> = serde_json::from_str(&fs::read_to_string(target).unwrap()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["brand"], "Maxxis");
        assert_eq!(rows[0]["quantity"], 5);
    }

    #[tokio::test]
    async fn test_export_to_stdout_filtered() {
        let ctx = context().await;
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("wheels.json");
        fs::write(
            &source,
            r#"[
                {"brand": "Lenso", "model": "Jager", "diameter": 16, "pcd": "6x139.7", "width": 8, "retail_price": 3900},
                {"brand": "Cosmis", "model": "XT-005R", "diameter": 18, "pcd": "5x114.3", "width": 9.5, "retail_price": 6500}
            ]"#,
        )
        .unwrap();
        let mut out = Vec::new();
        import(TransferCommand::Wheels(args(Some(source))), &ctx, &mut out).await.unwrap();

        let mut filtered = args(None);
        filtered.brand = Some("Cosmis".to_string());
        let mut out = Vec::new();
        export(TransferCommand::Wheels(filtered), &ctx, &mut out).await.unwrap();

        let rows: Vec<serde_json::Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["model"], "XT-005R");
    }

    #[tokio::test]
    async fn test_import_without_file() {
        let ctx = context().await;
        let mut out = Vec::new();
        let err = import(TransferCommand::Tires(args(None)), &ctx, &mut out).await.unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
    }

    #[tokio::test]
    async fn test_import_not_an_array() {
        let ctx = context().await;
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bad.json");
        fs::write(&source, r#"{"brand": "Maxxis"}"#).unwrap();

        let mut out = Vec::new();
        let err = import(TransferCommand::Tires(args(Some(source))), &ctx, &mut out).await.unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
