//! # Command Line Definition
//!
//! ```text
//! tread [--db PATH] [--config PATH] [--json] <COMMAND>
//!
//!   quote        Price a set of four from flags (no database)
//!   promotions   list | add | update | delete
//!   tires        list | show | add | update | delete
//!   wheels       list | show | add | update | delete
//!   fitments     list | add | delete
//!   stock        in | out | history
//!   export       tires | wheels
//!   import       tires | wheels
//!   seed         Load demo data into an empty database
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

use tread_core::{Money, NewPromotion, NewTire, NewWheel, PromotionType, StockItemKind};

#[derive(Debug, Parser)]
#[command(name = "tread", about = "Tire & wheel shop inventory", version, long_about = None)]
pub struct Cli {
    /// SQLite database file (overrides config and TREAD_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file [default: <config dir>/tread.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Price a set of four from a base price and an optional promotion
    Quote(QuoteArgs),

    /// Manage promotions
    Promotions {
        #[command(subcommand)]
        command: PromotionCommand,
    },

    /// Tire inventory
    Tires {
        #[command(subcommand)]
        command: TireCommand,
    },

    /// Wheel inventory
    Wheels {
        #[command(subcommand)]
        command: WheelCommand,
    },

    /// Vehicles a wheel fits
    Fitments {
        #[command(subcommand)]
        command: FitmentCommand,
    },

    /// Stock in / out and movement history
    Stock {
        #[command(subcommand)]
        command: StockCommand,
    },

    /// Write inventory to a JSON file
    Export {
        #[command(subcommand)]
        command: TransferCommand,
    },

    /// Upsert inventory from a JSON file
    Import {
        #[command(subcommand)]
        command: TransferCommand,
    },

    /// Load demo promotions, tires and wheels into an empty database
    Seed,
}

/// Which inventory table a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ItemKind {
    Tire,
    Wheel,
}

impl From<ItemKind> for StockItemKind {
    fn from(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Tire => StockItemKind::Tire,
            ItemKind::Wheel => StockItemKind::Wheel,
        }
    }
}

// =============================================================================
// Quote
// =============================================================================

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Base price per item; omit to see the "no price" result
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Promotion type: buy_x_get_y, percentage_discount, fixed_price_per_n
    #[arg(long = "type", requires = "value1")]
    pub promo_type: Option<String>,

    /// X, percent, or fixed bundle total
    #[arg(long)]
    pub value1: Option<Decimal>,

    /// Y or N
    #[arg(long)]
    pub value2: Option<Decimal>,
}

// =============================================================================
// Promotions
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum PromotionCommand {
    /// List promotions by name
    List {
        /// Include inactive promotions
        #[arg(long)]
        all: bool,
    },
    /// Create a promotion
    Add(PromotionArgs),
    /// Replace a promotion's settings
    Update {
        id: i64,
        #[command(flatten)]
        promotion: PromotionArgs,
    },
    /// Delete a promotion; linked tires fall back to their base price
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct PromotionArgs {
    #[arg(long)]
    pub name: String,

    /// buy_x_get_y, percentage_discount, or fixed_price_per_n
    #[arg(long = "type")]
    pub promo_type: PromotionType,

    #[arg(long)]
    pub value1: Decimal,

    #[arg(long)]
    pub value2: Option<Decimal>,

    /// Create or leave the promotion switched off
    #[arg(long)]
    pub inactive: bool,
}

impl From<PromotionArgs> for NewPromotion {
    fn from(args: PromotionArgs) -> Self {
        NewPromotion {
            name: args.name,
            promo_type: args.promo_type,
            value1: args.value1,
            value2: args.value2,
            is_active: !args.inactive,
        }
    }
}

// =============================================================================
// Tires & wheels
// =============================================================================

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Substring to match
    #[arg(long, short)]
    pub search: Option<String>,

    /// Exact brand ("all" for every brand)
    #[arg(long, short)]
    pub brand: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum TireCommand {
    /// List tires with their promotional quotes
    List(ListArgs),
    /// Show one tire
    Show { id: i64 },
    /// Add a tire; its starting quantity is recorded as stock in
    Add(TireArgs),
    /// Edit a tire's details (quantity changes go through `stock`)
    Update {
        id: i64,
        #[command(flatten)]
        tire: TireArgs,
    },
    /// Delete a tire with no stock left
    Delete { id: i64 },
    /// Show the distinct brands
    Brands,
}

#[derive(Debug, Args)]
pub struct TireArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
    /// e.g. 205/55R16
    #[arg(long)]
    pub size: String,
    /// Base price per item
    #[arg(long)]
    pub price: Decimal,
    #[arg(long, default_value_t = 0)]
    pub quantity: i64,
    #[arg(long)]
    pub cost_sc: Option<Decimal>,
    #[arg(long)]
    pub cost_dunlop: Option<Decimal>,
    #[arg(long)]
    pub cost_online: Option<Decimal>,
    #[arg(long)]
    pub wholesale1: Option<Decimal>,
    #[arg(long)]
    pub wholesale2: Option<Decimal>,
    /// Promotion id to link
    #[arg(long)]
    pub promotion: Option<i64>,
    /// Year of manufacture
    #[arg(long)]
    pub year: Option<i32>,
}

impl From<TireArgs> for NewTire {
    fn from(args: TireArgs) -> Self {
        NewTire {
            brand: args.brand,
            model: args.model,
            size: args.size,
            quantity: args.quantity,
            cost_sc: args.cost_sc.map(Money::from_decimal),
            cost_dunlop: args.cost_dunlop.map(Money::from_decimal),
            cost_online: args.cost_online.map(Money::from_decimal),
            wholesale_price1: args.wholesale1.map(Money::from_decimal),
            wholesale_price2: args.wholesale2.map(Money::from_decimal),
            price_per_item: Money::from_decimal(args.price),
            promotion_id: args.promotion,
            year_of_manufacture: args.year,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum WheelCommand {
    /// List wheels
    List(ListArgs),
    /// Show one wheel and the vehicles it fits
    Show { id: i64 },
    /// Add a wheel; its starting quantity is recorded as stock in
    Add(WheelArgs),
    /// Edit a wheel's details (quantity changes go through `stock`)
    Update {
        id: i64,
        #[command(flatten)]
        wheel: WheelArgs,
    },
    /// Delete a wheel with no stock left
    Delete { id: i64 },
    /// Show the distinct brands
    Brands,
}

#[derive(Debug, Args)]
pub struct WheelArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
    /// Rim diameter in inches
    #[arg(long)]
    pub diameter: f64,
    /// Bolt pattern, e.g. 5x114.3
    #[arg(long)]
    pub pcd: String,
    /// Rim width in inches
    #[arg(long)]
    pub width: f64,
    /// Offset in mm
    #[arg(long, allow_negative_numbers = true)]
    pub et: Option<i64>,
    #[arg(long)]
    pub color: Option<String>,
    /// Retail price per wheel
    #[arg(long)]
    pub price: Decimal,
    #[arg(long, default_value_t = 0)]
    pub quantity: i64,
    #[arg(long)]
    pub cost: Option<Decimal>,
    #[arg(long)]
    pub cost_online: Option<Decimal>,
    #[arg(long)]
    pub wholesale1: Option<Decimal>,
    #[arg(long)]
    pub wholesale2: Option<Decimal>,
    #[arg(long)]
    pub image: Option<String>,
}

impl From<WheelArgs> for NewWheel {
    fn from(args: WheelArgs) -> Self {
        NewWheel {
            brand: args.brand,
            model: args.model,
            diameter: args.diameter,
            pcd: args.pcd,
            width: args.width,
            et: args.et,
            color: args.color,
            quantity: args.quantity,
            cost: args.cost.map(Money::from_decimal),
            cost_online: args.cost_online.map(Money::from_decimal),
            wholesale_price1: args.wholesale1.map(Money::from_decimal),
            wholesale_price2: args.wholesale2.map(Money::from_decimal),
            retail_price: Money::from_decimal(args.price),
            image_filename: args.image,
        }
    }
}

// =============================================================================
// Fitments
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum FitmentCommand {
    /// Vehicles a wheel fits
    List { wheel_id: i64 },
    /// Record a vehicle a wheel fits
    Add {
        wheel_id: i64,
        /// Vehicle make
        #[arg(long)]
        brand: String,
        /// Vehicle model
        #[arg(long)]
        model: String,
        /// First model year
        #[arg(long)]
        from: i32,
        /// Last model year (open-ended when omitted)
        #[arg(long)]
        to: Option<i32>,
    },
    /// Remove a fitment
    Delete { id: i64 },
}

// =============================================================================
// Stock
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    /// Receive stock
    In(MovementArgs),
    /// Sell or remove stock
    Out(MovementArgs),
    /// Recent movements, newest first
    History {
        #[arg(value_enum)]
        kind: ItemKind,
        /// Only this item
        #[arg(long)]
        item: Option<i64>,
        #[arg(long, default_value_t = tread_db::DEFAULT_HISTORY_LIMIT)]
        limit: i64,
    },
}

#[derive(Debug, Args)]
pub struct MovementArgs {
    #[arg(value_enum)]
    pub kind: ItemKind,
    pub id: i64,
    pub quantity: i64,
    #[arg(long)]
    pub notes: Option<String>,
}

// =============================================================================
// Import / export
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum TransferCommand {
    Tires(TransferArgs),
    Wheels(TransferArgs),
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    /// JSON file to read (import) or write (export; stdout when omitted)
    pub file: Option<PathBuf>,

    /// Export only: substring filter
    #[arg(long, short)]
    pub search: Option<String>,

    /// Export only: exact brand
    #[arg(long, short)]
    pub brand: Option<String>,
}
