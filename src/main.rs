//! Shop Inventory CLI
//!
//! Registers sales, prints the financial report and loads new merchandise
//! into the spreadsheet-backed inventory table.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use shop_inventory::formatters::{format_item_list, format_notices, format_report};
use shop_inventory::store::CsvFileStore;
use shop_inventory::{
    export, hash_password, size_options, Backend, Config, InventoryService, NewProduct, Session,
    Table, TableStore,
};

/// Clothing shop inventory on a spreadsheet
#[derive(Parser, Debug)]
#[command(name = "shop_inventory")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value_os_t = shop_inventory::config::default_config_path())]
    config: PathBuf,

    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the store settings of the config file
#[derive(clap::Args, Debug)]
struct StoreArgs {
    /// Store backend (overrides the config file)
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Spreadsheet name (overrides the config file)
    #[arg(long)]
    spreadsheet: Option<String>,

    /// Worksheet name (overrides the config file)
    #[arg(long)]
    worksheet: Option<String>,

    /// Root directory of the CSV backend (overrides the config file)
    #[arg(long)]
    csv_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List items in stock, or search all items by product name
    List {
        /// Case-insensitive product name search
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Register the sale of one unit
    Sell {
        /// Item ID
        id: i64,
    },
    /// Add a new merchandise line (admin only)
    Add {
        #[arg(long)]
        category: String,
        #[arg(long)]
        product: String,
        #[arg(long)]
        size: String,
        #[arg(long)]
        color: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        /// Unit price in whole currency units
        #[arg(long, default_value_t = 50000)]
        price: u32,
        /// Admin password (falls back to $SHOP_INVENTORY_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
    /// Print revenue, stock totals and best sellers
    Report,
    /// Write the full table to inventario_YYYYMMDD.csv
    Export {
        /// Output directory (overrides the config file)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Create an empty table in the CSV backend
    Init,
    /// Show the size choices for a category
    Sizes { category: String },
    /// List the categories already in use
    Categories,
    /// Print the SHA-256 digest of a password, for the config file
    HashPassword { password: String },
}

fn main() {
    // Initialize logger. Set RUST_LOG environment variable to control log level.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut session = Session::new();

    let result = run(args, &mut session);

    let notices = session.notices.drain();
    if !notices.is_empty() {
        eprint!("{}", format_notices(&notices));
    }

    if let Err(e) = result {
        log::error!("Application error: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(path: &Path, args: &StoreArgs) -> anyhow::Result<Config> {
    let mut config = Config::load(path)?;
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    if let Some(spreadsheet) = &args.spreadsheet {
        config.spreadsheet = spreadsheet.clone();
    }
    if let Some(worksheet) = &args.worksheet {
        config.worksheet = worksheet.clone();
    }
    if let Some(csv_dir) = &args.csv_dir {
        config.csv_dir = csv_dir.clone();
    }
    Ok(config)
}

/// Loads the config and opens the inventory table it points at.
fn open_service(path: &Path, args: &StoreArgs) -> anyhow::Result<(Config, InventoryService)> {
    let config = load_config(path, args)?;
    let store = config.open_store().context("Failed to open inventory store")?;
    let service = InventoryService::new(store, &config.spreadsheet, &config.worksheet);
    log::debug!(
        "Using {:?} store {}/{}",
        config.backend,
        service.spreadsheet(),
        service.worksheet()
    );
    Ok((config, service))
}

fn run(args: Args, session: &mut Session) -> anyhow::Result<()> {
    match args.command {
        Command::List { search } => {
            let (_, service) = open_service(&args.config, &args.store)?;
            let items = service.list(session, search.as_deref());
            print!("{}", format_item_list(&items));
        }
        Command::Sell { id } => {
            let (_, service) = open_service(&args.config, &args.store)?;
            let item = service.sell(session, id)?;
            println!(
                "Vendido: {} ({} / Talla {}), stock restante {}",
                item.product, item.color, item.size, item.stock
            );
        }
        Command::Add {
            category,
            product,
            size,
            color,
            quantity,
            price,
            password,
        } => {
            let (config, service) = open_service(&args.config, &args.store)?;
            let password = password
                .or_else(|| std::env::var("SHOP_INVENTORY_PASSWORD").ok())
                .context("Admin password required (--password or $SHOP_INVENTORY_PASSWORD)")?;
            if !session.login(&config.password_check(), &password) {
                anyhow::bail!("Access denied");
            }
            let new = NewProduct {
                category,
                product,
                size,
                color,
                quantity,
                price,
            };
            let result = service.add_product(session, &new);
            session.logout();
            let item = result?;
            println!("Cargado: [{}] {} x{}", item.id, item.product, item.stock);
        }
        Command::Report => {
            let (_, service) = open_service(&args.config, &args.store)?;
            let metrics = service.metrics(session);
            print!("{}", format_report(&metrics, session.last_update()));
        }
        Command::Export { dir } => {
            let (config, service) = open_service(&args.config, &args.store)?;
            let table = service.load(session);
            if session.notices.has_errors() {
                anyhow::bail!("Nothing exported, the inventory could not be loaded");
            }
            let dir = dir.unwrap_or(config.export_dir);
            let today = chrono::Local::now().date_naive();
            let path = export::export_to_dir(&table, &dir, today)?;
            println!("{}", path.display());
        }
        Command::Categories => {
            let (_, service) = open_service(&args.config, &args.store)?;
            for category in service.categories(session) {
                println!("{category}");
            }
        }
        Command::Init => {
            let config = load_config(&args.config, &args.store)?;
            if config.backend != Backend::Csv {
                anyhow::bail!(
                    "init only applies to the csv backend, create the spreadsheet in Google Sheets"
                );
            }
            let store = CsvFileStore::new(&config.csv_dir);
            let path = store.table_path(&config.spreadsheet, &config.worksheet);
            if path.exists() {
                anyhow::bail!("{} already exists", path.display());
            }
            store.replace_rows(&config.spreadsheet, &config.worksheet, &Table::default().to_grid())?;
            println!("{}", path.display());
        }
        Command::Sizes { category } => {
            println!("{}", size_options(&category).join(", "));
        }
        Command::HashPassword { password } => {
            println!("{}", hash_password(&password));
        }
    }

    Ok(())
}
