use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "survivor")]
#[command(about = "Gap-triggered options-selling engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded tick file through the engine with the paper broker
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/survivor.toml")]
        config: String,
        /// Tick CSV file (timestamp,price columns)
        #[arg(short, long)]
        ticks: String,
    },
    /// Summarize the order ledger
    Ledger {
        /// Ledger file path
        #[arg(short, long, default_value = "artifacts/orders_data.json")]
        file: String,
    },
    /// Inspect an instrument dump the way the engine would load it
    Catalog {
        /// Instrument dump CSV file
        #[arg(short, long, default_value = "artifacts/instruments.csv")]
        file: String,
        /// Trading-symbol prefix to keep
        #[arg(short, long, default_value = "NIFTY")]
        prefix: String,
        /// Venue segment to keep
        #[arg(short, long, default_value = "NFO-OPT")]
        segment: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Run { config, ticks } => {
            run_engine(&config, &ticks).await?;
        }
        Commands::Ledger { file } => {
            run_ledger_summary(&file)?;
        }
        Commands::Catalog {
            file,
            prefix,
            segment,
        } => {
            run_catalog_summary(&file, &prefix, &segment)?;
        }
    }

    Ok(())
}

async fn run_engine(config_path: &str, ticks_path: &str) -> anyhow::Result<()> {
    use survivor_core::ConfigLoader;
    use survivor_data::{InstrumentCatalog, ReplayFeed};
    use survivor_execution::PaperBroker;
    use survivor_ledger::OrderLedger;
    use survivor_strategy::SurvivorEngine;

    tracing::info!("Starting Survivor engine with config: {}", config_path);

    let config = ConfigLoader::load_from(config_path)?;
    let catalog = InstrumentCatalog::from_csv(
        &config.instruments_file,
        &config.series_prefix,
        &config.segment,
    )?;
    let ticks = ReplayFeed::from_csv(ticks_path)?;
    // The paper broker answers unknown symbols at the premium floor, so
    // selection clears the floor everywhere in a dry run.
    let broker = PaperBroker::with_default_quote(config.min_price_to_sell);
    let ledger = OrderLedger::open(&config.orders_file);

    let mut engine = SurvivorEngine::new(config, catalog, broker, ticks, ledger);
    engine.run().await?;

    println!("Ticks processed: {}", engine.ticks_seen());
    println!("Orders recorded: {}", engine.ledger().len());
    if let Some(order) = engine.ledger().current_order() {
        println!(
            "Last order: {} {} x{} ({})",
            order.order_id, order.symbol, order.quantity, order.transaction_type
        );
    }

    Ok(())
}

fn run_ledger_summary(file: &str) -> anyhow::Result<()> {
    use survivor_core::types::TransactionType;
    use survivor_ledger::OrderLedger;

    let ledger = OrderLedger::open(file);

    println!("Ledger: {}", ledger.path().display());
    println!("  Orders:    {}", ledger.len());
    println!("  Open:      {}", ledger.open_orders().count());
    println!("  Completed: {}", ledger.completed_orders().count());
    println!(
        "  Completed sells/buys: {}/{}",
        ledger.completed_count(TransactionType::Sell),
        ledger.completed_count(TransactionType::Buy)
    );
    if let Some(order) = ledger.current_order() {
        let when = order
            .timestamp
            .map_or_else(|| "unknown time".to_string(), |t| t.to_rfc3339());
        println!(
            "  Current:   {} {} x{} at {}",
            order.order_id, order.symbol, order.quantity, when
        );
    }

    Ok(())
}

fn run_catalog_summary(file: &str, prefix: &str, segment: &str) -> anyhow::Result<()> {
    use survivor_core::types::OptionSide;
    use survivor_data::InstrumentCatalog;

    let catalog = InstrumentCatalog::from_csv(file, prefix, segment)?;

    println!("Catalog: {} contracts for {}", catalog.len(), prefix);
    for side in [OptionSide::Put, OptionSide::Call] {
        let strikes = catalog.distinct_strikes(side);
        match (strikes.first(), strikes.last()) {
            (Some(low), Some(high)) => println!(
                "  {side}: {} contracts, strikes {low} to {high} ({} distinct)",
                catalog.side_count(side),
                strikes.len()
            ),
            _ => println!("  {side}: no contracts"),
        }
    }
    match catalog.strike_spacing() {
        Some(spacing) => println!("  Strike spacing: {spacing}"),
        None => println!("  Strike spacing: cannot be derived"),
    }

    Ok(())
}
