use clap::Parser;
use orderdesk::config::Settings;
use orderdesk::exchange::SignedAction;
use orderdesk::logging::{init_logging, LogLevel};
use orderdesk::orders::Order;
use orderdesk::types::OrderType;
use orderdesk::validation::{validate_order_params, RawOrderParams};
use tracing::debug;

// --- CLI Argument Parsing ---
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override LOG_LEVEL (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Validate an order and print the request body that would be sent
    Preview {
        /// Trading pair (e.g., "BTC-USDT")
        #[arg(long)]
        symbol: String,
        /// BUY or SELL
        #[arg(long)]
        side: String,
        /// MARKET, LIMIT, STOP_LOSS or TAKE_PROFIT
        #[arg(long, default_value = "MARKET")]
        order_type: OrderType,
        #[arg(long)]
        quantity: String,
        /// Limit, stop or take-profit price, depending on the order type
        #[arg(long)]
        price: Option<String>,
        /// Defaults to DEFAULT_LEVERAGE from settings
        #[arg(long)]
        leverage: Option<String>,
        #[arg(long)]
        client_order_id: Option<String>,
        #[arg(long)]
        time_in_force: Option<String>,
        #[arg(long, default_value_t = false)]
        reduce_only: bool,
        /// Wrap the body in a signed envelope (requires PRIVATE_KEY)
        #[arg(long, default_value_t = false)]
        sign: bool,
    },
    /// Print resolved settings (private key redacted)
    Settings,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    let mut log_config = settings.log_config();
    if let Some(level) = cli.log_level {
        log_config.level = level;
    }
    init_logging(&log_config)?;

    match cli.command {
        Commands::Preview {
            symbol,
            side,
            order_type,
            quantity,
            price,
            leverage,
            client_order_id,
            time_in_force,
            reduce_only,
            sign,
        } => {
            let raw = RawOrderParams {
                symbol: Some(symbol),
                side: Some(side),
                quantity: Some(quantity.into()),
                price: price.map(Into::into),
                leverage: Some(
                    leverage
                        .map(Into::into)
                        .unwrap_or_else(|| settings.default_leverage.into()),
                ),
                max_leverage: Some(settings.max_leverage),
                client_order_id,
                time_in_force,
                reduce_only: Some(reduce_only),
                ..RawOrderParams::default()
            };

            let params = validate_order_params(&raw)?.into_params(order_type);
            let body = Order::new(params).to_request_body()?;
            debug!(symbol = %body.symbol, "Order validated");

            let output = if sign {
                let signer = settings.signer()?;
                serde_json::to_value(SignedAction::now(&signer, body.to_value()?, None)?)?
            } else {
                body.to_value()?
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Settings => {
            println!("{:#?}", settings);
        }
    }

    Ok(())
}
