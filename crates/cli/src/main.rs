//! Kasra CLI - terminal front end for the Kasra storefront.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the token is kept in $KASRA_STATE_DIR)
//! kasra login -e sara@example.com -p 'Str0ng!pass'
//!
//! # Browse and fill the cart
//! kasra products list --category 3 --search kettle
//! kasra cart add 42 -q 2 --size 7
//!
//! # Pay from the wallet
//! kasra wallet add 500000
//! kasra checkout --address "Tehran, Valiasr St." --payment-method wallet
//!
//! # Back office
//! kasra admin orders --status 12 shipped
//! ```
//!
//! # Commands
//!
//! - `login`, `register`, `logout`, `whoami` - Session management
//! - `products` - Catalog browsing with group pricing
//! - `cart` - Local cart editing
//! - `checkout`, `orders`, `wallet` - Orders and balance
//! - `admin` - Order and wallet administration

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use kasra_core::{BrandId, CategoryId, ColorId, OrderId, OrderStatus, ProductId, SizeId, UserId};
use kasra_storefront::config::StorefrontConfig;
use kasra_storefront::error::AppError;
use kasra_storefront::state::AppState;
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "kasra")]
#[command(author, version, about = "Kasra storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Remember this device
        #[arg(long)]
        remember: bool,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Edit the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the cart contents
    Checkout {
        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        payment_method: Option<String>,
    },
    /// Show your orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Show or top up your wallet
    Wallet {
        #[command(subcommand)]
        action: WalletAction,
    },
    /// Shop administration
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List active products
    List {
        #[arg(long)]
        category: Option<CategoryId>,

        #[arg(long)]
        brand: Option<BrandId>,

        #[arg(long)]
        search: Option<String>,
    },
    /// Show one product with its variants and related products
    Show {
        id: ProductId,

        /// Price a specific size
        #[arg(long)]
        size: Option<SizeId>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines
    Show,
    /// Add a product
    Add {
        product: ProductId,

        #[arg(short, long, default_value_t = 1.0)]
        quantity: f64,

        #[arg(long)]
        size: Option<SizeId>,

        #[arg(long)]
        color: Option<ColorId>,
    },
    /// Remove a line by id
    Remove { line: String },
    /// Set the quantity of a line
    Update { line: String, quantity: f64 },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List your orders
    List,
    /// Show one order
    Show { id: OrderId },
}

#[derive(Subcommand)]
enum WalletAction {
    /// Show the balance
    Show,
    /// Add funds
    Add { amount: Decimal },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every order, or change the status of one
    Orders {
        /// Order id and new status (`pending`, `paid`, `processing`, `shipped`, `completed`, `cancelled`)
        #[arg(long, num_args = 2, value_names = ["ORDER_ID", "STATUS"])]
        status: Option<Vec<String>>,
    },
    /// Show or top up a user's wallet
    Wallet {
        user: UserId,

        #[arg(long)]
        add: Option<Decimal>,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.expose_secret(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::debug!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kasra_storefront=info,kasra_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Sentry must be up before the tracing layer that feeds it
    let sentry_guard = init_sentry(&config);
    init_tracing();

    let state = AppState::with_file_store(config);
    let result = run(&state, cli).await;

    if let Err(e) = result {
        e.capture();
        tracing::error!("Command failed: {}", e.user_message());
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(state: &AppState, cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Commands::Login {
            email,
            password,
            remember,
        } => commands::account::login(state, &email, &password, remember).await,
        Commands::Register {
            username,
            email,
            password,
        } => commands::account::register(state, &username, &email, &password).await,
        Commands::Logout => {
            commands::account::logout(state);
            Ok(())
        }
        Commands::Whoami => commands::account::whoami(state).await,
        Commands::Products { action } => match action {
            ProductsAction::List {
                category,
                brand,
                search,
            } => commands::catalog::list(state, category, brand, search).await,
            ProductsAction::Show { id, size } => commands::catalog::show(state, id, size).await,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => {
                commands::cart::show(state);
                Ok(())
            }
            CartAction::Add {
                product,
                quantity,
                size,
                color,
            } => commands::cart::add(state, product, quantity, size, color).await,
            CartAction::Remove { line } => commands::cart::remove(state, &line),
            CartAction::Update { line, quantity } => {
                commands::cart::update(state, &line, quantity)
            }
            CartAction::Clear => {
                commands::cart::clear(state);
                Ok(())
            }
        },
        Commands::Checkout {
            address,
            payment_method,
        } => commands::orders::checkout(state, address, payment_method).await,
        Commands::Orders { action } => match action {
            OrdersAction::List => commands::orders::list(state).await,
            OrdersAction::Show { id } => commands::orders::show(state, id).await,
        },
        Commands::Wallet { action } => match action {
            WalletAction::Show => commands::orders::wallet(state).await,
            WalletAction::Add { amount } => commands::orders::top_up(state, amount).await,
        },
        Commands::Admin { action } => match action {
            AdminAction::Orders { status } => {
                let change = status.map(|args| parse_status_change(&args)).transpose()?;
                commands::admin::orders(state, change).await
            }
            AdminAction::Wallet { user, add } => commands::admin::wallet(state, user, add).await,
        },
    }
}

/// Parse the `--status <ORDER_ID> <STATUS>` pair.
fn parse_status_change(args: &[String]) -> Result<(OrderId, OrderStatus), AppError> {
    let [id, status] = args else {
        return Err(AppError::BadRequest(
            "--status takes an order id and a status".to_string(),
        ));
    };
    let id = id
        .parse::<OrderId>()
        .map_err(|_| AppError::BadRequest(format!("invalid order id: {id}")))?;
    let status = status
        .parse::<OrderStatus>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok((id, status))
}
