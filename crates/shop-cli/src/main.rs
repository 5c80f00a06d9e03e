//! # storefront
//!
//! Command-line storefront client.
//!
//! ## Usage
//!
//! ```bash
//! # Point at the backend (or use config/storefront.toml)
//! export STOREFRONT_API_URL=http://localhost:8000/api
//!
//! storefront login -u rex -p hunter22
//! storefront products --search collar --ordering price
//! storefront add-product --name "Chew Toy" --price 9.50 --inventory 4 --image toy.png
//! storefront buy 12 --quantity 1 --address "1 Main St" --province Ontario --municipality Toronto
//! ```

use clap::{Parser, Subcommand};
use shop_cli::{commands, LoginArgs, ProductArgs, ProductFilter, ShippingArgs, TerminalNavigator};
use shop_client::{ClientConfig, Storefront};
use shop_core::ShopError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "storefront")]
#[command(author, version, about = "Storefront client")]
struct Cli {
    /// Backend base URL (overrides config file and environment)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for the cached profile and session cookies
    #[arg(long, global = true)]
    profile_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and cache the profile
    Login {
        #[command(flatten)]
        login: LoginArgs,
    },
    /// End the session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Print the number of items in the cart
    CartCount {
        #[command(flatten)]
        login: LoginArgs,
    },
    /// List the newest products, or search the catalog
    Products {
        #[command(flatten)]
        filter: ProductFilter,
    },
    /// List your own products
    MyProducts {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[command(flatten)]
        login: LoginArgs,
    },
    /// List a new product for sale
    AddProduct {
        #[command(flatten)]
        product: ProductArgs,
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Remove one of your products
    DeleteProduct {
        /// Product ID
        id: u64,
        #[command(flatten)]
        login: LoginArgs,
    },
    /// Pay for everything in the cart
    CheckoutCart {
        #[command(flatten)]
        login: LoginArgs,
        #[command(flatten)]
        shipping: ShippingArgs,
    },
    /// Pay for a single product
    Buy {
        /// Product ID
        product_id: u64,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        #[command(flatten)]
        login: LoginArgs,
        #[command(flatten)]
        shipping: ShippingArgs,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Command failed: {:#}", e);
        match e.downcast_ref::<ShopError>() {
            Some(shop_err) => eprintln!("{}", shop_err.user_message()),
            None => eprintln!("{:#}", e),
        }
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match cli.api_url {
        Some(ref url) => ClientConfig::new(url),
        None => ClientConfig::load()?,
    };
    if let Some(ref dir) = cli.profile_dir {
        config = config.with_profile_dir(dir);
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    debug!(base_url = config.base_url(), "Using backend");

    let shop = Storefront::new(&config, Arc::new(TerminalNavigator::new()))?;

    match cli.command {
        Command::Login { login } => commands::login(&shop, &login).await,
        Command::Logout => commands::logout(&shop).await,
        Command::Whoami => commands::whoami(&shop).await,
        Command::CartCount { login } => commands::cart_count(&shop, &login).await,
        Command::Products { filter } => commands::products(&shop, &filter).await,
        Command::MyProducts {
            search,
            offset,
            login,
        } => commands::my_products(&shop, &login, search.as_deref(), offset).await,
        Command::AddProduct { product, login } => {
            commands::add_product(&shop, &login, &product).await
        }
        Command::DeleteProduct { id, login } => commands::delete_product(&shop, &login, id).await,
        Command::CheckoutCart { login, shipping } => {
            commands::checkout_cart(&shop, &login, &shipping).await
        }
        Command::Buy {
            product_id,
            quantity,
            login,
            shipping,
        } => commands::buy(&shop, &login, product_id, quantity, &shipping).await,
    }
}
