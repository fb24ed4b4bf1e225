//! CyberMart CLI - Shop and sell on the marketplace from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in and keep the token for later commands
//! export CYBERMART_TOKEN=$(cybermart login -e buyer@example.com -p secret | jq -r .token)
//!
//! # Browse
//! cybermart products list --sort price-asc
//! cybermart products search "denim jacket"
//!
//! # Shop
//! cybermart cart add 6650f0c2a1 --quantity 2 --size M
//! cybermart wishlist toggle 6650f0c2a1
//! cybermart checkout
//!
//! # Sell
//! cybermart seller-products create --name "Denim Jacket" --price 49.99 --sizes S,M,L
//! cybermart sales summary
//! cybermart sales set-status 6651aa09 "On the way"
//! ```
//!
//! # Environment Variables
//!
//! - `CYBERMART_TOKEN` - Bearer token (same as `--token`)
//! - `PROFILE_SERVICE_URL`, `CATALOG_SERVICE_URL`, `ORDER_SERVICE_URL` -
//!   Backend locations, as for the storefront gateway
//!
//! Output is pretty-printed JSON on stdout. Logs go to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use cybermart_core::Role;

mod commands;

use commands::{CliError, Context};

#[derive(Parser)]
#[command(name = "cybermart")]
#[command(author, version, about = "CyberMart marketplace client")]
struct Cli {
    /// Bearer token from `cybermart login`
    #[arg(long, env = "CYBERMART_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print a bearer token
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "CYBERMART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "CYBERMART_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long, default_value = "")]
        phone: String,
        /// `buyer` or `seller`
        #[arg(short, long, default_value = "buyer")]
        role: Role,
    },
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage your cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage your wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Pay for the cart and place the order
    Checkout,
    /// Show your order history
    Orders,
    /// Seller: view and update sales
    Sales {
        #[command(subcommand)]
        action: SalesAction,
    },
    /// Seller: manage your products
    SellerProducts {
        #[command(subcommand)]
        action: SellerProductsAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show,
    /// Update profile fields; omitted fields stay unchanged
    Update(commands::account::ProfileArgs),
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List all products
    List {
        /// `default`, `price-asc` or `price-desc`
        #[arg(short, long, default_value = "default")]
        sort: String,
    },
    /// Show one product with its seller
    Show { id: String },
    /// List products in a category
    Category {
        name: String,
        #[arg(short, long, default_value = "default")]
        sort: String,
    },
    /// Search the catalog
    Search { query: String },
    /// Show a seller and their products
    Seller { id: String },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart with totals
    Show,
    /// Add a product
    Add {
        product_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        #[arg(short, long)]
        size: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Remove a line
    Remove {
        product_id: String,
        #[arg(short, long)]
        size: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Add the product if absent, remove it if present
    Toggle { product_id: String },
}

#[derive(Subcommand)]
enum SalesAction {
    /// List orders containing your products
    List,
    /// Order count, revenue and status breakdown
    Summary,
    /// Change an order's status
    SetStatus { order_id: String, status: String },
}

#[derive(Subcommand)]
enum SellerProductsAction {
    /// List your products
    List,
    /// Create a product
    Create(commands::catalog::ProductArgs),
    /// Replace a product's fields
    Update {
        id: String,
        #[command(flatten)]
        product: commands::catalog::ProductArgs,
    },
    /// Delete a product
    Delete { id: String },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs on stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::new(cli.token.as_deref())?;

    match cli.command {
        Commands::Login { email, password } => commands::account::login(&ctx, &email, &password).await,
        Commands::Signup {
            name,
            email,
            password,
            confirm_password,
            phone,
            role,
        } => {
            let confirm = confirm_password.unwrap_or_else(|| password.clone());
            commands::account::signup(&ctx, &name, &email, &password, &confirm, &phone, role).await
        }
        Commands::Profile { action } => match action {
            ProfileAction::Show => commands::account::show(&ctx).await,
            ProfileAction::Update(args) => commands::account::update(&ctx, args).await,
        },
        Commands::Products { action } => match action {
            ProductsAction::List { sort } => commands::catalog::list(&ctx, &sort).await,
            ProductsAction::Show { id } => commands::catalog::show(&ctx, &id).await,
            ProductsAction::Category { name, sort } => {
                commands::catalog::category(&ctx, &name, &sort).await
            }
            ProductsAction::Search { query } => commands::catalog::search(&ctx, &query).await,
            ProductsAction::Seller { id } => commands::catalog::seller(&ctx, &id).await,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::shop::cart_show(&ctx).await,
            CartAction::Add {
                product_id,
                quantity,
                size,
                color,
            } => commands::shop::cart_add(&ctx, &product_id, quantity, size, color).await,
            CartAction::Remove {
                product_id,
                size,
                color,
            } => commands::shop::cart_remove(&ctx, &product_id, size, color).await,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::shop::wishlist_show(&ctx).await,
            WishlistAction::Toggle { product_id } => {
                commands::shop::wishlist_toggle(&ctx, &product_id).await
            }
        },
        Commands::Checkout => commands::shop::checkout(&ctx).await,
        Commands::Orders => commands::shop::orders(&ctx).await,
        Commands::Sales { action } => match action {
            SalesAction::List => commands::sales::list(&ctx).await,
            SalesAction::Summary => commands::sales::summary(&ctx).await,
            SalesAction::SetStatus { order_id, status } => {
                commands::sales::set_status(&ctx, &order_id, &status).await
            }
        },
        Commands::SellerProducts { action } => match action {
            SellerProductsAction::List => commands::catalog::my_products(&ctx).await,
            SellerProductsAction::Create(args) => commands::catalog::create(&ctx, args).await,
            SellerProductsAction::Update { id, product } => {
                commands::catalog::update(&ctx, &id, product).await
            }
            SellerProductsAction::Delete { id } => commands::catalog::delete(&ctx, &id).await,
        },
    }
}

