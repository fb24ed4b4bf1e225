//! Catalog commands: browsing and the seller's own products.

use clap::Args;
use cybermart_core::{Category, Price, ProductId, SellerId};
use cybermart_storefront::backend::{ProductDraft, ProductSort};
use rust_decimal::Decimal;
use serde_json::json;

use super::{CliError, Context, print_json};

/// Product fields for create and update.
#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(short, long)]
    pub name: String,
    /// Unit price, e.g. `49.99`
    #[arg(short, long, value_parser = parse_price)]
    pub price: Decimal,
    #[arg(short, long, default_value = "")]
    pub description: String,
    #[arg(long, default_value_t = 0)]
    pub stock: u32,
    #[arg(long)]
    pub category: Option<String>,
    /// Comma-separated size options
    #[arg(long, value_delimiter = ',')]
    pub sizes: Vec<String>,
    /// Comma-separated color options
    #[arg(long, value_delimiter = ',')]
    pub colors: Vec<String>,
    /// Comma-separated image URLs
    #[arg(long, value_delimiter = ',')]
    pub images: Vec<String>,
    /// List the product as unavailable
    #[arg(long)]
    pub unavailable: bool,
}

impl From<ProductArgs> for ProductDraft {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: Price::new(args.price),
            stock: args.stock,
            available: !args.unavailable,
            category: args.category.as_deref().map(Category::new),
            sizes: args.sizes,
            colors: args.colors,
            images: args.images,
        }
    }
}

/// Parse a price argument, allowing a leading `$`.
fn parse_price(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .trim_start_matches('$')
        .parse::<Decimal>()
        .map_err(|e| format!("invalid price '{raw}': {e}"))
}

fn parse_sort(raw: &str) -> Result<ProductSort, CliError> {
    raw.parse().map_err(CliError::Invalid)
}

/// Print all products.
pub async fn list(ctx: &Context, sort: &str) -> Result<(), CliError> {
    let sort = parse_sort(sort)?;
    let mut products = ctx.marketplace.catalog().products(ctx.optional_token()).await?;
    sort.apply(&mut products);
    print_json(&products)
}

/// Print one product and its seller.
pub async fn show(ctx: &Context, id: &str) -> Result<(), CliError> {
    let token = ctx.optional_token();
    let product = ctx
        .marketplace
        .catalog()
        .product(token, &ProductId::new(id))
        .await?;
    let seller = match &product.seller {
        Some(seller_id) => ctx
            .marketplace
            .profile()
            .seller_profile(token, seller_id)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Seller profile unavailable"))
            .ok(),
        None => None,
    };
    print_json(&json!({ "product": product, "seller": seller }))
}

/// Print the products in a category.
pub async fn category(ctx: &Context, name: &str, sort: &str) -> Result<(), CliError> {
    let sort = parse_sort(sort)?;
    let category = Category::new(name);
    if !category.is_known() {
        tracing::warn!("'{}' is not one of the known categories", category);
    }
    let mut products = ctx
        .marketplace
        .catalog()
        .products_by_category(ctx.optional_token(), &category)
        .await?;
    sort.apply(&mut products);
    print_json(&products)
}

/// Print search results.
pub async fn search(ctx: &Context, query: &str) -> Result<(), CliError> {
    let products = ctx
        .marketplace
        .catalog()
        .search(ctx.optional_token(), query)
        .await?;
    print_json(&products)
}

/// Print a seller's profile and products.
pub async fn seller(ctx: &Context, id: &str) -> Result<(), CliError> {
    let token = ctx.optional_token();
    let seller_id = SellerId::new(id);
    let seller = ctx.marketplace.profile().seller_profile(token, &seller_id).await?;
    let products = ctx
        .marketplace
        .catalog()
        .seller_products(token, &seller_id)
        .await?;
    print_json(&json!({ "seller": seller, "products": products }))
}

/// Print the caller's own products.
pub async fn my_products(ctx: &Context) -> Result<(), CliError> {
    let products = ctx.marketplace.catalog().my_products(ctx.token()?).await?;
    print_json(&products)
}

/// Create a product.
pub async fn create(ctx: &Context, args: ProductArgs) -> Result<(), CliError> {
    let draft = ProductDraft::from(args);
    let product = ctx
        .marketplace
        .catalog()
        .create_product(ctx.token()?, &draft)
        .await?;
    print_json(&json!({ "created": true, "product": product }))
}

/// Replace a product's fields.
pub async fn update(ctx: &Context, id: &str, args: ProductArgs) -> Result<(), CliError> {
    let draft = ProductDraft::from(args);
    let product = ctx
        .marketplace
        .catalog()
        .update_product(ctx.token()?, &ProductId::new(id), &draft)
        .await?;
    print_json(&json!({ "updated": true, "product": product }))
}

/// Delete a product.
pub async fn delete(ctx: &Context, id: &str) -> Result<(), CliError> {
    ctx.marketplace
        .catalog()
        .delete_product(ctx.token()?, &ProductId::new(id))
        .await?;
    print_json(&json!({ "deleted": id }))
}
