//! # Commands
//!
//! One function per CLI subcommand. Each process starts anonymous: commands
//! that need a session first try to restore one, then fall back to the
//! credentials given on the command line or in the environment.

use anyhow::{bail, Context};
use clap::Args;
use shop_client::{Credentials, Storefront};
use shop_core::{
    CheckoutEndpoint, FileUpload, Page, PaymentSession, Product, ProductDraft, ProductQuery,
    PurchaseIntent, ShippingInfo,
};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Credentials used when no session can be restored
#[derive(Debug, Clone, Default, Args)]
pub struct LoginArgs {
    #[arg(short, long, env = "STOREFRONT_USERNAME")]
    pub username: Option<String>,

    #[arg(short, long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl LoginArgs {
    fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(Credentials::new(user, pass)),
            _ => None,
        }
    }
}

/// Shipping destination
#[derive(Debug, Clone, Args)]
pub struct ShippingArgs {
    #[arg(long)]
    pub address: String,

    #[arg(long)]
    pub province: String,

    #[arg(long)]
    pub municipality: String,
}

impl ShippingArgs {
    pub fn to_info(&self) -> ShippingInfo {
        ShippingInfo::new(&self.address, &self.province, &self.municipality)
    }
}

/// Product listing filters; no filters lists the newest products
#[derive(Debug, Clone, Default, Args)]
pub struct ProductFilter {
    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Ordering key, e.g. `price` or `-price`
    #[arg(long)]
    pub ordering: Option<String>,

    /// Category slug
    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub min_price: Option<String>,

    #[arg(long)]
    pub max_price: Option<String>,

    #[arg(long)]
    pub offset: Option<u32>,
}

impl ProductFilter {
    fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.ordering.is_none()
            && self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.offset.is_none()
    }

    /// `None` when the landing-page listing should be used
    pub fn to_query(&self) -> Option<ProductQuery> {
        if self.is_empty() {
            return None;
        }

        let mut query = ProductQuery::new()
            .search(self.search.clone().unwrap_or_default())
            .price_range(self.min_price.clone(), self.max_price.clone());
        if let Some(ref ordering) = self.ordering {
            query = query.ordering(ordering);
        }
        if let Some(ref category) = self.category {
            query = query.category(category);
        }
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        Some(query)
    }
}

/// A product listing as entered on the command line
#[derive(Debug, Clone, Args)]
pub struct ProductArgs {
    #[arg(long)]
    pub name: String,

    /// Decimal price, e.g. `19.99`
    #[arg(long)]
    pub price: String,

    #[arg(long)]
    pub inventory: u32,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Category slug; repeat for several
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Product image to upload once the listing exists
    #[arg(long)]
    pub image: Option<PathBuf>,
}

impl ProductArgs {
    pub fn to_draft(&self) -> ProductDraft {
        ProductDraft::new(&self.name, &self.price, self.inventory)
            .with_description(&self.description)
            .with_categories(self.categories.iter().cloned())
    }
}

/// Restore the previous session, or log in with `login` if given
async fn ensure_session(shop: &Storefront, login: &LoginArgs) -> anyhow::Result<()> {
    if shop.session.initialize().await {
        return Ok(());
    }
    let Some(credentials) = login.credentials() else {
        bail!("Not logged in. Pass --username/--password or set STOREFRONT_USERNAME/STOREFRONT_PASSWORD.");
    };
    shop.session.login(&credentials).await?;
    Ok(())
}

#[instrument(skip(shop, login))]
pub async fn login(shop: &Storefront, login: &LoginArgs) -> anyhow::Result<()> {
    let credentials = login
        .credentials()
        .context("Both --username and --password are required")?;
    let profile = shop.session.login(&credentials).await?;

    println!("Logged in as {}", profile.username);
    println!("Cart: {} item(s)", shop.cart.count());
    Ok(())
}

pub async fn logout(shop: &Storefront) -> anyhow::Result<()> {
    if !shop.session.initialize().await {
        println!("Not logged in.");
        return Ok(());
    }
    shop.session.logout().await;
    Ok(())
}

pub async fn whoami(shop: &Storefront) -> anyhow::Result<()> {
    let restored = shop.session.initialize().await;
    match shop.session.profile() {
        Some(profile) if restored => {
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        _ => println!("anonymous"),
    }
    Ok(())
}

pub async fn cart_count(shop: &Storefront, login: &LoginArgs) -> anyhow::Result<()> {
    ensure_session(shop, login).await?;
    shop.cart.fetch_count().await;
    println!("{}", shop.cart.count());
    Ok(())
}

pub async fn products(shop: &Storefront, filter: &ProductFilter) -> anyhow::Result<()> {
    let page = match filter.to_query() {
        Some(query) => shop.api.search_products(&query).await?,
        None => shop.api.latest_products().await?,
    };

    if page.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    print_products(&page);
    Ok(())
}

fn print_products(page: &Page<Product>) {
    for product in &page.results {
        println!(
            "{:>6}  {:<40} {:>10}  ({} in stock)",
            product.id, product.name, product.price, product.inventory
        );
    }
    if page.has_more() {
        println!("... {} products in total", page.count);
    }
}

/// The signed-in seller's own listings
pub async fn my_products(
    shop: &Storefront,
    login: &LoginArgs,
    search: Option<&str>,
    offset: u32,
) -> anyhow::Result<()> {
    ensure_session(shop, login).await?;

    let page = match search {
        Some(term) => shop.api.my_products(&ProductQuery::new().search(term)).await?,
        None => shop.api.my_products_page(offset).await?,
    };
    if page.is_empty() {
        println!("You have no products listed.");
        return Ok(());
    }
    print_products(&page);
    Ok(())
}

/// List a new product, then attach its image if one was given
#[instrument(skip_all, fields(name = %product.name))]
pub async fn add_product(
    shop: &Storefront,
    login: &LoginArgs,
    product: &ProductArgs,
) -> anyhow::Result<()> {
    ensure_session(shop, login).await?;

    // Read the image first so a bad path does not leave a half-made listing
    let image = product.image.as_deref().map(read_image).transpose()?;

    let created = shop.api.create_product(&product.to_draft()).await?;
    if let Some(image) = image {
        shop.api
            .upload_product_image(created.id, image)
            .await
            .with_context(|| format!("Product {} created, but the image upload failed", created.id))?;
    }

    println!("Created product {} ({}).", created.id, created.name);
    Ok(())
}

pub async fn delete_product(shop: &Storefront, login: &LoginArgs, id: u64) -> anyhow::Result<()> {
    ensure_session(shop, login).await?;
    shop.api.delete_product(id).await?;
    println!("Deleted product {}.", id);
    Ok(())
}

fn read_image(path: &Path) -> anyhow::Result<FileUpload> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Cannot read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let mut upload = FileUpload::new("image", file_name, bytes);
    if let Some(mime) = image_mime(path) {
        upload = upload.with_content_type(mime);
    }
    Ok(upload)
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Check out every line currently in the cart
#[instrument(skip_all)]
pub async fn checkout_cart(
    shop: &Storefront,
    login: &LoginArgs,
    shipping: &ShippingArgs,
) -> anyhow::Result<()> {
    ensure_session(shop, login).await?;

    let lines = shop.api.cart_lines().await?;
    let intent = PurchaseIntent::from_cart(lines.results.iter().map(|l| l.id), shipping.to_info());
    if !intent.is_ready() {
        bail!("Nothing to check out: the cart is empty or the shipping details are incomplete.");
    }

    info!(lines = lines.results.len(), "Checking out cart");
    let session = shop.checkout.checkout(&CheckoutEndpoint::Cart, &intent).await?;
    report(&session);
    Ok(())
}

/// Buy a single product without touching the cart
#[instrument(skip(shop, login, shipping))]
pub async fn buy(
    shop: &Storefront,
    login: &LoginArgs,
    product_id: u64,
    quantity: u32,
    shipping: &ShippingArgs,
) -> anyhow::Result<()> {
    ensure_session(shop, login).await?;

    let product = shop.api.product(product_id).await?;
    if !product.can_fulfill(quantity) {
        bail!(
            "Only {} unit(s) of {} available",
            product.inventory,
            product.name
        );
    }

    let intent = PurchaseIntent::direct(product.id, quantity, shipping.to_info());
    if !intent.is_ready() {
        bail!("Shipping details are incomplete.");
    }

    let session = shop
        .checkout
        .checkout(&CheckoutEndpoint::Direct, &intent)
        .await?;
    report(&session);
    Ok(())
}

fn report(session: &PaymentSession) {
    println!("Payment session {} created.", session.id);
}
