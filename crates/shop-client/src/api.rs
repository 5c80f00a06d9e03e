//! # Storefront API
//!
//! Typed calls for the catalog, cart, order, seller and registration
//! endpoints.
//! Everything goes through the shared [`SessionClient`], so expired sessions
//! are renewed here exactly as for the session calls.
//!
//! Cart-changing calls refresh the [`CartCountStore`] once the backend has
//! accepted them.

use crate::cart::CartCountStore;
use crate::interceptor::SessionClient;
use serde::{Deserialize, Serialize};
use shop_core::{
    ApiRequest, CartLine, Category, FileUpload, Order, OrderItem, Page, Product, ProductDraft,
    ProductQuery, ShopResult,
};
use tracing::{info, instrument};

/// Number of products on the landing page
pub const LATEST_LIMIT: u32 = 10;

/// Page size of the seller's product listing
pub const SELLER_PAGE_LIMIT: u32 = 10;

/// Multipart field carrying a product image
pub const IMAGE_FIELD: &str = "image";

const PRODUCTS_PATH: &str = "/products/public/";
const CATEGORIES_PATH: &str = "/categories/";
const CARTS_PATH: &str = "/carts/";
const ORDERS_PATH: &str = "/orders/";
const ORDER_ITEMS_PATH: &str = "/order_items/";
const SELLER_PRODUCTS_PATH: &str = "/products/user/products/";

/// Account registration endpoint (sent without credentials)
pub const REGISTER_PATH: &str = "/user/create/";

#[derive(Debug, Serialize)]
struct NewCartLine {
    product: u64,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct QuantityUpdate {
    quantity: u32,
}

/// Sign-up form payload
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Account as returned by registration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Catalog, cart and order calls
#[derive(Clone)]
pub struct StorefrontApi {
    client: SessionClient,
    cart: CartCountStore,
}

impl StorefrontApi {
    pub fn new(client: SessionClient, cart: CartCountStore) -> Self {
        Self { client, cart }
    }

    /// Newest products for the landing page
    pub async fn latest_products(&self) -> ShopResult<Page<Product>> {
        self.search_products(&ProductQuery::latest(LATEST_LIMIT))
            .await
    }

    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &ProductQuery) -> ShopResult<Page<Product>> {
        self.client.json(&query.to_request()).await
    }

    pub async fn product(&self, id: u64) -> ShopResult<Product> {
        self.client
            .json(&ApiRequest::get(format!("{}{}/", PRODUCTS_PATH, id)))
            .await
    }

    pub async fn categories(&self) -> ShopResult<Page<Category>> {
        self.client.json(&ApiRequest::get(CATEGORIES_PATH)).await
    }

    /// Lines in the user's cart
    pub async fn cart_lines(&self) -> ShopResult<Page<CartLine>> {
        self.client.json(&ApiRequest::get(CARTS_PATH)).await
    }

    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, product: u64, quantity: u32) -> ShopResult<CartLine> {
        let request = ApiRequest::post(CARTS_PATH).with_json(&NewCartLine { product, quantity })?;
        let line: CartLine = self.client.json(&request).await?;
        info!(line_id = line.id, "Added to cart");
        self.cart.fetch_count().await;
        Ok(line)
    }

    #[instrument(skip(self))]
    pub async fn update_cart_line(&self, line_id: u64, quantity: u32) -> ShopResult<CartLine> {
        let request = ApiRequest::patch(cart_line_path(line_id))
            .with_json(&QuantityUpdate { quantity })?;
        let line: CartLine = self.client.json(&request).await?;
        self.cart.fetch_count().await;
        Ok(line)
    }

    #[instrument(skip(self))]
    pub async fn remove_cart_line(&self, line_id: u64) -> ShopResult<()> {
        self.client
            .request(&ApiRequest::delete(cart_line_path(line_id)))
            .await?;
        self.cart.fetch_count().await;
        Ok(())
    }

    pub async fn orders(&self) -> ShopResult<Page<Order>> {
        self.client.json(&ApiRequest::get(ORDERS_PATH)).await
    }

    pub async fn order_items(&self) -> ShopResult<Page<OrderItem>> {
        self.client.json(&ApiRequest::get(ORDER_ITEMS_PATH)).await
    }

    /// The signed-in seller's own products.
    ///
    /// Takes the same filters as the public listing; see
    /// [`StorefrontApi::my_products_page`] for the paged default.
    #[instrument(skip(self))]
    pub async fn my_products(&self, query: &ProductQuery) -> ShopResult<Page<Product>> {
        self.client
            .json(&query.to_request_at(SELLER_PRODUCTS_PATH))
            .await
    }

    /// One page of the seller's products, newest first
    pub async fn my_products_page(&self, offset: u32) -> ShopResult<Page<Product>> {
        self.my_products(&ProductQuery::latest(SELLER_PAGE_LIMIT).offset(offset))
            .await
    }

    /// List a new product. Validation errors keep their per-field messages.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> ShopResult<Product> {
        let request = ApiRequest::post(SELLER_PRODUCTS_PATH).with_json(draft)?;
        let product: Product = self.client.json(&request).await?;
        info!(product_id = product.id, "Product created");
        Ok(product)
    }

    /// Replace a product's details. Validation errors keep their per-field
    /// messages.
    #[instrument(skip(self, draft))]
    pub async fn update_product(&self, id: u64, draft: &ProductDraft) -> ShopResult<Product> {
        let request = ApiRequest::put(seller_product_path(id)).with_json(draft)?;
        self.client.json(&request).await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: u64) -> ShopResult<()> {
        self.client
            .request(&ApiRequest::delete(seller_product_path(id)))
            .await?;
        info!(product_id = id, "Product deleted");
        Ok(())
    }

    /// Attach an image to a product. `image` is sent as the multipart
    /// `image` field whatever field name it was built with.
    #[instrument(skip(self, image), fields(file_name = %image.file_name, bytes = image.bytes.len()))]
    pub async fn upload_product_image(&self, id: u64, mut image: FileUpload) -> ShopResult<()> {
        image.field = IMAGE_FIELD.to_string();
        let request = ApiRequest::post(format!("{}upload_image/", seller_product_path(id)))
            .with_file(image);
        self.client.request(&request).await?;
        Ok(())
    }

    /// Create an account. Validation errors keep their per-field messages.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> ShopResult<RegisteredUser> {
        let request = ApiRequest::post(REGISTER_PATH)
            .with_json(registration)?
            .anonymous();
        self.client.json(&request).await
    }
}

fn cart_line_path(line_id: u64) -> String {
    format!("{}{}/", CARTS_PATH, line_id)
}

fn seller_product_path(id: u64) -> String {
    format!("{}{}/", SELLER_PRODUCTS_PATH, id)
}
