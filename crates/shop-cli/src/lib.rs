//! # shop-cli
//!
//! Command-line front end for the storefront client.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `login` | Log in and cache the profile |
//! | `logout` | End the session |
//! | `whoami` | Show the cached profile if the session is still valid |
//! | `cart-count` | Refresh and print the cart size |
//! | `products` | List or search the catalog |
//! | `my-products` | List the seller's own products |
//! | `add-product` | List a new product, optionally with an image |
//! | `delete-product` | Remove one of the seller's products |
//! | `checkout-cart` | Pay for everything in the cart |
//! | `buy` | Pay for a single product |

pub mod commands;
pub mod navigator;

pub use commands::{LoginArgs, ProductArgs, ProductFilter, ShippingArgs};
pub use navigator::TerminalNavigator;
