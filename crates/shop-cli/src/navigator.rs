//! # Terminal Navigator
//!
//! Stands in for the host router when running from a shell: routes become
//! messages on stdout.

use shop_core::{Navigator, Route};
use tracing::debug;

#[derive(Debug, Default)]
pub struct TerminalNavigator;

impl TerminalNavigator {
    pub fn new() -> Self {
        Self
    }
}

/// What the user should see for `route`
pub fn describe(route: &Route) -> String {
    match route {
        Route::Home => "Welcome back to the storefront.".to_string(),
        Route::Login => "Your session has ended. Run `storefront login` to sign in again.".to_string(),
        Route::External(url) => format!("Continue to payment: {}", url),
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        debug!(?route, "Navigating");
        println!("{}", describe(&route));
    }
}
