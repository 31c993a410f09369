//! # Cart Files
//!
//! Reads a cart snapshot from JSON. Accepts either a bare array of lines or
//! an object with an `items` array:
//!
//! ```json
//! { "items": [
//!     { "store_id": "acme", "product_id": "mug", "quantity": 2, "unit_weight_grams": 750 }
//! ] }
//! ```

use std::path::Path;

use cartship_core::CartLineItem;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigResult;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CartDocument {
    Lines(Vec<CartLineItem>),
    Wrapped { items: Vec<CartLineItem> },
}

/// Parses a cart document.
pub fn parse_cart(contents: &str) -> ConfigResult<Vec<CartLineItem>> {
    let items = match serde_json::from_str(contents)? {
        CartDocument::Lines(items) => items,
        CartDocument::Wrapped { items } => items,
    };
    debug!(lines = items.len(), "Cart parsed");
    Ok(items)
}

/// Reads and parses a cart file.
pub fn load_cart(path: impl AsRef<Path>) -> ConfigResult<Vec<CartLineItem>> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    parse_cart(&contents)
}
