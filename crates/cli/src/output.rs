//! Plain-text rendering to stdout.

#![allow(clippy::print_stdout)]

use cartwheel_client::{CategoryView, CommitSummary, LoadedPage, PageSource};
use cartwheel_core::{LineSyncState, Product};

use crate::commands::Store;

/// Print the cart at its pending quantities.
pub fn cart(store: &Store) {
    let symbol = store
        .settings()
        .map_or("", |settings| settings.currency_symbol.as_str());
    let lines = store.cart().lines();

    if lines.is_empty() {
        println!("Cart is empty");
        return;
    }

    for line in lines {
        let quantity = store
            .cart()
            .effective_quantity(&line.item_id)
            .unwrap_or(line.quantity);
        let marker = match store.line_state(&line.item_id) {
            Some(LineSyncState::Dirty) => " *",
            Some(LineSyncState::Committing) => " ...",
            _ => "",
        };
        let selections: Vec<String> = line
            .selections
            .iter()
            .map(|s| format!("{}: {}", s.name, s.value))
            .collect();

        println!(
            "{:<26} {} x{quantity}/{}{marker}  {}",
            line.item_id.as_str(),
            line.name,
            line.stock,
            line.unit_price.times(quantity).display_with(symbol),
        );
        if !selections.is_empty() {
            println!("{:<26} {}", "", selections.join(", "));
        }
    }

    let totals = store.cart_totals();
    println!();
    println!("Subtotal: {}", totals.subtotal.display_with(symbol));
    println!("VAT:      {}", totals.tax.display_with(symbol));
    println!("Total:    {}", totals.total.display_with(symbol));
    if store.has_unsaved_changes() {
        println!("(* unsaved changes)");
    }
}

/// Print the outcome of a save.
pub fn commit_summary(summary: &CommitSummary) {
    println!("Saved {} line(s)", summary.updated);
    for id in &summary.skipped {
        println!("Skipped {id}: no longer in cart");
    }
    println!();
}

/// Print one category page.
pub fn category_page(view: &CategoryView, loaded: &LoadedPage) {
    let name = loaded
        .info
        .as_ref()
        .map_or_else(|| view.category_id().to_string(), |info| info.name.clone());
    let source = match loaded.source {
        PageSource::Cache => "cache",
        PageSource::Network => "network",
    };
    let pagination = &loaded.page.pagination;

    println!(
        "{name} - page {}/{} ({} products, sort {}, from {source})",
        pagination.page,
        pagination.total_pages,
        pagination.total_count,
        view.sort().map_or("default", |s| s.as_str()),
    );
    for product in &loaded.page.products {
        product_line(product);
    }
    println!();
}

/// Print suggestions for a query.
pub fn suggestions(query: &str, products: &[Product]) {
    if products.is_empty() {
        println!("No suggestions for \"{query}\"");
        return;
    }
    for product in products {
        product_line(product);
    }
}

fn product_line(product: &Product) {
    let sale = product
        .compare_price
        .filter(|_| product.on_sale())
        .map(|was| format!(" (was {was})"))
        .unwrap_or_default();
    println!("  {:<26} {}  {}{sale}", product.id.as_str(), product.name, product.price);
}
