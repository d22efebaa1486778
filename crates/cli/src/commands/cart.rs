//! Cart commands.

use tracing::{info, warn};

use cartwheel_core::CartItemId;

use super::{CommandError, Store};
use crate::output;

/// Print the cart with totals.
///
/// # Errors
///
/// Returns an error if the cart cannot be fetched.
pub async fn show(store: &mut Store) -> Result<(), CommandError> {
    store.refresh_cart().await?;
    load_settings(store).await;
    output::cart(store);
    Ok(())
}

/// Apply increments and decrements, then save unless `dry_run`.
///
/// Every ID is checked before any edit is made.
///
/// # Errors
///
/// Returns an error if an ID is not in the cart, or if the fetch or save fails.
pub async fn adjust(
    store: &mut Store,
    increments: &[String],
    decrements: &[String],
    dry_run: bool,
) -> Result<(), CommandError> {
    store.refresh_cart().await?;
    load_settings(store).await;

    let increments: Vec<CartItemId> = increments.iter().map(CartItemId::new).collect();
    let decrements: Vec<CartItemId> = decrements.iter().map(CartItemId::new).collect();
    if let Some(unknown) = increments
        .iter()
        .chain(&decrements)
        .find(|id| store.cart().line(id).is_none())
    {
        return Err(CommandError::UnknownLine(unknown.to_string()));
    }

    for id in &increments {
        let before = store.cart().effective_quantity(id);
        if store.increment(id) == before {
            warn!(item_id = %id, "Already at stock limit");
        }
    }
    for id in &decrements {
        store.decrement(id);
    }

    output::cart(store);

    if dry_run || !store.has_unsaved_changes() {
        return Ok(());
    }

    let summary = store.save_cart().await?;
    info!(
        updated = summary.updated,
        skipped = summary.skipped.len(),
        "Cart saved"
    );
    output::commit_summary(&summary);
    output::cart(store);
    Ok(())
}

/// Remove one line.
///
/// # Errors
///
/// Returns an error if the removal or reload fails.
pub async fn remove(store: &mut Store, id: &str) -> Result<(), CommandError> {
    store.remove_line(&CartItemId::new(id)).await?;
    load_settings(store).await;
    output::cart(store);
    Ok(())
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the clear or reload fails.
pub async fn clear(store: &mut Store) -> Result<(), CommandError> {
    store.clear_cart().await?;
    info!("Cart cleared");
    output::cart(store);
    Ok(())
}

/// Totals fall back to zero VAT when settings are unavailable.
async fn load_settings(store: &mut Store) {
    if let Err(e) = store.load_settings().await {
        warn!(error = %e, "Store settings unavailable, showing totals without VAT");
    }
}
