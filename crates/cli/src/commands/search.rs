//! Search suggestion command.

use super::{CommandError, Store};
use crate::output;

/// Fetch and print suggestions for one query.
///
/// # Errors
///
/// Returns an error if the suggestion request fails.
pub async fn suggest(store: &mut Store, query: &str) -> Result<(), CommandError> {
    let suggestions = store.search(query).await?;
    output::suggestions(query, suggestions);
    Ok(())
}
