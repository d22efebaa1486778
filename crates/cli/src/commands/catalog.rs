//! Category browsing command.

use cartwheel_core::{CategoryId, SortMode};
use cartwheel_client::CategoryView;

use super::{CommandError, Store};
use crate::output;

/// Load each requested page of a category in order and print it.
///
/// Pages already loaded in this run are served from the page cache.
///
/// # Errors
///
/// Returns an error if a page cannot be fetched.
pub async fn browse(
    store: &mut Store,
    id: &str,
    pages: &[u32],
    sort: SortMode,
) -> Result<(), CommandError> {
    let mut view = CategoryView::new(CategoryId::new(id)).with_sort(Some(sort));

    for &page in pages {
        view.set_page(page);
        let loaded = store.load_category(&mut view).await?;
        output::category_page(&view, &loaded);
    }
    Ok(())
}
