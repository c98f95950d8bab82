//! Collection of changed paths across paginated diff pages.

use pathtrigger_core::events::CommitRange;
use pathtrigger_core::paths::{PathSet, RemovedPathPolicy};
use pathtrigger_core::ports::DiffSource;
use pathtrigger_core::{Error, Result};
use pathtrigger_trace::diff_page_span;
use tracing::{Instrument, debug};

/// Fetch every page of differences for `range` and collect the changed paths.
///
/// Pages are fetched one after another, following the continuation token until
/// none is returned. Any failed page aborts the whole collection.
pub async fn collect_changed_paths(
    source: &dyn DiffSource,
    range: &CommitRange,
    policy: RemovedPathPolicy,
) -> Result<PathSet> {
    let mut paths = PathSet::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0usize;
    let mut skipped = 0usize;

    loop {
        let page = source
            .get_differences(range, next_token.as_deref())
            .instrument(diff_page_span(&range.repository, pages + 1))
            .await
            .map_err(|e| Error::diff_retrieval(&range.repository, e))?;
        pages += 1;
        skipped += paths.extend_from_entries(&page.entries, policy);

        debug!(
            repository = %range.repository,
            page = pages,
            entries = page.entries.len(),
            "Fetched diff page"
        );

        next_token = page.next_token.filter(|t| !t.is_empty());
        if next_token.is_none() {
            break;
        }
    }

    debug!(
        repository = %range.repository,
        before = %range.before,
        after = %range.after,
        pages,
        paths = paths.len(),
        skipped,
        "Collected changed paths"
    );

    Ok(paths)
}
