//! Pagination
//!
//! Cuts one page out of an ordered listing, following the cosmos-sdk
//! key/offset cursor rules.

use crate::error::{Result, VstorageError};
use crate::protocol::{PageRequest, PageResponse};

/// Select the page described by `page` from the ascending `entries`
///
/// - with a `key`, the page starts at the first entry `>= key`
///   (`<= key` when `reverse`) and `offset` must be zero
/// - without a `key`, the first `offset` entries are skipped
/// - a zero `limit` means `default_limit`; any limit is capped at `max_limit`
/// - `next_key` names the first entry left out, empty when exhausted
/// - `total` is only filled for key-less requests with `count_total`
pub fn paginate(
    mut entries: Vec<String>,
    page: Option<&PageRequest>,
    default_limit: u64,
    max_limit: u64,
) -> Result<(Vec<String>, PageResponse)> {
    let default_page = PageRequest::default();
    let page = page.unwrap_or(&default_page);

    if !page.key.is_empty() && page.offset > 0 {
        return Err(VstorageError::InvalidPagination(
            "either offset or key is expected, got both".to_string(),
        ));
    }

    let limit = match page.limit {
        0 => default_limit,
        limit => limit,
    }
    .min(max_limit)
    .max(1);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);

    if page.reverse {
        entries.reverse();
    }
    let total = entries.len();

    let start = if page.key.is_empty() {
        usize::try_from(page.offset).unwrap_or(usize::MAX).min(total)
    } else {
        let key = page.key.as_slice();
        entries
            .iter()
            .position(|entry| {
                if page.reverse {
                    entry.as_bytes() <= key
                } else {
                    entry.as_bytes() >= key
                }
            })
            .unwrap_or(total)
    };
    let end = start.saturating_add(limit).min(total);

    let next_key = entries
        .get(end)
        .map(|entry| entry.as_bytes().to_vec())
        .unwrap_or_default();
    let total = if page.count_total && page.key.is_empty() {
        total as u64
    } else {
        0
    };

    entries.truncate(end);
    let items = entries.split_off(start);

    Ok((items, PageResponse { next_key, total }))
}
