//! Working-set ordering policy.

use crate::store::{DownloadOrder, Item};

/// Sort items for one run according to the queue's ordering policy.
///
/// `newest_first` / `oldest_first` compare by upload date; a missing date
/// compares as the empty string, so it sorts first ascending and last
/// descending. The sort is stable: ties keep the store's insertion order.
/// `insertion` leaves the store's natural order untouched.
pub fn sort_items(items: &mut [Item], order: DownloadOrder) {
    match order {
        DownloadOrder::Insertion => {}
        DownloadOrder::OldestFirst => {
            items.sort_by(|a, b| date_key(a).cmp(date_key(b)));
        }
        DownloadOrder::NewestFirst => {
            items.sort_by(|a, b| date_key(b).cmp(date_key(a)));
        }
    }
}

fn date_key(item: &Item) -> &str {
    item.upload_date.as_deref().unwrap_or("")
}
