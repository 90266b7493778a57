use super::db::open_memory;
use super::types::*;

fn sample_queue() -> NewQueue {
    NewQueue {
        source_url: "https://example.com/playlist".to_string(),
        title: "Test Playlist".to_string(),
        format: "audio".to_string(),
        quality: "192".to_string(),
        output_dir: "/tmp/out".to_string(),
        order: DownloadOrder::Insertion,
    }
}

fn sample_item(n: u32) -> NewItem {
    NewItem {
        url: format!("https://example.com/v/{n}"),
        title: format!("Track {n}"),
        ..NewItem::default()
    }
}

#[tokio::test]
async fn queue_roundtrip() {
    let store = open_memory().await.unwrap();
    let id = store.create_queue(&sample_queue()).await.unwrap();

    let q = store.get_queue(id).await.unwrap().unwrap();
    assert_eq!(q.id, id);
    assert_eq!(q.title, "Test Playlist");
    assert_eq!(q.status, QueueStatus::Pending);
    assert_eq!(q.order, DownloadOrder::Insertion);
    assert!(q.completed_at.is_none());

    let mut q = q;
    q.status = QueueStatus::Completed;
    q.completed_at = Some(1_700_000_000);
    store.save_queue(&q).await.unwrap();

    let q = store.get_queue(id).await.unwrap().unwrap();
    assert_eq!(q.status, QueueStatus::Completed);
    assert_eq!(q.completed_at, Some(1_700_000_000));
}

#[tokio::test]
async fn items_insert_and_list_in_insertion_order() {
    let store = open_memory().await.unwrap();
    let qid = store.create_queue(&sample_queue()).await.unwrap();
    for n in 1..=3 {
        store.add_item(qid, &sample_item(n)).await.unwrap();
    }

    let items = store.list_items(qid).await.unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].title, "Track 1");
    assert_eq!(items[2].title, "Track 3");
    assert!(items.iter().all(|i| i.status == ItemStatus::Pending));
}

#[tokio::test]
async fn load_pending_items_filters_by_status() {
    let store = open_memory().await.unwrap();
    let qid = store.create_queue(&sample_queue()).await.unwrap();
    for n in 1..=4 {
        store.add_item(qid, &sample_item(n)).await.unwrap();
    }

    let mut items = store.list_items(qid).await.unwrap();
    items[0].status = ItemStatus::Completed;
    items[1].status = ItemStatus::Failed;
    store.save_item(&items[0]).await.unwrap();
    store.save_item(&items[1]).await.unwrap();

    let with_failed = store.load_pending_items(qid, true).await.unwrap();
    assert_eq!(with_failed.len(), 3);
    assert!(with_failed.iter().any(|i| i.status == ItemStatus::Failed));

    let without_failed = store.load_pending_items(qid, false).await.unwrap();
    assert_eq!(without_failed.len(), 2);
    assert!(without_failed.iter().all(|i| i.status == ItemStatus::Pending));
}

#[tokio::test]
async fn stale_downloading_items_are_reset() {
    let store = open_memory().await.unwrap();
    let qid = store.create_queue(&sample_queue()).await.unwrap();
    store.add_item(qid, &sample_item(1)).await.unwrap();
    store.add_item(qid, &sample_item(2)).await.unwrap();

    let mut items = store.list_items(qid).await.unwrap();
    items[0].status = ItemStatus::Downloading;
    store.save_item(&items[0]).await.unwrap();

    let reset = store.reset_stale_downloading(qid).await.unwrap();
    assert_eq!(reset, 1);

    let pending = store.load_pending_items(qid, false).await.unwrap();
    assert_eq!(pending.len(), 2);
}

#[tokio::test]
async fn reset_all_items_clears_outcomes() {
    let store = open_memory().await.unwrap();
    let qid = store.create_queue(&sample_queue()).await.unwrap();
    store.add_item(qid, &sample_item(1)).await.unwrap();

    let mut items = store.list_items(qid).await.unwrap();
    items[0].status = ItemStatus::Completed;
    items[0].file_path = Some("/tmp/out/track1.mp3".to_string());
    items[0].file_size = Some(1024);
    items[0].file_hash = Some("deadbeef".to_string());
    items[0].duration_secs = Some(3.5);
    store.save_item(&items[0]).await.unwrap();

    store.reset_all_items(qid).await.unwrap();
    let items = store.list_items(qid).await.unwrap();
    assert_eq!(items[0].status, ItemStatus::Pending);
    assert!(items[0].file_path.is_none());
    assert!(items[0].file_size.is_none());
    assert!(items[0].file_hash.is_none());
    assert!(items[0].duration_secs.is_none());
}

#[tokio::test]
async fn queue_counts_by_status() {
    let store = open_memory().await.unwrap();
    let qid = store.create_queue(&sample_queue()).await.unwrap();
    for n in 1..=5 {
        store.add_item(qid, &sample_item(n)).await.unwrap();
    }
    let mut items = store.list_items(qid).await.unwrap();
    items[0].status = ItemStatus::Completed;
    items[1].status = ItemStatus::Completed;
    items[2].status = ItemStatus::Failed;
    for item in &items[..3] {
        store.save_item(item).await.unwrap();
    }

    let counts = store.queue_counts(qid).await.unwrap();
    assert_eq!(counts.completed, 2);
    assert_eq!(counts.failed, 1);
    assert_eq!(counts.pending, 2);
    assert_eq!(counts.total(), 5);
}

#[tokio::test]
async fn resume_marker_lifecycle() {
    let store = open_memory().await.unwrap();
    let qid = store.create_queue(&sample_queue()).await.unwrap();

    assert!(store.list_interrupted().await.unwrap().is_empty());

    store.mark_interrupted(qid, 7, "Test Playlist").await.unwrap();
    let markers = store.list_interrupted().await.unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].queue_id, qid);
    assert_eq!(markers[0].pending_count, 7);
    assert_eq!(markers[0].title, "Test Playlist");

    // A second interruption overwrites, never duplicates.
    store.mark_interrupted(qid, 3, "Test Playlist").await.unwrap();
    let markers = store.list_interrupted().await.unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].pending_count, 3);

    store.clear_interrupted(qid).await.unwrap();
    assert!(store.list_interrupted().await.unwrap().is_empty());

    // Clearing again is a no-op.
    store.clear_interrupted(qid).await.unwrap();
}

#[tokio::test]
async fn delete_queue_cascades() {
    let store = open_memory().await.unwrap();
    let qid = store.create_queue(&sample_queue()).await.unwrap();
    store.add_item(qid, &sample_item(1)).await.unwrap();
    store.mark_interrupted(qid, 1, "Test Playlist").await.unwrap();

    store.delete_queue(qid).await.unwrap();
    assert!(store.get_queue(qid).await.unwrap().is_none());
    assert!(store.list_items(qid).await.unwrap().is_empty());
    assert!(store.list_interrupted().await.unwrap().is_empty());
}
