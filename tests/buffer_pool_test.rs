//! Buffer Pool Tests
//!
//! Behavioural scenarios for the LRU pool, driven through the catalog with
//! in-memory stores so every read and write can be observed.

use pagepool::{Catalog, Error, MemoryStore, Page, PageId};

const FILE: &str = "pages.tbl";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Catalog with one in-memory file; block `i` starts filled with byte `i`.
fn create_catalog(capacity: usize, blocks: u32) -> (Catalog, MemoryStore) {
    init_logger();

    let store = MemoryStore::with_blocks(blocks);
    for i in 0..blocks {
        store.set_block(i, &Page::filled(i as u8));
    }

    let mut catalog = Catalog::with_capacity(capacity);
    catalog.add(FILE, Box::new(store.clone())).unwrap();
    (catalog, store)
}

fn pid(index: u32) -> PageId {
    PageId::new(FILE, index)
}

fn order(catalog: &Catalog) -> Vec<u32> {
    catalog
        .buffer_pool()
        .recency_order()
        .map(|p| p.index())
        .collect()
}

// ============================================================================
// Residency
// ============================================================================

#[test]
fn test_contains_follows_load_and_discard() {
    let (mut catalog, _store) = create_catalog(4, 4);
    let p = pid(1);

    assert!(!catalog.contains(&p));

    catalog.get_page(&p).unwrap();
    assert!(catalog.contains(&p));
    assert_eq!(catalog.buffer_pool().most_recently_used(), Some(&p));

    catalog.discard_page(&p).unwrap();
    assert!(!catalog.contains(&p));
}

#[test]
fn test_get_page_makes_most_recent() {
    let (mut catalog, _store) = create_catalog(4, 4);
    for i in 0..4 {
        catalog.get_page(&pid(i)).unwrap();
    }
    assert_eq!(order(&catalog), vec![3, 2, 1, 0]);

    catalog.get_page(&pid(1)).unwrap();
    assert_eq!(order(&catalog), vec![1, 3, 2, 0]);
    assert_eq!(catalog.buffer_pool().eviction_candidate(), Some(&pid(0)));
}

// ============================================================================
// Eviction
// ============================================================================

/// Capacity 2: load A, B, then C. A goes; B and C stay, C in front.
#[test]
fn test_capacity_two_scenario() {
    let (mut catalog, store) = create_catalog(2, 3);
    let (a, b, c) = (pid(0), pid(1), pid(2));

    catalog.get_page(&a).unwrap().fill(0xA0);
    catalog.mark_dirty(&a).unwrap();
    catalog.get_page(&b).unwrap();
    assert_eq!(order(&catalog), vec![1, 0]);

    catalog.get_page(&c).unwrap();

    assert!(!catalog.contains(&a));
    assert!(catalog.contains(&b));
    assert!(catalog.contains(&c));
    assert_eq!(order(&catalog), vec![2, 1]);

    // A was written back before block 2 was read into its slot
    assert_eq!(store.writes(), vec![0]);
    assert_eq!(store.reads(), vec![0, 1, 2]);
    assert_eq!(*store.snapshot(0).unwrap(), Page::filled(0xA0));
}

#[test]
fn test_full_pool_evicts_exactly_the_lru() {
    const CAPACITY: usize = 8;
    let (mut catalog, _store) = create_catalog(CAPACITY, 20);

    for i in 0..CAPACITY as u32 {
        catalog.get_page(&pid(i)).unwrap();
    }
    // Refresh 0 so 1 becomes the LRU
    catalog.get_page(&pid(0)).unwrap();

    catalog.get_page(&pid(10)).unwrap();

    assert_eq!(catalog.buffer_pool().len(), CAPACITY);
    assert!(!catalog.contains(&pid(1)));
    for i in (0..CAPACITY as u32).filter(|&i| i != 1) {
        assert!(catalog.contains(&pid(i)), "page {} should still be cached", i);
    }
    assert_eq!(catalog.buffer_pool().stats().evictions, 1);
}

#[test]
fn test_clean_eviction_writes_nothing() {
    let (mut catalog, store) = create_catalog(2, 10);

    for i in 0..10 {
        catalog.get_page(&pid(i)).unwrap();
    }

    assert!(store.writes().is_empty());
    assert_eq!(catalog.buffer_pool().stats().evictions, 8);
}

#[test]
fn test_dirty_eviction_writes_once() {
    let (mut catalog, store) = create_catalog(1, 3);

    catalog.get_page(&pid(0)).unwrap().fill(0xF0);
    catalog.mark_dirty(&pid(0)).unwrap();
    catalog.get_page(&pid(1)).unwrap();
    catalog.get_page(&pid(2)).unwrap();

    assert_eq!(store.write_count(0), 1);
    assert_eq!(store.writes(), vec![0]);
}

#[test]
fn test_failed_writeback_blocks_load() {
    let (mut catalog, store) = create_catalog(2, 3);
    catalog.get_page(&pid(0)).unwrap();
    catalog.mark_dirty(&pid(0)).unwrap();
    catalog.get_page(&pid(1)).unwrap();

    store.set_fail_writes(true);
    assert!(matches!(catalog.get_page(&pid(2)), Err(Error::Io(_))));

    assert_eq!(catalog.buffer_pool().len(), 2);
    assert!(catalog.is_dirty(&pid(0)).unwrap());
    assert!(!catalog.contains(&pid(2)));
    catalog.buffer_pool().validate().unwrap();

    store.set_fail_writes(false);
}

// ============================================================================
// Dirty tracking
// ============================================================================

#[test]
fn test_mark_then_flush() {
    let (mut catalog, _store) = create_catalog(4, 4);
    let p = pid(3);
    catalog.get_page(&p).unwrap();

    assert!(!catalog.is_dirty(&p).unwrap());
    catalog.mark_dirty(&p).unwrap();
    assert!(catalog.is_dirty(&p).unwrap());
    catalog.flush_page(&p).unwrap();
    assert!(!catalog.is_dirty(&p).unwrap());
}

#[test]
fn test_discard_never_writes() {
    let (mut catalog, store) = create_catalog(4, 4);

    for i in 0..4 {
        catalog.get_page(&pid(i)).unwrap().fill(0xDD);
        catalog.mark_dirty(&pid(i)).unwrap();
        catalog.discard_page(&pid(i)).unwrap();
    }

    assert!(store.writes().is_empty());
    assert!(catalog.buffer_pool().is_empty());
}

/// Operations that need a cached page fail on one that was never loaded.
#[test]
fn test_never_loaded_page_is_not_resident() {
    let (mut catalog, store) = create_catalog(4, 4);
    let x = pid(2);

    assert!(matches!(catalog.is_dirty(&x), Err(Error::NotResident(p)) if p == x));
    assert!(matches!(catalog.mark_dirty(&x), Err(Error::NotResident(_))));
    assert!(matches!(catalog.flush_page(&x), Err(Error::NotResident(_))));
    assert!(matches!(catalog.discard_page(&x), Err(Error::NotResident(_))));

    assert!(!catalog.contains(&x));
    assert!(store.reads().is_empty());
    assert!(store.writes().is_empty());
}

#[test]
fn test_flush_file_cleans_every_page_of_file() {
    let (mut catalog, store) = create_catalog(6, 3);
    let other = MemoryStore::with_blocks(3);
    catalog.add("other.tbl", Box::new(other.clone())).unwrap();

    for i in 0..3 {
        for p in [pid(i), PageId::new("other.tbl", i)] {
            catalog.get_page(&p).unwrap();
            catalog.mark_dirty(&p).unwrap();
        }
    }

    catalog.flush_file(FILE).unwrap();

    for i in 0..3 {
        assert!(!catalog.is_dirty(&pid(i)).unwrap());
        assert!(catalog.is_dirty(&PageId::new("other.tbl", i)).unwrap());
    }
    assert_eq!(store.writes().len(), 3);
    assert!(other.writes().is_empty());
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_sees_flushed_content() {
    let (mut catalog, _store) = create_catalog(2, 4);
    let p = pid(0);

    let page = catalog.get_page(&p).unwrap();
    page.as_mut_slice()[..8].copy_from_slice(b"version1");
    catalog.mark_dirty(&p).unwrap();
    catalog.flush_page(&p).unwrap();

    // Push p out
    catalog.get_page(&pid(1)).unwrap();
    catalog.get_page(&pid(2)).unwrap();
    assert!(!catalog.contains(&p));

    let page = catalog.get_page(&p).unwrap();
    assert_eq!(&page.as_slice()[..8], b"version1");
    assert_eq!(page.as_slice()[8], 0);
}

#[test]
fn test_pages_of_different_files_are_distinct() {
    let (mut catalog, _store) = create_catalog(4, 1);
    let other = MemoryStore::with_blocks(1);
    other.set_block(0, &Page::filled(0x99));
    catalog.add("other.tbl", Box::new(other)).unwrap();

    let a = catalog.get_page(&pid(0)).unwrap().as_slice()[0];
    let b = catalog.get_page(&PageId::new("other.tbl", 0)).unwrap().as_slice()[0];

    assert_eq!(a, 0);
    assert_eq!(b, 0x99);
    assert_eq!(catalog.buffer_pool().len(), 2);
}

#[test]
fn test_stats_accuracy() {
    let (mut catalog, _store) = create_catalog(2, 4);

    catalog.get_page(&pid(0)).unwrap();
    for _ in 0..5 {
        catalog.get_page(&pid(0)).unwrap();
    }
    catalog.get_page(&pid(1)).unwrap();
    catalog.get_page(&pid(2)).unwrap();

    let stats = catalog.buffer_pool().stats();
    assert_eq!(stats.cache_hits, 5);
    assert_eq!(stats.cache_misses, 3);
    assert_eq!(stats.pages_read, 3);
    assert_eq!(stats.evictions, 1);
}
