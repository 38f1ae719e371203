use benchtop_store::CacheDb;
use benchtop_types::*;
use chrono::{TimeZone, Utc};

fn seed_stored_reagent(db: &CacheDb, id: i64, storage_object_id: i64, name: &str) {
    db.cache_stored_reagent(&StoredReagent {
        id,
        reagent: Reagent {
            id: 1000 + id,
            name: name.into(),
            unit: "g".into(),
            created_at: None,
            updated_at: None,
        },
        storage_object: StorageObjectBasic {
            id: storage_object_id,
            object_name: format!("box {storage_object_id}"),
        },
        quantity: 1.0,
        notes: String::new(),
        user: None,
        barcode: None,
        expiration_date: None,
        shareable: false,
        created_at: None,
        updated_at: None,
    })
    .unwrap();
}

// ── Slice semantics ──────────────────────────────────────────────

#[test]
fn slice_matches_remote_window_semantics() {
    let db = CacheDb::open_in_memory().unwrap();
    // 25 rows under parent 7, plus noise under parent 8
    for i in 1..=25 {
        seed_stored_reagent(&db, i, 7, &format!("reagent {i}"));
    }
    for i in 100..103 {
        seed_stored_reagent(&db, i, 8, "other");
    }

    let page = db.list_stored_reagents(Some(7), None, 10, 10).unwrap();
    let count = db.count_stored_reagents(Some(7), None).unwrap();

    assert_eq!(page.len(), 10);
    assert_eq!(count, 25);
    // Rows ranked 11..=20 by ascending id
    let ids: Vec<i64> = page.iter().map(|s| s.id).collect();
    assert_eq!(ids, (11..=20).collect::<Vec<i64>>());
}

#[test]
fn count_is_independent_of_slice() {
    let db = CacheDb::open_in_memory().unwrap();
    for i in 1..=5 {
        seed_stored_reagent(&db, i, 7, "x");
    }
    let page = db.list_stored_reagents(Some(7), None, 2, 4).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(db.count_stored_reagents(Some(7), None).unwrap(), 5);
}

#[test]
fn offset_past_end_yields_empty_slice() {
    let db = CacheDb::open_in_memory().unwrap();
    for i in 1..=3 {
        seed_stored_reagent(&db, i, 7, "x");
    }
    let page = db.list_stored_reagents(Some(7), None, 10, 50).unwrap();
    assert!(page.is_empty());
    assert_eq!(db.count_stored_reagents(Some(7), None).unwrap(), 3);
}

// ── Filter emulation ─────────────────────────────────────────────

#[test]
fn search_filters_by_reagent_name_substring() {
    let db = CacheDb::open_in_memory().unwrap();
    seed_stored_reagent(&db, 1, 7, "Ethanol 96%");
    seed_stored_reagent(&db, 2, 7, "Methanol");
    seed_stored_reagent(&db, 3, 7, "Agarose");

    let hits = db.list_stored_reagents(None, Some("than"), 50, 0).unwrap();
    let ids: Vec<i64> = hits.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(db.count_stored_reagents(None, Some("than")).unwrap(), 2);
}

#[test]
fn annotations_order_newest_first() {
    let db = CacheDb::open_in_memory().unwrap();
    for i in 1..=3 {
        db.cache_annotation(&Annotation {
            id: i,
            step: Some(9),
            session: None,
            annotation: format!("note {i}"),
            annotation_type: AnnotationType::Text,
            file: None,
            transcribed: false,
            transcription: None,
            language: None,
            scratched: false,
            summary: None,
            user: None,
            created_at: Some(Utc.with_ymd_and_hms(2025, 5, i as u32, 12, 0, 0).unwrap()),
            updated_at: None,
        })
        .unwrap();
    }

    let feed = db.list_annotations(Some(9), None, 10, 0).unwrap();
    let ids: Vec<i64> = feed.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
}

#[test]
fn instrument_usage_date_range_filter() {
    let db = CacheDb::open_in_memory().unwrap();
    for (id, day) in [(1, 1), (2, 10), (3, 20)] {
        db.cache_instrument_usage(&InstrumentUsage {
            id,
            instrument: InstrumentRef::Id(4),
            user: None,
            time_started: Some(Utc.with_ymd_and_hms(2025, 7, day, 9, 0, 0).unwrap()),
            time_ended: None,
            description: String::new(),
            created_at: None,
            updated_at: None,
        })
        .unwrap();
    }

    let from = Utc.with_ymd_and_hms(2025, 7, 5, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2025, 7, 15, 0, 0, 0).unwrap();
    let windows = db
        .list_instrument_usage(Some(4), Some(from), Some(to), 10, 0)
        .unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].id, 2);
    assert_eq!(
        db.count_instrument_usage(Some(4), Some(from), Some(to)).unwrap(),
        1
    );
}

// ── Partial nested instrument shapes ─────────────────────────────

#[test]
fn bare_instrument_id_does_not_clobber_cached_instrument() {
    let db = CacheDb::open_in_memory().unwrap();
    db.cache_instrument(&Instrument {
        id: 4,
        instrument_name: "Plate reader".into(),
        instrument_description: "96-well".into(),
        enabled: true,
        created_at: None,
        updated_at: None,
    })
    .unwrap();

    // Booking arrives with only the id
    db.cache_instrument_usage(&InstrumentUsage {
        id: 1,
        instrument: InstrumentRef::Id(4),
        user: None,
        time_started: None,
        time_ended: None,
        description: String::new(),
        created_at: None,
        updated_at: None,
    })
    .unwrap();

    // Rehydration serves the richer cached copy
    let usage = db.get_instrument_usage(1).unwrap().unwrap();
    match usage.instrument {
        InstrumentRef::Full(instrument) => {
            assert_eq!(instrument.instrument_name, "Plate reader");
        }
        InstrumentRef::Id(_) => panic!("expected full instrument from cache"),
    }
}

#[test]
fn uncached_instrument_rehydrates_as_bare_id() {
    let db = CacheDb::open_in_memory().unwrap();
    db.cache_instrument_usage(&InstrumentUsage {
        id: 1,
        instrument: InstrumentRef::Id(77),
        user: None,
        time_started: None,
        time_ended: None,
        description: String::new(),
        created_at: None,
        updated_at: None,
    })
    .unwrap();

    let usage = db.get_instrument_usage(1).unwrap().unwrap();
    assert_eq!(usage.instrument, InstrumentRef::Id(77));
}
