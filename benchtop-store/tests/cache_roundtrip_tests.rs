use benchtop_store::CacheDb;
use benchtop_types::*;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

fn user(id: i64, username: &str) -> UserBasic {
    UserBasic {
        id,
        username: username.into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
    }
}

fn reagent(id: i64, name: &str) -> Reagent {
    Reagent {
        id,
        name: name.into(),
        unit: "mL".into(),
        created_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()),
        updated_at: Some(Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap()),
    }
}

fn stored_reagent(id: i64, user_id: i64) -> StoredReagent {
    StoredReagent {
        id,
        reagent: reagent(10, "Ethanol"),
        storage_object: StorageObjectBasic {
            id: 5,
            object_name: "Freezer A".into(),
        },
        quantity: 250.0,
        notes: "opened".into(),
        user: Some(user(user_id, "ada")),
        barcode: Some("BT-0001".into()),
        expiration_date: Some(chrono::NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()),
        shareable: true,
        created_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()),
        updated_at: Some(Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()),
    }
}

fn step(id: i64, protocol: i64, next: Vec<i64>) -> ProtocolStep {
    ProtocolStep {
        id,
        protocol,
        step_section: None,
        step_description: format!("step {id}"),
        step_duration: Some(60),
        next_step: next,
        created_at: None,
        updated_at: None,
    }
}

// ── Rehydration round-trip ───────────────────────────────────────

#[test]
fn stored_reagent_round_trip() {
    let db = CacheDb::open_in_memory().unwrap();
    let original = stored_reagent(1, 42);

    db.cache_stored_reagent(&original).unwrap();

    let rehydrated = db.get_stored_reagent(1).unwrap().unwrap();
    assert_eq!(rehydrated, original);
}

#[test]
fn cache_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.sqlite");

    {
        let db = CacheDb::open(&path).unwrap();
        db.cache_stored_reagent(&stored_reagent(1, 42)).unwrap();
    }

    let db = CacheDb::open(&path).unwrap();
    let rehydrated = db.get_stored_reagent(1).unwrap().unwrap();
    assert_eq!(rehydrated.reagent.name, "Ethanol");
}

#[test]
fn get_missing_returns_none() {
    let db = CacheDb::open_in_memory().unwrap();
    assert!(db.get_stored_reagent(999).unwrap().is_none());
    assert!(db.get_protocol(999).unwrap().is_none());
    assert!(db.get_session("nope").unwrap().is_none());
}

// ── Write-through idempotence ────────────────────────────────────

#[test]
fn caching_twice_equals_caching_once() {
    let db = CacheDb::open_in_memory().unwrap();
    let protocol = Protocol {
        id: 1,
        protocol_title: "PCR".into(),
        protocol_description: "amplification".into(),
        enabled: true,
        user: Some(user(7, "ada")),
        sections: vec![],
        steps: vec![step(11, 1, vec![12]), step(12, 1, vec![])],
        tags: vec![Tag {
            id: 3,
            tag: "dna".into(),
            created_at: None,
            updated_at: None,
        }],
        reagents: vec![],
        created_at: None,
        updated_at: None,
    };

    db.cache_protocol(&protocol).unwrap();
    db.cache_protocol(&protocol).unwrap();

    let rehydrated = db.get_protocol(1).unwrap().unwrap();
    assert_eq!(rehydrated.steps.len(), 2);
    assert_eq!(rehydrated.tags.len(), 1);
    assert_eq!(rehydrated.steps[0].next_step, vec![12]);
}

// ── Orphan foreign key placeholder ───────────────────────────────

#[test]
fn missing_user_rehydrates_as_placeholder() {
    let db = CacheDb::open_in_memory().unwrap();
    db.cache_stored_reagent(&stored_reagent(1, 42)).unwrap();

    db.delete_user(42).unwrap();

    let rehydrated = db.get_stored_reagent(1).unwrap().unwrap();
    let placeholder = rehydrated.user.unwrap();
    assert_eq!(placeholder.id, 42);
    assert_eq!(placeholder.username, "");
    assert_eq!(placeholder.first_name, "");
}

#[test]
fn evicting_tag_removes_protocol_associations() {
    let db = CacheDb::open_in_memory().unwrap();
    let protocol = Protocol {
        id: 1,
        protocol_title: "t".into(),
        protocol_description: String::new(),
        enabled: false,
        user: None,
        sections: vec![],
        steps: vec![],
        tags: vec![Tag {
            id: 9,
            tag: "rna".into(),
            created_at: None,
            updated_at: None,
        }],
        reagents: vec![],
        created_at: None,
        updated_at: None,
    };
    db.cache_protocol(&protocol).unwrap();

    db.evict_tag(9).unwrap();

    let rehydrated = db.get_protocol(1).unwrap().unwrap();
    assert!(rehydrated.tags.is_empty());
}

// ── Cross-reference full replace ─────────────────────────────────

#[test]
fn next_step_edges_fully_replaced() {
    let db = CacheDb::open_in_memory().unwrap();
    db.cache_protocol_step(&step(1, 10, vec![2, 3])).unwrap();
    db.cache_protocol_step(&step(1, 10, vec![4])).unwrap();

    let rehydrated = db.get_protocol_step(1).unwrap().unwrap();
    assert_eq!(rehydrated.next_step, vec![4]);
}

#[test]
fn next_step_edges_preserve_order() {
    let db = CacheDb::open_in_memory().unwrap();
    db.cache_protocol_step(&step(1, 10, vec![30, 2, 17])).unwrap();

    let rehydrated = db.get_protocol_step(1).unwrap().unwrap();
    assert_eq!(rehydrated.next_step, vec![30, 2, 17]);
}

#[test]
fn thread_participants_fully_replaced() {
    let db = CacheDb::open_in_memory().unwrap();
    let mut thread = MessageThread {
        id: 1,
        title: "general".into(),
        participants: vec![user(1, "ada"), user(2, "grace")],
        lab_group: None,
        is_system_thread: false,
        creator: Some(user(1, "ada")),
        unread_count: Some(4),
        created_at: None,
        updated_at: None,
    };
    db.cache_thread(&thread).unwrap();

    thread.participants = vec![user(2, "grace")];
    db.cache_thread(&thread).unwrap();

    let rehydrated = db.get_thread(1).unwrap().unwrap();
    assert_eq!(rehydrated.participants.len(), 1);
    assert_eq!(rehydrated.participants[0].username, "grace");
    // unread_count is computed remotely, never persisted
    assert_eq!(rehydrated.unread_count, None);
}

// ── Merge guard on shared side-tables ────────────────────────────

#[test]
fn bare_reference_does_not_clobber_richer_user() {
    let db = CacheDb::open_in_memory().unwrap();
    db.upsert_user(&user(1, "ada")).unwrap();

    // A poorer copy arrives embedded in another aggregate
    db.upsert_user(&UserBasic {
        id: 1,
        username: String::new(),
        first_name: String::new(),
        last_name: String::new(),
    })
    .unwrap();

    let cached = db.get_user(1).unwrap().unwrap();
    assert_eq!(cached.username, "ada");
    assert_eq!(cached.first_name, "Ada");
}

#[test]
fn storage_object_stub_does_not_clobber_full_row() {
    let db = CacheDb::open_in_memory().unwrap();
    let full = StorageObject {
        id: 5,
        object_name: "Freezer A".into(),
        object_type: "freezer".into(),
        object_description: "-80C".into(),
        stored_at: None,
        user: None,
        path_to_root: vec![],
        child_count: None,
        created_at: None,
        updated_at: None,
    };
    db.cache_storage_object(&full).unwrap();

    // Stored reagent carries only the basic shape
    db.cache_stored_reagent(&stored_reagent(1, 42)).unwrap();

    let cached = db.get_storage_object(5).unwrap().unwrap();
    assert_eq!(cached.object_type, "freezer");
    assert_eq!(cached.object_description, "-80C");
}

// ── Hierarchy rehydration ────────────────────────────────────────

#[test]
fn path_to_root_rebuilt_from_parents() {
    let db = CacheDb::open_in_memory().unwrap();
    let room = StorageObject {
        id: 1,
        object_name: "Room 101".into(),
        object_type: "room".into(),
        object_description: String::new(),
        stored_at: None,
        user: None,
        path_to_root: vec![],
        child_count: None,
        created_at: None,
        updated_at: None,
    };
    let freezer = StorageObject {
        id: 2,
        object_name: "Freezer A".into(),
        stored_at: Some(1),
        ..room.clone()
    };
    let shelf = StorageObject {
        id: 3,
        object_name: "Shelf 2".into(),
        stored_at: Some(2),
        ..room.clone()
    };
    db.cache_storage_object(&room).unwrap();
    db.cache_storage_object(&freezer).unwrap();
    db.cache_storage_object(&shelf).unwrap();

    let rehydrated = db.get_storage_object(3).unwrap().unwrap();
    let names: Vec<&str> = rehydrated
        .path_to_root
        .iter()
        .map(|p| p.object_name.as_str())
        .collect();
    assert_eq!(names, vec!["Room 101", "Freezer A"]);
}

// ── Cascade eviction ─────────────────────────────────────────────

#[test]
fn evicting_protocol_removes_children_and_edges() {
    let db = CacheDb::open_in_memory().unwrap();
    let protocol = Protocol {
        id: 1,
        protocol_title: "t".into(),
        protocol_description: String::new(),
        enabled: false,
        user: None,
        sections: vec![ProtocolSection {
            id: 20,
            protocol: 1,
            section_description: "prep".into(),
            section_duration: None,
            created_at: None,
            updated_at: None,
        }],
        steps: vec![step(11, 1, vec![12]), step(12, 1, vec![])],
        tags: vec![],
        reagents: vec![],
        created_at: None,
        updated_at: None,
    };
    db.cache_protocol(&protocol).unwrap();

    db.evict_protocol(1).unwrap();

    assert!(db.get_protocol(1).unwrap().is_none());
    assert!(db.get_protocol_step(11).unwrap().is_none());
    assert!(db.get_protocol_section(20).unwrap().is_none());
}

#[test]
fn evicting_thread_removes_messages() {
    let db = CacheDb::open_in_memory().unwrap();
    db.cache_thread(&MessageThread {
        id: 1,
        title: "t".into(),
        participants: vec![],
        lab_group: None,
        is_system_thread: false,
        creator: None,
        unread_count: None,
        created_at: None,
        updated_at: None,
    })
    .unwrap();
    db.cache_message(&Message {
        id: 100,
        thread: 1,
        sender: Some(user(1, "ada")),
        content: "hi".into(),
        message_type: MessageType::UserMessage,
        priority: MessagePriority::Normal,
        recipients: vec![],
        attachments: vec![MessageAttachment {
            id: 7,
            file_name: "results.csv".into(),
            file_size: Some(1024),
            content_type: Some("text/csv".into()),
        }],
        created_at: None,
        updated_at: None,
    })
    .unwrap();

    db.evict_thread(1).unwrap();

    assert!(db.get_thread(1).unwrap().is_none());
    assert!(db.get_message(100).unwrap().is_none());
}

// ── Session string identity ──────────────────────────────────────

#[test]
fn session_round_trip_with_protocol_xref() {
    let db = CacheDb::open_in_memory().unwrap();
    let unique_id = uuid::Uuid::new_v4().to_string();
    let mut session = Session {
        unique_id: unique_id.clone(),
        user: Some(user(1, "ada")),
        name: "evening run".into(),
        enabled: true,
        protocols: vec![4, 9],
        started_at: Some(Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap()),
        ended_at: None,
        created_at: None,
        updated_at: None,
    };
    db.cache_session(&session).unwrap();
    assert_eq!(db.get_session(&unique_id).unwrap().unwrap().protocols, vec![4, 9]);

    session.protocols = vec![9];
    db.cache_session(&session).unwrap();
    assert_eq!(db.get_session(&unique_id).unwrap().unwrap().protocols, vec![9]);

    db.evict_session(&unique_id).unwrap();
    assert!(db.get_session(&unique_id).unwrap().is_none());
    assert_eq!(db.count_sessions(Some(9)).unwrap(), 0);
}

// ── Pending read receipts ────────────────────────────────────────

#[test]
fn pending_receipt_survives_remote_recipient_refresh() {
    let db = CacheDb::open_in_memory().unwrap();
    let message = Message {
        id: 1,
        thread: 1,
        sender: None,
        content: "hello".into(),
        message_type: MessageType::UserMessage,
        priority: MessagePriority::Normal,
        recipients: vec![MessageRecipient {
            user: user(2, "grace"),
            is_read: false,
            read_at: None,
        }],
        attachments: vec![],
        created_at: None,
        updated_at: None,
    };
    db.cache_message(&message).unwrap();

    // Local optimistic read, not yet confirmed
    db.set_read_state(1, 2, true, Some(Utc::now()), true).unwrap();

    // A stale remote copy arrives claiming unread; the pending row wins
    db.cache_message(&message).unwrap();

    let rehydrated = db.get_message(1).unwrap().unwrap();
    assert!(rehydrated.recipients[0].is_read);

    let pending = db.pending_read_receipts().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].message_id, 1);
    assert!(pending[0].is_read);

    db.clear_pending_receipt(1, 2).unwrap();
    assert!(db.pending_read_receipts().unwrap().is_empty());

    // Confirmed state now yields to remote refreshes
    db.cache_message(&message).unwrap();
    let rehydrated = db.get_message(1).unwrap().unwrap();
    assert!(!rehydrated.recipients[0].is_read);
}
