//! Cache schema. All tables are created up front; identity columns hold
//! remote-assigned keys, so there is no AUTOINCREMENT anywhere.

use crate::error::StorageResult;
use rusqlite::Connection;

pub(crate) fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        -- Shared side-tables, written with merge-guard upserts so a bare
        -- reference from one endpoint never clobbers a richer cached copy.
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL DEFAULT '',
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY,
            tag TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS reagents (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            unit TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS storage_objects (
            id INTEGER PRIMARY KEY,
            object_name TEXT NOT NULL DEFAULT '',
            object_type TEXT NOT NULL DEFAULT '',
            object_description TEXT NOT NULL DEFAULT '',
            stored_at INTEGER,
            user_id INTEGER,
            created_at TEXT,
            updated_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_storage_objects_parent ON storage_objects(stored_at);

        CREATE TABLE IF NOT EXISTS stored_reagents (
            id INTEGER PRIMARY KEY,
            reagent_id INTEGER NOT NULL,
            storage_object_id INTEGER NOT NULL,
            quantity REAL NOT NULL DEFAULT 0,
            notes TEXT NOT NULL DEFAULT '',
            user_id INTEGER,
            barcode TEXT,
            expiration_date TEXT,
            shareable INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_stored_reagents_storage ON stored_reagents(storage_object_id);

        CREATE TABLE IF NOT EXISTS protocols (
            id INTEGER PRIMARY KEY,
            protocol_title TEXT NOT NULL DEFAULT '',
            protocol_description TEXT NOT NULL DEFAULT '',
            enabled INTEGER NOT NULL DEFAULT 0,
            user_id INTEGER,
            created_at TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS protocol_sections (
            id INTEGER PRIMARY KEY,
            protocol_id INTEGER NOT NULL,
            section_description TEXT NOT NULL DEFAULT '',
            section_duration INTEGER,
            created_at TEXT,
            updated_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_protocol_sections_protocol ON protocol_sections(protocol_id);

        CREATE TABLE IF NOT EXISTS protocol_steps (
            id INTEGER PRIMARY KEY,
            protocol_id INTEGER NOT NULL,
            section_id INTEGER,
            step_description TEXT NOT NULL DEFAULT '',
            step_duration INTEGER,
            created_at TEXT,
            updated_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_protocol_steps_protocol ON protocol_steps(protocol_id);

        -- Ordered successor edges per step, fully replaced on every step write.
        CREATE TABLE IF NOT EXISTS step_next_edges (
            step_id INTEGER NOT NULL,
            next_step_id INTEGER NOT NULL,
            ordinal INTEGER NOT NULL,
            PRIMARY KEY (step_id, next_step_id)
        );

        CREATE TABLE IF NOT EXISTS protocol_tags (
            protocol_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (protocol_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS protocol_reagents (
            id INTEGER PRIMARY KEY,
            protocol_id INTEGER NOT NULL,
            reagent_id INTEGER NOT NULL,
            quantity REAL NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_protocol_reagents_protocol ON protocol_reagents(protocol_id);

        CREATE TABLE IF NOT EXISTS annotations (
            id INTEGER PRIMARY KEY,
            step_id INTEGER,
            session_id TEXT,
            annotation TEXT NOT NULL DEFAULT '',
            annotation_type TEXT NOT NULL DEFAULT 'text',
            file TEXT,
            transcribed INTEGER NOT NULL DEFAULT 0,
            transcription TEXT,
            language TEXT,
            scratched INTEGER NOT NULL DEFAULT 0,
            summary TEXT,
            user_id INTEGER,
            created_at TEXT,
            updated_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_annotations_step ON annotations(step_id);
        CREATE INDEX IF NOT EXISTS idx_annotations_session ON annotations(session_id);

        CREATE TABLE IF NOT EXISTS sessions (
            unique_id TEXT PRIMARY KEY,
            user_id INTEGER,
            name TEXT NOT NULL DEFAULT '',
            enabled INTEGER NOT NULL DEFAULT 0,
            started_at TEXT,
            ended_at TEXT,
            created_at TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS session_protocols (
            session_id TEXT NOT NULL,
            protocol_id INTEGER NOT NULL,
            PRIMARY KEY (session_id, protocol_id)
        );

        CREATE TABLE IF NOT EXISTS instruments (
            id INTEGER PRIMARY KEY,
            instrument_name TEXT NOT NULL DEFAULT '',
            instrument_description TEXT NOT NULL DEFAULT '',
            enabled INTEGER NOT NULL DEFAULT 1,
            created_at TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS instrument_usage (
            id INTEGER PRIMARY KEY,
            instrument_id INTEGER NOT NULL,
            user_id INTEGER,
            time_started TEXT,
            time_ended TEXT,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT,
            updated_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_instrument_usage_instrument ON instrument_usage(instrument_id);

        CREATE TABLE IF NOT EXISTS maintenance_logs (
            id INTEGER PRIMARY KEY,
            instrument_id INTEGER NOT NULL,
            maintenance_date TEXT NOT NULL,
            maintenance_type TEXT NOT NULL DEFAULT 'routine',
            status TEXT NOT NULL DEFAULT 'pending',
            maintenance_description TEXT NOT NULL DEFAULT '',
            created_by INTEGER,
            created_at TEXT,
            updated_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_maintenance_logs_instrument ON maintenance_logs(instrument_id);

        CREATE TABLE IF NOT EXISTS support_information (
            id INTEGER PRIMARY KEY,
            vendor_name TEXT NOT NULL DEFAULT '',
            vendor_contacts TEXT NOT NULL DEFAULT '[]',
            manufacturer_name TEXT NOT NULL DEFAULT '',
            serial_number TEXT,
            maintenance_frequency_days INTEGER,
            location_id INTEGER,
            warranty_start_date TEXT,
            warranty_end_date TEXT
        );

        CREATE TABLE IF NOT EXISTS lab_groups (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            is_core_facility INTEGER NOT NULL DEFAULT 0,
            default_storage_id INTEGER,
            created_at TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS message_threads (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL DEFAULT '',
            lab_group_id INTEGER,
            is_system_thread INTEGER NOT NULL DEFAULT 0,
            creator_id INTEGER,
            created_at TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS thread_participants (
            thread_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            PRIMARY KEY (thread_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS messages (
            id INTEGER PRIMARY KEY,
            thread_id INTEGER NOT NULL,
            sender_id INTEGER,
            content TEXT NOT NULL DEFAULT '',
            message_type TEXT NOT NULL DEFAULT 'user_message',
            priority TEXT NOT NULL DEFAULT 'normal',
            created_at TEXT,
            updated_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id, created_at DESC);

        -- pending_sync marks read-state flags applied locally before the
        -- remote receipt was confirmed; a background pass retries them.
        CREATE TABLE IF NOT EXISTS message_recipients (
            message_id INTEGER NOT NULL,
            user_id INTEGER NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            read_at TEXT,
            pending_sync INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (message_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS message_attachments (
            id INTEGER PRIMARY KEY,
            message_id INTEGER NOT NULL,
            file_name TEXT NOT NULL DEFAULT '',
            file_size INTEGER,
            content_type TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_message_attachments_message ON message_attachments(message_id);

        CREATE TABLE IF NOT EXISTS import_trackers (
            id INTEGER PRIMARY KEY,
            import_type TEXT NOT NULL DEFAULT '',
            import_status TEXT NOT NULL DEFAULT 'pending',
            import_name TEXT,
            user_id INTEGER,
            created_at TEXT,
            completed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS site_settings (
            id INTEGER PRIMARY KEY,
            site_name TEXT NOT NULL DEFAULT '',
            logo TEXT,
            banner TEXT,
            primary_color TEXT,
            secondary_color TEXT,
            allow_import_protocols INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT
        );
        "#,
    )?;
    Ok(())
}
