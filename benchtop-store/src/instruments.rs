//! Instrument domain: instruments, usage bookings, maintenance logs and
//! support information.
//!
//! Usage rows are the showcase for partial nested objects: some endpoints
//! embed the full instrument, others only its id. Only the full shape
//! updates the instrument side-table; the bare id never clobbers it.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use crate::{storage_objects, users};
use benchtop_types::{
    ContactEntry, Instrument, InstrumentRef, InstrumentUsage, MaintenanceLog, MaintenanceStatus,
    MaintenanceType, SupportInformation,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn maintenance_type_from_str(s: &str) -> MaintenanceType {
    match s {
        "emergency" => MaintenanceType::Emergency,
        "other" => MaintenanceType::Other,
        _ => MaintenanceType::Routine,
    }
}

fn maintenance_status_from_str(s: &str) -> MaintenanceStatus {
    match s {
        "in_progress" => MaintenanceStatus::InProgress,
        "completed" => MaintenanceStatus::Completed,
        "cancelled" => MaintenanceStatus::Cancelled,
        _ => MaintenanceStatus::Pending,
    }
}

fn instrument_from_row(row: &Row<'_>) -> rusqlite::Result<Instrument> {
    Ok(Instrument {
        id: row.get(0)?,
        instrument_name: row.get(1)?,
        instrument_description: row.get(2)?,
        enabled: row.get(3)?,
        created_at: db::ts_from_sql(row.get(4)?),
        updated_at: db::ts_from_sql(row.get(5)?),
    })
}

const INSTRUMENT_SELECT: &str = "SELECT id, instrument_name, instrument_description, enabled, \
                                 created_at, updated_at FROM instruments";

pub(crate) fn upsert_instrument(conn: &Connection, instrument: &Instrument) -> StorageResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO instruments
             (id, instrument_name, instrument_description, enabled, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            instrument.id,
            instrument.instrument_name,
            instrument.instrument_description,
            instrument.enabled,
            db::ts_to_sql(&instrument.created_at),
            db::ts_to_sql(&instrument.updated_at)
        ],
    )?;
    Ok(())
}

pub(crate) fn get_instrument(conn: &Connection, id: i64) -> StorageResult<Option<Instrument>> {
    let instrument = conn
        .query_row(
            &format!("{INSTRUMENT_SELECT} WHERE id = ?1"),
            params![id],
            instrument_from_row,
        )
        .optional()?;
    Ok(instrument)
}

impl CacheDb {
    // ── Instruments ──────────────────────────────────────────────

    pub fn cache_instrument(&self, instrument: &Instrument) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        upsert_instrument(&conn, instrument)
    }

    pub fn get_instrument_by_id(&self, id: i64) -> StorageResult<Option<Instrument>> {
        let conn = self.conn.lock().unwrap();
        get_instrument(&conn, id)
    }

    pub fn list_instruments(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<Instrument>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from(INSTRUMENT_SELECT);
        if search.is_some() {
            sql.push_str(" WHERE instrument_name LIKE ?1");
        }
        sql.push_str(" ORDER BY id ASC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows = match search {
            Some(search) => stmt
                .query_map(params![db::like_pattern(search)], instrument_from_row)?
                .filter_map(|r| r.ok())
                .collect(),
            None => stmt
                .query_map([], instrument_from_row)?
                .filter_map(|r| r.ok())
                .collect(),
        };
        Ok(rows)
    }

    pub fn count_instruments(&self, search: Option<&str>) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = match search {
            Some(search) => conn.query_row(
                "SELECT COUNT(*) FROM instruments WHERE instrument_name LIKE ?1",
                params![db::like_pattern(search)],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM instruments", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Evicts an instrument and its dependent usage/maintenance rows after
    /// a remote-confirmed delete.
    pub fn evict_instrument(&self, id: i64) -> StorageResult<()> {
        self.in_transaction(|tx| {
            tx.execute("DELETE FROM instrument_usage WHERE instrument_id = ?1", params![id])?;
            tx.execute("DELETE FROM maintenance_logs WHERE instrument_id = ?1", params![id])?;
            tx.execute("DELETE FROM instruments WHERE id = ?1", params![id])?;
            Ok(())
        })
    }

    // ── Usage bookings ───────────────────────────────────────────

    pub fn cache_instrument_usage(&self, usage: &InstrumentUsage) -> StorageResult<()> {
        self.in_transaction(|tx| {
            // Only a fully-populated instrument refreshes the side-table
            if let Some(full) = usage.instrument.as_full() {
                upsert_instrument(tx, full)?;
            }
            users::upsert_opt(tx, &usage.user)?;
            tx.execute(
                "INSERT OR REPLACE INTO instrument_usage
                     (id, instrument_id, user_id, time_started, time_ended, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    usage.id,
                    usage.instrument.id(),
                    usage.user.as_ref().map(|u| u.id),
                    db::ts_to_sql(&usage.time_started),
                    db::ts_to_sql(&usage.time_ended),
                    usage.description,
                    db::ts_to_sql(&usage.created_at),
                    db::ts_to_sql(&usage.updated_at)
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_instrument_usage(&self, id: i64) -> StorageResult<Option<InstrumentUsage>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{USAGE_SELECT} WHERE id = ?1"), params![id], usage_from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate_usage(&conn, row)?)),
            None => Ok(None),
        }
    }

    /// Lists usage windows, optionally scoped to an instrument and/or a
    /// start-time range, newest first — the booking calendar's ordering.
    pub fn list_instrument_usage(
        &self,
        instrument: Option<i64>,
        started_after: Option<chrono::DateTime<chrono::Utc>>,
        started_before: Option<chrono::DateTime<chrono::Utc>>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<InstrumentUsage>> {
        let conn = self.conn.lock().unwrap();
        let (mut sql, args) = usage_filtered_sql(USAGE_SELECT, instrument, started_after, started_before);
        sql.push_str(" ORDER BY time_started DESC, id DESC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<UsageRow> = stmt
            .query_map(db::param_refs(&args).as_slice(), usage_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        let mut usage = Vec::with_capacity(rows.len());
        for row in rows {
            usage.push(rehydrate_usage(&conn, row)?);
        }
        Ok(usage)
    }

    pub fn count_instrument_usage(
        &self,
        instrument: Option<i64>,
        started_after: Option<chrono::DateTime<chrono::Utc>>,
        started_before: Option<chrono::DateTime<chrono::Utc>>,
    ) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let (sql, args) = usage_filtered_sql(
            "SELECT COUNT(*) FROM instrument_usage",
            instrument,
            started_after,
            started_before,
        );
        let count = conn.query_row(&sql, db::param_refs(&args).as_slice(), |row| row.get(0))?;
        Ok(count)
    }

    pub fn evict_instrument_usage(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM instrument_usage WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Maintenance logs ─────────────────────────────────────────

    pub fn cache_maintenance_log(&self, log: &MaintenanceLog) -> StorageResult<()> {
        self.in_transaction(|tx| {
            users::upsert_opt(tx, &log.created_by)?;
            tx.execute(
                "INSERT OR REPLACE INTO maintenance_logs
                     (id, instrument_id, maintenance_date, maintenance_type, status,
                      maintenance_description, created_by, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    log.id,
                    log.instrument,
                    db::ts_req_to_sql(&log.maintenance_date),
                    log.maintenance_type.as_str(),
                    log.status.as_str(),
                    log.maintenance_description,
                    log.created_by.as_ref().map(|u| u.id),
                    db::ts_to_sql(&log.created_at),
                    db::ts_to_sql(&log.updated_at)
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_maintenance_log(&self, id: i64) -> StorageResult<Option<MaintenanceLog>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{LOG_SELECT} WHERE id = ?1"), params![id], log_from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate_log(&conn, row)?)),
            None => Ok(None),
        }
    }

    pub fn list_maintenance_logs(
        &self,
        instrument: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<MaintenanceLog>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from(LOG_SELECT);
        if instrument.is_some() {
            sql.push_str(" WHERE instrument_id = ?1");
        }
        sql.push_str(" ORDER BY maintenance_date DESC, id DESC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<LogRow> = match instrument {
            Some(instrument) => stmt
                .query_map(params![instrument], log_from_row)?
                .filter_map(|r| r.ok())
                .collect(),
            None => stmt
                .query_map([], log_from_row)?
                .filter_map(|r| r.ok())
                .collect(),
        };
        drop(stmt);

        let mut logs = Vec::with_capacity(rows.len());
        for row in rows {
            logs.push(rehydrate_log(&conn, row)?);
        }
        Ok(logs)
    }

    pub fn count_maintenance_logs(&self, instrument: Option<i64>) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = match instrument {
            Some(instrument) => conn.query_row(
                "SELECT COUNT(*) FROM maintenance_logs WHERE instrument_id = ?1",
                params![instrument],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM maintenance_logs", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    pub fn evict_maintenance_log(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM maintenance_logs WHERE id = ?1", params![id])?;
        Ok(())
    }

    // ── Support information ──────────────────────────────────────

    pub fn cache_support_information(&self, info: &SupportInformation) -> StorageResult<()> {
        self.in_transaction(|tx| {
            if let Some(location) = &info.location {
                storage_objects::upsert_basic(tx, location)?;
            }
            let contacts = serde_json::to_string(&info.vendor_contacts)?;
            tx.execute(
                "INSERT OR REPLACE INTO support_information
                     (id, vendor_name, vendor_contacts, manufacturer_name, serial_number,
                      maintenance_frequency_days, location_id, warranty_start_date, warranty_end_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    info.id,
                    info.vendor_name,
                    contacts,
                    info.manufacturer_name,
                    info.serial_number,
                    info.maintenance_frequency_days,
                    info.location.as_ref().map(|l| l.id),
                    db::date_to_sql(&info.warranty_start_date),
                    db::date_to_sql(&info.warranty_end_date)
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_support_information(&self, id: i64) -> StorageResult<Option<SupportInformation>> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(&format!("{SUPPORT_SELECT} WHERE id = ?1"), params![id], support_from_row)
            .optional()?;
        match row {
            Some(row) => Ok(Some(rehydrate_support(&conn, row)?)),
            None => Ok(None),
        }
    }

    pub fn list_support_information(
        &self,
        limit: i64,
        offset: i64,
    ) -> StorageResult<Vec<SupportInformation>> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from(SUPPORT_SELECT);
        sql.push_str(" ORDER BY id ASC");
        db::push_slice(&mut sql, limit, offset);

        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<SupportRow> = stmt
            .query_map([], support_from_row)?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);

        let mut infos = Vec::with_capacity(rows.len());
        for row in rows {
            infos.push(rehydrate_support(&conn, row)?);
        }
        Ok(infos)
    }

    pub fn count_support_information(&self) -> StorageResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM support_information", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn evict_support_information(&self, id: i64) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM support_information WHERE id = ?1", params![id])?;
        Ok(())
    }
}

// ── Row shapes and mappers ───────────────────────────────────────

struct UsageRow {
    id: i64,
    instrument_id: i64,
    user_id: Option<i64>,
    time_started: Option<String>,
    time_ended: Option<String>,
    description: String,
    created_at: Option<String>,
    updated_at: Option<String>,
}

const USAGE_SELECT: &str = "SELECT id, instrument_id, user_id, time_started, time_ended, \
                            description, created_at, updated_at FROM instrument_usage";

fn usage_from_row(row: &Row<'_>) -> rusqlite::Result<UsageRow> {
    Ok(UsageRow {
        id: row.get(0)?,
        instrument_id: row.get(1)?,
        user_id: row.get(2)?,
        time_started: row.get(3)?,
        time_ended: row.get(4)?,
        description: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn rehydrate_usage(conn: &Connection, row: UsageRow) -> StorageResult<InstrumentUsage> {
    // Serve the full instrument when it is cached, else fall back to the
    // bare-id shape rather than a placeholder with empty fields.
    let instrument = match get_instrument(conn, row.instrument_id)? {
        Some(full) => InstrumentRef::Full(full),
        None => InstrumentRef::Id(row.instrument_id),
    };
    Ok(InstrumentUsage {
        id: row.id,
        instrument,
        user: users::resolve_fk(conn, row.user_id)?,
        time_started: db::ts_from_sql(row.time_started),
        time_ended: db::ts_from_sql(row.time_ended),
        description: row.description,
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

struct LogRow {
    id: i64,
    instrument_id: i64,
    maintenance_date: String,
    maintenance_type: String,
    status: String,
    maintenance_description: String,
    created_by: Option<i64>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

const LOG_SELECT: &str = "SELECT id, instrument_id, maintenance_date, maintenance_type, status, \
                          maintenance_description, created_by, created_at, updated_at FROM maintenance_logs";

fn log_from_row(row: &Row<'_>) -> rusqlite::Result<LogRow> {
    Ok(LogRow {
        id: row.get(0)?,
        instrument_id: row.get(1)?,
        maintenance_date: row.get(2)?,
        maintenance_type: row.get(3)?,
        status: row.get(4)?,
        maintenance_description: row.get(5)?,
        created_by: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn rehydrate_log(conn: &Connection, row: LogRow) -> StorageResult<MaintenanceLog> {
    Ok(MaintenanceLog {
        id: row.id,
        instrument: row.instrument_id,
        maintenance_date: db::ts_req_from_sql(row.maintenance_date),
        maintenance_type: maintenance_type_from_str(&row.maintenance_type),
        status: maintenance_status_from_str(&row.status),
        maintenance_description: row.maintenance_description,
        created_by: users::resolve_fk(conn, row.created_by)?,
        created_at: db::ts_from_sql(row.created_at),
        updated_at: db::ts_from_sql(row.updated_at),
    })
}

struct SupportRow {
    id: i64,
    vendor_name: String,
    vendor_contacts: String,
    manufacturer_name: String,
    serial_number: Option<String>,
    maintenance_frequency_days: Option<i64>,
    location_id: Option<i64>,
    warranty_start_date: Option<String>,
    warranty_end_date: Option<String>,
}

const SUPPORT_SELECT: &str = "SELECT id, vendor_name, vendor_contacts, manufacturer_name, \
                              serial_number, maintenance_frequency_days, location_id, \
                              warranty_start_date, warranty_end_date FROM support_information";

fn support_from_row(row: &Row<'_>) -> rusqlite::Result<SupportRow> {
    Ok(SupportRow {
        id: row.get(0)?,
        vendor_name: row.get(1)?,
        vendor_contacts: row.get(2)?,
        manufacturer_name: row.get(3)?,
        serial_number: row.get(4)?,
        maintenance_frequency_days: row.get(5)?,
        location_id: row.get(6)?,
        warranty_start_date: row.get(7)?,
        warranty_end_date: row.get(8)?,
    })
}

fn rehydrate_support(conn: &Connection, row: SupportRow) -> StorageResult<SupportInformation> {
    let contacts: Vec<ContactEntry> = serde_json::from_str(&row.vendor_contacts).unwrap_or_default();
    let location = match row.location_id {
        Some(id) => Some(storage_objects::get_basic(conn, id)?),
        None => None,
    };
    Ok(SupportInformation {
        id: row.id,
        vendor_name: row.vendor_name,
        vendor_contacts: contacts,
        manufacturer_name: row.manufacturer_name,
        serial_number: row.serial_number,
        maintenance_frequency_days: row.maintenance_frequency_days,
        location,
        warranty_start_date: db::date_from_sql(row.warranty_start_date),
        warranty_end_date: db::date_from_sql(row.warranty_end_date),
    })
}

fn usage_filtered_sql(
    base: &str,
    instrument: Option<i64>,
    started_after: Option<chrono::DateTime<chrono::Utc>>,
    started_before: Option<chrono::DateTime<chrono::Utc>>,
) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut sql = String::from(base);
    let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    let mut clause = " WHERE";
    if let Some(instrument) = instrument {
        args.push(Box::new(instrument));
        sql.push_str(&format!("{clause} instrument_id = ?{}", args.len()));
        clause = " AND";
    }
    if let Some(after) = started_after {
        args.push(Box::new(after.to_rfc3339()));
        sql.push_str(&format!("{clause} time_started >= ?{}", args.len()));
        clause = " AND";
    }
    if let Some(before) = started_before {
        args.push(Box::new(before.to_rfc3339()));
        sql.push_str(&format!("{clause} time_started <= ?{}", args.len()));
    }
    (sql, args)
}
