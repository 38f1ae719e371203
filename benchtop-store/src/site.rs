//! Site settings — a remote singleton cached as a single row.

use crate::db::{self, CacheDb};
use crate::error::StorageResult;
use benchtop_types::SiteSettings;
use rusqlite::{params, OptionalExtension, Row};

fn from_row(row: &Row<'_>) -> rusqlite::Result<SiteSettings> {
    Ok(SiteSettings {
        id: row.get(0)?,
        site_name: row.get(1)?,
        logo: row.get(2)?,
        banner: row.get(3)?,
        primary_color: row.get(4)?,
        secondary_color: row.get(5)?,
        allow_import_protocols: row.get(6)?,
        updated_at: db::ts_from_sql(row.get(7)?),
    })
}

impl CacheDb {
    /// Caches the settings singleton, replacing whatever row was there —
    /// the remote has exactly one, so stale copies under an old id go.
    pub fn cache_site_settings(&self, settings: &SiteSettings) -> StorageResult<()> {
        self.in_transaction(|tx| {
            tx.execute("DELETE FROM site_settings", [])?;
            tx.execute(
                "INSERT INTO site_settings
                     (id, site_name, logo, banner, primary_color, secondary_color,
                      allow_import_protocols, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    settings.id,
                    settings.site_name,
                    settings.logo,
                    settings.banner,
                    settings.primary_color,
                    settings.secondary_color,
                    settings.allow_import_protocols,
                    db::ts_to_sql(&settings.updated_at)
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_site_settings(&self) -> StorageResult<Option<SiteSettings>> {
        let conn = self.conn.lock().unwrap();
        let settings = conn
            .query_row(
                "SELECT id, site_name, logo, banner, primary_color, secondary_color, \
                 allow_import_protocols, updated_at FROM site_settings LIMIT 1",
                [],
                from_row,
            )
            .optional()?;
        Ok(settings)
    }
}
