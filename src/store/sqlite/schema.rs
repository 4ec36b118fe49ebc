pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS apbd_data (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    tahun       INTEGER NOT NULL,
    kategori    TEXT NOT NULL,
    subkategori TEXT NOT NULL,
    jumlah      INTEGER NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_apbd_tahun ON apbd_data(tahun);
CREATE INDEX IF NOT EXISTS idx_apbd_kategori ON apbd_data(kategori);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
