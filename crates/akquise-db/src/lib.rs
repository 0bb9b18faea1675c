// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use akquise_app::{Budget, Lead, LeadId, LeadStatus};
use anyhow::{Context, Result, anyhow, bail};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub const APP_NAME: &str = "akquise";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[(
    "leads",
    &[
        "id",
        "name",
        "property_type",
        "units",
        "budget_min",
        "budget_max",
        "location",
        "company",
        "reason",
        "status",
        "created_at",
        "updated_at",
    ],
)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequiredIndex {
    name: &'static str,
    create_sql: &'static str,
}

const REQUIRED_INDEXES: &[RequiredIndex] = &[
    RequiredIndex {
        name: "idx_leads_updated_at",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_leads_updated_at ON leads (updated_at);",
    },
    RequiredIndex {
        name: "idx_leads_status",
        create_sql: "CREATE INDEX IF NOT EXISTS idx_leads_status ON leads (status);",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub id: LeadId,
    pub name: String,
    pub property_type: String,
    pub units: i64,
    pub budget: Option<Budget>,
    pub location: String,
    pub company: String,
    pub reason: String,
    pub status: LeadStatus,
}

impl NewLead {
    fn validate(&self) -> Result<()> {
        if self.id.as_str().trim().is_empty() {
            bail!("lead id must not be empty");
        }
        if self.name.trim().is_empty() {
            bail!("lead name must not be empty");
        }
        if self.units <= 0 {
            bail!("lead units must be positive, got {}", self.units);
        }
        if let Some(budget) = self.budget
            && budget.min > budget.max
        {
            bail!(
                "lead budget minimum {} exceeds maximum {}",
                budget.min,
                budget.max
            );
        }
        Ok(())
    }
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }

        ensure_required_indexes(&self.conn)?;
        Ok(())
    }

    pub fn insert_lead(&self, lead: &NewLead) -> Result<()> {
        lead.validate()?;
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO leads (
                  id, name, property_type, units, budget_min, budget_max,
                  location, company, reason, status, created_at, updated_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    lead.id.as_str(),
                    lead.name,
                    lead.property_type,
                    lead.units,
                    lead.budget.map(|budget| budget.min),
                    lead.budget.map(|budget| budget.max),
                    lead.location,
                    lead.company,
                    lead.reason,
                    lead.status.as_str(),
                    now,
                    now,
                ],
            )
            .with_context(|| format!("insert lead {}", lead.id))?;
        Ok(())
    }

    pub fn get_lead(&self, lead_id: &LeadId) -> Result<Option<Lead>> {
        self.conn
            .query_row(
                "
                SELECT
                  id, name, property_type, units, budget_min, budget_max,
                  location, company, reason, status, created_at, updated_at
                FROM leads
                WHERE id = ?
                ",
                params![lead_id.as_str()],
                lead_from_row,
            )
            .optional()
            .with_context(|| format!("load lead {lead_id}"))
    }

    pub fn list_leads(&self) -> Result<Vec<Lead>> {
        let mut stmt = self
            .conn
            .prepare(
                "
                SELECT
                  id, name, property_type, units, budget_min, budget_max,
                  location, company, reason, status, created_at, updated_at
                FROM leads
                ORDER BY updated_at DESC, id ASC
                ",
            )
            .context("prepare leads query")?;
        let rows = stmt.query_map([], lead_from_row).context("query leads")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("collect leads")
    }

    /// Persists a requested status transition and bumps the lead's
    /// last-modified timestamp. The view layer only ever forwards the
    /// transition here and re-reads the lead afterwards.
    pub fn update_lead_status(&self, lead_id: &LeadId, status: LeadStatus) -> Result<()> {
        let now = now_rfc3339()?;
        let rows_affected = self
            .conn
            .execute(
                "UPDATE leads SET status = ?, updated_at = ? WHERE id = ?",
                params![status.as_str(), now, lead_id.as_str()],
            )
            .context("update lead status")?;
        if rows_affected == 0 {
            bail!("lead {lead_id} not found -- reload the lead list and retry");
        }
        Ok(())
    }

    pub fn seed_demo_leads(&self) -> Result<()> {
        for lead in demo_leads() {
            self.insert_lead(&lead)?;
        }
        Ok(())
    }
}

fn demo_leads() -> Vec<NewLead> {
    vec![
        NewLead {
            id: LeadId::new("L-1001"),
            name: "Hausverwaltung Weber".to_owned(),
            property_type: "Mehrfamilienhaus".to_owned(),
            units: 24,
            budget: Some(Budget {
                min: 1500,
                max: 2800,
            }),
            location: "Berlin, Prenzlauer Berg".to_owned(),
            company: "Weber Immobilien GmbH".to_owned(),
            reason: "Bestand wächst, Verwaltung ausgelastet".to_owned(),
            status: LeadStatus::Contacted,
        },
        NewLead {
            id: LeadId::new("L-1002"),
            name: "Acme GmbH".to_owned(),
            property_type: "Apartment Complex".to_owned(),
            units: 12,
            budget: Some(Budget {
                min: 1000,
                max: 2000,
            }),
            location: "Berlin".to_owned(),
            company: "Acme GmbH".to_owned(),
            reason: "Growth".to_owned(),
            status: LeadStatus::New,
        },
        NewLead {
            id: LeadId::new("L-1003"),
            name: "Familie Petersen".to_owned(),
            property_type: "Wohnanlage".to_owned(),
            units: 8,
            budget: None,
            location: "Hamburg, Eimsbüttel".to_owned(),
            company: "Petersen Grundbesitz".to_owned(),
            reason: "Eigentümer zieht ins Ausland".to_owned(),
            status: LeadStatus::Interested,
        },
        NewLead {
            id: LeadId::new("L-1004"),
            name: "Südstadt Quartier".to_owned(),
            property_type: "Gewerbe und Wohnen".to_owned(),
            units: 40,
            budget: Some(Budget {
                min: 3000,
                max: 5500,
            }),
            location: "Köln, Südstadt".to_owned(),
            company: "Rheinland Projekt AG".to_owned(),
            reason: "Neubau, Erstvermietung steht an".to_owned(),
            status: LeadStatus::New,
        },
        NewLead {
            id: LeadId::new("L-1005"),
            name: "Villa Sonnenhang".to_owned(),
            property_type: "Einfamilienhaus".to_owned(),
            units: 1,
            budget: None,
            location: "München, Bogenhausen".to_owned(),
            company: "Privat".to_owned(),
            reason: "Nur Preisvergleich".to_owned(),
            status: LeadStatus::NotInterested,
        },
    ]
}

fn lead_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    let status_raw: String = row.get(9)?;
    let status = LeadStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unknown lead status {status_raw}"),
            )),
        )
    })?;

    let budget_min: Option<i64> = row.get(4)?;
    let budget_max: Option<i64> = row.get(5)?;
    let budget = match (budget_min, budget_max) {
        (Some(min), Some(max)) => Some(Budget { min, max }),
        (None, None) => None,
        _ => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Integer,
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "budget bounds must both be present or both absent",
                )),
            ));
        }
    };

    let created_at_raw: String = row.get(10)?;
    let updated_at_raw: String = row.get(11)?;

    Ok(Lead {
        id: LeadId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        property_type: row.get(2)?,
        units: row.get(3)?,
        budget,
        location: row.get(6)?,
        company: row.get(7)?,
        reason: row.get(8)?,
        status,
        created_at: parse_datetime(&created_at_raw).map_err(to_sql_error)?,
        updated_at: parse_datetime(&updated_at_raw).map_err(to_sql_error)?,
    })
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("AKQUISE_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set AKQUISE_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("akquise.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!("database is missing required table `{table}`");
        }

        let columns = table_columns(conn, table)?;
        let missing = required_columns
            .iter()
            .filter(|column| !columns.contains(**column))
            .copied()
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}",
                missing.join(", ")
            );
        }
    }
    Ok(())
}

fn ensure_required_indexes(conn: &Connection) -> Result<()> {
    for index in REQUIRED_INDEXES {
        conn.execute_batch(index.create_sql)
            .with_context(|| format!("create index {}", index.name))?;
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            params![table],
            |row| row.get(0),
        )
        .with_context(|| format!("check table {table}"))?;
    Ok(count > 0)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

fn parse_datetime(raw: &str) -> Result<OffsetDateTime> {
    if let Ok(value) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(value);
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    if let Ok(value) = PrimitiveDateTime::parse(
        raw,
        &format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Ok(value.assume_utc());
    }

    bail!("unsupported datetime format {raw:?}")
}

fn to_sql_error(error: anyhow::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            error.to_string(),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::{parse_datetime, validate_db_path};
    use anyhow::Result;
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    #[test]
    fn parse_datetime_accepts_rfc3339_and_space_separated() -> Result<()> {
        let rfc = parse_datetime("2024-01-03T10:00:00Z")?;
        assert_eq!(rfc, OffsetDateTime::parse("2024-01-03T10:00:00Z", &Rfc3339)?);

        let spaced = parse_datetime("2024-01-03 10:00:00")?;
        assert_eq!(spaced.date(), rfc.date());
        Ok(())
    }

    #[test]
    fn parse_datetime_rejects_garbage() {
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn memory_path_is_accepted() {
        assert!(validate_db_path(":memory:").is_ok());
    }
}
