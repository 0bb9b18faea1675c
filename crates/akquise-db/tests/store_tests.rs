// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use akquise_app::{Budget, LeadId, LeadStatus};
use akquise_db::{NewLead, Store, validate_db_path};
use anyhow::Result;

fn new_lead(id: &str, name: &str) -> NewLead {
    NewLead {
        id: LeadId::new(id),
        name: name.to_owned(),
        property_type: "Mehrfamilienhaus".to_owned(),
        units: 10,
        budget: Some(Budget {
            min: 1200,
            max: 2400,
        }),
        location: "Berlin".to_owned(),
        company: format!("{name} GmbH"),
        reason: "Empfehlung".to_owned(),
        status: LeadStatus::New,
    }
}

#[test]
fn validate_db_path_rejects_uri_forms() {
    assert!(validate_db_path("file:test.db").is_err());
    assert!(validate_db_path("https://example.com/db.sqlite").is_err());
    assert!(validate_db_path("db.sqlite?mode=ro").is_err());
    assert!(validate_db_path("/tmp/akquise.db").is_ok());
}

#[test]
fn bootstrap_creates_schema() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    assert!(store.list_leads()?.is_empty());
    Ok(())
}

#[test]
fn bootstrap_rejects_schema_missing_required_column() -> Result<()> {
    let store = Store::open_memory()?;
    store.raw_connection().execute_batch(
        "
        CREATE TABLE leads (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );
        ",
    )?;

    let err = store
        .bootstrap()
        .expect_err("schema validation should fail");
    let message = err.to_string();
    assert!(message.contains("table `leads` is missing required columns"));
    assert!(message.contains("status"));
    Ok(())
}

#[test]
fn insert_and_round_trip_lead() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    store.insert_lead(&new_lead("L1", "Acme"))?;
    let loaded = store
        .get_lead(&LeadId::new("L1"))?
        .expect("lead should exist");
    assert_eq!(loaded.name, "Acme");
    assert_eq!(loaded.units, 10);
    assert_eq!(loaded.budget, Some(Budget { min: 1200, max: 2400 }));
    assert_eq!(loaded.status, LeadStatus::New);
    Ok(())
}

#[test]
fn lead_without_budget_round_trips_as_none() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let mut lead = new_lead("L1", "Acme");
    lead.budget = None;
    store.insert_lead(&lead)?;

    let loaded = store
        .get_lead(&LeadId::new("L1"))?
        .expect("lead should exist");
    assert_eq!(loaded.budget, None);
    Ok(())
}

#[test]
fn insert_rejects_inverted_budget() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let mut lead = new_lead("L1", "Acme");
    lead.budget = Some(Budget {
        min: 2000,
        max: 1000,
    });
    let err = store
        .insert_lead(&lead)
        .expect_err("inverted budget should fail");
    assert!(err.to_string().contains("exceeds maximum"));
    Ok(())
}

#[test]
fn insert_rejects_blank_name_and_non_positive_units() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let mut blank = new_lead("L1", "Acme");
    blank.name = "  ".to_owned();
    assert!(store.insert_lead(&blank).is_err());

    let mut zero_units = new_lead("L2", "Beta");
    zero_units.units = 0;
    assert!(store.insert_lead(&zero_units).is_err());
    Ok(())
}

#[test]
fn update_lead_status_persists_and_bumps_timestamp() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.insert_lead(&new_lead("L1", "Acme"))?;

    store.raw_connection().execute(
        "UPDATE leads SET updated_at = '2024-01-03T10:00:00Z' WHERE id = 'L1'",
        [],
    )?;
    let before = store
        .get_lead(&LeadId::new("L1"))?
        .expect("lead should exist");

    store.update_lead_status(&LeadId::new("L1"), LeadStatus::Interested)?;
    let after = store
        .get_lead(&LeadId::new("L1"))?
        .expect("lead should exist");

    assert_eq!(after.status, LeadStatus::Interested);
    assert!(after.updated_at > before.updated_at);
    Ok(())
}

#[test]
fn update_lead_status_for_missing_lead_fails() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;

    let err = store
        .update_lead_status(&LeadId::new("missing"), LeadStatus::Contacted)
        .expect_err("missing lead should fail");
    assert!(err.to_string().contains("not found"));
    Ok(())
}

#[test]
fn list_leads_orders_by_updated_at_then_id() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.insert_lead(&new_lead("L1", "Alpha"))?;
    store.insert_lead(&new_lead("L2", "Beta"))?;
    store.insert_lead(&new_lead("L3", "Gamma"))?;

    store.raw_connection().execute_batch(
        "
        UPDATE leads SET updated_at = '2024-01-01T00:00:00Z' WHERE id IN ('L1', 'L3');
        UPDATE leads SET updated_at = '2024-02-01T00:00:00Z' WHERE id = 'L2';
        ",
    )?;

    let leads = store.list_leads()?;
    let ids = leads
        .iter()
        .map(|lead| lead.id.as_str().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["L2", "L1", "L3"]);
    Ok(())
}

#[test]
fn unknown_stored_status_is_rejected_on_read() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.insert_lead(&new_lead("L1", "Acme"))?;

    store
        .raw_connection()
        .execute("UPDATE leads SET status = 'qualified' WHERE id = 'L1'", [])?;

    let err = store
        .get_lead(&LeadId::new("L1"))
        .expect_err("unknown status should fail row conversion");
    assert!(err.to_string().contains("load lead"));
    Ok(())
}

#[test]
fn seed_demo_leads_covers_every_status_and_a_missing_budget() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.seed_demo_leads()?;

    let leads = store.list_leads()?;
    assert!(leads.len() >= 4);
    for status in LeadStatus::ALL {
        assert!(
            leads.iter().any(|lead| lead.status == status),
            "demo data missing status {}",
            status.as_str()
        );
    }
    assert!(leads.iter().any(|lead| lead.budget.is_none()));
    Ok(())
}

#[test]
fn open_creates_database_file_on_disk() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let path = temp.path().join("akquise.db");

    let store = Store::open(&path)?;
    store.bootstrap()?;
    store.insert_lead(&new_lead("L1", "Acme"))?;
    drop(store);

    let reopened = Store::open(&path)?;
    reopened.bootstrap()?;
    assert_eq!(reopened.list_leads()?.len(), 1);
    Ok(())
}
