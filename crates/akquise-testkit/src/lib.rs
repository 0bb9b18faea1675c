// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Deterministic lead fixtures shared by the workspace test suites.

use akquise_app::{Budget, Lead, LeadId, LeadStatus};
use anyhow::{Context, Result};
use time::{Date, Month, OffsetDateTime, Time};

pub fn timestamp(year: i32, month: Month, day: u8, hour: u8) -> Result<OffsetDateTime> {
    let date = Date::from_calendar_date(year, month, day).context("build fixture date")?;
    let time = Time::from_hms(hour, 0, 0).context("build fixture time")?;
    Ok(date.with_time(time).assume_utc())
}

/// The canonical fixture lead: a Berlin apartment complex with a
/// specified budget, last touched on 3 January 2024.
pub fn sample_lead() -> Result<Lead> {
    let at = timestamp(2024, Month::January, 3, 10)?;
    Ok(Lead {
        id: LeadId::new("L1"),
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
        created_at: at,
        updated_at: at,
    })
}

pub fn lead_without_budget() -> Result<Lead> {
    let at = timestamp(2024, Month::February, 14, 9)?;
    Ok(Lead {
        id: LeadId::new("L2"),
        name: "Familie Petersen".to_owned(),
        property_type: "Wohnanlage".to_owned(),
        units: 8,
        budget: None,
        location: "Hamburg, Eimsbüttel".to_owned(),
        company: "Petersen Grundbesitz".to_owned(),
        reason: "Eigentümer zieht ins Ausland".to_owned(),
        status: LeadStatus::Interested,
        created_at: at,
        updated_at: at,
    })
}

/// Minimal builder for tests that need several distinct leads.
pub fn lead(id: &str, name: &str, status: LeadStatus) -> Result<Lead> {
    let at = timestamp(2024, Month::March, 1, 12)?;
    Ok(Lead {
        id: LeadId::new(id),
        name: name.to_owned(),
        property_type: "Mehrfamilienhaus".to_owned(),
        units: 6,
        budget: None,
        location: "Leipzig".to_owned(),
        company: format!("{name} Verwaltung"),
        reason: "Empfehlung".to_owned(),
        status,
        created_at: at,
        updated_at: at,
    })
}
