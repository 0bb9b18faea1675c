// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ids::LeadId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Contacted,
    Interested,
    NotInterested,
}

impl LeadStatus {
    pub const ALL: [Self; 4] = [
        Self::New,
        Self::Contacted,
        Self::Interested,
        Self::NotInterested,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Interested => "interested",
            Self::NotInterested => "not_interested",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "interested" => Some(Self::Interested),
            "not_interested" => Some(Self::NotInterested),
            _ => None,
        }
    }

    /// Display label shown in cards and the selector. Fixed locale.
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "Neu",
            Self::Contacted => "Kontaktiert",
            Self::Interested => "Interessiert",
            Self::NotInterested => "Kein Interesse",
        }
    }
}

/// Requested monthly budget range in whole euros. Absent means the lead
/// did not specify one, and every budget display is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub property_type: String,
    pub units: i64,
    pub budget: Option<Budget>,
    pub location: String,
    pub company: String,
    pub reason: String,
    pub status: LeadStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::LeadStatus;
    use std::collections::BTreeSet;

    #[test]
    fn status_storage_round_trip() {
        for status in LeadStatus::ALL {
            assert_eq!(LeadStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn unknown_status_string_is_rejected() {
        assert_eq!(LeadStatus::parse("qualified"), None);
        assert_eq!(LeadStatus::parse(""), None);
        assert_eq!(LeadStatus::parse("Neu"), None);
    }

    #[test]
    fn status_labels_are_total_and_exclusive() {
        let labels = LeadStatus::ALL
            .iter()
            .map(|status| status.label())
            .collect::<BTreeSet<_>>();
        assert_eq!(labels.len(), LeadStatus::ALL.len());
        assert!(labels.contains("Neu"));
        assert!(labels.contains("Kontaktiert"));
        assert!(labels.contains("Interessiert"));
        assert!(labels.contains("Kein Interesse"));
    }
}
