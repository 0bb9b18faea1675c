// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use akquise_app::{Lead, LeadId, LeadStatus};
use akquise_db::Store;
use anyhow::Result;

/// Store-backed implementation of the view's runtime port. Status
/// transitions requested by the view are persisted here; the view then
/// re-reads the lead list.
pub struct DbRuntime<'a> {
    store: &'a Store,
}

impl<'a> DbRuntime<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }
}

impl akquise_tui::AppRuntime for DbRuntime<'_> {
    fn load_leads(&mut self) -> Result<Vec<Lead>> {
        self.store.list_leads()
    }

    fn update_lead_status(&mut self, id: &LeadId, status: LeadStatus) -> Result<()> {
        self.store.update_lead_status(id, status)
    }
}

#[cfg(test)]
mod tests {
    use super::DbRuntime;
    use akquise_app::{LeadId, LeadStatus};
    use akquise_db::Store;
    use akquise_tui::AppRuntime;
    use anyhow::Result;

    #[test]
    fn runtime_reads_and_updates_through_store() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.seed_demo_leads()?;

        let mut runtime = DbRuntime::new(&store);
        let leads = runtime.load_leads()?;
        assert!(!leads.is_empty());

        let target = leads[0].id.clone();
        runtime.update_lead_status(&target, LeadStatus::Interested)?;

        let reloaded = runtime.load_leads()?;
        let updated = reloaded
            .iter()
            .find(|lead| lead.id == target)
            .expect("updated lead present");
        assert_eq!(updated.status, LeadStatus::Interested);
        Ok(())
    }

    #[test]
    fn update_for_unknown_lead_surfaces_store_error() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        let mut runtime = DbRuntime::new(&store);
        let err = runtime
            .update_lead_status(&LeadId::new("missing"), LeadStatus::Contacted)
            .expect_err("unknown lead should fail");
        assert!(err.to_string().contains("not found"));
        Ok(())
    }
}
