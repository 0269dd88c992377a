//! Lookup of form configurations by key, for hosts that render any form

use crate::error::{CatalogError, Result};
use crate::forms::{Building, CatalogForm, Courier, HousingAllocation, IncidentReport, LeaveRequest};
use opsdesk_forms::{FormConfig, FormMode};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Summary shown in a form picker
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub title: &'static str,
}

struct Registered {
    title: &'static str,
    config: fn(FormMode) -> FormConfig,
}

/// Registry of catalog forms
pub struct FormCatalog {
    forms: BTreeMap<&'static str, Registered>,
}

impl Default for FormCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl FormCatalog {
    pub fn empty() -> Self {
        Self {
            forms: BTreeMap::new(),
        }
    }

    /// Every form shipped with this crate
    pub fn standard() -> Self {
        Self::empty()
            .register::<Courier>()
            .register::<Building>()
            .register::<LeaveRequest>()
            .register::<HousingAllocation>()
            .register::<IncidentReport>()
    }

    pub fn register<F: CatalogForm>(mut self) -> Self {
        self.forms.insert(
            F::KEY,
            Registered {
                title: F::TITLE,
                config: F::form_config,
            },
        );
        self
    }

    /// Entries sorted by key
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.forms
            .iter()
            .map(|(key, form)| CatalogEntry {
                key: *key,
                title: form.title,
            })
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.forms.contains_key(key)
    }

    pub fn title(&self, key: &str) -> Result<&'static str> {
        self.forms
            .get(key)
            .map(|form| form.title)
            .ok_or_else(|| CatalogError::UnknownForm(key.to_string()))
    }

    pub fn config(&self, key: &str, mode: FormMode) -> Result<FormConfig> {
        let form = self
            .forms
            .get(key)
            .ok_or_else(|| CatalogError::UnknownForm(key.to_string()))?;
        debug!("Loading {} config ({:?})", key, mode);
        Ok((form.config)(mode))
    }
}
