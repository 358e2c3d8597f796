//! Campaigns, niches, and the id-to-name lookups used to label earnings rows.

use crate::table::Searchable;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// A named marketing entity, used as a transaction grouping key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub(crate) id: u64,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) niche_id: Option<u64>,
}

impl Campaign {
    pub fn new(id: u64, name: impl Into<String>, niche_id: Option<u64>) -> Self {
        Self {
            id,
            name: name.into(),
            niche_id,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn niche_id(&self) -> Option<u64> {
        self.niche_id
    }
}

/// A vertical, e.g. "Plumbing", used to tag campaigns and calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Niche {
    pub(crate) id: u64,
    pub(crate) name: String,
}

impl Niche {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Searchable for Campaign {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.name.as_str()), Cow::Owned(self.id.to_string())]
    }
}

impl Searchable for Niche {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.name.as_str()), Cow::Owned(self.id.to_string())]
    }
}

/// Resolves campaign and niche ids to display names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    campaigns: HashMap<u64, String>,
    niches: HashMap<u64, String>,
}

impl Labels {
    pub fn new(campaigns: &[Campaign], niches: &[Niche]) -> Self {
        Self {
            campaigns: campaigns.iter().map(|c| (c.id, c.name.clone())).collect(),
            niches: niches.iter().map(|n| (n.id, n.name.clone())).collect(),
        }
    }

    pub fn campaign(&self, id: u64) -> Option<&str> {
        self.campaigns.get(&id).map(String::as_str)
    }

    pub fn niche(&self, id: u64) -> Option<&str> {
        self.niches.get(&id).map(String::as_str)
    }

    /// The label shown for a `(campaign, niche)` pair: the campaign name when the campaign is
    /// known, else the niche name when the niche is known, else the bare id.
    pub fn entity(&self, campaign_id: Option<u64>, niche_id: u64) -> String {
        if let Some(name) = campaign_id.and_then(|id| self.campaign(id)) {
            return name.to_string();
        }
        if let Some(name) = self.niche(niche_id) {
            return name.to_string();
        }
        campaign_id.unwrap_or(niche_id).to_string()
    }
}
