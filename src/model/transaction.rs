use crate::model::{Amount, MonthBucket};
use crate::table::Searchable;
use chrono::TimeZone;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

/// A single earnings transaction as returned by the backend's transactions list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub(crate) id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub(crate) description: String,
    pub(crate) niche_id: u64,
    #[serde(default)]
    pub(crate) campaign_id: Option<u64>,
    pub(crate) amount: Amount,
    #[serde(default)]
    pub(crate) created_at: Option<String>,
}

/// Some backends send `"description": null` instead of omitting the field.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Transaction {
    pub fn new(
        id: u64,
        description: impl Into<String>,
        niche_id: u64,
        campaign_id: Option<u64>,
        amount: impl Into<Amount>,
        created_at: Option<&str>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            niche_id,
            campaign_id,
            amount: amount.into(),
            created_at: created_at.map(str::to_string),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn niche_id(&self) -> u64 {
        self.niche_id
    }

    pub fn campaign_id(&self) -> Option<u64> {
        self.campaign_id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    /// The calendar month this transaction was created in, if `created_at` is present and valid.
    pub fn month_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<MonthBucket> {
        self.created_at
            .as_deref()
            .and_then(|s| MonthBucket::parse_in(s, tz))
    }
}

impl Searchable for Transaction {
    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.description.as_str()),
            Cow::Owned(self.id.to_string()),
        ]
    }
}
