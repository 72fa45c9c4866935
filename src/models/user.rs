//! Team members and their advertising account metrics.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ServiceError;
use crate::record::{Record, require};

const SHEET_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

// =============================================================================
// USERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub sheet_link: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_active: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Upper-case initials of each word in `name`.
#[must_use]
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Default tracking-sheet link derived from the member's name.
#[must_use]
pub fn sheet_link(name: &str) -> String {
    let slug = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    format!("{SHEET_BASE_URL}/{slug}-sheet")
}

impl Record for User {
    type Draft = NewUser;

    const COLLECTION: &'static str = "users";
    const REMOTE_TABLE: &'static str = "user_c";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, now: OffsetDateTime, draft: NewUser) -> Result<Self, ServiceError> {
        require("name", &draft.name)?;
        let user = Self {
            id,
            avatar: initials(&draft.name),
            sheet_link: sheet_link(&draft.name),
            name: draft.name.trim().to_owned(),
            email: draft.email.trim().to_owned(),
            role: draft.role,
            last_active: now,
        };
        user.validate()?;
        Ok(user)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(ServiceError::validation(format!("`{}` is not an email address", self.email)));
        }
        Ok(())
    }
}

// =============================================================================
// METRICS
// =============================================================================

/// Per-member advertising account performance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMetric {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub direct_manager: String,
    #[serde(default)]
    pub optimization_score: f64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub avg_cpc: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub conversions: f64,
    #[serde(default)]
    pub conversion_rate: f64,
    #[serde(default)]
    pub cost_per_conversion: f64,
}

#[derive(Debug, Deserialize)]
pub struct NewUserMetric {
    pub user_id: i64,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub direct_manager: String,
    #[serde(default)]
    pub optimization_score: f64,
    #[serde(default)]
    pub clicks: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub conversions: f64,
}

impl UserMetric {
    /// Recompute the ratio columns from the raw counters. Each ratio is `0`
    /// when its denominator is zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn derive_ratios(&mut self) {
        let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };
        let clicks = self.clicks as f64;
        self.ctr = ratio(clicks, self.impressions as f64) * 100.0;
        self.avg_cpc = ratio(self.cost, clicks);
        self.conversion_rate = ratio(self.conversions, clicks) * 100.0;
        self.cost_per_conversion = ratio(self.cost, self.conversions);
    }
}

impl Record for UserMetric {
    type Draft = NewUserMetric;

    const COLLECTION: &'static str = "metrics";
    const REMOTE_TABLE: &'static str = "user_metric_c";
    const READ_ONLY: &'static [&'static str] =
        &["id", "user_id", "ctr", "avg_cpc", "conversion_rate", "cost_per_conversion"];

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, _now: OffsetDateTime, draft: NewUserMetric) -> Result<Self, ServiceError> {
        let mut metric = Self {
            id,
            user_id: draft.user_id,
            user_name: draft.user_name,
            account: draft.account,
            account_type: draft.account_type,
            direct_manager: draft.direct_manager,
            optimization_score: draft.optimization_score,
            clicks: draft.clicks,
            impressions: draft.impressions,
            ctr: 0.0,
            avg_cpc: 0.0,
            cost: draft.cost,
            conversions: draft.conversions,
            conversion_rate: 0.0,
            cost_per_conversion: 0.0,
        };
        metric.derive_ratios();
        metric.validate()?;
        Ok(metric)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if !(0.0..=100.0).contains(&self.optimization_score) {
            return Err(ServiceError::validation("`optimization_score` must be between 0 and 100"));
        }
        Ok(())
    }

    fn unique_key(&self) -> Option<(&'static str, i64)> {
        Some(("user_id", self.user_id))
    }

    /// Counters may change on update; the ratios follow them.
    fn touch(&mut self, _now: OffsetDateTime) {
        self.derive_ratios();
    }
}
