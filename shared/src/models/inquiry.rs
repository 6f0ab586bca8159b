//! Inquiry Model (lead tracking)

use serde::{Deserialize, Serialize};

use super::actor::Actor;

/// Lead pipeline status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InquiryStatus {
    New,
    Contacted,
    Interested,
    #[serde(rename = "Not Interested")]
    NotInterested,
    Joined,
    #[serde(rename = "Follow Up")]
    FollowUp,
}

impl Default for InquiryStatus {
    fn default() -> Self {
        Self::New
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowUpStatus {
    Planned,
    Done,
    Missed,
}

impl Default for FollowUpStatus {
    fn default() -> Self {
        Self::Planned
    }
}

/// A scheduled or completed follow-up contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUp {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: FollowUpStatus,
    pub by: Actor,
    pub created_at: i64,
}

/// Inquiry record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// walk-in, call, social, etc
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub status: InquiryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_follow_up_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contacted_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub follow_ups: Vec<FollowUp>,
    pub created_by: Actor,
    pub updated_by: Actor,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create inquiry payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InquiryCreate {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub source: Option<String>,
    pub status: Option<InquiryStatus>,
    /// "YYYY-MM-DD"
    pub next_follow_up_date: Option<String>,
    pub note: Option<String>,
}

/// Follow-up entry appended through an inquiry update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpInput {
    pub date: Option<String>,
    pub note: Option<String>,
    pub status: Option<FollowUpStatus>,
}

/// Update inquiry payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InquiryUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub source: Option<String>,
    pub status: Option<InquiryStatus>,
    pub next_follow_up_date: Option<String>,
    pub last_contacted_at: Option<String>,
    pub note: Option<String>,
    pub follow_up: Option<FollowUpInput>,
}
