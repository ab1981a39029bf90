use std::fmt;

use chrono::DateTime;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::services::bug_tracker::RawBugTask;

pub const OPEN_STATUSES: [BugStatus; 5] = [
    BugStatus::New,
    BugStatus::InProgress,
    BugStatus::Triaged,
    BugStatus::Confirmed,
    BugStatus::Incomplete,
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BugStatus {
    New,
    Incomplete,
    Confirmed,
    Triaged,
    InProgress,
    FixCommitted,
    FixReleased,
    Other(String),
}

impl BugStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BugStatus::New => "New",
            BugStatus::Incomplete => "Incomplete",
            BugStatus::Confirmed => "Confirmed",
            BugStatus::Triaged => "Triaged",
            BugStatus::InProgress => "In Progress",
            BugStatus::FixCommitted => "Fix Committed",
            BugStatus::FixReleased => "Fix Released",
            BugStatus::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "New" => BugStatus::New,
            "Incomplete" => BugStatus::Incomplete,
            "Confirmed" => BugStatus::Confirmed,
            "Triaged" => BugStatus::Triaged,
            "In Progress" => BugStatus::InProgress,
            "Fix Committed" => BugStatus::FixCommitted,
            "Fix Released" => BugStatus::FixReleased,
            other => BugStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for BugStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BugStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Importance {
    Undecided,
    Wishlist,
    Low,
    Medium,
    High,
    Critical,
    Other(String),
}

impl Importance {
    pub fn as_str(&self) -> &str {
        match self {
            Importance::Undecided => "Undecided",
            Importance::Wishlist => "Wishlist",
            Importance::Low => "Low",
            Importance::Medium => "Medium",
            Importance::High => "High",
            Importance::Critical => "Critical",
            Importance::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Undecided" => Importance::Undecided,
            "Wishlist" => Importance::Wishlist,
            "Low" => Importance::Low,
            "Medium" => Importance::Medium,
            "High" => Importance::High,
            "Critical" => Importance::Critical,
            other => Importance::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Importance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One bug task as shown on the dashboard. Built once per fetch and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bug {
    pub id: String,
    pub title: String,
    pub status: BugStatus,
    pub importance: Importance,
    pub assignee: Option<String>,
    pub date_created: String,
    pub web_link: String,
}

impl Bug {
    pub fn from_raw(raw: RawBugTask) -> Self {
        // Tasks of one bug filed against several projects share `bug_link`.
        let id = raw
            .bug_link
            .or(raw.self_link)
            .unwrap_or_else(|| raw.web_link.clone());

        Self {
            id,
            title: raw.title,
            status: BugStatus::parse(&raw.status),
            importance: Importance::parse(&raw.importance),
            assignee: raw.assignee_link.as_deref().and_then(assignee_from_link),
            date_created: normalize_timestamp(&raw.date_created),
            web_link: raw.web_link,
        }
    }
}

/// `https://api.launchpad.net/1.0/~alice` becomes `alice`.
pub fn assignee_from_link(link: &str) -> Option<String> {
    let name = match link.rsplit_once('~') {
        Some((_, name)) => name,
        None => link.trim_end_matches('/').rsplit('/').next().unwrap_or(link),
    };
    let name = name.trim_end_matches('/');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Rewrites `2024-03-01T12:00:00.000000+05:30` as `2024-03-01 12:00:00 UTC+05:30`.
/// The suffix is dropped for a zero offset. Unparseable input is returned as is.
pub fn normalize_timestamp(value: &str) -> String {
    let parsed = match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(value, %err, "unable to parse bug creation date");
            return value.to_string();
        }
    };

    let local = parsed.format("%Y-%m-%d %H:%M:%S").to_string();
    let offset = parsed.offset().local_minus_utc();
    if offset == 0 {
        return local;
    }

    let sign = if offset < 0 { '-' } else { '+' };
    let minutes = offset.abs() / 60;
    format!("{local} UTC{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}
