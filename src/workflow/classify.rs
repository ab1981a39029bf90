use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::domain::bug::{Bug, BugStatus, Importance};

pub const STATUS_BUCKETS: [BugStatus; 3] =
    [BugStatus::New, BugStatus::Incomplete, BugStatus::InProgress];
pub const IMPORTANCE_BUCKETS: [Importance; 3] =
    [Importance::High, Importance::Critical, Importance::Wishlist];

/// Keeps bugs whose status is in `statuses` (when given) and whose
/// importance equals `importance` (when given), in their original order.
pub fn filter_bugs(
    bugs: &[Bug],
    statuses: Option<&[BugStatus]>,
    importance: Option<&Importance>,
) -> Vec<Bug> {
    bugs.iter()
        .filter(|bug| statuses.is_none_or(|statuses| statuses.contains(&bug.status)))
        .filter(|bug| importance.is_none_or(|importance| &bug.importance == importance))
        .cloned()
        .collect()
}

/// First occurrence per identifier wins.
pub fn dedup(bugs: Vec<Bug>) -> Vec<Bug> {
    let mut seen = HashSet::new();
    bugs.into_iter()
        .filter(|bug| seen.insert(bug.id.clone()))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct StatusPriorities {
    weights: HashMap<String, i32>,
}

impl StatusPriorities {
    pub fn new(weights: HashMap<String, i32>) -> Self {
        Self { weights }
    }

    pub fn weight(&self, status: &BugStatus) -> i32 {
        self.weights.get(status.as_str()).copied().unwrap_or(0)
    }

    /// Lower weight first, then oldest first.
    pub fn sort(&self, bugs: &mut [Bug]) {
        bugs.sort_by(|a, b| {
            self.weight(&a.status)
                .cmp(&self.weight(&b.status))
                .then_with(|| a.date_created.cmp(&b.date_created))
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssigneeGroups {
    pub users: BTreeMap<String, Vec<Bug>>,
    pub unassigned: Vec<Bug>,
}

pub fn group_by_assignee(bugs: &[Bug]) -> AssigneeGroups {
    let mut groups = AssigneeGroups::default();
    for bug in bugs {
        match &bug.assignee {
            Some(assignee) => groups
                .users
                .entry(assignee.clone())
                .or_default()
                .push(bug.clone()),
            None => groups.unassigned.push(bug.clone()),
        }
    }
    groups
}

/// One logical bug source with its precomputed sub-lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceBuckets {
    pub all: Vec<Bug>,
    #[serde(flatten)]
    pub buckets: BTreeMap<String, Vec<Bug>>,
    pub triaged: Vec<Bug>,
}

impl SourceBuckets {
    pub fn classify(all: Vec<Bug>) -> Self {
        let mut buckets = BTreeMap::new();
        for status in &STATUS_BUCKETS {
            let found = filter_bugs(&all, Some(std::slice::from_ref(status)), None);
            buckets.insert(status.as_str().to_string(), found);
        }
        for importance in &IMPORTANCE_BUCKETS {
            let found = filter_bugs(&all, None, Some(importance));
            buckets.insert(importance.as_str().to_string(), found);
        }
        Self {
            all,
            buckets,
            triaged: Vec::new(),
        }
    }

    pub fn bucket(&self, name: &str) -> &[Bug] {
        self.buckets.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn exclude_importance(&mut self, importance: &Importance) {
        self.all.retain(|bug| &bug.importance != importance);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn bug(n: u32, status: &str, importance: &str, created: &str) -> Bug {
        Bug {
            id: format!("https://api.launchpad.net/1.0/bugs/{n}"),
            title: format!("Bug #{n}"),
            status: BugStatus::parse(status),
            importance: Importance::parse(importance),
            assignee: None,
            date_created: created.to_string(),
            web_link: format!("https://bugs.launchpad.net/bugs/{n}"),
        }
    }

    fn ids(bugs: &[Bug]) -> Vec<String> {
        bugs.iter()
            .map(|bug| bug.title.trim_start_matches("Bug #").to_string())
            .collect()
    }

    fn priorities() -> StatusPriorities {
        StatusPriorities::new(HashMap::from([
            ("In Progress".to_string(), -10),
            ("Triaged".to_string(), -5),
            ("Confirmed".to_string(), -5),
        ]))
    }

    #[test]
    fn filters_by_status_and_importance() {
        let bugs = vec![
            bug(1, "New", "High", "2024-01-01 00:00:00"),
            bug(2, "Confirmed", "High", "2024-01-02 00:00:00"),
            bug(3, "New", "Low", "2024-01-03 00:00:00"),
        ];

        let new = filter_bugs(&bugs, Some(&[BugStatus::New][..]), None);
        assert_eq!(ids(&new), vec!["1", "3"]);

        let high = filter_bugs(&bugs, None, Some(&Importance::High));
        assert_eq!(ids(&high), vec!["1", "2"]);

        let both = filter_bugs(
            &bugs,
            Some(&[BugStatus::New, BugStatus::Confirmed][..]),
            Some(&Importance::High),
        );
        assert_eq!(ids(&both), vec!["1", "2"]);

        assert_eq!(filter_bugs(&bugs, None, None).len(), 3);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let first = vec![
            bug(1, "New", "High", "2024-01-01 00:00:00"),
            bug(2, "New", "High", "2024-01-02 00:00:00"),
        ];
        let mut shared = bug(2, "Confirmed", "Low", "2024-01-02 00:00:00");
        shared.title = "Bug #2 (again)".to_string();
        let second = vec![shared, bug(3, "New", "Low", "2024-01-03 00:00:00")];

        let merged = dedup(first.into_iter().chain(second).collect());

        assert_eq!(ids(&merged), vec!["1", "2", "3"]);
        assert_eq!(merged[1].status, BugStatus::New);
    }

    #[test]
    fn sorts_by_priority_then_age() {
        let mut bugs = vec![
            bug(1, "New", "Undecided", "2024-01-01 00:00:00"),
            bug(2, "In Progress", "Undecided", "2024-03-01 00:00:00"),
            bug(3, "Triaged", "Undecided", "2024-02-01 00:00:00"),
            bug(4, "Confirmed", "Undecided", "2024-01-15 00:00:00"),
            bug(5, "In Progress", "Undecided", "2023-12-01 00:00:00"),
        ];

        priorities().sort(&mut bugs);

        assert_eq!(ids(&bugs), vec!["5", "2", "4", "3", "1"]);
    }

    #[test]
    fn unknown_status_has_default_weight() {
        assert_eq!(priorities().weight(&BugStatus::New), 0);
        assert_eq!(priorities().weight(&BugStatus::InProgress), -10);
    }

    #[test]
    fn groups_by_assignee() {
        let mut a = bug(1, "In Progress", "High", "2024-01-01 00:00:00");
        a.assignee = Some("zed".to_string());
        let mut b = bug(2, "In Progress", "High", "2024-01-02 00:00:00");
        b.assignee = Some("alice".to_string());
        let mut c = bug(3, "In Progress", "High", "2024-01-03 00:00:00");
        c.assignee = Some("zed".to_string());
        let d = bug(4, "In Progress", "High", "2024-01-04 00:00:00");

        let groups = group_by_assignee(&[a, b, c, d]);

        assert_eq!(groups.users.keys().collect::<Vec<_>>(), vec!["alice", "zed"]);
        assert_eq!(ids(&groups.users["zed"]), vec!["1", "3"]);
        assert_eq!(ids(&groups.unassigned), vec!["4"]);
    }

    #[test]
    fn classifies_source_buckets() {
        let bugs = vec![
            bug(1, "New", "Wishlist", "2024-01-01 00:00:00"),
            bug(2, "In Progress", "Critical", "2024-01-02 00:00:00"),
            bug(3, "Incomplete", "High", "2024-01-03 00:00:00"),
        ];

        let mut source = SourceBuckets::classify(bugs);

        assert_eq!(ids(source.bucket("New")), vec!["1"]);
        assert_eq!(ids(source.bucket("In Progress")), vec!["2"]);
        assert_eq!(ids(source.bucket("Critical")), vec!["2"]);
        assert_eq!(ids(source.bucket("Wishlist")), vec!["1"]);
        assert!(source.bucket("Triaged").is_empty());

        source.exclude_importance(&Importance::Wishlist);
        assert_eq!(ids(&source.all), vec!["2", "3"]);
        assert_eq!(ids(source.bucket("Wishlist")), vec!["1"]);
    }
}
