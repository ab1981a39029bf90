use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::aggregate::Aggregate;
use crate::domain::bug::{Bug, BugStatus, Importance};
use crate::error::{AppError, AppResult};
use crate::workflow::classify::{
    SourceBuckets, StatusPriorities, dedup, filter_bugs, group_by_assignee,
};

const TRIAGE_STATUSES: [BugStatus; 2] = [BugStatus::New, BugStatus::Confirmed];

/// Everything the dashboard template reads.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub generated_at: String,
    pub primary_source: String,
    pub sources: BTreeMap<String, SourceBuckets>,
    pub triage_needed: Vec<Bug>,
    pub undecided: Vec<Bug>,
    pub users: BTreeMap<String, Vec<Bug>>,
    pub unassigned_in_progress: Vec<Bug>,
    pub critical_bugs: Vec<Bug>,
    pub ancient_bugs: Vec<Bug>,
}

pub fn source_key(name: &str) -> String {
    format!("{}_bugs", name.replace('-', "_"))
}

pub fn build_dashboard(
    aggregate: &Aggregate,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> AppResult<Dashboard> {
    let priorities = StatusPriorities::new(config.status_priorities.clone());

    let primary_bugs: Vec<Bug> = config
        .projects
        .iter()
        .flat_map(|project| aggregate.get(project).iter().cloned())
        .collect();
    debug!(bugs = primary_bugs.len(), "primary bugs");
    let mut primary = SourceBuckets::classify(primary_bugs);

    let mut tagged: Vec<(String, SourceBuckets)> = config
        .tagged_projects
        .iter()
        .map(|tagged| {
            let bugs = aggregate.get(&tagged.project).to_vec();
            debug!(project = %tagged.project, bugs = bugs.len(), "tagged bugs");
            (source_key(&tagged.project), SourceBuckets::classify(bugs))
        })
        .collect();

    let mut critical_bugs: Vec<Bug> = primary.bucket(Importance::Critical.as_str()).to_vec();
    for (_, source) in &tagged {
        critical_bugs.extend_from_slice(source.bucket(Importance::Critical.as_str()));
    }

    primary.exclude_importance(&config.excluded());

    for (_, source) in &mut tagged {
        let (needs_triage, mut triaged): (Vec<Bug>, Vec<Bug>) = std::mem::take(&mut source.all)
            .into_iter()
            .partition(|bug| {
                bug.status == BugStatus::New || bug.importance == Importance::Undecided
            });
        priorities.sort(&mut triaged);
        source.all = needs_triage;
        source.triaged = triaged;
    }

    let required = config.priority_required();
    let mut undecided = filter_bugs(
        &primary.all,
        Some(required.as_slice()),
        Some(&Importance::Undecided),
    );
    priorities.sort(&mut undecided);

    let mut candidates = filter_bugs(&primary.all, Some(&TRIAGE_STATUSES[..]), None);
    for (_, source) in &tagged {
        candidates.extend(filter_bugs(&source.all, Some(&TRIAGE_STATUSES[..]), None));
    }
    candidates.extend(undecided.iter().cloned());
    let mut triage_needed = dedup(candidates);
    triage_needed.sort_by(|a, b| {
        (a.status != BugStatus::New)
            .cmp(&(b.status != BugStatus::New))
            .then_with(|| a.date_created.cmp(&b.date_created))
    });

    let groups = group_by_assignee(primary.bucket(BugStatus::InProgress.as_str()));

    let threshold = ancient_threshold(now, config.ancient_after_days)?;
    debug!(%threshold, "considering bugs ancient before threshold");
    let mut ancient_bugs: Vec<Bug> = primary
        .all
        .iter()
        .filter(|bug| bug.date_created < threshold)
        .cloned()
        .collect();
    ancient_bugs.sort_by(|a, b| a.date_created.cmp(&b.date_created));

    let primary_source = source_key(&config.name);
    let mut sources = BTreeMap::new();
    sources.insert(primary_source.clone(), primary);
    sources.extend(tagged);

    Ok(Dashboard {
        title: format!("{} bug dashboard", config.name),
        generated_at: now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        primary_source,
        sources,
        triage_needed,
        undecided,
        users: groups.users,
        unassigned_in_progress: groups.unassigned,
        critical_bugs,
        ancient_bugs,
    })
}

fn ancient_threshold(now: DateTime<Utc>, days: i64) -> AppResult<String> {
    let cutoff = Duration::try_days(days)
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| {
            AppError::Configuration(format!("ancient_after_days of {days} is out of range"))
        })?;
    Ok(cutoff.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Reads the cached aggregate, refreshing it when stale, and classifies it.
pub async fn current_dashboard(ctx: &AppContext) -> AppResult<Dashboard> {
    let aggregate = ctx.cache.fetch().await?;
    build_dashboard(&aggregate, &ctx.config, Utc::now())
}
