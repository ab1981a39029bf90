use crate::domain::bug::{BugStatus, OPEN_STATUSES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

/// One independent search against one project collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub key: String,
    pub project: String,
    pub statuses: Option<Vec<BugStatus>>,
    pub importance: Option<String>,
    pub tags: Option<String>,
}

impl QueryDescriptor {
    pub fn project(project: &str) -> Self {
        Self {
            key: project.to_string(),
            project: project.to_string(),
            statuses: None,
            importance: None,
            tags: None,
        }
    }

    pub fn tagged(project: &str, tag: &str) -> Self {
        Self {
            tags: Some(tag.to_string()),
            ..Self::project(project)
        }
    }

    pub fn endpoint(&self, api_base: &str) -> String {
        format!("{}/{}", api_base.trim_end_matches('/'), self.project)
    }

    pub fn conditions(&self, page_size: usize) -> Vec<(&'static str, FilterValue)> {
        let statuses = self
            .statuses
            .clone()
            .unwrap_or_else(|| OPEN_STATUSES.to_vec())
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();

        let mut conditions = vec![
            ("ws.op", FilterValue::One("searchTasks".to_string())),
            ("ws.size", FilterValue::One(page_size.to_string())),
            ("status", FilterValue::Many(statuses)),
        ];
        if let Some(importance) = &self.importance {
            conditions.push(("importance", FilterValue::One(importance.clone())));
        }
        if let Some(tags) = &self.tags {
            conditions.push(("tags", FilterValue::One(tags.clone())));
        }
        conditions
    }

    pub fn query_params(&self, page_size: usize) -> Vec<(String, String)> {
        expand_conditions(self.conditions(page_size))
    }
}

pub fn expand_conditions(conditions: Vec<(&'static str, FilterValue)>) -> Vec<(String, String)> {
    let mut params = Vec::new();
    for (key, value) in conditions {
        match value {
            FilterValue::One(value) => params.push((key.to_string(), value)),
            FilterValue::Many(values) => {
                params.extend(values.into_iter().map(|value| (key.to_string(), value)));
            }
        }
    }
    params
}
