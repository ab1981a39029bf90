use std::collections::{BTreeSet, HashMap};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::bug::{BugStatus, Importance};
use crate::domain::query::QueryDescriptor;
use crate::error::{AppError, AppResult};
use crate::workflow::dashboard::source_key;

const CONFIG_ENV: &str = "DASHBOARD_CONFIG";
const PROJECT_NAME_ENV: &str = "PROJECT_NAME";
const DEFAULT_PROJECT_NAME: &str = "ironic";
const CONFIG_DIRECTORY: &str = "config";
const MAX_ANCIENT_AFTER_DAYS: i64 = 36_500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub tagged_projects: Vec<TaggedProject>,
    #[serde(default)]
    pub priority_required_statuses: Vec<String>,
    #[serde(default)]
    pub status_priorities: HashMap<String, i32>,
    #[serde(default = "default_excluded_importance")]
    pub excluded_importance: String,
    #[serde(default = "default_ancient_after_days")]
    pub ancient_after_days: i64,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedProject {
    pub project: String,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub api_base: String,
    pub page_size: usize,
    pub max_concurrency: usize,
    pub request_timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.launchpad.net/1.0".to_string(),
            page_size: 100,
            max_concurrency: 5,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub serve_stale_on_error: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 5,
            serve_stale_on_error: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

fn default_excluded_importance() -> String {
    "Wishlist".to_string()
}

fn default_ancient_after_days() -> i64 {
    365
}

impl AppConfig {
    /// Resolves the config file from the explicit path, `DASHBOARD_CONFIG`,
    /// or `config/<PROJECT_NAME>.yaml`, in that order.
    pub fn load(explicit: Option<&Path>) -> AppResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => config_file_path(),
        };
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            AppError::Configuration(format!("unable to read {}: {err}", path.display()))
        })?;
        Self::from_yaml(&contents)
            .map_err(|err| AppError::Configuration(format!("{}: {err}", path.display())))
    }

    pub fn from_yaml(contents: &str) -> Result<Self, String> {
        if contents.trim().is_empty() {
            return Err("configuration file cannot be empty".to_string());
        }
        let config: Self = serde_yaml::from_str(contents).map_err(|err| err.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        let mut keys = BTreeSet::new();
        for descriptor in self.descriptors() {
            if !keys.insert(descriptor.key.clone()) {
                return Err(format!("project '{}' is configured more than once", descriptor.key));
            }
        }
        let mut sources = BTreeSet::from([source_key(&self.name)]);
        for tagged in &self.tagged_projects {
            if !sources.insert(source_key(&tagged.project)) {
                return Err(format!(
                    "tagged project '{}' collides with another source named '{}'",
                    tagged.project,
                    source_key(&tagged.project)
                ));
            }
        }
        if !(1..=MAX_ANCIENT_AFTER_DAYS).contains(&self.ancient_after_days) {
            return Err(format!(
                "ancient_after_days must be between 1 and {MAX_ANCIENT_AFTER_DAYS}"
            ));
        }
        if self.fetch.page_size == 0 {
            return Err("fetch.page_size must be positive".to_string());
        }
        if self.fetch.max_concurrency == 0 {
            return Err("fetch.max_concurrency must be positive".to_string());
        }
        Ok(())
    }

    /// One descriptor per direct project, then one per tagged project.
    pub fn descriptors(&self) -> Vec<QueryDescriptor> {
        self.projects
            .iter()
            .map(|project| QueryDescriptor::project(project))
            .chain(
                self.tagged_projects
                    .iter()
                    .map(|tagged| QueryDescriptor::tagged(&tagged.project, &tagged.tag)),
            )
            .collect()
    }

    pub fn priority_required(&self) -> Vec<BugStatus> {
        self.priority_required_statuses
            .iter()
            .map(|status| BugStatus::parse(status))
            .collect()
    }

    pub fn excluded(&self) -> Importance {
        Importance::parse(&self.excluded_importance)
    }
}

pub fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    let name = env::var(PROJECT_NAME_ENV).unwrap_or_else(|_| DEFAULT_PROJECT_NAME.to_string());
    Path::new(CONFIG_DIRECTORY).join(format!("{name}.yaml"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const IRONIC: &str = r#"
name: ironic
projects: [ironic, python-ironicclient]
tagged_projects:
  - project: nova
    tag: ironic
priority_required_statuses: [New, Confirmed, Triaged]
status_priorities:
  In Progress: -10
  Triaged: -5
fetch:
  max_concurrency: 3
"#;

    #[test]
    fn parses_config_with_defaults() {
        let config = AppConfig::from_yaml(IRONIC).unwrap();

        assert_eq!(config.projects, vec!["ironic", "python-ironicclient"]);
        assert_eq!(config.status_priorities["In Progress"], -10);
        assert_eq!(config.fetch.max_concurrency, 3);
        assert_eq!(config.fetch.page_size, 100);
        assert_eq!(config.fetch.api_base, "https://api.launchpad.net/1.0");
        assert_eq!(config.cache.ttl_secs, 5);
        assert!(!config.cache.serve_stale_on_error);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.excluded(), Importance::Wishlist);
        assert_eq!(config.ancient_after_days, 365);
    }

    #[test]
    fn builds_descriptors_for_direct_and_tagged_projects() {
        let config = AppConfig::from_yaml(IRONIC).unwrap();

        let descriptors = config.descriptors();

        assert_eq!(descriptors.len(), 3);
        assert_eq!(descriptors[2].key, "nova");
        assert_eq!(descriptors[2].tags.as_deref(), Some("ironic"));
        assert!(descriptors[0].tags.is_none());
    }

    #[test]
    fn rejects_empty_config() {
        let err = AppConfig::from_yaml("  \n").unwrap_err();
        assert!(err.contains("cannot be empty"));
    }

    #[test]
    fn rejects_duplicate_projects() {
        let yaml = "name: x\nprojects: [nova]\ntagged_projects:\n  - {project: nova, tag: ironic}\n";
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(err.contains("more than once"));
    }

    #[test]
    fn rejects_tagged_project_shadowing_primary_source() {
        let yaml = "name: nova\nprojects: [ironic]\ntagged_projects:\n  - {project: nova, tag: ironic}\n";
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(err.contains("nova_bugs"), "{err}");
    }

    #[test]
    fn rejects_tagged_projects_with_same_source_key() {
        let yaml = "name: ironic\ntagged_projects:\n  - {project: foo-bar, tag: ironic}\n  - {project: foo_bar, tag: ironic}\n";
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(err.contains("foo_bar_bugs"), "{err}");
    }

    #[test]
    fn rejects_out_of_range_ancient_age() {
        for days in ["0", "-30", "9999999999999"] {
            let yaml = format!("name: ironic\nancient_after_days: {days}\n");
            let err = AppConfig::from_yaml(&yaml).unwrap_err();
            assert!(err.contains("ancient_after_days"), "{days}: {err}");
        }
        let config = AppConfig::from_yaml("name: ironic\nancient_after_days: 36500\n").unwrap();
        assert_eq!(config.ancient_after_days, 36_500);
    }

    #[test]
    fn accepts_config_without_projects() {
        let config = AppConfig::from_yaml("name: empty\n").unwrap();
        assert!(config.descriptors().is_empty());
    }

    #[test]
    fn loads_from_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(IRONIC.as_bytes()).unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.name, "ironic");
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(Some(dir.path().join("absent.yaml").as_path())).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
