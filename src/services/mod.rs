pub mod aggregate_source;
pub mod bug_tracker;

pub use aggregate_source::AggregateSource;
pub use bug_tracker::BugTrackerService;
