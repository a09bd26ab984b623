// Contribution aggregation and derived statistics.
// Turns merged pull request searches into per-repository summaries.

pub mod aggregator;
pub mod query;
pub mod snapshot;
pub mod stats;
pub mod timeline;
pub mod types;

pub use aggregator::{Aggregator, Pacing, RepoDetails};
pub use snapshot::{Snapshot, SnapshotDir};
pub use stats::{Badge, HeroStats, compute_badges, compute_hero_stats, language_color};
pub use timeline::{TimelineMonth, group_by_month};
pub use types::{Contribution, DateRange, PullRequestSummary, RepoSummary, UserProfile};
