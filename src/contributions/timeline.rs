// Month-by-month grouping for the timeline view.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::types::Contribution;

/// Pull requests merged in one calendar month, per repository.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineMonth {
    pub year: i32,
    pub month: u32,
    /// One entry per repository, holding only that month's PRs, most stars first.
    pub entries: Vec<Contribution>,
}

impl TimelineMonth {
    /// Sortable `YYYY-MM` key.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Human label such as "March 2024".
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|date| date.format("%B %Y").to_string())
            .unwrap_or_else(|| self.key())
    }

    pub fn pr_count(&self) -> usize {
        self.entries.iter().map(|c| c.prs.len()).sum()
    }
}

/// Bucket every PR by the month it was merged. Months come newest first.
pub fn group_by_month(contributions: &[Contribution]) -> Vec<TimelineMonth> {
    let mut months: BTreeMap<(i32, u32), Vec<Contribution>> = BTreeMap::new();

    for contribution in contributions {
        for pr in &contribution.prs {
            let entries = months
                .entry((pr.merged_at.year(), pr.merged_at.month()))
                .or_default();
            match entries
                .iter_mut()
                .find(|e| e.repo.full_name == contribution.repo.full_name)
            {
                Some(entry) => entry.prs.push(pr.clone()),
                None => entries.push(Contribution {
                    prs: vec![pr.clone()],
                    ..contribution.clone()
                }),
            }
        }
    }

    months
        .into_iter()
        .rev()
        .map(|((year, month), mut entries)| {
            entries.sort_by(|a, b| b.repo.stars.cmp(&a.repo.stars));
            TimelineMonth {
                year,
                month,
                entries,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::contributions::types::{PullRequestSummary, RepoSummary};

    fn pr(number: u64, year: i32, month: u32) -> PullRequestSummary {
        PullRequestSummary {
            title: format!("PR {}", number),
            number,
            url: String::new(),
            merged_at: Utc.with_ymd_and_hms(year, month, 10, 0, 0, 0).unwrap(),
        }
    }

    fn contribution(full_name: &str, stars: u64, prs: Vec<PullRequestSummary>) -> Contribution {
        let first = prs.iter().map(|p| p.merged_at).min().unwrap();
        let last = prs.iter().map(|p| p.merged_at).max().unwrap();
        Contribution {
            repo: RepoSummary {
                owner: "o".to_string(),
                name: full_name.to_string(),
                full_name: full_name.to_string(),
                description: None,
                stars,
                forks: 0,
                language: None,
                avatar_url: String::new(),
                url: String::new(),
            },
            pr_count: prs.len(),
            prs,
            languages: Vec::new(),
            first_contribution: first,
            last_contribution: last,
        }
    }

    #[test]
    fn test_group_by_month() {
        let contributions = vec![
            contribution("big", 900, vec![pr(1, 2024, 3), pr(2, 2022, 11), pr(3, 2024, 3)]),
            contribution("small", 5, vec![pr(4, 2024, 3)]),
            contribution("mid", 50, vec![pr(5, 2023, 7), pr(6, 2024, 3)]),
        ];
        let months = group_by_month(&contributions);

        let keys: Vec<String> = months.iter().map(|m| m.key()).collect();
        assert_eq!(keys, vec!["2024-03", "2023-07", "2022-11"]);
        assert_eq!(months[0].label(), "March 2024");
        assert_eq!(months[0].pr_count(), 4);

        let names: Vec<&str> = months[0]
            .entries
            .iter()
            .map(|c| c.repo.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["big", "mid", "small"]);

        // Each entry only carries the PRs merged that month
        let numbers: Vec<u64> = months[0].entries[0].prs.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![1, 3]);
        assert_eq!(months[2].entries[0].prs[0].number, 2);
    }

    #[test]
    fn test_empty() {
        assert!(group_by_month(&[]).is_empty());
    }
}
