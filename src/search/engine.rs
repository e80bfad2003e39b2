//! Match ranking: explicit filter -> sort -> paginate passes over profile
//! rows fetched in insertion order.

use crate::profiles::repo_types::User;

/// Pagination window. Query values arrive as raw strings; anything that
/// does not parse falls back to page 1 / limit 10, and both are clamped to
/// at least 1. There is no upper bound on `limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: usize,
    pub limit: usize,
}

impl PageParams {
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        let limit = limit
            .and_then(|l| l.trim().parse::<usize>().ok())
            .unwrap_or(10)
            .max(1);
        Self { page, limit }
    }

    fn skip(&self) -> usize {
        (self.page - 1) * self.limit
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A candidate is aligned when they want to learn something the requester
/// offers, or when their wish list is empty ("open to anything").
fn is_aligned(requester: &User, candidate: &User) -> bool {
    candidate.looking_to_learn.is_empty()
        || candidate
            .looking_to_learn
            .iter()
            .any(|want| requester.tech_stack.contains(want))
}

fn tech_stack_matches(candidate: &User, query: &str) -> bool {
    query.is_empty() || candidate.tech_stack.iter().any(|t| contains_ci(t, query))
}

fn keyword_matches(candidate: &User, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    contains_ci(&candidate.first_name, query)
        || candidate
            .last_name
            .as_deref()
            .map_or(false, |l| contains_ci(l, query))
        || candidate.tech_stack.iter().any(|t| contains_ci(t, query))
}

/// Stable sort, so equal impression counts keep insertion order.
fn rank(mut candidates: Vec<User>) -> Vec<User> {
    candidates.sort_by(|a, b| b.impression_count.cmp(&a.impression_count));
    candidates
}

fn paginate(candidates: Vec<User>, page: &PageParams) -> Vec<User> {
    candidates
        .into_iter()
        .skip(page.skip())
        .take(page.limit)
        .collect()
}

/// Aligned mode: mutual-interest filter first, then the query must match
/// the candidate's tech stack.
pub fn aligned_search(
    requester: &User,
    candidates: Vec<User>,
    query: &str,
    page: &PageParams,
) -> Vec<User> {
    let filtered = candidates
        .into_iter()
        .filter(|c| c.id != requester.id)
        .filter(|c| is_aligned(requester, c))
        .filter(|c| tech_stack_matches(c, query))
        .collect();
    paginate(rank(filtered), page)
}

/// Unaligned mode: plain keyword discovery over name and tech stack.
pub fn unaligned_search(
    requester: &User,
    candidates: Vec<User>,
    query: &str,
    page: &PageParams,
) -> Vec<User> {
    let filtered = candidates
        .into_iter()
        .filter(|c| c.id != requester.id)
        .filter(|c| keyword_matches(c, query))
        .collect();
    paginate(rank(filtered), page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn user(first: &str, tech: &[&str], learn: &[&str], impressions: i64) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", first.to_lowercase()),
            password_hash: "x".into(),
            first_name: first.into(),
            last_name: None,
            bio: None,
            github_url: None,
            linkedin_url: None,
            discord_id: None,
            tech_stack: tech.iter().map(|s| s.to_string()).collect(),
            looking_to_learn: learn.iter().map(|s| s.to_string()).collect(),
            avatar: None,
            impression_count: impressions,
            refresh_token: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn names(results: &[User]) -> Vec<&str> {
        results.iter().map(|u| u.first_name.as_str()).collect()
    }

    fn first_page() -> PageParams {
        PageParams::from_query(None, None)
    }

    #[test]
    fn page_params_default_and_clamp() {
        assert_eq!(PageParams::from_query(None, None), PageParams { page: 1, limit: 10 });
        assert_eq!(
            PageParams::from_query(Some("abc"), Some("-3")),
            PageParams { page: 1, limit: 10 }
        );
        assert_eq!(
            PageParams::from_query(Some("0"), Some("0")),
            PageParams { page: 1, limit: 1 }
        );
        assert_eq!(
            PageParams::from_query(Some("3"), Some("25")),
            PageParams { page: 3, limit: 25 }
        );
    }

    #[test]
    fn both_modes_exclude_the_requester() {
        let requester = user("Me", &["Rust"], &[], 0);
        let candidates = vec![requester.clone(), user("Other", &["Rust"], &[], 0)];

        let aligned = aligned_search(&requester, candidates.clone(), "", &first_page());
        assert_eq!(names(&aligned), vec!["Other"]);

        let unaligned = unaligned_search(&requester, candidates, "", &first_page());
        assert_eq!(names(&unaligned), vec!["Other"]);
    }

    #[test]
    fn aligned_requires_overlap_or_open_wish_list() {
        let requester = user("Me", &["Rust", "Go"], &[], 0);
        let candidates = vec![
            user("Wants-Rust", &["Python"], &["Rust"], 0),
            user("Wants-Haskell", &["Python"], &["Haskell"], 0),
            user("Open", &["Python"], &[], 0),
        ];

        let results = aligned_search(&requester, candidates, "", &first_page());
        assert_eq!(names(&results), vec!["Wants-Rust", "Open"]);
    }

    #[test]
    fn aligned_query_matches_tech_stack_substring_case_insensitively() {
        let requester = user("Me", &["Go"], &[], 0);
        let candidates = vec![
            user("Rusty", &["Rust"], &["Go"], 0),
            user("Scripter", &["TypeScript"], &["Go"], 0),
        ];

        let results = aligned_search(&requester, candidates.clone(), "rUsT", &first_page());
        assert_eq!(names(&results), vec!["Rusty"]);

        // Substring match, not equality.
        let results = aligned_search(&requester, candidates, "script", &first_page());
        assert_eq!(names(&results), vec!["Scripter"]);
    }

    #[test]
    fn aligned_scenario_with_open_and_overlapping_profiles() {
        let a = user("A", &["Go"], &[], 0);
        let b = user("B", &["Rust"], &["Go"], 0);

        // Requester A offers Go, which B wants; B's stack matches "Rust".
        let results = aligned_search(&a, vec![a.clone(), b.clone()], "Rust", &first_page());
        assert_eq!(names(&results), vec!["B"]);

        // Requester B: A is open to anything and A's stack matches "Go".
        let results = aligned_search(&b, vec![a.clone(), b.clone()], "Go", &first_page());
        assert_eq!(names(&results), vec!["A"]);
    }

    #[test]
    fn unaligned_empty_query_returns_everyone_else() {
        let requester = user("Me", &[], &[], 0);
        let candidates = vec![
            requester.clone(),
            user("One", &[], &[], 0),
            user("Two", &[], &[], 0),
        ];

        let results = unaligned_search(&requester, candidates, "", &first_page());
        assert_eq!(names(&results), vec!["One", "Two"]);
    }

    #[test]
    fn unaligned_matches_name_or_tech_stack() {
        let requester = user("Me", &[], &[], 0);
        let mut by_last_name = user("Plain", &[], &[], 0);
        by_last_name.last_name = Some("Anderson".into());
        let candidates = vec![
            user("Andrea", &[], &[], 0),
            by_last_name,
            user("Stacker", &["Golang"], &[], 0),
            user("Unrelated", &["Python"], &[], 0),
        ];

        let results = unaligned_search(&requester, candidates.clone(), "and", &first_page());
        assert_eq!(names(&results), vec!["Andrea", "Plain"]);

        let results = unaligned_search(&requester, candidates, "golang", &first_page());
        assert_eq!(names(&results), vec!["Stacker"]);
    }

    #[test]
    fn results_are_ranked_by_impressions_with_stable_ties() {
        let requester = user("Me", &[], &[], 0);
        let candidates = vec![
            user("Low", &[], &[], 1),
            user("TieFirst", &[], &[], 7),
            user("TieSecond", &[], &[], 7),
            user("High", &[], &[], 40),
        ];

        let results = unaligned_search(&requester, candidates, "", &first_page());
        assert_eq!(names(&results), vec!["High", "TieFirst", "TieSecond", "Low"]);
    }

    #[test]
    fn pagination_windows_the_ranked_results() {
        let requester = user("Me", &[], &[], 0);
        let candidates = vec![
            user("P50", &[], &[], 50),
            user("P40", &[], &[], 40),
            user("P30", &[], &[], 30),
            user("P20", &[], &[], 20),
            user("P10", &[], &[], 10),
        ];

        let page = PageParams::from_query(Some("2"), Some("2"));
        let results = unaligned_search(&requester, candidates.clone(), "", &page);
        assert_eq!(names(&results), vec!["P30", "P20"]);

        // Oversized limits return whatever remains.
        let page = PageParams::from_query(Some("1"), Some("1000"));
        let results = unaligned_search(&requester, candidates.clone(), "", &page);
        assert_eq!(results.len(), 5);

        // Pages past the end are empty.
        let page = PageParams::from_query(Some("4"), Some("2"));
        let results = unaligned_search(&requester, candidates, "", &page);
        assert!(results.is_empty());
    }
}
