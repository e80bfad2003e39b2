use uuid::Uuid;

pub(crate) const VIEWED_PROFILES_COOKIE: &str = "viewedProfiles";

/// Oldest entries are evicted past this point; dedup stays best-effort.
const MAX_TRACKED_VIEWS: usize = 512;

/// Client-held set of already-viewed profile ids, round-tripped through the
/// `viewedProfiles` cookie. The server keeps no per-viewer state; an
/// unreadable cookie simply resets dedup. Never used for security
/// decisions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewHistory(Vec<Uuid>);

impl ViewHistory {
    pub fn from_cookie(raw: Option<&str>) -> Self {
        let ids = raw
            .and_then(|v| serde_json::from_str::<Vec<Uuid>>(v).ok())
            .unwrap_or_default();
        Self(ids)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.0.contains(&id)
    }

    /// Returns true when the id was newly recorded.
    pub fn record(&mut self, id: Uuid) -> bool {
        if self.0.contains(&id) {
            return false;
        }
        if self.0.len() == MAX_TRACKED_VIEWS {
            self.0.remove(0);
        }
        self.0.push(id);
        true
    }

    pub fn to_cookie_value(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_garbage_cookie_is_an_empty_history() {
        assert_eq!(ViewHistory::from_cookie(None), ViewHistory::default());
        assert_eq!(
            ViewHistory::from_cookie(Some("not json")),
            ViewHistory::default()
        );
        assert_eq!(
            ViewHistory::from_cookie(Some("[\"not-a-uuid\"]")),
            ViewHistory::default()
        );
    }

    #[test]
    fn recording_the_same_profile_twice_counts_once() {
        let mut history = ViewHistory::default();
        let id = Uuid::new_v4();
        assert!(history.record(id));
        assert!(!history.record(id));
        assert!(history.contains(id));
        assert_eq!(history.0.len(), 1);
    }

    #[test]
    fn cookie_roundtrip_preserves_entries() {
        let mut history = ViewHistory::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        history.record(a);
        history.record(b);

        let parsed = ViewHistory::from_cookie(Some(&history.to_cookie_value()));
        assert_eq!(parsed, history);
    }

    #[test]
    fn history_is_capped_with_oldest_evicted() {
        let mut history = ViewHistory::default();
        let oldest = Uuid::new_v4();
        history.record(oldest);
        for _ in 0..MAX_TRACKED_VIEWS - 1 {
            history.record(Uuid::new_v4());
        }
        assert_eq!(history.0.len(), MAX_TRACKED_VIEWS);

        history.record(Uuid::new_v4());
        assert_eq!(history.0.len(), MAX_TRACKED_VIEWS);
        assert!(!history.contains(oldest));
    }
}
