use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summary of one collection as reported by the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub title: Option<String>,
    pub mtime: Option<NaiveDateTime>,
    pub writable: bool,
}

impl CollectionInfo {
    /// Row label: the title when one is set, otherwise the raw id.
    pub fn label(&self) -> &str {
        match self.title {
            Some(ref title) if !title.is_empty() => title,
            _ => &self.id,
        }
    }
}

/// Generate a fresh collection id. The linked service may substitute its own.
pub fn new_collection_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Order collections by modified time ascending. Missing or equal mtimes fall
/// back to id order so repeated sorts of the same input always agree.
pub fn sort_collections(infos: &mut [CollectionInfo]) {
    infos.sort_by(|a, b| match (a.mtime, b.mtime) {
        (Some(am), Some(bm)) => am.cmp(&bm).then_with(|| a.id.cmp(&b.id)),
        _ => a.id.cmp(&b.id),
    });
}

/// Whether a collection id still appears in a listing. The items screen uses
/// this to notice its own list being deleted by another actor.
pub fn is_present(infos: &[CollectionInfo], id: &str) -> bool {
    infos.iter().any(|info| info.id == id)
}

/// Extract the collection id from a deep link. Share links carry the id in
/// the URL fragment (`https://host/#<id>`); a bare id passes through as-is.
pub fn deep_link_target(arg: &str) -> &str {
    match arg.rsplit_once('#') {
        Some((_, fragment)) if !fragment.is_empty() => fragment,
        _ => arg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn info(id: &str, mtime: Option<NaiveDateTime>) -> CollectionInfo {
        CollectionInfo {
            id: id.to_string(),
            title: None,
            mtime,
            writable: true,
        }
    }

    fn at(secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 1)
            .unwrap()
            .and_hms_opt(12, 0, secs)
            .unwrap()
    }

    #[test]
    fn sorts_by_mtime_ascending() {
        let mut infos = vec![info("b", Some(at(2))), info("a", Some(at(1)))];
        sort_collections(&mut infos);
        assert_eq!(infos[0].id, "a");
        assert_eq!(infos[1].id, "b");
    }

    #[test]
    fn equal_mtimes_fall_back_to_id() {
        let mut infos = vec![info("z", Some(at(1))), info("a", Some(at(1)))];
        sort_collections(&mut infos);
        assert_eq!(infos[0].id, "a");
    }

    #[test]
    fn missing_mtime_falls_back_to_id() {
        let mut infos = vec![info("z", None), info("a", Some(at(1)))];
        sort_collections(&mut infos);
        assert_eq!(infos[0].id, "a");
        assert_eq!(infos[1].id, "z");
    }

    #[test]
    fn sort_is_idempotent() {
        let mut infos = vec![
            info("c", None),
            info("a", Some(at(5))),
            info("b", Some(at(5))),
        ];
        sort_collections(&mut infos);
        let once: Vec<String> = infos.iter().map(|i| i.id.clone()).collect();
        sort_collections(&mut infos);
        let twice: Vec<String> = infos.iter().map(|i| i.id.clone()).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn label_prefers_title() {
        let mut i = info("abc", None);
        assert_eq!(i.label(), "abc");
        i.title = Some("Groceries".to_string());
        assert_eq!(i.label(), "Groceries");
    }

    #[test]
    fn detects_missing_collection() {
        let infos = vec![info("a", None), info("b", None)];
        assert!(is_present(&infos, "a"));
        assert!(!is_present(&infos, "gone"));
    }

    #[test]
    fn deep_link_fragment_wins() {
        assert_eq!(deep_link_target("https://lists.example.com/#abc"), "abc");
        assert_eq!(deep_link_target("abc"), "abc");
        assert_eq!(deep_link_target("https://host/page#"), "https://host/page#");
    }
}
