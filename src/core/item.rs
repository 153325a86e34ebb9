use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in a collection. Deletion is a tombstone so a concurrent editor
/// never resurrects a removed item; queries skip tombstones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub text: String,
    pub created: NaiveDateTime,
    #[serde(default)]
    pub deleted: bool,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            created: chrono::Local::now().naive_local(),
            deleted: false,
        }
    }
}

/// Order items by creation time ascending, id tiebreak (same totality rule as
/// collections).
pub fn sort_items(items: &mut [Item]) {
    items.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
}

/// Normalize user input for a new item or list title. Returns `None` when
/// there is nothing to submit.
pub fn normalize_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 1)
            .unwrap()
            .and_hms_opt(9, 0, secs)
            .unwrap()
    }

    #[test]
    fn sorts_by_created_then_id() {
        let mut older = Item::new("older");
        older.created = at(1);
        let mut newer = Item::new("newer");
        newer.created = at(2);

        let mut a = Item::new("a");
        let mut b = Item::new("b");
        a.created = at(5);
        b.created = at(5);

        let mut items = vec![newer.clone(), b.clone(), older.clone(), a.clone()];
        sort_items(&mut items);

        assert_eq!(items[0].id, older.id);
        assert_eq!(items[1].id, newer.id);
        // Equal timestamps: id order decides, consistently.
        let tie: Vec<Uuid> = items[2..].iter().map(|i| i.id).collect();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(tie, expected);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(normalize_input(""), None);
        assert_eq!(normalize_input("   "), None);
        assert_eq!(normalize_input("  milk "), Some("milk".to_string()));
    }
}
