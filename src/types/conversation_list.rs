use serde::{Deserialize, Serialize};

/// A conversation as it appears in the listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Unique conversation identifier.
    pub id: String,

    /// Display title; conversations that were never titled come back as null.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
}

impl ConversationSummary {
    /// Create a new `ConversationSummary`.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// One page of the user's conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationList {
    /// The conversations on this page.
    pub items: Vec<ConversationSummary>,

    /// Total number of conversations across all pages.
    pub total: u64,

    /// Page size the server applied.
    pub limit: u64,

    /// Offset of the first item on this page.
    pub offset: u64,
}

impl ConversationList {
    /// True when this page starts at the beginning of the listing.
    pub fn is_first_page(&self) -> bool {
        self.offset == 0
    }

    /// True when no conversations exist past this page.
    pub fn is_last_page(&self) -> bool {
        self.offset.saturating_add(self.limit) >= self.total
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(offset: u64, limit: u64, total: u64) -> ConversationList {
        ConversationList {
            items: Vec::new(),
            total,
            limit,
            offset,
        }
    }

    #[test]
    fn page_bounds() {
        let first = page(0, 20, 45);
        assert!(first.is_first_page());
        assert!(!first.is_last_page());

        let middle = page(20, 20, 45);
        assert!(!middle.is_first_page());
        assert!(!middle.is_last_page());

        let last = page(40, 20, 45);
        assert!(!last.is_first_page());
        assert!(last.is_last_page());
    }

    #[test]
    fn exact_fit_is_last_page() {
        let only = page(0, 20, 20);
        assert!(only.is_first_page());
        assert!(only.is_last_page());
    }

    #[test]
    fn deserialize_listing() {
        let json = serde_json::json!({
            "items": [
                {"id": "c1", "title": "Rust lifetimes", "create_time": "2023-02-01T10:00:00"},
                {"id": "c2", "title": null}
            ],
            "total": 2,
            "limit": 20,
            "offset": 0,
            "has_missing_conversations": false
        });
        let list: ConversationList = serde_json::from_value(json).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0], ConversationSummary::new("c1", "Rust lifetimes"));
        assert_eq!(list.items[1].title, "");
        assert!(list.is_last_page());
    }
}
