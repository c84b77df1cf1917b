//! Ticket table ordering and the client-side search box.
//!
//! Every ordering ends with ascending id, so sorting is total and re-sorting
//! an already sorted table changes nothing.

use crate::api::CategoryNames;
use crate::models::Ticket;
use crate::utils::format::format_user_brief;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Id,
    Title,
    Status,
    Priority,
    Category,
    Assigned,
    Created,
    Due,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Id,
        SortKey::Title,
        SortKey::Status,
        SortKey::Priority,
        SortKey::Category,
        SortKey::Assigned,
        SortKey::Created,
        SortKey::Due,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Title => "title",
            SortKey::Status => "status",
            SortKey::Priority => "priority",
            SortKey::Category => "category",
            SortKey::Assigned => "assigned",
            SortKey::Created => "created",
            SortKey::Due => "due",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == wanted)
            .ok_or_else(|| format!("unknown sort column '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Header click state: unsorted, or one column in one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortState {
    active: Option<(SortKey, SortDirection)>,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self {
            active: Some((key, direction)),
        }
    }

    pub fn active(&self) -> Option<(SortKey, SortDirection)> {
        self.active
    }

    /// unsorted -> ascending -> descending -> unsorted; another column starts ascending.
    pub fn click(&mut self, key: SortKey) {
        self.active = match self.active {
            Some((current, SortDirection::Ascending)) if current == key => {
                Some((key, SortDirection::Descending))
            }
            Some((current, SortDirection::Descending)) if current == key => None,
            _ => Some((key, SortDirection::Ascending)),
        };
    }
}

fn category_text(ticket: &Ticket, categories: &CategoryNames) -> Option<String> {
    ticket.category.map(|id| {
        categories
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
            .to_lowercase()
    })
}

fn assignee_text(ticket: &Ticket) -> Option<String> {
    match (&ticket.assigned_to_user, ticket.assigned_to) {
        (Some(user), _) => Some(format_user_brief(Some(user)).to_lowercase()),
        (None, Some(id)) => Some(format!("user #{id}")),
        (None, None) => None,
    }
}

fn compare_by(key: SortKey, left: &Ticket, right: &Ticket, categories: &CategoryNames) -> Ordering {
    match key {
        SortKey::Id => left.id.cmp(&right.id),
        SortKey::Title => left.title.to_lowercase().cmp(&right.title.to_lowercase()),
        SortKey::Status => left.status.cmp(&right.status),
        SortKey::Priority => left.priority.cmp(&right.priority),
        SortKey::Category => category_text(left, categories).cmp(&category_text(right, categories)),
        SortKey::Assigned => assignee_text(left).cmp(&assignee_text(right)),
        SortKey::Created => left.created_at.cmp(&right.created_at),
        SortKey::Due => left.due_date.cmp(&right.due_date),
    }
}

pub fn sort_tickets(tickets: &mut [Ticket], state: &SortState, categories: &CategoryNames) {
    tickets.sort_by(|left, right| {
        let primary = match state.active() {
            Some((key, SortDirection::Ascending)) => compare_by(key, left, right, categories),
            Some((key, SortDirection::Descending)) => {
                compare_by(key, left, right, categories).reverse()
            }
            // newest first
            None => right.created_at.cmp(&left.created_at),
        };
        primary.then_with(|| left.id.cmp(&right.id))
    });
}

/// Case-insensitive substring match on title or description.
pub fn search_tickets<'a>(tickets: &'a [Ticket], query: &str) -> Vec<&'a Ticket> {
    let needle = query.trim().to_lowercase();
    tickets
        .iter()
        .filter(|ticket| {
            needle.is_empty()
                || ticket.title.to_lowercase().contains(&needle)
                || ticket.description.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tickets() -> Vec<Ticket> {
        serde_json::from_value(json!([
            {"id": 3, "title": "b printer", "priority": "HIGH", "category": 2,
             "created_at": "2025-01-02T10:00:00Z"},
            {"id": 1, "title": "A vpn", "priority": "LOW",
             "created_at": "2025-01-03T10:00:00Z", "description": "Tunnel drops"},
            {"id": 2, "title": "B keyboard", "priority": "HIGH", "category": 1,
             "created_at": "2025-01-02T10:00:00Z"},
            {"id": 4, "title": "c laptop", "priority": "CRITICAL", "assigned_to": 7}
        ]))
        .unwrap()
    }

    fn categories() -> CategoryNames {
        [(1, "network".to_string()), (2, "Hardware".to_string())]
            .into_iter()
            .collect()
    }

    fn ids(tickets: &[Ticket]) -> Vec<u64> {
        tickets.iter().map(|ticket| ticket.id).collect()
    }

    #[test]
    fn test_click_cycle() {
        let mut state = SortState::default();
        state.click(SortKey::Title);
        assert_eq!(state.active(), Some((SortKey::Title, SortDirection::Ascending)));
        state.click(SortKey::Title);
        assert_eq!(state.active(), Some((SortKey::Title, SortDirection::Descending)));
        state.click(SortKey::Title);
        assert_eq!(state.active(), None);

        state.click(SortKey::Title);
        state.click(SortKey::Due);
        assert_eq!(state.active(), Some((SortKey::Due, SortDirection::Ascending)));
    }

    #[test]
    fn test_unsorted_is_newest_first_with_id_ties() {
        let mut rows = tickets();
        sort_tickets(&mut rows, &SortState::default(), &categories());
        assert_eq!(ids(&rows), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_ties_break_by_ascending_id_and_resort_is_stable() {
        let mut rows = tickets();
        let state = SortState::new(SortKey::Priority, SortDirection::Descending);
        sort_tickets(&mut rows, &state, &categories());
        assert_eq!(ids(&rows), vec![4, 2, 3, 1]);

        let once = rows.clone();
        sort_tickets(&mut rows, &state, &categories());
        assert_eq!(rows, once);
    }

    #[test]
    fn test_text_columns_ignore_case_and_missing_first() {
        let mut rows = tickets();
        sort_tickets(&mut rows, &SortState::new(SortKey::Title, SortDirection::Ascending), &categories());
        assert_eq!(ids(&rows), vec![1, 2, 3, 4]);

        sort_tickets(&mut rows, &SortState::new(SortKey::Category, SortDirection::Ascending), &categories());
        assert_eq!(ids(&rows), vec![1, 4, 3, 2]);

        sort_tickets(&mut rows, &SortState::new(SortKey::Assigned, SortDirection::Ascending), &categories());
        assert_eq!(ids(&rows), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_search_matches_title_or_description() {
        let rows = tickets();
        let found: Vec<u64> = search_tickets(&rows, "TUNNEL").iter().map(|t| t.id).collect();
        assert_eq!(found, vec![1]);
        assert_eq!(search_tickets(&rows, "  ").len(), 4);
        assert_eq!("due".parse::<SortKey>(), Ok(SortKey::Due));
    }
}
