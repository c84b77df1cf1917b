use crate::models::UserBrief;
use chrono::{DateTime, NaiveDate, Utc};

/// Display text for an assignee or author reference.
///
/// Prefers the email, then the username, then `User #<id>`.
pub fn format_user_brief(user: Option<&UserBrief>) -> String {
    match user {
        None => "Unassigned".to_string(),
        Some(user) if !user.email.trim().is_empty() => user.email.clone(),
        Some(user) if !user.username.trim().is_empty() => user.username.clone(),
        Some(user) => format!("User #{}", user.id),
    }
}

/// Display text when only an id is known, looked up in `users` first.
pub fn format_user_id(id: Option<u64>, users: &[UserBrief]) -> String {
    match id {
        None => "Unassigned".to_string(),
        Some(id) => match users.iter().find(|user| user.id == id) {
            Some(user) => format_user_brief(Some(user)),
            None => format!("User #{id}"),
        },
    }
}

pub fn format_timestamp(value: Option<&DateTime<Utc>>) -> String {
    value
        .map(|value| value.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_date(value: Option<&NaiveDate>) -> String {
    value
        .map(|value| value.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief(id: u64, username: &str, email: &str) -> UserBrief {
        UserBrief {
            id,
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_user_display_precedence() {
        assert_eq!(format_user_brief(None), "Unassigned");
        assert_eq!(
            format_user_brief(Some(&brief(1, "alice", "alice@example.com"))),
            "alice@example.com"
        );
        assert_eq!(format_user_brief(Some(&brief(1, "alice", ""))), "alice");
        assert_eq!(format_user_brief(Some(&brief(9, "", ""))), "User #9");
    }

    #[test]
    fn test_user_id_lookup() {
        let users = vec![brief(7, "tom", "")];
        assert_eq!(format_user_id(Some(7), &users), "tom");
        assert_eq!(format_user_id(Some(8), &users), "User #8");
        assert_eq!(format_user_id(None, &users), "Unassigned");
        assert_eq!(format_date(None), "-");
    }
}
