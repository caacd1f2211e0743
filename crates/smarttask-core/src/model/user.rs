use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name used wherever an assignee id does not resolve.
pub const UNASSIGNED: &str = "Unassigned";

/// Reference to a roster member. Never validated against the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub display_name: String,
}

impl User {
    #[must_use]
    pub fn new(id: &str, display_name: &str) -> Self {
        Self {
            id: UserId::new(id),
            display_name: display_name.to_string(),
        }
    }
}

/// The fixed, ordered set of assignable users.
///
/// Iteration order is significant: the auto-assignment heuristic breaks ties
/// by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    users: Vec<User>,
}

impl Roster {
    #[must_use]
    pub const fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// The four-person roster every board starts with.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            User::new("u1", "Valeria (Supervisor)"),
            User::new("u2", "Yahir (Operations)"),
            User::new("u3", "Odalys (Operations)"),
            User::new("u4", "Carlos (Cleaning)"),
        ])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, User> {
        self.users.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// Resolve an assignee id to a display name, or [`UNASSIGNED`].
    #[must_use]
    pub fn display_name(&self, id: &UserId) -> &str {
        self.get(id).map_or(UNASSIGNED, |u| u.display_name.as_str())
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a User;
    type IntoIter = std::slice::Iter<'a, User>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_roster_order_is_stable() {
        let roster = Roster::builtin();
        let ids: Vec<&str> = roster.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["u1", "u2", "u3", "u4"]);
    }

    #[test]
    fn dangling_id_resolves_to_unassigned() {
        let roster = Roster::builtin();
        assert_eq!(roster.display_name(&UserId::new("u2")), "Yahir (Operations)");
        assert_eq!(roster.display_name(&UserId::new("u99")), UNASSIGNED);
        assert_eq!(roster.display_name(&UserId::default()), UNASSIGNED);
    }
}
