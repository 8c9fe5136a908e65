use chrono::{DateTime, TimeZone, Utc};

use super::schema::*;

#[derive(Queryable, Insertable, AsChangeset, Identifiable, Clone, Debug, PartialEq)]
#[table_name = "queues"]
#[primary_key(chat_id)]
pub struct Queue {
    pub chat_id: i64,
    pub name: String,
    pub users: Vec<String>,
    pub admins: Vec<String>,
    pub is_active: bool,
    pub cooldown: i32,
    pub who_timestamp: DateTime<Utc>,
    pub list_timestamp: DateTime<Utc>,
    pub admins_timestamp: DateTime<Utc>,
    pub message_id: i32,
}

pub const DEFAULT_COOLDOWN: i32 = 10;

impl Queue {
    /// A fresh, active and empty queue. Duplicate admin names are dropped.
    pub fn new(chat_id: i64, name: impl Into<String>, admins: Vec<String>) -> Self {
        let epoch = Utc.timestamp(0, 0);
        let mut queue = Queue {
            chat_id,
            name: name.into(),
            users: Vec::new(),
            admins: Vec::with_capacity(admins.len()),
            is_active: true,
            cooldown: DEFAULT_COOLDOWN,
            who_timestamp: epoch,
            list_timestamp: epoch,
            admins_timestamp: epoch,
            message_id: 0,
        };
        for admin in admins {
            queue.add_admin(&admin);
        }
        queue
    }

    pub fn is_admin(&self, username: &str) -> bool {
        self.admins.iter().any(|a| a == username)
    }

    pub fn position_of(&self, username: &str) -> Option<usize> {
        self.users.iter().position(|u| u == username)
    }

    pub fn add_user(&mut self, username: &str) -> bool {
        insert_unique(&mut self.users, username)
    }

    pub fn remove_user(&mut self, username: &str) -> bool {
        remove_first(&mut self.users, username)
    }

    pub fn add_admin(&mut self, username: &str) -> bool {
        insert_unique(&mut self.admins, username)
    }

    pub fn remove_admin(&mut self, username: &str) -> bool {
        remove_first(&mut self.admins, username)
    }

    pub fn pop_front(&mut self) -> Option<String> {
        if self.users.is_empty() {
            None
        } else {
            Some(self.users.remove(0))
        }
    }

    pub fn reset(&mut self) {
        self.users.clear();
    }
}

fn insert_unique(list: &mut Vec<String>, name: &str) -> bool {
    if list.iter().any(|x| x == name) {
        return false;
    }
    list.push(name.to_string());
    true
}

fn remove_first(list: &mut Vec<String>, name: &str) -> bool {
    match list.iter().position(|x| x == name) {
        Some(i) => {
            list.remove(i);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> Queue {
        Queue::new(1, "chat", vec!["owner".to_string(), "creator".to_string()])
    }

    #[test]
    fn new_queue_is_active_and_empty() {
        let q = queue();
        assert!(q.is_active);
        assert!(q.users.is_empty());
        assert_eq!(q.admins, vec!["owner", "creator"]);
        assert_eq!(q.cooldown, DEFAULT_COOLDOWN);
        assert_eq!(q.message_id, 0);
    }

    #[test]
    fn new_queue_drops_duplicate_admins() {
        let q = Queue::new(1, "chat", vec!["owner".to_string(), "owner".to_string()]);
        assert_eq!(q.admins, vec!["owner"]);
    }

    #[test]
    fn add_then_remove_restores_users() {
        let mut q = queue();
        q.add_user("alice");
        let before = q.users.clone();

        assert!(q.add_user("bob"));
        assert!(q.remove_user("bob"));
        assert_eq!(q.users, before);

        assert!(!q.remove_user("bob"));
        assert_eq!(q.users, before);
    }

    #[test]
    fn add_user_never_duplicates() {
        let mut q = queue();
        for name in &["alice", "bob", "alice", "carol", "bob", "alice"] {
            q.add_user(name);
        }
        assert_eq!(q.users, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn pop_front_takes_head() {
        let mut q = queue();
        assert_eq!(q.pop_front(), None);
        q.add_user("alice");
        q.add_user("bob");
        assert_eq!(q.pop_front().as_deref(), Some("alice"));
        assert_eq!(q.users, vec!["bob"]);
    }

    #[test]
    fn reset_keeps_admins() {
        let mut q = queue();
        q.add_user("alice");
        q.add_admin("alice");
        q.reset();
        assert!(q.users.is_empty());
        assert!(q.is_admin("alice"));
    }

    #[test]
    fn admin_membership_is_symmetric() {
        let mut q = queue();
        assert!(!q.add_admin("owner"));
        assert!(q.add_admin("dave"));
        assert!(q.remove_admin("dave"));
        assert!(!q.remove_admin("dave"));
        assert!(!q.is_admin("dave"));
    }
}
