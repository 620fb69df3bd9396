//! In-memory directory
//!
//! A process-local [`DirectoryClient`] used for development mode and tests.
//! Records every membership mutation and can be told to fail lookups or
//! mutations on chosen groups.

use std::collections::{BTreeSet, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use crate::client::DirectoryClient;
use crate::error::{DirectoryError, Result};
use crate::membership::Direction;
use crate::model::{DirectoryGroup, DirectoryUser, GroupMember, NewGroup, NewUser};

/// One membership write observed by the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub direction: Direction,
    pub user_id: String,
    pub group_id: String,
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: DirectoryUser,
    password: String,
}

#[derive(Default)]
struct State {
    users: Vec<StoredUser>,
    groups: Vec<DirectoryGroup>,
    /// (user_id, group_id)
    memberships: BTreeSet<(String, String)>,
    next_id: u64,
    fail_lookups: bool,
    failing_groups: HashSet<String>,
    mutations: Vec<Mutation>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:05}", prefix, self.next_id)
    }

    fn has_user(&self, user_id: &str) -> bool {
        self.users.iter().any(|u| u.user.id == user_id)
    }

    fn has_group(&self, group_id: &str) -> bool {
        self.groups.iter().any(|g| g.id == group_id)
    }

    fn check_mutation(&self, user_id: &str, group_id: &str) -> Result<()> {
        if self.failing_groups.contains(group_id) {
            return Err(DirectoryError::status(500, format!("simulated failure for group {}", group_id)));
        }
        if !self.has_user(user_id) {
            return Err(DirectoryError::not_found("User", user_id));
        }
        if !self.has_group(group_id) {
            return Err(DirectoryError::not_found("Group", group_id));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDirectory {
    state: Mutex<State>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory with a few users and groups for local development.
    /// The console login is `admin@example.com` / `admin`.
    pub fn seeded() -> Self {
        let directory = Self::new();
        let admin = directory.insert_user(
            NewUser {
                first_name: "Admin".to_string(),
                last_name: "User".to_string(),
                email: "admin@example.com".to_string(),
                password: "admin".to_string(),
            },
            Some("IT"),
        );
        let engineer = directory.insert_user(
            NewUser {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                password: "changeme".to_string(),
            },
            Some("Engineering"),
        );
        let admins = directory.insert_group("Administrators");
        let engineering = directory.insert_group("Engineering");
        directory.insert_group("Finance");

        directory.insert_membership(&admin, &admins);
        directory.insert_membership(&engineer, &engineering);

        info!("Seeded in-memory directory with development data");
        directory
    }

    /// Insert a user directly, returning its id.
    pub fn insert_user(&self, user: NewUser, title: Option<&str>) -> String {
        let mut state = self.state.lock();
        let id = state.next_id("00u");
        state.users.push(StoredUser {
            user: DirectoryUser {
                id: id.clone(),
                display_name: user.display_name(),
                title: title.unwrap_or("No Title").to_string(),
                login: user.email,
            },
            password: user.password,
        });
        id
    }

    /// Insert a group directly, returning its id.
    pub fn insert_group(&self, name: &str) -> String {
        let mut state = self.state.lock();
        let id = state.next_id("00g");
        state.groups.push(DirectoryGroup {
            id: id.clone(),
            name: name.to_string(),
        });
        id
    }

    /// Insert a membership without recording a mutation.
    pub fn insert_membership(&self, user_id: &str, group_id: &str) {
        self.state
            .lock()
            .memberships
            .insert((user_id.to_string(), group_id.to_string()));
    }

    /// Make `groups_for_user` fail.
    pub fn set_fail_lookups(&self, fail: bool) {
        self.state.lock().fail_lookups = fail;
    }

    /// Make every add or remove touching `group_id` fail.
    pub fn fail_mutations_for(&self, group_id: &str) {
        self.state.lock().failing_groups.insert(group_id.to_string());
    }

    /// Membership writes observed so far, including rejected ones.
    pub fn mutations(&self) -> Vec<Mutation> {
        self.state.lock().mutations.clone()
    }

    pub fn clear_mutations(&self) {
        self.state.lock().mutations.clear();
    }

    /// Group ids of a user, straight from the store.
    pub fn membership_ids(&self, user_id: &str) -> HashSet<String> {
        self.state
            .lock()
            .memberships
            .iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, g)| g.clone())
            .collect()
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    fn provider_type(&self) -> &'static str {
        "memory"
    }

    async fn list_users(&self) -> Result<Vec<DirectoryUser>> {
        Ok(self.state.lock().users.iter().map(|u| u.user.clone()).collect())
    }

    async fn list_groups(&self) -> Result<Vec<DirectoryGroup>> {
        Ok(self.state.lock().groups.clone())
    }

    async fn get_group(&self, group_id: &str) -> Result<DirectoryGroup> {
        self.state
            .lock()
            .groups
            .iter()
            .find(|g| g.id == group_id)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found("Group", group_id))
    }

    async fn groups_for_user(&self, user_id: &str) -> Result<Vec<DirectoryGroup>> {
        let state = self.state.lock();
        if state.fail_lookups {
            return Err(DirectoryError::status(503, "simulated lookup failure"));
        }
        if !state.has_user(user_id) {
            return Err(DirectoryError::not_found("User", user_id));
        }
        Ok(state
            .groups
            .iter()
            .filter(|g| state.memberships.contains(&(user_id.to_string(), g.id.clone())))
            .cloned()
            .collect())
    }

    async fn group_members(&self, group_id: &str) -> Result<Vec<GroupMember>> {
        let state = self.state.lock();
        if !state.has_group(group_id) {
            return Err(DirectoryError::not_found("Group", group_id));
        }
        Ok(state
            .users
            .iter()
            .filter(|u| state.memberships.contains(&(u.user.id.clone(), group_id.to_string())))
            .map(|u| GroupMember {
                id: u.user.id.clone(),
                display_name: u.user.display_name.clone(),
                login: u.user.login.clone(),
            })
            .collect())
    }

    async fn create_user(&self, user: &NewUser) -> Result<String> {
        Ok(self.insert_user(user.clone(), None))
    }

    async fn create_group(&self, group: &NewGroup) -> Result<String> {
        Ok(self.insert_group(&group.name))
    }

    async fn add_member(&self, user_id: &str, group_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.mutations.push(Mutation {
            direction: Direction::Add,
            user_id: user_id.to_string(),
            group_id: group_id.to_string(),
        });
        state.check_mutation(user_id, group_id)?;
        state
            .memberships
            .insert((user_id.to_string(), group_id.to_string()));
        Ok(())
    }

    async fn remove_member(&self, user_id: &str, group_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.mutations.push(Mutation {
            direction: Direction::Remove,
            user_id: user_id.to_string(),
            group_id: group_id.to_string(),
        });
        state.check_mutation(user_id, group_id)?;
        state
            .memberships
            .remove(&(user_id.to_string(), group_id.to_string()));
        Ok(())
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        if !state.has_user(user_id) {
            return Err(DirectoryError::not_found("User", user_id));
        }
        state.users.retain(|u| u.user.id != user_id);
        state.memberships.retain(|(u, _)| u != user_id);
        Ok(())
    }

    async fn delete_group(&self, group_id: &str) -> Result<()> {
        let mut state = self.state.lock();
        if !state.has_group(group_id) {
            return Err(DirectoryError::not_found("Group", group_id));
        }
        state.groups.retain(|g| g.id != group_id);
        state.memberships.retain(|(_, g)| g != group_id);
        Ok(())
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<DirectoryUser>> {
        Ok(self
            .state
            .lock()
            .users
            .iter()
            .find(|u| u.user.login == login)
            .map(|u| u.user.clone()))
    }

    async fn authenticate(&self, username: &str, password: &str) -> bool {
        self.state
            .lock()
            .users
            .iter()
            .any(|u| u.user.login == username && u.password == password)
    }
}
