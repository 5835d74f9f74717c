//! Group registry
//!
//! Group name → member set. Groups hold nicknames only, never connection
//! handles; members are resolved through the session registry at delivery
//! time. A group exists exactly while it has at least one member: created
//! lazily on `create`, deleted in the same step that empties it.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::types::{GroupName, Nickname};

/// Group operation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GroupError {
    /// `create` on a name that already has members
    #[error("group already exists")]
    AlreadyExists,
    /// `join` on a name with no group behind it
    #[error("group does not exist")]
    NotFound,
    /// `leave` by a nickname outside the member set
    #[error("not a member of that group")]
    NotMember,
}

/// Group name → member set map.
///
/// Owned exclusively by the `ChatServer` actor; each method is one atomic
/// step, including the emptiness check that deletes a drained group.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: HashMap<GroupName, BTreeSet<Nickname>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group with the caller as sole member.
    ///
    /// No side effects on `AlreadyExists`.
    pub fn create(&mut self, group: GroupName, nickname: Nickname) -> Result<(), GroupError> {
        if self.groups.contains_key(&group) {
            return Err(GroupError::AlreadyExists);
        }
        self.groups.insert(group, BTreeSet::from([nickname]));
        Ok(())
    }

    /// Add the caller to an existing group. Joining twice is a no-op success.
    pub fn join(&mut self, group: &GroupName, nickname: Nickname) -> Result<(), GroupError> {
        let members = self.groups.get_mut(group).ok_or(GroupError::NotFound)?;
        members.insert(nickname);
        Ok(())
    }

    /// Remove the caller; a group emptied by this call is deleted in the
    /// same step.
    pub fn leave(&mut self, group: &GroupName, nickname: &Nickname) -> Result<(), GroupError> {
        let members = self.groups.get_mut(group).ok_or(GroupError::NotMember)?;
        if !members.remove(nickname) {
            return Err(GroupError::NotMember);
        }
        if members.is_empty() {
            self.groups.remove(group);
        }
        Ok(())
    }

    /// Point-in-time copy of a group's member set (empty if the group does
    /// not exist). Fan-out works from this copy so concurrent membership
    /// changes cannot affect an in-flight send.
    pub fn members_of(&self, group: &GroupName) -> BTreeSet<Nickname> {
        self.groups.get(group).cloned().unwrap_or_default()
    }

    /// Consistent snapshot of every group with its sorted member list.
    pub fn list_all(&self) -> Vec<(GroupName, Vec<Nickname>)> {
        let mut listing: Vec<(GroupName, Vec<Nickname>)> = self
            .groups
            .iter()
            .map(|(group, members)| (group.clone(), members.iter().cloned().collect()))
            .collect();
        listing.sort_by(|a, b| a.0.cmp(&b.0));
        listing
    }

    /// Disconnect cascade: remove the nickname from every group it belongs
    /// to, deleting any group left empty. Mirrors `leave` for all groups in
    /// one atomic step.
    pub fn purge(&mut self, nickname: &Nickname) {
        self.groups.retain(|_, members| {
            members.remove(nickname);
            !members.is_empty()
        });
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nick(s: &str) -> Nickname {
        Nickname::parse(s).unwrap()
    }

    fn team() -> GroupName {
        GroupName::new("team")
    }

    #[test]
    fn test_create_then_join_builds_member_set() {
        let mut registry = GroupRegistry::new();
        registry.create(team(), nick("A")).unwrap();
        assert_eq!(registry.members_of(&team()), BTreeSet::from([nick("A")]));

        registry.join(&team(), nick("B")).unwrap();
        assert_eq!(
            registry.members_of(&team()),
            BTreeSet::from([nick("A"), nick("B")])
        );
    }

    #[test]
    fn test_create_existing_group_fails_without_side_effects() {
        let mut registry = GroupRegistry::new();
        registry.create(team(), nick("A")).unwrap();
        assert_eq!(
            registry.create(team(), nick("B")),
            Err(GroupError::AlreadyExists)
        );
        assert_eq!(registry.members_of(&team()), BTreeSet::from([nick("A")]));
    }

    #[test]
    fn test_join_missing_group_fails() {
        let mut registry = GroupRegistry::new();
        assert_eq!(registry.join(&team(), nick("A")), Err(GroupError::NotFound));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut registry = GroupRegistry::new();
        registry.create(team(), nick("A")).unwrap();
        registry.join(&team(), nick("B")).unwrap();
        registry.join(&team(), nick("B")).unwrap();
        assert_eq!(
            registry.members_of(&team()),
            BTreeSet::from([nick("A"), nick("B")])
        );
    }

    #[test]
    fn test_last_leave_deletes_group() {
        let mut registry = GroupRegistry::new();
        registry.create(team(), nick("A")).unwrap();
        registry.join(&team(), nick("B")).unwrap();

        registry.leave(&team(), &nick("A")).unwrap();
        assert_eq!(registry.members_of(&team()), BTreeSet::from([nick("B")]));

        registry.leave(&team(), &nick("B")).unwrap();
        assert!(registry.list_all().is_empty());
    }

    #[test]
    fn test_leave_by_non_member_fails() {
        let mut registry = GroupRegistry::new();
        registry.create(team(), nick("A")).unwrap();
        assert_eq!(
            registry.leave(&team(), &nick("B")),
            Err(GroupError::NotMember)
        );
        assert_eq!(
            registry.leave(&GroupName::new("ghost"), &nick("A")),
            Err(GroupError::NotMember)
        );
        assert_eq!(registry.members_of(&team()), BTreeSet::from([nick("A")]));
    }

    #[test]
    fn test_members_of_returns_detached_copy() {
        let mut registry = GroupRegistry::new();
        registry.create(team(), nick("A")).unwrap();
        let snapshot = registry.members_of(&team());

        registry.join(&team(), nick("B")).unwrap();
        assert_eq!(snapshot, BTreeSet::from([nick("A")]));
    }

    #[test]
    fn test_purge_removes_from_all_groups() {
        let mut registry = GroupRegistry::new();
        registry.create(team(), nick("A")).unwrap();
        registry.join(&team(), nick("B")).unwrap();
        registry.create(GroupName::new("solo"), nick("A")).unwrap();

        registry.purge(&nick("A"));

        assert_eq!(registry.members_of(&team()), BTreeSet::from([nick("B")]));
        // "solo" emptied out, so it is gone entirely
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_list_all_sorted() {
        let mut registry = GroupRegistry::new();
        registry.create(GroupName::new("zeta"), nick("C")).unwrap();
        registry.create(team(), nick("B")).unwrap();
        registry.join(&team(), nick("A")).unwrap();

        let listing = registry.list_all();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].0, team());
        assert_eq!(listing[0].1, vec![nick("A"), nick("B")]);
        assert_eq!(listing[1].0, GroupName::new("zeta"));
    }
}
