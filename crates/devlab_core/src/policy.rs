//! Access policy predicates consulted by every mutating service call.
//!
//! # Responsibility
//! - Answer role and ownership questions without touching storage.
//!
//! # Invariants
//! - Predicates are pure: the same inputs always give the same answer.
//! - Staff accounts pass every ownership check.

use crate::model::project::Project;
use crate::model::task::Task;
use crate::model::user::{User, UserId, UserRole};

/// A record whose writes are guarded by ownership.
pub trait Owned {
    /// Owning user (creator), when the record has one.
    fn owner_id(&self) -> Option<UserId>;

    /// User accountable for the record, when distinct from the owner.
    fn responsible_id(&self) -> Option<UserId> {
        None
    }
}

impl Owned for Project {
    fn owner_id(&self) -> Option<UserId> {
        Some(self.creator_id)
    }
}

impl Owned for Task {
    fn owner_id(&self) -> Option<UserId> {
        None
    }

    fn responsible_id(&self) -> Option<UserId> {
        self.responsible_id
    }
}

impl Owned for User {
    fn owner_id(&self) -> Option<UserId> {
        Some(self.id)
    }
}

/// True when `actor` is staff, owns `resource`, or is responsible for it.
pub fn can_write(actor: &User, resource: &impl Owned) -> bool {
    actor.is_staff
        || resource.owner_id() == Some(actor.id)
        || resource.responsible_id() == Some(actor.id)
}

pub fn is_role(actor: &User, role: UserRole) -> bool {
    actor.is_role(role)
}

/// True when `actor` created `project`.
pub fn is_creator(actor: &User, project: &Project) -> bool {
    project.creator_id == actor.id
}

/// Public projects are readable by anyone; private ones by any signed-in user.
pub fn can_read_project(actor: Option<&User>, project: &Project) -> bool {
    project.is_public || actor.is_some()
}

/// Creating projects is closed to read-only visitor accounts.
pub fn can_create_project(actor: &User) -> bool {
    !is_role(actor, UserRole::Visitor)
}

/// Team writes: staff, coordinators, and the creator of the team's project.
pub fn can_manage_team(actor: &User, project: &Project) -> bool {
    actor.is_staff || is_role(actor, UserRole::Coordinator) || is_creator(actor, project)
}

/// Coordinators and staff see every team; others only teams of projects they
/// actively take part in.
pub fn can_view_team(actor: &User, project: &Project, is_participant: bool) -> bool {
    actor.is_staff
        || is_role(actor, UserRole::Coordinator)
        || is_creator(actor, project)
        || is_participant
}

/// Users edit their own profile; staff edit anyone's.
pub fn can_edit_profile(actor: &User, target: &User) -> bool {
    can_write(actor, target)
}

#[cfg(test)]
mod tests {
    use super::{can_manage_team, can_read_project, can_view_team, can_write};
    use crate::model::project::Project;
    use crate::model::task::Task;
    use crate::model::user::{User, UserRole};

    fn user(role: UserRole) -> User {
        User::new(
            format!("{}-user", role.as_str()),
            format!("{}@example.com", role.as_str()),
            "Someone",
            role,
        )
    }

    #[test]
    fn creator_and_staff_can_write_project() {
        let coordinator = user(UserRole::Coordinator);
        let stranger = user(UserRole::Student);
        let mut staff = user(UserRole::Professor);
        staff.is_staff = true;
        let project = Project::new("Compilers", coordinator.id);

        assert!(can_write(&coordinator, &project));
        assert!(can_write(&staff, &project));
        assert!(!can_write(&stranger, &project));
    }

    #[test]
    fn responsible_can_write_task() {
        let student = user(UserRole::Student);
        let other = user(UserRole::Student);
        let mut task = Task::new("Draft");
        task.responsible_id = Some(student.id);

        assert!(can_write(&student, &task));
        assert!(!can_write(&other, &task));
    }

    #[test]
    fn private_projects_require_authentication() {
        let coordinator = user(UserRole::Coordinator);
        let mut project = Project::new("Compilers", coordinator.id);
        assert!(!can_read_project(None, &project));
        assert!(can_read_project(Some(&coordinator), &project));

        project.is_public = true;
        assert!(can_read_project(None, &project));
    }

    #[test]
    fn team_rules_follow_role_and_participation() {
        let creator = user(UserRole::Professor);
        let coordinator = user(UserRole::Coordinator);
        let student = user(UserRole::Student);
        let project = Project::new("Compilers", creator.id);

        assert!(can_manage_team(&creator, &project));
        assert!(can_manage_team(&coordinator, &project));
        assert!(!can_manage_team(&student, &project));

        assert!(!can_view_team(&student, &project, false));
        assert!(can_view_team(&student, &project, true));
    }
}
