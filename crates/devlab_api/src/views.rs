//! Response representations with related users expanded.
//!
//! Each view flattens the stored record and adds `UserSummary` entries for
//! the ids it references, so clients never need a second lookup.

use devlab_core::{
    Participation, Project, RepoResult, Task, Team, UserId, UserRepository, UserSummary,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub creator: Option<UserSummary>,
    pub advisor: Option<UserSummary>,
}

impl ProjectView {
    pub fn load(store: &impl UserRepository, project: Project) -> RepoResult<Self> {
        Ok(Self {
            creator: summary(store, Some(project.creator_id))?,
            advisor: summary(store, project.advisor_id)?,
            project,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamView {
    #[serde(flatten)]
    pub team: Team,
    pub leader: Option<UserSummary>,
    pub members: Vec<UserSummary>,
}

impl TeamView {
    pub fn load(store: &impl UserRepository, team: Team) -> RepoResult<Self> {
        let mut members = Vec::with_capacity(team.member_ids.len());
        for id in &team.member_ids {
            if let Some(member) = summary(store, Some(*id))? {
                members.push(member);
            }
        }
        Ok(Self {
            leader: summary(store, team.leader_id)?,
            members,
            team,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub responsible: Option<UserSummary>,
}

impl TaskView {
    pub fn load(store: &impl UserRepository, task: Task) -> RepoResult<Self> {
        Ok(Self {
            responsible: summary(store, task.responsible_id)?,
            task,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticipationView {
    #[serde(flatten)]
    pub participation: Participation,
    pub user: Option<UserSummary>,
}

impl ParticipationView {
    pub fn load(store: &impl UserRepository, participation: Participation) -> RepoResult<Self> {
        Ok(Self {
            user: summary(store, Some(participation.user_id))?,
            participation,
        })
    }
}

/// Loads views for every item, stopping at the first storage failure.
pub fn load_all<T, V>(
    items: Vec<T>,
    load: impl FnMut(T) -> RepoResult<V>,
) -> RepoResult<Vec<V>> {
    items.into_iter().map(load).collect()
}

fn summary(store: &impl UserRepository, id: Option<UserId>) -> RepoResult<Option<UserSummary>> {
    match id {
        Some(id) => Ok(store.get_user(id)?.map(|user| user.summary())),
        None => Ok(None),
    }
}
