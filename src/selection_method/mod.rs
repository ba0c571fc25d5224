use std::fmt;

use serde::Deserialize;

use crate::common::types::MemberId;
use crate::common::view::ClusterView;

pub mod followers;
pub mod leader;
pub mod random;

/// Turns a cluster view into the ordered candidates for one selection pass.
///
/// Implementations must be pure: the output depends only on the view, holds
/// no duplicates, and only names members of the view.
pub trait SelectionStrategy {
    fn select(&self, view: &ClusterView) -> Vec<MemberId>;
}

impl<F> SelectionStrategy for F
where
    F: Fn(&ClusterView) -> Vec<MemberId>,
{
    fn select(&self, view: &ClusterView) -> Vec<MemberId> {
        self(view)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    #[serde(rename = "any")]
    Any,
    #[default]
    #[serde(rename = "leader-first")]
    LeaderFirst,
    #[serde(rename = "leader")]
    Leader,
    #[serde(rename = "followers-only")]
    FollowersOnly,
    #[serde(rename = "random")]
    Random,
}

impl SelectionStrategy for SelectionPolicy {
    fn select(&self, view: &ClusterView) -> Vec<MemberId> {
        match self {
            SelectionPolicy::Any => any(view),
            SelectionPolicy::LeaderFirst => leader::leader_first(view),
            SelectionPolicy::Leader => leader::leader_only(view),
            SelectionPolicy::FollowersOnly => followers::followers_only(view),
            SelectionPolicy::Random => random::shuffled(view),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionPolicy::Any => "any",
            SelectionPolicy::LeaderFirst => "leader-first",
            SelectionPolicy::Leader => "leader",
            SelectionPolicy::FollowersOnly => "followers-only",
            SelectionPolicy::Random => "random",
        };
        f.write_str(name)
    }
}

/// Every member, no role preference.
pub fn any(view: &ClusterView) -> Vec<MemberId> {
    view.members().iter().cloned().collect()
}
