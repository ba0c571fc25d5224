use crate::common::types::MemberId;
use crate::common::view::ClusterView;

/// The leader when known, then every follower.
pub fn leader_first(view: &ClusterView) -> Vec<MemberId> {
    let mut selected = Vec::with_capacity(view.members().len());
    if let Some(leader) = view.leader() {
        selected.push(leader.clone());
    }
    selected.extend(view.followers().cloned());
    selected
}

/// Only the leader when known. Without one, any member may redirect us, so
/// every member is a candidate.
pub fn leader_only(view: &ClusterView) -> Vec<MemberId> {
    match view.leader() {
        Some(leader) => vec![leader.clone()],
        None => view.members().iter().cloned().collect(),
    }
}
