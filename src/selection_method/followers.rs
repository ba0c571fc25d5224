use crate::common::types::MemberId;
use crate::common::view::ClusterView;

/// Every member except the leader.
///
/// Falls back to the full membership when no leader is known or when the
/// leader is the only member, so a pass never starts out empty.
pub fn followers_only(view: &ClusterView) -> Vec<MemberId> {
    let followers: Vec<MemberId> = view.followers().cloned().collect();
    if followers.is_empty() {
        return view.members().iter().cloned().collect();
    }
    followers
}
