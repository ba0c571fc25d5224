use std::collections::BTreeSet;

use super::error::{Result, SelectorError};
use super::types::MemberId;

/// What the caller currently believes about the cluster: who leads, and who
/// is a member.
///
/// A view always has at least one member, and its leader (if any) is one of
/// them. A leader that is not a member is dropped rather than rejected, since
/// leadership information is allowed to be stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterView {
    leader: Option<MemberId>,
    members: BTreeSet<MemberId>,
}

impl ClusterView {
    pub fn new<I, M>(leader: Option<MemberId>, members: I) -> Result<Self>
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        let members: BTreeSet<MemberId> = members.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Err(SelectorError::InvalidConfiguration(
                "members cannot be empty".into(),
            ));
        }

        let leader = leader.filter(|leader| members.contains(leader));

        Ok(Self { leader, members })
    }

    /// Like [`ClusterView::new`], but treats a missing member list as a
    /// configuration error too.
    pub fn from_parts<I, M>(leader: Option<MemberId>, members: Option<I>) -> Result<Self>
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        match members {
            Some(members) => Self::new(leader, members),
            None => Err(SelectorError::InvalidConfiguration(
                "members must be provided".into(),
            )),
        }
    }

    pub fn leader(&self) -> Option<&MemberId> {
        self.leader.as_ref()
    }

    pub fn members(&self) -> &BTreeSet<MemberId> {
        &self.members
    }

    pub fn is_leader(&self, member: &MemberId) -> bool {
        self.leader.as_ref() == Some(member)
    }

    /// Members other than the known leader, in ascending order.
    pub fn followers(&self) -> impl Iterator<Item = &MemberId> + '_ {
        self.members.iter().filter(move |member| !self.is_leader(member))
    }

    /// Whether adopting `other` would materially change this view.
    ///
    /// Both views are already normalized, so this compares leaders and member
    /// sets; iteration order of the original input plays no part.
    pub fn differs_from(&self, other: &ClusterView) -> bool {
        self.leader != other.leader || self.members != other.members
    }
}
