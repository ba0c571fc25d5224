use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};

use crate::common::types::MemberId;
use crate::common::view::ClusterView;

/// Slots the owning selector publishes into and handles read from.
pub(crate) struct Published {
    pub(crate) view: ArcSwap<ClusterView>,
    pub(crate) selection: ArcSwapOption<MemberId>,
}

impl Published {
    pub(crate) fn new(view: ClusterView) -> Self {
        Self {
            view: ArcSwap::from_pointee(view),
            selection: ArcSwapOption::empty(),
        }
    }
}

/// Read-only view of a [`MemberSelector`](super::MemberSelector) for other
/// threads, e.g. for diagnostics.
///
/// Reads never block the owner. A value read here may already be superseded
/// by the time it is used.
#[derive(Clone)]
pub struct SelectorHandle {
    pub(crate) published: Arc<Published>,
}

impl SelectorHandle {
    pub fn current(&self) -> Option<MemberId> {
        self.published.selection.load_full().map(|id| (*id).clone())
    }

    pub fn view(&self) -> Arc<ClusterView> {
        self.published.view.load_full()
    }

    pub fn leader(&self) -> Option<MemberId> {
        self.published.view.load().leader().cloned()
    }

    pub fn members(&self) -> BTreeSet<MemberId> {
        self.published.view.load().members().clone()
    }
}

impl fmt::Debug for SelectorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorHandle")
            .field("leader", &self.leader())
            .field("current", &self.current())
            .finish()
    }
}
