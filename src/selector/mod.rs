use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::common::error::{Result, SelectorError};
use crate::common::types::MemberId;
use crate::common::view::ClusterView;
use crate::selection_method::{SelectionPolicy, SelectionStrategy};

pub mod handle;

pub use handle::SelectorHandle;

use handle::Published;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    /// No candidate has been handed out in this pass yet.
    Reset,
    /// Candidates remain in the pass.
    Iterating,
    /// The pass is exhausted.
    Complete,
}

/// Restartable cursor over the candidates a [`SelectionStrategy`] derives
/// from the current cluster view.
///
/// Mutation goes through `&mut self` and belongs to a single owner, normally
/// one retry loop. Other threads observe the selector through
/// [`MemberSelector::handle`].
pub struct MemberSelector<S = SelectionPolicy> {
    strategy: S,
    published: Arc<Published>,
    candidates: Vec<MemberId>,
    cursor: Option<usize>,
}

impl<S: SelectionStrategy> MemberSelector<S> {
    pub fn new<I, M>(leader: Option<MemberId>, members: I, strategy: S) -> Result<Self>
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        let view = ClusterView::new(leader, members)?;
        Ok(Self::with_view(view, strategy))
    }

    pub fn with_view(view: ClusterView, strategy: S) -> Self {
        let candidates = strategy.select(&view);
        debug!(leader = ?view.leader(), ?candidates, "computed selection pass");

        Self {
            strategy,
            published: Arc::new(Published::new(view)),
            candidates,
            cursor: None,
        }
    }

    pub fn state(&self) -> SelectorState {
        match self.cursor {
            None => SelectorState::Reset,
            Some(_) if self.has_next() => SelectorState::Iterating,
            Some(_) => SelectorState::Complete,
        }
    }

    /// The candidate most recently returned by [`MemberSelector::next`] in
    /// this pass.
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

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn handle(&self) -> SelectorHandle {
        SelectorHandle {
            published: Arc::clone(&self.published),
        }
    }

    pub fn has_next(&self) -> bool {
        self.remaining() > 0
    }

    /// Number of candidates left in the pass.
    pub fn remaining(&self) -> usize {
        self.candidates.len() - self.cursor.unwrap_or(0)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<MemberId> {
        let position = self.cursor.get_or_insert(0);
        let selection = self
            .candidates
            .get(*position)
            .cloned()
            .ok_or(SelectorError::ExhaustedSelection)?;
        *position += 1;

        trace!(%selection, "selected member");
        self.published.selection.store(Some(Arc::new(selection.clone())));
        Ok(selection)
    }

    /// Borrows the selector as an iterator over the rest of the pass.
    pub fn candidates(&mut self) -> Candidates<'_, S> {
        Candidates { selector: self }
    }

    /// Starts a fresh pass over the held view.
    pub fn reset(&mut self) -> &mut Self {
        let view = self.published.view.load_full();
        self.restart(&view);
        self
    }

    /// Adopts a new view of the cluster.
    ///
    /// An equivalent view leaves the selector untouched, including any pass
    /// in progress, and returns `Ok(false)`. A different view replaces the
    /// held one and restarts selection from [`SelectorState::Reset`].
    #[tracing::instrument(name = "Reconfigure selector", skip_all, err(Debug))]
    pub fn reset_with<I, M>(&mut self, leader: Option<MemberId>, members: I) -> Result<bool>
    where
        I: IntoIterator<Item = M>,
        M: Into<MemberId>,
    {
        let proposed = ClusterView::new(leader, members)?;
        if !self.published.view.load().differs_from(&proposed) {
            trace!("cluster view unchanged");
            return Ok(false);
        }

        let proposed = Arc::new(proposed);
        debug!(
            leader = ?proposed.leader(),
            members = proposed.members().len(),
            "cluster view changed"
        );
        self.published.view.store(Arc::clone(&proposed));
        self.restart(&proposed);
        Ok(true)
    }

    fn restart(&mut self, view: &ClusterView) {
        self.candidates = self.strategy.select(view);
        self.cursor = None;
        self.published.selection.store(None);
        debug!(leader = ?view.leader(), candidates = ?self.candidates, "computed selection pass");
    }
}

impl<S: fmt::Debug> fmt::Debug for MemberSelector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberSelector")
            .field("strategy", &self.strategy)
            .field("candidates", &self.candidates)
            .field("cursor", &self.cursor)
            .finish()
    }
}

/// Iterator over the remainder of a selection pass. See
/// [`MemberSelector::candidates`].
pub struct Candidates<'a, S> {
    selector: &'a mut MemberSelector<S>,
}

impl<S: SelectionStrategy> Iterator for Candidates<'_, S> {
    type Item = MemberId;

    fn next(&mut self) -> Option<MemberId> {
        self.selector.next().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.selector.remaining();
        (remaining, Some(remaining))
    }
}

impl<S: SelectionStrategy> ExactSizeIterator for Candidates<'_, S> {}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn ids(names: &[&str]) -> Vec<MemberId> {
        names.iter().map(|name| MemberId::from(*name)).collect()
    }

    fn selector(leader: &str, policy: SelectionPolicy) -> MemberSelector {
        MemberSelector::new(Some(leader.into()), ids(&["a", "b", "c"]), policy).unwrap()
    }

    #[test]
    fn starts_in_reset_without_selection() {
        let selector = selector("b", SelectionPolicy::LeaderFirst);
        assert_eq!(selector.state(), SelectorState::Reset);
        assert_eq!(selector.current(), None);
        assert!(selector.has_next());
        assert_eq!(selector.remaining(), 3);
    }

    #[test]
    fn walks_through_states() {
        let mut selector = selector("b", SelectionPolicy::LeaderFirst);

        assert_eq!(selector.next().unwrap(), MemberId::from("b"));
        assert_eq!(selector.state(), SelectorState::Iterating);
        selector.next().unwrap();
        selector.next().unwrap();
        assert_eq!(selector.state(), SelectorState::Complete);
        assert_eq!(selector.current(), Some(MemberId::from("c")));

        assert_eq!(selector.next(), Err(SelectorError::ExhaustedSelection));
        assert_eq!(selector.current(), Some(MemberId::from("c")));
        assert_eq!(selector.state(), SelectorState::Complete);
    }

    #[test]
    fn has_next_does_not_advance() {
        let mut selector = selector("b", SelectionPolicy::Leader);
        for _ in 0..5 {
            assert!(selector.has_next());
        }
        assert_eq!(selector.state(), SelectorState::Reset);

        selector.next().unwrap();
        for _ in 0..5 {
            assert!(!selector.has_next());
        }
        assert_eq!(selector.state(), SelectorState::Complete);
        assert_eq!(selector.current(), Some(MemberId::from("b")));
    }

    #[test]
    fn reset_starts_a_new_pass() {
        let mut selector = selector("a", SelectionPolicy::Any);
        let first: Vec<_> = selector.candidates().collect();
        assert_eq!(selector.state(), SelectorState::Complete);

        selector.reset();
        assert_eq!(selector.state(), SelectorState::Reset);
        assert_eq!(selector.current(), None);

        let second: Vec<_> = selector.candidates().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn reset_before_any_selection_stays_reset() {
        let mut selector = selector("a", SelectionPolicy::Any);
        selector.reset().reset();
        assert_eq!(selector.state(), SelectorState::Reset);
        assert_eq!(selector.remaining(), 3);
    }

    #[test]
    fn unchanged_view_preserves_pass() {
        let mut selector = selector("b", SelectionPolicy::LeaderFirst);
        selector.next().unwrap();

        let changed = selector
            .reset_with(Some("b".into()), ids(&["c", "a", "b"]))
            .unwrap();
        assert!(!changed);
        assert_eq!(selector.state(), SelectorState::Iterating);
        assert_eq!(selector.current(), Some(MemberId::from("b")));
        assert_eq!(selector.next().unwrap(), MemberId::from("a"));
    }

    #[test]
    fn stale_leader_in_update_is_normalized_before_comparison() {
        let mut selector =
            MemberSelector::new(None, ids(&["a", "b"]), SelectionPolicy::Any).unwrap();
        selector.next().unwrap();

        let changed = selector.reset_with(Some("z".into()), ids(&["a", "b"])).unwrap();
        assert!(!changed);
        assert_eq!(selector.state(), SelectorState::Iterating);
    }

    #[test]
    fn changed_membership_restarts() {
        let mut selector = selector("b", SelectionPolicy::LeaderFirst);
        selector.next().unwrap();

        let changed = selector
            .reset_with(Some("b".into()), ids(&["a", "b", "c", "d"]))
            .unwrap();
        assert!(changed);
        assert_eq!(selector.state(), SelectorState::Reset);
        assert_eq!(selector.current(), None);
        assert_eq!(selector.members().len(), 4);
        assert_eq!(selector.remaining(), 4);
    }

    #[test]
    fn invalid_update_keeps_previous_view() {
        let mut selector = selector("b", SelectionPolicy::LeaderFirst);
        selector.next().unwrap();

        let err = selector.reset_with(None, Vec::<MemberId>::new()).unwrap_err();
        assert!(matches!(err, SelectorError::InvalidConfiguration(_)));
        assert_eq!(selector.leader(), Some(MemberId::from("b")));
        assert_eq!(selector.state(), SelectorState::Iterating);
    }

    #[test]
    fn followers_only_single_node_yields_the_leader() {
        let mut selector =
            MemberSelector::new(Some("a".into()), ids(&["a"]), SelectionPolicy::FollowersOnly)
                .unwrap();
        assert_eq!(selector.next().unwrap(), MemberId::from("a"));
        assert!(!selector.has_next());
    }

    #[test]
    fn custom_strategy_is_used_for_every_pass() {
        let descending =
            |view: &ClusterView| -> Vec<MemberId> { view.members().iter().rev().cloned().collect() };
        let mut selector = MemberSelector::new(None, ids(&["a", "b", "c"]), descending).unwrap();
        assert_eq!(selector.candidates().collect::<Vec<_>>(), ids(&["c", "b", "a"]));

        selector.reset_with(None, ids(&["x", "y"])).unwrap();
        assert_eq!(selector.candidates().collect::<Vec<_>>(), ids(&["y", "x"]));
    }

    #[test]
    fn handle_observes_from_another_thread() {
        let mut selector = selector("b", SelectionPolicy::LeaderFirst);
        let handle = selector.handle();
        selector.next().unwrap();

        let observed = thread::spawn(move || (handle.current(), handle.leader(), handle.members()))
            .join()
            .unwrap();
        assert_eq!(observed.0, Some(MemberId::from("b")));
        assert_eq!(observed.1, Some(MemberId::from("b")));
        assert_eq!(observed.2.len(), 3);

        let handle = selector.handle();
        selector.reset_with(None, ids(&["d"])).unwrap();
        assert_eq!(handle.current(), None);
        assert_eq!(handle.leader(), None);
        assert_eq!(handle.view().members().len(), 1);
    }
}
