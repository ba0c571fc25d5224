use rand::seq::SliceRandom;

use crate::common::types::MemberId;
use crate::common::view::ClusterView;

/// Every member, in an order drawn fresh for each pass.
pub fn shuffled(view: &ClusterView) -> Vec<MemberId> {
    let mut selected: Vec<MemberId> = view.members().iter().cloned().collect();
    selected.shuffle(&mut rand::thread_rng());
    selected
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn covers_every_member_once() {
        let members: Vec<MemberId> = (0..16).map(|i| MemberId::new(format!("m{i}"))).collect();
        let view = ClusterView::new(Some("m3".into()), members.clone()).unwrap();

        let selected = shuffled(&view);
        assert_eq!(selected.len(), members.len());
        let unique: BTreeSet<_> = selected.into_iter().collect();
        assert_eq!(&unique, view.members());
    }
}
