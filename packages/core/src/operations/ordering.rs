//! Dense sibling ordering
//!
//! Tabs, sections, and items all live in ordered sequences whose `order`
//! field must equal the node's position (0, 1, 2, … with no gaps). The
//! helpers here are generic over [`Ordered`] so every level of the tree
//! shares one implementation of renumbering, moving, and reordering.

use crate::models::{ContentItem, Section, Tab};
use std::collections::HashSet;
use tracing::debug;

/// A sibling in an ordered sequence
pub trait Ordered {
    fn id(&self) -> &str;
    fn order(&self) -> usize;
    fn set_order(&mut self, order: usize);
}

macro_rules! impl_ordered {
    ($($ty:ty),*) => {
        $(
            impl Ordered for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn order(&self) -> usize {
                    self.order
                }

                fn set_order(&mut self, order: usize) {
                    self.order = order;
                }
            }
        )*
    };
}

impl_ordered!(Tab, Section, ContentItem);

/// Reassign `order` as position in the sequence
pub fn renumber<T: Ordered>(siblings: &mut [T]) {
    for (position, sibling) in siblings.iter_mut().enumerate() {
        sibling.set_order(position);
    }
}

/// Check that `order` matches position for every sibling
pub fn is_dense<T: Ordered>(siblings: &[T]) -> bool {
    siblings
        .iter()
        .enumerate()
        .all(|(position, sibling)| sibling.order() == position)
}

/// Position of the first sibling with the given id
///
/// Duplicate ids are not rejected at this layer; the earlier sibling shadows
/// later ones in every lookup.
pub fn position_of<T: Ordered>(siblings: &[T], id: &str) -> Option<usize> {
    siblings.iter().position(|sibling| sibling.id() == id)
}

/// Append a sibling with `order` equal to the current sibling count
pub fn append<T: Ordered>(siblings: &mut Vec<T>, mut sibling: T) {
    sibling.set_order(siblings.len());
    siblings.push(sibling);
}

/// Remove the sibling at `index` and close the gap
pub fn remove_at<T: Ordered>(siblings: &mut Vec<T>, index: usize) -> T {
    let removed = siblings.remove(index);
    renumber(siblings);
    removed
}

/// Move the sibling at `from` to position `to` (clamped to the end)
pub fn move_to<T: Ordered>(siblings: &mut Vec<T>, from: usize, to: usize) {
    let sibling = siblings.remove(from);
    let to = to.min(siblings.len());
    siblings.insert(to, sibling);
    renumber(siblings);
}

/// Rearrange siblings to follow `ordered_ids`
///
/// Listed ids come first, in list order. Ids that match no sibling, and
/// repeats of an id already placed, are ignored. Siblings missing from the
/// list are kept and follow the listed ones in their previous relative order,
/// so a partial list never deletes anything.
pub fn reorder_by_ids<T: Ordered, S: AsRef<str>>(siblings: &mut Vec<T>, ordered_ids: &[S]) {
    let mut remaining: Vec<Option<T>> = siblings.drain(..).map(Some).collect();
    let mut placed: HashSet<String> = HashSet::new();
    let mut reordered = Vec::with_capacity(remaining.len());

    for id in ordered_ids {
        let id = id.as_ref();
        if !placed.insert(id.to_string()) {
            debug!("Ignoring repeated id '{}' in reorder list", id);
            continue;
        }
        let slot = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|sibling| sibling.id() == id));
        match slot.and_then(Option::take) {
            Some(sibling) => reordered.push(sibling),
            None => debug!("Ignoring unknown id '{}' in reorder list", id),
        }
    }

    reordered.extend(remaining.into_iter().flatten());
    renumber(&mut reordered);
    *siblings = reordered;
}
