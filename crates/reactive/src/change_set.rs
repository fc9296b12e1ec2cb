//! Change set for describing live result mutations.
//!
//! A ChangeSet is the notification payload delivered to listeners. It lists
//! positions rather than rows, so listeners read the live result set itself
//! to see the new contents.

/// Index-based description of a mutation of a live result set.
///
/// - `insertions`: positions of newly inserted elements
/// - `deletions`: positions of removed elements
/// - `modifications`: positions of elements updated in place
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Positions that were inserted
    pub insertions: Vec<usize>,
    /// Positions that were deleted
    pub deletions: Vec<usize>,
    /// Positions that were modified
    pub modifications: Vec<usize>,
}

impl ChangeSet {
    /// Creates a new empty change set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a change set from explicit index lists.
    pub fn from_parts(
        insertions: Vec<usize>,
        deletions: Vec<usize>,
        modifications: Vec<usize>,
    ) -> Self {
        Self {
            insertions,
            deletions,
            modifications,
        }
    }

    /// Creates a change set with a single insertion.
    pub fn inserted(index: usize) -> Self {
        Self {
            insertions: vec![index],
            ..Self::default()
        }
    }

    /// Creates a change set with a single deletion.
    pub fn deleted(index: usize) -> Self {
        Self {
            deletions: vec![index],
            ..Self::default()
        }
    }

    /// Creates a change set with a single modification.
    pub fn modified(index: usize) -> Self {
        Self {
            modifications: vec![index],
            ..Self::default()
        }
    }

    /// Returns true if no insertion, deletion or modification is recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.deletions.is_empty() && self.modifications.is_empty()
    }

    /// Returns the total number of recorded changes.
    #[inline]
    pub fn len(&self) -> usize {
        self.insertions.len() + self.deletions.len() + self.modifications.len()
    }

    /// Merges another change set into this one.
    pub fn merge(&mut self, other: ChangeSet) {
        self.insertions.extend(other.insertions);
        self.deletions.extend(other.deletions);
        self.modifications.extend(other.modifications);
    }

    /// Clears all changes.
    pub fn clear(&mut self) {
        self.insertions.clear();
        self.deletions.clear();
        self.modifications.clear();
    }

    /// Records an insertion.
    #[inline]
    pub fn insert(&mut self, index: usize) {
        self.insertions.push(index);
    }

    /// Records a deletion.
    #[inline]
    pub fn delete(&mut self, index: usize) {
        self.deletions.push(index);
    }

    /// Records a modification.
    #[inline]
    pub fn modify(&mut self, index: usize) {
        self.modifications.push(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_set_new() {
        let cs = ChangeSet::new();
        assert!(cs.is_empty());
        assert_eq!(cs.len(), 0);
    }

    #[test]
    fn test_change_set_single() {
        assert_eq!(ChangeSet::inserted(0).insertions, vec![0]);
        assert_eq!(ChangeSet::deleted(2).deletions, vec![2]);
        assert_eq!(ChangeSet::modified(1).modifications, vec![1]);
        assert!(!ChangeSet::modified(1).is_empty());
    }

    #[test]
    fn test_change_set_from_parts() {
        let cs = ChangeSet::from_parts(vec![0, 1], vec![4], vec![]);
        assert_eq!(cs.len(), 3);
        assert!(cs.modifications.is_empty());
    }

    #[test]
    fn test_change_set_merge() {
        let mut cs1 = ChangeSet::inserted(0);
        let mut cs2 = ChangeSet::new();
        cs2.insert(1);
        cs2.delete(3);

        cs1.merge(cs2);

        assert_eq!(cs1.insertions, vec![0, 1]);
        assert_eq!(cs1.deletions, vec![3]);
    }

    #[test]
    fn test_change_set_clear() {
        let mut cs = ChangeSet::new();
        cs.insert(0);
        cs.modify(2);

        assert!(!cs.is_empty());
        cs.clear();
        assert!(cs.is_empty());
    }
}
