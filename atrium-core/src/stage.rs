//! The stage board: which page is showing on which stage.

use crate::id::ClassName;
use crate::sync::lock;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Stage handle → page currently attached to it.
///
/// A page is attached to at most one stage; attaching it elsewhere moves it.
/// Attaching to an occupied stage replaces the occupant.
#[derive(Debug, Default)]
pub struct StageBoard {
    occupants: Mutex<BTreeMap<String, ClassName>>,
}

impl StageBoard {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `page` to `stage`. Returns the page it replaced, if any.
    pub fn attach(&self, stage: &str, page: &ClassName) -> Option<ClassName> {
        let mut occupants = lock(&self.occupants);
        occupants.retain(|s, p| p != page || s == stage);
        occupants
            .insert(stage.to_owned(), page.clone())
            .filter(|previous| previous != page)
    }

    /// Detach `page` from `stage`, if it is the occupant.
    pub fn detach(&self, stage: &str, page: &ClassName) -> bool {
        let mut occupants = lock(&self.occupants);
        if occupants.get(stage) == Some(page) {
            occupants.remove(stage);
            true
        } else {
            false
        }
    }

    /// Detach `page` from whatever stage it is on.
    pub fn detach_everywhere(&self, page: &ClassName) -> bool {
        let mut occupants = lock(&self.occupants);
        let before = occupants.len();
        occupants.retain(|_, p| p != page);
        occupants.len() != before
    }

    /// The page attached to `stage`.
    pub fn occupant(&self, stage: &str) -> Option<ClassName> {
        lock(&self.occupants).get(stage).cloned()
    }

    /// The stage `page` is attached to.
    pub fn stage_of(&self, page: &ClassName) -> Option<String> {
        lock(&self.occupants)
            .iter()
            .find(|(_, p)| *p == page)
            .map(|(s, _)| s.clone())
    }

    /// Number of occupied stages.
    pub fn len(&self) -> usize {
        lock(&self.occupants).len()
    }

    /// True if nothing is showing anywhere.
    pub fn is_empty(&self) -> bool {
        lock(&self.occupants).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_replaces_occupant() {
        let board = StageBoard::new();
        let a = ClassName::from("p.A");
        let b = ClassName::from("p.B");
        assert_eq!(board.attach("body", &a), None);
        assert_eq!(board.attach("body", &b), Some(a.clone()));
        assert_eq!(board.occupant("body"), Some(b));
        assert_eq!(board.stage_of(&a), None);
    }

    #[test]
    fn attach_moves_between_stages() {
        let board = StageBoard::new();
        let a = ClassName::from("p.A");
        board.attach("left", &a);
        board.attach("right", &a);
        assert_eq!(board.occupant("left"), None);
        assert_eq!(board.stage_of(&a).as_deref(), Some("right"));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn detach_only_the_occupant() {
        let board = StageBoard::new();
        let a = ClassName::from("p.A");
        let b = ClassName::from("p.B");
        board.attach("body", &a);
        assert!(!board.detach("body", &b));
        assert!(board.detach("body", &a));
        assert!(board.is_empty());
        assert!(!board.detach_everywhere(&a));
    }
}
