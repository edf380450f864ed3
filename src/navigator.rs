//! Circular cursor over the playlist order used to implement an infinite
//! slideshow.

use crate::events::Direction;
use crate::playlist::SlideId;

/// The slide on screen and its two neighbours. With fewer than three
/// slides the members may coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideTriple {
    pub previous: SlideId,
    pub current: SlideId,
    pub next: SlideId,
}

impl SlideTriple {
    #[must_use]
    pub fn contains(&self, id: SlideId) -> bool {
        self.previous == id || self.current == id || self.next == id
    }

    /// Members in render order: current first, then the neighbours.
    #[must_use]
    pub fn ids(&self) -> [SlideId; 3] {
        [self.current, self.next, self.previous]
    }
}

#[derive(Debug, Clone)]
pub struct SlideNavigator {
    order: Vec<SlideId>,
    /// `None` until the first advance.
    cursor: Option<usize>,
}

impl SlideNavigator {
    pub fn new(order: Vec<SlideId>) -> Self {
        Self {
            order,
            cursor: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    /// Move the cursor one step and return the triple around the new
    /// position. The very first advance lands on the first entry whatever
    /// the direction. No-op on an empty playlist.
    pub fn advance(&mut self, direction: Direction) -> Option<SlideTriple> {
        let len = self.order.len();
        if len == 0 {
            return None;
        }
        let next = match self.cursor {
            None => 0,
            Some(at) => wrap(at, direction.step(), len),
        };
        self.cursor = Some(next);
        self.current()
    }

    /// Triple around the cursor without moving it.
    #[must_use]
    pub fn current(&self) -> Option<SlideTriple> {
        let at = self.cursor?;
        let len = self.order.len();
        Some(SlideTriple {
            previous: self.order[wrap(at, -1, len)],
            current: self.order[at],
            next: self.order[wrap(at, 1, len)],
        })
    }
}

fn wrap(at: usize, step: isize, len: usize) -> usize {
    (at as isize + step).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<SlideId> {
        names.iter().map(|n| SlideId::from_name(n)).collect()
    }

    #[test]
    fn empty_is_a_noop() {
        let mut nav = SlideNavigator::new(Vec::new());
        assert_eq!(nav.advance(Direction::Forward), None);
        assert_eq!(nav.advance(Direction::Backward), None);
        assert_eq!(nav.position(), None);
    }

    #[test]
    fn first_advance_lands_on_first_entry() {
        let order = ids(&["a", "b", "c", "d"]);
        let mut nav = SlideNavigator::new(order.clone());
        let triple = nav.advance(Direction::Forward).unwrap();
        assert_eq!(triple.current, order[0]);
        assert_eq!(triple.previous, order[3]);
        assert_eq!(triple.next, order[1]);
    }

    #[test]
    fn wraps_both_ways() {
        let order = ids(&["a", "b", "c"]);
        let mut nav = SlideNavigator::new(order.clone());
        nav.advance(Direction::Forward);
        let back = nav.advance(Direction::Backward).unwrap();
        assert_eq!(back.current, order[2]);
        assert_eq!(back.next, order[0]);
        nav.advance(Direction::Forward);
        let fwd = nav.advance(Direction::Forward).unwrap();
        assert_eq!(fwd.current, order[1]);
    }

    #[test]
    fn short_playlists_repeat_members() {
        let order = ids(&["solo"]);
        let mut nav = SlideNavigator::new(order.clone());
        let t = nav.advance(Direction::Forward).unwrap();
        assert_eq!(t.ids(), [order[0]; 3]);

        let order = ids(&["a", "b"]);
        let mut nav = SlideNavigator::new(order.clone());
        let t = nav.advance(Direction::Forward).unwrap();
        assert_eq!(t.previous, t.next);
        assert!(t.contains(order[1]));
    }
}
