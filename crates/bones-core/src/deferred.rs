/// Buffers edits to a collection while that collection is being traversed.
///
/// Call [`DeferredQueue::begin`] before iterating and [`DeferredQueue::finish`]
/// afterwards; anything [`DeferredQueue::defer`]red in between comes back out
/// of `finish` in the order it was queued, to be applied once no iterator is
/// live.
#[derive(Debug)]
pub struct DeferredQueue<C> {
    traversing: bool,
    queued: Vec<C>,
}

impl<C> Default for DeferredQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DeferredQueue<C> {
    /// An idle, empty queue.
    pub fn new() -> Self {
        Self {
            traversing: false,
            queued: Vec::new(),
        }
    }

    /// Enter traversal. Edits must be deferred until [`DeferredQueue::finish`].
    pub fn begin(&mut self) {
        self.traversing = true;
    }

    /// Whether a traversal is in progress.
    pub fn is_traversing(&self) -> bool {
        self.traversing
    }

    /// Queue an edit.
    pub fn defer(&mut self, command: C) {
        self.queued.push(command);
    }

    /// Pull back the first queued edit matching `pred`, swapping the last
    /// queued edit into its place.
    pub fn withdraw(&mut self, pred: impl Fn(&C) -> bool) -> Option<C> {
        let at = self.queued.iter().position(pred)?;
        Some(self.queued.swap_remove(at))
    }

    /// Whether any queued edit matches `pred`.
    pub fn contains(&self, pred: impl Fn(&C) -> bool) -> bool {
        self.queued.iter().any(pred)
    }

    /// Queued edits, oldest first.
    pub fn queued(&self) -> &[C] {
        &self.queued
    }

    /// Number of queued edits.
    pub fn len(&self) -> usize {
        self.queued.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    /// Leave traversal and hand back every queued edit.
    pub fn finish(&mut self) -> Vec<C> {
        self.traversing = false;
        std::mem::take(&mut self.queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_returns_fifo_and_clears_flag() {
        let mut q = DeferredQueue::new();
        q.begin();
        assert!(q.is_traversing());
        q.defer(1);
        q.defer(2);
        q.defer(3);
        assert_eq!(q.finish(), vec![1, 2, 3]);
        assert!(!q.is_traversing());
        assert!(q.is_empty());
    }

    #[test]
    fn withdraw_swaps_last_into_place() {
        let mut q = DeferredQueue::new();
        for i in 0..4 {
            q.defer(i);
        }
        assert_eq!(q.withdraw(|c| *c == 1), Some(1));
        assert_eq!(q.queued(), &[0, 3, 2]);
        assert_eq!(q.withdraw(|c| *c == 9), None);
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn queue_works_outside_collections_of_actors() {
        let mut items = vec!["a", "b", "c"];
        let mut q = DeferredQueue::new();
        q.begin();
        for item in &items {
            if *item == "b" {
                q.defer("b2");
            }
        }
        items.extend(q.finish());
        assert_eq!(items, vec!["a", "b", "c", "b2"]);
    }
}
