/// Fixed-size accumulator for the single pass over the source.
pub(crate) struct Batcher<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Batcher<T> {
    /// `capacity` is clamped to at least one.
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `item`; returns the full batch once `capacity` is reached and
    /// starts a fresh one.
    pub(crate) fn push(&mut self, item: T) -> Option<Vec<T>> {
        self.items.push(item);
        if self.items.len() >= self.capacity {
            Some(std::mem::replace(
                &mut self.items,
                Vec::with_capacity(self.capacity),
            ))
        } else {
            None
        }
    }

    /// Takes the non-empty remainder, if any.
    pub(crate) fn finish(&mut self) -> Option<Vec<T>> {
        (!self.items.is_empty()).then(|| std::mem::take(&mut self.items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_exactly_at_capacity() {
        let mut batcher = Batcher::new(3);
        assert!(batcher.push(1).is_none());
        assert!(batcher.push(2).is_none());
        assert_eq!(batcher.push(3), Some(vec![1, 2, 3]));
        assert!(batcher.push(4).is_none());
        assert_eq!(batcher.finish(), Some(vec![4]));
    }

    #[test]
    fn finish_on_empty_is_none() {
        let mut batcher = Batcher::new(2);
        batcher.push('a');
        batcher.push('b');
        assert!(batcher.finish().is_none());
    }

    #[test]
    fn zero_capacity_behaves_as_one() {
        let mut batcher = Batcher::new(0);
        assert_eq!(batcher.push("x"), Some(vec!["x"]));
    }
}
