/// Fixed-capacity circular buffer. Pre-allocated, oldest entry is
/// overwritten once full.
pub struct RingBuffer<T> {
    buf: Vec<T>,
    capacity: usize,
    head: usize,
    len: usize,
}

impl<T: Clone + Default> RingBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: vec![T::default(); capacity],
            capacity,
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate from newest to oldest.
    pub fn iter_newest(&self) -> impl Iterator<Item = &T> {
        let cap = self.capacity;
        let head = self.head;
        (1..=self.len).map(move |i| &self.buf[(head + cap - i) % cap])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_capacity_newest() {
        let mut r = RingBuffer::new(3);
        for i in 1..=5 {
            r.push(i);
        }
        assert_eq!(r.len(), 3);
        let got: Vec<_> = r.iter_newest().copied().collect();
        assert_eq!(got, vec![5, 4, 3]);
    }

    #[test]
    fn partial_fill_order() {
        let mut r = RingBuffer::new(5);
        r.push("a".to_string());
        r.push("b".to_string());
        let got: Vec<_> = r.iter_newest().cloned().collect();
        assert_eq!(got, vec!["b", "a"]);
    }
}
