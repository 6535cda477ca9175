// THEORY:
// The `ring_buffer` module is the strike queue between the detection layer
// and the actuator. Detections arrive in bursts (several targets can fire in
// one frame) while the actuator drains one token per strike cycle, so a
// fixed-capacity FIFO sits between them. One slot is sacrificed to tell
// "full" from "empty", and on overflow the NEWEST token is dropped: a strike
// command that has waited longest is the most likely to still be valid.

const BUFFER_SIZE: usize = 128;

/// Fixed-capacity FIFO of strike tokens (+1 right arm, -1 left arm).
#[derive(Debug)]
pub struct TargetQueue {
    buffer: [i8; BUFFER_SIZE],
    head: usize,
    tail: usize,
}

impl Default for TargetQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetQueue {
    pub fn new() -> Self {
        Self {
            buffer: [0; BUFFER_SIZE],
            head: 0,
            tail: 0,
        }
    }

    /// Usable slots (one less than the backing storage).
    pub fn capacity(&self) -> usize {
        BUFFER_SIZE - 1
    }

    /// Tokens currently queued.
    pub fn available(&self) -> usize {
        (self.head + BUFFER_SIZE - self.tail) % BUFFER_SIZE
    }

    /// Enqueues a token. Returns false (dropping the token) when full.
    pub fn write(&mut self, token: i8) -> bool {
        let next = (self.head + 1) % BUFFER_SIZE;
        if next == self.tail {
            return false;
        }
        self.buffer[self.head] = token;
        self.head = next;
        true
    }

    /// Dequeues the oldest token, if any.
    pub fn read(&mut self) -> Option<i8> {
        if self.tail == self.head {
            return None;
        }
        let token = self.buffer[self.tail];
        self.tail = (self.tail + 1) % BUFFER_SIZE;
        Some(token)
    }

    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order() {
        let mut queue = TargetQueue::new();
        assert!(queue.write(1));
        assert!(queue.write(-1));
        assert!(queue.write(1));
        assert_eq!(queue.available(), 3);
        assert_eq!(queue.read(), Some(1));
        assert_eq!(queue.read(), Some(-1));
        assert_eq!(queue.read(), Some(1));
        assert_eq!(queue.read(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_newest() {
        let mut queue = TargetQueue::new();
        for _ in 0..queue.capacity() {
            assert!(queue.write(1));
        }
        // The (N+1)-th token is rejected; the queue still holds N.
        assert!(!queue.write(-1));
        assert_eq!(queue.available(), queue.capacity());
        // Every surviving token is one of the originals.
        for _ in 0..queue.capacity() {
            assert_eq!(queue.read(), Some(1));
        }
        assert_eq!(queue.read(), None);
    }

    #[test]
    fn wraps_around_storage() {
        let mut queue = TargetQueue::new();
        for round in 0..300i32 {
            let token = if round % 2 == 0 { 1 } else { -1 };
            assert!(queue.write(token));
            assert_eq!(queue.read(), Some(token));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut queue = TargetQueue::new();
        queue.write(1);
        queue.write(1);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.read(), None);
    }
}
