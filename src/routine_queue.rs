//! Per-doctor routine queue: a fixed-capacity ring buffer of token ids.

use crate::models::TokenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursors {
    head: usize,
    tail: usize,
}

/// Bounded FIFO of token ids.
///
/// An empty queue has no cursors at all; dequeuing the last element clears
/// them instead of leaving `head` past `tail`.
#[derive(Debug, Clone)]
pub struct RoutineQueue {
    buf: Box<[TokenId]>,
    cursors: Option<Cursors>,
}

impl RoutineQueue {
    /// Create an empty queue holding at most `capacity` ids.
    ///
    /// A zero `capacity` yields a queue that rejects every insert.
    pub fn new(capacity: usize) -> Self {
        RoutineQueue {
            buf: vec![0; capacity].into_boxed_slice(),
            cursors: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_none()
    }

    pub fn is_full(&self) -> bool {
        self.count() == self.capacity()
    }

    /// Number of queued ids, derived from the cursors.
    pub fn count(&self) -> usize {
        match self.cursors {
            None => 0,
            Some(Cursors { head, tail }) if tail >= head => tail - head + 1,
            Some(Cursors { head, tail }) => self.capacity() - head + tail + 1,
        }
    }

    /// Append at the tail. Returns `false` and changes nothing when full.
    #[must_use]
    pub fn enqueue(&mut self, token_id: TokenId) -> bool {
        if self.is_full() {
            return false;
        }
        let tail = match self.cursors {
            None => {
                self.cursors = Some(Cursors { head: 0, tail: 0 });
                0
            }
            Some(ref mut c) => {
                c.tail = (c.tail + 1) % self.buf.len();
                c.tail
            }
        };
        self.buf[tail] = token_id;
        true
    }

    /// Insert at the head so `token_id` is the next one dequeued.
    /// Returns `false` and changes nothing when full.
    #[must_use]
    pub fn enqueue_front(&mut self, token_id: TokenId) -> bool {
        if self.is_full() {
            return false;
        }
        let head = match self.cursors {
            None => {
                self.cursors = Some(Cursors { head: 0, tail: 0 });
                0
            }
            Some(ref mut c) => {
                c.head = (c.head + self.buf.len() - 1) % self.buf.len();
                c.head
            }
        };
        self.buf[head] = token_id;
        true
    }

    /// Remove and return the oldest id.
    pub fn dequeue(&mut self) -> Option<TokenId> {
        let Cursors { head, tail } = self.cursors?;
        let token_id = self.buf[head];
        if head == tail {
            self.cursors = None;
        } else {
            self.cursors = Some(Cursors {
                head: (head + 1) % self.buf.len(),
                tail,
            });
        }
        Some(token_id)
    }

    pub fn peek(&self) -> Option<TokenId> {
        self.cursors.map(|c| self.buf[c.head])
    }

    /// Remove the first occurrence of `token_id`, wherever it sits.
    ///
    /// Drains the queue and re-enqueues everything else in its original
    /// order. Returns whether the id was found.
    pub fn remove_token(&mut self, token_id: TokenId) -> bool {
        let mut kept = Vec::with_capacity(self.count());
        let mut found = false;
        while let Some(next) = self.dequeue() {
            if next == token_id && !found {
                found = true;
                continue;
            }
            kept.push(next);
        }
        for id in kept {
            // Fewer ids go back in than were just drained.
            let reinserted = self.enqueue(id);
            debug_assert!(reinserted, "drained queue refused token {id}");
        }
        found
    }

    /// Queued ids from head to tail.
    pub fn snapshot(&self) -> Vec<TokenId> {
        let mut ids = Vec::with_capacity(self.count());
        if let Some(Cursors { head, .. }) = self.cursors {
            for offset in 0..self.count() {
                ids.push(self.buf[(head + offset) % self.buf.len()]);
            }
        }
        ids
    }
}
