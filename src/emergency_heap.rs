//! Global emergency triage heap.
//!
//! A bounded, array-backed binary min-heap keyed by severity, using 0-indexed
//! storage with parent = (i-1)/2 and children = 2i+1, 2i+2.
//!
//! Ties between equal severities fall out of the heap's structure, so equal
//! severities are not served first-in-first-out.

use crate::models::{PatientId, Severity, TokenId};

/// One triaged entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageEntry {
    pub token_id: TokenId,
    pub patient_id: PatientId,
    pub severity: Severity,
}

#[derive(Debug, Clone)]
pub struct EmergencyHeap {
    nodes: Vec<TriageEntry>,
    capacity: usize,
}

impl EmergencyHeap {
    pub fn new(capacity: usize) -> Self {
        EmergencyHeap {
            nodes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.nodes.len() >= self.capacity
    }

    /// Insert an entry. Returns `false` and changes nothing when full.
    #[must_use]
    pub fn insert(&mut self, token_id: TokenId, patient_id: PatientId, severity: Severity) -> bool {
        if self.is_full() {
            return false;
        }
        self.nodes.push(TriageEntry {
            token_id,
            patient_id,
            severity,
        });
        self.sift_up(self.nodes.len() - 1);
        true
    }

    /// Remove the most urgent entry and return its token id.
    pub fn extract_min(&mut self) -> Option<TokenId> {
        if self.nodes.is_empty() {
            return None;
        }
        let last = self.nodes.len() - 1;
        self.nodes.swap(0, last);
        let root = self.nodes.pop()?;
        if !self.nodes.is_empty() {
            self.sift_down(0);
        }
        Some(root.token_id)
    }

    pub fn peek(&self) -> Option<&TriageEntry> {
        self.nodes.first()
    }

    /// Remove the entry for `token_id` from wherever it sits.
    ///
    /// The last entry takes its place and is sifted up or down, whichever
    /// direction restores heap order. Returns whether the id was found.
    pub fn remove_token(&mut self, token_id: TokenId) -> bool {
        let Some(idx) = self.nodes.iter().position(|e| e.token_id == token_id) else {
            return false;
        };
        self.nodes.swap_remove(idx);
        if idx < self.nodes.len() {
            let idx = self.sift_up(idx);
            self.sift_down(idx);
        }
        true
    }

    /// Severity of a token still in the heap.
    pub fn severity_of(&self, token_id: TokenId) -> Option<Severity> {
        self.nodes
            .iter()
            .find(|e| e.token_id == token_id)
            .map(|e| e.severity)
    }

    /// Entries in storage order (root first).
    pub fn entries(&self) -> &[TriageEntry] {
        &self.nodes
    }

    /// Move `idx` towards the root while it beats its parent; returns its final index.
    fn sift_up(&mut self, mut idx: usize) -> usize {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.nodes[idx].severity < self.nodes[parent].severity {
                self.nodes.swap(idx, parent);
                idx = parent;
            } else {
                break;
            }
        }
        idx
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.nodes.len();
        loop {
            let left = 2 * idx + 1;
            let right = 2 * idx + 2;
            let mut smallest = idx;

            if left < len && self.nodes[left].severity < self.nodes[smallest].severity {
                smallest = left;
            }
            if right < len && self.nodes[right].severity < self.nodes[smallest].severity {
                smallest = right;
            }
            if smallest == idx {
                break;
            }
            self.nodes.swap(idx, smallest);
            idx = smallest;
        }
    }
}
