//! Token store: the record of every active visit.
//!
//! Token ids come from one monotonically increasing counter, starting at 1,
//! and are never reused, even when a token is discarded right after issue.

use crate::models::{DoctorId, PatientId, SlotId, Token, TokenId, TokenKind};
use chrono::Local;
use std::collections::HashMap;

#[derive(Debug)]
pub struct TokenStore {
    tokens: HashMap<TokenId, Token>,
    next_id: TokenId,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    pub fn new() -> Self {
        TokenStore {
            tokens: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a fresh id, store the token and return a copy of it.
    pub fn issue(
        &mut self,
        patient_id: PatientId,
        doctor_id: Option<DoctorId>,
        slot_id: Option<SlotId>,
        kind: TokenKind,
    ) -> Token {
        let token = Token {
            token_id: self.next_id,
            patient_id,
            doctor_id,
            slot_id,
            kind,
            issued_at: Local::now(),
        };
        self.next_id += 1;
        self.tokens.insert(token.token_id, token.clone());
        token
    }

    pub fn get(&self, token_id: TokenId) -> Option<&Token> {
        self.tokens.get(&token_id)
    }

    pub fn contains(&self, token_id: TokenId) -> bool {
        self.tokens.contains_key(&token_id)
    }

    pub fn remove(&mut self, token_id: TokenId) -> Option<Token> {
        self.tokens.remove(&token_id)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The id the next `issue` call will hand out.
    pub fn peek_next_id(&self) -> TokenId {
        self.next_id
    }

    /// Active tokens ordered by id.
    pub fn sorted(&self) -> Vec<Token> {
        let mut tokens: Vec<Token> = self.tokens.values().cloned().collect();
        tokens.sort_by_key(|t| t.token_id);
        tokens
    }
}
