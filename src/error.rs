//! Error taxonomy for desk operations.
//!
//! Empty outcomes (nothing to serve, nothing to undo) and unsupported undo
//! are not errors; they are variants of `ServeOutcome` and `UndoOutcome`.

use crate::models::{DoctorId, PatientId, SlotId, TokenId};
use thiserror::Error;

pub type DeskResult<T> = Result<T, DeskError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeskError {
    #[error("no doctor with id {0}")]
    DoctorNotFound(DoctorId),

    #[error("no patient with id {0}")]
    PatientNotFound(PatientId),

    #[error("no slot {slot_id} for doctor {doctor_id}")]
    SlotNotFound { doctor_id: DoctorId, slot_id: SlotId },

    #[error("doctor {0} already exists")]
    DoctorExists(DoctorId),

    #[error("routine queue full for doctor {doctor_id} (capacity {capacity})")]
    QueueFull { doctor_id: DoctorId, capacity: usize },

    #[error("emergency heap full (capacity {capacity})")]
    HeapFull { capacity: usize },

    /// A queue or heap held a token id the token store does not know.
    #[error("token {0} is queued but missing from the token store")]
    TokenMissing(TokenId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DeskError {
    /// True for the capacity family (`QueueFull`, `HeapFull`).
    pub fn is_capacity(&self) -> bool {
        matches!(self, DeskError::QueueFull { .. } | DeskError::HeapFull { .. })
    }

    /// True for the not-found family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DeskError::DoctorNotFound(_)
                | DeskError::PatientNotFound(_)
                | DeskError::SlotNotFound { .. }
        )
    }
}
