//! Undo log.
//!
//! Every mutating desk operation pushes one `UndoRecord` describing how to
//! reverse it. Records are consumed strictly last-in-first-out, one per
//! `undo` call, and there is no redo.

use crate::models::{DoctorId, PatientId, Severity, SlotId, TokenId};
use chrono::{DateTime, Local};
use std::fmt;

/// Tag of an undo record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoKind {
    RegisterPatient,
    DeletePatient,
    AddSlot,
    DeleteSlot,
    BookRoutine,
    BookWalkIn,
    EmergencyIn,
    ServeRoutine,
    ServeEmergency,
}

impl UndoKind {
    pub fn name(&self) -> &str {
        match self {
            UndoKind::RegisterPatient => "REGISTER_PATIENT",
            UndoKind::DeletePatient => "DELETE_PATIENT",
            UndoKind::AddSlot => "ADD_SLOT",
            UndoKind::DeleteSlot => "DELETE_SLOT",
            UndoKind::BookRoutine => "BOOK_ROUTINE",
            UndoKind::BookWalkIn => "BOOK_WALKIN",
            UndoKind::EmergencyIn => "EMERGENCY_IN",
            UndoKind::ServeRoutine => "SERVE_ROUTINE",
            UndoKind::ServeEmergency => "SERVE_EMERGENCY",
        }
    }
}

impl fmt::Display for UndoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What was done, with just the fields needed to reverse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoAction {
    RegisterPatient {
        patient_id: PatientId,
    },
    DeletePatient {
        patient_id: PatientId,
    },
    AddSlot {
        doctor_id: DoctorId,
        slot_id: SlotId,
    },
    DeleteSlot {
        doctor_id: DoctorId,
        slot_id: SlotId,
    },
    BookRoutine {
        patient_id: PatientId,
        doctor_id: DoctorId,
        slot_id: SlotId,
        token_id: TokenId,
    },
    BookWalkIn {
        patient_id: PatientId,
        doctor_id: DoctorId,
        token_id: TokenId,
    },
    EmergencyIn {
        patient_id: PatientId,
        token_id: TokenId,
        severity: Severity,
    },
    ServeRoutine {
        patient_id: PatientId,
        doctor_id: DoctorId,
        slot_id: Option<SlotId>,
        token_id: TokenId,
    },
    /// Carries no severity: it is not known once the entry left the heap.
    ServeEmergency {
        patient_id: PatientId,
        token_id: TokenId,
    },
}

impl UndoAction {
    pub fn kind(&self) -> UndoKind {
        match self {
            UndoAction::RegisterPatient { .. } => UndoKind::RegisterPatient,
            UndoAction::DeletePatient { .. } => UndoKind::DeletePatient,
            UndoAction::AddSlot { .. } => UndoKind::AddSlot,
            UndoAction::DeleteSlot { .. } => UndoKind::DeleteSlot,
            UndoAction::BookRoutine { .. } => UndoKind::BookRoutine,
            UndoAction::BookWalkIn { .. } => UndoKind::BookWalkIn,
            UndoAction::EmergencyIn { .. } => UndoKind::EmergencyIn,
            UndoAction::ServeRoutine { .. } => UndoKind::ServeRoutine,
            UndoAction::ServeEmergency { .. } => UndoKind::ServeEmergency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoRecord {
    pub action: UndoAction,
    pub recorded_at: DateTime<Local>,
}

#[derive(Debug, Default)]
pub struct UndoLog {
    records: Vec<UndoRecord>,
}

impl UndoLog {
    pub fn new() -> Self {
        UndoLog {
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, action: UndoAction) {
        self.records.push(UndoRecord {
            action,
            recorded_at: Local::now(),
        });
    }

    pub fn pop(&mut self) -> Option<UndoRecord> {
        self.records.pop()
    }

    /// Put a popped record back on top, keeping its original timestamp.
    pub fn restore(&mut self, record: UndoRecord) {
        self.records.push(record);
    }

    pub fn peek(&self) -> Option<&UndoRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
