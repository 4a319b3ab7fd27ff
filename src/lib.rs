//! Outpatient scheduling desk.
//!
//! Patients are booked into per-doctor routine queues or triaged into one
//! global emergency heap. `serve_next` picks whom to see, and every mutation
//! can be undone one step at a time.

pub mod calendar;
pub mod config;
pub mod directory;
pub mod emergency_heap;
pub mod error;
pub mod logging;
pub mod models;
pub mod report;
pub mod routine_queue;
pub mod scheduler;
pub mod tokens;
pub mod undo;

pub use calendar::{Doctor, SlotList};
pub use config::{DeskConfig, UNDO_SERVE_FALLBACK_SEVERITY};
pub use emergency_heap::{EmergencyHeap, TriageEntry};
pub use error::{DeskError, DeskResult};
pub use models::{
    DoctorId, Patient, PatientId, PatientUpdate, Severity, Slot, SlotId, Token, TokenId, TokenKind,
};
pub use report::{DeskSummary, DoctorReport};
pub use routine_queue::RoutineQueue;
pub use scheduler::{SchedulingEngine, ServeOutcome, ServedVisit, UndoOutcome};
pub use undo::{UndoAction, UndoKind, UndoRecord};
