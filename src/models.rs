//! Data models for the scheduling desk.
//!
//! This module defines the core records shared by every component:
//! - Patient: directory entry with a visit counter
//! - Slot: a bookable time window owned by one doctor
//! - Token: one queued or triaged visit
//! - TokenKind: which queue a token lives in

use chrono::{DateTime, Local};
use std::fmt;

pub type PatientId = u32;
pub type DoctorId = u32;
pub type SlotId = u32;
pub type TokenId = u64;

/// Triage severity. Lower values are more urgent.
pub type Severity = i32;

/// Which queue a token was placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Routine,
    Emergency,
}

impl TokenKind {
    pub fn name(&self) -> &str {
        match self {
            TokenKind::Routine => "ROUTINE",
            TokenKind::Emergency => "EMERGENCY",
        }
    }
}

/// Represents a patient registered at the desk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub age: u32,
    /// Last-known severity, informational only.
    pub severity: Severity,
    pub visits: u32,
}

impl Patient {
    pub fn new(id: PatientId, name: String, age: u32, severity: Severity) -> Self {
        Patient {
            id,
            name,
            age,
            severity,
            visits: 0,
        }
    }
}

/// Partial update applied by `update_patient`. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub severity: Option<Severity>,
}

impl PatientUpdate {
    pub fn apply(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(age) = self.age {
            patient.age = age;
        }
        if let Some(severity) = self.severity {
            patient.severity = severity;
        }
    }
}

/// Represents a bookable time window in a doctor's schedule.
///
/// `start` and `end` are opaque labels; no calendar arithmetic is done on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub slot_id: SlotId,
    pub start: String,
    pub end: String,
    pub booked: bool,
}

impl Slot {
    pub fn new(slot_id: SlotId, start: String, end: String) -> Self {
        Slot {
            slot_id,
            start,
            end,
            booked: false,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Slot[{}: {}-{} {}]",
            self.slot_id,
            self.start,
            self.end,
            if self.booked { "(BOOKED)" } else { "(FREE)" }
        )
    }
}

/// One queued or triaged visit.
///
/// A token is in the token store exactly while its id sits in a routine
/// queue or in the emergency heap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_id: TokenId,
    pub patient_id: PatientId,
    /// `None` for emergency tokens.
    pub doctor_id: Option<DoctorId>,
    /// `None` for walk-ins and emergency tokens.
    pub slot_id: Option<SlotId>,
    pub kind: TokenKind,
    pub issued_at: DateTime<Local>,
}

impl Token {
    pub fn is_walk_in(&self) -> bool {
        self.kind == TokenKind::Routine && self.slot_id.is_none()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Token {} | P:{} | D:{} | S:{} | {}]",
            self.token_id,
            self.patient_id,
            self.doctor_id.unwrap_or(0),
            self.slot_id.unwrap_or(0),
            self.kind.name()
        )
    }
}
