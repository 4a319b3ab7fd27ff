//! Read-only reports over the desk state.

use crate::emergency_heap::TriageEntry;
use crate::models::{DoctorId, Patient, Slot, Token};
use crate::scheduler::SchedulingEngine;
use std::fmt;
use uuid::Uuid;

/// Per-doctor workload line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorReport {
    pub doctor_id: DoctorId,
    pub name: String,
    pub specialization: String,
    pub pending: usize,
    pub next_free_slot: Option<Slot>,
    pub served_count: u32,
}

impl fmt::Display for DoctorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Dr.{} {} ({})",
            self.doctor_id, self.name, self.specialization
        )?;
        writeln!(f, "  Pending routine: {}", self.pending)?;
        match &self.next_free_slot {
            Some(slot) => writeln!(f, "  Next free slot: {slot}")?,
            None => writeln!(f, "  Next free slot: None")?,
        }
        write!(f, "  Served count: {}", self.served_count)
    }
}

/// Desk-wide counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskSummary {
    pub session_id: Uuid,
    pub total_served: u32,
    /// Routine tokens across all doctors plus emergency entries.
    pub total_pending: usize,
    pub emergency_queued: usize,
    pub next_emergency: Option<TriageEntry>,
}

impl fmt::Display for DeskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: total served: {} | total pending: {} | emergency queued: {}",
            self.total_served, self.total_pending, self.emergency_queued
        )?;
        if let Some(next) = &self.next_emergency {
            write!(
                f,
                " | next emergency: P:{} severity {}",
                next.patient_id, next.severity
            )?;
        }
        Ok(())
    }
}

impl SchedulingEngine {
    /// One report per doctor, in registry order.
    pub fn doctor_reports(&self) -> Vec<DoctorReport> {
        self.doctors()
            .iter()
            .map(|doctor| DoctorReport {
                doctor_id: doctor.id,
                name: doctor.name.clone(),
                specialization: doctor.specialization.clone(),
                pending: doctor.pending(),
                next_free_slot: doctor.slots.find_next_free().cloned(),
                served_count: doctor.served_count,
            })
            .collect()
    }

    pub fn total_pending(&self) -> usize {
        let routine: usize = self.doctors().iter().map(|d| d.pending()).sum();
        routine + self.emergency().len()
    }

    pub fn summary(&self) -> DeskSummary {
        DeskSummary {
            session_id: self.session_id(),
            total_served: self.total_served(),
            total_pending: self.total_pending(),
            emergency_queued: self.emergency().len(),
            next_emergency: self.emergency().peek().copied(),
        }
    }

    /// The `k` most frequent patients by visits, ties broken by lower id.
    pub fn top_patients(&self, k: usize) -> Vec<Patient> {
        let mut patients: Vec<Patient> = self.patients().iter().cloned().collect();
        patients.sort_by(|a, b| b.visits.cmp(&a.visits).then(a.id.cmp(&b.id)));
        patients.truncate(k);
        patients
    }

    /// Every active token, by id.
    pub fn active_tokens(&self) -> Vec<Token> {
        self.tokens().sorted()
    }
}
