//! Scheduling engine: booking, triage, serving and undo.
//!
//! The engine exclusively owns every repository (patients, doctors, tokens,
//! the emergency heap and the undo log). Every public operation runs to
//! completion and leaves them mutually consistent: a token is in the token
//! store exactly while its id is in one routine queue or in the heap.
//!
//! Serving policy:
//! 1. A non-empty emergency heap always wins; its lowest severity is served.
//! 2. Otherwise the head of the first non-empty routine queue is served,
//!    scanning doctors in ascending id. Wait time across doctors is ignored.
//! 3. Otherwise there is nothing to serve.

use crate::calendar::Doctor;
use crate::config::{DeskConfig, UNDO_SERVE_FALLBACK_SEVERITY};
use crate::directory::{DoctorRegistry, PatientDirectory};
use crate::emergency_heap::EmergencyHeap;
use crate::error::{DeskError, DeskResult};
use crate::models::{
    DoctorId, Patient, PatientId, PatientUpdate, Severity, Slot, SlotId, Token, TokenId, TokenKind,
};
use crate::tokens::TokenStore;
use crate::undo::{UndoAction, UndoKind, UndoLog, UndoRecord};
use log::{debug, info, warn};
use uuid::Uuid;

/// A visit that `serve_next` just completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedVisit {
    pub token_id: TokenId,
    pub patient_id: PatientId,
    pub kind: TokenKind,
    pub doctor_id: Option<DoctorId>,
    pub slot_id: Option<SlotId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServeOutcome {
    Served(ServedVisit),
    /// Both the heap and every routine queue were empty.
    NothingToServe,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The record was reversed. Undoing a serve issues a fresh token,
    /// reported in `reissued_token`.
    Reverted {
        kind: UndoKind,
        reissued_token: Option<TokenId>,
    },
    /// The record was consumed but nothing could be restored: deletions keep
    /// no snapshot.
    Unsupported(UndoKind),
    NothingToUndo,
}

pub struct SchedulingEngine {
    config: DeskConfig,
    session_id: Uuid,
    patients: PatientDirectory,
    doctors: DoctorRegistry,
    tokens: TokenStore,
    emergency: EmergencyHeap,
    undo_log: UndoLog,
    total_served: u32,
}

impl SchedulingEngine {
    /// Build an empty desk. Fails if `config` does not validate.
    pub fn new(config: DeskConfig) -> DeskResult<Self> {
        config.validate()?;
        let session_id = Uuid::new_v4();
        info!(
            "event=desk_start module=scheduler status=ok session_id={} queue_capacity={} heap_capacity={}",
            session_id, config.routine_queue_capacity, config.emergency_heap_capacity
        );
        Ok(SchedulingEngine {
            emergency: EmergencyHeap::new(config.emergency_heap_capacity),
            config,
            session_id,
            patients: PatientDirectory::new(),
            doctors: DoctorRegistry::new(),
            tokens: TokenStore::new(),
            undo_log: UndoLog::new(),
            total_served: 0,
        })
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn total_served(&self) -> u32 {
        self.total_served
    }

    pub fn patient(&self, id: PatientId) -> Option<&Patient> {
        self.patients.get(id)
    }

    pub fn patients(&self) -> &PatientDirectory {
        &self.patients
    }

    pub fn doctor(&self, id: DoctorId) -> Option<&Doctor> {
        self.doctors.get(id)
    }

    pub fn doctors(&self) -> &DoctorRegistry {
        &self.doctors
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id)
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn emergency(&self) -> &EmergencyHeap {
        &self.emergency
    }

    /// The record the next `undo` would consume.
    pub fn last_undoable(&self) -> Option<&UndoRecord> {
        self.undo_log.peek()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_log.len()
    }

    // ---- patients -------------------------------------------------------

    /// Register a patient, overwriting any existing record with the same id.
    pub fn register_patient(&mut self, id: PatientId, name: String, age: u32, severity: Severity) {
        self.patients.upsert(Patient::new(id, name, age, severity));
        self.undo_log
            .push(UndoAction::RegisterPatient { patient_id: id });
        info!(
            "event=register_patient module=scheduler status=ok patient_id={}",
            id
        );
    }

    /// Update some fields of a patient. Not undoable.
    pub fn update_patient(&mut self, id: PatientId, update: PatientUpdate) -> DeskResult<()> {
        let patient = self.patients.get_mut(id).ok_or_else(|| {
            warn!(
                "event=update_patient module=scheduler status=rejected reason=not_found patient_id={}",
                id
            );
            DeskError::PatientNotFound(id)
        })?;
        update.apply(patient);
        info!(
            "event=update_patient module=scheduler status=ok patient_id={}",
            id
        );
        Ok(())
    }

    /// Remove a patient. Its undo record is pushed but cannot be reversed.
    pub fn delete_patient(&mut self, id: PatientId) -> DeskResult<Patient> {
        let patient = self.patients.remove(id).ok_or_else(|| {
            warn!(
                "event=delete_patient module=scheduler status=rejected reason=not_found patient_id={}",
                id
            );
            DeskError::PatientNotFound(id)
        })?;
        self.undo_log
            .push(UndoAction::DeletePatient { patient_id: id });
        info!(
            "event=delete_patient module=scheduler status=ok patient_id={}",
            id
        );
        Ok(patient)
    }

    // ---- doctors and slots ----------------------------------------------

    /// Register a doctor with a routine queue of the configured capacity.
    pub fn add_doctor(&mut self, id: DoctorId, name: String, specialization: String) -> DeskResult<()> {
        let doctor = Doctor::new(id, name, specialization, self.config.routine_queue_capacity);
        if !self.doctors.insert(doctor) {
            warn!(
                "event=add_doctor module=scheduler status=rejected reason=exists doctor_id={}",
                id
            );
            return Err(DeskError::DoctorExists(id));
        }
        info!("event=add_doctor module=scheduler status=ok doctor_id={}", id);
        Ok(())
    }

    /// Add a free slot to the head of a doctor's schedule.
    ///
    /// Duplicate slot ids are accepted; by-id lookups then hit the newest one.
    pub fn add_slot(
        &mut self,
        doctor_id: DoctorId,
        slot_id: SlotId,
        start: String,
        end: String,
    ) -> DeskResult<()> {
        let doctor = self.doctor_mut(doctor_id, "add_slot")?;
        doctor.slots.insert(Slot::new(slot_id, start, end));
        self.undo_log.push(UndoAction::AddSlot { doctor_id, slot_id });
        info!(
            "event=add_slot module=scheduler status=ok doctor_id={} slot_id={}",
            doctor_id, slot_id
        );
        Ok(())
    }

    /// Remove a slot, booked or not, and return it.
    ///
    /// A token already bound to the slot keeps its slot id; serving it later
    /// simply finds no slot to free.
    pub fn cancel_slot(&mut self, doctor_id: DoctorId, slot_id: SlotId) -> DeskResult<Slot> {
        let doctor = self.doctor_mut(doctor_id, "cancel_slot")?;
        let slot = doctor.slots.delete(slot_id).ok_or_else(|| {
            warn!(
                "event=cancel_slot module=scheduler status=rejected reason=slot_not_found doctor_id={} slot_id={}",
                doctor_id, slot_id
            );
            DeskError::SlotNotFound { doctor_id, slot_id }
        })?;
        self.undo_log
            .push(UndoAction::DeleteSlot { doctor_id, slot_id });
        info!(
            "event=cancel_slot module=scheduler status=ok doctor_id={} slot_id={} was_booked={}",
            doctor_id, slot_id, slot.booked
        );
        Ok(slot)
    }

    // ---- booking and triage ---------------------------------------------

    /// Queue a routine visit with `doctor_id`.
    ///
    /// The doctor's lowest free slot is booked for it; with no free slot the
    /// token becomes a walk-in. A full queue aborts the booking and leaves
    /// the slot free.
    pub fn book_routine(&mut self, patient_id: PatientId, doctor_id: DoctorId) -> DeskResult<Token> {
        let doctor = self.doctors.get_mut(doctor_id).ok_or_else(|| {
            warn!(
                "event=book_routine module=scheduler status=rejected reason=doctor_not_found doctor_id={} patient_id={}",
                doctor_id, patient_id
            );
            DeskError::DoctorNotFound(doctor_id)
        })?;

        let mut free_slot = doctor.slots.find_next_free_mut();
        let slot_id = free_slot.as_ref().map(|slot| slot.slot_id);
        if let Some(slot) = free_slot.as_mut() {
            slot.booked = true;
        }
        let token = self
            .tokens
            .issue(patient_id, Some(doctor_id), slot_id, TokenKind::Routine);

        if !doctor.queue.enqueue(token.token_id) {
            if let Some(slot) = free_slot {
                slot.booked = false;
            }
            self.tokens.remove(token.token_id);
            let capacity = doctor.queue.capacity();
            warn!(
                "event=book_routine module=scheduler status=rejected reason=queue_full doctor_id={} patient_id={} capacity={}",
                doctor_id, patient_id, capacity
            );
            return Err(DeskError::QueueFull {
                doctor_id,
                capacity,
            });
        }

        let action = match slot_id {
            Some(slot_id) => UndoAction::BookRoutine {
                patient_id,
                doctor_id,
                slot_id,
                token_id: token.token_id,
            },
            None => UndoAction::BookWalkIn {
                patient_id,
                doctor_id,
                token_id: token.token_id,
            },
        };
        self.undo_log.push(action);
        info!(
            "event=book_routine module=scheduler status=ok token_id={} patient_id={} doctor_id={} slot_id={} walk_in={}",
            token.token_id,
            patient_id,
            doctor_id,
            slot_id.unwrap_or(0),
            slot_id.is_none()
        );
        Ok(token)
    }

    /// Put a patient into the emergency heap. A full heap aborts the triage
    /// and no token survives.
    pub fn triage_in(&mut self, patient_id: PatientId, severity: Severity) -> DeskResult<Token> {
        let token = self
            .tokens
            .issue(patient_id, None, None, TokenKind::Emergency);

        if !self.emergency.insert(token.token_id, patient_id, severity) {
            self.tokens.remove(token.token_id);
            let capacity = self.emergency.capacity();
            warn!(
                "event=triage_in module=scheduler status=rejected reason=heap_full patient_id={} capacity={}",
                patient_id, capacity
            );
            return Err(DeskError::HeapFull { capacity });
        }

        self.undo_log.push(UndoAction::EmergencyIn {
            patient_id,
            token_id: token.token_id,
            severity,
        });
        info!(
            "event=triage_in module=scheduler status=ok token_id={} patient_id={} severity={}",
            token.token_id, patient_id, severity
        );
        Ok(token)
    }

    // ---- serving --------------------------------------------------------

    /// Serve the next visit according to the serving policy.
    pub fn serve_next(&mut self) -> DeskResult<ServeOutcome> {
        if let Some(token_id) = self.emergency.extract_min() {
            return self.finish_emergency_serve(token_id);
        }

        let Some(doctor) = self.doctors.iter_mut().find(|d| !d.queue.is_empty()) else {
            debug!("event=serve_next module=scheduler status=empty");
            return Ok(ServeOutcome::NothingToServe);
        };
        let Some(token_id) = doctor.queue.dequeue() else {
            return Ok(ServeOutcome::NothingToServe);
        };
        let token = self
            .tokens
            .remove(token_id)
            .ok_or(DeskError::TokenMissing(token_id))?;

        if let Some(slot_id) = token.slot_id {
            if !doctor.slots.set_booked(slot_id, false) {
                debug!(
                    "event=serve_next module=scheduler status=slot_gone doctor_id={} slot_id={}",
                    doctor.id, slot_id
                );
            }
        }
        doctor.served_count += 1;
        let doctor_id = doctor.id;

        self.patients.record_visit(token.patient_id);
        self.total_served += 1;
        self.undo_log.push(UndoAction::ServeRoutine {
            patient_id: token.patient_id,
            doctor_id,
            slot_id: token.slot_id,
            token_id,
        });
        info!(
            "event=serve_next module=scheduler status=ok kind=routine token_id={} patient_id={} doctor_id={}",
            token_id, token.patient_id, doctor_id
        );
        Ok(ServeOutcome::Served(ServedVisit {
            token_id,
            patient_id: token.patient_id,
            kind: TokenKind::Routine,
            doctor_id: Some(doctor_id),
            slot_id: token.slot_id,
        }))
    }

    fn finish_emergency_serve(&mut self, token_id: TokenId) -> DeskResult<ServeOutcome> {
        let token = self
            .tokens
            .remove(token_id)
            .ok_or(DeskError::TokenMissing(token_id))?;

        self.patients.record_visit(token.patient_id);
        self.total_served += 1;
        self.undo_log.push(UndoAction::ServeEmergency {
            patient_id: token.patient_id,
            token_id,
        });
        info!(
            "event=serve_next module=scheduler status=ok kind=emergency token_id={} patient_id={}",
            token_id, token.patient_id
        );
        Ok(ServeOutcome::Served(ServedVisit {
            token_id,
            patient_id: token.patient_id,
            kind: TokenKind::Emergency,
            doctor_id: None,
            slot_id: None,
        }))
    }

    // ---- undo -----------------------------------------------------------

    /// Reverse the most recent mutation.
    ///
    /// If the reversal itself is rejected (for instance a reinsertion into a
    /// full queue), state is unchanged and the record goes back on the log.
    pub fn undo(&mut self) -> DeskResult<UndoOutcome> {
        let Some(record) = self.undo_log.pop() else {
            debug!("event=undo module=scheduler status=empty");
            return Ok(UndoOutcome::NothingToUndo);
        };

        match self.revert(&record.action) {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(
                    "event=undo module=scheduler status=rejected kind={} reason=\"{}\"",
                    record.action.kind(),
                    err
                );
                self.undo_log.restore(record);
                Err(err)
            }
        }
    }

    fn revert(&mut self, action: &UndoAction) -> DeskResult<UndoOutcome> {
        let kind = action.kind();
        let mut reissued_token = None;

        match *action {
            UndoAction::RegisterPatient { patient_id } => {
                self.patients.remove(patient_id);
            }
            UndoAction::DeletePatient { .. } | UndoAction::DeleteSlot { .. } => {
                warn!(
                    "event=undo module=scheduler status=unsupported kind={} reason=no_snapshot",
                    kind
                );
                return Ok(UndoOutcome::Unsupported(kind));
            }
            UndoAction::AddSlot { doctor_id, slot_id } => {
                let doctor = self.doctor_mut(doctor_id, "undo")?;
                doctor.slots.delete(slot_id);
            }
            UndoAction::BookRoutine {
                doctor_id,
                slot_id,
                token_id,
                ..
            } => {
                let doctor = self.doctor_mut(doctor_id, "undo")?;
                if !doctor.queue.remove_token(token_id) {
                    warn!(
                        "event=undo module=scheduler status=inconsistent kind={} token_id={} reason=not_queued",
                        kind, token_id
                    );
                }
                doctor.slots.set_booked(slot_id, false);
                self.tokens.remove(token_id);
            }
            UndoAction::BookWalkIn {
                doctor_id,
                token_id,
                ..
            } => {
                let doctor = self.doctor_mut(doctor_id, "undo")?;
                if !doctor.queue.remove_token(token_id) {
                    warn!(
                        "event=undo module=scheduler status=inconsistent kind={} token_id={} reason=not_queued",
                        kind, token_id
                    );
                }
                self.tokens.remove(token_id);
            }
            UndoAction::EmergencyIn { token_id, .. } => {
                if !self.emergency.remove_token(token_id) {
                    warn!(
                        "event=undo module=scheduler status=inconsistent kind={} token_id={} reason=not_in_heap",
                        kind, token_id
                    );
                }
                self.tokens.remove(token_id);
            }
            UndoAction::ServeEmergency { patient_id, .. } => {
                let token = self
                    .tokens
                    .issue(patient_id, None, None, TokenKind::Emergency);
                if !self
                    .emergency
                    .insert(token.token_id, patient_id, UNDO_SERVE_FALLBACK_SEVERITY)
                {
                    self.tokens.remove(token.token_id);
                    return Err(DeskError::HeapFull {
                        capacity: self.emergency.capacity(),
                    });
                }
                self.total_served = self.total_served.saturating_sub(1);
                reissued_token = Some(token.token_id);
            }
            UndoAction::ServeRoutine {
                patient_id,
                doctor_id,
                slot_id,
                ..
            } => {
                let doctor = self.doctors.get_mut(doctor_id).ok_or(DeskError::DoctorNotFound(doctor_id))?;
                let token = self
                    .tokens
                    .issue(patient_id, Some(doctor_id), slot_id, TokenKind::Routine);
                if !doctor.queue.enqueue_front(token.token_id) {
                    self.tokens.remove(token.token_id);
                    return Err(DeskError::QueueFull {
                        doctor_id,
                        capacity: doctor.queue.capacity(),
                    });
                }
                if let Some(slot_id) = slot_id {
                    if !doctor.slots.set_booked(slot_id, true) {
                        warn!(
                            "event=undo module=scheduler status=slot_gone kind={} doctor_id={} slot_id={}",
                            kind, doctor_id, slot_id
                        );
                    }
                }
                doctor.served_count = doctor.served_count.saturating_sub(1);
                self.total_served = self.total_served.saturating_sub(1);
                reissued_token = Some(token.token_id);
            }
        }

        info!(
            "event=undo module=scheduler status=ok kind={} reissued_token={}",
            kind,
            reissued_token.unwrap_or(0)
        );
        Ok(UndoOutcome::Reverted {
            kind,
            reissued_token,
        })
    }

    fn doctor_mut(&mut self, doctor_id: DoctorId, event: &str) -> DeskResult<&mut Doctor> {
        self.doctors.get_mut(doctor_id).ok_or_else(|| {
            warn!(
                "event={} module=scheduler status=rejected reason=doctor_not_found doctor_id={}",
                event, doctor_id
            );
            DeskError::DoctorNotFound(doctor_id)
        })
    }
}
