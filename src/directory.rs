//! Id-keyed patient and doctor records.

use crate::calendar::Doctor;
use crate::models::{DoctorId, Patient, PatientId};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct PatientDirectory {
    patients: HashMap<PatientId, Patient>,
}

impl PatientDirectory {
    pub fn new() -> Self {
        PatientDirectory {
            patients: HashMap::new(),
        }
    }

    /// Insert or overwrite; the last write wins.
    pub fn upsert(&mut self, patient: Patient) {
        self.patients.insert(patient.id, patient);
    }

    pub fn get(&self, id: PatientId) -> Option<&Patient> {
        self.patients.get(&id)
    }

    pub fn get_mut(&mut self, id: PatientId) -> Option<&mut Patient> {
        self.patients.get_mut(&id)
    }

    pub fn remove(&mut self, id: PatientId) -> Option<Patient> {
        self.patients.remove(&id)
    }

    /// Bump the visit count; `false` if the patient is unknown.
    pub fn record_visit(&mut self, id: PatientId) -> bool {
        match self.patients.get_mut(&id) {
            Some(patient) => {
                patient.visits += 1;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }
}

/// Doctors keyed by id. Iteration is in ascending doctor id, which is the
/// order routine serving scans in.
#[derive(Debug, Default)]
pub struct DoctorRegistry {
    doctors: BTreeMap<DoctorId, Doctor>,
}

impl DoctorRegistry {
    pub fn new() -> Self {
        DoctorRegistry {
            doctors: BTreeMap::new(),
        }
    }

    /// Register a doctor; `false` (and no change) if the id is taken.
    pub fn insert(&mut self, doctor: Doctor) -> bool {
        if self.doctors.contains_key(&doctor.id) {
            return false;
        }
        self.doctors.insert(doctor.id, doctor);
        true
    }

    pub fn get(&self, id: DoctorId) -> Option<&Doctor> {
        self.doctors.get(&id)
    }

    pub fn get_mut(&mut self, id: DoctorId) -> Option<&mut Doctor> {
        self.doctors.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Doctor> {
        self.doctors.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Doctor> {
        self.doctors.values_mut()
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }
}
