//! Command-line interface for the scheduling desk.
//!
//! Provides an interactive menu for registering patients and doctors,
//! booking routine visits, triaging emergencies, serving and undoing.

use std::io::{self, BufRead, Write};
use std::str::FromStr;
use triage_desk::logging::init_logging;
use triage_desk::{
    DeskConfig, DeskError, PatientUpdate, SchedulingEngine, ServeOutcome, UndoOutcome,
};

struct DeskCli {
    desk: SchedulingEngine,
    running: bool,
}

impl DeskCli {
    fn new(desk: SchedulingEngine) -> Self {
        DeskCli {
            desk,
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       HOSPITAL APPOINTMENT & TRIAGE DESK");
        println!("{}", "=".repeat(60));
        println!("Session {}", self.desk.session_id());
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. Register patient");
        println!("2. Update patient");
        println!("3. Delete patient");
        println!("4. Add doctor");
        println!("5. Add slot");
        println!("6. Cancel slot");
        println!("7. Book routine");
        println!("8. Emergency in");
        println!("9. Serve next");
        println!("10. Undo");
        println!("11. Reports");
        println!("12. List tokens");
        println!("13. Run demo");
        println!("14. Exit");
        println!("{}", "-".repeat(20));
    }

    /// Read one trimmed line. `None` means stdin is closed.
    fn get_input(&mut self, prompt: &str, default: Option<&str>) -> Option<String> {
        match default {
            Some(def) => print!("{} [{}]: ", prompt, def),
            None => print!("{}: ", prompt),
        }
        if io::stdout().flush().is_err() {
            self.running = false;
            return None;
        }

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => {
                self.running = false;
                return None;
            }
            Ok(_) => {}
        }
        let input = input.trim();

        if input.is_empty() {
            Some(default.unwrap_or("").to_string())
        } else {
            Some(input.to_string())
        }
    }

    fn get_number<T: FromStr + ToString>(&mut self, prompt: &str, default: Option<T>) -> Option<T> {
        let default_str = default.map(|d| d.to_string());
        loop {
            let input = self.get_input(prompt, default_str.as_deref())?;
            if let Ok(value) = input.parse::<T>() {
                return Some(value);
            }
            println!("Please enter a valid number");
        }
    }

    /// Like `get_input`, but `-` or an empty answer means "skip".
    fn get_optional(&mut self, prompt: &str) -> Option<Option<String>> {
        let input = self.get_input(prompt, Some("-"))?;
        Some(if input == "-" { None } else { Some(input) })
    }

    fn report_error(&self, err: &DeskError) {
        println!("\nRejected: {}", err);
    }

    fn register_patient(&mut self) -> Option<()> {
        println!("\n--- Register Patient ---");
        let id = self.get_number::<u32>("ID", None)?;
        let name = self.get_input("Name", None)?;
        let age = self.get_number::<u32>("Age", None)?;
        let severity = self.get_number::<i32>("Severity", Some(5))?;

        self.desk.register_patient(id, name, age, severity);
        println!("\nPatient registered: {}", id);
        Some(())
    }

    fn update_patient(&mut self) -> Option<()> {
        println!("\n--- Update Patient ---");
        let id = self.get_number::<u32>("ID", None)?;
        let name = self.get_optional("Name (- to skip)")?;
        let age = self.get_optional("Age (- to skip)")?;
        let severity = self.get_optional("Severity (- to skip)")?;

        let update = PatientUpdate {
            name,
            age: age.and_then(|a| a.parse().ok()),
            severity: severity.and_then(|s| s.parse().ok()),
        };
        match self.desk.update_patient(id, update) {
            Ok(()) => println!("\nPatient updated: {}", id),
            Err(e) => self.report_error(&e),
        }
        Some(())
    }

    fn delete_patient(&mut self) -> Option<()> {
        let id = self.get_number::<u32>("ID", None)?;
        match self.desk.delete_patient(id) {
            Ok(patient) => println!("\nPatient deleted: {} ({})", patient.id, patient.name),
            Err(e) => self.report_error(&e),
        }
        Some(())
    }

    fn add_doctor(&mut self) -> Option<()> {
        println!("\n--- Add Doctor ---");
        let id = self.get_number::<u32>("Doctor ID", None)?;
        let name = self.get_input("Name", None)?;
        let specialization = self.get_input("Specialization", Some("General"))?;

        match self.desk.add_doctor(id, name, specialization) {
            Ok(()) => println!("\nDoctor added: {}", id),
            Err(e) => self.report_error(&e),
        }
        Some(())
    }

    fn add_slot(&mut self) -> Option<()> {
        println!("\n--- Add Slot ---");
        let doctor_id = self.get_number::<u32>("Doctor ID", None)?;
        let slot_id = self.get_number::<u32>("Slot ID", None)?;
        let start = self.get_input("Start", Some("09:00"))?;
        let end = self.get_input("End", Some("09:30"))?;

        match self.desk.add_slot(doctor_id, slot_id, start, end) {
            Ok(()) => println!("\nSlot added to Dr.{}: {}", doctor_id, slot_id),
            Err(e) => self.report_error(&e),
        }
        Some(())
    }

    fn cancel_slot(&mut self) -> Option<()> {
        let doctor_id = self.get_number::<u32>("Doctor ID", None)?;
        let slot_id = self.get_number::<u32>("Slot ID", None)?;
        match self.desk.cancel_slot(doctor_id, slot_id) {
            Ok(slot) => println!("\nSlot cancelled: {}", slot),
            Err(e) => self.report_error(&e),
        }
        Some(())
    }

    fn book_routine(&mut self) -> Option<()> {
        let patient_id = self.get_number::<u32>("Patient ID", None)?;
        let doctor_id = self.get_number::<u32>("Doctor ID", None)?;
        match self.desk.book_routine(patient_id, doctor_id) {
            Ok(token) if token.is_walk_in() => println!("\nBooked walk-in token: {}", token),
            Ok(token) => println!("\nBooked slot and token: {}", token),
            Err(e) => self.report_error(&e),
        }
        Some(())
    }

    fn emergency_in(&mut self) -> Option<()> {
        let patient_id = self.get_number::<u32>("Patient ID", None)?;
        let severity = self.get_number::<i32>("Severity (lower is more urgent)", None)?;
        match self.desk.triage_in(patient_id, severity) {
            Ok(token) => println!(
                "\nEmergency inserted: token {} severity {}",
                token.token_id, severity
            ),
            Err(e) => self.report_error(&e),
        }
        Some(())
    }

    fn serve_next(&mut self) {
        match self.desk.serve_next() {
            Ok(ServeOutcome::Served(visit)) => println!(
                "\nServed {} patient: {} (token {})",
                visit.kind.name(),
                visit.patient_id,
                visit.token_id
            ),
            Ok(ServeOutcome::NothingToServe) => println!("\nNo patients to serve."),
            Err(e) => self.report_error(&e),
        }
    }

    fn undo(&mut self) {
        let recorded_at = self
            .desk
            .last_undoable()
            .map(|record| record.recorded_at.format("%H:%M:%S").to_string());

        match self.desk.undo() {
            Ok(UndoOutcome::Reverted {
                kind,
                reissued_token,
            }) => {
                print!(
                    "\nUndo: {} from {} reverted",
                    kind,
                    recorded_at.unwrap_or_default()
                );
                match reissued_token {
                    Some(token_id) => println!(", reinserted as token {}", token_id),
                    None => println!(),
                }
            }
            Ok(UndoOutcome::Unsupported(kind)) => {
                println!("\nUndo: cannot undo {}, no snapshot retained", kind)
            }
            Ok(UndoOutcome::NothingToUndo) => println!("\nNothing to undo."),
            Err(e) => self.report_error(&e),
        }
    }

    fn reports(&mut self) -> Option<()> {
        println!("1) Per-doctor report\n2) Summary\n3) Top-K patients");
        match self.get_number::<u32>("Report", Some(2))? {
            1 => {
                println!("\nPer-Doctor Report:");
                for report in self.desk.doctor_reports() {
                    println!("{}", report);
                }
            }
            2 => println!("\n{}", self.desk.summary()),
            3 => {
                let k = self.get_number::<usize>("K", Some(3))?;
                println!("\nTop {} frequent patients:", k);
                for (i, patient) in self.desk.top_patients(k).iter().enumerate() {
                    println!(
                        " {}. {} {} visits:{}",
                        i + 1,
                        patient.id,
                        patient.name,
                        patient.visits
                    );
                }
            }
            _ => println!("Invalid report"),
        }
        Some(())
    }

    fn list_tokens(&self) {
        let tokens = self.desk.active_tokens();
        if tokens.is_empty() {
            println!("\nNo active tokens");
            return;
        }
        println!("\nActive Tokens:");
        for token in tokens {
            println!(
                "  {} issued {}",
                token,
                token.issued_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    /// Walk a fresh desk through the routine-plus-emergency scenario.
    fn run_demo(&mut self) {
        println!("\n--- Running Demo ---");

        let mut demo = match build_demo(self.desk.config().clone()) {
            Ok(desk) => desk,
            Err(e) => {
                self.report_error(&e);
                return;
            }
        };
        println!("Booked P1 with Dr.1, triaged P2 (severity 1) and P3 (severity 5)");

        loop {
            match demo.serve_next() {
                Ok(ServeOutcome::Served(visit)) => println!(
                    "  [{:9}] patient {} (token {})",
                    visit.kind.name(),
                    visit.patient_id,
                    visit.token_id
                ),
                Ok(ServeOutcome::NothingToServe) => {
                    println!("  nothing left to serve");
                    break;
                }
                Err(e) => {
                    self.report_error(&e);
                    break;
                }
            }
        }

        println!("\nNote: both emergencies were served before the routine booking,");
        println!("and the routine patient's slot is free again: {}", demo.summary());
    }

    fn run(&mut self) {
        self.print_header();

        while self.running {
            self.print_menu();

            let Some(choice) = self.get_number::<u32>("Choice", Some(13)) else {
                break;
            };

            let completed = match choice {
                1 => self.register_patient(),
                2 => self.update_patient(),
                3 => self.delete_patient(),
                4 => self.add_doctor(),
                5 => self.add_slot(),
                6 => self.cancel_slot(),
                7 => self.book_routine(),
                8 => self.emergency_in(),
                9 => {
                    self.serve_next();
                    Some(())
                }
                10 => {
                    self.undo();
                    Some(())
                }
                11 => self.reports(),
                12 => {
                    self.list_tokens();
                    Some(())
                }
                13 => {
                    self.run_demo();
                    Some(())
                }
                14 => {
                    self.running = false;
                    Some(())
                }
                _ => {
                    println!("Invalid choice");
                    Some(())
                }
            };
            if completed.is_none() {
                break;
            }
        }
        println!("\nExiting.");
    }
}

fn build_demo(config: DeskConfig) -> Result<SchedulingEngine, DeskError> {
    let mut demo = SchedulingEngine::new(config)?;
    demo.add_doctor(1, "Demo".to_string(), "General".to_string())?;
    demo.add_slot(1, 1, "10:00".to_string(), "10:30".to_string())?;
    demo.add_slot(1, 2, "10:30".to_string(), "11:00".to_string())?;
    for (id, name) in [(1, "Routine Rao"), (2, "Critical Chen"), (3, "Moderate Moss")] {
        demo.register_patient(id, name.to_string(), 40, 5);
    }
    demo.book_routine(1, 1)?;
    demo.triage_in(2, 1)?;
    demo.triage_in(3, 5)?;
    Ok(demo)
}

/// Doctors and slots every desk session starts with.
fn seed(desk: &mut SchedulingEngine) -> Result<(), DeskError> {
    desk.add_doctor(11, "Arjun".to_string(), "Cardio".to_string())?;
    desk.add_doctor(12, "Leela".to_string(), "Ortho".to_string())?;
    desk.add_slot(11, 1, "10:00".to_string(), "10:30".to_string())?;
    desk.add_slot(11, 2, "10:30".to_string(), "11:00".to_string())?;
    desk.add_slot(12, 1, "09:00".to_string(), "09:30".to_string())?;
    Ok(())
}

fn main() {
    let config = match DeskConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("logging disabled: {}", e);
    }

    let mut desk = match SchedulingEngine::new(config) {
        Ok(desk) => desk,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    if let Err(e) = seed(&mut desk) {
        eprintln!("failed to seed desk: {}", e);
        std::process::exit(1);
    }

    let mut cli = DeskCli::new(desk);
    cli.run();
}
