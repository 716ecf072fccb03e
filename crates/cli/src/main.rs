use chrono::SecondsFormat;
use clap::{Args, Parser, Subcommand};
use pocketbook_core::{
    CoreConfig, Medication, MedicationDraft, MedicationError, MedicationId, MedicationService,
    StorageBackend,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pocketbook")]
#[command(about = "PocketBook medication catalogue CLI")]
struct Cli {
    /// Directory holding the medication document (defaults to MEDICATION_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all medications
    List,
    /// Show one medication
    Show {
        /// Medication id
        id: i32,
    },
    /// Create a medication
    Create {
        #[command(flatten)]
        fields: MedicationFields,
    },
    /// Update a medication; omitted fields keep their current value
    Update {
        /// Medication id
        id: i32,
        #[command(flatten)]
        fields: MedicationFields,
    },
    /// Delete a medication
    Delete {
        /// Medication id
        id: i32,
    },
}

#[derive(Args)]
struct MedicationFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    dose: Option<String>,
    #[arg(long)]
    form: Option<String>,
    #[arg(long)]
    route: Option<String>,
    #[arg(long)]
    indications: Option<String>,
    #[arg(long)]
    inclusion_criteria: Option<String>,
    #[arg(long)]
    exclusion_criteria: Option<String>,
    #[arg(long)]
    side_effects: Option<String>,
    #[arg(long)]
    advice_if_taken: Option<String>,
    #[arg(long)]
    advice_if_declined: Option<String>,
    /// Policy date (YYYY-MM-DD)
    #[arg(long)]
    policy_date: Option<String>,
}

impl MedicationFields {
    /// Overlays the supplied flags onto `draft`.
    fn apply(self, mut draft: MedicationDraft) -> MedicationDraft {
        fn set(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut draft.name, self.name);
        set(&mut draft.dose, self.dose);
        set(&mut draft.form, self.form);
        set(&mut draft.route, self.route);
        set(&mut draft.indications, self.indications);
        set(&mut draft.inclusion_criteria, self.inclusion_criteria);
        set(&mut draft.exclusion_criteria, self.exclusion_criteria);
        set(&mut draft.side_effects, self.side_effects);
        set(&mut draft.advice_if_taken, self.advice_if_taken);
        set(&mut draft.advice_if_declined, self.advice_if_declined);
        set(&mut draft.policy_date, self.policy_date);
        draft
    }
}

fn open_service(data_dir: Option<PathBuf>) -> Result<MedicationService, Box<dyn std::error::Error>> {
    let dir = data_dir
        .or_else(|| std::env::var_os("MEDICATION_DATA_DIR").map(PathBuf::from))
        .ok_or("no data directory: pass --data-dir or set MEDICATION_DATA_DIR")?;

    Ok(CoreConfig::new(StorageBackend::File(dir)).medication_service()?)
}

fn print_medication(medication: &Medication) {
    let details = &medication.details;
    println!("ID: {}", medication.id);
    println!("Name: {}", details.name);
    println!("Dose: {}", details.dose);
    println!("Form: {}", details.form);
    println!("Route: {}", details.route);
    println!("Indications: {}", details.indications);
    println!("Inclusion criteria: {}", details.inclusion_criteria);
    println!("Exclusion criteria: {}", details.exclusion_criteria);
    println!("Side effects: {}", details.side_effects);
    println!("Advice if taken: {}", details.advice_if_taken);
    println!("Advice if declined: {}", details.advice_if_declined);
    match details.policy_date {
        Some(date) => println!("Policy date: {}", date),
        None => println!("Policy date: -"),
    }
    println!(
        "Last modified: {}",
        medication
            .last_modified
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    );
}

fn report(action: &str, err: MedicationError) {
    match err {
        MedicationError::Validation(errors) => {
            eprintln!("Error {}: validation failed", action);
            for e in &errors {
                eprintln!("  {}: {:?}", e.path, e.error);
            }
        }
        other => eprintln!("Error {}: {}", action, other),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'pocketbook --help' for commands");
        return Ok(());
    };

    let service = open_service(cli.data_dir)?;

    match command {
        Commands::List => {
            let summaries = service.list()?;
            if summaries.is_empty() {
                println!("No medications found.");
            } else {
                for summary in summaries {
                    println!(
                        "ID: {}, Name: {}, Last modified: {}",
                        summary.id,
                        summary.name,
                        summary
                            .last_modified
                            .to_rfc3339_opts(SecondsFormat::Secs, true)
                    );
                }
            }
        }
        Commands::Show { id } => match service.find(MedicationId::new(id)) {
            Ok(medication) => print_medication(&medication),
            Err(e) => report("reading medication", e),
        },
        Commands::Create { fields } => {
            match service.create(&fields.apply(MedicationDraft::default())) {
                Ok(medication) => println!("Created medication {}", medication),
                Err(e) => report("creating medication", e),
            }
        }
        Commands::Update { id, fields } => {
            let id = MedicationId::new(id);
            let result = service
                .find(id)
                .and_then(|current| {
                    service.update(id, &fields.apply(MedicationDraft::from_medication(&current)))
                });
            match result {
                Ok(medication) => println!("Updated medication {}", medication),
                Err(e) => report("updating medication", e),
            }
        }
        Commands::Delete { id } => match service.delete(MedicationId::new(id)) {
            Ok(()) => println!("Deleted medication {}", id),
            Err(e) => report("deleting medication", e),
        },
    }

    Ok(())
}
