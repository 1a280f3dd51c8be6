use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use rxnotes_lib::adherence::{date_range, summarize_adherence, DailyMedicationRecord};
use rxnotes_lib::config::{Settings, APP_VERSION};
use rxnotes_lib::health_alerts::{check_health, HealthSnapshot, RiskLevel};
use rxnotes_lib::models::EntryFields;
use rxnotes_lib::nutrition::{check_meal_plan, parse_allergies, safe_meals, MealPlan};
use rxnotes_lib::prescription::{
    correct_medicine_names, extract_known, plan_for, sanitize_ocr_text, validate_fields,
    KnownMedicines, WorkingSet,
};
use rxnotes_lib::submission::{submit, HttpPrescriptionClient};

#[derive(Parser, Debug)]
#[command(
    name = "rxnotes",
    version = APP_VERSION,
    about = "Turn OCR'd prescription notes into validated medication schedules."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract medication entries from OCR text.
    Extract {
        /// Text file to read; `-` reads stdin.
        #[arg(short, long)]
        input: PathBuf,
        /// JSON array of known medicine names (overrides RXNOTES_MEDICINES).
        #[arg(short, long)]
        medicines: Option<PathBuf>,
        /// Fix near-miss spellings of known names before extracting.
        #[arg(long)]
        correct: bool,
        /// Print dose timetables instead of entries.
        #[arg(long)]
        plan: bool,
    },
    /// Validate one entry's fields.
    Check(FieldArgs),
    /// Append a manually entered medicine to a working-set file.
    Add {
        #[arg(short, long)]
        set: PathBuf,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Replace the entry at INDEX in a working-set file.
    Edit {
        #[arg(short, long)]
        set: PathBuf,
        #[arg(long)]
        index: usize,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Remove one schedule token from one entry of a working-set file.
    Unschedule {
        #[arg(short, long)]
        set: PathBuf,
        #[arg(long)]
        entry: usize,
        #[arg(long)]
        token: usize,
    },
    /// Validate a working-set file and upload it.
    Submit {
        #[arg(short, long)]
        set: PathBuf,
        #[arg(short, long)]
        user: String,
        /// Server base URL (overrides RXNOTES_SERVER).
        #[arg(long)]
        server: Option<String>,
    },
    /// Flag health readings outside their healthy range.
    Health {
        #[arg(long)]
        bmi: Option<String>,
        /// Blood pressure as systolic/diastolic.
        #[arg(long)]
        bp: Option<String>,
        #[arg(long)]
        cholesterol: Option<String>,
        /// Predicted disease risk in percent.
        #[arg(long)]
        risk: Option<f64>,
    },
    /// Screen a meal plan JSON file against an allergy list.
    Meals {
        #[arg(short, long)]
        plan: PathBuf,
        /// Comma-separated allergies.
        #[arg(short, long)]
        allergies: String,
    },
    /// Summarise adherence from daily intake records.
    Adherence {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct FieldArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    dosage: String,
    #[arg(long)]
    days: String,
    /// Comma-separated schedule tokens, e.g. "1-0-1, after meal".
    #[arg(long)]
    schedule: String,
}

impl From<FieldArgs> for EntryFields {
    fn from(args: FieldArgs) -> Self {
        EntryFields {
            name: args.name,
            dosage: args.dosage,
            days: args.days,
            schedule: args.schedule,
        }
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Cannot read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
}

fn load_set(path: &Path) -> anyhow::Result<WorkingSet> {
    if !path.exists() {
        return Ok(WorkingSet::new());
    }
    let data = read_input(path)?;
    serde_json::from_str(&data).with_context(|| format!("Malformed working set {}", path.display()))
}

fn save_set(path: &Path, set: &WorkingSet) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(set)?;
    std::fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn known_medicines(override_path: Option<PathBuf>, settings: &Settings) -> anyhow::Result<KnownMedicines> {
    match override_path.or_else(|| settings.medicines_path.clone()) {
        Some(path) => Ok(KnownMedicines::load(&path)?),
        None => Ok(KnownMedicines::builtin()),
    }
}

fn main() -> anyhow::Result<()> {
    rxnotes_lib::init_tracing();
    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Extract {
            input,
            medicines,
            correct,
            plan,
        } => {
            let known = known_medicines(medicines, &settings)?;
            let mut text = sanitize_ocr_text(&read_input(&input)?);
            if correct {
                text = correct_medicine_names(&text, known.names());
            }

            let entries = extract_known(&text, &known);
            if plan {
                let plans: Vec<_> = entries.iter().map(plan_for).collect();
                print_json(&plans)?;
            } else {
                print_json(&entries)?;
            }
        }
        Command::Check(fields) => {
            let fields = EntryFields::from(fields);
            let validated = validate_fields(&fields).map_err(|e| anyhow::anyhow!("{:?}: {e}", e.field()))?;
            print_json(&validated.into_entry(false))?;
        }
        Command::Add { set, fields } => {
            let mut working = load_set(&set)?;
            working.add(&fields.into())?;
            save_set(&set, &working)?;
            println!("Medicine added successfully! ({} entries)", working.len());
        }
        Command::Edit { set, index, fields } => {
            let mut working = load_set(&set)?;
            working.edit(index, &fields.into())?;
            save_set(&set, &working)?;
            println!("Medicine updated successfully!");
        }
        Command::Unschedule { set, entry, token } => {
            let mut working = load_set(&set)?;
            let removed = working.remove_interval_token(entry, token)?;
            save_set(&set, &working)?;
            println!("Removed \"{removed}\" from entry {entry}");
        }
        Command::Submit { set, user, server } => {
            let working = load_set(&set)?;
            let mut settings = settings;
            if let Some(server) = server {
                settings.server_url = server;
            }
            let client = HttpPrescriptionClient::from_settings(&settings)?;
            let receipt = submit(&client, &user, &working)
                .with_context(|| format!("Upload to {} failed", client.endpoint()))?;
            println!(
                "{}",
                receipt
                    .message
                    .unwrap_or_else(|| "Prescription data uploaded".to_string())
            );
        }
        Command::Health {
            bmi,
            bp,
            cholesterol,
            risk,
        } => {
            let alerts = check_health(&HealthSnapshot {
                bmi,
                blood_pressure: bp,
                cholesterol,
            });
            if alerts.is_empty() {
                println!("All readings within healthy range");
            }
            for alert in &alerts {
                println!("{} = {}: {}", alert.field.as_str(), alert.value, alert.message);
            }
            if let Some(percent) = risk {
                println!("Disease risk {percent}%: {}", RiskLevel::from_percent(percent).as_str());
            }
        }
        Command::Meals { plan, allergies } => {
            let data = read_input(&plan)?;
            let plan: MealPlan = serde_json::from_str(&data)
                .with_context(|| format!("Malformed meal plan {}", plan.display()))?;
            let allergies = parse_allergies(&allergies);

            for warning in check_meal_plan(&plan, &allergies) {
                println!(
                    "Warning: {} ({}) contains {}",
                    warning.meal.as_str(),
                    warning.recipe,
                    warning.allergens.join(", ")
                );
            }
            for (meal, recipe) in safe_meals(&plan, &allergies) {
                println!("Safe: {} ({})", meal.as_str(), recipe.name);
            }
        }
        Command::Adherence { input } => {
            let data = read_input(&input)?;
            let days: Vec<DailyMedicationRecord> = serde_json::from_str(&data)
                .with_context(|| format!("Malformed intake records {}", input.display()))?;

            let Some((first, last)) = date_range(&days) else {
                bail!("No medication data available");
            };
            println!("Date range: {first} to {last}");
            for summary in summarize_adherence(&days) {
                println!(
                    "{}: taken {}, missed {}, adherence {}",
                    summary.name,
                    summary.taken,
                    summary.missed,
                    summary.percent_label()
                );
            }
        }
    }

    Ok(())
}
