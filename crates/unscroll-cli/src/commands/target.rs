use clap::Subcommand;
use serde::Serialize;
use unscroll_core::{BlockedTarget, Database};

#[derive(Subcommand)]
pub enum TargetAction {
    /// Add or update a blocked target
    Add {
        /// Target identifier (e.g. an app package id)
        id: String,
        /// Human-readable name
        name: String,
    },
    /// Remove a target and everything attached to it
    Remove { id: String },
    /// List targets with attempt state as JSON
    List,
    /// Enable blocking for a target
    Enable { id: String },
    /// Disable blocking for a target
    Disable { id: String },
}

#[derive(Serialize)]
struct TargetRow {
    id: String,
    display_name: String,
    enabled: bool,
    attempt_count: u32,
    last_success_time: Option<chrono::DateTime<chrono::Utc>>,
}

pub fn run(action: TargetAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        TargetAction::Add { id, name } => {
            db.upsert_target(&BlockedTarget::new(&id, &name))?;
            println!("target added: {id}");
        }
        TargetAction::Remove { id } => {
            db.remove_target(&id)?;
            println!("target removed: {id}");
        }
        TargetAction::List => {
            let mut rows = Vec::new();
            for target in db.list_targets()? {
                let record = db.attempt_record(&target.id)?;
                rows.push(TargetRow {
                    attempt_count: record.as_ref().map_or(0, |r| r.attempt_count),
                    last_success_time: record.and_then(|r| r.last_success_time),
                    id: target.id,
                    display_name: target.display_name,
                    enabled: target.enabled,
                });
            }
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        TargetAction::Enable { id } => {
            db.set_target_enabled(&id, true)?;
            println!("target enabled: {id}");
        }
        TargetAction::Disable { id } => {
            db.set_target_enabled(&id, false)?;
            println!("target disabled: {id}");
        }
    }
    Ok(())
}
