use clap::Subcommand;
use unscroll_core::storage::ACCESS_DURATION_OPTIONS;
use unscroll_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the full configuration as JSON
    Show,
    /// Set the access-grant duration in minutes
    SetAccessDuration {
        /// One of 1, 2, 3, 5, 10, 15, 30
        minutes: u32,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::SetAccessDuration { minutes } => {
            let mut config = Config::load()?;
            config.set_access_duration(minutes)?;
            config.save()?;
            println!(
                "access duration set to {minutes} minutes (options: {ACCESS_DURATION_OPTIONS:?})"
            );
        }
    }
    Ok(())
}
