use chrono::Duration;
use clap::Subcommand;
use vigil_core::storage::{Config, Database, StateStore};

#[derive(Subcommand)]
pub enum IntervalAction {
    /// Print the current check-in interval
    Show,
    /// Set the check-in interval in hours (e.g. 8, 16, 24, 32)
    Set { hours: u32 },
}

pub fn run(action: IntervalAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let mut tracker = super::load_tracker(&db, &config)?;

    match action {
        IntervalAction::Show => {
            println!("{}h", tracker.interval().num_hours());
        }
        IntervalAction::Set { hours } => {
            tracker.set_interval(Duration::hours(i64::from(hours)))?;
            db.save_interval(tracker.interval())?;
            println!(
                "Interval set to {hours}h. Next deadline: {}",
                tracker.deadline().to_rfc3339()
            );
        }
    }
    Ok(())
}
