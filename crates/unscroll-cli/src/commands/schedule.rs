use clap::Subcommand;
use unscroll_core::{Database, DayMask, ScheduleRule};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Add a schedule rule for a target
    Add {
        /// Target identifier
        target: String,
        /// Window start, HH:MM
        #[arg(long, default_value = "00:00")]
        start: String,
        /// Window end, HH:MM (exclusive; earlier than start wraps overnight)
        #[arg(long, default_value = "00:00")]
        end: String,
        /// Days: comma list of mon,tue,wed,thu,fri,sat,sun, or all/weekdays/weekends
        #[arg(long, default_value = "all")]
        days: String,
        /// Block the whole day regardless of times
        #[arg(long)]
        all_day: bool,
    },
    /// List a target's rules as JSON
    List { target: String },
    /// Remove a rule by id
    Remove { id: i64 },
    /// Enable a rule
    Enable { id: i64 },
    /// Disable a rule
    Disable { id: i64 },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        ScheduleAction::Add {
            target,
            start,
            end,
            days,
            all_day,
        } => {
            let (start_hour, start_minute) = parse_time(&start)?;
            let (end_hour, end_minute) = parse_time(&end)?;
            let rule = ScheduleRule {
                id: 0,
                target_id: target,
                start_hour,
                start_minute,
                end_hour,
                end_minute,
                days: parse_days(&days)?,
                all_day,
                enabled: true,
            };
            let id = db.insert_rule(&rule)?;
            println!("rule added: {id}");
        }
        ScheduleAction::List { target } => {
            let rules = db.rules_for(&target)?;
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        ScheduleAction::Remove { id } => {
            db.remove_rule(id)?;
            println!("rule removed: {id}");
        }
        ScheduleAction::Enable { id } => {
            db.set_rule_enabled(id, true)?;
            println!("rule enabled: {id}");
        }
        ScheduleAction::Disable { id } => {
            db.set_rule_enabled(id, false)?;
            println!("rule disabled: {id}");
        }
    }
    Ok(())
}

fn parse_time(s: &str) -> Result<(u8, u8), String> {
    let (h, m) = s
        .split_once(':')
        .ok_or_else(|| format!("invalid time {s:?}, expected HH:MM"))?;
    let hour: u8 = h.parse().map_err(|_| format!("invalid hour in {s:?}"))?;
    let minute: u8 = m.parse().map_err(|_| format!("invalid minute in {s:?}"))?;
    if hour > 23 || minute > 59 {
        return Err(format!("time {s:?} out of range"));
    }
    Ok((hour, minute))
}

fn parse_days(spec: &str) -> Result<DayMask, String> {
    match spec {
        "all" => return Ok(DayMask::ALL_DAYS),
        "weekdays" => return Ok(DayMask::WEEKDAYS),
        "weekends" => return Ok(DayMask::WEEKENDS),
        _ => {}
    }

    let mut mask = DayMask(0);
    for token in spec.split(',') {
        let day = match token.trim() {
            "mon" => DayMask::MONDAY,
            "tue" => DayMask::TUESDAY,
            "wed" => DayMask::WEDNESDAY,
            "thu" => DayMask::THURSDAY,
            "fri" => DayMask::FRIDAY,
            "sat" => DayMask::SATURDAY,
            "sun" => DayMask::SUNDAY,
            other => return Err(format!("unknown day {other:?}")),
        };
        mask = mask.union(day);
    }
    if mask.0 == 0 {
        return Err("no days given".to_string());
    }
    Ok(mask)
}
