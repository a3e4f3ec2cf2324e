use std::{
    env,
    io::{self, Write},
    process::{Command, Stdio},
};

use anyhow::{Context, Result};

use jikan_maru::{
    schedule::{
        Clock, ClockReading, DayOfWeek, FixedClock, SystemClock, TimePoint, day::UnknownDay, format_duration,
        partition,
    },
    session::ScheduleEditSession,
    stats::{StatsSummary, stats},
    storage::{
        LocalActivityStore,
        config::{Config, StoreBackend},
    },
    sync::{ActivityStore, RestActivityStore},
    ui::{LayoutSegment, layout},
};

pub const USAGE: &str = "Usage: jikan-maru [--day LABEL] [--at HH:MM] [--local]";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AgendaArgs {
    pub day: Option<DayOfWeek>,
    pub at: Option<TimePoint>,
    pub force_local: bool,
}

pub fn parse_cli_args<I>(args: I) -> Result<AgendaArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = AgendaArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--day" => {
                let value = args.next().ok_or("--day needs a weekday")?;
                parsed.day = Some(value.parse().map_err(|e: UnknownDay| e.to_string())?);
            }
            "--at" => {
                let value = args.next().ok_or("--at needs a time")?;
                parsed.at = Some(
                    value
                        .parse()
                        .map_err(|_| format!("Invalid time '{}'. Use HH:MM.", value))?,
                );
            }
            "--local" => {
                parsed.force_local = true;
            }
            "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {}", arg)),
        }
    }

    Ok(parsed)
}

fn open_store(config: &Config, force_local: bool) -> Result<Box<dyn ActivityStore>> {
    let backend = if force_local { StoreBackend::Local } else { config.store.backend };
    match backend {
        StoreBackend::Rest => {
            let mut store = RestActivityStore::new(config.store.base_url.clone(), config.store.api_key.clone());
            if let Some(token) = &config.store.access_token {
                store = store.with_access_token(token.clone());
            }
            tracing::info!("Using remote store at {}", config.store.base_url);
            Ok(Box::new(store))
        }
        StoreBackend::Local => {
            let store = LocalActivityStore::open(&config.store.local_path)
                .with_context(|| format!("Failed to open {}", config.store.local_path.display()))?;
            tracing::info!("Using local store at {}", config.store.local_path.display());
            Ok(Box::new(store))
        }
    }
}

pub async fn run_agenda_mode(args: AgendaArgs) -> Result<()> {
    let config = Config::load_or_create().context("Failed to load config")?;
    let store = open_store(&config, args.force_local)?;

    let reading = SystemClock.now();
    let day = args.day.unwrap_or(reading.day);
    let clock = FixedClock(ClockReading {
        day,
        time: args.at.unwrap_or(reading.time),
    });

    let mut session = ScheduleEditSession::new(config.user.id.clone(), day)
        .with_timeout(config.session.remote_timeout());
    session.reload(store.as_ref()).await?;

    let agenda = format_agenda_text(&session, &config, &clock)?;
    display_with_pager(&agenda).context("Failed to display agenda")
}

fn format_agenda_text(session: &ScheduleEditSession, config: &Config, clock: &dyn Clock) -> Result<String> {
    let day = session.current_day();
    let day_partition = partition(session.day_intervals())?;
    let segments = layout(&day_partition, &config.wheel)?;
    let now = clock.now();

    let mut lines = Vec::new();
    lines.push(format!("Agenda – {}", day));
    lines.push(String::new());

    for segment in &segments {
        lines.push(format!("- {}", build_segment_line(segment)));
    }

    lines.push(String::new());
    let current = session.current_activity(now.time)?;
    lines.push(match current {
        Some(activity) => format!("Now ({}): {} until {}", now.time, activity.title, activity.end),
        None => format!("Now ({}): free", now.time),
    });

    lines.push(String::new());
    lines.extend(build_stats_lines(&stats(&day_partition)));

    Ok(lines.join("\n"))
}

fn build_segment_line(segment: &LayoutSegment) -> String {
    let interval = &segment.interval;
    let title = if interval.is_synthetic { "·" } else { interval.title.as_str() };
    let mut line = format!(
        "{:<12} {:>7.1}° → {:>7.1}°  {}",
        interval.time_range(),
        segment.start_angle,
        segment.end_angle,
        title
    );
    if segment.show_label {
        line.push_str(&format!(" ({})", format_duration(interval.duration_minutes())));
    }
    line
}

fn build_stats_lines(summary: &StatsSummary) -> Vec<String> {
    if summary.is_empty() {
        return vec!["No activities scheduled.".to_string()];
    }

    let mut lines = vec![
        format!(
            "Scheduled: {} ({}%)  Free: {} ({}%)",
            format_duration(summary.scheduled_minutes),
            summary.scheduled_percent,
            format_duration(summary.free_minutes),
            summary.free_percent
        ),
        format!(
            "{} activities, {} on average",
            summary.activity_count,
            format_duration(summary.average_activity_minutes)
        ),
    ];
    for total in &summary.per_title {
        lines.push(format!(
            "  {:<20} {:>12} {:>4}%",
            total.title,
            format_duration(total.minutes),
            total.percent_of_day
        ));
    }
    if let Some(longest) = &summary.longest {
        lines.push(format!("Longest: {}", longest.title));
    }
    if let Some(shortest) = &summary.shortest {
        lines.push(format!("Shortest: {}", shortest.title));
    }
    lines
}

fn display_with_pager(text: &str) -> Result<(), io::Error> {
    let pager_value = env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let mut parts = pager_value.split_whitespace();
    let cmd = match parts.next() {
        Some(c) => c,
        None => {
            println!("{text}");
            return Ok(());
        }
    };
    let args: Vec<&str> = parts.collect();

    match Command::new(cmd).args(&args).stdin(Stdio::piped()).spawn() {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.as_mut() {
                stdin.write_all(text.as_bytes())?;
            }
            let _ = child.wait();
        }
        Err(_) => {
            println!("{text}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jikan_maru::DaySchedule;
    use jikan_maru::schedule::Interval;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn hm(hour: u32, minute: u32) -> TimePoint {
        TimePoint::from_hm(hour, minute).unwrap()
    }

    #[test]
    fn no_arguments_means_today_now() {
        assert_eq!(parse_cli_args(args(&[])).unwrap(), AgendaArgs::default());
    }

    #[test]
    fn day_accepts_labels_and_english_names() {
        let parsed = parse_cli_args(args(&["--day", "Martes"])).unwrap();
        assert_eq!(parsed.day, Some(DayOfWeek::Tuesday));

        let parsed = parse_cli_args(args(&["--day", "friday"])).unwrap();
        assert_eq!(parsed.day, Some(DayOfWeek::Friday));
    }

    #[test]
    fn at_and_local_flags_are_read() {
        let parsed = parse_cli_args(args(&["--at", "13:30", "--local"])).unwrap();

        assert_eq!(parsed.at, Some(hm(13, 30)));
        assert!(parsed.force_local);
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(parse_cli_args(args(&["--day", "Someday"])).is_err());
        assert!(parse_cli_args(args(&["--at", "25:99"])).is_err());
        assert!(parse_cli_args(args(&["--day"])).is_err());
        assert!(parse_cli_args(args(&["--sample"])).is_err());
    }

    #[test]
    fn agenda_lists_segments_current_activity_and_stats() {
        let schedule = DaySchedule::from_days([(
            DayOfWeek::Monday,
            vec![
                Interval::new(hm(7, 0), hm(8, 0), "Breakfast").unwrap(),
                Interval::new(hm(8, 0), hm(12, 0), "Study").unwrap(),
            ],
        )]);
        let session = ScheduleEditSession::new("user-1", DayOfWeek::Monday).with_schedule(schedule);
        let clock = FixedClock(ClockReading {
            day: DayOfWeek::Monday,
            time: hm(9, 15),
        });

        let text = format_agenda_text(&session, &Config::default(), &clock).unwrap();

        assert!(text.starts_with("Agenda – Lunes"));
        assert!(text.contains("07:00-08:00"));
        assert!(text.contains("Now (09:15): Study until 12:00"));
        assert!(text.contains("Scheduled: 5 hours (21%)  Free: 19 hours (79%)"));
        assert!(text.contains("Longest: Study"));
    }

    #[test]
    fn empty_day_reports_no_activities() {
        let session = ScheduleEditSession::new("user-1", DayOfWeek::Sunday);
        let clock = FixedClock(ClockReading {
            day: DayOfWeek::Sunday,
            time: hm(9, 15),
        });

        let text = format_agenda_text(&session, &Config::default(), &clock).unwrap();

        assert!(text.contains("Now (09:15): free"));
        assert!(text.contains("No activities scheduled."));
    }
}
