use chrono::NaiveDateTime;
use color_eyre::eyre::eyre;

use crate::parse::{parse_charge_line, parse_display_line, PowerSource};
use crate::power::ChargeQueryError;
use crate::report::{Interval, IntervalLabel, SessionReport, Totals};

/// Intervals shorter than this are folded into the totals but not reported
/// individually.
const REPORT_THRESHOLD_SECS: i64 = 300;

/// Beyond this distance a nearest-charge match is considered stale and a
/// warning is printed.
const STALE_MATCH_SECS: i64 = 600;

#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("Could not determine when the PC was last unplugged from AC.")]
    UnplugNotFound,

    #[error("Could not determine the state of the display when AC was unplugged.")]
    DisplayStateNotFound,

    #[error(transparent)]
    ChargeQuery(#[from] ChargeQueryError),

    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Where the current battery session starts: the last `Using Batt` entry
/// before the AC -> battery transition.
#[derive(Debug, Clone, Copy)]
struct SessionStart {
    /// Index one past the battery charge line.
    index: usize,
    timestamp: NaiveDateTime,
    charge: i64,
}

/// Charge samples of the session, ascending by timestamp, used to look up the
/// battery level at arbitrary moments.
struct ChargeHistory {
    events: Vec<(NaiveDateTime, i64)>,
}

impl ChargeHistory {
    fn collect(lines: &[&str]) -> Self {
        Self {
            events: lines
                .iter()
                .filter_map(|line| parse_charge_line(line))
                .map(|event| (event.timestamp, event.charge))
                .collect(),
        }
    }

    /// The sample closest to `timestamp`. On an exact tie between the two
    /// neighbors the later one wins. Prints a warning when the best match is
    /// more than [`STALE_MATCH_SECS`] away, but still returns it.
    fn closest_event(&self, timestamp: NaiveDateTime) -> Option<(NaiveDateTime, i64)> {
        let pos = self.events.partition_point(|(ts, _)| *ts < timestamp);
        if pos == 0 {
            return self.events.first().copied();
        }
        if pos == self.events.len() {
            return self.events.last().copied();
        }

        let before = self.events[pos - 1];
        let after = self.events[pos];
        let delta_to_before = (timestamp - before.0).num_seconds();
        let delta_to_after = (after.0 - timestamp).num_seconds();
        if delta_to_after.min(delta_to_before) > STALE_MATCH_SECS {
            println!(
                "Next best charge info is {} minutes off",
                delta_to_after.min(delta_to_before) / 60
            );
        }

        if delta_to_before < delta_to_after {
            Some(before)
        } else {
            Some(after)
        }
    }

    fn charge_at(&self, timestamp: NaiveDateTime) -> Result<i64, AnalysisError> {
        let (_, charge) = self
            .closest_event(timestamp)
            .ok_or_else(|| eyre!("No charge samples in the session window"))?;
        Ok(charge)
    }
}

/// Analyze a pmset log and build the report for the current battery session.
///
/// `now` is the wall-clock time of the invocation and `current_charge` is the
/// live battery query; both only matter when the log ends while still
/// unplugged.
pub fn analyze(
    lines: &[&str],
    now: NaiveDateTime,
    current_charge: impl FnOnce() -> Result<i64, ChargeQueryError>,
) -> Result<SessionReport, AnalysisError> {
    let (start, end_index) = find_session_boundary(lines)?;
    let start_display_state = find_start_display_state(&lines[..start.index])?;

    // The slice starts one line early so the unplug battery entry itself is
    // part of the lookup table.
    let history = ChargeHistory::collect(&lines[start.index - 1..]);

    let mut current_display_state = start_display_state;
    let mut last_display_switch = start.timestamp;
    let mut totals = Totals::default();
    let mut intervals = Vec::new();

    for line in &lines[start.index..end_index] {
        let Some(display) = parse_display_line(line) else {
            continue;
        };
        if display.state == current_display_state {
            continue;
        }

        let duration = (display.timestamp - last_display_switch).num_seconds();
        let consumption =
            history.charge_at(last_display_switch)? - history.charge_at(display.timestamp)?;

        // The display just switched, so the label describes the interval that
        // ended: switching to "on" means the machine was asleep until now.
        let entered_on = display.state == "on";
        if duration > REPORT_THRESHOLD_SECS {
            intervals.push(Interval {
                start: last_display_switch,
                end: display.timestamp,
                consumption,
                duration_secs: duration,
                label: if entered_on {
                    IntervalLabel::Sleep
                } else {
                    IntervalLabel::Usage
                },
            });
        }

        if entered_on {
            totals.sleep_consumption += consumption;
            totals.sleep_secs += duration;
        } else {
            totals.usage_consumption += consumption;
            totals.usage_secs += duration;
        }

        current_display_state = display.state;
        last_display_switch = display.timestamp;
    }

    // Still on battery: close the session at the present moment. The tool is
    // run interactively, so the display must be on right now.
    if end_index == lines.len() {
        let duration = (now - last_display_switch).num_seconds();
        let consumption = history.charge_at(last_display_switch)? - current_charge()?;
        totals.usage_consumption += consumption;
        totals.usage_secs += duration;
        intervals.push(Interval {
            start: last_display_switch,
            end: now,
            consumption,
            duration_secs: duration,
            label: IntervalLabel::Usage,
        });
    }

    Ok(SessionReport {
        unplugged_at: start.timestamp,
        start_charge: start.charge,
        intervals,
        totals,
    })
}

/// Scan backward for the last AC -> battery transition. Returns the session
/// start and the index where the reporting window ends (the line count when
/// still unplugged, the position of the trailing AC entry otherwise).
fn find_session_boundary(lines: &[&str]) -> Result<(SessionStart, usize), AnalysisError> {
    let mut end_index = lines.len();
    let mut start = None;
    let mut seen_battery = false;
    let mut transition_found = false;

    for (offset, line) in lines.iter().rev().enumerate() {
        let Some(event) = parse_charge_line(line) else {
            continue;
        };
        let index = lines.len() - offset - 1;

        match event.source {
            // Still plugged in as of this entry: the report ends here.
            PowerSource::Ac if !seen_battery => end_index = index,
            // An AC entry before battery entries is the unplug transition.
            PowerSource::Ac => {
                transition_found = true;
                break;
            }
            // The earliest battery entry seen so far is the best candidate
            // for the session start.
            PowerSource::Battery => {
                start = Some(SessionStart {
                    index: index + 1,
                    timestamp: event.timestamp,
                    charge: event.charge,
                });
                seen_battery = true;
            }
        }
    }

    match (transition_found, start) {
        (true, Some(start)) => Ok((start, end_index)),
        _ => Err(AnalysisError::UnplugNotFound),
    }
}

/// The display state in effect when the machine was unplugged: the most
/// recent display entry before the session start.
fn find_start_display_state(lines: &[&str]) -> Result<String, AnalysisError> {
    lines
        .iter()
        .rev()
        .find_map(|line| parse_display_line(line))
        .map(|event| event.state)
        .ok_or(AnalysisError::DisplayStateNotFound)
}
