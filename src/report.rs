use std::fmt::Display;

use chrono::NaiveDateTime;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalLabel {
    Usage,
    Sleep,
}

impl Display for IntervalLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                IntervalLabel::Usage => "usage",
                IntervalLabel::Sleep => "sleep",
            }
        )
    }
}

/// One stretch between two display switches, as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub consumption: i64,
    pub duration_secs: i64,
    pub label: IntervalLabel,
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to {}: Used {:>3}% of battery during {:>3}h {:>2}min of {}",
            self.start.format(TIME_FORMAT),
            self.end.format(TIME_FORMAT),
            self.consumption,
            self.duration_secs / 3600,
            self.duration_secs % 3600 / 60,
            self.label,
        )
    }
}

/// Running sums over the whole session, split by display state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub usage_secs: i64,
    pub usage_consumption: i64,
    pub sleep_secs: i64,
    pub sleep_consumption: i64,
}

impl Totals {
    pub fn usage_rate(&self) -> f64 {
        rate(self.usage_consumption, self.usage_secs)
    }

    pub fn sleep_rate(&self) -> f64 {
        rate(self.sleep_consumption, self.sleep_secs)
    }
}

fn rate(consumption: i64, secs: i64) -> f64 {
    if secs > 0 {
        consumption as f64 / (secs as f64 / 3600.0)
    } else {
        0.0
    }
}

/// Everything the analysis produced for one battery session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub unplugged_at: NaiveDateTime,
    pub start_charge: i64,
    pub intervals: Vec<Interval>,
    pub totals: Totals,
}

impl Display for SessionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for interval in &self.intervals {
            writeln!(f, "{interval}")?;
        }

        writeln!(f)?;
        writeln!(f, "Summary:")?;
        writeln!(
            f,
            "Unplugged from AC on {} with {}% battery",
            self.unplugged_at.format(TIME_FORMAT),
            self.start_charge,
        )?;
        writeln!(
            f,
            "Used {:>3}% of battery during {:>3}h {:>2}min of active usage",
            self.totals.usage_consumption,
            self.totals.usage_secs / 3600,
            self.totals.usage_secs % 3600 / 60,
        )?;
        writeln!(
            f,
            "Used {:>3}% of battery during {:>3}h {:>2}min of sleep",
            self.totals.sleep_consumption,
            self.totals.sleep_secs / 3600,
            self.totals.sleep_secs % 3600 / 60,
        )?;

        writeln!(f)?;
        writeln!(f, "Statistics:")?;
        writeln!(
            f,
            "{:.2}%/h battery loss during usage",
            self.totals.usage_rate()
        )?;
        writeln!(
            f,
            "{:.2}%/h battery loss during sleep",
            self.totals.sleep_rate()
        )
    }
}
