use chrono::NaiveDateTime;
use regex::Regex;

const TIMESTAMP_REGEX: &str = r"^(?P<timestamp>\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}:\d{2})\s[+-]\d{4}";

lazy_static::lazy_static! {
    static ref CHARGE: Regex = Regex::new(&format!(
        r"{TIMESTAMP_REGEX}\s+\w+\s+.*Using (?P<type>AC|Batt|BATT)\s*\(Charge:\s*(?P<charge>\d+)%*\)"
    ))
    .unwrap();
    static ref DISPLAY: Regex = Regex::new(&format!(
        r"{TIMESTAMP_REGEX}\s+\w+\s+Display is turned (?P<state>\w+)"
    ))
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSource {
    Ac,
    Battery,
}

/// A `Using AC/Batt (Charge: NN%)` entry from the pmset log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeEvent {
    pub timestamp: NaiveDateTime,
    pub charge: i64,
    pub source: PowerSource,
}

/// A `Display is turned <state>` entry. The state word is kept raw since
/// pmset emits more than just "on"/"off" depending on the OS version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayEvent {
    pub timestamp: NaiveDateTime,
    pub state: String,
}

pub fn parse_charge_line(line: &str) -> Option<ChargeEvent> {
    let captures = CHARGE.captures(line)?;
    let timestamp = parse_timestamp(&captures["timestamp"])?;
    let charge = captures["charge"].parse().ok()?;
    let source = match &captures["type"] {
        "AC" => PowerSource::Ac,
        _ => PowerSource::Battery,
    };

    Some(ChargeEvent {
        timestamp,
        charge,
        source,
    })
}

pub fn parse_display_line(line: &str) -> Option<DisplayEvent> {
    let captures = DISPLAY.captures(line)?;
    let timestamp = parse_timestamp(&captures["timestamp"])?;

    Some(DisplayEvent {
        timestamp,
        state: captures["state"].to_string(),
    })
}

fn parse_timestamp(timestamp: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").ok()
}
