use std::process::Command;

use color_eyre::eyre::eyre;
use color_eyre::{Help, Result};

#[derive(thiserror::Error, Debug)]
pub enum ChargeQueryError {
    #[error("Could not read current battery capacity")]
    CapacityNotFound,

    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Capture the full power management log from `pmset -g log`.
pub fn pmset_log() -> Result<String> {
    let output = Command::new("pmset")
        .args(["-g", "log"])
        .output()
        .note("Failed to run pmset")?;

    if !output.status.success() {
        return Err(eyre!("pmset -g log exited with {}", output.status));
    }

    Ok(String::from_utf8(output.stdout).note("pmset output is not valid UTF-8")?)
}

/// The battery charge right now, from the ioreg battery registry entry.
pub fn current_charge() -> Result<i64, ChargeQueryError> {
    let output = Command::new("ioreg")
        .args(["-rn", "AppleSmartBattery"])
        .output()
        .note("Failed to run ioreg")?;

    if !output.status.success() {
        return Err(eyre!("ioreg exited with {}", output.status).into());
    }

    let text = String::from_utf8_lossy(&output.stdout);
    parse_current_capacity(&text).ok_or(ChargeQueryError::CapacityNotFound)
}

/// Find the `CurrentCapacity` field; its value is the last token of the line.
fn parse_current_capacity(ioreg_output: &str) -> Option<i64> {
    ioreg_output
        .lines()
        .find(|line| line.contains("CurrentCapacity"))
        .and_then(|line| line.split_whitespace().last())
        .and_then(|value| value.parse().ok())
}
