//! Hour-amount validation for jobs and exchanges.
//!
//! Hours are exact decimals (`NUMERIC(6,2)` in the database). The same rule
//! applies at job creation and again when a completion overrides the hours
//! of record.

use rust_decimal::Decimal;

/// Smallest amount of work that can be recorded: a quarter hour.
pub fn min_hours() -> Decimal {
    Decimal::new(25, 2)
}

/// Largest amount a single job may record.
pub fn max_hours() -> Decimal {
    Decimal::from(100)
}

/// Validate that an hour amount is within the accepted range.
pub fn validate_hours(hours: Decimal) -> Result<(), String> {
    if hours < min_hours() || hours > max_hours() {
        return Err(format!(
            "Hours must be between {} and {}, got {hours}",
            min_hours(),
            max_hours()
        ));
    }
    Ok(())
}
