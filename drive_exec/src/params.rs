//! Parameters for the drive executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct DriveExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Minimum log level, one of "trace", "debug" or "info".
    pub min_log_level: String,

    /// Stop the loop if the cycle overruns this many times in a row, zero to
    /// never stop.
    pub max_consec_cycle_overruns: u64,
}

impl Default for DriveExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            min_log_level: "debug".into(),
            max_consec_cycle_overruns: 0,
        }
    }
}

impl DriveExecParams {
    /// The minimum log level, falling back to debug if it can't be parsed.
    pub fn log_level(&self) -> util::logger::LevelFilter {
        self.min_log_level.parse().unwrap_or(util::logger::LevelFilter::Debug)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::logger::LevelFilter;

    #[test]
    fn test_parse() {
        let p: DriveExecParams = util::params::from_str(
            "cycle_period_s = 0.01\nmin_log_level = \"trace\"\nmax_consec_cycle_overruns = 50\n"
        ).unwrap();
        assert_eq!(p.cycle_period_s, 0.01);
        assert_eq!(p.log_level(), LevelFilter::Trace);
        assert_eq!(p.max_consec_cycle_overruns, 50);
    }
}
