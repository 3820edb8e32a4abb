use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::error::{LossError, Result};

/// How the summed loss is divided down to a single scalar.
///
/// - `Full`      — by every element of the batch (`outer_num * inner_num`)
/// - `Valid`     — by the number of counted elements; falls back to `Full`
///                 when the count is unknown (`-1`)
/// - `BatchSize` — by the batch size (`outer_num`)
/// - `None`      — not at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NormalizationMode {
    Full,
    Valid,
    BatchSize,
    None,
}

impl NormalizationMode {
    pub const ALL: [NormalizationMode; 4] = [
        NormalizationMode::Full,
        NormalizationMode::Valid,
        NormalizationMode::BatchSize,
        NormalizationMode::None,
    ];

    /// Decodes the numeric wire value (FULL=0, VALID=1, BATCH_SIZE=2, NONE=3).
    ///
    /// An unknown code means the caller's schema and this enum have diverged,
    /// so it is reported as fatal rather than as a config problem.
    pub fn from_code(code: i32) -> Result<NormalizationMode> {
        match code {
            0 => Ok(NormalizationMode::Full),
            1 => Ok(NormalizationMode::Valid),
            2 => Ok(NormalizationMode::BatchSize),
            3 => Ok(NormalizationMode::None),
            other => Err(LossError::fatal(format!("unknown normalization mode: {other}"))),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            NormalizationMode::Full => 0,
            NormalizationMode::Valid => 1,
            NormalizationMode::BatchSize => 2,
            NormalizationMode::None => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NormalizationMode::Full => "FULL",
            NormalizationMode::Valid => "VALID",
            NormalizationMode::BatchSize => "BATCH_SIZE",
            NormalizationMode::None => "NONE",
        }
    }
}

impl fmt::Display for NormalizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NormalizationMode {
    type Err = LossError;

    fn from_str(s: &str) -> Result<Self> {
        NormalizationMode::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LossError::config(format!("unknown normalization mode '{s}'")))
    }
}

/// Divisor for the summed loss.
///
/// `valid_count == -1` means "not tracked" and makes `Valid` behave like
/// `Full`. The result is never below 1 so a batch with no counted elements
/// still yields a finite loss.
pub fn get_normalizer(
    mode: NormalizationMode,
    outer_num: usize,
    inner_num: usize,
    valid_count: i64,
) -> f64 {
    let normalizer = match mode {
        NormalizationMode::Full => outer_num as f64 * inner_num as f64,
        NormalizationMode::Valid if valid_count == -1 => outer_num as f64 * inner_num as f64,
        NormalizationMode::Valid => valid_count as f64,
        NormalizationMode::BatchSize => outer_num as f64,
        NormalizationMode::None => 1.0,
    };
    normalizer.max(1.0)
}
