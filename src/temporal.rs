use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MirrorError;

/// Single-character marker appended to BPS filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Annual,
    YearToDate,
}

impl Frequency {
    pub fn marker(self) -> char {
        match self {
            Frequency::Annual => 'a',
            Frequency::YearToDate => 'y',
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.marker())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: u16,
    pub month: u8,
}

impl YearMonth {
    pub fn new(year: u16, month: u8) -> Result<Self, MirrorError> {
        if !(1..=12).contains(&month) {
            return Err(MirrorError::InvalidMonth { year, month });
        }
        Ok(Self { year, month })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

pub fn annual_token(year: u16) -> u32 {
    u32::from(year)
}

/// Two-digit year followed by the two-digit month, e.g. `(2024, 12)` is `2412`.
///
/// Months outside 1..=12 would alias another valid pair, so they are rejected.
pub fn monthly_token(year: u16, month: u8) -> Result<u32, MirrorError> {
    if !(1..=12).contains(&month) {
        return Err(MirrorError::InvalidMonth { year, month });
    }
    Ok(encode_year_month(year, month))
}

fn encode_year_month(year: u16, month: u8) -> u32 {
    u32::from(year % 100) * 100 + u32::from(month)
}

/// Temporal part of a BPS filename. Always rendered zero-padded to four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalToken {
    Annual(u16),
    YearToDate(YearMonth),
}

impl TemporalToken {
    pub fn year_to_date(year: u16, month: u8) -> Result<Self, MirrorError> {
        Ok(Self::YearToDate(YearMonth::new(year, month)?))
    }

    pub fn value(self) -> u32 {
        match self {
            TemporalToken::Annual(year) => annual_token(year),
            TemporalToken::YearToDate(ym) => encode_year_month(ym.year, ym.month),
        }
    }

    pub fn frequency(self) -> Frequency {
        match self {
            TemporalToken::Annual(_) => Frequency::Annual,
            TemporalToken::YearToDate(_) => Frequency::YearToDate,
        }
    }

    /// Full calendar year the token refers to.
    pub fn year(self) -> u16 {
        match self {
            TemporalToken::Annual(year) => year,
            TemporalToken::YearToDate(ym) => ym.year,
        }
    }
}

impl fmt::Display for TemporalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{}", self.value(), self.frequency())
    }
}
