//! Day/month/year date formatting for export collaborators.

use chrono::NaiveDate;

/// Display format used on every produced due date.
pub const DMY_FORMAT: &str = "%d/%m/%Y";

/// Formats a date as `dd/mm/YYYY`.
#[must_use]
pub fn format_dmy(date: NaiveDate) -> String {
    date.format(DMY_FORMAT).to_string()
}

/// Parses either `dd/mm/YYYY` or ISO `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, DMY_FORMAT).or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
}

/// Serde adapter: writes `dd/mm/YYYY`, reads `dd/mm/YYYY` or ISO dates.
///
/// Use with `#[serde(with = "parcela_shared::types::date::dmy")]`.
pub mod dmy {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// Serializes a date as `dd/mm/YYYY`.
    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_dmy(*date))
    }

    /// Deserializes a date from `dd/mm/YYYY` or `YYYY-MM-DD`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(de::Error::custom)
    }
}
