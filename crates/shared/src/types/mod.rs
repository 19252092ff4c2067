//! Common types used across the application.

pub mod date;
pub mod day_count;
pub mod money;

pub use date::{format_dmy, parse_date};
pub use day_count::DayCountConvention;
pub use money::{HALF_CENT, MONEY_SCALE, Money, round_money, settle_dust, sum_money, truncate_money};
