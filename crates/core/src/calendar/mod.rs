//! Date adjustment for installments, balloons, and amortization rows.
//!
//! Every due date in a schedule is derived through [`adjust_due_date`] so
//! that installments and balloons falling in the same month agree.

pub mod due_date;

#[cfg(test)]
mod due_date_props;

pub use due_date::{PeriodKind, adjust_due_date, days_in_month, months_between};
