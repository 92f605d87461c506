//! # Reporting
//!
//! Read models for the dashboard and the period boundaries they are
//! computed over. All boundaries are UTC.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::PaymentMethod;

// =============================================================================
// Read Models
// =============================================================================

/// A sales transaction joined with its product's current name.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesHistoryEntry {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub total_amount_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub reference_number: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Revenue per payment method.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentBreakdown {
    pub cash_cents: i64,
    pub mpesa_cents: i64,
    pub credit_cents: i64,
}

/// Best-selling product of a period, by revenue.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TopProduct {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

/// Dashboard revenue figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesMetrics {
    pub daily_revenue_cents: i64,
    pub weekly_revenue_cents: i64,
    pub monthly_revenue_cents: i64,
    /// Current month only.
    pub payment_breakdown: PaymentBreakdown,
    /// Current month only; `None` when nothing was sold.
    pub top_product: Option<TopProduct>,
}

/// Latest unresolved alert for a product, with its current stock.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LowStockAlertView {
    pub alert_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub message: String,
    pub quantity: i64,
    pub low_stock_threshold: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Period Boundaries
// =============================================================================

/// Start instants of the reporting periods containing `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodStarts {
    pub day: DateTime<Utc>,
    /// Most recent Sunday, midnight.
    pub week: DateTime<Utc>,
    pub month: DateTime<Utc>,
}

impl PeriodStarts {
    /// ## Example
    /// ```rust
    /// use biashara_core::reporting::PeriodStarts;
    /// use chrono::{TimeZone, Utc};
    ///
    /// // Saturday 17 October 2026, 15:45
    /// let now = Utc.with_ymd_and_hms(2026, 10, 17, 15, 45, 0).unwrap();
    /// let starts = PeriodStarts::containing(now);
    ///
    /// assert_eq!(starts.day, Utc.with_ymd_and_hms(2026, 10, 17, 0, 0, 0).unwrap());
    /// assert_eq!(starts.week, Utc.with_ymd_and_hms(2026, 10, 11, 0, 0, 0).unwrap());
    /// assert_eq!(starts.month, Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap());
    /// ```
    pub fn containing(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let day = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
        let week = day - Duration::days(i64::from(date.weekday().num_days_from_sunday()));
        let month = day - Duration::days(i64::from(date.day0()));

        Self { day, week, month }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_starts_on_sunday() {
        // Sunday 11 October 2026
        let now = Utc.with_ymd_and_hms(2026, 10, 11, 8, 0, 0).unwrap();
        let starts = PeriodStarts::containing(now);
        assert_eq!(starts.week, starts.day);
    }

    #[test]
    fn test_period_starts_on_first_of_month() {
        let now = Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap();
        let starts = PeriodStarts::containing(now);
        assert_eq!(starts.month, now);
        assert_eq!(starts.day, now);
        // Week may start in the previous month
        assert!(starts.week <= starts.month);
    }
}
