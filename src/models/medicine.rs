use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::StockStatus;

/// A medicine owned by a patient, with its stock bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medicine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub dosage_unit: String,
    pub instructions: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub stock_quantity: i64,
    pub low_stock_threshold: i64,
    pub is_active: bool,
}

impl Medicine {
    /// Derived stock tier: critical at zero, low at or under the threshold.
    pub fn stock_status(&self) -> StockStatus {
        if self.stock_quantity <= 0 {
            StockStatus::Critical
        } else if self.stock_quantity <= self.low_stock_threshold {
            StockStatus::Low
        } else {
            StockStatus::Good
        }
    }

    /// The low/not-low comparison the stock monitor alerts on.
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.low_stock_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn medicine(stock: i64, threshold: i64) -> Medicine {
        Medicine {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Metformin".into(),
            dosage: "500".into(),
            dosage_unit: "mg".into(),
            instructions: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: None,
            stock_quantity: stock,
            low_stock_threshold: threshold,
            is_active: true,
        }
    }

    #[test]
    fn stock_status_tiers() {
        assert_eq!(medicine(0, 10).stock_status(), StockStatus::Critical);
        assert_eq!(medicine(-1, 10).stock_status(), StockStatus::Critical);
        assert_eq!(medicine(3, 10).stock_status(), StockStatus::Low);
        assert_eq!(medicine(10, 10).stock_status(), StockStatus::Low);
        assert_eq!(medicine(11, 10).stock_status(), StockStatus::Good);
    }

    #[test]
    fn low_stock_uses_threshold_inclusive() {
        assert!(medicine(10, 10).is_low_stock());
        assert!(medicine(0, 10).is_low_stock());
        assert!(!medicine(11, 10).is_low_stock());
    }
}
