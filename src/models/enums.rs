use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(SessionType {
    Morning => "morning",
    Afternoon => "afternoon",
    Night => "night",
});

impl SessionType {
    pub const ALL: [SessionType; 3] =
        [SessionType::Morning, SessionType::Afternoon, SessionType::Night];
}

str_enum!(DoseStatus {
    Pending => "pending",
    Taken => "taken",
    Missed => "missed",
    Skipped => "skipped",
});

str_enum!(LinkStatus {
    Pending => "pending",
    Accepted => "accepted",
});

str_enum!(AlertType {
    MissedDose => "missed_dose",
    LowStock => "low_stock",
});

/// Derived display tier for remaining stock. Alerting itself uses only the
/// boolean low/not-low comparison.
str_enum!(StockStatus {
    Good => "good",
    Low => "low",
    Critical => "critical",
});

str_enum!(Channel {
    Email => "email",
    Sms => "sms",
});

str_enum!(DeliveryStatus {
    Sent => "sent",
    Failed => "failed",
});
