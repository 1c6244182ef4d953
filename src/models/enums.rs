use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Variant order is the ordinal order (`Ord` is derived).
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AuditStatus {
    Good => "Good",
    Fair => "Fair",
    Poor => "Poor",
    Critical => "Critical",
});

str_enum!(UrgencyLevel {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Critical => "Critical",
});

impl AuditStatus {
    /// Base urgency for a status, before any keyword escalation.
    pub fn base_urgency(&self) -> UrgencyLevel {
        match self {
            Self::Good => UrgencyLevel::Low,
            Self::Fair => UrgencyLevel::Medium,
            Self::Poor => UrgencyLevel::High,
            Self::Critical => UrgencyLevel::Critical,
        }
    }

    /// Poor and Critical assets need maintenance.
    pub fn requires_maintenance(&self) -> bool {
        matches!(self, Self::Poor | Self::Critical)
    }
}

impl UrgencyLevel {
    /// High and Critical urgency open a work order.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}
