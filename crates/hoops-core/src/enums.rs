//! Enum types for the hoops system.
//!
//! Each enum has:
//! - Custom Serialize (as snake_case string)
//! - Custom Deserialize (known variants only; anything else is an error)
//! - `as_str()`, `FromStr`, `Display` impl

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    /// Name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

// ---------------------------------------------------------------------------
// Macro: defines a closed enum persisted as a fixed set of strings.
// ---------------------------------------------------------------------------
macro_rules! define_enum {
    (
        $(#[$meta:meta])*
        $name:ident, kind = $kind:expr, default = $default:ident,
        variants: [
            $( ($variant:ident, $str:expr) ),+ $(,)?
        ]
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            /// Returns the string representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )+
                }
            }

            /// Returns `true` if this is the default variant.
            pub fn is_default(&self) -> bool {
                *self == Self::$default
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $str => Ok(Self::$variant), )+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ===========================================================================
// ProgressStatus
// ===========================================================================

define_enum! {
    /// Lifecycle of a goal or level for one user.
    ///
    /// `Locked -> Unlocked -> InProgress -> Completed`; `Completed` is terminal.
    ProgressStatus, kind = "progress status", default = Locked,
    variants: [
        (Locked, "locked"),
        (Unlocked, "unlocked"),
        (InProgress, "in_progress"),
        (Completed, "completed"),
    ]
}

impl ProgressStatus {
    /// Returns `true` once no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns `true` if the item is open for progress (anything past locked).
    pub fn is_reachable(&self) -> bool {
        !matches!(self, Self::Locked)
    }

    /// Rank used to refuse downgrades when upserting status.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Locked => 0,
            Self::Unlocked => 1,
            Self::InProgress => 2,
            Self::Completed => 3,
        }
    }
}

// ===========================================================================
// WeeklyStatus
// ===========================================================================

define_enum! {
    /// Lifecycle of a weekly goal for one user.
    WeeklyStatus, kind = "weekly status", default = Active,
    variants: [
        (Active, "active"),
        (Completed, "completed"),
        (Expired, "expired"),
    ]
}

// ===========================================================================
// AwardSource
// ===========================================================================

define_enum! {
    /// What earned a ledger entry.
    AwardSource, kind = "award source", default = Drill,
    variants: [
        (Goal, "goal"),
        (WeeklyGoal, "weekly_goal"),
        (Drill, "drill"),
    ]
}

// ===========================================================================
// Role
// ===========================================================================

define_enum! {
    /// Role supplied by the identity provider.
    Role, kind = "role", default = Player,
    variants: [
        (Player, "player"),
        (Parent, "parent"),
        (Coach, "coach"),
        (Admin, "admin"),
    ]
}

impl Role {
    /// Returns `true` if the role may edit the progression catalog.
    pub fn can_edit_catalog(&self) -> bool {
        matches!(self, Self::Admin)
    }
}
