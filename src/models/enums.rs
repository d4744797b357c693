use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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

str_enum!(Role {
    Patient => "patient",
    Operator => "operator",
    Admin => "admin",
    ChiefDoctor => "chief_doctor",
});

str_enum!(ChatStatus {
    Waiting => "waiting",
    Active => "active",
    Closed => "closed",
});

str_enum!(Sender {
    Patient => "patient",
    Staff => "staff",
});

str_enum!(LetterRecipient {
    Operator => "operator",
    ChiefDoctor => "chief_doctor",
});

impl Role {
    /// Staff roles share the operator-side chat view.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Operator | Role::Admin | Role::ChiefDoctor)
    }

    /// Feedback triage belongs to the operator desk and admins.
    pub fn triages_feedback(&self) -> bool {
        matches!(self, Role::Operator | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trip() {
        for (variant, s) in [
            (Role::Patient, "patient"),
            (Role::Operator, "operator"),
            (Role::Admin, "admin"),
            (Role::ChiefDoctor, "chief_doctor"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Role::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn staff_roles() {
        assert!(!Role::Patient.is_staff());
        assert!(Role::Operator.is_staff());
        assert!(Role::Admin.is_staff());
        assert!(Role::ChiefDoctor.is_staff());
    }

    #[test]
    fn feedback_triage_roles() {
        assert!(Role::Operator.triages_feedback());
        assert!(Role::Admin.triages_feedback());
        assert!(!Role::ChiefDoctor.triages_feedback());
        assert!(!Role::Patient.triages_feedback());
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Role::from_str("doctor").is_err());
        assert!(ChatStatus::from_str("open").is_err());
        assert!(Sender::from_str("").is_err());
    }

    #[test]
    fn wire_strings_match_storage_strings() {
        let json = serde_json::to_value(Role::ChiefDoctor).unwrap();
        assert_eq!(json, Role::ChiefDoctor.as_str());
        let json = serde_json::to_value(LetterRecipient::Operator).unwrap();
        assert_eq!(json, LetterRecipient::Operator.as_str());
    }
}
