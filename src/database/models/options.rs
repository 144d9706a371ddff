use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef};
use sqlx::{Decode, Encode, Postgres, Type};
use std::fmt;
use std::str::FromStr;

/// A value outside one of the closed option sets below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOption {
    pub field: &'static str,
    pub value: String,
    pub valid: &'static [&'static str],
}

impl fmt::Display for InvalidOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid = self
            .valid
            .iter()
            .map(|v| format!("'{}'", v))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "Invalid '{field}' value. The valid values for '{field}' are: {valid}",
            field = self.field
        )
    }
}

impl std::error::Error for InvalidOption {}

/// Declares a closed set of display-string options. The display string is the
/// wire value (JSON) and the stored value (TEXT column).
macro_rules! options {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Wire name of the payload field carrying this option
            pub const FIELD: &'static str = $field;
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const VALUES: &'static [&'static str] = &[$($text),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = InvalidOption;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    _ => Err(InvalidOption {
                        field: $field,
                        value: value.to_string(),
                        valid: Self::VALUES,
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = String::deserialize(deserializer)?;
                value.parse().map_err(de::Error::custom)
            }
        }

        impl Type<Postgres> for $name {
            fn type_info() -> PgTypeInfo {
                <&str as Type<Postgres>>::type_info()
            }

            fn compatible(ty: &PgTypeInfo) -> bool {
                <&str as Type<Postgres>>::compatible(ty)
            }
        }

        impl<'q> Encode<'q, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> IsNull {
                <&str as Encode<'q, Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
                let text = <&str as Decode<'r, Postgres>>::decode(value)?;
                Ok(text.parse()?)
            }
        }
    };
}

options! {
    /// Who received the money for a job
    PaidTo, field = "paidTo" {
        GladtimeAudio => "Gladtime Audio",
        Meghan => "Meghan",
        Tyler => "Tyler",
        Separately => "Tyler/Meghan Separately",
    }
}

options! {
    WorkedBy, field = "workedBy" {
        Meghan => "Meghan",
        Tyler => "Tyler",
        Both => "Tyler and Meghan",
    }
}

options! {
    Confirmation, field = "confirmation" {
        Confirmed => "Confirmed",
        PencilledIn => "Pencilled In",
    }
}

options! {
    /// Who paid for an expense
    PaidBy, field = "paidBy" {
        GladtimeAudio => "Gladtime Audio",
        Meghan => "Meghan",
        Tyler => "Tyler",
        Separately => "Tyler/Meghan Separately",
    }
}

options! {
    Category, field = "category" {
        BusinessEquipment => "Business Equipment",
        BusinessSupplies => "Business Supplies",
        Gasoline => "Gasoline",
        VehicleMaintenance => "Vehicle Maintenance",
        TravelExpense => "Travel Expense",
        Entertainment => "Entertainment",
        Food => "Food",
    }
}

options! {
    Recurrence, field = "recurrence" {
        Monthly => "Monthly",
        EveryOtherMonth => "Every Other Month",
        EverySixMonths => "Every Six Months",
        OncePerYear => "Once Per Year",
    }
}
