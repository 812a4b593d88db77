//! Open enumerations
//!
//! Planning enums travel as plain integers. A reader built against an older
//! schema can receive values it has no name for; those decode to
//! `Unrecognized(raw)` and encode back to the same integer.

use serde::Deserialize;

/// Common surface of the generated open enums
pub trait OpenEnum: Copy + Default + 'static {
    /// Enum name as declared in the schema
    const NAME: &'static str;
    /// Known `(symbol, value)` pairs
    const KNOWN: &'static [(&'static str, i32)];

    fn from_raw(raw: i32) -> Self;
    fn to_raw(self) -> i32;

    fn is_unrecognized(self) -> bool {
        Self::KNOWN.iter().all(|(_, value)| *value != self.to_raw())
    }
}

/// Accepted JSON shapes: the schema symbol or the raw integer
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum EnumRepr {
    Raw(i32),
    Name(String),
}

macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident as $schema_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal => $symbol:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this version of the schema has no symbol for.
            /// Produced by `from_raw`; the payload is never a known value.
            Unrecognized(i32),
        }

        impl $name {
            pub fn as_str_name(&self) -> Option<&'static str> {
                match self {
                    $( Self::$variant => Some($symbol), )+
                    Self::Unrecognized(_) => None,
                }
            }

            pub fn from_str_name(name: &str) -> Option<Self> {
                match name {
                    $( $symbol => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl $crate::proto::open_enum::OpenEnum for $name {
            const NAME: &'static str = $schema_name;
            const KNOWN: &'static [(&'static str, i32)] = &[ $( ($symbol, $value), )+ ];

            fn from_raw(raw: i32) -> Self {
                match raw {
                    $( $value => Self::$variant, )+
                    other => Self::Unrecognized(other),
                }
            }

            fn to_raw(self) -> i32 {
                match self {
                    $( Self::$variant => $value, )+
                    Self::Unrecognized(raw) => raw,
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                <Self as $crate::proto::open_enum::OpenEnum>::from_raw(0)
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                <Self as $crate::proto::open_enum::OpenEnum>::from_raw(raw)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> i32 {
                <$name as $crate::proto::open_enum::OpenEnum>::to_raw(value)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self.as_str_name() {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{}", i32::from(*self)),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                match self.as_str_name() {
                    Some(name) => serializer.serialize_str(name),
                    None => serializer.serialize_i32(i32::from(*self)),
                }
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                use $crate::proto::open_enum::EnumRepr;
                use ::serde::Deserialize as _;
                match EnumRepr::deserialize(deserializer)? {
                    EnumRepr::Raw(raw) => Ok(Self::from(raw)),
                    EnumRepr::Name(name) => Self::from_str_name(&name).ok_or_else(|| {
                        <D::Error as ::serde::de::Error>::custom(format!(
                            "unknown {} symbol `{}`",
                            $schema_name, name
                        ))
                    }),
                }
            }
        }
    };
}

pub(crate) use open_enum;
