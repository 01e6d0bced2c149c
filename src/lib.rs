/// Declares a closed enumeration whose variants have stable string names, with `ALL`, `name`,
/// `from_name` (case-insensitive, also accepting the kebab-case form), `Display` and `FromStr`.
macro_rules! named_enum {
    ($(#[$meta:meta])* $enum:ident { $($variant:ident = $name:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Copy, Clone)]
        pub enum $enum {
            $($variant),*
        }

        impl $enum {
            pub const ALL: &'static [$enum] = &[$($enum::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $($enum::$variant => $name),*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                let name = name.trim();
                $enum::ALL.iter().copied().find(|v| {
                    let canonical = v.name();
                    name.eq_ignore_ascii_case(canonical)
                        || name.eq_ignore_ascii_case(&canonical.replace(' ', "-"))
                })
            }
        }

        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $enum {
            type Err = crate::error::UnknownName;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $enum::from_name(s).ok_or_else(|| crate::error::UnknownName {
                    kind: stringify!($enum),
                    name: s.to_string(),
                })
            }
        }

        impl TryFrom<String> for $enum {
            type Error = crate::error::UnknownName;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$enum> for String {
            fn from(v: $enum) -> String {
                v.name().to_string()
            }
        }
    };
}

pub mod art;
pub mod color;
pub mod composite;
pub mod config;
pub mod error;
pub mod layers;
pub mod math;
pub mod noise;
pub mod palette;
pub mod params;
pub mod rand;
pub mod scheduler;
pub mod styles;
pub mod surface;
