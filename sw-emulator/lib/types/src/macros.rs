/*++

Licensed under the Apache-2.0 license.

File Name:

    macros.rs

Abstract:

    Macros used by the project

--*/

/// Declares an enum for a hardware encoded field.
///
/// Unknown encodings are kept in the `$invalid` variant together with the raw
/// value, so that decoders never lose the bits they were handed and error
/// paths can report exactly what the guest programmed.
#[macro_export]
macro_rules! emu_enum {
    (
        $(#[$($enum_attrs:tt)*])*
        $vis:vis $enum_name:ident;
        $type:ty;
        {
            $(
                $(#[$($attrs:tt)*])*
                $name:ident = $value:literal,
            )*
        };
        $invalid:ident
    ) => {
        $(#[$($enum_attrs)*])*
        $vis enum $enum_name {
            $(
                $(#[$($attrs)*])*
                $name,
            )*
            $invalid($type),
        }

        impl $enum_name {
            /// Returns true if the raw encoding maps to a known variant
            #[allow(dead_code)]
            pub fn is_valid(&self) -> bool {
                !matches!(self, $enum_name::$invalid(_))
            }
        }

        impl From<$enum_name> for $type {
            fn from(val: $enum_name) -> $type {
                match val {
                    $($enum_name::$name => $value,)*
                    $enum_name::$invalid(raw) => raw,
                }
            }
        }

        impl From<$type> for $enum_name {
            fn from(val: $type) -> $enum_name {
                match val {
                    $($value => $enum_name::$name,)*
                    raw => $enum_name::$invalid(raw),
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                match self {
                    $($enum_name::$name => write!(f, stringify!($name)),)*
                    $enum_name::$invalid(raw) => {
                        write!(f, "{}({:#x})", stringify!($invalid), raw)
                    }
                }
            }
        }
    };
}
