//! Declarative helper for the host-visible constant tables
//!
//! Every identifier the host references symbolically (options, message
//! tags, error codes, chip revisions, ...) is an `i64`-backed enum with a
//! stable key. The host-visible constant name is `PREFIX` followed by the
//! key, e.g. `OPT_CHIP_RAM` or `MSG_DISK_INSERT`.

macro_rules! keyed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident ($prefix:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident = $value:expr => $key:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i64)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant = $value,
            )+
        }

        impl $name {
            /// Every variant in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Prefix of the host-visible constant name
            pub const PREFIX: &'static str = $prefix;

            /// Raw integer value as exchanged with the host
            pub const fn raw(self) -> i64 {
                self as i64
            }

            /// Look up a variant by its raw integer value
            pub fn from_raw(raw: i64) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.raw() == raw)
            }

            /// Key without prefix (e.g. `CHIP_RAM`)
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            /// Look up a variant by key, with or without prefix, ignoring case
            pub fn from_key(key: &str) -> Option<Self> {
                let upper = key.to_ascii_uppercase();
                let key = upper.strip_prefix(Self::PREFIX).unwrap_or(&upper);
                Self::ALL.iter().copied().find(|v| v.key() == key)
            }

            /// Full host-visible constant name (e.g. `OPT_CHIP_RAM`)
            pub fn constant_name(self) -> String {
                format!("{}{}", Self::PREFIX, self.key())
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", Self::PREFIX, self.key())
            }
        }
    };
}
