//! Mining algorithm codes reported by the pool API

use std::fmt;

use serde::{Deserialize, Deserializer};

macro_rules! algorithms {
    ($($code:literal => $variant:ident),+ $(,)?) => {
        /// Proof-of-work algorithm, keyed by the pool's integer code.
        ///
        /// Codes outside the known table are kept verbatim in `Unknown` so
        /// nothing is lost on the way to the CSV.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Algorithm {
            $($variant,)+
            Unknown(i64),
        }

        impl Algorithm {
            pub fn from_code(code: i64) -> Self {
                match code {
                    $($code => Algorithm::$variant,)+
                    other => Algorithm::Unknown(other),
                }
            }

            pub fn code(&self) -> i64 {
                match self {
                    $(Algorithm::$variant => $code,)+
                    Algorithm::Unknown(code) => *code,
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(Algorithm::$variant => stringify!($variant),)+
                    Algorithm::Unknown(_) => "Unknown",
                }
            }
        }
    };
}

algorithms! {
    0 => Scrypt,
    1 => SHA256,
    2 => ScryptNf,
    3 => X11,
    4 => X13,
    5 => Keccak,
    6 => X15,
    7 => Nist5,
    8 => NeoScrypt,
    9 => Lyra2RE,
    10 => WhirlpoolX,
    11 => Qubit,
    12 => Quark,
    13 => Axiom,
    14 => Lyra2REv2,
    15 => ScryptJaneNf16,
    16 => Blake256r8,
    17 => Blake256r14,
    18 => Blake256r8vnl,
    19 => Hodl,
    20 => DaggerHashimoto,
    21 => Decred,
    22 => CryptoNight,
    23 => Lbry,
    24 => Equihash,
    25 => Pascal,
    26 => X11Gost,
    27 => Sia,
    28 => Blake2s,
    29 => Skunk,
    30 => CryptoNightV7,
    31 => CryptoNightHeavy,
    32 => Lyra2Z,
}

/// Name for a raw algorithm code, "Unknown" for anything unmapped
pub fn name_of(code: i64) -> &'static str {
    Algorithm::from_code(code).name()
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Algorithm::from_code)
    }
}
