//! Parsing and formatting of Kubernetes resource quantity strings.
//!
//! A quantity is a number followed by an optional suffix, like `256Mi`,
//! `1.5G` or `2e3`. This module validates user supplied quantities against
//! that grammar before they are placed on the wire. It deliberately only
//! covers the parse/format contract and performs no arithmetic.
use std::{fmt::Display, num::ParseFloatError, str::FromStr};

use k8s_openapi::apimachinery::pkg::api::resource::Quantity as K8sQuantity;
use snafu::{ResultExt, Snafu, ensure};

#[derive(Debug, PartialEq, Snafu)]
pub enum ParseQuantityError {
    #[snafu(display("quantity is either empty or contains non-ascii characters"))]
    InvalidFormat,

    #[snafu(display("failed to parse quantity value as floating point number"))]
    InvalidValue { source: ParseFloatError },

    #[snafu(display("failed to parse quantity suffix"))]
    InvalidSuffix { source: ParseSuffixError },
}

/// A parsed resource quantity, consisting of a numeric value and an optional
/// unit suffix.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Quantity {
    value: f64,
    suffix: Option<Suffix>,
}

impl FromStr for Quantity {
    type Err = ParseQuantityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ensure!(!input.is_empty() && input.is_ascii(), InvalidFormatSnafu);

        match input.find(|c: char| c != '.' && !c.is_ascii_digit()) {
            Some(suffix_index) => {
                let (value, suffix) = input.split_at(suffix_index);
                let value = f64::from_str(value).context(InvalidValueSnafu)?;
                let suffix = Suffix::from_str(suffix).context(InvalidSuffixSnafu)?;

                Ok(Self {
                    suffix: Some(suffix),
                    value,
                })
            }
            None => {
                let value = f64::from_str(input).context(InvalidValueSnafu)?;
                Ok(Self {
                    value,
                    suffix: None,
                })
            }
        }
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.suffix {
            Some(suffix) => write!(f, "{value}{suffix}", value = self.value),
            None => write!(f, "{value}", value = self.value),
        }
    }
}

impl TryFrom<&K8sQuantity> for Quantity {
    type Error = ParseQuantityError;

    fn try_from(value: &K8sQuantity) -> Result<Self, Self::Error> {
        Self::from_str(&value.0)
    }
}

impl From<Quantity> for K8sQuantity {
    fn from(value: Quantity) -> Self {
        K8sQuantity(value.to_string())
    }
}

impl Quantity {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn suffix(&self) -> Option<Suffix> {
        self.suffix
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(display("unsupported quantity suffix {input:?}"))]
pub struct ParseSuffixError {
    input: String,
}

/// The unit suffix of a [`Quantity`].
///
/// Kubernetes accepts binary byte multiples (`Ki` up to `Ei`), decimal byte
/// multiples (`m` and `k` up to `E`) and scientific E notation. Suffixes
/// beyond `Ei`/`E` are not part of the serialization format.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum Suffix {
    Binary(BinaryMultiple),
    Decimal(DecimalMultiple),
    Exponent(f64),
}

impl FromStr for Suffix {
    type Err = ParseSuffixError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if let Ok(binary) = BinaryMultiple::from_str(input) {
            return Ok(Self::Binary(binary));
        }

        if let Ok(decimal) = DecimalMultiple::from_str(input) {
            return Ok(Self::Decimal(decimal));
        }

        if input.starts_with(['e', 'E']) {
            if let Ok(exponent) = f64::from_str(&input[1..]) {
                return Ok(Self::Exponent(exponent));
            }
        }

        ParseSuffixSnafu { input }.fail()
    }
}

impl Display for Suffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary(binary) => write!(f, "{binary}"),
            Self::Decimal(decimal) => write!(f, "{decimal}"),
            Self::Exponent(exponent) => write!(f, "e{exponent}"),
        }
    }
}

/// Byte multiples based on powers of 2 as defined in IEC 80000-13, using the
/// shortened unit names Kubernetes adopted (`Ki` instead of `KiB`).
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, strum::Display, strum::EnumString)]
pub enum BinaryMultiple {
    #[strum(serialize = "Ki")]
    Kibi,

    #[strum(serialize = "Mi")]
    Mebi,

    #[strum(serialize = "Gi")]
    Gibi,

    #[strum(serialize = "Ti")]
    Tebi,

    #[strum(serialize = "Pi")]
    Pebi,

    #[strum(serialize = "Ei")]
    Exbi,
}

/// Byte multiples based on powers of 10, using the shortened SI unit names
/// Kubernetes adopted. `m` (milli) is Kubernetes-specific.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, strum::Display, strum::EnumString)]
pub enum DecimalMultiple {
    #[strum(serialize = "m")]
    Milli,

    #[strum(serialize = "k")]
    Kilo,

    #[strum(serialize = "M")]
    Mega,

    #[strum(serialize = "G")]
    Giga,

    #[strum(serialize = "T")]
    Tera,

    #[strum(serialize = "P")]
    Peta,

    #[strum(serialize = "E")]
    Exa,
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("256Mi", 256.0, Some(Suffix::Binary(BinaryMultiple::Mebi)))]
    #[case("1.5Gi", 1.5, Some(Suffix::Binary(BinaryMultiple::Gibi)))]
    #[case("0.8Ti", 0.8, Some(Suffix::Binary(BinaryMultiple::Tebi)))]
    #[case("2Ei", 2.0, Some(Suffix::Binary(BinaryMultiple::Exbi)))]
    #[case("512k", 512.0, Some(Suffix::Decimal(DecimalMultiple::Kilo)))]
    #[case("1.5G", 1.5, Some(Suffix::Decimal(DecimalMultiple::Giga)))]
    #[case("100m", 100.0, Some(Suffix::Decimal(DecimalMultiple::Milli)))]
    #[case("1.234e3", 1.234, Some(Suffix::Exponent(3.0)))]
    #[case("1.234E-3", 1.234, Some(Suffix::Exponent(-3.0)))]
    #[case("128974848", 128974848.0, None)]
    #[case("0", 0.0, None)]
    fn from_str_pass(#[case] input: &str, #[case] value: f64, #[case] suffix: Option<Suffix>) {
        let parsed = Quantity::from_str(input).unwrap();
        assert_eq!(parsed, Quantity { value, suffix });
    }

    #[rstest]
    #[case("", ParseQuantityError::InvalidFormat)]
    #[case("256Mä", ParseQuantityError::InvalidFormat)]
    #[case(
        "256Ji",
        ParseQuantityError::InvalidSuffix {
            source: ParseSuffixError { input: "Ji".to_owned() }
        }
    )]
    #[case(
        "1Kib",
        ParseQuantityError::InvalidSuffix {
            source: ParseSuffixError { input: "Kib".to_owned() }
        }
    )]
    fn from_str_fail(#[case] input: &str, #[case] error: ParseQuantityError) {
        let parsed = Quantity::from_str(input);
        assert_eq!(parsed, Err(error));
    }

    #[rstest]
    #[case("256Mi")]
    #[case("1.5G")]
    #[case("4m")]
    #[case("0")]
    fn to_string_roundtrip(#[case] input: &str) {
        let parsed = Quantity::from_str(input).unwrap();
        assert_eq!(parsed.to_string(), input);
    }
}
