//! Parsing of compound flag values and field-level validation.
//!
//! Compound flags like `--gpu` take one value per occurrence, formatted as
//! `key1:value1,key2:value2,...`. Parsing is a pure function over each
//! occurrence, independent of any flag registration state, so repeated
//! occurrences simply accumulate into ordered entry lists.
use std::str::FromStr;

use indexmap::IndexMap;
use snafu::{OptionExt, ResultExt, Snafu};
use strum::VariantNames;
use vmit_api::{
    instancetype::{GpuEntry, HostDeviceEntry, IoThreadsPolicy},
    k8s_openapi::apimachinery::pkg::api::resource::Quantity,
    quantity,
};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Field and syntax errors raised while mapping flag input onto manifest
/// fields. All of them indicate bad input and abort the compilation, no
/// manifest is emitted.
#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("params need to have a \"key:value\" format, found {segment:?}"))]
    MalformedEntry { segment: String },

    #[snafu(display("required param {key:?} is missing"))]
    MissingRequiredField { key: &'static str },

    #[snafu(display("unsupported param {key:?} with value {value:?}"))]
    InvalidFieldValue { key: String, value: String },

    #[snafu(display("invalid quantity {value:?} supplied to flag {flag:?}"))]
    InvalidQuantity {
        source: quantity::ParseQuantityError,
        flag: &'static str,
        value: String,
    },

    #[snafu(display(
        "invalid value {value:?} supplied to flag {flag:?}, allowed values are: {allowed}",
        allowed = allowed.join(", ")
    ))]
    InvalidEnumValue {
        flag: &'static str,
        value: String,
        allowed: Vec<&'static str>,
    },
}

/// The key/value params parsed from one compound flag occurrence, in input
/// order.
///
/// Keys are not validated during parsing. Consumers take the fields they
/// know one by one and call [`ParamMap::finish`], which rejects whatever is
/// left over. If a key appears more than once within one occurrence the last
/// value wins, like repeated assignments to the same map key.
#[derive(Debug, Default)]
pub struct ParamMap {
    params: IndexMap<String, String>,
}

impl FromStr for ParamMap {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let mut params = IndexMap::new();

        for segment in input.split(',') {
            let (key, value) = segment
                .split_once(':')
                .context(MalformedEntrySnafu { segment })?;
            params.insert(key.to_owned(), value.to_owned());
        }

        Ok(Self { params })
    }
}

impl ParamMap {
    /// Takes a field which must be present, or fails with
    /// [`Error::MissingRequiredField`].
    pub fn take_required(&mut self, key: &'static str) -> Result<String> {
        self.params
            .shift_remove(key)
            .context(MissingRequiredFieldSnafu { key })
    }

    /// Takes a field which may be absent.
    pub fn take_optional(&mut self, key: &str) -> Option<String> {
        self.params.shift_remove(key)
    }

    /// Fails with [`Error::InvalidFieldValue`] if any params were supplied
    /// which no consumer took.
    pub fn finish(self) -> Result<()> {
        match self.params.into_iter().next() {
            Some((key, value)) => InvalidFieldValueSnafu { key, value }.fail(),
            None => Ok(()),
        }
    }
}

/// Parses one `--gpu` occurrence of the form `name:NAME,devicename:DEVICE`.
pub fn parse_gpu(raw: &str) -> Result<GpuEntry> {
    let mut params = ParamMap::from_str(raw)?;

    let entry = GpuEntry {
        name: params.take_required("name")?,
        device_name: params.take_required("devicename")?,
    };

    params.finish()?;
    Ok(entry)
}

/// Parses one `--hostdevice` occurrence of the form
/// `name:NAME,devicename:DEVICE`.
pub fn parse_host_device(raw: &str) -> Result<HostDeviceEntry> {
    let mut params = ParamMap::from_str(raw)?;

    let entry = HostDeviceEntry {
        name: params.take_required("name")?,
        device_name: params.take_required("devicename")?,
    };

    params.finish()?;
    Ok(entry)
}

/// Validates `value` against the resource quantity grammar and returns it
/// unchanged, so the user supplied spelling survives the round trip through
/// the wire format.
pub fn parse_quantity(flag: &'static str, value: &str) -> Result<Quantity> {
    quantity::Quantity::from_str(value).context(InvalidQuantitySnafu { flag, value })?;
    Ok(Quantity(value.to_owned()))
}

/// Parses an IO threads policy literal, failing with the allowed literal set
/// in the message for anything outside the domain.
pub fn parse_io_threads_policy(flag: &'static str, value: &str) -> Result<IoThreadsPolicy> {
    IoThreadsPolicy::from_str(value)
        .ok()
        .context(InvalidEnumValueSnafu {
            flag,
            value,
            allowed: IoThreadsPolicy::VARIANTS.to_vec(),
        })
}
