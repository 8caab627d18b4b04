//! The `vmit create instancetype` subcommand.
//!
//! Compiles the supplied flags into one [`ScopedManifest`] and emits it as a
//! YAML document. Submitting the manifest to a cluster is left to whoever
//! consumes the output, the command itself never opens a connection.
use std::io::Write;

use clap::Args;
use rand::{Rng, distr::Alphanumeric};
use snafu::{ResultExt, Snafu, ensure};
use vmit_api::{
    instancetype::{CpuSpec, InstanceTypeSpec, MemorySpec, Scope, ScopedManifest},
    yaml::{self, SerializeOptions},
};

use crate::create::params;

pub const CPU_FLAG: &str = "cpu";
pub const MEMORY_FLAG: &str = "memory";
pub const GPU_FLAG: &str = "gpu";
pub const HOST_DEVICE_FLAG: &str = "hostdevice";
pub const IO_THREADS_POLICY_FLAG: &str = "iothreadspolicy";

const NAME_PREFIX: &str = "instancetype-";
const NAME_SUFFIX_LENGTH: usize = 5;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to map flag input onto manifest fields"))]
    MapParams { source: params::Error },

    #[snafu(display("the guest needs at least one vCPU"))]
    ZeroCpuCount,

    #[snafu(display("failed to encode the manifest as YAML"))]
    EncodeManifest { source: yaml::Error },
}

#[derive(Debug, Args)]
pub struct InstancetypeArgs {
    /// Number of vCPUs handed to the guest.
    #[arg(long)]
    pub cpu: u32,

    /// Amount of memory handed to the guest, as a quantity string like 256Mi.
    #[arg(long, value_name = "QUANTITY")]
    pub memory: String,

    /// GPU to pass through, in the form name:NAME,devicename:DEVICE.
    /// Can be supplied multiple times.
    #[arg(long = "gpu", value_name = "PARAMS")]
    pub gpus: Vec<String>,

    /// Host device to pass through, in the form name:NAME,devicename:DEVICE.
    /// Can be supplied multiple times.
    #[arg(long = "hostdevice", value_name = "PARAMS")]
    pub host_devices: Vec<String>,

    /// IO threads policy for the guest, either shared or auto.
    #[arg(long = "iothreadspolicy", value_name = "POLICY")]
    pub io_threads_policy: Option<String>,

    /// Create a namespaced InstanceType instead of a cluster-wide
    /// ClusterInstanceType.
    #[arg(long)]
    pub namespaced: bool,

    /// Name of the created object. A random name is generated when omitted.
    #[arg(long)]
    pub name: Option<String>,
}

/// Assembles the scope-agnostic spec from the supplied flags.
///
/// Entries of repeatable flags keep the order they were supplied in, nothing
/// is reordered or deduplicated. Validation is limited to the field mapping
/// itself plus the two mandatory inputs.
pub fn build_spec(args: &InstancetypeArgs) -> Result<InstanceTypeSpec> {
    ensure!(args.cpu > 0, ZeroCpuCountSnafu);

    let memory = params::parse_quantity(MEMORY_FLAG, &args.memory).context(MapParamsSnafu)?;

    let gpus = args
        .gpus
        .iter()
        .map(|raw| params::parse_gpu(raw))
        .collect::<Result<Vec<_>, _>>()
        .context(MapParamsSnafu)?;

    let host_devices = args
        .host_devices
        .iter()
        .map(|raw| params::parse_host_device(raw))
        .collect::<Result<Vec<_>, _>>()
        .context(MapParamsSnafu)?;

    let io_threads_policy = args
        .io_threads_policy
        .as_deref()
        .map(|value| params::parse_io_threads_policy(IO_THREADS_POLICY_FLAG, value))
        .transpose()
        .context(MapParamsSnafu)?;

    Ok(InstanceTypeSpec {
        cpu: CpuSpec { guest: args.cpu },
        memory: MemorySpec { guest: memory },
        gpus,
        host_devices,
        io_threads_policy,
    })
}

/// Compiles the flags into a finished manifest, resolving the target scope
/// from the `--namespaced` flag.
pub fn compile(args: &InstancetypeArgs) -> Result<ScopedManifest> {
    let spec = build_spec(args)?;
    let scope = Scope::from_namespaced_flag(args.namespaced);
    let name = args.name.clone().unwrap_or_else(random_name);

    Ok(ScopedManifest::new(scope, name, spec))
}

/// Compiles and emits the manifest, returning the number of bytes written.
pub fn run<W: Write>(args: &InstancetypeArgs, writer: W) -> Result<usize> {
    let manifest = compile(args)?;

    tracing::debug!(
        kind = manifest.kind(),
        name = manifest.metadata().name.as_deref(),
        "compiled instance type manifest"
    );

    yaml::serialize(&manifest, writer, SerializeOptions::default()).context(EncodeManifestSnafu)
}

fn random_name() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .map(char::from)
        .filter(char::is_ascii_lowercase)
        .take(NAME_SUFFIX_LENGTH)
        .collect();

    format!("{NAME_PREFIX}{suffix}")
}
