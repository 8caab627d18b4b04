//! Instance type resources and their scope-discriminated manifest envelope.
//!
//! An instance type is a reusable, named bundle of compute, memory and device
//! resource defaults for a virtual machine. It exists in two scopes which are
//! field-for-field identical: the namespaced `InstanceType` and the
//! cluster-wide `ClusterInstanceType`. Both kinds share one
//! [`InstanceTypeSpec`] and one [`Manifest`] body, so the two wire schemas
//! cannot drift apart.
use k8s_openapi::apimachinery::pkg::{api::resource::Quantity, apis::meta::v1::ObjectMeta};
use serde::{Deserialize, Serialize};

pub const API_GROUP: &str = "virt.dev";
pub const API_VERSION: &str = "v1alpha1";

/// Returns the full `apiVersion` string stamped on every manifest.
pub fn api_version() -> String {
    format!("{API_GROUP}/{API_VERSION}")
}

/// The scope-agnostic body of an instance type resource.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceTypeSpec {
    /// CPU resources handed to the guest.
    pub cpu: CpuSpec,

    /// Memory resources handed to the guest.
    pub memory: MemorySpec,

    /// GPUs passed through to the guest, in the order they were requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gpus: Vec<GpuEntry>,

    /// Host devices passed through to the guest, in the order they were
    /// requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host_devices: Vec<HostDeviceEntry>,

    /// IO threads policy applied to the guest. Absent means unset, the
    /// server decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_threads_policy: Option<IoThreadsPolicy>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSpec {
    /// Number of vCPUs exposed to the guest. Always at least one.
    pub guest: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemorySpec {
    /// Amount of memory exposed to the guest, as a resource quantity like
    /// `256Mi`.
    pub guest: Quantity,
}

/// One passthrough GPU request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuEntry {
    /// Name of the GPU inside the guest, unique within the list.
    pub name: String,

    /// Name of the device resource on the host, like `nvidia.com/gpu1`.
    pub device_name: String,
}

/// One passthrough host device request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostDeviceEntry {
    /// Name of the device inside the guest, unique within the list.
    pub name: String,

    /// Name of the device resource on the host.
    pub device_name: String,
}

/// Policy controlling how dedicated IO threads are assigned to the guest.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
pub enum IoThreadsPolicy {
    /// All disks share one IO thread.
    #[strum(serialize = "shared")]
    Shared,

    /// IO threads are assigned automatically per disk.
    #[strum(serialize = "auto")]
    Auto,
}

/// The scope an instance type is created in.
///
/// The scope is resolved exactly once per compiled manifest, from a single
/// boolean input. It decides the `kind` stamped on the envelope and whether
/// the create call later needs a target namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Namespaced,
    Cluster,
}

impl Scope {
    pub fn from_namespaced_flag(namespaced: bool) -> Self {
        if namespaced {
            Self::Namespaced
        } else {
            Self::Cluster
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Namespaced => "InstanceType",
            Self::Cluster => "ClusterInstanceType",
        }
    }
}

/// The shared manifest body wrapped by both envelope variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub api_version: String,
    pub metadata: ObjectMeta,
    pub spec: InstanceTypeSpec,
}

/// A finished instance type manifest, discriminated by scope.
///
/// The `kind` field on the wire is the tag, so decoding yields the exact
/// variant that was encoded without inspecting the document by hand. The
/// value is immutable once built; changing any field means rebuilding it
/// from the input flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ScopedManifest {
    #[serde(rename = "InstanceType")]
    Namespaced(Manifest),

    #[serde(rename = "ClusterInstanceType")]
    Cluster(Manifest),
}

impl ScopedManifest {
    /// Wraps a spec in the envelope selected by `scope`, stamping the
    /// `apiVersion` and the object name.
    pub fn new(scope: Scope, name: impl Into<String>, spec: InstanceTypeSpec) -> Self {
        let manifest = Manifest {
            api_version: api_version(),
            metadata: ObjectMeta {
                name: Some(name.into()),
                ..ObjectMeta::default()
            },
            spec,
        };

        match scope {
            Scope::Namespaced => Self::Namespaced(manifest),
            Scope::Cluster => Self::Cluster(manifest),
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Self::Namespaced(_) => Scope::Namespaced,
            Self::Cluster(_) => Scope::Cluster,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.scope().kind()
    }

    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::Namespaced(manifest) | Self::Cluster(manifest) => &manifest.metadata,
        }
    }

    pub fn spec(&self) -> &InstanceTypeSpec {
        match self {
            Self::Namespaced(manifest) | Self::Cluster(manifest) => &manifest.spec,
        }
    }
}

#[cfg(test)]
mod test {
    use indoc::{formatdoc, indoc};
    use rstest::rstest;

    use super::*;

    fn spec() -> InstanceTypeSpec {
        InstanceTypeSpec {
            cpu: CpuSpec { guest: 2 },
            memory: MemorySpec {
                guest: Quantity("256Mi".to_owned()),
            },
            ..InstanceTypeSpec::default()
        }
    }

    #[rstest]
    #[case(Scope::Namespaced, "InstanceType")]
    #[case(Scope::Cluster, "ClusterInstanceType")]
    fn envelope_carries_scope_kind(#[case] scope: Scope, #[case] kind: &str) {
        let manifest = ScopedManifest::new(scope, "web-server", spec());

        assert_eq!(manifest.kind(), kind);
        assert_eq!(manifest.scope(), scope);
        assert_eq!(manifest.metadata().name.as_deref(), Some("web-server"));
    }

    #[rstest]
    #[case(true, Scope::Namespaced)]
    #[case(false, Scope::Cluster)]
    fn scope_resolves_from_flag(#[case] namespaced: bool, #[case] expected: Scope) {
        assert_eq!(Scope::from_namespaced_flag(namespaced), expected);
    }

    #[test]
    fn kind_is_the_serde_tag() {
        let manifest = ScopedManifest::new(Scope::Cluster, "web-server", spec());
        let yaml = serde_yaml::to_string(&manifest).unwrap();

        assert_eq!(
            yaml,
            indoc! {"
                kind: ClusterInstanceType
                apiVersion: virt.dev/v1alpha1
                metadata:
                  name: web-server
                spec:
                  cpu:
                    guest: 2
                  memory:
                    guest: 256Mi
            "}
        );
    }

    #[rstest]
    #[case("InstanceType", Scope::Namespaced)]
    #[case("ClusterInstanceType", Scope::Cluster)]
    fn decode_selects_exactly_one_variant(#[case] kind: &str, #[case] scope: Scope) {
        let yaml = formatdoc! {"
            kind: {kind}
            apiVersion: virt.dev/v1alpha1
            metadata:
              name: web-server
            spec:
              cpu:
                guest: 2
              memory:
                guest: 256Mi
        "};

        let decoded: ScopedManifest = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(decoded.scope(), scope);
        assert_eq!(decoded.spec(), &spec());
    }

    #[test]
    fn decode_rejects_unknown_kind() {
        let yaml = indoc! {"
            kind: InstanceTypeFlavor
            apiVersion: virt.dev/v1alpha1
            metadata:
              name: web-server
            spec:
              cpu:
                guest: 2
              memory:
                guest: 256Mi
        "};

        let decoded = serde_yaml::from_str::<ScopedManifest>(yaml);
        assert!(decoded.is_err());
    }
}
