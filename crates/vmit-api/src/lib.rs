//! This crate contains the wire types shared between the `vmit` command line
//! tool and consumers of the manifests it emits: the instance type spec, the
//! scope-discriminated manifest envelope, the resource quantity grammar and
//! the YAML serializer.

pub mod instancetype;
pub mod quantity;
pub mod yaml;

// Re-export because consumers need types like `Quantity` and `ObjectMeta`
// from the exact same version this crate was built against.
pub use k8s_openapi;
