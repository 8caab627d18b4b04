//! Library behind the `vmit` binary. It compiles flat command line input
//! into typed, scope-resolved instance type manifests.

pub mod create;
