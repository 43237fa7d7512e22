//! basepy-lib: building relocatable base Python interpreters
//!
//! The crate turns the executing machine into a `.tar.gz` of a freshly built
//! interpreter tree:
//! - `platform`: classify the machine into a `PlatformProfile`
//! - `environment`: compose the build tool's environment for a profile
//! - `prereq`, `bootstrap`, `interpreter`: install, fetch and build
//! - `validate`, `archive`: smoke-check and package the tree
//! - `pipeline`: sequence the stages, stopping at the first failure

pub mod archive;
pub mod bootstrap;
pub mod consts;
pub mod environment;
pub mod execute;
pub mod interpreter;
pub mod package;
pub mod patch;
pub mod pipeline;
pub mod platform;
pub mod prereq;
pub mod settings;
pub mod target;
pub mod util;
pub mod validate;
