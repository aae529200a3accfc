//! Build script for smartqueue.
//!
//! Currently a no-op placeholder. The inspection HTTP types are plain
//! serde-derived structs rather than generated from a schema, so there is
//! nothing to do at build time.

fn main() {
    // Rerun if build.rs changes
    println!("cargo:rerun-if-changed=build.rs");
}
