use std::process::Command;

fn main() {
    // Revision shown in the startup log, e.g. `v0.1.0-3-g1a2b3c4-dirty`.
    let revision = Command::new("git")
        .args(["describe", "--always", "--dirty", "--tags"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if let Some(revision) = revision {
        println!("cargo:rustc-env=NODESTATD_GIT_REVISION={revision}");
    }

    // Paths are relative to this crate; `index` changes flip `-dirty`.
    for path in ["../../.git/HEAD", "../../.git/index", "build.rs"] {
        println!("cargo:rerun-if-changed={path}");
    }
}
