use std::path::{Path, PathBuf};
use std::process::Command;

/// Embed the short git sha in `autoplan --version`.
fn main() {
    let workspace = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .and_then(|dir| dir.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(".."));

    println!("cargo:rerun-if-changed={}", workspace.join(".git/HEAD").display());
    println!("cargo:rustc-env=AUTOPLAN_BUILD_SHA={}", short_sha(&workspace));
}

fn short_sha(workspace: &Path) -> String {
    let Ok(out) = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
    else {
        return "unknown".into();
    };

    match std::str::from_utf8(&out.stdout).map(str::trim) {
        Ok(sha) if out.status.success() && !sha.is_empty() => sha.to_owned(),
        _ => "unknown".into(),
    }
}
