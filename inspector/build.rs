use std::path::{Path, PathBuf};
use std::process::Command;

/// Trimmed stdout of a git command run at the workspace root, or "unknown".
fn git(workspace_root: &Path, args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .current_dir(workspace_root)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string()));
    // inspector/ sits directly under the workspace root
    let workspace_root = manifest_dir.parent().unwrap_or(manifest_dir.as_path()).to_path_buf();

    let hash = git(&workspace_root, &["rev-parse", "HEAD"]);
    let branch = git(&workspace_root, &["rev-parse", "--abbrev-ref", "HEAD"]);
    let tag = git(&workspace_root, &["describe", "--tags", "--abbrev=0"]);

    let build_time = match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(dur) => dur.as_secs().to_string(),
        Err(_) => "unknown".to_string(),
    };

    println!("cargo:rustc-env=GIT_HASH={}", hash);
    println!("cargo:rustc-env=GIT_BRANCH={}", branch);
    println!("cargo:rustc-env=GIT_TAG={}", tag);
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
