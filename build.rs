use std::process::Command;
use std::str;

fn main() {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--broken"])
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output();

    let git_tag = match output {
        Ok(output) if output.status.success() => str::from_utf8(&output.stdout)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "unknown".to_string()),
        Ok(output) => {
            eprintln!("WARNING: git describe failed: {:?}", output.stderr);
            env!("CARGO_PKG_VERSION").to_string()
        }
        Err(err) => {
            eprintln!("WARNING: git not available: {err}");
            env!("CARGO_PKG_VERSION").to_string()
        }
    };

    println!("cargo:rustc-env=GIT_TAG={git_tag}");
}
