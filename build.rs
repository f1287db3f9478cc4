use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_PYTHON");

    // Only the Python bindings need libpython on the linker path.
    if std::env::var_os("CARGO_FEATURE_PYTHON").is_none() {
        return;
    }

    if let Ok(output) = Command::new("python3").args(["--version"]).output() {
        if output.status.success() {
            let version = String::from_utf8_lossy(&output.stdout);
            println!("cargo:warning=Building Python bindings with {}", version.trim());
        }
    }

    if let Ok(output) = Command::new("python3")
        .args([
            "-c",
            "import sysconfig; print(sysconfig.get_config_var('LIBDIR'))",
        ])
        .output()
    {
        if output.status.success() {
            let libdir = String::from_utf8_lossy(&output.stdout);
            let libdir = libdir.trim();
            if !libdir.is_empty() && libdir != "None" {
                println!("cargo:rustc-link-search=native={libdir}");
            }
        }
    }
}
