use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Plugins resolve createButton, addTool, APPCONTEXT and the rest against
    // the executable that loads them, so executables must put the host
    // exports in their dynamic symbol table.
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let export_flag = match target_os.as_str() {
        "linux" | "android" | "freebsd" | "netbsd" | "openbsd" | "dragonfly" => {
            "-Wl,--export-dynamic"
        }
        "macos" | "ios" => "-Wl,-export_dynamic",
        _ => return,
    };
    println!("cargo:rustc-link-arg-bins={export_flag}");
    println!("cargo:rustc-link-arg-tests={export_flag}");
}
