use std::{env, fs, path::PathBuf};

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR");
    write_version(&out_dir);
    println!("cargo:rerun-if-changed=build.rs");
}

/// Split the crate version into a `Version` constant for `src/version.rs`
fn write_version(out_dir: &str) {
    let version = env!("CARGO_PKG_VERSION");
    let (core, extra) = match version.split_once('-') {
        Some((core, pre)) => (core, format!("Some(\"{pre}\")")),
        None => (version, String::from("None")),
    };

    let mut parts = core.splitn(3, '.');
    let major = parts.next().expect("version major");
    let minor = parts.next().expect("version minor");
    let patch = parts.next().expect("version patch");

    let out_path = PathBuf::from(out_dir).join("current_version.rs");
    fs::write(
        &out_path,
        format!(
            "pub const VERSION: Version = Version {{ major: {major}, minor: {minor}, patch: {patch}, extra: {extra} }};\n"
        ),
    )
    .expect("write current_version.rs");
}
