use std::borrow::Cow;
use std::{
    env,
    fs::{self, File},
    io::{self, Write},
    path::Path,
    process::Command,
};

fn main() {
    if let Err(e) = write_version_file() {
        panic!("Failed to create a version file: {:?}", e);
    }
    println!("cargo:rerun-if-env-changed=NEARBY_GIT_REVISION");
}

fn out_file(name: &str) -> io::Result<File> {
    let out_dir = env::var("OUT_DIR").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    File::create(Path::new(&out_dir).join(name))
}

fn write_version_file() -> io::Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    write!(out_file("simple_version_string")?, "\"{}\"", version)?;

    let target = env::var("TARGET").unwrap_or_else(|_| String::from("unknown target"));
    let git_rev = match get_git_rev() {
        Ok(v) if !v.trim().is_empty() => Cow::Owned(v),
        _ => Cow::Borrowed("unknown"),
    };
    write!(
        out_file("version_string")?,
        "r#\"{} ({})\nrev {}\"#",
        version,
        target,
        git_rev.trim(),
    )?;
    Ok(())
}

fn get_git_rev() -> io::Result<String> {
    if let Ok(rev) = env::var("NEARBY_GIT_REVISION") {
        return Ok(rev);
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .and_then(|out| {
            String::from_utf8(out.stdout).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "git rev-parse HEAD output was not UTF-8",
                )
            })
        })
        .or_else(|_| git_rev_from_file())
}

fn git_rev_from_file() -> io::Result<String> {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))?;
    fs::read_to_string(Path::new(&manifest_dir).join("../.git/refs/heads/main"))
}
