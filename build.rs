// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

// Mirrors the derive definition in src/cli.rs; build scripts cannot use the crate itself.
fn build_cli() -> Command {
    Command::new("mrfeature")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Install Mixed Reality Toolkit feature packages and their dependencies into a Unity project")
        .arg(
            Arg::new("project")
                .required(true)
                .value_name("PROJECT")
                .help("Path to the Unity project (must contain Assets, Packages and ProjectSettings)"),
        )
        .arg(
            Arg::new("select")
                .short('s')
                .long("select")
                .value_name("INDICES")
                .help("Package numbers to install, e.g. \"2 7 14\"; prompts when omitted"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file (default: <config dir>/mrfeature/config.toml)"),
        )
        .arg(
            Arg::new("work_dir")
                .short('w')
                .long("work-dir")
                .value_name("DIR")
                .help("Directory for downloads and staging (default: a temporary directory)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Show debug logging"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = out_dir.join("mrfeature.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
