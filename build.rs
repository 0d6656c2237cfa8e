// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn dist_arg() -> Arg {
    Arg::new("dist")
        .short('d')
        .long("dist")
        .value_name("DIST")
        .default_value("stable")
        .help("Distribution name")
}

fn build_cli() -> Command {
    Command::new("aptpool")
        .version(env!("CARGO_PKG_VERSION"))
        .author("aptpool Contributors")
        .about("Local APT repository manager")
        .subcommand_required(false)
        .arg(
            Arg::new("repo_root")
                .long("repo-root")
                .value_name("PATH")
                .default_value(".")
                .global(true)
                .help("Repository root directory"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Configuration file (default: <repo-root>/aptpool.json if present)"),
        )
        .arg(
            Arg::new("keep_versions")
                .long("keep-versions")
                .value_name("N")
                .default_value("5")
                .global(true)
                .help("Versions to keep per package and architecture"),
        )
        .subcommand(Command::new("init").about("Create the dists/ and pool/ skeleton"))
        .subcommand(
            Command::new("add")
                .about("Add a .deb to the pool, prune, and refresh indices")
                .arg(Arg::new("package_path").required(true).help("Path to the package file"))
                .arg(dist_arg())
                .arg(
                    Arg::new("component")
                        .short('c')
                        .long("component")
                        .value_name("COMPONENT")
                        .help("Pool component (default: first configured component)"),
                ),
        )
        .subcommand(
            Command::new("index")
                .about("Regenerate Packages and Release for a distribution")
                .arg(dist_arg()),
        )
        .subcommand(
            Command::new("prune")
                .about("Delete old versions from the pool")
                .arg(
                    Arg::new("dry_run")
                        .short('n')
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Only report what would be deleted"),
                ),
        )
        .subcommand(
            Command::new("sign")
                .about("Sign the Release file of a distribution")
                .arg(dist_arg())
                .arg(
                    Arg::new("key")
                        .short('k')
                        .long("key")
                        .value_name("KEYID")
                        .help("Key ID to sign with (default: gpg's default key)"),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "elvish", "fish", "powershell", "zsh"])
                        .help("Shell type"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Create man directory
    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("aptpool.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");

    println!("cargo:warning=Man page generated at {}", man_path.display());
}
