use std::env;
use std::fs;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=config.toml");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let config_path = Path::new(&manifest_dir).join("config.toml");
    let defaults = fs::read_to_string(&config_path).expect("Failed to read config.toml");

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_path = Path::new(&out_dir).join("default_config.rs");

    fs::write(
        dest_path,
        format!("pub const DEFAULT_CONFIG: &str = r##\"{defaults}\"##;"),
    )
    .expect("Failed to write embedded default config");
}
