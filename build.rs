use indoc::formatdoc;
use std::env;
use std::fs;
use std::path::Path;

// Embeds assets/help.md into the binary together with its modification
// stamp, so the help overlay never depends on files next to the executable.
fn main() {
    let manifest = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let help_path = Path::new(&manifest).join("assets").join("help.md");
    println!("cargo:rerun-if-changed={}", help_path.display());

    let help_text = fs::read_to_string(&help_path).expect("assets/help.md is readable");
    let updated = fs::metadata(&help_path)
        .and_then(|meta| meta.modified())
        .map(|time| chrono::DateTime::<chrono::Local>::from(time).format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let generated = formatdoc! {
        r##"
            pub const HELP_TEXT: &str = r#"{help_text}"#;
            pub const HELP_UPDATED: &str = "{updated}";
        "##
    };
    fs::write(Path::new(&out_dir).join("generated_help.rs"), generated)
        .expect("failed to write generated_help.rs");
}
