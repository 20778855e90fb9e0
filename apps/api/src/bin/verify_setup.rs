//! Setup check for the assistant.
//!
//! Exercises the document and image codecs, checks that the project files
//! are in place and reports where (if anywhere) the OpenRouter key comes
//! from. Always exits 0; a missing key only means fallback mode.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use assist_api::config::{resolve_api_key, KeySource, API_KEY_VAR, DEFAULT_SECRETS_FILE};
use assist_api::documents::extract_text;
use assist_api::jobs::export::{render_docx, render_pdf};
use assist_api::llm_client::fenced::parse_fenced_json;
use assist_api::uploads::Upload;
use assist_api::vehicle::images::to_png_data_uri;
use clap::Parser;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

const REQUIRED_FILES: &[&str] = &[
    "Cargo.toml",
    "apps/api/Cargo.toml",
    "apps/api/src/main.rs",
    "apps/api/src/lib.rs",
    "apps/api/src/bin/verify_setup.rs",
];

const RULE: &str = "==================================================";

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

#[derive(Parser, Debug)]
#[command(
    name = "verify-setup",
    version,
    about = "Check that the job assistant and vehicle inspection API are ready to run"
)]
struct Args {
    /// Project root to check for required files.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// TOML secrets file that may hold OPENROUTER_API_KEY. Relative paths resolve against --root.
    #[arg(long, env = "SECRETS_FILE", default_value = DEFAULT_SECRETS_FILE)]
    secrets_file: PathBuf,
}

// ── Component self-test ──────────────────────────────────────────────────────

fn check_image_codec() -> Result<()> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([20, 120, 220])));
    let mut jpeg = Vec::new();
    img.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .context("JPEG encoding failed")?;

    let uri = to_png_data_uri(&Upload {
        file_name: "self-test.jpg".into(),
        data: jpeg.into(),
    })?;
    ensure!(
        uri.starts_with("data:image/png;base64,"),
        "unexpected data URI prefix"
    );
    Ok(())
}

fn check_docx() -> Result<()> {
    let bytes = render_docx("Setup self-test\nSecond line")?;
    let text = extract_text("self-test.docx", &bytes)?;
    ensure!(text.contains("Second line"), "DOCX round trip lost text");
    Ok(())
}

fn check_pdf() -> Result<()> {
    let bytes = render_pdf("Setup self-test")?;
    ensure!(bytes.starts_with(b"%PDF"), "PDF header missing");
    Ok(())
}

fn check_fence_extractor() -> Result<()> {
    let value = parse_fenced_json("Sure:\n```json\n{\"ok\": true}\n```")?;
    ensure!(value["ok"] == true, "fenced JSON not extracted");
    Ok(())
}

fn check_components() -> bool {
    println!("Checking components...");
    let checks: [(&str, fn() -> Result<()>); 4] = [
        ("Image decoding and PNG encoding", check_image_codec),
        ("DOCX export and extraction", check_docx),
        ("PDF export", check_pdf),
        ("Fenced JSON extraction", check_fence_extractor),
    ];

    let mut all_ok = true;
    for (name, check) in checks {
        match check() {
            Ok(()) => println!("  {} {name}", green("ok")),
            Err(e) => {
                println!("  {} {name}: {e:#}", red("FAILED"));
                all_ok = false;
            }
        }
    }
    all_ok
}

// ── Project layout ───────────────────────────────────────────────────────────

fn missing_files(root: &Path) -> Vec<&'static str> {
    REQUIRED_FILES
        .iter()
        .copied()
        .filter(|file| !root.join(file).exists())
        .collect()
}

fn check_files(root: &Path) -> bool {
    println!("\nChecking project files under {}...", root.display());
    let missing = missing_files(root);
    for file in REQUIRED_FILES {
        if missing.contains(file) {
            println!("  {} {file} NOT found", red("missing"));
        } else {
            println!("  {} {file} exists", green("ok"));
        }
    }
    missing.is_empty()
}

// ── Credential ───────────────────────────────────────────────────────────────

fn check_api_key(secrets_file: &Path) -> bool {
    println!("\nChecking API key configuration...");
    if secrets_file.exists() {
        println!("  {} {} exists", green("ok"), secrets_file.display());
    } else {
        println!("  {} {} not found", yellow("warn"), secrets_file.display());
    }

    match resolve_api_key(secrets_file) {
        Some((_, KeySource::Environment)) => {
            println!("  {} API key found in environment variable {API_KEY_VAR}", green("ok"));
            true
        }
        Some((_, KeySource::SecretsFile(path))) => {
            println!("  {} API key found in {}", green("ok"), path.display());
            true
        }
        None => {
            println!(
                "  {} No API key found (set {API_KEY_VAR} or add it to {})",
                yellow("warn"),
                secrets_file.display()
            );
            false
        }
    }
}

fn resolve_against(root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let secrets_file = resolve_against(&args.root, args.secrets_file);

    println!("{RULE}");
    println!("Assistant Setup Verification");
    println!("{RULE}");

    let components_ok = check_components();
    let files_ok = check_files(&args.root);
    let key_ok = check_api_key(&secrets_file);

    println!("\n{RULE}");
    println!("Summary:");
    println!("{RULE}");

    if components_ok && files_ok {
        println!("{}", green("All components and files are ready!"));
        if key_ok {
            println!("{}", green("API key is configured!"));
            println!("\nYou're ready to run the server:");
            println!("   cargo run --bin assist-api");
        } else {
            println!(
                "{}",
                yellow("API key not configured (vehicle pages will use fallback mode)")
            );
            println!("   Get your key from: https://openrouter.ai/");
            println!("   Then set {API_KEY_VAR} or create {}", secrets_file.display());
        }
    } else {
        println!("{}", red("Some issues found. Please fix them before running the server."));
        if !components_ok {
            println!("   A bundled codec failed its self-test; rebuild and check the output above");
        }
        if !files_ok {
            println!("   Some project files are missing");
        }
    }
    println!("{RULE}");

    Ok(())
}
