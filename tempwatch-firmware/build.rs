//! Build script for tempwatch-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sensor.toml and compiles it into the firmware as a const

use std::env;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempwatch_core::config::TempwatchConfig;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    setup_linker(&out_dir);
    let config = load_config();
    emit_config(&out_dir, &config);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("create memory.x");
    f.write_all(memory_x).expect("write memory.x");

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate sensor.toml
fn load_config() -> TempwatchConfig {
    println!("cargo:rerun-if-changed=sensor.toml");

    let config_path = Path::new("sensor.toml");

    if !config_path.exists() {
        fail(
            "sensor.toml not found!",
            &["The firmware requires a sensor.toml configuration file.".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read sensor.toml", &[e.to_string()]),
    };

    // Missing keys fall back to the EK-TM4C123GXL defaults
    let config: TempwatchConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => fail(
            "Invalid sensor.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    if let Err(e) = config.validate() {
        fail("Invalid configuration in sensor.toml", &[format!("{:?}", e)]);
    }

    println!("cargo:warning=sensor.toml validated successfully");
    config
}

/// Write the validated configuration out as a Rust const
fn emit_config(out_dir: &Path, config: &TempwatchConfig) {
    let board = &config.board;
    let sensor = &config.sensor;

    let source = format!(
        "pub const CONFIG: TempwatchConfig = TempwatchConfig {{\n\
         \x20   board: BoardConfig {{\n\
         \x20       system_clock_hz: {},\n\
         \x20       i2c_frequency_hz: {},\n\
         \x20       uart_baudrate: {},\n\
         \x20       poll_limit: {},\n\
         \x20   }},\n\
         \x20   sensor: SensorConfig {{\n\
         \x20       address: {:#04x},\n\
         \x20       verify_identity: {},\n\
         \x20       config_register: {},\n\
         \x20       upper_limit_x10: {},\n\
         \x20       lower_limit_x10: {},\n\
         \x20       critical_limit_x10: {},\n\
         \x20   }},\n\
         \x20   poll_interval_ms: {},\n\
         }};\n",
        board.system_clock_hz,
        board.i2c_frequency_hz,
        board.uart_baudrate,
        board.poll_limit,
        sensor.address,
        sensor.verify_identity,
        option(sensor.config_register),
        option(sensor.upper_limit_x10),
        option(sensor.lower_limit_x10),
        option(sensor.critical_limit_x10),
        config.poll_interval_ms,
    );

    fs::write(out_dir.join("config.rs"), source).expect("write config.rs");
}

fn option<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => format!("Some({})", v),
        None => "None".to_string(),
    }
}

/// Abort the build with a boxed error message
fn fail(title: &str, details: &[String]) -> ! {
    let body = details
        .iter()
        .map(|line| {
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.clone()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
