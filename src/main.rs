//! Casper Excalibur WMI Control CLI
//!
//! Command-line interface for the keyboard/corner RGB zones, fan sensors,
//! and power plans of Casper Excalibur laptops.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use casper_rust_wmi::config::{self, LedPreset, ZoneColor};
use casper_rust_wmi::device::{DEFAULT_DEVICE_NODE, DevNodeTransport, Excalibur};
use casper_rust_wmi::protocol::{CASPER_WMI_GUID, MAX_BRIGHTNESS, Zone};
use casper_rust_wmi::quirks;
use casper_rust_wmi::utils::detect;
use casper_rust_wmi::utils::parsing::{parse_hex_color, parse_power_profile, parse_zone};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Casper Excalibur WMI Control Tool
#[derive(Parser, Debug)]
#[command(name = "casper-wmi-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the WMI device node
    #[arg(short, long, default_value = DEFAULT_DEVICE_NODE)]
    device: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show fan speeds and the active power plan
    Status,

    /// Continuously monitor fan speeds
    Monitor {
        /// Update interval in seconds
        #[arg(short, long, default_value = "1")]
        interval: u64,
    },

    /// Show detected platform identity and applied quirks
    Info,

    /// Set the color of one LED zone
    SetLed {
        /// Zone: right, middle, left, or corner
        zone: String,

        /// Color as RRGGBB hex
        color: String,
    },

    /// Set the brightness of one LED zone
    SetBrightness {
        /// Zone: right, middle, left, or corner
        zone: String,

        /// Brightness level (0-2)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=MAX_BRIGHTNESS as i64))]
        level: u8,
    },

    /// Read the brightness of one LED zone
    GetBrightness {
        /// Zone: right, middle, left, or corner
        zone: String,
    },

    /// Show the active power profile
    GetProfile,

    /// Switch the power profile
    SetProfile {
        /// Profile: low-power, balanced, balanced-performance, or performance
        name: String,
    },

    /// List the power profiles this machine supports
    ListProfiles,

    /// Apply a named LED preset to all zones
    Preset {
        /// Preset name (built-in or saved)
        name: String,
    },

    /// Save a uniform LED preset under a name
    SavePreset {
        /// Preset name
        name: String,

        /// Color as RRGGBB hex
        color: String,

        /// Brightness level (0-2)
        #[arg(value_parser = clap::value_parser!(u8).range(0..=MAX_BRIGHTNESS as i64))]
        brightness: u8,
    },

    /// List built-in and saved LED presets
    ListPresets,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Status => cmd_status(&args.device),
        Command::Monitor { interval } => cmd_monitor(&args.device, interval),
        Command::Info => cmd_info(),
        Command::SetLed { zone, color } => cmd_set_led(&args.device, &zone, &color),
        Command::SetBrightness { zone, level } => cmd_set_brightness(&args.device, &zone, level),
        Command::GetBrightness { zone } => cmd_get_brightness(&args.device, &zone),
        Command::GetProfile => cmd_get_profile(&args.device),
        Command::SetProfile { name } => cmd_set_profile(&args.device, &name),
        Command::ListProfiles => cmd_list_profiles(&args.device),
        Command::Preset { name } => cmd_preset(&args.device, &name),
        Command::SavePreset {
            name,
            color,
            brightness,
        } => cmd_save_preset(&name, &color, brightness),
        Command::ListPresets => cmd_list_presets(),
    }
}

/// Resolve the hardware variant and bind the WMI channel.
fn open_laptop(device: &Path) -> Result<Excalibur<DevNodeTransport>> {
    let id = detect::detect().context("Failed to read platform identity")?;
    let quirk = quirks::resolve(id.cpu, &id.sys_vendor, &id.product_name)
        .context("This machine is not a supported Casper Excalibur")?;
    let transport = DevNodeTransport::open(device)
        .with_context(|| format!("Failed to open WMI device node {}", device.display()))?;
    let laptop = Excalibur::bind(transport, quirk).context("Failed to bind WMI channel")?;
    Ok(laptop)
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_status(device: &Path) -> Result<()> {
    let laptop = open_laptop(device)?;

    let fans = laptop.fan_reading().context("Failed to read fan speeds")?;
    print!("{fans}");

    if laptop.quirk().no_power_profiles {
        println!("Power profiles: not available on this model");
    } else {
        let profile = laptop
            .power_profile()
            .context("Failed to read power profile")?;
        println!("Power profile: {profile}");
    }

    Ok(())
}

fn cmd_monitor(device: &Path, interval: u64) -> Result<()> {
    let laptop = open_laptop(device)?;

    let running = Arc::new(AtomicBool::new(true));
    let running_handler = Arc::clone(&running);
    ctrlc::set_handler(move || {
        running_handler.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl-C handler")?;

    println!("Monitoring fan speeds every {interval}s. Press Ctrl-C to stop.\n");

    while running.load(Ordering::SeqCst) {
        match laptop.fan_reading() {
            Ok(fans) => println!("cpu {:>5} rpm | gpu {:>5} rpm", fans.cpu_fan, fans.gpu_fan),
            Err(e) => eprintln!("read failed: {e}"),
        }
        std::thread::sleep(Duration::from_secs(interval));
    }

    println!("Stopped.");
    Ok(())
}

fn cmd_info() -> Result<()> {
    let id = detect::detect().context("Failed to read platform identity")?;

    println!("WMI GUID:    {CASPER_WMI_GUID}");
    println!(
        "CPU:         family {} model {:#04x}",
        id.cpu.family, id.cpu.model
    );
    println!("Vendor:      {}", id.sys_vendor);
    println!("Product:     {}", id.product_name);

    match quirks::resolve(id.cpu, &id.sys_vendor, &id.product_name) {
        Ok(quirk) => {
            println!("Quirks:");
            println!("  big-endian fans:  {}", quirk.big_endian_fans);
            println!("  new power scheme: {}", quirk.new_power_scheme);
            println!("  power profiles:   {}", !quirk.no_power_profiles);
            println!("Zones:");
            for zone in Zone::ALL {
                println!("  {:<8} {}", zone.to_string(), zone.name());
            }
        }
        Err(e) => println!("Unsupported: {e}"),
    }

    Ok(())
}

fn cmd_set_led(device: &Path, zone: &str, color: &str) -> Result<()> {
    let zone = parse_zone(zone)?;
    let (r, g, b) = parse_hex_color(color)?;

    let laptop = open_laptop(device)?;
    laptop
        .set_color(zone, r, g, b)
        .with_context(|| format!("Failed to set color on zone '{zone}'"))?;

    println!("Zone '{zone}' set to #{r:02X}{g:02X}{b:02X}");
    Ok(())
}

fn cmd_set_brightness(device: &Path, zone: &str, level: u8) -> Result<()> {
    let zone = parse_zone(zone)?;

    let laptop = open_laptop(device)?;
    laptop
        .set_brightness(zone, level)
        .with_context(|| format!("Failed to set brightness on zone '{zone}'"))?;

    println!("Zone '{zone}' brightness set to {level}");
    Ok(())
}

fn cmd_get_brightness(device: &Path, zone: &str) -> Result<()> {
    let zone = parse_zone(zone)?;

    let laptop = open_laptop(device)?;
    println!("{}", laptop.brightness(zone));
    Ok(())
}

fn cmd_get_profile(device: &Path) -> Result<()> {
    let laptop = open_laptop(device)?;
    let profile = laptop
        .power_profile()
        .context("Failed to read power profile")?;
    println!("{profile}");
    Ok(())
}

fn cmd_set_profile(device: &Path, name: &str) -> Result<()> {
    let profile = parse_power_profile(name)?;

    let laptop = open_laptop(device)?;
    laptop
        .set_power_profile(profile)
        .with_context(|| format!("Failed to switch to profile '{profile}'"))?;

    println!("Power profile set to {profile}");
    Ok(())
}

fn cmd_list_profiles(device: &Path) -> Result<()> {
    let laptop = open_laptop(device)?;

    let choices = laptop.power_profile_choices();
    if choices.is_empty() {
        println!("Power profiles are not available on this model.");
        return Ok(());
    }
    for profile in choices {
        println!("{profile}");
    }
    Ok(())
}

fn cmd_preset(device: &Path, name: &str) -> Result<()> {
    let preset = config::find_preset(name)?;

    let laptop = open_laptop(device)?;
    laptop
        .apply_preset(&preset)
        .with_context(|| format!("Failed to apply preset '{name}'"))?;

    println!("Preset '{name}' applied.");
    Ok(())
}

fn cmd_save_preset(name: &str, color: &str, brightness: u8) -> Result<()> {
    if LedPreset::builtin(name).is_some() {
        anyhow::bail!("'{name}' is a built-in preset and cannot be overwritten");
    }
    let (r, g, b) = parse_hex_color(color)?;

    let preset = LedPreset::uniform(ZoneColor::new(r, g, b, brightness));
    config::save_preset(name, preset).context("Failed to save preset")?;

    println!("Preset '{name}' saved.");
    Ok(())
}

fn cmd_list_presets() -> Result<()> {
    println!("Built-in:");
    for name in LedPreset::BUILTIN_NAMES {
        println!("  {name}");
    }

    let saved = config::load_presets().context("Failed to load preset store")?;
    if !saved.is_empty() {
        println!("Saved:");
        for name in saved.keys() {
            println!("  {name}");
        }
    }
    Ok(())
}
