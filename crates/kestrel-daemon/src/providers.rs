//! Platform signal providers.
//!
//! CPU, memory, and storage acquisition is backed by `sysinfo`; battery
//! charge is read from the sysfs power-supply class. Every provider
//! normalizes its value into `[0.0, 1.0]` and reports facility failures as
//! invalid samples rather than errors, so a broken facility degrades the
//! signal instead of stopping the daemon.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use sysinfo::{Disks, System};

use kestrel_core::{Sample, SignalProvider};

// ── cpu_load ────────────────────────────────────────────────────────────

/// Fraction of CPU time spent non-idle.
pub struct CpuLoadProvider {
    system: System,
}

impl CpuLoadProvider {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self { system }
    }
}

impl Default for CpuLoadProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalProvider for CpuLoadProvider {
    fn id(&self) -> &str {
        "cpu_load"
    }

    fn read(&mut self) -> Sample {
        let now = Instant::now();
        self.system.refresh_cpu_all();

        let usage = f64::from(self.system.global_cpu_usage());
        if !usage.is_finite() {
            tracing::warn!(signal = self.id(), "cpu usage unavailable");
            return Sample::invalid(self.id(), now);
        }

        Sample::new(self.id(), (usage / 100.0).clamp(0.0, 1.0), now)
    }
}

// ── memory ──────────────────────────────────────────────────────────────

/// Fraction of physical memory in use.
pub struct MemoryProvider {
    system: System,
}

impl MemoryProvider {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        Self { system }
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalProvider for MemoryProvider {
    fn id(&self) -> &str {
        "memory"
    }

    fn read(&mut self) -> Sample {
        let now = Instant::now();
        self.system.refresh_memory();

        let total = self.system.total_memory();
        if total == 0 {
            tracing::warn!(signal = self.id(), "total memory reported as zero");
            return Sample::invalid(self.id(), now);
        }

        let used = self.system.used_memory() as f64 / total as f64;
        Sample::new(self.id(), used.clamp(0.0, 1.0), now)
    }
}

// ── battery ─────────────────────────────────────────────────────────────

/// Battery charge fraction from `/sys/class/power_supply`.
///
/// Hosts without a battery (desktops, containers) produce invalid samples;
/// the rule pipeline reports the signal as FAILED, which is the documented
/// provider-failure behavior.
pub struct BatteryProvider {
    supply_root: PathBuf,
}

impl BatteryProvider {
    pub fn new() -> Self {
        Self::with_supply_root("/sys/class/power_supply")
    }

    /// Use an alternate sysfs root (tests point this at a fixture tree).
    pub fn with_supply_root(root: impl Into<PathBuf>) -> Self {
        Self {
            supply_root: root.into(),
        }
    }

    fn charge_fraction(&self) -> Option<f64> {
        let entries = fs::read_dir(&self.supply_root).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_battery(&path) {
                continue;
            }
            let capacity = fs::read_to_string(path.join("capacity")).ok()?;
            let percent: f64 = capacity.trim().parse().ok()?;
            return Some((percent / 100.0).clamp(0.0, 1.0));
        }
        None
    }
}

fn is_battery(supply: &Path) -> bool {
    fs::read_to_string(supply.join("type"))
        .map(|t| t.trim() == "Battery")
        .unwrap_or(false)
}

impl Default for BatteryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalProvider for BatteryProvider {
    fn id(&self) -> &str {
        "battery"
    }

    fn read(&mut self) -> Sample {
        let now = Instant::now();
        match self.charge_fraction() {
            Some(fraction) => Sample::new(self.id(), fraction, now),
            None => {
                tracing::debug!(signal = self.id(), "no readable battery under sysfs");
                Sample::invalid(self.id(), now)
            }
        }
    }
}

// ── storage ─────────────────────────────────────────────────────────────

/// Fraction of the root volume in use.
pub struct StorageProvider;

impl StorageProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalProvider for StorageProvider {
    fn id(&self) -> &str {
        "storage"
    }

    fn read(&mut self) -> Sample {
        let now = Instant::now();
        let disks = Disks::new_with_refreshed_list();

        let root = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == Path::new("/"));

        match root {
            Some(disk) if disk.total_space() > 0 => {
                let available = disk.available_space() as f64;
                let total = disk.total_space() as f64;
                Sample::new(self.id(), (1.0 - available / total).clamp(0.0, 1.0), now)
            }
            _ => {
                tracing::warn!(signal = self.id(), "root volume statistics unavailable");
                Sample::invalid(self.id(), now)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_load_is_normalized() {
        let mut provider = CpuLoadProvider::new();
        let sample = provider.read();
        assert_eq!(sample.signal_id, "cpu_load");
        if sample.valid {
            assert!((0.0..=1.0).contains(&sample.value));
        }
    }

    #[test]
    fn memory_is_normalized() {
        let mut provider = MemoryProvider::new();
        let sample = provider.read();
        assert_eq!(sample.signal_id, "memory");
        if sample.valid {
            assert!((0.0..=1.0).contains(&sample.value));
        }
    }

    #[test]
    fn storage_is_normalized() {
        let mut provider = StorageProvider::new();
        let sample = provider.read();
        assert_eq!(sample.signal_id, "storage");
        if sample.valid {
            assert!((0.0..=1.0).contains(&sample.value));
        }
    }

    #[test]
    fn battery_reads_sysfs_fixture() {
        let root = tempfile::tempdir().unwrap();
        let bat = root.path().join("BAT0");
        fs::create_dir(&bat).unwrap();
        fs::write(bat.join("type"), "Battery\n").unwrap();
        fs::write(bat.join("capacity"), "87\n").unwrap();

        let mut provider = BatteryProvider::with_supply_root(root.path());
        let sample = provider.read();
        assert!(sample.valid);
        assert!((sample.value - 0.87).abs() < f64::EPSILON);
    }

    #[test]
    fn battery_skips_non_battery_supplies() {
        let root = tempfile::tempdir().unwrap();
        let ac = root.path().join("AC");
        fs::create_dir(&ac).unwrap();
        fs::write(ac.join("type"), "Mains\n").unwrap();

        let mut provider = BatteryProvider::with_supply_root(root.path());
        assert!(!provider.read().valid);
    }

    #[test]
    fn battery_missing_sysfs_is_invalid_not_a_panic() {
        let mut provider = BatteryProvider::with_supply_root("/nonexistent/power_supply");
        let sample = provider.read();
        assert!(!sample.valid);
        assert_eq!(sample.signal_id, "battery");
    }

    #[test]
    fn battery_clamps_out_of_range_capacity() {
        let root = tempfile::tempdir().unwrap();
        let bat = root.path().join("BAT0");
        fs::create_dir(&bat).unwrap();
        fs::write(bat.join("type"), "Battery\n").unwrap();
        fs::write(bat.join("capacity"), "104\n").unwrap();

        let mut provider = BatteryProvider::with_supply_root(root.path());
        let sample = provider.read();
        assert!(sample.valid);
        assert!((sample.value - 1.0).abs() < f64::EPSILON);
    }
}
