use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name of the pseudo-target that stands for every compatible device
pub const ALL_TARGETS: &str = "All";

/// Physical device models an app can be built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Device {
    NanoS,
    NanoSPlus,
    NanoX,
    Stax,
    Flex,
}

/// Static per-device values interpolated into generated commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub display_name: &'static str,
    /// Environment variable holding the SDK path inside the builder image
    pub sdk_var: &'static str,
    /// Model name understood by the emulator (`speculos --model`)
    pub emulator_model: &'static str,
    /// Directory name under `build/` where the C SDK puts artifacts
    pub build_dir_model: &'static str,
    pub target_id: u32,
    /// Target name understood by `cargo ledger build`
    pub rust_target: &'static str,
    /// Name used in `ledger_app.toml` device lists
    pub manifest_name: &'static str,
}

const PROFILES: [(Device, DeviceProfile); 5] = [
    (
        Device::NanoS,
        DeviceProfile {
            display_name: "Nano S",
            sdk_var: "$NANOS_SDK",
            emulator_model: "nanos",
            build_dir_model: "nanos",
            target_id: 0x3110_0004,
            rust_target: "nanos",
            manifest_name: "nanos",
        },
    ),
    (
        Device::NanoSPlus,
        DeviceProfile {
            display_name: "Nano S Plus",
            sdk_var: "$NANOSP_SDK",
            emulator_model: "nanosp",
            build_dir_model: "nanos2",
            target_id: 0x3310_0004,
            rust_target: "nanosplus",
            manifest_name: "nanos+",
        },
    ),
    (
        Device::NanoX,
        DeviceProfile {
            display_name: "Nano X",
            sdk_var: "$NANOX_SDK",
            emulator_model: "nanox",
            build_dir_model: "nanox",
            target_id: 0x3300_0004,
            rust_target: "nanox",
            manifest_name: "nanox",
        },
    ),
    (
        Device::Stax,
        DeviceProfile {
            display_name: "Stax",
            sdk_var: "$STAX_SDK",
            emulator_model: "stax",
            build_dir_model: "stax",
            target_id: 0x3320_0004,
            rust_target: "stax",
            manifest_name: "stax",
        },
    ),
    (
        Device::Flex,
        DeviceProfile {
            display_name: "Flex",
            sdk_var: "$FLEX_SDK",
            emulator_model: "flex",
            build_dir_model: "flex",
            target_id: 0x3330_0004,
            rust_target: "flex",
            manifest_name: "flex",
        },
    ),
];

impl Device {
    pub const ALL: [Device; 5] = [
        Device::NanoS,
        Device::NanoSPlus,
        Device::NanoX,
        Device::Stax,
        Device::Flex,
    ];

    pub fn profile(self) -> &'static DeviceProfile {
        // PROFILES is indexed in declaration order
        &PROFILES[self as usize].1
    }

    pub fn display_name(self) -> &'static str {
        self.profile().display_name
    }

    /// Parse a device from its display name, emulator model or manifest name.
    /// Matching ignores case and whitespace.
    pub fn parse(name: &str) -> Option<Device> {
        let wanted = normalize(name);
        Device::ALL.into_iter().find(|device| {
            let profile = device.profile();
            normalize(profile.display_name) == wanted
                || profile.emulator_model == wanted
                || normalize(profile.manifest_name) == wanted
                || profile.rust_target == wanted
        })
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// The selected build target: one device, or every device the app supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Device(Device),
    All,
}

impl Target {
    pub fn parse(name: &str) -> Option<Target> {
        if name.trim().eq_ignore_ascii_case(ALL_TARGETS) {
            return Some(Target::All);
        }
        Device::parse(name).map(Target::Device)
    }

    pub fn device(self) -> Option<Device> {
        match self {
            Target::Device(device) => Some(device),
            Target::All => None,
        }
    }

    pub fn is_all(self) -> bool {
        matches!(self, Target::All)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Device(device) => device.fmt(f),
            Target::All => f.write_str(ALL_TARGETS),
        }
    }
}
