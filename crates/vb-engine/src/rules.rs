//! Per-option value domains and defaults

use vb_core::{
    AgnusRevision, BankMap, CiaRevision, CpuRevision, DeniseRevision, DriveMechanics,
    FloppyDriveType, Opt, Palette, RamInitPattern, RtcRevision, SerialPortDevice,
    UnmappedMemory, VideoFormat,
};

/// Set of accepted values for an option
#[derive(Debug, Clone, Copy)]
pub enum Domain {
    /// 0 or 1
    Bool,
    /// Inclusive range
    Range(i64, i64),
    /// Explicit list
    OneOf(&'static [i64]),
    /// Raw value of a keyed enum
    Keyed(fn(i64) -> bool),
}

impl Domain {
    pub fn accepts(&self, value: i64) -> bool {
        match *self {
            Domain::Bool => value == 0 || value == 1,
            Domain::Range(min, max) => (min..=max).contains(&value),
            Domain::OneOf(values) => values.contains(&value),
            Domain::Keyed(check) => check(value),
        }
    }
}

/// Validation rule of one option
#[derive(Debug, Clone, Copy)]
pub struct OptionRule {
    pub domain: Domain,
    /// Power-up value
    pub default: i64,
    /// Rejected while the machine is powered on
    pub locked: bool,
}

impl OptionRule {
    const fn new(domain: Domain, default: i64) -> Self {
        Self {
            domain,
            default,
            locked: false,
        }
    }

    const fn locked(domain: Domain, default: i64) -> Self {
        Self {
            domain,
            default,
            locked: true,
        }
    }
}

const CHIP_RAM_SIZES: &[i64] = &[256, 512, 1024, 2048];
const SLOW_RAM_SIZES: &[i64] = &[0, 256, 512, 768, 1024, 1280, 1536];
const FAST_RAM_SIZES: &[i64] = &[0, 64, 128, 256, 512, 1024, 2048, 4096, 8192];
const EXT_START_PAGES: &[i64] = &[0xE0, 0xF0];
const DRIVE_SPEEDS: &[i64] = &[-1, 1, 2, 4, 8];

const VOLUME: Domain = Domain::Range(0, 100);
const PAN: Domain = Domain::Range(0, 400);

/// Look up the rule of an option
pub fn rule(opt: Opt) -> OptionRule {
    use Domain::*;

    match opt {
        Opt::VideoFormat => OptionRule::new(Keyed(|v| VideoFormat::from_raw(v).is_some()), 0),
        Opt::SyncMode => OptionRule::new(Range(0, 2), 0),
        Opt::ProposedFps => OptionRule::new(Range(25, 120), 50),
        Opt::AgnusRevision => {
            OptionRule::locked(Keyed(|v| AgnusRevision::from_raw(v).is_some()), 2)
        }
        Opt::SlowRamMirror => OptionRule::new(Bool, 1),
        Opt::PtrDrops => OptionRule::new(Bool, 1),
        Opt::DeniseRevision => {
            OptionRule::locked(Keyed(|v| DeniseRevision::from_raw(v).is_some()), 0)
        }
        Opt::ViewportTracking => OptionRule::new(Bool, 1),
        Opt::Palette => OptionRule::new(Keyed(|v| Palette::from_raw(v).is_some()), 0),
        Opt::Brightness | Opt::Contrast | Opt::Saturation => OptionRule::new(VOLUME, 50),

        Opt::DmaDebugEnable => OptionRule::new(Bool, 0),
        Opt::DmaDebugMode => OptionRule::new(Range(0, 3), 0),
        Opt::DmaDebugOpacity => OptionRule::new(VOLUME, 50),
        Opt::DmaDebugChannel => OptionRule::new(Bool, 1),
        Opt::DmaDebugColor => OptionRule::new(Range(0, 0xFF_FFFF), 0xFF_FFFF),

        Opt::CpuRevision => {
            OptionRule::locked(Keyed(|v| CpuRevision::from_raw(v).is_some()), 0)
        }
        Opt::CpuDasmRevision => {
            OptionRule::new(Keyed(|v| CpuRevision::from_raw(v).is_some()), 0)
        }
        Opt::CpuDasmSyntax => OptionRule::new(Range(0, 4), 0),
        Opt::CpuOverclocking => OptionRule::new(Range(0, 28), 0),
        Opt::CpuResetVal => OptionRule::new(Range(0, u32::MAX as i64), 0),

        Opt::RtcModel => OptionRule::locked(Keyed(|v| RtcRevision::from_raw(v).is_some()), 0),

        Opt::ChipRam => OptionRule::locked(OneOf(CHIP_RAM_SIZES), 512),
        Opt::SlowRam => OptionRule::locked(OneOf(SLOW_RAM_SIZES), 512),
        Opt::FastRam => OptionRule::locked(OneOf(FAST_RAM_SIZES), 0),
        Opt::ExtStart => OptionRule::locked(OneOf(EXT_START_PAGES), 0xE0),
        Opt::SaveRoms => OptionRule::new(Bool, 1),
        Opt::SlowRamDelay => OptionRule::new(Bool, 1),
        Opt::Bankmap => OptionRule::locked(Keyed(|v| BankMap::from_raw(v).is_some()), 0),
        Opt::UnmappingType => {
            OptionRule::new(Keyed(|v| UnmappedMemory::from_raw(v).is_some()), 0)
        }
        Opt::RamInitPattern => {
            OptionRule::new(Keyed(|v| RamInitPattern::from_raw(v).is_some()), 0)
        }

        Opt::DriveConnect => OptionRule::new(Bool, 0),
        Opt::DriveSpeed => OptionRule::new(OneOf(DRIVE_SPEEDS), 1),
        Opt::LockDsksync => OptionRule::new(Bool, 0),
        Opt::AutoDsksync => OptionRule::new(Bool, 0),
        Opt::DriveType => {
            OptionRule::new(Keyed(|v| FloppyDriveType::from_raw(v).is_some()), 0)
        }
        Opt::DriveMechanics => {
            OptionRule::new(Keyed(|v| DriveMechanics::from_raw(v).is_some()), 1)
        }
        Opt::DriveRpm => OptionRule::new(Range(270, 330), 300),
        Opt::DiskSwapDelay => OptionRule::new(Range(0, 10_000), 1_800),
        Opt::DrivePan => OptionRule::new(PAN, 100),
        Opt::StepVolume | Opt::PollVolume | Opt::InsertVolume | Opt::EjectVolume => {
            OptionRule::new(VOLUME, 50)
        }

        Opt::HdcConnect => OptionRule::locked(Bool, 0),
        Opt::HdrType => OptionRule::new(Range(0, 0), 0),
        Opt::HdrPan => OptionRule::new(PAN, 300),
        Opt::HdrStepVolume => OptionRule::new(VOLUME, 50),

        Opt::SerialDevice => {
            OptionRule::new(Keyed(|v| SerialPortDevice::from_raw(v).is_some()), 0)
        }

        Opt::HiddenBitplanes => OptionRule::new(Range(0, 0x3F), 0),
        Opt::HiddenSprites => OptionRule::new(Range(0, 0xFF), 0),
        Opt::HiddenLayers => OptionRule::new(Range(0, 0xFFFF), 0),
        Opt::HiddenLayerAlpha => OptionRule::new(Range(0, 255), 128),
        Opt::ClxSprSpr | Opt::ClxSprPlf | Opt::ClxPlfPlf => OptionRule::new(Bool, 0),

        Opt::BlitterAccuracy => OptionRule::new(Range(0, 2), 2),

        Opt::CiaRevision => {
            OptionRule::locked(Keyed(|v| CiaRevision::from_raw(v).is_some()), 0)
        }
        Opt::Todbug => OptionRule::new(Bool, 1),
        Opt::EclockSyncing => OptionRule::new(Bool, 1),

        Opt::AccurateKeyboard => OptionRule::new(Bool, 1),
        Opt::PullupResistors => OptionRule::new(Bool, 1),
        Opt::ShakeDetection => OptionRule::new(Bool, 1),
        Opt::MouseVelocity => OptionRule::new(Range(0, 255), 100),

        Opt::Autofire => OptionRule::new(Bool, 0),
        Opt::AutofireBullets => OptionRule::new(Range(-1, 255), -1),
        Opt::AutofireDelay => OptionRule::new(Range(0, 1000), 125),

        Opt::SamplingMethod => OptionRule::new(Range(0, 2), 0),
        Opt::FilterType => OptionRule::new(Range(0, 2), 1),
        Opt::FilterActivation => OptionRule::new(Range(0, 2), 0),
        Opt::Audpan => OptionRule::new(PAN, 0),
        Opt::Audvol => OptionRule::new(VOLUME, 100),
        Opt::Audvoll | Opt::Audvolr => OptionRule::new(VOLUME, 50),

        Opt::DiagBoard => OptionRule::locked(Bool, 0),

        Opt::SrvPort => OptionRule::new(Range(0, 65535), 8080),
        Opt::SrvProtocol => OptionRule::new(Range(0, 2), 0),
        Opt::SrvAutorun => OptionRule::new(Bool, 0),
        Opt::SrvVerbose => OptionRule::new(Bool, 1),
    }
}
