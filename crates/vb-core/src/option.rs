//! Configuration option identifiers

keyed_enum! {
    /// Engine configuration option
    pub enum Opt("OPT_") {
        // Agnus and Denise
        VideoFormat = 0 => "VIDEO_FORMAT",
        SyncMode = 1 => "SYNC_MODE",
        ProposedFps = 2 => "PROPOSED_FPS",
        AgnusRevision = 3 => "AGNUS_REVISION",
        SlowRamMirror = 4 => "SLOW_RAM_MIRROR",
        PtrDrops = 5 => "PTR_DROPS",
        DeniseRevision = 6 => "DENISE_REVISION",
        ViewportTracking = 7 => "VIEWPORT_TRACKING",
        Palette = 8 => "PALETTE",
        Brightness = 9 => "BRIGHTNESS",
        Contrast = 10 => "CONTRAST",
        Saturation = 11 => "SATURATION",

        // DMA debugger
        DmaDebugEnable = 12 => "DMA_DEBUG_ENABLE",
        DmaDebugMode = 13 => "DMA_DEBUG_MODE",
        DmaDebugOpacity = 14 => "DMA_DEBUG_OPACITY",
        DmaDebugChannel = 15 => "DMA_DEBUG_CHANNEL",
        DmaDebugColor = 16 => "DMA_DEBUG_COLOR",

        // CPU
        CpuRevision = 17 => "CPU_REVISION",
        CpuDasmRevision = 18 => "CPU_DASM_REVISION",
        CpuDasmSyntax = 19 => "CPU_DASM_SYNTAX",
        CpuOverclocking = 20 => "CPU_OVERCLOCKING",
        CpuResetVal = 21 => "CPU_RESET_VAL",

        // Real-time clock
        RtcModel = 22 => "RTC_MODEL",

        // Memory
        ChipRam = 23 => "CHIP_RAM",
        SlowRam = 24 => "SLOW_RAM",
        FastRam = 25 => "FAST_RAM",
        ExtStart = 26 => "EXT_START",
        SaveRoms = 27 => "SAVE_ROMS",
        SlowRamDelay = 28 => "SLOW_RAM_DELAY",
        Bankmap = 29 => "BANKMAP",
        UnmappingType = 30 => "UNMAPPING_TYPE",
        RamInitPattern = 31 => "RAM_INIT_PATTERN",

        // Floppy drives
        DriveConnect = 32 => "DRIVE_CONNECT",
        DriveSpeed = 33 => "DRIVE_SPEED",
        LockDsksync = 34 => "LOCK_DSKSYNC",
        AutoDsksync = 35 => "AUTO_DSKSYNC",
        DriveType = 36 => "DRIVE_TYPE",
        DriveMechanics = 37 => "DRIVE_MECHANICS",
        DriveRpm = 38 => "DRIVE_RPM",
        DiskSwapDelay = 39 => "DISK_SWAP_DELAY",
        DrivePan = 40 => "DRIVE_PAN",
        StepVolume = 41 => "STEP_VOLUME",
        PollVolume = 42 => "POLL_VOLUME",
        InsertVolume = 43 => "INSERT_VOLUME",
        EjectVolume = 44 => "EJECT_VOLUME",

        // Hard drives
        HdcConnect = 45 => "HDC_CONNECT",
        HdrType = 46 => "HDR_TYPE",
        HdrPan = 47 => "HDR_PAN",
        HdrStepVolume = 48 => "HDR_STEP_VOLUME",

        // Ports
        SerialDevice = 49 => "SERIAL_DEVICE",

        // Compositor
        HiddenBitplanes = 50 => "HIDDEN_BITPLANES",
        HiddenSprites = 51 => "HIDDEN_SPRITES",
        HiddenLayers = 52 => "HIDDEN_LAYERS",
        HiddenLayerAlpha = 53 => "HIDDEN_LAYER_ALPHA",
        ClxSprSpr = 54 => "CLX_SPR_SPR",
        ClxSprPlf = 55 => "CLX_SPR_PLF",
        ClxPlfPlf = 56 => "CLX_PLF_PLF",

        // Blitter
        BlitterAccuracy = 57 => "BLITTER_ACCURACY",

        // CIAs
        CiaRevision = 58 => "CIA_REVISION",
        Todbug = 59 => "TODBUG",
        EclockSyncing = 60 => "ECLOCK_SYNCING",

        // Keyboard and mouse
        AccurateKeyboard = 61 => "ACCURATE_KEYBOARD",
        PullupResistors = 62 => "PULLUP_RESISTORS",
        ShakeDetection = 63 => "SHAKE_DETECTION",
        MouseVelocity = 64 => "MOUSE_VELOCITY",

        // Joystick
        Autofire = 65 => "AUTOFIRE",
        AutofireBullets = 66 => "AUTOFIRE_BULLETS",
        AutofireDelay = 67 => "AUTOFIRE_DELAY",

        // Paula audio
        SamplingMethod = 68 => "SAMPLING_METHOD",
        FilterType = 69 => "FILTER_TYPE",
        FilterActivation = 70 => "FILTER_ACTIVATION",
        Audpan = 71 => "AUDPAN",
        Audvol = 72 => "AUDVOL",
        Audvoll = 73 => "AUDVOLL",
        Audvolr = 74 => "AUDVOLR",

        // Expansion boards
        DiagBoard = 75 => "DIAG_BOARD",

        // Remote servers
        SrvPort = 76 => "SRV_PORT",
        SrvProtocol = 77 => "SRV_PROTOCOL",
        SrvAutorun = 78 => "SRV_AUTORUN",
        SrvVerbose = 79 => "SRV_VERBOSE",
    }
}

/// Sub-target family an option is addressed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptScope {
    /// One value for the whole machine
    Global,
    /// One value per floppy drive (df0-df3)
    Drive,
    /// One value per hard drive (hd0-hd3)
    HardDrive,
    /// One value per Paula audio channel
    AudioChannel,
    /// One value per DMA debugger channel
    DmaChannel,
}

impl OptScope {
    /// Number of addressable sub-targets (1 for global options)
    pub fn targets(self) -> usize {
        match self {
            OptScope::Global => 1,
            OptScope::Drive => 4,
            OptScope::HardDrive => 4,
            OptScope::AudioChannel => 4,
            OptScope::DmaChannel => 8,
        }
    }

    /// Whether `index` addresses an existing sub-target
    pub fn contains(self, index: i64) -> bool {
        self != OptScope::Global && index >= 0 && (index as usize) < self.targets()
    }
}

impl Opt {
    /// Sub-target family of this option
    pub fn scope(self) -> OptScope {
        match self {
            Opt::DriveConnect
            | Opt::DriveType
            | Opt::DriveMechanics
            | Opt::DriveRpm
            | Opt::DiskSwapDelay
            | Opt::DrivePan
            | Opt::StepVolume
            | Opt::PollVolume
            | Opt::InsertVolume
            | Opt::EjectVolume => OptScope::Drive,

            Opt::HdcConnect | Opt::HdrType | Opt::HdrPan | Opt::HdrStepVolume => {
                OptScope::HardDrive
            }

            Opt::Audpan | Opt::Audvol => OptScope::AudioChannel,

            Opt::DmaDebugChannel | Opt::DmaDebugColor => OptScope::DmaChannel,

            _ => OptScope::Global,
        }
    }

    /// Whether this option is addressed per sub-target
    pub fn is_indexed(self) -> bool {
        self.scope() != OptScope::Global
    }
}

/// A single configuration change: option, optional sub-target, value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOption {
    pub key: Opt,
    pub index: Option<i64>,
    pub value: i64,
}

impl ConfigOption {
    /// Machine-wide change
    pub fn scalar(key: Opt, value: i64) -> Self {
        Self { key, index: None, value }
    }

    /// Change addressed at one sub-target
    pub fn indexed(key: Opt, index: i64, value: i64) -> Self {
        Self { key, index: Some(index), value }
    }
}
