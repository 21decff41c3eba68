//! Enumerated option values (chip revisions, memory layouts, ...)

keyed_enum! {
    pub enum AgnusRevision("AGNUS_") {
        OcsOld = 0 => "OCS_OLD",
        Ocs = 1 => "OCS",
        Ecs1Mb = 2 => "ECS_1MB",
        Ecs2Mb = 3 => "ECS_2MB",
    }
}

keyed_enum! {
    /// Memory bank map of the emulated model
    pub enum BankMap("BANK_MAP_") {
        A500 = 0 => "A500",
        A1000 = 1 => "A1000",
        A2000A = 2 => "A2000A",
        A2000B = 3 => "A2000B",
    }
}

keyed_enum! {
    pub enum CiaRevision("CIA_") {
        Mos8520Dip = 0 => "MOS_8520_DIP",
        Mos8520Plcc = 1 => "MOS_8520_PLCC",
    }
}

keyed_enum! {
    pub enum CpuRevision("CPU_") {
        M68000 = 0 => "68000",
        M68010 = 1 => "68010",
        M68Ec020 = 2 => "68EC020",
    }
}

keyed_enum! {
    pub enum DeniseRevision("DENISE_") {
        Ocs = 0 => "OCS",
        Ecs = 1 => "ECS",
    }
}

keyed_enum! {
    /// Mechanical drive emulation (head step delays, sounds)
    pub enum DriveMechanics("MECHANICS_") {
        None = 0 => "NONE",
        A1010 = 1 => "A1010",
    }
}

keyed_enum! {
    pub enum FloppyDriveType("DRIVE_") {
        Dd35 = 0 => "DD_35",
        Hd35 = 1 => "HD_35",
        Dd525 = 2 => "DD_525",
    }
}

keyed_enum! {
    /// Monitor color palette
    pub enum Palette("PALETTE_") {
        Color = 0 => "COLOR",
        BlackWhite = 1 => "BLACK_WHITE",
        PaperWhite = 2 => "PAPER_WHITE",
        Green = 3 => "GREEN",
        Amber = 4 => "AMBER",
        Sepia = 5 => "SEPIA",
    }
}

keyed_enum! {
    /// Initial contents of RAM after a hard reset
    pub enum RamInitPattern("RAM_INIT_") {
        AllZeroes = 0 => "ALL_ZEROES",
        AllOnes = 1 => "ALL_ONES",
        Randomized = 2 => "RANDOMIZED",
    }
}

keyed_enum! {
    pub enum RtcRevision("RTC_") {
        None = 0 => "NONE",
        Oki = 1 => "OKI",
        Ricoh = 2 => "RICOH",
    }
}

keyed_enum! {
    /// Device attached to the serial port
    pub enum SerialPortDevice("SPD_") {
        None = 0 => "NONE",
        NullModem = 1 => "NULLMODEM",
        Loopback = 2 => "LOOPBACK",
    }
}

keyed_enum! {
    /// Value read from unmapped memory
    pub enum UnmappedMemory("UNMAPPED_") {
        Floating = 0 => "FLOATING",
        AllZeroes = 1 => "ALL_ZEROES",
        AllOnes = 2 => "ALL_ONES",
    }
}

keyed_enum! {
    pub enum VideoFormat("VID_") {
        Pal = 0 => "PAL",
        Ntsc = 1 => "NTSC",
    }
}

impl VideoFormat {
    /// Frames per second of the video standard
    pub fn fps(self) -> u32 {
        match self {
            VideoFormat::Pal => 50,
            VideoFormat::Ntsc => 60,
        }
    }

    /// CPU clock frequency in Hz
    pub fn cpu_frequency(self) -> u64 {
        match self {
            VideoFormat::Pal => 7_093_790,
            VideoFormat::Ntsc => 7_159_090,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_keys() {
        assert_eq!(AgnusRevision::from_key("OCS"), Some(AgnusRevision::Ocs));
        assert_eq!(AgnusRevision::from_key("AGNUS_ECS_2MB"), Some(AgnusRevision::Ecs2Mb));
        assert_eq!(AgnusRevision::from_key("AGA"), None);
        assert_eq!(CpuRevision::M68Ec020.constant_name(), "CPU_68EC020");
        assert_eq!(VideoFormat::Ntsc.constant_name(), "VID_NTSC");
        assert_eq!(VideoFormat::Pal.fps(), 50);
        assert!(VideoFormat::Ntsc.cpu_frequency() > VideoFormat::Pal.cpu_frequency());
    }
}
