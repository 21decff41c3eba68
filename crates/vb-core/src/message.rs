//! Engine message tags and the event payload carried across the thread boundary

keyed_enum! {
    /// Tag of a message posted by the engine's message bus
    pub enum MsgType("MSG_") {
        None = 0 => "NONE",
        Register = 1 => "REGISTER",
        Config = 2 => "CONFIG",
        PowerOn = 3 => "POWER_ON",
        PowerOff = 4 => "POWER_OFF",
        Run = 5 => "RUN",
        Pause = 6 => "PAUSE",
        Step = 7 => "STEP",
        Reset = 8 => "RESET",
        Halt = 9 => "HALT",
        Abort = 10 => "ABORT",
        WarpOn = 11 => "WARP_ON",
        WarpOff = 12 => "WARP_OFF",
        DebugOn = 13 => "DEBUG_ON",
        DebugOff = 14 => "DEBUG_OFF",
        MuteOn = 15 => "MUTE_ON",
        MuteOff = 16 => "MUTE_OFF",
        PowerLedOn = 17 => "POWER_LED_ON",
        PowerLedDim = 18 => "POWER_LED_DIM",
        PowerLedOff = 19 => "POWER_LED_OFF",
        CloseConsole = 20 => "CLOSE_CONSOLE",
        UpdateConsole = 21 => "UPDATE_CONSOLE",
        ScriptDone = 22 => "SCRIPT_DONE",
        ScriptPause = 23 => "SCRIPT_PAUSE",
        ScriptAbort = 24 => "SCRIPT_ABORT",
        ScriptWakeup = 25 => "SCRIPT_WAKEUP",
        VideoFormat = 26 => "VIDEO_FORMAT",
        Overclocking = 27 => "OVERCLOCKING",
        BreakpointUpdated = 28 => "BREAKPOINT_UPDATED",
        BreakpointReached = 29 => "BREAKPOINT_REACHED",
        WatchpointUpdated = 30 => "WATCHPOINT_UPDATED",
        WatchpointReached = 31 => "WATCHPOINT_REACHED",
        CatchpointUpdated = 32 => "CATCHPOINT_UPDATED",
        CatchpointReached = 33 => "CATCHPOINT_REACHED",
        SwtrapReached = 34 => "SWTRAP_REACHED",
        CpuHalt = 35 => "CPU_HALT",
        CopperbpReached = 36 => "COPPERBP_REACHED",
        CopperbpUpdated = 37 => "COPPERBP_UPDATED",
        CopperwpReached = 38 => "COPPERWP_REACHED",
        CopperwpUpdated = 39 => "COPPERWP_UPDATED",
        Viewport = 40 => "VIEWPORT",
        MemLayout = 41 => "MEM_LAYOUT",
        DriveConnect = 42 => "DRIVE_CONNECT",
        DriveDisconnect = 43 => "DRIVE_DISCONNECT",
        DriveSelect = 44 => "DRIVE_SELECT",
        DriveRead = 45 => "DRIVE_READ",
        DriveWrite = 46 => "DRIVE_WRITE",
        DriveLedOn = 47 => "DRIVE_LED_ON",
        DriveLedOff = 48 => "DRIVE_LED_OFF",
        DriveMotorOn = 49 => "DRIVE_MOTOR_ON",
        DriveMotorOff = 50 => "DRIVE_MOTOR_OFF",
        DriveStep = 51 => "DRIVE_STEP",
        DrivePoll = 52 => "DRIVE_POLL",
        DiskInsert = 53 => "DISK_INSERT",
        DiskEject = 54 => "DISK_EJECT",
        DiskSaved = 55 => "DISK_SAVED",
        DiskUnsaved = 56 => "DISK_UNSAVED",
        DiskProtect = 57 => "DISK_PROTECT",
        DiskUnprotect = 58 => "DISK_UNPROTECT",
        HdcConnect = 59 => "HDC_CONNECT",
        HdcDisconnect = 60 => "HDC_DISCONNECT",
        HdcState = 61 => "HDC_STATE",
        HdrStep = 62 => "HDR_STEP",
        HdrRead = 63 => "HDR_READ",
        HdrWrite = 64 => "HDR_WRITE",
        HdrIdle = 65 => "HDR_IDLE",
        CtrlAmigaAmiga = 66 => "CTRL_AMIGA_AMIGA",
        Shaking = 67 => "SHAKING",
        SerIn = 68 => "SER_IN",
        SerOut = 69 => "SER_OUT",
        AutoSnapshotTaken = 70 => "AUTO_SNAPSHOT_TAKEN",
        UserSnapshotTaken = 71 => "USER_SNAPSHOT_TAKEN",
        SnapshotRestored = 72 => "SNAPSHOT_RESTORED",
        RecordingStarted = 73 => "RECORDING_STARTED",
        RecordingStopped = 74 => "RECORDING_STOPPED",
        RecordingAborted = 75 => "RECORDING_ABORTED",
        DmaDebugOn = 76 => "DMA_DEBUG_ON",
        DmaDebugOff = 77 => "DMA_DEBUG_OFF",
        SrvState = 78 => "SRV_STATE",
        SrvReceive = 79 => "SRV_RECEIVE",
        SrvSend = 80 => "SRV_SEND",
    }
}

/// A discrete notification emitted by the engine
///
/// The payload is a fixed five-scalar record (tag plus four integers) so that
/// nothing with a lifetime or an owner crosses the thread boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageEvent {
    /// Raw message tag (see [`MsgType`])
    pub id: i64,
    pub data1: i32,
    pub data2: i32,
    pub data3: i32,
    pub data4: i32,
}

impl MessageEvent {
    /// Create an event with a known tag
    pub fn new(kind: MsgType, data1: i32, data2: i32, data3: i32, data4: i32) -> Self {
        Self::from_raw(kind.raw(), data1, data2, data3, data4)
    }

    /// Create an event with a single payload value
    pub fn with_value(kind: MsgType, data1: i32) -> Self {
        Self::new(kind, data1, 0, 0, 0)
    }

    /// Create an event from the raw five-scalar payload
    pub fn from_raw(id: i64, data1: i32, data2: i32, data3: i32, data4: i32) -> Self {
        Self { id, data1, data2, data3, data4 }
    }

    /// Create a `Config` event for option `option` set to `value`
    ///
    /// The 64-bit value is split: low word in `data2`, high word in `data3`.
    pub fn config(option: i32, value: i64) -> Self {
        Self::new(MsgType::Config, option, value as i32, (value >> 32) as i32, 0)
    }

    /// The option value carried by a `Config` event
    pub fn config_value(&self) -> i64 {
        ((self.data3 as i64) << 32) | (self.data2 as u32 as i64)
    }

    /// Resolve the tag, if it is a known message type
    pub fn kind(&self) -> Option<MsgType> {
        MsgType::from_raw(self.id)
    }

    /// Payload as an array
    pub fn data(&self) -> [i32; 4] {
        [self.data1, self.data2, self.data3, self.data4]
    }
}

impl std::fmt::Display for MessageEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{}", kind)?,
            None => write!(f, "MSG_#{}", self.id)?,
        }
        write!(
            f,
            ": {:x} {:x} {:x} {:x}",
            self.data1, self.data2, self.data3, self.data4
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_value_is_not_truncated() {
        for value in [0, 1, -1, 0xFF_FFFF, u32::MAX as i64, i64::MIN, i64::MAX] {
            let event = MessageEvent::config(7, value);
            assert_eq!(event.kind(), Some(MsgType::Config));
            assert_eq!(event.data1, 7);
            assert_eq!(event.config_value(), value);
        }
        assert_eq!(MessageEvent::config(0, 42).data(), [0, 42, 0, 0]);
    }

    #[test]
    fn test_message_table() {
        assert_eq!(MsgType::ALL.len(), 81);
        assert_eq!(MsgType::from_raw(53), Some(MsgType::DiskInsert));
        assert_eq!(MsgType::DiskInsert.constant_name(), "MSG_DISK_INSERT");
    }

    #[test]
    fn test_event_kind() {
        let ev = MessageEvent::with_value(MsgType::DriveConnect, 1);
        assert_eq!(ev.kind(), Some(MsgType::DriveConnect));
        assert_eq!(ev.data(), [1, 0, 0, 0]);

        let unknown = MessageEvent::from_raw(4242, 0, 0, 0, 0);
        assert_eq!(unknown.kind(), None);
        assert_eq!(format!("{}", unknown), "MSG_#4242: 0 0 0 0");
    }
}
