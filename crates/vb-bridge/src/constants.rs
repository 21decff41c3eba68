//! Host-visible constant table

use serde_json::{Map, Value};
use vb_core::{
    AgnusRevision, BankMap, CiaRevision, CpuRevision, DeniseRevision, DriveMechanics, ErrorCode,
    FloppyDriveType, MsgType, Opt, Palette, RamInitPattern, RtcRevision, SerialPortDevice,
    UnmappedMemory, VideoFormat,
};

macro_rules! tables {
    ($($name:literal => $ty:ty),+ $(,)?) => {
        fn families() -> Vec<(&'static str, Vec<(String, i64)>)> {
            vec![
                $((
                    $name,
                    <$ty>::ALL.iter().map(|v| (v.constant_name(), v.raw())).collect(),
                ),)+
            ]
        }
    };
}

tables! {
    "Opt" => Opt,
    "MsgType" => MsgType,
    "ErrorCode" => ErrorCode,
    "AgnusRevision" => AgnusRevision,
    "BankMap" => BankMap,
    "CiaRevision" => CiaRevision,
    "CpuRevision" => CpuRevision,
    "DeniseRevision" => DeniseRevision,
    "DriveMechanics" => DriveMechanics,
    "FloppyDriveType" => FloppyDriveType,
    "Palette" => Palette,
    "RamInitPattern" => RamInitPattern,
    "RtcRevision" => RtcRevision,
    "SerialPortDevice" => SerialPortDevice,
    "UnmappedMemory" => UnmappedMemory,
    "VideoFormat" => VideoFormat,
}

/// Every host-visible constant as `(name, value)`, grouped by family
pub fn constant_table() -> Vec<(String, i64)> {
    families()
        .into_iter()
        .flat_map(|(_, entries)| entries)
        .collect()
}

/// The constant table as a JSON object keyed by family
pub fn constants_json() -> Value {
    let mut root = Map::new();
    for (family, entries) in families() {
        let table: Map<String, Value> = entries
            .into_iter()
            .map(|(name, value)| (name, Value::from(value)))
            .collect();
        root.insert(family.to_string(), Value::Object(table));
    }
    Value::Object(root)
}

/// Key of a raw error code (e.g. `ROM_MISSING`)
pub fn error_code_key(code: i64) -> Option<&'static str> {
    ErrorCode::from_raw(code).map(ErrorCode::key)
}

/// Key of a raw message tag (e.g. `DISK_INSERT`)
pub fn msg_type_key(id: i64) -> Option<&'static str> {
    MsgType::from_raw(id).map(MsgType::key)
}
