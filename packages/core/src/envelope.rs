//! The command envelope: the deterministic wire shape every workspace-engine command
//! returns, carrying epistemic confidence alongside the result.

use crate::gap::Gap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Ok,
    Degraded,
    Error,
}

impl CommandStatus {
    /// Sweep rollups are monotonic: any degraded observation degrades the whole sweep.
    pub fn combine(self, other: CommandStatus) -> CommandStatus {
        use CommandStatus::*;
        match (self, other) {
            (Error, _) | (_, Error) => Error,
            (Degraded, _) | (_, Degraded) => Degraded,
            (Ok, Ok) => Ok,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Unknown,
    Low,
    Partial,
    High,
    Exact,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epistemic {
    pub confidence: Option<Confidence>,
    pub unknown_reason: Option<String>,
    pub gaps: Vec<Gap>,
}

impl Epistemic {
    pub fn exact() -> Self {
        Epistemic {
            confidence: Some(Confidence::Exact),
            unknown_reason: None,
            gaps: vec![],
        }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Epistemic {
            confidence: Some(Confidence::Unknown),
            unknown_reason: Some(reason.into()),
            gaps: vec![],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheTier {
    Memory,
    Disk,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheInfo {
    pub hit: bool,
    pub tier: CacheTier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandMeta {
    pub command_id: u64,
    pub memory: Option<u64>,
    pub cache: CacheInfo,
}

/// Field declaration order is the serialized key order (`serde_json` emits struct
/// fields in source order regardless of the `preserve_order` feature, which only
/// applies to untyped `Value` maps), so this type's `Serialize` output is already
/// deterministic without any extra sorting pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEnvelope<T> {
    pub schema_version: u32,
    pub status: CommandStatus,
    pub result: Option<T>,
    pub epistemic: Epistemic,
    pub meta: CommandMeta,
}

impl<T> CommandEnvelope<T> {
    pub fn ok(result: T, epistemic: Epistemic, meta: CommandMeta) -> Self {
        CommandEnvelope {
            schema_version: crate::version::SCHEMA_VERSION,
            status: CommandStatus::Ok,
            result: Some(result),
            epistemic,
            meta,
        }
    }

    pub fn error(epistemic: Epistemic, meta: CommandMeta) -> Self {
        CommandEnvelope {
            schema_version: crate::version::SCHEMA_VERSION,
            status: CommandStatus::Error,
            result: None,
            epistemic,
            meta,
        }
    }
}
