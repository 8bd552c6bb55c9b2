// src/crtsh/types.rs
use serde::Deserialize;

/// One certificate record from crt.sh's JSON output.
///
/// Only `name_value` feeds the candidate pool; the rest appears in debug logs.
#[derive(Debug, Clone, Deserialize)]
pub struct CrtShEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub common_name: Option<String>,
    /// Subject names, newline separated, possibly with wildcards
    #[serde(default)]
    pub name_value: Option<String>,
    #[serde(default)]
    pub issuer_name: Option<String>,
}
