//! Warm-up chains issued before PTZ commands
//!
//! Some devices silently drop the first PTZ command after being idle. A
//! wakeup chain sends a few harmless queries first; see
//! [`OnvifClient::send`](crate::OnvifClient::send).

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WakeupMode {
    #[default]
    None,
    /// `GetNodes`
    Short,
    /// `GetServiceCapabilities`, `GetNodes`, `GetConfigurations`
    Full,
}

impl WakeupMode {
    /// PTZ actions issued in order, each followed by the settle delay
    pub fn steps(&self) -> &'static [&'static str] {
        match self {
            WakeupMode::None => &[],
            WakeupMode::Short => &["GetNodes"],
            WakeupMode::Full => &["GetServiceCapabilities", "GetNodes", "GetConfigurations"],
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, WakeupMode::None)
    }
}

impl FromStr for WakeupMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(WakeupMode::None),
            "short" => Ok(WakeupMode::Short),
            "full" => Ok(WakeupMode::Full),
            other => Err(ApiError::Configuration(format!(
                "unknown wakeup mode '{}' (expected none, short or full)",
                other
            ))),
        }
    }
}

impl fmt::Display for WakeupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WakeupMode::None => "none",
            WakeupMode::Short => "short",
            WakeupMode::Full => "full",
        })
    }
}
