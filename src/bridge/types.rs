//! Bridge module type definitions

/// Captured result of a finished bridge command
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BridgeOutput {
    /// Exit code (None when killed by a signal)
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl BridgeOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Exit status for messages ("exit 1", "signal")
    pub fn status_label(&self) -> String {
        match self.status {
            Some(code) => format!("exit {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// One line of `adb devices` output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachedDevice {
    pub serial: String,
    /// adb state: "device", "unauthorized", "offline", ...
    pub state: String,
}

impl AttachedDevice {
    /// The endpoint is attached and accepting commands
    pub fn is_ready(&self) -> bool {
        self.state == "device"
    }
}
