// Launch Descriptors
//
// *Le Lancement* (The Launch) - How a catalog entry is opened by the host launcher

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Control panel host executable used for canonical names and applets
pub const CONTROL_PANEL_EXE: &str = "control.exe";

/// Wire-level launch kind, as spelled in catalog documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaunchKind {
    /// `ms-settings:` page URI
    MsSettings,

    /// `control.exe /name <canonical>`
    ControlPanelCanonical,

    /// `control.exe <applet>.cpl`
    ControlPanelCpl,

    /// Management console snap-in (`*.msc`)
    Msc,

    /// Any other executable or shell target
    Exe,
}

/// Typed launch target for a catalog entry
///
/// Each variant carries the payload its launcher needs, so the external
/// launcher matches exhaustively instead of switching on a string kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target")]
pub enum LaunchTarget {
    /// Settings page URI, e.g. `ms-settings:display`
    SettingsUri(String),

    /// Control panel canonical name, e.g. `Microsoft.PowerOptions`
    ControlPanelCanonical(String),

    /// Control panel applet file, e.g. `mmsys.cpl`
    ControlPanelApplet(String),

    /// Management console snap-in, e.g. `devmgmt.msc`
    SnapIn(String),

    /// Executable path or shell target
    Executable(PathBuf),
}

/// Process invocation rendered for a launch target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program or shell target to open
    pub program: String,

    /// Arguments passed to the program
    pub args: Vec<String>,

    /// Whether the shell should resolve the program (URI handlers, documents)
    pub shell_execute: bool,
}

impl LaunchTarget {
    /// Build a launch target from its wire kind and raw target string
    pub fn from_parts(kind: LaunchKind, target: impl Into<String>) -> Self {
        let target = target.into();
        match kind {
            LaunchKind::MsSettings => LaunchTarget::SettingsUri(target),
            LaunchKind::ControlPanelCanonical => LaunchTarget::ControlPanelCanonical(target),
            LaunchKind::ControlPanelCpl => LaunchTarget::ControlPanelApplet(target),
            LaunchKind::Msc => LaunchTarget::SnapIn(target),
            LaunchKind::Exe => LaunchTarget::Executable(PathBuf::from(target)),
        }
    }

    /// Wire kind of this target
    pub fn kind(&self) -> LaunchKind {
        match self {
            LaunchTarget::SettingsUri(_) => LaunchKind::MsSettings,
            LaunchTarget::ControlPanelCanonical(_) => LaunchKind::ControlPanelCanonical,
            LaunchTarget::ControlPanelApplet(_) => LaunchKind::ControlPanelCpl,
            LaunchTarget::SnapIn(_) => LaunchKind::Msc,
            LaunchTarget::Executable(_) => LaunchKind::Exe,
        }
    }

    /// Raw target string
    pub fn target(&self) -> String {
        match self {
            LaunchTarget::SettingsUri(uri) => uri.clone(),
            LaunchTarget::ControlPanelCanonical(name) => name.clone(),
            LaunchTarget::ControlPanelApplet(applet) => applet.clone(),
            LaunchTarget::SnapIn(snapin) => snapin.clone(),
            LaunchTarget::Executable(path) => path.to_string_lossy().into_owned(),
        }
    }

    /// Target key used to detect the same destination from two sources
    pub fn dedup_key(&self) -> String {
        self.target().trim().to_lowercase()
    }

    /// Render the invocation the host launcher performs for this target
    pub fn command_line(&self) -> CommandLine {
        match self {
            LaunchTarget::ControlPanelCanonical(name) => CommandLine {
                program: CONTROL_PANEL_EXE.to_string(),
                args: vec!["/name".to_string(), name.clone()],
                shell_execute: true,
            },
            LaunchTarget::ControlPanelApplet(applet) => CommandLine {
                program: CONTROL_PANEL_EXE.to_string(),
                args: vec![applet.clone()],
                shell_execute: true,
            },
            LaunchTarget::SettingsUri(_)
            | LaunchTarget::SnapIn(_)
            | LaunchTarget::Executable(_) => CommandLine {
                program: self.target(),
                args: Vec::new(),
                shell_execute: true,
            },
        }
    }
}

impl Default for LaunchTarget {
    fn default() -> Self {
        LaunchTarget::SettingsUri(String::new())
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(LaunchKind::MsSettings, "ms-settings:display")]
    #[case(LaunchKind::ControlPanelCanonical, "Microsoft.PowerOptions")]
    #[case(LaunchKind::ControlPanelCpl, "mmsys.cpl")]
    #[case(LaunchKind::Msc, "devmgmt.msc")]
    #[case(LaunchKind::Exe, "regedit.exe")]
    fn test_kind_survives_from_parts(#[case] kind: LaunchKind, #[case] target: &str) {
        let launch = LaunchTarget::from_parts(kind, target);
        assert_eq!(launch.kind(), kind);
        assert_eq!(launch.target(), target);
    }

    #[test]
    fn test_canonical_name_goes_through_control_panel() {
        let launch = LaunchTarget::ControlPanelCanonical("Microsoft.PowerOptions".to_string());
        let cmd = launch.command_line();
        assert_eq!(cmd.program, CONTROL_PANEL_EXE);
        assert_eq!(cmd.args, vec!["/name", "Microsoft.PowerOptions"]);
        assert_eq!(cmd.to_string(), "control.exe /name Microsoft.PowerOptions");
    }

    #[test]
    fn test_settings_uri_is_shell_opened() {
        let launch = LaunchTarget::SettingsUri("ms-settings:display".to_string());
        let cmd = launch.command_line();
        assert_eq!(cmd.program, "ms-settings:display");
        assert!(cmd.args.is_empty());
        assert!(cmd.shell_execute);
    }

    #[test]
    fn test_dedup_key_ignores_case_and_padding() {
        let a = LaunchTarget::SettingsUri(" ms-settings:Display ".to_string());
        let b = LaunchTarget::SettingsUri("MS-SETTINGS:display".to_string());
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_serde_shape_is_tagged() {
        let launch = LaunchTarget::SnapIn("devmgmt.msc".to_string());
        let json = serde_json::to_value(&launch).unwrap();
        assert_eq!(json["kind"], "SnapIn");
        assert_eq!(json["target"], "devmgmt.msc");

        let back: LaunchTarget = serde_json::from_value(json).unwrap();
        assert_eq!(back, launch);
    }
}
