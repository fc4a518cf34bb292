use std::process::Command;

/// Returns `true` if Mininet-WiFi tests can run here: `mn` on the path and
/// passwordless `sudo`.
pub fn check_privileges() -> bool {
    let has_mn = Command::new("mn")
        .arg("--version")
        .output()
        .is_ok_and(|o| o.status.success());

    has_mn
        && Command::new("sudo")
            .args(["-n", "true"])
            .output()
            .is_ok_and(|o| o.status.success())
}
