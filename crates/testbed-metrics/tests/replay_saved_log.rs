//! Runs the `cwnd-monitor` binary against a saved kernel log.

use std::process::Command;

use tempfile::TempDir;
use testbed_metrics::CWND_SERIES_FILE;

const SAVED_LOG: &str = "\
[ 4210.118000] IPv6: ADDRCONF(NETDEV_CHANGE): h1-wlan0: link becomes ready
[ 4211.000000] 1\t14480\t2891
[ 4211.250000] 6\t21000\t2891
[ 4211.500000] 11\t739\t739
[ 4211.500000] 1\t28960\t2891
[ 4213.125000] 1\t43440\t2891
";

#[test]
fn replays_saved_log_into_series_file() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("dmesg.log");
    std::fs::write(&log, SAVED_LOG).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_cwnd-monitor"))
        .arg("--input")
        .arg(&log)
        .arg(dir.path())
        .env("RUST_LOG", "warn")
        .status()
        .unwrap();
    assert!(status.success());

    let series = std::fs::read_to_string(dir.path().join(CWND_SERIES_FILE)).unwrap();
    assert_eq!(series, "0.000000\t14480\n0.500000\t28960\n2.125000\t43440\n");
}

#[test]
fn missing_output_directory_fails() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("dmesg.log");
    std::fs::write(&log, SAVED_LOG).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_cwnd-monitor"))
        .arg("--input")
        .arg(&log)
        .arg(dir.path().join("absent"))
        .status()
        .unwrap();
    assert!(!status.success());
}
