use assert_cmd::Command;

fn contains(output: &[u8], needle: &str) -> bool {
    String::from_utf8_lossy(output).contains(needle)
}

fn page_cmd() -> Command {
    let mut cmd = Command::cargo_bin("burn-the-boats").unwrap();
    for var in ["CONFIG_PATH", "BRIDGE_RPC_URL", "ALCHEMY_API_KEY", "WALLET_PRIVATE_KEY", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn help_lists_flags() {
    let output = page_cmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    for flag in ["--config", "--rpc-url", "--demo", "--log"] {
        assert!(contains(&output.stdout, flag), "missing {}", flag);
    }
}

#[test]
fn demo_page_renders_and_quits() {
    let output = page_cmd()
        .args(["--demo", "--log", "warn"])
        .write_stdin(":connect\n:help\n:quit\n")
        .timeout(std::time::Duration::from_secs(20))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(contains(&output.stdout, "Burn the Boats"));
    assert!(contains(&output.stdout, "[ Connect Wallet ]"));
    assert!(contains(&output.stdout, "YOU CANT BRIDGE BACK"));
}

#[test]
fn bad_config_file_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[network]\nchain_id = \"mainnet\"").unwrap();
    let output = page_cmd().arg("--demo").arg("--config").arg(&path).output().unwrap();
    assert!(!output.status.success());
    assert!(contains(&output.stderr, "Configuration error"));
}
