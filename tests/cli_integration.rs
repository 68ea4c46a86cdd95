use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};

use utxo_gateway::wallet::SkyAddress;

const SEED_HEX: &str = "736b79636f696e2d65786368616e6765";

fn run(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let binary_path = assert_cmd::cargo::cargo_bin!("utxo-gateway");
    let mut cmd = Command::new(binary_path);
    cmd.args(args).env_remove("UTXO_GATEWAY_HIDE_SECKEY");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("cli runs")
}

fn run_json(args: &[&str], envs: &[(&str, &str)]) -> Value {
    let output = run(args, envs);
    assert!(output.status.success(), "cli exited unsuccessfully: {:?}", output);
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf8");
    serde_json::from_str(&stdout).expect("stdout is valid json")
}

fn temp_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("utxo-gateway-{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, content).expect("write temp config");
    path
}

#[test]
fn addresses_are_deterministic() {
    let args = ["addresses", "skycoin", "--seed", SEED_HEX, "--count", "2"];
    let first = run_json(&args, &[]);
    let second = run_json(&args, &[]);

    assert_eq!(first["success"], true);
    assert_eq!(first, second);

    let entries = first["data"]["entries"].as_array().expect("entries array");
    assert_eq!(entries.len(), 2);
    for entry in entries {
        let address = entry["address"].as_str().expect("address string");
        SkyAddress::decode(address).expect("valid skycoin address");
        assert_eq!(entry["secret"].as_str().map(str::len), Some(64));
    }
    assert_eq!(first["data"]["seed_digest"].as_str().map(str::len), Some(64));
}

#[test]
fn hide_seckey_env_strips_secrets() {
    let value = run_json(
        &["addresses", "sky", "--seed", SEED_HEX, "--count", "3"],
        &[("UTXO_GATEWAY_HIDE_SECKEY", "1")],
    );
    let entries = value["data"]["entries"].as_array().expect("entries array");
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.get("secret").is_none()));
}

#[test]
fn random_seed_when_omitted() {
    let first = run_json(&["addresses", "skycoin"], &[]);
    let second = run_json(&["addresses", "skycoin"], &[]);
    assert_eq!(first["data"]["entries"].as_array().map(Vec::len), Some(1));
    assert_ne!(first["data"]["seed_digest"], second["data"]["seed_digest"]);
}

#[test]
fn oversized_batch_is_wrong_request() {
    let value = run_json(&["addresses", "skycoin", "--seed", SEED_HEX, "--count", "1001"], &[]);
    assert_eq!(value["success"], false);
    assert_eq!(value["error"]["code"], "wrong_request");
}

#[test]
fn disabled_coin_is_reported() {
    let value = run_json(&["addresses", "bitcoin", "--seed", SEED_HEX], &[]);
    assert_eq!(value["success"], false);
    assert_eq!(value["error"]["kind"], "unsupported_coin");
}

#[test]
fn bitcoin_enabled_by_config() {
    let path = temp_config("btc", "[bitcoin]\nnetwork = \"testnet\"\n");
    let value = run_json(
        &["--config", path.to_str().expect("utf8 path"), "addresses", "btc", "--seed", SEED_HEX],
        &[],
    );
    let _ = std::fs::remove_file(&path);

    let address = value["data"]["entries"][0]["address"].as_str().expect("address");
    assert!(address.starts_with('m') || address.starts_with('n'));
}

#[test]
fn validate_config_defaults() {
    let output = run(&["validate-config"], &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("stdout is utf8");
    assert!(stdout.contains("Configuration is valid."));
    assert!(stdout.contains("127.0.0.1:6420"));
}

#[test]
fn validate_config_rejects_bad_file() {
    let path = temp_config("bad", "[skycoin]\nnode_addr = \"http://127.0.0.1:6420/api\"\n");
    let output = run(&["--config", path.to_str().expect("utf8 path"), "validate-config"], &[]);
    let _ = std::fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).expect("stderr is utf8");
    assert!(stderr.contains("Configuration validation failed"));
}

#[test]
fn unknown_coin_is_a_usage_error() {
    let output = run(&["addresses", "dogecoin"], &[]);
    assert!(!output.status.success());
}
