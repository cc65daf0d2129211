use std::{
    fs,
    io::Write,
    path::PathBuf,
    process::{Command, Output, Stdio},
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str], script: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_beatback"))
        .args(args)
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to launch beatback binary");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(script.as_bytes())
        .expect("failed to send script");
    child.wait_with_output().expect("beatback did not finish")
}

#[test]
fn enemy_wins_when_player_ends_turn() {
    let map = fixture("last_stand.map");
    let output = run(
        &["--map", map.to_str().expect("utf-8 path"), "--rows", "1", "--columns", "3"],
        "end\n",
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Welcome to Beatback.\n"));
    assert!(stdout.contains(" 0|  S| /\\|  h|"));
    assert!(stdout.trim_end().ends_with("You lose!"));
}

#[test]
fn default_field_is_eight_by_eight() {
    let map = fixture("skirmish.map");
    let output = run(&["--map", map.to_str().expect("utf-8 path")], "");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("    0   1   2   3   4   5   6   7 \n"));
    assert!(stdout.contains(" 7|   |   |   |   |   |   |   |   |"));
    assert!(stdout.contains(" 5|   |   |   |   |   |  b|   |   |"));
}

#[test]
fn transcript_can_be_written_to_file() {
    let map = fixture("skirmish.map");
    let transcript = std::env::temp_dir().join(format!("beatback-{}.txt", std::process::id()));
    let output = run(
        &[
            "--map",
            map.to_str().expect("utf-8 path"),
            "--output",
            transcript.to_str().expect("utf-8 path"),
        ],
        "0 0\n3\n",
    );

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let written = fs::read_to_string(&transcript).expect("transcript written");
    fs::remove_file(&transcript).expect("transcript removed");
    assert!(written.contains("1. Move 2. Attack 3. Skip"));
}

#[test]
fn missing_map_fails_with_context() {
    let output = run(&["--map", "/nonexistent/beatback.map"], "");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load battle map"));
}

#[test]
fn out_of_bounds_map_entry_is_reported() {
    let map = fixture("last_stand.map");
    let output = run(
        &["--map", map.to_str().expect("utf-8 path"), "--rows", "1", "--columns", "1"],
        "",
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("lies outside the 1x1 battlefield"));
}
