#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::io;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const ENV_VARS: [&str; 4] = [
    "SONGPLAYS_INPUT",
    "SONGPLAYS_OUTPUT",
    "SONGPLAYS_TIMEZONE",
    "SONGPLAYS_LOG",
];

fn cli_bin() -> &'static str {
    env!("CARGO_BIN_EXE_songplays")
}

fn cli() -> Command {
    let mut cmd = Command::new(cli_bin());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn run_cli(args: &[&str]) -> io::Result<Output> {
    cli().args(args).output()
}

fn assert_cli_success(output: &Output) {
    assert!(
        output.status.success(),
        "stdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write(path: &Path, content: &str) -> TestResult {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn write_input(root: &Path) -> TestResult {
    write(
        &root.join("song_data/A/A/A/TRAAAAW128F429D538.json"),
        r#"{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null, "artist_longitude": null, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 0}"#,
    )?;
    write(
        &root.join("log_data/2018/11/2018-11-14-events.json"),
        concat!(
            r#"{"artist": "Casual", "auth": "Logged In", "firstName": "Ryan", "gender": "M", "itemInSession": 0, "lastName": "Smith", "length": 218.93179, "level": "free", "location": "San Jose-Sunnyvale-Santa Clara, CA", "method": "PUT", "page": "NextSong", "registration": 1.541016707796E12, "sessionId": 583, "song": "I Didn't Mean To", "status": 200, "ts": 1542242481796, "userAgent": "Mozilla/5.0", "userId": "26"}"#,
            "\n",
            r#"{"artist": null, "auth": "Logged In", "firstName": "Wyatt", "gender": "M", "itemInSession": 1, "lastName": "Scott", "length": null, "level": "free", "location": "Eureka-Arcata-Fortuna, CA", "method": "GET", "page": "Home", "registration": 1.540872073796E12, "sessionId": 563, "song": null, "status": 200, "ts": 1542247071796, "userAgent": "Mozilla/5.0", "userId": "9"}"#,
        ),
    )?;
    Ok(())
}

#[test]
fn run_writes_every_table_and_prints_summary() -> TestResult {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    write_input(input.path())?;

    let out = run_cli(&[
        "run",
        "--input",
        input.path().to_str().unwrap(),
        "--output",
        output.path().to_str().unwrap(),
    ])?;
    assert_cli_success(&out);

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("song catalog stage finished"));
    assert!(stdout.contains("activity log stage finished"));
    assert!(stdout.contains("songplays"));

    for dir in [
        "song-table-data/songs.parquet",
        "artist-table-data/artists.parquet",
        "user-table-data/users.parquet",
        "time-table-data/time.parquet",
        "songplays-table-data/songplays.parquet",
    ] {
        assert!(output.path().join(dir).is_dir(), "{dir}");
    }
    assert!(
        output
            .path()
            .join("songplays-table-data/songplays.parquet/year=2018/month=11")
            .is_dir()
    );
    Ok(())
}

#[test]
fn songs_command_only_writes_catalog_tables() -> TestResult {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    write_input(input.path())?;

    let out = cli()
        .args(["songs"])
        .env("SONGPLAYS_INPUT", input.path())
        .env("SONGPLAYS_OUTPUT", output.path())
        .output()?;
    assert_cli_success(&out);

    assert!(output.path().join("song-table-data/songs.parquet").is_dir());
    assert!(!output.path().join("user-table-data").exists());
    Ok(())
}

#[test]
fn logs_command_reads_settings_from_config_file() -> TestResult {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    write_input(input.path())?;

    let config = input.path().join("songplays.toml");
    write(
        &config,
        &format!(
            "input = {:?}\noutput = {:?}\ntimezone = \"UTC\"\nshow = 5\n",
            input.path().display().to_string(),
            output.path().display().to_string()
        ),
    )?;

    let out = run_cli(&["logs", "--config", config.to_str().unwrap()])?;
    assert_cli_success(&out);

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("songplay_id"));
    // 2018-11-15 00:41 UTC
    assert!(
        output
            .path()
            .join("time-table-data/time.parquet/year=2018/month=11")
            .is_dir()
    );
    Ok(())
}

#[test]
fn missing_output_fails_with_hint() -> TestResult {
    let input = TempDir::new()?;

    let out = run_cli(&["run", "--input", input.path().to_str().unwrap()])?;
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("No output root given"), "{stderr}");
    assert!(stderr.contains("SONGPLAYS_OUTPUT"), "{stderr}");
    Ok(())
}

#[test]
fn invalid_timezone_is_rejected() -> TestResult {
    let input = TempDir::new()?;
    let output = TempDir::new()?;

    let out = run_cli(&[
        "logs",
        "--input",
        input.path().to_str().unwrap(),
        "--output",
        output.path().to_str().unwrap(),
        "--timezone",
        "Mars/Olympus_Mons",
    ])?;
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Mars/Olympus_Mons"));
    Ok(())
}

#[test]
fn songs_command_ignores_timezone_setting() -> TestResult {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    write_input(input.path())?;

    let config = input.path().join("songplays.toml");
    write(&config, "timezone = \"Mars/Olympus_Mons\"\n")?;

    let out = cli()
        .args(["songs", "--config", config.to_str().unwrap()])
        .env("SONGPLAYS_INPUT", input.path())
        .env("SONGPLAYS_OUTPUT", output.path())
        .env("SONGPLAYS_TIMEZONE", "Mars/Olympus_Mons")
        .output()?;
    assert_cli_success(&out);
    assert!(output.path().join("song-table-data/songs.parquet").is_dir());
    Ok(())
}

#[test]
fn malformed_record_exits_with_error() -> TestResult {
    let input = TempDir::new()?;
    let output = TempDir::new()?;
    write(
        &input.path().join("song_data/A/A/A/TRBROKEN.json"),
        "{\"song_id\": ",
    )?;

    let out = run_cli(&[
        "songs",
        "--input",
        input.path().to_str().unwrap(),
        "--output",
        output.path().to_str().unwrap(),
    ])?;
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to load song_data records"));
    Ok(())
}
