// Drives the compiled binary through a pseudo terminal so the real event
// loop and crossterm input handling are exercised end to end.
//
// Needs a TTY, so it is Unix-only and ignored by default:
// `cargo test --test integration_min_session -- --ignored`

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("wordrush");
    let cmd = format!("{} --seed 7 -d 30", bin.display());

    let mut p = spawn(cmd)?;

    std::thread::sleep(Duration::from_millis(200));

    // A few keystrokes start the countdown
    p.send("the ")?;

    std::thread::sleep(Duration::from_millis(200));

    p.send("\x1b")?; // ESC

    p.expect(Eof)?;
    Ok(())
}
