use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_confirms_deterministic_booking() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args([
        "--phone",
        "254712345678",
        "--guests",
        "2",
        "--rate",
        "27000",
        "--payment",
        "deterministic",
        "--fast",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Booking confirmed"))
        .stdout(predicate::str::contains("54000"))
        .stdout(predicate::str::is_match("ML[A-Z0-9]{8}")?);

    Ok(())
}

#[test]
fn test_cli_rejects_phone_without_country_code() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args([
        "--phone",
        "0712345678",
        "--rate",
        "27000",
        "--payment",
        "deterministic",
        "--fast",
    ]);

    cmd.assert().success().stdout(predicate::str::contains(
        "Please enter a valid Kenyan phone number starting with 254",
    ));

    Ok(())
}

#[test]
fn test_cli_lenient_validation_accepts_any_phone() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.args([
        "--phone",
        "0712345678",
        "--rate",
        "27000",
        "--payment",
        "deterministic",
        "--validation",
        "lenient",
        "--fast",
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Booking confirmed"));

    Ok(())
}
