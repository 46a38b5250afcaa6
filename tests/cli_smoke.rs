use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn tasktogo_help_works() {
    Command::cargo_bin("tasktogo")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("task management"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = [
        "task",
        "category",
        "priority",
        "stats",
        "export",
        "import",
        "backup",
        "reset",
        "theme",
    ];

    for cmd in subcommands {
        Command::cargo_bin("tasktogo")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("tasktogo")
        .expect("binary")
        .arg("bogus")
        .assert()
        .failure();
}
