use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const BIN_NAME: &str = "chorebook";

fn chorebook(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("CHOREBOOK_DATA_DIR", data_dir.path());
    cmd.env_remove("CHOREBOOK_MEMBER");
    cmd.env_remove("CHOREBOOK_LOG");
    cmd
}

/// Register alice as admin, have bob join and approve him
fn household_with_two_members(data_dir: &TempDir) {
    let output = chorebook(data_dir)
        .args([
            "household",
            "register",
            "-n",
            "Alice",
            "-e",
            "alice@example.com",
            "-H",
            "Flat 4",
        ])
        .output()
        .expect("register runs");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8 output");
    let code = stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("Invitation code:"))
        .map(|code| code.trim().to_string())
        .expect("invitation code printed");

    chorebook(data_dir)
        .args(["household", "join", &code, "-n", "Bob", "-e", "bob@example.com"])
        .assert()
        .success()
        .stdout(contains("Join request sent"));

    chorebook(data_dir)
        .args(["--as", "alice@example.com", "household", "approve", "bob@example.com"])
        .assert()
        .success()
        .stdout(contains("Approved Bob"));
}

#[test]
fn cli_without_command_prints_overview() {
    let data_dir = TempDir::new().unwrap();
    chorebook(&data_dir)
        .assert()
        .success()
        .stdout(contains("chorebook --help"));
}

#[test]
fn cli_requires_an_acting_member() {
    let data_dir = TempDir::new().unwrap();
    chorebook(&data_dir)
        .args(["chore", "list"])
        .assert()
        .failure()
        .stderr(contains("acting member"));
}

#[test]
fn cli_pending_member_cannot_act() {
    let data_dir = TempDir::new().unwrap();
    let output = chorebook(&data_dir)
        .args(["household", "register", "-n", "Alice", "-e", "a@example.com", "-H", "Home"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let code = stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("Invitation code:"))
        .map(|code| code.trim().to_string())
        .unwrap();

    chorebook(&data_dir)
        .args(["household", "join", &code, "-n", "Carol", "-e", "c@example.com"])
        .assert()
        .success();

    chorebook(&data_dir)
        .args(["--as", "c@example.com", "chore", "list"])
        .assert()
        .failure()
        .stderr(contains("not been approved"));
}

#[test]
fn cli_expense_payment_flow() {
    let data_dir = TempDir::new().unwrap();
    household_with_two_members(&data_dir);

    chorebook(&data_dir)
        .args([
            "--as",
            "alice@example.com",
            "expense",
            "add",
            "Groceries",
            "90.00",
            "--split",
            "alice@example.com,bob@example.com",
        ])
        .assert()
        .success()
        .stdout(contains("Created expense").and(contains("pending")));

    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "expense", "pay", "Groceries", "40"])
        .assert()
        .success()
        .stdout(contains("Outstanding: $5.00"));

    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "expense", "pay", "Groceries", "10"])
        .assert()
        .failure()
        .stderr(contains("exceeds the remaining owed amount"));

    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "expense", "pay", "Groceries", "5"])
        .assert()
        .success()
        .stdout(contains("Expense is now settled."));

    chorebook(&data_dir)
        .args(["--as", "alice@example.com", "expense", "list", "--filter", "settled"])
        .assert()
        .success()
        .stdout(contains("Groceries"));

    chorebook(&data_dir)
        .args(["--as", "alice@example.com", "report", "balances"])
        .assert()
        .success()
        .stdout(contains("All expenses are settled."));
}

#[test]
fn cli_recurring_chore_flow() {
    let data_dir = TempDir::new().unwrap();
    household_with_two_members(&data_dir);

    chorebook(&data_dir)
        .args([
            "--as",
            "alice@example.com",
            "chore",
            "add",
            "Take out bins",
            "-a",
            "Bob",
            "-d",
            "2000-01-03",
            "-r",
            "weekly",
        ])
        .assert()
        .success()
        .stdout(contains("Created chore"));

    // The next invocation sweeps the past-due chore into the missed list
    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "chore", "missed"])
        .assert()
        .success()
        .stdout(contains("Take out bins"));

    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "chore", "done", "Take out bins"])
        .assert()
        .success()
        .stdout(contains("Completed: Take out bins").and(contains("2000-01-10")));

    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "chore", "list", "--mine"])
        .assert()
        .success()
        .stdout(contains("2000-01-10"));
}

#[test]
fn cli_only_admin_or_assignee_completes_chore() {
    let data_dir = TempDir::new().unwrap();
    household_with_two_members(&data_dir);

    chorebook(&data_dir)
        .args([
            "--as",
            "bob@example.com",
            "chore",
            "add",
            "Water plants",
            "-d",
            "2099-06-01",
        ])
        .assert()
        .success();

    chorebook(&data_dir)
        .args(["--as", "alice@example.com", "chore", "done", "Water plants"])
        .assert()
        .success()
        .stdout(contains("Completed: Water plants"));
}

#[test]
fn cli_json_export_verifies() {
    let data_dir = TempDir::new().unwrap();
    household_with_two_members(&data_dir);
    let snapshot = data_dir.path().join("snapshot.json");
    let snapshot_arg = snapshot.to_str().unwrap();

    chorebook(&data_dir)
        .args(["--as", "alice@example.com", "export", "json", snapshot_arg])
        .assert()
        .success()
        .stdout(contains("Household exported"));

    chorebook(&data_dir)
        .args(["export", "verify", snapshot_arg])
        .assert()
        .success()
        .stdout(contains("Snapshot is valid.").and(contains("Members:      2")));
}

#[test]
fn cli_expense_list_search_and_category() {
    let data_dir = TempDir::new().unwrap();
    household_with_two_members(&data_dir);

    for (title, category) in [("Electricity bill", "utilities"), ("Pizza night", "food")] {
        chorebook(&data_dir)
            .args([
                "--as",
                "alice@example.com",
                "expense",
                "add",
                title,
                "30",
                "--split",
                "alice@example.com,bob@example.com",
                "-c",
                category,
            ])
            .assert()
            .success();
    }

    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "expense", "list", "-q", "BILL"])
        .assert()
        .success()
        .stdout(contains("Electricity bill").and(contains("Pizza night").not()));

    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "expense", "list", "--category", "Food"])
        .assert()
        .success()
        .stdout(contains("Pizza night").and(contains("Electricity bill").not()));
}

#[test]
fn cli_alert_flow() {
    let data_dir = TempDir::new().unwrap();
    household_with_two_members(&data_dir);

    chorebook(&data_dir)
        .args([
            "--as",
            "bob@example.com",
            "alert",
            "report",
            "Boiler pressure low",
            "-d",
            "No hot water upstairs",
            "-p",
            "urgent",
        ])
        .assert()
        .success()
        .stdout(contains("Reported alert").and(contains("URGENT")));

    chorebook(&data_dir)
        .args(["--as", "alice@example.com", "alert", "resolve", "Boiler pressure low"])
        .assert()
        .success()
        .stdout(contains("is now resolved"));

    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "alert", "list", "--status", "resolved"])
        .assert()
        .success()
        .stdout(contains("Boiler pressure low"));

    chorebook(&data_dir)
        .args(["--as", "bob@example.com", "alert", "delete", "Boiler pressure low"])
        .assert()
        .failure()
        .stderr(contains("only the household admin can delete alerts"));

    chorebook(&data_dir)
        .args(["--as", "alice@example.com", "alert", "delete", "Boiler pressure low"])
        .assert()
        .success()
        .stdout(contains("Deleted alert"));
}

#[test]
fn cli_profile_update() {
    let data_dir = TempDir::new().unwrap();
    household_with_two_members(&data_dir);

    chorebook(&data_dir)
        .args([
            "--as",
            "bob@example.com",
            "household",
            "profile",
            "--name",
            "Robert",
            "--email",
            "robert@example.com",
        ])
        .assert()
        .success()
        .stdout(contains("Updated profile: Robert <robert@example.com>"));

    chorebook(&data_dir)
        .args(["--as", "robert@example.com", "household", "members"])
        .assert()
        .success()
        .stdout(contains("Robert"));

    chorebook(&data_dir)
        .args(["--as", "Robert", "household", "profile", "-e", "alice@example.com"])
        .assert()
        .failure();
}
