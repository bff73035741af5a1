use assert_cmd::Command;

pub fn mdd_cmd() -> Command {
	let mut cmd = Command::cargo_bin("mdd").expect("mdd binary should be built");
	cmd.env("NO_COLOR", "1");
	cmd
}
