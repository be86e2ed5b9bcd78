use crate::common::TestProject;
use crate::layoutd;
use anyhow::Result;

#[test]
fn config_get_defaults() -> Result<()> {
    let project = TestProject::with_config("")?;

    let result = layoutd!(project.path(), "config", "get", "watch.debounce_ms").assert_success()?;
    assert_eq!(result.stdout.trim(), "300");

    let result = layoutd!(project.path(), "config", "get", "generator.name").assert_success()?;
    assert_eq!(result.stdout.trim(), "holdr");
    Ok(())
}

#[test]
fn config_set_persists() -> Result<()> {
    let project = TestProject::with_config("")?;

    layoutd!(project.path(), "config", "set", "watch.debounce_ms", "750").assert_success()?;

    let result = layoutd!(project.path(), "config", "get", "watch.debounce_ms").assert_success()?;
    assert_eq!(result.stdout.trim(), "750");
    assert!(project.read("layoutd.toml")?.contains("debounce_ms = 750"));
    Ok(())
}

#[test]
fn config_set_rejects_out_of_range() -> Result<()> {
    let project = TestProject::with_config("")?;

    layoutd!(project.path(), "config", "set", "watch.debounce_ms", "5").assert_failure()?;

    let result = layoutd!(project.path(), "config", "get", "watch.debounce_ms").assert_success()?;
    assert_eq!(result.stdout.trim(), "300");
    Ok(())
}

#[test]
fn config_unknown_key_fails() -> Result<()> {
    let project = TestProject::with_config("")?;

    let result = layoutd!(project.path(), "config", "get", "watch.nope").assert_failure()?;
    assert!(result.contains_stderr("Unknown config key"));
    Ok(())
}

#[test]
fn config_path_create_writes_example() -> Result<()> {
    let project = TestProject::empty()?;

    let result = layoutd!(project.path(), "config", "path").assert_success()?;
    assert!(result.contains_stdout("--create"));

    layoutd!(project.path(), "config", "path", "--create").assert_success()?;
    assert!(project.read("layoutd.toml")?.contains("[generator]"));

    // The example is a valid project
    layoutd!(project.path(), "check").assert_success()?;
    Ok(())
}

#[test]
fn config_example_prints_units() -> Result<()> {
    let project = TestProject::empty()?;

    let result = layoutd!(project.path(), "config", "example").assert_success()?;
    assert!(result.contains_stdout("[[units]]"));
    Ok(())
}
