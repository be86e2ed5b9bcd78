use crate::common::TestProject;
use crate::layoutd;
use anyhow::Result;

#[test]
fn check_shows_units_and_dependents() -> Result<()> {
    let project = TestProject::app_and_lib("cat > /dev/null")?;

    let result = layoutd!(project.path(), "check").assert_success()?;

    assert!(result.contains_stdout("Configuration OK"));
    assert!(result.contains_stdout("app/build/generated/source/holdr/debug"));
    assert!(result.contains_stdout("regenerates"));
    assert!(result.contains_stdout("2 units, 2 generator models"));
    Ok(())
}

#[test]
fn check_runs_from_nested_directory() -> Result<()> {
    let project = TestProject::app_and_lib("cat > /dev/null")?;
    let layout = project.write_layout("app", "layout", "main.xml")?;

    let nested = layout.parent().unwrap();
    layoutd!(nested, "check").assert_success()?;
    Ok(())
}

#[test]
fn check_reports_unresolved_output_without_variant() -> Result<()> {
    let project = TestProject::with_config("[[units]]\nid = \"app\"\nroot = \"app\"\n")?;

    let result = layoutd!(project.path(), "check").assert_success()?;

    assert!(result.contains_stdout("unresolved"));
    assert!(result.contains_stdout("generator.command is empty"));
    Ok(())
}

#[test]
fn check_rejects_invalid_config() -> Result<()> {
    let project = TestProject::with_config(
        "[[units]]\nid = \"app\"\nroot = \"app\"\ndepends_on = [\"missing\"]\n",
    )?;

    let result = layoutd!(project.path(), "check").assert_failure()?;

    assert!(result.contains_stderr("missing"));
    Ok(())
}

#[test]
fn check_outside_project_fails() -> Result<()> {
    let project = TestProject::empty()?;

    let result = layoutd!(project.path(), "check").assert_failure()?;

    assert!(result.contains_stderr("Not a layoutd project"));
    Ok(())
}
