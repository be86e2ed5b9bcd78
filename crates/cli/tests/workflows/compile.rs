use crate::common::TestProject;
use crate::layoutd;
use anyhow::Result;

#[test]
fn compile_without_layouts_is_a_no_op() -> Result<()> {
    let project = TestProject::app_and_lib("cat > /dev/null")?;

    let result = layoutd!(project.path(), "compile").assert_success()?;

    assert!(result.contains_stdout("No layout files found"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn compile_regenerates_unit_and_dependents() -> Result<()> {
    let project = TestProject::app_and_lib("cat >> requests.log")?;
    project.write_layout("lib", "layout", "item.xml")?;
    project.write_layout("lib", "values", "strings.xml")?;

    let result = layoutd!(project.path(), "compile", "lib").assert_success()?;

    assert!(result.contains_stdout("Generating 1 layout files for 2 units"));
    let requests = project.read("requests.log")?;
    assert!(requests.contains("\"unit\":\"lib\""));
    assert!(requests.contains("\"unit\":\"app\""));
    assert!(requests.contains("item.xml"));
    assert!(!requests.contains("strings.xml"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn compile_survives_generator_failure() -> Result<()> {
    let project = TestProject::app_and_lib("cat > /dev/null; echo broken >&2; exit 3")?;
    project.write_layout("app", "layout", "main.xml")?;

    let result = layoutd!(project.path(), "compile").assert_success()?;

    assert!(result.contains_stdout("Done"));
    assert!(result.contains_stderr("broken"));
    Ok(())
}

#[test]
fn compile_unknown_unit_fails() -> Result<()> {
    let project = TestProject::app_and_lib("cat > /dev/null")?;

    layoutd!(project.path(), "compile", "nope").assert_failure()?;
    Ok(())
}

#[cfg(unix)]
#[test]
fn compile_runs_generator_in_headless_project() -> Result<()> {
    let project = TestProject::with_config(
        r#"
[watch]
dispatch = false

[generator]
command = ["sh", "-c", "cat >> requests.log"]

[[units]]
id = "app"
root = "app"
variant = "debug"
"#,
    )?;
    project.write_layout("app", "layout", "main.xml")?;

    layoutd!(project.path(), "compile").assert_success()?;

    let requests = project.read("requests.log")?;
    assert!(requests.contains("\"unit\":\"app\""));
    assert!(requests.contains("main.xml"));
    Ok(())
}
