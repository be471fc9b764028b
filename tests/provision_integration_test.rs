use anyhow::Result;
use httpmock::prelude::*;
use jdk_switcher_setup::config::toml_config::TomlConfig;
use jdk_switcher_setup::utils::validation::Validate;
use jdk_switcher_setup::{CliConfig, LocalStorage, ProvisionEngine, SetupError, SwitcherPipeline};
use std::path::Path;
use tempfile::TempDir;

const TEMPLATE: &str = include_str!("fixtures/jdk_switcher.sh.erb");
const TEMPLATE_PATH: &str = "/travis-ci/travis-cookbooks/ci_environment/java/templates/ubuntu/jdk_switcher.sh.erb";

fn expected_script(version: &str) -> String {
    TEMPLATE
        .replace("<%# default JDK comes from the java cookbook attributes %>", "")
        .replace("<%= node['java']['default_version'] %>", version)
}

fn config_for(url: String, output: &Path) -> CliConfig {
    CliConfig {
        template_url: Some(url),
        output: Some(output.to_str().unwrap().to_string()),
        ..CliConfig::default()
    }
}

fn engine_for(config: CliConfig, base: &Path) -> ProvisionEngine<SwitcherPipeline<LocalStorage, CliConfig>> {
    let storage = LocalStorage::new(base);
    ProvisionEngine::new(SwitcherPipeline::new(storage, config))
}

/// 端到端：下載、渲染並寫入 .jdk_switcher_rc
#[tokio::test]
async fn test_end_to_end_writes_rendered_script() -> Result<()> {
    let home = TempDir::new()?;
    let output = home.path().join(".jdk_switcher_rc");

    let server = MockServer::start();
    let template_mock = server.mock(|when, then| {
        when.method(GET).path(TEMPLATE_PATH);
        then.status(200).body(TEMPLATE);
    });

    let engine = engine_for(config_for(server.url(TEMPLATE_PATH), &output), home.path());
    let report = engine.run().await?;

    template_mock.assert();
    assert_eq!(report.output_path, output);
    assert_eq!(report.substitutions, 1);
    assert_eq!(report.template_origin, server.url(TEMPLATE_PATH));

    let written = std::fs::read_to_string(&output)?;
    assert_eq!(written, expected_script("oraclejdk7"));
    assert_eq!(report.bytes_written, written.len());
    assert!(written.contains("jdk_switcher use oraclejdk7\n"));

    Ok(())
}

#[tokio::test]
async fn test_existing_file_is_overwritten() -> Result<()> {
    let home = TempDir::new()?;
    let output = home.path().join(".jdk_switcher_rc");
    std::fs::write(&output, "# previous run with a much longer body\n".repeat(200))?;

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(TEMPLATE_PATH);
        then.status(200).body(TEMPLATE);
    });

    let mut config = config_for(server.url(TEMPLATE_PATH), &output);
    config.default_version = Some("openjdk7".to_string());
    engine_for(config, home.path()).run().await?;

    assert_eq!(std::fs::read_to_string(&output)?, expected_script("openjdk7"));
    Ok(())
}

#[tokio::test]
async fn test_second_run_produces_identical_file() -> Result<()> {
    let home = TempDir::new()?;
    let output = home.path().join(".jdk_switcher_rc");

    let server = MockServer::start();
    let template_mock = server.mock(|when, then| {
        when.method(GET).path(TEMPLATE_PATH);
        then.status(200).body(TEMPLATE);
    });

    let engine = engine_for(config_for(server.url(TEMPLATE_PATH), &output), home.path());

    engine.run().await?;
    let first = std::fs::read(&output)?;
    engine.run().await?;
    let second = std::fs::read(&output)?;

    template_mock.assert_hits(2);
    assert_eq!(first, second);
    Ok(())
}

#[tokio::test]
async fn test_server_error_leaves_previous_file_untouched() -> Result<()> {
    let home = TempDir::new()?;
    let output = home.path().join(".jdk_switcher_rc");
    std::fs::write(&output, "jdk_switcher use oraclejdk8\n")?;

    let server = MockServer::start();
    let template_mock = server.mock(|when, then| {
        when.method(GET).path(TEMPLATE_PATH);
        then.status(500);
    });

    let engine = engine_for(config_for(server.url(TEMPLATE_PATH), &output), home.path());
    let err = engine.run().await.unwrap_err();

    template_mock.assert();
    assert!(matches!(err, SetupError::HttpStatus { status: 500, .. }));
    assert_eq!(err.severity().exit_code(), 2);
    assert_eq!(std::fs::read_to_string(&output)?, "jdk_switcher use oraclejdk8\n");
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_leaves_output_absent() -> Result<()> {
    let home = TempDir::new()?;
    let output = home.path().join(".jdk_switcher_rc");

    let mut config = config_for("http://127.0.0.1:1/jdk_switcher.sh.erb".to_string(), &output);
    config.timeout = Some(5);

    let err = engine_for(config, home.path()).run().await.unwrap_err();

    assert!(matches!(err, SetupError::FetchError(_)));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_unrenderable_template_is_not_written() -> Result<()> {
    let home = TempDir::new()?;
    let output = home.path().join(".jdk_switcher_rc");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(TEMPLATE_PATH);
        then.status(200)
            .body("<% if node.java.default_version %>\njdk_switcher use x\n<% end %>\n");
    });

    let err = engine_for(config_for(server.url(TEMPLATE_PATH), &output), home.path())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::TemplateError(_)));
    assert!(!output.exists());
    Ok(())
}

/// 只有這個測試會修改 HOME，其餘測試都指定 output
#[tokio::test]
async fn test_default_output_follows_home() -> Result<()> {
    let home = TempDir::new()?;
    let workdir = TempDir::new()?;
    let previous_home = std::env::var_os("HOME");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(TEMPLATE_PATH);
        then.status(200).body(TEMPLATE);
    });

    let config = CliConfig {
        template_url: Some(server.url(TEMPLATE_PATH)),
        ..CliConfig::default()
    };

    std::env::remove_var("HOME");
    let missing_home = config.validate();

    std::env::set_var("HOME", home.path());
    let validated = config.validate();
    let report = engine_for(config, workdir.path()).run().await;

    match previous_home {
        Some(value) => std::env::set_var("HOME", value),
        None => std::env::remove_var("HOME"),
    }

    assert!(matches!(
        missing_home,
        Err(SetupError::MissingConfigError { .. })
    ));
    validated?;
    let report = report?;

    let expected_path = home.path().join(".jdk_switcher_rc");
    assert_eq!(report.output_path, expected_path);
    assert_eq!(std::fs::read_to_string(&expected_path)?, expected_script("oraclejdk7"));
    Ok(())
}

#[tokio::test]
async fn test_dry_run_with_keep_template_writes_nothing() -> Result<()> {
    let home = TempDir::new()?;
    let output = home.path().join(".jdk_switcher_rc");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(TEMPLATE_PATH);
        then.status(200).body(TEMPLATE);
    });

    let mut config = config_for(server.url(TEMPLATE_PATH), &output);
    config.keep_template = true;
    config.dry_run = true;

    let script = engine_for(config, home.path()).preview().await?;

    assert_eq!(script.content, expected_script("oraclejdk7"));
    assert!(!output.exists());
    assert!(!home.path().join("jdk_switcher.sh.erb").exists());
    Ok(())
}

#[tokio::test]
async fn test_dry_run_preview_writes_nothing() -> Result<()> {
    let home = TempDir::new()?;
    let output = home.path().join(".jdk_switcher_rc");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(TEMPLATE_PATH);
        then.status(200).body(TEMPLATE);
    });

    let engine = engine_for(config_for(server.url(TEMPLATE_PATH), &output), home.path());
    let script = engine.preview().await?;

    assert_eq!(script.content, expected_script("oraclejdk7"));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_keep_template_saves_downloaded_copy() -> Result<()> {
    let home = TempDir::new()?;
    let output = home.path().join(".jdk_switcher_rc");

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(TEMPLATE_PATH);
        then.status(200).body(TEMPLATE);
    });

    let mut config = config_for(server.url(TEMPLATE_PATH), &output);
    config.keep_template = true;

    let report = engine_for(config, home.path()).run().await?;
    assert_eq!(report.template_copy, Some(Path::new("jdk_switcher.sh.erb").to_path_buf()));

    // 相對路徑以 storage 的 base path 為準
    let cached = std::fs::read_to_string(home.path().join("jdk_switcher.sh.erb"))?;
    assert_eq!(cached, TEMPLATE);
    Ok(())
}

#[tokio::test]
async fn test_offline_run_from_config_file() -> Result<()> {
    let home = TempDir::new()?;
    let template_path = home.path().join("local.sh.erb");
    std::fs::write(&template_path, TEMPLATE)?;

    let output = home.path().join("out/.jdk_switcher_rc");
    let config_path = home.path().join("setup.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[source]
file = "{}"

[java]
default_version = "oraclejdk8"

[output]
path = "{}"
"#,
            template_path.to_str().unwrap().replace('\\', "/"),
            output.to_str().unwrap().replace('\\', "/")
        ),
    )?;

    let mut config = CliConfig {
        config: Some(config_path.to_str().unwrap().to_string()),
        ..CliConfig::default()
    };
    config.load_config_file()?;

    let report = engine_for(config, home.path()).run().await?;

    assert_eq!(report.template_origin, template_path.to_str().unwrap().replace('\\', "/"));
    assert_eq!(std::fs::read_to_string(&output)?, expected_script("oraclejdk8"));
    Ok(())
}

#[test]
fn test_toml_config_drives_defaults() -> Result<()> {
    let config = TomlConfig::from_toml_str("[java]\ndefault_version = \"openjdk6\"\n")?;
    let mut cli = CliConfig::default();
    cli.merge_file(config);
    assert_eq!(cli.default_version.as_deref(), Some("openjdk6"));
    Ok(())
}
