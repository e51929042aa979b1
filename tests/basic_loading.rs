//! Integration tests for loading clouds documents from files.

use cloud_profile::prelude::*;
use serde::Deserialize;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct AuthSection {
    username: String,
    auth_url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct ConnectionSettings {
    region_name: String,
    auth_type: String,
    auth: AuthSection,
}

fn defaults(temp_dir: &TempDir) -> Defaults {
    Defaults::default().with_cache_path(temp_dir.path().join("cache"))
}

#[test]
fn test_load_single_yaml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clouds.yaml");

    fs::write(
        &config_path,
        r#"
clouds:
  mycloud:
    region_name: RegionOne
    auth:
      username: alice
      auth_url: http://keystone:5000/v3
"#,
    )
    .unwrap();

    let config = CloudConfig::builder()
        .with_config_file(&config_path)
        .with_defaults(defaults(&temp_dir))
        .build()
        .unwrap();

    let profile = config.get_cloud("mycloud").unwrap();
    let settings: ConnectionSettings = profile.deserialize_into().unwrap();
    assert_eq!(settings.region_name, "RegionOne");
    assert_eq!(settings.auth_type, "password");
    assert_eq!(settings.auth.username, "alice");
    assert_eq!(settings.auth.auth_url, "http://keystone:5000/v3");
}

#[test]
fn test_load_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clouds.json");

    fs::write(
        &config_path,
        r#"{
  "clouds": {
    "jsoncloud": {
      "region_name": "RegionTwo",
      "auth": { "username": "bob", "auth_url": "http://keystone:5000/v3" }
    }
  }
}"#,
    )
    .unwrap();

    let config = CloudConfig::builder()
        .with_config_file(&config_path)
        .with_defaults(defaults(&temp_dir))
        .build()
        .unwrap();

    let profile = config.get_cloud("jsoncloud").unwrap();
    assert_eq!(profile.region_name(), Some("RegionTwo"));
    assert_eq!(profile.auth_value("username"), Some("bob"));
}

#[cfg(feature = "toml")]
#[test]
fn test_load_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clouds.toml");

    fs::write(
        &config_path,
        r#"
[clouds.tomlcloud]
region_name = "RegionThree"

[clouds.tomlcloud.auth]
username = "carol"
"#,
    )
    .unwrap();

    let config = CloudConfig::builder()
        .with_config_file(&config_path)
        .with_defaults(defaults(&temp_dir))
        .build()
        .unwrap();

    let profile = config.get_cloud("tomlcloud").unwrap();
    assert_eq!(profile.region_name(), Some("RegionThree"));
    assert_eq!(profile.auth_value("username"), Some("carol"));
}

#[test]
fn test_first_existing_file_wins() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.yaml");
    let first = temp_dir.path().join("first.yaml");
    let second = temp_dir.path().join("second.yaml");

    fs::write(&first, "clouds:\n  one:\n    region_name: first\n").unwrap();
    fs::write(&second, "clouds:\n  two:\n    region_name: second\n").unwrap();

    let config = CloudConfig::builder()
        .with_config_file(&missing)
        .with_config_file(&first)
        .with_config_file(&second)
        .with_defaults(defaults(&temp_dir))
        .build()
        .unwrap();

    assert_eq!(config.cloud_names(), vec!["one".to_string()]);
    assert!(config.get_cloud("two").unwrap_err().is_not_found());
}

#[test]
fn test_vendor_file_accepts_clouds_key() {
    let temp_dir = TempDir::new().unwrap();
    let vendor_path = temp_dir.path().join("vendor.yaml");

    fs::write(
        &vendor_path,
        "clouds:\n  vendorcloud:\n    region_name: vendor-region\n",
    )
    .unwrap();

    let config = CloudConfig::builder()
        .with_vendor_file(&vendor_path)
        .with_defaults(defaults(&temp_dir))
        .build()
        .unwrap();

    let profile = config.get_cloud("vendorcloud").unwrap();
    assert_eq!(profile.region_name(), Some("vendor-region"));
}

#[test]
fn test_legacy_keys_are_normalized() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clouds.yaml");

    fs::write(
        &config_path,
        r#"
clouds:
  legacy:
    auth_plugin: token
    insecure: true
    auth:
      tenant_name: oldproject
"#,
    )
    .unwrap();

    let config = CloudConfig::builder()
        .with_config_file(&config_path)
        .with_defaults(defaults(&temp_dir))
        .build()
        .unwrap();

    let profile = config.get_cloud("legacy").unwrap();
    assert_eq!(profile.auth_type(), "token");
    assert!(!profile.contains_key("auth_plugin"));
    assert_eq!(profile.auth_value("project_name"), Some("oldproject"));
    assert!(!profile.auth().contains_key("tenant_name"));
    assert_eq!(profile.get("verify"), Some(&serde_json::Value::Bool(false)));
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clouds.ini");
    fs::write(&config_path, "[clouds]\n").unwrap();

    let result = CloudConfig::builder()
        .with_config_file(&config_path)
        .with_defaults(defaults(&temp_dir))
        .build();
    assert!(result.is_err());
}

#[test]
fn test_validation_success() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clouds.yaml");
    fs::write(&config_path, "clouds:\n  ok:\n    region_name: RegionOne\n").unwrap();

    let config = CloudConfig::builder()
        .with_config_file(&config_path)
        .with_defaults(defaults(&temp_dir))
        .with_validation(|profile: &CloudProfile| {
            if profile.region_name().is_none() {
                return Err(ValidationError::invalid_field("region_name", "is required"));
            }
            Ok(())
        })
        .build()
        .unwrap();

    assert!(config.get_cloud("ok").is_ok());
    assert!(matches!(
        config.get_one_cloud(Some(""), Fragment::new(), None),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_mixed_case_names_and_keys_are_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("clouds.yaml");
    let vendor_path = temp_dir.path().join("vendor.yaml");

    fs::write(
        &config_path,
        r#"
clouds:
  MyCloud:
    profile: VendorProfile
    region_name: RegionOne
    auth:
      userName: Alice
"#,
    )
    .unwrap();
    fs::write(
        &vendor_path,
        "public-clouds:\n  VendorProfile:\n    auth:\n      AuthURL: http://keystone:5000/v3\n",
    )
    .unwrap();

    let config = CloudConfig::builder()
        .with_config_file(&config_path)
        .with_vendor_file(&vendor_path)
        .with_defaults(defaults(&temp_dir))
        .build()
        .unwrap();

    assert_eq!(config.cloud_names(), vec!["MyCloud".to_string()]);
    let profile = config.get_cloud("MyCloud").unwrap();
    assert_eq!(profile.cloud(), Some("MyCloud"));
    assert_eq!(profile.region_name(), Some("RegionOne"));
    assert_eq!(profile.auth_value("userName"), Some("Alice"));
    assert_eq!(profile.auth_value("AuthURL"), Some("http://keystone:5000/v3"));
    assert!(!profile.auth().contains_key("username"));
    assert!(config.get_cloud("mycloud").unwrap_err().is_not_found());
}
