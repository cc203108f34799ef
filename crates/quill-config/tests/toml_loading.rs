//! Integration tests for TOML and environment configuration loading.
//!
//! Uses `figment::Jail` for sandboxed file and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use quill_config::QuillConfig;

#[test]
fn loads_hub_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[hub]
api_url = "https://hub.example"
user_agent = "quill-test/1.0"
timeout_secs = 5
"#,
        )?;

        let config: QuillConfig = Figment::from(Serialized::defaults(QuillConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.hub.api_url, "https://hub.example");
        assert_eq!(config.hub.user_agent, "quill-test/1.0");
        assert_eq!(config.hub.timeout_secs, 5);
        assert!(config.hub.validate().is_ok());
        Ok(())
    });
}

#[test]
fn partial_section_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[instance]
base_url = "https://quill.example/"
"#,
        )?;

        let config: QuillConfig = Figment::from(Serialized::defaults(QuillConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.instance.base_url(), "https://quill.example");
        assert_eq!(config.hub.api_url, "http://fedbox.git");
        assert_eq!(config.hub.timeout_secs, 30);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[hub]
api_url = "https://from-toml.example"
"#,
        )?;
        jail.set_env("QUILL_HUB__API_URL", "https://from-env.example");

        let config: QuillConfig = Figment::from(Serialized::defaults(QuillConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("QUILL_").split("__"))
            .extract()?;

        assert_eq!(config.hub.api_url, "https://from-env.example");
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up() {
    Jail::expect_with(|jail| {
        std::fs::create_dir_all(jail.directory().join(".quill")).expect("create .quill");
        jail.create_file(
            ".quill/config.toml",
            r#"
[instance]
host_name = "quill.local"
"#,
        )?;

        let config: QuillConfig = QuillConfig::figment().extract()?;
        assert_eq!(config.instance.host_name, "quill.local");
        Ok(())
    });
}
