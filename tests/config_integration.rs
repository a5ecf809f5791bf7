//! Integration tests for the gh-config crate.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use gh_config::environment::DEFAULT_CONFIG;
use gh_config::plugins::filter_plugin_names;
use gh_config::{Config, ConfigError, ConfigStore, Environment, PluginRegistry};
use serde_json::{Value, json};
use tempfile::TempDir;

/// A store rooted in a temporary home and project directory.
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("home")).unwrap();
        fs::create_dir_all(dir.path().join("project")).unwrap();
        Self { dir }
    }

    fn user_path(&self) -> std::path::PathBuf {
        self.dir.path().join("home").join(".gh.json")
    }

    fn project_path(&self) -> std::path::PathBuf {
        self.dir.path().join("project").join(".gh.json")
    }

    fn plugins_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("node_modules")
    }

    fn store(&self) -> ConfigStore {
        let env = Environment::new(self.user_path(), self.dir.path().join("project"))
            .with_test_mode(true);
        ConfigStore::new(env).with_package_manager("gh-no-such-package-manager")
    }

    fn write_user(&self, value: Value) {
        fs::write(self.user_path(), value.to_string()).unwrap();
    }

    fn write_project(&self, value: Value) {
        fs::write(self.project_path(), value.to_string()).unwrap();
    }

    fn install_plugin(&self, dir_name: &str, manifest: Option<Value>) {
        let dir = self.plugins_dir().join(dir_name);
        fs::create_dir_all(&dir).unwrap();
        if let Some(manifest) = manifest {
            fs::write(dir.join("gh-plugin.json"), manifest.to_string()).unwrap();
        }
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn first_run_bootstraps_exact_copy_of_default() {
    let sandbox = Sandbox::new();
    let mut store = sandbox.store();

    store.load(None).await.unwrap();
    assert_eq!(fs::read_to_string(sandbox.user_path()).unwrap(), DEFAULT_CONFIG);
}

#[tokio::test]
async fn second_load_does_not_bootstrap_again() {
    let sandbox = Sandbox::new();
    sandbox.store().load(None).await.unwrap();

    let mut user = read_json(&sandbox.user_path());
    user["github_user"] = json!("octocat");
    sandbox.write_user(user.clone());

    let config = sandbox.store().load(None).await.unwrap();
    assert_eq!(config.github_user(), Some("octocat"));
    assert_eq!(read_json(&sandbox.user_path()), user);
}

#[tokio::test]
async fn repeated_loads_share_one_object() {
    let sandbox = Sandbox::new();
    let mut store = sandbox.store();

    let first = store.load(None).await.unwrap();
    let second = store.load(None).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let scoped = store.load(Some("jira")).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &scoped));
    assert!(Arc::ptr_eq(&scoped, &store.load(Some("gh-jira")).await.unwrap()));
}

#[tokio::test]
async fn project_overrides_global() {
    let sandbox = Sandbox::new();
    sandbox.write_user(json!({
        "github_user": "bob",
        "api": {"protocol": "https", "host": "api.github.com"}
    }));
    sandbox.write_project(json!({"github_user": "alice"}));

    let config = sandbox.store().load(None).await.unwrap();
    assert_eq!(config.github_user(), Some("alice"));
    assert_eq!(config.github_host(), Some("https://github.com/"));
    assert_eq!(config.github_gist_host(), Some("https://gist.github.com/"));
}

#[tokio::test]
async fn enterprise_hosts() {
    let sandbox = Sandbox::new();
    sandbox.write_user(json!({
        "api": {"protocol": "http", "host": "github.corp.example"}
    }));

    let config = sandbox.store().load(None).await.unwrap();
    assert_eq!(config.github_host(), Some("http://github.corp.example/"));
    assert_eq!(config.github_gist_host(), Some("http://github.corp.example/gist/"));
    assert_eq!(config.api_base_url(), "http://github.corp.example/api/v3");
}

#[tokio::test]
async fn explicit_hosts_are_kept() {
    let sandbox = Sandbox::new();
    sandbox.write_user(json!({
        "api": {"protocol": "https", "host": "github.corp.example"},
        "github_host": "https://web.corp.example/"
    }));

    let config = sandbox.store().load(None).await.unwrap();
    assert_eq!(config.github_host(), Some("https://web.corp.example/"));
    assert_eq!(config.github_gist_host(), Some("https://github.corp.example/gist/"));
}

#[tokio::test]
async fn user_layer_replaces_default_sections_wholesale() {
    let sandbox = Sandbox::new();
    sandbox.write_user(json!({"api": {"host": "github.corp.example"}}));

    let config = sandbox.store().load(None).await.unwrap();
    assert_eq!(config.get_path("api.protocol"), None);
    assert_eq!(config.api_protocol(), "https");
    assert_eq!(config.get("default_remote"), Some(&json!("origin")));
}

#[tokio::test]
async fn write_then_load_sees_new_value() {
    let sandbox = Sandbox::new();
    let mut store = sandbox.store();

    let before = store.load(None).await.unwrap();
    store.write("plugins.ignored", json!(true)).unwrap();
    let after = store.load(None).await.unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(after.get_path("plugins.ignored"), Some(&json!(true)));

    store.write("plugins.jira.host", json!("jira.example")).unwrap();
    let again = store.load(None).await.unwrap();
    assert_eq!(again.get_path("plugins.ignored"), Some(&json!(true)));
    assert_eq!(again.get_path("plugins.jira.host"), Some(&json!("jira.example")));

    let persisted = read_json(&sandbox.user_path());
    assert_eq!(persisted["plugins"]["jira"]["host"], json!("jira.example"));
}

#[tokio::test]
async fn written_file_is_indented_and_private() {
    let sandbox = Sandbox::new();
    let mut store = sandbox.store();
    store.write_credentials("octocat", "ghp_secret").unwrap();

    let text = fs::read_to_string(sandbox.user_path()).unwrap();
    assert!(text.contains("\n    \"github_user\": \"octocat\""));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(sandbox.user_path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

#[tokio::test]
async fn project_file_is_not_persisted_by_write() {
    let sandbox = Sandbox::new();
    sandbox.write_project(json!({"github_user": "alice"}));
    let mut store = sandbox.store();

    store.write("default_branch", json!("main")).unwrap();
    let persisted = read_json(&sandbox.user_path());
    assert_eq!(persisted.get("github_user"), None);
    assert_eq!(persisted["default_branch"], json!("main"));
}

#[tokio::test]
async fn malformed_project_file_is_fatal() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.project_path(), "{ not json").unwrap();

    let result = sandbox.store().load(None).await;
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn plugin_prefix_filter() {
    assert_eq!(filter_plugin_names(["gh-foo", "bar", "gh-baz"]), ["foo", "baz"]);
}

#[tokio::test]
async fn installed_plugins_come_from_configured_directory() {
    let sandbox = Sandbox::new();
    sandbox.install_plugin("gh-foo", None);
    sandbox.install_plugin("bar", None);
    sandbox.install_plugin("gh-baz", None);
    sandbox.write_user(json!({"plugins_path": sandbox.plugins_dir()}));

    let mut store = sandbox.store();
    let mut plugins = store.installed_plugins().await.unwrap();
    plugins.sort();
    assert_eq!(plugins, ["baz", "foo"]);

    // The scan is memoized for the life of the store.
    sandbox.install_plugin("gh-late", None);
    assert_eq!(store.installed_plugins().await.unwrap().len(), 2);
}

#[tokio::test]
async fn manifest_defaults_lose_to_user_values() {
    let sandbox = Sandbox::new();
    sandbox.install_plugin("gh-jira", Some(json!({"timeout": 30, "host": "jira.example"})));
    sandbox.install_plugin("gh-bare", None);
    sandbox.write_user(json!({
        "plugins_path": sandbox.plugins_dir(),
        "plugins": {"jira": {"timeout": 60}}
    }));

    let mut store = sandbox.store();
    let scoped = store.load(Some("jira")).await.unwrap();
    assert_eq!(
        scoped.get_path("plugins.jira"),
        Some(&json!({"timeout": 60, "host": "jira.example"}))
    );
    assert_eq!(scoped.get_path("plugins.bare"), None);

    let global = store.load(None).await.unwrap();
    assert_eq!(global.get_path("plugins.jira"), Some(&json!({"timeout": 60})));
}

#[test]
fn merge_plugin_config_directly() {
    let dir = TempDir::new().unwrap();
    let plugin = dir.path().join("gh-jira");
    fs::create_dir_all(&plugin).unwrap();
    fs::write(plugin.join("gh-plugin.json"), r#"{"timeout": 30}"#).unwrap();

    let mut config = Config::from_value(json!({"plugins": {"jira": {"timeout": 60}}})).unwrap();
    PluginRegistry::merge_plugin_config(&mut config, dir.path(), "gh-jira").unwrap();
    assert_eq!(config.get_path("plugins.jira.timeout"), Some(&json!(60)));

    let mut untouched = Config::new();
    PluginRegistry::merge_plugin_config(&mut untouched, dir.path(), "missing").unwrap();
    assert_eq!(untouched, Config::new());
}

#[tokio::test]
async fn ignored_plugins() {
    let sandbox = Sandbox::new();
    sandbox.write_user(json!({"ignored_plugins": ["gh-jira"]}));

    let mut store = sandbox.store();
    assert!(store.is_plugin_ignored("jira").await.unwrap());
    assert!(store.is_plugin_ignored("gh-jira").await.unwrap());
    assert!(!store.is_plugin_ignored("gist").await.unwrap());
}
