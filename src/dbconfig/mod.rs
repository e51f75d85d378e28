//! Database configuration
//!
//! `config/database.yml` is written on every build, unconditionally.
//! The written file is not a resolved configuration: it is an ERB
//! template the application evaluates at boot, reading `DATABASE_URL`
//! and the deployment stage from its own environment. Build time
//! captures only *which* variable to read.
//!
//! The boot-time transformation itself is modeled here as plain Rust
//! ([`DatabaseConfig`]), so its semantics are pinned by unit tests
//! without evaluating any Ruby.

use crate::error::{GantryError, GantryResult};
use crate::layout::BuildLayout;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use url::Url;

/// The environment variable the generated template reads at boot.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// The structured configuration a database URL denotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub adapter: String,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Flat key/value pairs from the query string, first value winning
    /// on a repeated key, insertion order preserved.
    pub params: Vec<(String, String)>,
}

impl DatabaseConfig {
    /// Parse a connection URL into its configuration fields.
    ///
    /// The `postgres` scheme maps to the `jdbcpostgresql` adapter; any
    /// other scheme passes through unchanged as the adapter name.
    pub fn from_url(raw: &str) -> GantryResult<Self> {
        let url = Url::parse(raw).map_err(|e| GantryError::DatabaseUrlInvalid {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        let adapter = match url.scheme() {
            "postgres" => "jdbcpostgresql".to_string(),
            other => other.to_string(),
        };

        let database = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|s| !s.is_empty())
            .map(String::from);

        let username = Some(url.username())
            .filter(|u| !u.is_empty())
            .map(String::from);
        let password = url
            .password()
            .filter(|p| !p.is_empty())
            .map(String::from);
        let host = url.host_str().map(String::from);

        let mut params: Vec<(String, String)> = Vec::new();
        for (key, value) in url.query_pairs() {
            if !params.iter().any(|(k, _)| *k == key) {
                params.push((key.into_owned(), value.into_owned()));
            }
        }

        Ok(Self {
            adapter,
            database,
            username,
            password,
            host,
            port: url.port(),
            params,
        })
    }

    /// Render the YAML the boot-time template produces for this
    /// configuration under the given deployment stage.
    ///
    /// Fields with no value are omitted entirely; the password is
    /// always quoted.
    pub fn render(&self, stage: &str) -> String {
        let mut out = format!("{stage}:\n");
        push_attr(&mut out, "adapter", Some(&self.adapter));
        push_attr(&mut out, "database", self.database.as_deref());
        push_attr(&mut out, "username", self.username.as_deref());
        if let Some(password) = &self.password {
            out.push_str(&format!("  password: '{password}'\n"));
        }
        push_attr(&mut out, "host", self.host.as_deref());
        if let Some(port) = self.port {
            out.push_str(&format!("  port: {port}\n"));
        }
        for (key, value) in &self.params {
            out.push_str(&format!("  {key}: {value}\n"));
        }
        out
    }
}

fn push_attr(out: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!("  {name}: {value}\n"));
    }
}

/// Pick the deployment stage: `RAILS_ENV` wins over `RACK_ENV`.
/// Boot fails when neither is set.
pub fn resolve_stage<'a>(
    rails_env: Option<&'a str>,
    rack_env: Option<&'a str>,
) -> GantryResult<&'a str> {
    rails_env.or(rack_env).ok_or(GantryError::StageUnset)
}

/// The template evaluated by the application at boot. Mirrors the
/// semantics of [`DatabaseConfig`] exactly.
const BOOT_TEMPLATE: &str = r##"<%
require 'cgi'
require 'uri'

begin
  uri = URI.parse(ENV["DATABASE_URL"])
rescue URI::InvalidURIError
  raise "Invalid DATABASE_URL"
end

raise "No RACK_ENV or RAILS_ENV found" unless ENV["RAILS_ENV"] || ENV["RACK_ENV"]

def attribute(name, value, force_string = false)
  if value
    value_string = force_string ? "'#{value}'" : value
    "#{name}: #{value_string}"
  else
    ""
  end
end

adapter = uri.scheme
adapter = "jdbcpostgresql" if adapter == "postgres"

database = (uri.path || "").split("/")[1]
username = uri.user
password = uri.password
host = uri.host
port = uri.port
params = CGI.parse(uri.query || "")
%>

<%= ENV["RAILS_ENV"] || ENV["RACK_ENV"] %>:
  <%= attribute "adapter",  adapter %>
  <%= attribute "database", database %>
  <%= attribute "username", username %>
  <%= attribute "password", password, true %>
  <%= attribute "host",     host %>
  <%= attribute "port",     port %>
<% params.each do |key, values| %>
  <%= key %>: <%= values.first %>
<% end %>
"##;

/// Write `config/database.yml`, overwriting whatever the app shipped.
pub fn write_template(build: &BuildLayout) -> GantryResult<PathBuf> {
    let path = build.database_config();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| GantryError::io(format!("creating {}", parent.display()), e))?;
    }
    fs::write(&path, BOOT_TEMPLATE)
        .map_err(|e| GantryError::io(format!("writing {}", path.display()), e))?;
    debug!("Wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn postgres_url_maps_to_jdbc_adapter() {
        let config =
            DatabaseConfig::from_url("postgres://u:p@host:5432/mydb?sslmode=require").unwrap();

        let expected = "\
production:
  adapter: jdbcpostgresql
  database: mydb
  username: u
  password: 'p'
  host: host
  port: 5432
  sslmode: require
";
        assert_eq!(config.render("production"), expected);
    }

    #[test]
    fn other_schemes_pass_through_as_adapter() {
        let config = DatabaseConfig::from_url("mysql2://u:p@db.example.com/app").unwrap();
        assert_eq!(config.adapter, "mysql2");
        assert_eq!(config.database.as_deref(), Some("app"));
    }

    #[test]
    fn missing_port_is_omitted() {
        let config = DatabaseConfig::from_url("postgres://u:p@host/mydb").unwrap();

        let rendered = config.render("production");
        assert!(!rendered.contains("port:"));
        assert!(rendered.contains("host: host\n"));
    }

    #[test]
    fn empty_components_are_omitted_entirely() {
        let config = DatabaseConfig::from_url("postgres://host/").unwrap();

        let rendered = config.render("production");
        assert!(!rendered.contains("database:"));
        assert!(!rendered.contains("username:"));
        assert!(!rendered.contains("password:"));
    }

    #[test]
    fn repeated_query_key_first_value_wins() {
        let config =
            DatabaseConfig::from_url("postgres://host/db?pool=5&pool=50&reaping_frequency=10")
                .unwrap();

        assert_eq!(
            config.params,
            vec![
                ("pool".to_string(), "5".to_string()),
                ("reaping_frequency".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn unparsable_url_is_rejected() {
        let err = DatabaseConfig::from_url("definitely not a url").unwrap_err();
        assert!(matches!(err, GantryError::DatabaseUrlInvalid { .. }));
    }

    #[test]
    fn stage_prefers_rails_env() {
        assert_eq!(
            resolve_stage(Some("production"), Some("staging")).unwrap(),
            "production"
        );
        assert_eq!(resolve_stage(None, Some("staging")).unwrap(), "staging");
    }

    #[test]
    fn missing_stage_fails() {
        let err = resolve_stage(None, None).unwrap_err();
        assert!(matches!(err, GantryError::StageUnset));
    }

    #[test]
    fn template_is_written_over_shipped_config() {
        let dir = TempDir::new().unwrap();
        let build = BuildLayout::new(dir.path());
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(build.database_config(), "production:\n  adapter: sqlite3\n").unwrap();

        let path = write_template(&build).unwrap();

        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains(&format!(r#"ENV["{DATABASE_URL_VAR}"]"#)));
        assert!(!written.contains("sqlite3"));
    }

    #[test]
    fn template_defers_stage_and_parsing_to_boot() {
        // the build-time artifact names the inputs but resolves nothing
        assert!(BOOT_TEMPLATE.contains(r#"ENV["RAILS_ENV"] || ENV["RACK_ENV"]"#));
        assert!(BOOT_TEMPLATE.contains("jdbcpostgresql"));
        assert!(BOOT_TEMPLATE.contains("URI.parse"));
    }
}
