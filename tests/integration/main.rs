//! Integration tests for Gantry

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn gantry() -> Command {
        cargo_bin_cmd!("gantry")
    }

    /// A build/cache directory pair with the given Gemfile staged.
    fn staged(gemfile: Option<&str>) -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let build = dir.path().join("build");
        let cache = dir.path().join("cache");
        fs::create_dir_all(&build).unwrap();
        if let Some(contents) = gemfile {
            fs::write(build.join("Gemfile"), contents).unwrap();
        }
        (dir, build, cache)
    }

    #[test]
    fn help_displays() {
        gantry()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("JRuby application provisioner"));
    }

    #[test]
    fn version_displays() {
        gantry()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("gantry"));
    }

    #[test]
    fn both_directories_are_required() {
        gantry()
            .arg("/tmp/only-build")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn missing_gemfile_rejects_the_build() {
        let (_dir, build, cache) = staged(None);

        gantry()
            .args([&build, &cache])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Gemfile not found"));
    }

    #[test]
    fn missing_runtime_directive_rejects_the_build() {
        let (_dir, build, cache) = staged(Some("source 'https://rubygems.org'\ngem 'rack'\n"));

        gantry()
            .args([&build, &cache])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No jruby runtime declared"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn non_jruby_engine_rejects_the_build() {
        let (_dir, build, cache) = staged(Some(
            "ruby '2.1.0', :engine => 'rbx', :engine_version => '2.2.1'\n",
        ));

        gantry()
            .args([&build, &cache])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported runtime engine 'rbx'"));
    }

    #[test]
    fn malformed_engine_version_rejects_the_build() {
        let (_dir, build, cache) = staged(Some(
            "ruby '1.9.3', :engine => 'jruby', :engine_version => 'latest'\n",
        ));

        gantry()
            .args([&build, &cache])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid runtime version 'latest'"));
    }
}
