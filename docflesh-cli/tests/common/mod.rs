//! A config directory and one real managed repository (`site`) backed by a
//! bare `remote.git`, laid out as:
//!
//! ```text
//! <tmp>/config/config.yaml
//! <tmp>/config/features/site.yaml
//! <tmp>/config/templates/mkdocs.yaml
//! <tmp>/config/static/.github/workflows/deploy.yaml
//! <tmp>/remote.git
//! <tmp>/site
//! ```

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;
use assert_fs::TempDir;

pub const SITE_FEATURE: &str = "\
jinja_files:
  - mkdocs.yaml
static_files:
  - .github/workflows/deploy.yaml
flags:
  site_uses_mathjax: true
";

pub const MKDOCS_TEMPLATE: &str = "\
site_name: {{ site_name }}
site_url: https://example.com/{{ site_name_slug }}/
{% if site_uses_mathjax %}extra_javascript:
  - js/mathjax.js
{% endif %}";

pub const DEPLOY_WORKFLOW: &str = "name: deploy\non: push\n";

pub const SITEINFO: &str = r#"{"site_name":"Fleet Site","site_name_slug":"fleet-site","category":"Learning tools"}"#;

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("git must be installed");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub struct Fleet {
    pub tmp: TempDir,
}

impl Fleet {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        tmp.child("config/config.yaml")
            .write_str("ManagedRepos:\n  - local_path: ../site\n    features: [site]\n")
            .unwrap();
        tmp.child("config/features/site.yaml").write_str(SITE_FEATURE).unwrap();
        tmp.child("config/templates/mkdocs.yaml").write_str(MKDOCS_TEMPLATE).unwrap();
        tmp.child("config/static/.github/workflows/deploy.yaml")
            .write_str(DEPLOY_WORKFLOW)
            .unwrap();

        let root = tmp.path();
        git(root, &["init", "--quiet", "--bare", "remote.git"]);
        git(&root.join("remote.git"), &["symbolic-ref", "HEAD", "refs/heads/main"]);

        git(root, &["init", "--quiet", "site"]);
        let site = root.join("site");
        git(&site, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git(&site, &["config", "user.name", "Doc Flesh Tests"]);
        git(&site, &["config", "user.email", "tests@example.com"]);
        git(&site, &["config", "commit.gpgsign", "false"]);
        fs::write(site.join("siteinfo.json"), SITEINFO).unwrap();
        fs::write(site.join("README.md"), "# Fleet Site\n").unwrap();
        git(&site, &["add", "siteinfo.json", "README.md"]);
        git(&site, &["commit", "--quiet", "-m", "Initial commit"]);
        let remote = root.join("remote.git");
        git(&site, &["remote", "add", "origin", remote.to_str().unwrap()]);
        git(&site, &["push", "--quiet", "-u", "origin", "main"]);

        Fleet { tmp }
    }

    pub fn config(&self) -> PathBuf {
        self.tmp.path().join("config/config.yaml")
    }

    pub fn site(&self) -> PathBuf {
        self.tmp.path().join("site")
    }

    pub fn remote(&self) -> PathBuf {
        self.tmp.path().join("remote.git")
    }
}
