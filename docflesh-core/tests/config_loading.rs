//! Config loading and feature resolution against an on-disk config directory.

use std::fs;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;
use predicates::prelude::*;
use docflesh_core::{
    config::{load_config_at, read_config_file_at},
    siteinfo, ConfigError, MetadataSource, SiteCategory,
};

const FEATURE_1: &str = "\
jinja_files:
  - mkdocs.yaml
  - pyproject.toml
  - docs/index.md
  - feature_1_specific_file.toml
static_files:
  - .github/workflows/deploy.yaml
  - feature_1_specific_static_file.yaml
flags:
  site_uses_mathjax: true
";

const FEATURE_2: &str = "\
jinja_files:
  - mkdocs.yaml
  - pyproject.toml
  - docs/index.md
  - feature_2_specific_file.md
static_files:
  - .github/workflows/deploy.yaml
  - feature_2_specific_static_file.yaml
flags:
  site_uses_precommit: true
";

const SHARED: &str = "\
jinja_files:
  - mkdocs.yaml
";

/// Builds `<tmp>/config/{config.yaml,features/}` plus `<tmp>/repo_1`, `<tmp>/repo_2`.
fn setup_config_dir(tmp: &assert_fs::TempDir, config_yaml: &str) -> PathBuf {
    tmp.child("config/features/feature_1.yaml").write_str(FEATURE_1).unwrap();
    tmp.child("config/features/feature_2.yaml").write_str(FEATURE_2).unwrap();
    tmp.child("config/features/shared.yaml").write_str(SHARED).unwrap();
    tmp.child("repo_1/siteinfo.json")
        .write_str(r#"{"site_name":"Test Repo 1","site_name_slug":"test-repo-1","category":"Learning tools","related_repo":"[Other](https://example.com/other)"}"#)
        .unwrap();
    tmp.child("repo_2/siteinfo.json")
        .write_str(r#"{"site_name":"Test Repo 2","site_name_slug":"test-repo-2","category":"Study materials"}"#)
        .unwrap();
    let config = tmp.child("config/config.yaml");
    config.write_str(config_yaml).unwrap();
    config.path().to_path_buf()
}

const TWO_REPOS: &str = "\
Files: &common
  - shared
ManagedRepos:
  - local_path: ../repo_1
    features: [shared, feature_1]
  - local_path: ../repo_2
    features: [feature_2, shared]
";

fn contains(paths: &[PathBuf], p: &str) -> bool {
    paths.iter().any(|x| x == Path::new(p))
}

#[test]
fn load_config_resolves_every_repo() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let config = setup_config_dir(&tmp, TWO_REPOS);

    let loaded = load_config_at(&config).expect("load");
    assert_eq!(loaded.repos.len(), 2);
    let (r1, r2) = (&loaded.repos[0], &loaded.repos[1]);

    assert_eq!(r1.local_path.canonicalize().unwrap(), tmp.path().join("repo_1").canonicalize().unwrap());
    assert_eq!(r2.local_path.canonicalize().unwrap(), tmp.path().join("repo_2").canonicalize().unwrap());

    assert_eq!(r1.template_files.len(), 4);
    assert_eq!(r2.template_files.len(), 4);
    assert!(contains(&r1.template_files, "mkdocs.yaml"));
    assert!(contains(&r1.template_files, "feature_1_specific_file.toml"));
    assert!(!contains(&r2.template_files, "feature_1_specific_file.toml"));
    assert!(contains(&r2.template_files, "feature_2_specific_file.md"));
    assert!(!contains(&r1.template_files, "feature_2_specific_file.md"));

    assert_eq!(r1.static_files.len(), 2);
    assert!(contains(&r1.static_files, "feature_1_specific_static_file.yaml"));
    assert!(!contains(&r1.static_files, "feature_2_specific_static_file.yaml"));

    assert_eq!(r1.siteinfo.site_name, "Test Repo 1");
    assert_eq!(r2.siteinfo.site_name, "Test Repo 2");
    assert_eq!(r2.siteinfo.category, SiteCategory::StudyMaterials);
    assert_eq!(r1.siteinfo_source, MetadataSource::Found);

    assert!(r1.flags.site_uses_mathjax && !r1.flags.site_uses_precommit);
    assert!(!r2.flags.site_uses_mathjax && r2.flags.site_uses_precommit);
}

#[test]
fn manifest_is_sorted_and_deduplicated() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let config = setup_config_dir(
        &tmp,
        "ManagedRepos:\n  - local_path: ../repo_1\n    features: [feature_2, feature_1, shared]\n",
    );
    let loaded = load_config_at(&config).unwrap();
    let files = &loaded.repos[0].template_files;

    let mkdocs = files.iter().filter(|p| p.as_path() == Path::new("mkdocs.yaml")).count();
    assert_eq!(mkdocs, 1, "mkdocs.yaml listed by three features must appear once");
    let mut sorted = files.clone();
    sorted.sort();
    assert_eq!(files, &sorted);
    assert!(loaded.repos[0].flags.site_uses_mathjax);
    assert!(loaded.repos[0].flags.site_uses_precommit);
}

#[test]
fn unknown_feature_is_a_config_error() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let config = setup_config_dir(
        &tmp,
        "ManagedRepos:\n  - local_path: ../repo_1\n    features: [feature_1, does_not_exist]\n",
    );
    let err = load_config_at(&config).unwrap_err();
    assert!(matches!(err, ConfigError::FeatureNotFound { ref name, .. } if name == "does_not_exist"), "got: {err}");
}

#[test]
fn all_missing_local_paths_are_reported() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let config = setup_config_dir(
        &tmp,
        "ManagedRepos:\n  - local_path: ../gone_a\n  - local_path: ../repo_1\n  - local_path: ../gone_b\n",
    );
    let err = load_config_at(&config).unwrap_err();
    match err {
        ConfigError::MissingLocalPaths { paths } => {
            assert_eq!(paths.len(), 2);
            assert!(paths[0].ends_with("gone_a"));
            assert!(paths[1].ends_with("gone_b"));
        }
        other => panic!("expected MissingLocalPaths, got {other}"),
    }
}

#[test]
fn malformed_siteinfo_fails_but_missing_one_defaults() {
    let tmp = assert_fs::TempDir::new().unwrap();
    tmp.child("repo_3").create_dir_all().unwrap();
    let config = setup_config_dir(
        &tmp,
        "ManagedRepos:\n  - local_path: ../repo_3\n    features: [shared]\n",
    );

    let loaded = load_config_at(&config).expect("absent siteinfo is not an error");
    assert_eq!(loaded.repos[0].siteinfo.category, SiteCategory::Inactive);
    assert_eq!(loaded.repos[0].siteinfo.site_name, "");
    assert_eq!(loaded.repos[0].siteinfo_source, MetadataSource::Defaulted);

    fs::write(siteinfo::siteinfo_path(&tmp.path().join("repo_3")), "site_name: [oops").unwrap();
    let err = load_config_at(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSiteInfo { .. }), "got: {err}");
}

#[test]
fn corrupt_config_returns_parse_error_with_path() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let config = setup_config_dir(&tmp, "ManagedRepos: : : [unclosed\n");
    let err = read_config_file_at(&config).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(predicate::str::contains("config.yaml").eval(&err.to_string()));
}

#[test]
fn invalid_category_in_siteinfo_is_rejected() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let config = setup_config_dir(&tmp, "ManagedRepos:\n  - local_path: ../repo_1\n");
    tmp.child("repo_1/siteinfo.json")
        .write_str(r#"{"site_name":"X","site_name_slug":"x","category":"Blog"}"#)
        .unwrap();
    let err = load_config_at(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSiteInfo { .. }), "got: {err}");
}
