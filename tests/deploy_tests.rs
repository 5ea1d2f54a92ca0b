use std::path::Path;
use std::process::Command;

use limsmeta::config::DeployConfig;
use limsmeta::deploy::{DeployMode, Manifest, PublishPlan, prepare_bundle, sha256_file};
use limsmeta::errors::LimsError;
use tempfile::TempDir;

const LOCK: &str = r#"
version = 4

[[package]]
name = "actix-web"
version = "4.12.0"
source = "registry+https://github.com/rust-lang/crates.io-index"

[[package]]
name = "limsmeta"
version = "0.3.0"
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn bundle_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "Cargo.toml", "[package]\nname = \"limsmeta\"\n");
    write(dir.path(), "Cargo.lock", LOCK);
    write(dir.path(), "assets/styles.css", "body {}\n");
    write(dir.path(), "assets/brand.yml", "logo: nvi-logo.svg\n");
    dir
}

#[test]
fn mode_file_holds_one_of_three_literals() {
    let dir = TempDir::new().unwrap();
    for (content, mode) in [
        ("test\n", DeployMode::Test),
        ("prod", DeployMode::Prod),
        (" both \n", DeployMode::Both),
    ] {
        write(dir.path(), "deploy_mode.txt", content);
        assert_eq!(
            DeployMode::from_file(dir.path().join("deploy_mode.txt")).unwrap(),
            mode
        );
    }

    write(dir.path(), "deploy_mode.txt", "staging\n");
    assert!(matches!(
        DeployMode::from_file(dir.path().join("deploy_mode.txt")),
        Err(LimsError::DeployMode(_))
    ));

    write(dir.path(), "deploy_mode.yaml", "deploy_mode: prod\n");
    assert_eq!(
        DeployMode::from_file(dir.path().join("deploy_mode.yaml")).unwrap(),
        DeployMode::Prod
    );

    assert!(DeployMode::from_file(dir.path().join("missing.txt")).is_err());
}

#[test]
fn modes_push_to_their_branches() {
    let config = DeployConfig::default();
    let pushed = |mode| -> Vec<String> {
        PublishPlan::new(mode, &config)
            .push_commands()
            .iter()
            .map(|c| c.args[3].clone())
            .collect()
    };
    assert_eq!(pushed(DeployMode::Test), vec!["HEAD:refs/heads/test_deploy"]);
    assert_eq!(pushed(DeployMode::Prod), vec!["HEAD:refs/heads/deploy"]);
    assert_eq!(
        pushed(DeployMode::Both),
        vec!["HEAD:refs/heads/test_deploy", "HEAD:refs/heads/deploy"]
    );
}

#[test]
fn manifest_references_entrypoint() {
    let dir = bundle_dir();
    let config = DeployConfig::default();
    let manifest = prepare_bundle(dir.path(), &config).unwrap();

    assert_eq!(manifest.version, 1);
    assert_eq!(manifest.metadata.entrypoint, "limsmeta");
    assert_eq!(manifest.metadata.appmode, "rust-actix");

    let deps = std::fs::read_to_string(dir.path().join("dependencies.txt")).unwrap();
    assert_eq!(deps, "actix-web==4.12.0\n");

    let checksum = &manifest.files["dependencies.txt"].checksum;
    assert_eq!(
        checksum,
        &sha256_file(&dir.path().join("dependencies.txt")).unwrap()
    );

    let written = Manifest::read(&dir.path().join("manifest.json")).unwrap();
    assert_eq!(written, manifest);
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(json["metadata"]["entrypoint"], "limsmeta");
    assert!(json["files"]["assets/styles.css"]["checksum"].is_string());
}

#[test]
fn manifest_fails_on_missing_file() {
    let dir = bundle_dir();
    std::fs::remove_file(dir.path().join("assets/brand.yml")).unwrap();
    assert!(matches!(
        prepare_bundle(dir.path(), &DeployConfig::default()),
        Err(LimsError::FileOperation(_))
    ));
}

fn git(repo: &Path, args: &[&str]) -> std::process::Output {
    Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .expect("run git")
}

#[test]
fn publish_force_pushes_branches() {
    if Command::new("git").arg("--version").output().is_err() {
        eprintln!("git not available, skipping");
        return;
    }

    let remote = TempDir::new().unwrap();
    assert!(git(remote.path(), &["init", "--bare", "-q"]).status.success());

    let work = bundle_dir();
    let repo = work.path();
    git(repo, &["init", "-q"]);
    git(repo, &["config", "user.name", "CI"]);
    git(repo, &["config", "user.email", "ci@example.org"]);
    git(repo, &["config", "commit.gpgsign", "false"]);
    git(repo, &["add", "."]);
    assert!(git(repo, &["commit", "-q", "-m", "init"]).status.success());
    git(
        repo,
        &["remote", "add", "origin", remote.path().to_str().unwrap()],
    );

    let config = DeployConfig::default();
    prepare_bundle(repo, &config).unwrap();
    let plan = PublishPlan::new(DeployMode::Both, &config);

    let report = plan.execute(repo).unwrap();
    assert!(report.committed);
    assert_eq!(report.pushed, vec!["test_deploy", "deploy"]);

    for branch in ["test_deploy", "deploy"] {
        let out = git(
            remote.path(),
            &["rev-parse", "--verify", &format!("refs/heads/{}", branch)],
        );
        assert!(out.status.success(), "branch {} missing", branch);
    }

    // Nothing changed: no new commit, branches pushed again
    let report = plan.execute(repo).unwrap();
    assert!(!report.committed);
    assert_eq!(report.pushed.len(), 2);
}

#[test]
fn publish_stages_untracked_manifest_files() {
    if Command::new("git").arg("--version").output().is_err() {
        eprintln!("git not available, skipping");
        return;
    }

    let remote = TempDir::new().unwrap();
    assert!(git(remote.path(), &["init", "--bare", "-q"]).status.success());

    let work = bundle_dir();
    let repo = work.path();
    git(repo, &["init", "-q"]);
    git(repo, &["config", "user.name", "CI"]);
    git(repo, &["config", "user.email", "ci@example.org"]);
    git(repo, &["config", "commit.gpgsign", "false"]);
    // Cargo.lock is ignored and never committed by hand
    write(repo, ".gitignore", "Cargo.lock\n");
    git(repo, &["add", ".gitignore", "Cargo.toml", "assets"]);
    assert!(git(repo, &["commit", "-q", "-m", "init"]).status.success());
    git(
        repo,
        &["remote", "add", "origin", remote.path().to_str().unwrap()],
    );

    let config = DeployConfig::default();
    let manifest = prepare_bundle(repo, &config).unwrap();
    PublishPlan::new(DeployMode::Prod, &config)
        .execute(repo)
        .unwrap();

    let out = git(
        remote.path(),
        &["ls-tree", "-r", "--name-only", "refs/heads/deploy"],
    );
    assert!(out.status.success());
    let tree = String::from_utf8(out.stdout).unwrap();
    let tree: Vec<&str> = tree.lines().collect();

    for file in manifest.files.keys() {
        assert!(tree.contains(&file.as_str()), "deploy branch lacks {}", file);
    }
    assert!(tree.contains(&"manifest.json"));
}
