//! End-to-end CLI tests for the shovel binary.

#![allow(deprecated)]

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use support::fixtures::{WRONG_PASSWORD_PAGE, album_page, guest_page};
use support::socket_guard::mock_site_or_skip;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALBUM_PATH: &str = "/user/daxda/library/albumA/images/";

fn shovel() -> Command {
    let mut cmd = Command::cargo_bin("shovel").unwrap();
    cmd.env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}

async fn mount_album(server: &MockServer) {
    let base = server.uri();
    let urls: Vec<String> = ["one", "two", "three"]
        .iter()
        .map(|name| format!("{base}/albums/{name}.jpg"))
        .collect();
    let items = [
        ("one.jpg", urls[0].as_str(), "image"),
        ("two.jpg", urls[1].as_str(), "image"),
        ("three.jpg", urls[2].as_str(), "image"),
    ];

    Mock::given(method("GET"))
        .and(path(ALBUM_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(album_page(1, &items)))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(ALBUM_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", ALBUM_PATH))
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(ALBUM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(album_page(1, &[])))
        .mount(server)
        .await;

    for name in ["one", "two", "three"] {
        Mock::given(method("GET"))
            .and(path(format!("/albums/{name}.jpg")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec()))
            .mount(server)
            .await;
    }
}

#[test]
fn test_binary_help_displays_usage() {
    shovel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download albums"))
        .stdout(predicate::str::contains("--links-only"));
}

#[test]
fn test_binary_without_input_is_usage_error() {
    shovel()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--urls"));
}

#[test]
fn test_binary_missing_input_file_exits_one() {
    let dir = TempDir::new().unwrap();
    shovel()
        .current_dir(dir.path())
        .args(["-f", "no-such-links.txt", "-o"])
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to open input file"));
}

#[test]
fn test_binary_foreign_host_links_are_skipped() {
    let dir = TempDir::new().unwrap();
    shovel()
        .current_dir(dir.path())
        .args(["-u", "http://example.com/user/x/library/", "-o"])
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("No usable links"));
}

#[tokio::test]
async fn test_binary_downloads_album() {
    let Some(server) = mock_site_or_skip().await else {
        return;
    };
    mount_album(&server).await;
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("pics");

    shovel()
        .current_dir(dir.path())
        .arg("--site-url")
        .arg(server.uri())
        .arg("-u")
        .arg(format!("{}{ALBUM_PATH}", server.uri()))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("Downloaded files: 3/3"));

    for name in ["one", "two", "three"] {
        let saved = std::fs::read(out.join(format!("{name}.jpg"))).unwrap();
        assert_eq!(saved, name.as_bytes());
    }
}

#[tokio::test]
async fn test_binary_links_only_prints_links() {
    let Some(server) = mock_site_or_skip().await else {
        return;
    };
    mount_album(&server).await;
    let dir = TempDir::new().unwrap();

    shovel()
        .current_dir(dir.path())
        .arg("--site-url")
        .arg(server.uri())
        .arg("-u")
        .arg(format!("{}{ALBUM_PATH}", server.uri()))
        .arg("--links-only")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{}/albums/two.jpg", server.uri())));

    let link_files: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("links-"))
        .collect();
    assert_eq!(link_files.len(), 1);
    let written = std::fs::read_to_string(link_files[0].path()).unwrap();
    assert_eq!(written.lines().count(), 3);
    assert!(!dir.path().join("photobucket").exists());
}

#[tokio::test]
async fn test_binary_wrong_guest_password_still_exits_zero() {
    let Some(server) = mock_site_or_skip().await else {
        return;
    };
    let album = "/user/daxda/library/private_test";
    Mock::given(method("GET"))
        .and(path(album))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(guest_page("tok", "/action/album/login")),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/action/album/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(WRONG_PASSWORD_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    shovel()
        .current_dir(dir.path())
        .arg("--site-url")
        .arg(server.uri())
        .arg("-u")
        .arg(format!("wrong@{}{album}", server.uri()))
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stderr(predicate::str::contains("invalid password"))
        .stderr(predicate::str::contains("Downloaded files: 0/0"));
}
