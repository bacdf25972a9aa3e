//! Namespace enumeration, mount listing, token counting, and handle scoping.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use common::{FakeVault, Reply};
use vault_usage_core::error::VaultUsageError;
use vault_usage_core::MountKind;
use vault_usage_exporter::collector::inventory::{
    count_tokens, list_auth_methods, list_namespaces, list_secret_engines,
};
use vault_usage_exporter::vault::{scoped, VaultApi};

#[tokio::test]
async fn namespaces_start_with_root_exactly_once() {
    let api = FakeVault::new().keys(
        "root",
        "sys/namespaces",
        &["team-a/", "root/", "team-b/", "team-a/", "/"],
    );
    assert_eq!(
        list_namespaces(&api).await.unwrap(),
        vec!["root", "team-a", "team-b"]
    );
}

#[tokio::test]
async fn namespaces_not_found_means_root_only() {
    let api = FakeVault::new();
    assert_eq!(list_namespaces(&api).await.unwrap(), vec!["root"]);
}

#[tokio::test]
async fn namespace_errors_propagate() {
    let api = FakeVault::new().reply("root", "sys/namespaces", Reply::Fail(503));
    assert!(list_namespaces(&api).await.is_err());

    // 403 is not the "feature disabled" signal for namespaces
    let api = FakeVault::new().reply("root", "sys/namespaces", Reply::Forbidden);
    assert!(matches!(
        list_namespaces(&api).await,
        Err(VaultUsageError::Forbidden(_))
    ));
}

#[tokio::test]
async fn engines_are_normalized_records() {
    let api = FakeVault::new()
        .mounts("team-a", MountKind::Secret, &[("kv/", "kv"), ("transit/", "transit")]);

    let engines = list_secret_engines(&api, "team-a").await.unwrap();
    assert_eq!(engines.len(), 2);
    assert_eq!(engines[0].name, "kv");
    assert_eq!(engines[0].path, "kv/");
    assert_eq!(engines[0].engine_type, "kv");
    assert_eq!(engines[1].namespace, "team-a");
    assert_eq!(api.calls_to("team-a", "sys/mounts"), 1);
}

#[tokio::test]
async fn empty_namespace_is_reported_as_root() {
    let api = FakeVault::new().mounts("root", MountKind::Auth, &[("token/", "token")]);
    let methods = list_auth_methods(&api, "").await.unwrap();
    assert_eq!(methods[0].namespace, "root");
}

#[tokio::test]
async fn mount_not_found_is_empty_but_forbidden_is_error() {
    let api = FakeVault::new().reply("root", "sys/auth", Reply::Forbidden);
    assert!(list_secret_engines(&api, "root").await.unwrap().is_empty());
    assert!(list_auth_methods(&api, "root").await.is_err());
}

#[tokio::test]
async fn tokens_count_accessors() {
    let api = FakeVault::new()
        .keys("root", "auth/token/accessors", &["a", "b"])
        .reply("team-a", "auth/token/accessors", Reply::Forbidden)
        .reply("team-b", "auth/token/accessors", Reply::Fail(500));

    assert_eq!(count_tokens(&api, "root").await.unwrap(), 2);
    assert_eq!(count_tokens(&api, "team-a").await.unwrap(), 0);
    assert_eq!(count_tokens(&api, "missing").await.unwrap(), 0);
    assert!(count_tokens(&api, "team-b").await.is_err());
}

#[tokio::test]
async fn scoped_handles_do_not_bleed() {
    let api = FakeVault::new();
    assert!(scoped(&api, "root").namespace().is_none());
    assert!(scoped(&api, "").namespace().is_none());

    let a = scoped(&api, "team-a");
    let b = scoped(&api, "team-b");
    assert_eq!(a.namespace(), Some("team-a"));
    assert_eq!(b.namespace(), Some("team-b"));
    assert!(api.namespace().is_none());
}

#[tokio::test]
async fn interleaved_namespace_calls_stay_scoped() {
    let api = FakeVault::new()
        .mounts("team-a", MountKind::Secret, &[("a/", "kv")])
        .mounts("team-b", MountKind::Secret, &[("b/", "kv")])
        .reply("team-c", "sys/mounts", Reply::Fail(500));

    let (a, b, c) = tokio::join!(
        list_secret_engines(&api, "team-a"),
        list_secret_engines(&api, "team-b"),
        list_secret_engines(&api, "team-c"),
    );
    assert!(c.is_err());
    assert_eq!(a.unwrap()[0].name, "a");
    assert_eq!(b.unwrap()[0].name, "b");

    // a later root call must not inherit any namespace from the failed one
    let root = list_secret_engines(&api, "root").await.unwrap();
    assert!(root.is_empty());
    assert_eq!(api.calls_to("root", "sys/mounts"), 1);
}
