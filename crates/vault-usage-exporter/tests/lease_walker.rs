//! Lease key-space walk.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use common::{FakeVault, Reply};
use vault_usage_core::error::VaultUsageError;
use vault_usage_exporter::collector::leases::count_leases;

#[tokio::test]
async fn counts_every_leaf_once_and_lists_each_prefix_once() {
    let api = FakeVault::new()
        .keys("root", "sys/leases/lookup/", &["auth/", "database/", "l1"])
        .keys("root", "sys/leases/lookup/auth/", &["token/", "l2"])
        .keys("root", "sys/leases/lookup/auth/token/", &["create/"])
        .keys("root", "sys/leases/lookup/auth/token/create/", &["a", "b", "c"])
        .keys("root", "sys/leases/lookup/database/", &["creds/"])
        .keys("root", "sys/leases/lookup/database/creds/", &["x"]);

    assert_eq!(count_leases(&api, "root").await.unwrap(), 6);

    let calls = api.calls();
    assert_eq!(calls.len(), 6);
    for (_, path) in &calls {
        assert_eq!(api.calls_to("root", path), 1, "prefix listed twice: {path}");
    }
}

#[tokio::test]
async fn duplicate_prefixes_are_visited_once() {
    let api = FakeVault::new()
        .keys("root", "sys/leases/lookup/", &["a/", "a/", "leaf"])
        .keys("root", "sys/leases/lookup/a/", &["x"]);

    assert_eq!(count_leases(&api, "root").await.unwrap(), 2);
    assert_eq!(api.calls_to("root", "sys/leases/lookup/a/"), 1);
}

#[tokio::test]
async fn forbidden_subtree_zeroes_whole_namespace() {
    let api = FakeVault::new()
        .keys("root", "sys/leases/lookup/", &["auth/", "z/", "l1", "l2"])
        .reply("root", "sys/leases/lookup/auth/", Reply::Forbidden)
        .keys("root", "sys/leases/lookup/z/", &["l3"]);

    assert_eq!(count_leases(&api, "root").await.unwrap(), 0);
    // the walk stops at the first forbidden listing
    assert_eq!(api.calls_to("root", "sys/leases/lookup/z/"), 0);
}

#[tokio::test]
async fn missing_lease_root_is_zero() {
    let api = FakeVault::new();
    assert_eq!(count_leases(&api, "root").await.unwrap(), 0);
}

#[tokio::test]
async fn backend_errors_propagate() {
    let api = FakeVault::new()
        .keys("root", "sys/leases/lookup/", &["auth/"])
        .reply("root", "sys/leases/lookup/auth/", Reply::Fail(500));

    let err = count_leases(&api, "root").await.unwrap_err();
    assert!(matches!(err, VaultUsageError::Status { status: 500, .. }));
}

#[tokio::test]
async fn walk_runs_in_the_requested_namespace() {
    let api = FakeVault::new()
        .keys("team-a", "sys/leases/lookup/", &["k/"])
        .keys("team-a", "sys/leases/lookup/k/", &["1", "2"])
        .keys("root", "sys/leases/lookup/", &["other"]);

    assert_eq!(count_leases(&api, "team-a").await.unwrap(), 2);
    assert!(api.calls().iter().all(|(ns, _)| ns == "team-a"));
}

#[tokio::test]
async fn deep_tree_does_not_recurse() {
    let depth = 500;
    let mut api = FakeVault::new();
    let mut prefix = String::new();
    for level in 0..depth {
        let keys: &[&str] = if level + 1 < depth { &["n/", "leaf"] } else { &["leaf"] };
        api = api.keys("root", &format!("sys/leases/lookup/{prefix}"), keys);
        prefix.push_str("n/");
    }

    assert_eq!(count_leases(&api, "root").await.unwrap(), depth as u64);
}
