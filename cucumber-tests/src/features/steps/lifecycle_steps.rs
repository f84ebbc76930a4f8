use crate::features::world::MembershipWorld;
use cucumber::{given, then, when};
use lithair_groups::prelude::*;

#[given(expr = "groups are soft-deletable")]
async fn given_soft_deletable(world: &mut MembershipWorld) {
    world.set_soft_deletes(true);
}

#[when(expr = "I delete group {string}")]
async fn when_delete_group(world: &mut MembershipWorld, group: String) {
    let deleted = world
        .manager
        .delete_group(&MembershipWorld::group(&group))
        .await
        .expect("Failed to delete group");
    assert!(deleted, "group {} was not deleted", group);
}

#[when(expr = "I force delete group {string}")]
async fn when_force_delete_group(world: &mut MembershipWorld, group: String) {
    let deleted = world
        .manager
        .force_delete_group(&MembershipWorld::group(&group))
        .await
        .expect("Failed to force delete group");
    assert!(deleted, "group {} was not deleted", group);
}

#[when(expr = "I restore group {string}")]
async fn when_restore_group(world: &mut MembershipWorld, group: String) {
    let restored = world
        .manager
        .restore_group(&MembershipWorld::group(&group))
        .await
        .expect("Failed to restore group");
    assert!(restored, "group {} was not restored", group);
}

#[when(expr = "I rename group {string} to {string}")]
async fn when_rename_group(world: &mut MembershipWorld, group: String, name: String) {
    world
        .manager
        .save_group(&Group::new(MembershipWorld::group(&group), name))
        .await
        .expect("Failed to save group");
}

#[then(expr = "listing the roles of group {string} fails with not found")]
async fn then_list_not_found(world: &mut MembershipWorld, group: String) {
    let err = world
        .manager
        .list(&MembershipWorld::group(&group), RelationKind::Roles)
        .await
        .expect_err("group should be gone");
    assert!(err.is_not_found(), "unexpected error: {}", err);
}

#[then(expr = "group {string} still has {int} users")]
async fn then_still_has_users(world: &mut MembershipWorld, group: String, count: usize) {
    assert_eq!(world.listed(&group, RelationKind::Users).await.len(), count);
}

#[then(expr = "the store holds no relations")]
async fn then_no_relations(world: &mut MembershipWorld) {
    assert_eq!(world.store.edge_count().await, 0);
}
