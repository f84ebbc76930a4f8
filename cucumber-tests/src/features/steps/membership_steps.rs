use crate::features::world::{split, MembershipWorld};
use cucumber::{given, then, when};
use lithair_groups::prelude::*;
use std::collections::HashSet;

// ==================== BACKGROUND ====================

#[given(expr = "the roles {string} exist")]
async fn given_roles_exist(world: &mut MembershipWorld, names: String) {
    for name in split(&names) {
        world.store.put_role(Role::new(name.as_str(), name.as_str())).await;
    }
}

#[given(expr = "the users {string} exist")]
async fn given_users_exist(world: &mut MembershipWorld, ids: String) {
    for id in split(&ids) {
        let id: u64 = id.parse().expect("user ids are integers");
        world.store.put_user(User::new(id)).await;
    }
}

#[given(expr = "a group {string}")]
async fn given_group(world: &mut MembershipWorld, name: String) {
    world.create_group(&name).await;
}

#[given(expr = "a group {string} with roles {string}")]
async fn given_group_with_roles(world: &mut MembershipWorld, name: String, roles: String) {
    world.create_group(&name).await;
    world
        .manager
        .attach_roles(&MembershipWorld::group(&name), MembershipWorld::role_ids(&roles))
        .await
        .expect("Failed to attach roles");
}

#[given(expr = "user {int} is a member of group {string}")]
async fn given_member(world: &mut MembershipWorld, user: u64, group: String) {
    world
        .manager
        .attach_user(&MembershipWorld::group(&group), user)
        .await
        .expect("Failed to attach user");
}

#[given(expr = "the views of group {string} are cached")]
async fn given_group_views_cached(world: &mut MembershipWorld, group: String) {
    let group = MembershipWorld::group(&group);
    world.evaluator().cached_roles(&group).await.expect("Failed to load roles");
    world.evaluator().cached_users(&group).await.expect("Failed to load users");
}

#[given(expr = "the groups of user {int} are cached")]
async fn given_user_groups_cached(world: &mut MembershipWorld, user: u64) {
    world
        .evaluator()
        .cached_groups(&EntityId::from(user))
        .await
        .expect("Failed to load groups");
}

// ==================== ROLES ====================

#[when(expr = "I attach roles {string} to group {string}")]
async fn when_attach_roles(world: &mut MembershipWorld, roles: String, group: String) {
    let result = world
        .manager
        .attach_roles(&MembershipWorld::group(&group), MembershipWorld::role_ids(&roles))
        .await;
    world.last_error = result.err();
}

#[when(expr = "I detach role {string} from group {string}")]
async fn when_detach_role(world: &mut MembershipWorld, role: String, group: String) {
    world
        .manager
        .detach_role(&MembershipWorld::group(&group), role.as_str())
        .await
        .expect("Failed to detach role");
}

#[when(expr = "I detach all roles from group {string}")]
async fn when_detach_all_roles(world: &mut MembershipWorld, group: String) {
    world
        .manager
        .detach_roles::<EntityId>(&MembershipWorld::group(&group), None)
        .await
        .expect("Failed to detach roles");
}

#[when(expr = "I sync the roles of group {string} to {string}")]
async fn when_sync_roles(world: &mut MembershipWorld, group: String, roles: String) {
    world
        .manager
        .save_roles(&MembershipWorld::group(&group), MembershipWorld::role_ids(&roles))
        .await
        .expect("Failed to sync roles");
}

#[then(expr = "group {string} has all of roles {string}")]
async fn then_has_all_roles(world: &mut MembershipWorld, group: String, roles: String) {
    let ok = world
        .evaluator()
        .has_role(&MembershipWorld::group(&group), split(&roles), true)
        .await
        .expect("has_role failed");
    assert!(ok, "group {} should have all of {}", group, roles);
}

#[then(expr = "group {string} does not have all of roles {string}")]
async fn then_lacks_some_role(world: &mut MembershipWorld, group: String, roles: String) {
    let ok = world
        .evaluator()
        .has_role(&MembershipWorld::group(&group), split(&roles), true)
        .await
        .expect("has_role failed");
    assert!(!ok, "group {} should miss one of {}", group, roles);
}

#[then(expr = "group {string} has any of roles {string}")]
async fn then_has_any_role(world: &mut MembershipWorld, group: String, roles: String) {
    let ok = world
        .evaluator()
        .has_role(&MembershipWorld::group(&group), split(&roles), false)
        .await
        .expect("has_role failed");
    assert!(ok, "group {} should have one of {}", group, roles);
}

#[then(expr = "group {string} has none of roles {string}")]
async fn then_has_no_role(world: &mut MembershipWorld, group: String, roles: String) {
    let ok = world
        .evaluator()
        .has_role(&MembershipWorld::group(&group), split(&roles), false)
        .await
        .expect("has_role failed");
    assert!(!ok, "group {} should have none of {}", group, roles);
}

#[then(expr = "group {string} lists exactly roles {string}")]
async fn then_lists_roles(world: &mut MembershipWorld, group: String, roles: String) {
    let expected: HashSet<EntityId> = MembershipWorld::role_ids(&roles).into_iter().collect();
    assert_eq!(world.listed(&group, RelationKind::Roles).await, expected);
}

#[then(expr = "group {string} lists role {string} once")]
async fn then_lists_role_once(world: &mut MembershipWorld, group: String, role: String) {
    let ids = world
        .manager
        .list(&MembershipWorld::group(&group), RelationKind::Roles)
        .await
        .expect("Failed to list roles");
    let role = EntityId::from(role);
    assert_eq!(ids.iter().filter(|id| **id == role).count(), 1);
}

// ==================== USERS ====================

#[when(expr = "I attach user {int} to group {string}")]
async fn when_attach_user(world: &mut MembershipWorld, user: u64, group: String) {
    world
        .manager
        .attach_user(&MembershipWorld::group(&group), user)
        .await
        .expect("Failed to attach user");
}

#[when(expr = "I detach user {int} from group {string}")]
async fn when_detach_user(world: &mut MembershipWorld, user: u64, group: String) {
    world
        .manager
        .detach_user(&MembershipWorld::group(&group), user)
        .await
        .expect("Failed to detach user");
}

#[then(expr = "group {string} has user {int}")]
async fn then_has_user(world: &mut MembershipWorld, group: String, user: u64) {
    let ok = world
        .evaluator()
        .has_user(&MembershipWorld::group(&group), user, false)
        .await
        .expect("has_user failed");
    assert!(ok, "user {} should be in group {}", user, group);
}

#[then(expr = "group {string} does not have user {int}")]
async fn then_lacks_user(world: &mut MembershipWorld, group: String, user: u64) {
    let ok = world
        .evaluator()
        .has_user(&MembershipWorld::group(&group), user, false)
        .await
        .expect("has_user failed");
    assert!(!ok, "user {} should not be in group {}", user, group);
}

#[then(expr = "user {int} belongs to group {string}")]
async fn then_belongs(world: &mut MembershipWorld, user: u64, group: String) {
    let ok = world
        .evaluator()
        .has_group(&EntityId::from(user), group.as_str(), false)
        .await
        .expect("has_group failed");
    assert!(ok, "user {} should belong to {}", user, group);
}

#[then(expr = "user {int} does not belong to group {string}")]
async fn then_does_not_belong(world: &mut MembershipWorld, user: u64, group: String) {
    let ok = world
        .evaluator()
        .has_group(&EntityId::from(user), group.as_str(), false)
        .await
        .expect("has_group failed");
    assert!(!ok, "user {} should not belong to {}", user, group);
}

// ==================== ERRORS ====================

#[then(expr = "the last operation failed with not found")]
async fn then_last_not_found(world: &mut MembershipWorld) {
    let err = world.last_error.take().expect("expected an error");
    assert!(err.is_not_found(), "unexpected error: {}", err);
}
