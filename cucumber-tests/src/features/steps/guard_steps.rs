use crate::features::world::MembershipWorld;
use bytes::Bytes;
use cucumber::{then, when};
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use lithair_groups::prelude::*;

async fn request_page(world: &mut MembershipWorld, user: Option<u64>, groups: &str) {
    let guard = GroupGuard::new(world.evaluator().clone(), groups);

    let mut req = Request::builder()
        .uri("/admin")
        .body(Full::new(Bytes::new()))
        .expect("Failed to build request");
    if let Some(id) = user {
        req.extensions_mut().insert(Principal(EntityId::from(id)));
    }

    let response = guard
        .handle(req, |_req| async { Response::new(Full::new(Bytes::from_static(b"welcome"))) })
        .await;
    let status = response.status();
    let body = response.into_body().collect().await.expect("body").to_bytes();
    if status == StatusCode::FORBIDDEN {
        assert!(body.is_empty(), "deny response must have an empty body");
    }
    world.last_status = Some(status);
}

#[when(expr = "user {int} requests a page guarded by {string}")]
async fn when_user_requests(world: &mut MembershipWorld, user: u64, groups: String) {
    request_page(world, Some(user), &groups).await;
}

#[when(expr = "a guest requests a page guarded by {string}")]
async fn when_guest_requests(world: &mut MembershipWorld, groups: String) {
    request_page(world, None, &groups).await;
}

#[then(expr = "the response status is {int}")]
async fn then_status(world: &mut MembershipWorld, status: u16) {
    assert_eq!(world.last_status.map(|s| s.as_u16()), Some(status));
}
