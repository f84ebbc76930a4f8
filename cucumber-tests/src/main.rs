use cucumber::{cli, World};
use cucumber_tests::features::MembershipWorld;

#[tokio::main]
async fn main() {
    MembershipWorld::cucumber()
        .with_cli::<()>(cli::Opts::parsed())
        .run_and_exit("features/")
        .await;
}
