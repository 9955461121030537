//! Binary entrypoint for the `fieldtree` command.

use std::process;

#[tokio::main]
async fn main() {
    let code = fieldtree_cli::run().await;
    process::exit(code);
}
