//! Session cleanup
//!
//! Logs out of every registry host the run logged in to. Runs on every
//! terminal path once a login happened.

use colored::Colorize;
use futures_util::future::join_all;
use shipyard_container::DockerCli;
use shipyard_core::workflow;

/// `docker logout` every host concurrently. Failures are warnings only.
pub async fn logout_all(docker: &DockerCli, hosts: &[String]) {
    if hosts.is_empty() {
        return;
    }

    let results = join_all(
        hosts
            .iter()
            .map(|host| async move { (host, docker.logout(host).await) }),
    )
    .await;

    for (host, result) in results {
        match result {
            Ok(()) => println!("{} Logged out of {}", "✓".green(), host),
            Err(e) => workflow::warning(&format!("Could not log out of {}: {}", host, e)),
        }
    }
}
