//! The `info` command: a read-only description of the running agent.

use crate::config::DeployConfig;

/// Lines describing the agent build, host, and configuration.
#[must_use]
pub fn report(config: &DeployConfig) -> Vec<String> {
    let availability = if config.algorithm().is_some() {
        "available"
    } else {
        "not available"
    };
    let mut lines = vec![
        format!("stagehand version: {}", env!("CARGO_PKG_VERSION")),
        format!(
            "Platform: {}/{}",
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
    ];
    lines.extend(effective_ids());
    lines.extend([
        format!("Hash algorithm: {} ({availability})", config.hash_algorithm),
        format!("Hash chunk size: {} bytes", config.hash_chunk_size),
        format!("Package directory: {}", config.package_dir),
        format!("Extract directory: {}", config.extract_dir),
        format!("Live directory: {}", config.live_dir),
    ]);
    lines
}

#[cfg(unix)]
fn effective_ids() -> Option<String> {
    // SAFETY: geteuid and getegid take no arguments and cannot fail.
    let (uid, gid) = unsafe { (libc::geteuid(), libc::getegid()) };
    Some(format!("UID:GID={uid}:{gid}"))
}

#[cfg(not(unix))]
fn effective_ids() -> Option<String> {
    None
}
