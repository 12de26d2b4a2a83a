use chrono::{TimeZone, Utc};

/// Build metadata embedded by `build.rs`.
pub fn version_info() -> String {
    let git_hash = option_env!("GIT_HASH").unwrap_or("unknown");
    let git_branch = option_env!("GIT_BRANCH").unwrap_or("unknown");
    let git_tag = option_env!("GIT_TAG").unwrap_or("unknown");
    let build_time = human_build_time(option_env!("BUILD_TIME").unwrap_or("unknown"));

    format!(
        "inspector {}\nBranch:     {}\nTag:        {}\nCommit:     {}\nBuild time: {}",
        env!("CARGO_PKG_VERSION"),
        git_branch,
        git_tag,
        git_hash,
        build_time
    )
}

/// Epoch seconds as a UTC timestamp; anything else is returned unchanged.
fn human_build_time(raw: &str) -> String {
    raw.parse::<i64>()
        .ok()
        .and_then(|epoch| Utc.timestamp_opt(epoch, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| raw.to_string())
}
