//! Build script for slcheck
//!
//! Embeds build-time information (git commit, dirty status, build timestamp)
//! shown in verbose logs and stamped into JSON reports.

fn main() {
    shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build info");
}
