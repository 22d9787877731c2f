// Paths to team badge images shipped alongside the binary.

use std::path::{Path, PathBuf};

/// Path to a team's badge image: `<image_dir>/<team>.png`.
///
/// The file is looked up by the team name exactly as stored in the match
/// table; callers should check existence before displaying the path.
pub fn badge_path(image_dir: &str, team: &str) -> PathBuf {
    Path::new(image_dir).join(format!("{team}.png"))
}
