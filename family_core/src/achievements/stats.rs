//! Summary statistics over unlocked achievements.

use family_rules::{AchievementCategory, AchievementStats, CategoryProgress, UnlockedAchievement};
use std::collections::{BTreeMap, HashSet};
use tracing::warn;

use super::catalog::Achievement;

/// Most recent unlocks kept in the stats block.
pub const RECENT_UNLOCKS: usize = 5;

/// Compute statistics from the unlock records alone.
///
/// Unlocks naming an achievement missing from `catalog` are ignored, as are
/// repeated ids after the first.
pub fn calculate_stats(catalog: &[Achievement], unlocked: &[UnlockedAchievement]) -> AchievementStats {
    let mut category_progress: BTreeMap<AchievementCategory, CategoryProgress> = AchievementCategory::ALL
        .iter()
        .map(|category| (*category, CategoryProgress::default()))
        .collect();
    for achievement in catalog {
        category_progress.entry(achievement.category).or_default().total += 1;
    }

    let mut stats = AchievementStats {
        achievements_available: catalog.len(),
        ..AchievementStats::default()
    };
    let mut seen = HashSet::new();
    let mut counted = Vec::new();

    for unlock in unlocked {
        if !seen.insert(unlock.achievement_id.as_str()) {
            continue;
        }
        let Some(achievement) = catalog.iter().find(|a| a.id == unlock.achievement_id) else {
            warn!(achievement = %unlock.achievement_id, "unlock for unknown achievement");
            continue;
        };

        stats.total_points += achievement.points;
        stats.achievements_unlocked += 1;
        *stats.rarity_breakdown.entry(achievement.rarity).or_default() += 1;
        let category = category_progress.entry(achievement.category).or_default();
        category.unlocked += 1;
        category.points += achievement.points;
        counted.push(unlock);
    }

    // Later records win ties on timestamp.
    counted.reverse();
    counted.sort_by(|a, b| b.unlocked_at.cmp(&a.unlocked_at));
    stats.recent_unlocks = counted
        .into_iter()
        .take(RECENT_UNLOCKS)
        .cloned()
        .collect();
    stats.category_progress = category_progress;
    stats
}
