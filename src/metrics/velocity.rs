use super::types::{round2, Sprint, VelocityStat};

/// Average completed story points over the given sprints.
///
/// Sprints that completed zero (or negative) points are left out of the
/// average entirely; they cannot be told apart from sprints with missing data.
pub fn calculate_velocity<'a>(sprints: impl IntoIterator<Item = &'a Sprint>) -> VelocityStat {
    let velocities: Vec<f64> = sprints
        .into_iter()
        .map(|sprint| sprint.metrics.completed_story_points)
        .filter(|points| *points > 0.0)
        .collect();

    let average_velocity = if velocities.is_empty() {
        0.0
    } else {
        velocities.iter().sum::<f64>() / velocities.len() as f64
    };

    VelocityStat {
        average_velocity: round2(average_velocity),
        sprint_count: velocities.len(),
        velocities,
    }
}
