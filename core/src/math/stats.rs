/// Nearest-neighbour helpers over non-uniformly sampled axes.
///
/// NaN samples never win a comparison. Ties resolve to the lowest index.
pub struct StatsHelper;

impl StatsHelper {
    /// Smallest `|value - target|`; infinite for an empty axis.
    pub fn min_abs_distance(values: &[f64], target: f64) -> f64 {
        values
            .iter()
            .map(|&value| (value - target).abs())
            .fold(f64::INFINITY, f64::min)
    }

    pub fn argmin_abs_distance(values: &[f64], target: f64) -> Option<usize> {
        Self::argmin(values.iter().map(|&value| (value - target).abs()))
    }

    /// Index minimising `|a_i - a_target| + |b_i - b_target|` over paired axes.
    pub fn argmin_combined(a: &[f64], a_target: f64, b: &[f64], b_target: f64) -> Option<usize> {
        Self::argmin(
            a.iter()
                .zip(b)
                .map(|(&ai, &bi)| (ai - a_target).abs() + (bi - b_target).abs()),
        )
    }

    fn argmin(distances: impl Iterator<Item = f64>) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, distance) in distances.enumerate() {
            if distance.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, current)| distance < current) {
                best = Some((idx, distance));
            }
        }
        best.map(|(idx, _)| idx)
    }
}
