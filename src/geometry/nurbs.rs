//! Knot vector conversion for B-spline constructors

/// Group a knot sequence into unique knots and their multiplicities
///
/// Runs of equal consecutive values collapse into one knot whose
/// multiplicity is the run length, so `multiplicities.iter().sum()` equals
/// `knots.len()`. The relation between knot count, pole count and degree is
/// not checked here.
pub fn multiplicities(knots: &[f64]) -> (Vec<f64>, Vec<u32>) {
    let mut unique: Vec<f64> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();
    for &knot in knots {
        if unique.last() == Some(&knot) {
            if let Some(count) = counts.last_mut() {
                *count += 1;
            }
        } else {
            unique.push(knot);
            counts.push(1);
        }
    }
    (unique, counts)
}

/// Expand unique knots by their multiplicities
pub fn expand(unique: &[f64], multiplicities: &[u32]) -> Vec<f64> {
    unique
        .iter()
        .zip(multiplicities)
        .flat_map(|(&k, &m)| std::iter::repeat_n(k, m as usize))
        .collect()
}
