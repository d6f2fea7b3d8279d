//! UCAS tariff points for A-level and BTEC grades.

/// Points for a single grade, or `None` if the grade is not recognized.
///
/// A-level: A* 56, A 48, B 40, C 32, D 24, E 16, U 0.
/// BTEC: D* 56, D 24 (shared with A-level D), M 32, P 16.
pub fn grade_points(grade: &str) -> Option<u32> {
    let points = match grade.trim().to_uppercase().as_str() {
        "A*" | "D*" => 56,
        "A" => 48,
        "B" => 40,
        "C" | "M" => 32,
        "D" => 24,
        "E" | "P" => 16,
        "U" => 0,
        _ => return None,
    };
    Some(points)
}

/// Sums the UCAS points of every grade; unrecognized grades count as zero.
pub fn calculate_ucas_points<I, K, V>(grades: I) -> u32
where
    I: IntoIterator<Item = (K, V)>,
    V: AsRef<str>,
{
    grades
        .into_iter()
        .map(|(_, grade)| grade_points(grade.as_ref()).unwrap_or(0))
        .sum()
}
