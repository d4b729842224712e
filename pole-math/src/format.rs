//! Sexagesimal formatting for log and console output.

/// Truncate-with-carry split into whole, minutes and seconds.
///
/// Half an arcsecond is folded in at each rung before truncating, so a
/// value just shy of a whole unit carries up instead of rendering as
/// `59' 60"`.
fn split_sexagesimal(magnitude: f64) -> (i64, i64, i64) {
    let mut remainder = magnitude;
    let whole = (remainder + 0.5 / 3600.0).trunc();
    remainder -= whole;
    remainder *= 60.0;
    let minutes = (remainder + 0.5 / 60.0).trunc();
    remainder -= minutes;
    remainder *= 60.0;
    let seconds = (remainder + 0.5).trunc();
    (whole as i64, minutes as i64, seconds as i64)
}

/// Render an angle in degrees as `D° M' S"`, rounded to the nearest
/// arcsecond.
pub fn format_degrees(angle_degrees: f64) -> String {
    let sign = if angle_degrees < 0.0 { "-" } else { "" };
    let (degrees, minutes, seconds) = split_sexagesimal(angle_degrees.abs());
    format!("{sign}{degrees}\u{b0} {minutes}' {seconds}\"")
}

/// Render an hour angle as `Hh M' S"`, rounded to the nearest second.
pub fn format_hours(angle_hours: f64) -> String {
    let sign = if angle_hours < 0.0 { "-" } else { "" };
    let (hours, minutes, seconds) = split_sexagesimal(angle_hours.abs());
    format!("{sign}{hours}h {minutes}' {seconds}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_degrees() {
        assert_eq!(format_degrees(0.0), "0\u{b0} 0' 0\"");
        assert_eq!(format_degrees(41.0), "41\u{b0} 0' 0\"");
        assert_eq!(format_degrees(-2.0), "-2\u{b0} 0' 0\"");
    }

    #[test]
    fn fractions_round_to_nearest_arcsecond() {
        assert_eq!(format_degrees(12.5), "12\u{b0} 30' 0\"");
        assert_eq!(format_degrees(0.25 + 10.4 / 3600.0), "0\u{b0} 15' 10\"");
        assert_eq!(format_degrees(0.25 + 10.6 / 3600.0), "0\u{b0} 15' 11\"");
    }

    #[test]
    fn near_whole_values_carry_up() {
        // Rounding must never render sixty seconds or sixty minutes.
        assert_eq!(format_degrees(1.0 - 0.4 / 3600.0), "1\u{b0} 0' 0\"");
        assert_eq!(format_degrees(0.9999), "1\u{b0} 0' 0\"");
        assert_eq!(
            format_degrees(45.0 + 59.0 / 60.0 + 59.8 / 3600.0),
            "46\u{b0} 0' 0\""
        );
    }

    #[test]
    fn hour_angles() {
        assert_eq!(format_hours(3.0), "3h 0' 0\"");
        assert_eq!(format_hours(-1.5), "-1h 30' 0\"");
        assert_eq!(format_hours(23.0 + 59.0 / 60.0 + 30.0 / 3600.0), "23h 59' 30\"");
    }
}
