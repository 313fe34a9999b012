//! Text parsing for the one-wire temperature interface.
//!
//! The kernel exposes each probe as a small text report; one line carries
//! `t=` followed by the temperature in millidegrees Celsius. The core only
//! parses the text; reading the report file is the caller's job.

/// Extracts the temperature in degrees Celsius from a one-wire report.
///
/// Scans the report for the first line containing the `t=` marker and
/// parses the decimal integer that follows as millidegrees. Returns `None`
/// when no line carries a parseable reading.
pub fn parse_temperature(report: &str) -> Option<f64> {
    for line in report.lines() {
        if let Some(index) = line.find("t=") {
            let millidegrees: i32 = line[index + 2..].trim().parse().ok()?;
            return Some(f64::from(millidegrees) / 1000.0);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::parse_temperature;

    #[test]
    fn parses_the_marker_line_of_a_probe_report() {
        let report = "5c 01 4b 46 7f ff 0c 10 a4 : crc=a4 YES\n\
                      5c 01 4b 46 7f ff 0c 10 a4 t=21812\n";
        assert_eq!(parse_temperature(report), Some(21.812));
    }

    #[test]
    fn handles_sub_zero_readings() {
        assert_eq!(parse_temperature("aa bb t=-1062"), Some(-1.062));
    }

    #[test]
    fn reports_without_a_marker_yield_nothing() {
        assert_eq!(parse_temperature("5c 01 4b 46 : crc=a4 YES"), None);
        assert_eq!(parse_temperature(""), None);
    }

    #[test]
    fn unparseable_payloads_yield_nothing() {
        assert_eq!(parse_temperature("xx t=warm"), None);
    }
}
