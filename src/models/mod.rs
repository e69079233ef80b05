pub mod appointments;
pub mod profiles;
pub mod projects;
pub mod social_accounts;
pub mod social_posts;
pub mod testimonials;
pub mod users;

use sea_orm::prelude::DateTimeUtc;

/// Both ends set and out of order is the only invalid shape; open-ended
/// ranges are allowed.
pub fn validate_range(
    start: Option<DateTimeUtc>,
    end: Option<DateTimeUtc>,
    label: &str,
) -> Result<(), String> {
    match (start, end) {
        (Some(start), Some(end)) if end <= start => {
            Err(format!("{label} end must be after its start"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn range_rules() {
        let now = Utc::now();
        assert!(validate_range(Some(now), Some(now + Duration::minutes(30)), "slot").is_ok());
        assert!(validate_range(Some(now), None, "slot").is_ok());
        assert!(validate_range(None, Some(now), "slot").is_ok());

        let err = validate_range(Some(now), Some(now), "slot").unwrap_err();
        assert_eq!(err, "slot end must be after its start");
        assert!(validate_range(Some(now), Some(now - Duration::hours(1)), "slot").is_err());
    }
}
