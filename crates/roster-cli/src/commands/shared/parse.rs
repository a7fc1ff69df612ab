use serde::de::DeserializeOwned;

/// Parse a `snake_case` enum value, accepting hyphens in place of underscores.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.replace('-', "_");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

#[cfg(test)]
mod tests {
    use roster_core::enums::RecruitmentStatus;

    use super::parse_enum;

    #[test]
    fn parses_snake_case_status() {
        let status: RecruitmentStatus =
            parse_enum("ready_to_open", "status").expect("status should parse");
        assert_eq!(status, RecruitmentStatus::ReadyToOpen);
    }

    #[test]
    fn parses_hyphenated_alias() {
        let status: RecruitmentStatus =
            parse_enum("window-open", "status").expect("status should parse");
        assert_eq!(status, RecruitmentStatus::WindowOpen);
    }

    #[test]
    fn errors_on_unknown_status() {
        let err = parse_enum::<RecruitmentStatus>("paused", "status").expect_err("should fail");
        assert!(err.to_string().contains("invalid status 'paused'"));
    }
}
