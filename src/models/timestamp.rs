//! 백엔드가 내려주는 시각 문자열을 `DateTime<Utc>`로 변환합니다.
//!
//! RFC 3339(`2024-05-01T12:00:00Z`, `+09:00` 등)와 시간대가 없는
//! `2024-05-01T12:00:00.123456` 형식을 모두 받으며, 후자는 UTC로 간주합니다.
//! 직렬화는 항상 RFC 3339로 합니다.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accepts_rfc3339_and_naive() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(parse("2024-05-01T12:00:00Z"), Some(expected));
        assert_eq!(parse("2024-05-01T21:00:00+09:00"), Some(expected));
        assert_eq!(parse("2024-05-01T12:00:00"), Some(expected));
        assert_eq!(parse("2024-05-01 12:00:00.000"), Some(expected));
        assert_eq!(parse("yesterday"), None);
    }
}
