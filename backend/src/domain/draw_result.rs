//! Lottery draw results.
//!
//! A [`DrawResult`] records one contest: the drawn numbers, the prize table
//! and the announcement for the next contest. Results arrive as
//! [`DrawResultDraft`] values and receive an id and timestamps on ingestion.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::DomainError;

/// Validation errors raised while accepting a draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawResultValidationError {
    #[error("contest number must be positive")]
    ZeroContest,
    #[error("drawn numbers must not be empty")]
    NoNumbers,
    #[error("drawn number `{0}` is blank or repeated")]
    InvalidNumber(String),
    #[error("prize tier `{0}` must have a finite, non-negative prize")]
    InvalidPrize(String),
    #[error("draw date `{0}` is neither YYYY-MM-DD nor RFC 3339")]
    InvalidDrawDate(String),
}

impl From<DrawResultValidationError> for DomainError {
    fn from(value: DrawResultValidationError) -> Self {
        DomainError::validation(value.to_string())
    }
}

/// Winners and payout for one prize tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrizeTier {
    pub winners: u32,
    pub prize: f64,
}

/// Incoming result, as published by the lottery operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResultDraft {
    pub contest: u32,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub draw_date: String,
    pub numbers: Vec<String>,
    pub prizes: BTreeMap<String, PrizeTier>,
    pub accumulated: bool,
    pub next_contest_estimate: f64,
    pub next_contest_date: String,
    pub next_contest: u32,
    pub lucky_team: String,
    pub lucky_month: String,
}

/// Stored draw result.
///
/// ## Invariants
/// - `numbers` is non-empty, sorted and free of duplicates; it is stored as a
///   string set.
/// - `contest` is positive and identifies the draw within the lottery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub id: String,
    pub contest: u32,
    pub draw_date: DateTime<Utc>,
    pub numbers: Vec<String>,
    pub prizes: BTreeMap<String, PrizeTier>,
    pub accumulated: bool,
    pub next_contest_estimate: f64,
    pub next_contest_date: String,
    pub next_contest: u32,
    pub lucky_team: String,
    pub lucky_month: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DrawResult {
    /// Accept a draft, assigning `id` and stamping both timestamps with `now`.
    ///
    /// # Examples
    /// ```
    /// use std::collections::BTreeMap;
    /// use chrono::Utc;
    /// use lottery_backend::domain::{DrawResult, DrawResultDraft};
    ///
    /// let draft = DrawResultDraft {
    ///     contest: 1,
    ///     draw_date: "2024-01-01".into(),
    ///     numbers: vec!["02".into(), "01".into()],
    ///     prizes: BTreeMap::new(),
    ///     accumulated: false,
    ///     next_contest_estimate: 0.0,
    ///     next_contest_date: "2024-01-03".into(),
    ///     next_contest: 2,
    ///     lucky_team: String::new(),
    ///     lucky_month: String::new(),
    /// };
    /// let result = DrawResult::from_draft(draft, "r-1".into(), Utc::now()).expect("valid");
    /// assert_eq!(result.numbers, ["01", "02"]);
    /// ```
    pub fn from_draft(
        draft: DrawResultDraft,
        id: String,
        now: DateTime<Utc>,
    ) -> Result<Self, DrawResultValidationError> {
        if draft.contest == 0 {
            return Err(DrawResultValidationError::ZeroContest);
        }
        let numbers = validate_numbers(draft.numbers)?;
        if let Some((tier, _)) = draft
            .prizes
            .iter()
            .find(|(_, tier)| !tier.prize.is_finite() || tier.prize < 0.0)
        {
            return Err(DrawResultValidationError::InvalidPrize(tier.clone()));
        }
        let draw_date = parse_draw_date(&draft.draw_date)?;

        Ok(Self {
            id,
            contest: draft.contest,
            draw_date,
            numbers,
            prizes: draft.prizes,
            accumulated: draft.accumulated,
            next_contest_estimate: draft.next_contest_estimate,
            next_contest_date: draft.next_contest_date,
            next_contest: draft.next_contest,
            lucky_team: draft.lucky_team,
            lucky_month: draft.lucky_month,
            created_at: now,
            updated_at: now,
        })
    }
}

fn validate_numbers(numbers: Vec<String>) -> Result<Vec<String>, DrawResultValidationError> {
    if numbers.is_empty() {
        return Err(DrawResultValidationError::NoNumbers);
    }
    let mut seen = BTreeSet::new();
    for number in numbers {
        if number.trim().is_empty() || seen.contains(&number) {
            return Err(DrawResultValidationError::InvalidNumber(number));
        }
        seen.insert(number);
    }
    Ok(seen.into_iter().collect())
}

/// Parse a plain calendar date as midnight UTC, or a full RFC 3339 timestamp.
pub fn parse_draw_date(raw: &str) -> Result<DateTime<Utc>, DrawResultValidationError> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DrawResultValidationError::InvalidDrawDate(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> DrawResultDraft {
        let mut prizes = BTreeMap::new();
        prizes.insert(
            "fifteen".to_owned(),
            PrizeTier {
                winners: 1,
                prize: 1_000_000.0,
            },
        );
        prizes.insert(
            "eleven".to_owned(),
            PrizeTier {
                winners: 10_000,
                prize: 6.0,
            },
        );
        DrawResultDraft {
            contest: 3_000,
            draw_date: "2024-01-01".to_owned(),
            numbers: ["15", "03", "07"].map(str::to_owned).to_vec(),
            prizes,
            accumulated: false,
            next_contest_estimate: 1_700_000.0,
            next_contest_date: "2024-01-03".to_owned(),
            next_contest: 3_001,
            lucky_team: "Lucky FC".to_owned(),
            lucky_month: "January".to_owned(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[rstest]
    fn accepted_drafts_are_stamped_and_sorted(draft: DrawResultDraft) {
        let result = DrawResult::from_draft(draft, "id-1".into(), now()).expect("valid draft");
        assert_eq!(result.id, "id-1");
        assert_eq!(result.numbers, ["03", "07", "15"]);
        assert_eq!(result.created_at, now());
        assert_eq!(result.updated_at, now());
        assert_eq!(
            result.draw_date,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("valid")
        );
    }

    #[rstest]
    fn zero_contest_is_rejected(mut draft: DrawResultDraft) {
        draft.contest = 0;
        assert_eq!(
            DrawResult::from_draft(draft, "id".into(), now()).expect_err("invalid"),
            DrawResultValidationError::ZeroContest
        );
    }

    #[rstest]
    #[case(vec![], DrawResultValidationError::NoNumbers)]
    #[case(vec!["01", "01"], DrawResultValidationError::InvalidNumber("01".into()))]
    #[case(vec!["01", " "], DrawResultValidationError::InvalidNumber(" ".into()))]
    fn numbers_must_be_unique_and_present(
        mut draft: DrawResultDraft,
        #[case] numbers: Vec<&str>,
        #[case] expected: DrawResultValidationError,
    ) {
        draft.numbers = numbers.into_iter().map(str::to_owned).collect();
        assert_eq!(
            DrawResult::from_draft(draft, "id".into(), now()).expect_err("invalid"),
            expected
        );
    }

    #[rstest]
    fn negative_prizes_are_rejected(mut draft: DrawResultDraft) {
        draft.prizes.insert(
            "twelve".into(),
            PrizeTier {
                winners: 1,
                prize: -1.0,
            },
        );
        assert_eq!(
            DrawResult::from_draft(draft, "id".into(), now()).expect_err("invalid"),
            DrawResultValidationError::InvalidPrize("twelve".into())
        );
    }

    #[rstest]
    #[case("2024-01-01T12:30:00Z", true)]
    #[case("2024-01-01T12:30:00.000-03:00", true)]
    #[case("2024-01-01", true)]
    #[case("01/01/2024", false)]
    fn draw_dates(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_draw_date(raw).is_ok(), ok);
    }

    #[rstest]
    fn drafts_read_camel_case_json() {
        let draft: DrawResultDraft = serde_json::from_value(serde_json::json!({
            "contest": 1,
            "drawDate": "2024-01-01",
            "numbers": ["01"],
            "prizes": { "fifteen": { "winners": 1, "prize": 10.5 } },
            "accumulated": true,
            "nextContestEstimate": 100.0,
            "nextContestDate": "2024-01-03",
            "nextContest": 2,
            "luckyTeam": "Team",
            "luckyMonth": "May"
        }))
        .expect("valid draft json");
        assert!(draft.accumulated);
        assert_eq!(draft.prizes["fifteen"].winners, 1);
    }
}
