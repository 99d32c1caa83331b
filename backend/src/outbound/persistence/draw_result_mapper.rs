//! Stored layout of [`DrawResult`] records.
//!
//! Drawn numbers are a string set, so they come back sorted. The prize table
//! is a nested map keyed by tier.

use std::collections::BTreeMap;

use crate::domain::attribute::{Item, NativeValue, from_native, to_native};
use crate::domain::{DomainError, DrawResult, PrizeTier};

use super::item_fields::{boolean, field, float, string, strings, timestamp, unsigned};
use super::table::{ID_ATTRIBUTE, ItemMapper};

pub(crate) const CONTEST: &str = "contest";
const DRAW_DATE: &str = "drawDate";
const NUMBERS: &str = "numbers";
const PRIZES: &str = "prizes";
const ACCUMULATED: &str = "accumulated";
const NEXT_CONTEST_ESTIMATE: &str = "nextContestEstimate";
const NEXT_CONTEST_DATE: &str = "nextContestDate";
const NEXT_CONTEST: &str = "nextContest";
const LUCKY_TEAM: &str = "luckyTeam";
const LUCKY_MONTH: &str = "luckyMonth";
const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

pub(crate) struct DrawResultMapper;

impl ItemMapper for DrawResultMapper {
    type Entity = DrawResult;

    const RESOURCE: &'static str = "DrawResult";

    fn to_item(result: &DrawResult) -> Result<Item, DomainError> {
        let estimate = to_native(&result.next_contest_estimate)?;
        let entries: [(&str, NativeValue); 13] = [
            (ID_ATTRIBUTE, result.id.clone().into()),
            (CONTEST, result.contest.into()),
            (DRAW_DATE, result.draw_date.into()),
            (NUMBERS, result.numbers.clone().into()),
            (PRIZES, to_native(&result.prizes)?),
            (ACCUMULATED, result.accumulated.into()),
            (NEXT_CONTEST_ESTIMATE, estimate),
            (NEXT_CONTEST_DATE, result.next_contest_date.clone().into()),
            (NEXT_CONTEST, result.next_contest.into()),
            (LUCKY_TEAM, result.lucky_team.clone().into()),
            (LUCKY_MONTH, result.lucky_month.clone().into()),
            (CREATED_AT, result.created_at.into()),
            (UPDATED_AT, result.updated_at.into()),
        ];
        Ok(entries
            .into_iter()
            .map(|(name, value)| (name.to_owned(), value))
            .collect())
    }

    fn from_item(item: &Item) -> Result<DrawResult, DomainError> {
        let prizes: BTreeMap<String, PrizeTier> = from_native(field(item, PRIZES)?)?;
        Ok(DrawResult {
            id: string(item, ID_ATTRIBUTE)?,
            contest: unsigned(item, CONTEST)?,
            draw_date: timestamp(item, DRAW_DATE)?,
            numbers: strings(item, NUMBERS)?,
            prizes,
            accumulated: boolean(item, ACCUMULATED)?,
            next_contest_estimate: float(item, NEXT_CONTEST_ESTIMATE)?,
            next_contest_date: string(item, NEXT_CONTEST_DATE)?,
            next_contest: unsigned(item, NEXT_CONTEST)?,
            lucky_team: string(item, LUCKY_TEAM)?,
            lucky_month: string(item, LUCKY_MONTH)?,
            created_at: timestamp(item, CREATED_AT)?,
            updated_at: timestamp(item, UPDATED_AT)?,
        })
    }
}
