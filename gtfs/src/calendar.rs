use std::collections::{BTreeMap, BTreeSet};

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use super::ServiceID;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Calendar {
    pub services: BTreeMap<ServiceID, Service>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Service {
    pub service_id: ServiceID,
    /// None when the service is only defined by calendar_dates.txt
    pub weekly: Option<WeeklyPattern>,

    pub extra_days: BTreeSet<NaiveDate>,
    pub removed_days: BTreeSet<NaiveDate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeeklyPattern {
    pub days_of_week: DaysOfWeek,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaysOfWeek {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl Service {
    fn new(service_id: ServiceID) -> Self {
        Self {
            service_id,
            weekly: None,
            extra_days: BTreeSet::new(),
            removed_days: BTreeSet::new(),
        }
    }

    pub fn runs_on(&self, day: NaiveDate) -> bool {
        if self.extra_days.contains(&day) {
            return true;
        }
        if self.removed_days.contains(&day) {
            return false;
        }
        match self.weekly {
            Some(ref weekly) => {
                day >= weekly.start_date
                    && day <= weekly.end_date
                    && weekly.days_of_week.includes(&day)
            }
            None => false,
        }
    }

    /// Does this service have any remaining days on or after the given date? Schedules that
    /// already ended are useless to riders.
    pub fn runs_on_or_after(&self, day: NaiveDate) -> bool {
        if self.extra_days.iter().any(|x| *x >= day) {
            return true;
        }
        match self.weekly {
            Some(ref weekly) => weekly.end_date >= day,
            None => false,
        }
    }

    pub fn describe(&self) -> String {
        let weekly = match self.weekly {
            Some(ref weekly) => format!(
                "{} from {} to {}",
                weekly.days_of_week.describe(),
                weekly.start_date,
                weekly.end_date
            ),
            None => "no weekly pattern".to_string(),
        };
        format!(
            "{weekly}, {} extra days, {} removed days",
            self.extra_days.len(),
            self.removed_days.len()
        )
    }
}

impl DaysOfWeek {
    pub fn describe(&self) -> String {
        let weekdays = [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
        ]
        .into_iter()
        .filter(|x| *x)
        .count();
        let weekends = [self.saturday, self.sunday]
            .into_iter()
            .filter(|x| *x)
            .count();
        if weekdays + weekends == 7 {
            return "every day".to_string();
        }
        if weekdays == 5 && weekends == 0 {
            return "weekdays".to_string();
        }
        if weekdays == 0 && weekends == 2 {
            return "weekends".to_string();
        }
        if weekdays == 0 && weekends == 0 {
            return "never".to_string();
        }
        let mut result = String::new();
        for (day, operates) in [
            ("M", self.monday),
            ("T", self.tuesday),
            ("W", self.wednesday),
            ("Th", self.thursday),
            ("F", self.friday),
            ("Sat", self.saturday),
            ("Sun", self.sunday),
        ] {
            if operates {
                result.push_str(day);
            }
        }
        result
    }

    pub fn includes(&self, day: &NaiveDate) -> bool {
        match day.weekday() {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }
}

pub fn load<R: std::io::Read>(reader: R) -> Result<Calendar> {
    let mut calendar = Calendar::default();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        if calendar.services.contains_key(&rec.service_id) {
            bail!("Duplicate {:?}", rec.service_id);
        }
        let mut service = Service::new(rec.service_id.clone());
        service.weekly = Some(WeeklyPattern {
            days_of_week: DaysOfWeek {
                monday: rec.monday,
                tuesday: rec.tuesday,
                wednesday: rec.wednesday,
                thursday: rec.thursday,
                friday: rec.friday,
                saturday: rec.saturday,
                sunday: rec.sunday,
            },
            start_date: parse_date(&rec.start_date)?,
            end_date: parse_date(&rec.end_date)?,
        });
        calendar.services.insert(rec.service_id, service);
    }
    Ok(calendar)
}

/// Many feeds define some services purely through calendar_dates.txt, so unknown services are
/// created here rather than rejected.
pub fn load_exceptions<R: std::io::Read>(calendar: &mut Calendar, reader: R) -> Result<()> {
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: DateRecord = rec?;
        let date = parse_date(&rec.date)?;
        let service = calendar
            .services
            .entry(rec.service_id.clone())
            .or_insert_with(|| Service::new(rec.service_id));
        if rec.exception_type == 1 {
            service.extra_days.insert(date);
        } else if rec.exception_type == 2 {
            service.removed_days.insert(date);
        } else {
            bail!("Unknown exception_type {}", rec.exception_type);
        }
    }
    Ok(())
}

pub fn parse_date(x: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(x, "%Y%m%d").map_err(|err| anyhow!("bad date {x}: {err}"))
}

#[derive(Deserialize)]
struct Record {
    service_id: ServiceID,
    #[serde(deserialize_with = "parse_bool")]
    monday: bool,
    #[serde(deserialize_with = "parse_bool")]
    tuesday: bool,
    #[serde(deserialize_with = "parse_bool")]
    wednesday: bool,
    #[serde(deserialize_with = "parse_bool")]
    thursday: bool,
    #[serde(deserialize_with = "parse_bool")]
    friday: bool,
    #[serde(deserialize_with = "parse_bool")]
    saturday: bool,
    #[serde(deserialize_with = "parse_bool")]
    sunday: bool,
    start_date: String,
    end_date: String,
}

fn parse_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let n = <u8>::deserialize(d)?;
    if n == 1 {
        return Ok(true);
    }
    if n == 0 {
        return Ok(false);
    }
    Err(serde::de::Error::custom(format!("Unknown bool value {n}")))
}

#[derive(Deserialize)]
struct DateRecord {
    service_id: ServiceID,
    date: String,
    exception_type: u8,
}
