//! Person record types and their field validation.
//!
//! Stored JSON shape (one entry of the backing file):
//! ```json
//! {
//!   "name": "张伟",
//!   "birth_time": {
//!     "year": 1990, "month": 5, "day": 17, "hour": 8, "minute": 30,
//!     "datetime_str": "1990-05-17 08:30"
//!   },
//!   "location": { "city": "北京", "latitude": 39.9042, "longitude": 116.4074 },
//!   "gender": "男",
//!   "timezone": "Asia/Shanghai",
//!   "created_at": "2024-01-01 12:00:00",
//!   "updated_at": "2024-02-01 09:15:00"
//! }
//! ```

use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Format of `created_at` / `updated_at`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MIN_YEAR: i64 = 1;
const MAX_YEAR: i64 = 9999;

/// Current local time formatted as a record timestamp.
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Field groups
// ---------------------------------------------------------------------------

/// Calendar-valid birth date and time with its display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    /// `YYYY-MM-DD HH:MM`
    pub datetime_str: String,
}

impl BirthTime {
    /// Build a birth time, rejecting anything that is not a real calendar
    /// date/time (month 13, Feb 30, hour 24, ...).
    pub fn new(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
    ) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidBirthTime {
            year,
            month,
            day,
            hour,
            minute,
        };

        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(invalid());
        }
        let to_u32 = |v: i64| u32::try_from(v).map_err(|_| invalid());
        let (m, d, h, min) = (to_u32(month)?, to_u32(day)?, to_u32(hour)?, to_u32(minute)?);

        NaiveDate::from_ymd_opt(year as i32, m, d).ok_or_else(invalid)?;
        NaiveTime::from_hms_opt(h, min, 0).ok_or_else(invalid)?;

        Ok(Self {
            year: year as i32,
            month: m,
            day: d,
            hour: h,
            minute: min,
            datetime_str: format!("{:04}-{:02}-{:02} {:02}:{:02}", year, m, d, h, min),
        })
    }

    /// Re-run validation on an existing value, returning the canonical form.
    pub fn revalidated(&self) -> Result<Self, ValidationError> {
        Self::new(
            self.year.into(),
            self.month.into(),
            self.day.into(),
            self.hour.into(),
            self.minute.into(),
        )
    }
}

/// Birth place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(city: String, latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            city,
            latitude: check_latitude(latitude)?,
            longitude: check_longitude(longitude)?,
        })
    }
}

fn check_latitude(latitude: f64) -> Result<f64, ValidationError> {
    if (-90.0..=90.0).contains(&latitude) {
        Ok(latitude)
    } else {
        Err(ValidationError::LatitudeOutOfRange(latitude))
    }
}

fn check_longitude(longitude: f64) -> Result<f64, ValidationError> {
    if (-180.0..=180.0).contains(&longitude) {
        Ok(longitude)
    } else {
        Err(ValidationError::LongitudeOutOfRange(longitude))
    }
}

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

/// One stored person, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub birth_time: BirthTime,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Person {
    /// Check a record read back from disk against the write-time rules.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        self.birth_time.revalidated()?;
        check_latitude(self.location.latitude)?;
        check_longitude(self.location.longitude)?;
        Ok(())
    }

    /// Apply a partial update, returning the updated copy.
    ///
    /// `self` is left untouched when any field group fails validation.
    pub fn with_update(&self, update: &PersonUpdate) -> Result<Person, ValidationError> {
        if update.is_empty() {
            return Err(ValidationError::NoFieldsToUpdate);
        }

        let mut person = self.clone();

        if update.touches_birth_time() {
            let bt = &self.birth_time;
            person.birth_time = BirthTime::new(
                update.birth_year.unwrap_or(bt.year.into()),
                update.birth_month.unwrap_or(bt.month.into()),
                update.birth_day.unwrap_or(bt.day.into()),
                update.birth_hour.unwrap_or(bt.hour.into()),
                update.birth_minute.unwrap_or(bt.minute.into()),
            )?;
        }

        if update.touches_location() {
            if let Some(ref city) = update.city {
                person.location.city = city.clone();
            }
            if let Some(latitude) = update.latitude {
                person.location.latitude = check_latitude(latitude)?;
            }
            if let Some(longitude) = update.longitude {
                person.location.longitude = check_longitude(longitude)?;
            }
        }

        if let Some(ref gender) = update.gender {
            person.gender = Some(gender.clone());
        }
        if let Some(ref timezone) = update.timezone {
            person.timezone = Some(timezone.clone());
        }

        person.updated_at = Some(now_timestamp());
        Ok(person)
    }
}

// ---------------------------------------------------------------------------
// Write inputs
// ---------------------------------------------------------------------------

/// Fields accepted by `add_person`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
    pub name: String,
    pub birth_year: i64,
    pub birth_month: i64,
    pub birth_day: i64,
    pub birth_hour: i64,
    pub birth_minute: i64,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl NewPerson {
    /// Validate every field and build the record, stamping `created_at`.
    ///
    /// Name uniqueness is the store's concern and is not checked here.
    pub fn into_person(self) -> Result<Person, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let birth_time = BirthTime::new(
            self.birth_year,
            self.birth_month,
            self.birth_day,
            self.birth_hour,
            self.birth_minute,
        )?;
        let location = Location::new(self.city, self.latitude, self.longitude)?;

        Ok(Person {
            name: self.name,
            birth_time,
            location,
            gender: self.gender.filter(|g| !g.is_empty()),
            timezone: self.timezone.filter(|tz| !tz.is_empty()),
            created_at: now_timestamp(),
            updated_at: None,
        })
    }
}

/// Partial update for `update_person`. `None` (absent or JSON `null`) means
/// "leave as is"; optional fields cannot be cleared once set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonUpdate {
    #[serde(default)]
    pub birth_year: Option<i64>,
    #[serde(default)]
    pub birth_month: Option<i64>,
    #[serde(default)]
    pub birth_day: Option<i64>,
    #[serde(default)]
    pub birth_hour: Option<i64>,
    #[serde(default)]
    pub birth_minute: Option<i64>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl PersonUpdate {
    pub fn touches_birth_time(&self) -> bool {
        self.birth_year.is_some()
            || self.birth_month.is_some()
            || self.birth_day.is_some()
            || self.birth_hour.is_some()
            || self.birth_minute.is_some()
    }

    pub fn touches_location(&self) -> bool {
        self.city.is_some() || self.latitude.is_some() || self.longitude.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_birth_time()
            && !self.touches_location()
            && self.gender.is_none()
            && self.timezone.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewPerson {
        NewPerson {
            name: "张伟".into(),
            birth_year: 1990,
            birth_month: 5,
            birth_day: 17,
            birth_hour: 8,
            birth_minute: 30,
            city: "北京".into(),
            latitude: 39.9042,
            longitude: 116.4074,
            gender: Some("男".into()),
            timezone: None,
        }
    }

    #[test]
    fn test_birth_time_display_string() {
        let bt = BirthTime::new(1990, 5, 7, 8, 3).unwrap();
        assert_eq!(bt.datetime_str, "1990-05-07 08:03");
    }

    #[test]
    fn test_birth_time_rejects_impossible_dates() {
        assert!(BirthTime::new(2023, 13, 1, 0, 0).is_err());
        assert!(BirthTime::new(2023, 2, 30, 0, 0).is_err());
        assert!(BirthTime::new(2023, 2, 29, 0, 0).is_err());
        assert!(BirthTime::new(2023, 4, 31, 0, 0).is_err());
        assert!(BirthTime::new(2023, 1, 1, 24, 0).is_err());
        assert!(BirthTime::new(2023, 1, 1, 0, 60).is_err());
        assert!(BirthTime::new(2023, 1, 1, -1, 0).is_err());
        assert!(BirthTime::new(0, 1, 1, 0, 0).is_err());
        assert!(BirthTime::new(10000, 1, 1, 0, 0).is_err());
    }

    #[test]
    fn test_birth_time_accepts_leap_day() {
        assert!(BirthTime::new(2024, 2, 29, 23, 59).is_ok());
        assert!(BirthTime::new(2000, 2, 29, 0, 0).is_ok());
        assert!(BirthTime::new(1900, 2, 29, 0, 0).is_err());
    }

    #[test]
    fn test_location_bounds_are_inclusive() {
        assert!(Location::new("a".into(), 90.0, 180.0).is_ok());
        assert!(Location::new("a".into(), -90.0, -180.0).is_ok());
        assert_eq!(
            Location::new("a".into(), 90.0001, 0.0).unwrap_err(),
            ValidationError::LatitudeOutOfRange(90.0001)
        );
        assert_eq!(
            Location::new("a".into(), 0.0, -180.0001).unwrap_err(),
            ValidationError::LongitudeOutOfRange(-180.0001)
        );
        assert!(Location::new("a".into(), f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_into_person_drops_empty_optional_fields() {
        let mut new = sample();
        new.gender = Some(String::new());
        new.timezone = Some("Asia/Shanghai".into());
        let person = new.into_person().unwrap();
        assert_eq!(person.gender, None);
        assert_eq!(person.timezone.as_deref(), Some("Asia/Shanghai"));
        assert!(!person.created_at.is_empty());
        assert!(person.updated_at.is_none());
    }

    #[test]
    fn test_into_person_rejects_blank_name() {
        let mut new = sample();
        new.name = "   ".into();
        assert_eq!(new.into_person().unwrap_err(), ValidationError::EmptyName);
    }

    #[test]
    fn test_update_merges_birth_fields_before_validating() {
        let person = sample().into_person().unwrap();
        let update = PersonUpdate {
            birth_day: Some(31),
            ..Default::default()
        };
        // May 31 exists.
        let updated = person.with_update(&update).unwrap();
        assert_eq!(updated.birth_time.datetime_str, "1990-05-31 08:30");

        // June 31 does not; the source record is unchanged.
        let bad = PersonUpdate {
            birth_month: Some(6),
            birth_day: Some(31),
            ..Default::default()
        };
        assert!(updated.with_update(&bad).is_err());
        assert_eq!(updated.birth_time.month, 5);
    }

    #[test]
    fn test_update_gender_only_keeps_other_groups() {
        let person = sample().into_person().unwrap();
        let update = PersonUpdate {
            gender: Some("女".into()),
            ..Default::default()
        };
        let updated = person.with_update(&update).unwrap();
        assert_eq!(updated.gender.as_deref(), Some("女"));
        assert_eq!(updated.birth_time, person.birth_time);
        assert_eq!(updated.location, person.location);
        assert_eq!(updated.created_at, person.created_at);
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let person = sample().into_person().unwrap();
        assert_eq!(
            person.with_update(&PersonUpdate::default()).unwrap_err(),
            ValidationError::NoFieldsToUpdate
        );
    }

    #[test]
    fn test_update_ignores_unknown_keys() {
        let update: PersonUpdate =
            serde_json::from_value(serde_json::json!({ "nickname": "x" })).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_null_optionals_count_as_absent() {
        let mut person = sample().into_person().unwrap();
        person.gender = Some("女".into());
        let update: PersonUpdate = serde_json::from_value(serde_json::json!({
            "name": person.name,
            "gender": null,
            "timezone": null
        }))
        .unwrap();
        assert!(update.is_empty());
        assert_eq!(
            person.with_update(&update).unwrap_err(),
            ValidationError::NoFieldsToUpdate
        );
        assert_eq!(person.gender.as_deref(), Some("女"));
    }

    #[test]
    fn test_person_json_omits_absent_optionals() {
        let person = sample().into_person().unwrap();
        let json = serde_json::to_value(&person).unwrap();
        assert!(json.get("timezone").is_none());
        assert!(json.get("updated_at").is_none());
        assert_eq!(json["birth_time"]["datetime_str"], "1990-05-17 08:30");
        assert_eq!(json["location"]["city"], "北京");
    }
}
