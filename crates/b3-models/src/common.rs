/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-dot-]browne[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Calendar-date helpers shared by the raw and clean row types

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

/// ISO calendar date format used in every CSV this workspace writes
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format used by the SGS API (`dd/mm/YYYY`)
pub const SGS_DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a calendar date from the textual forms found in upstream dumps.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[...]` / `YYYY-MM-DDTHH:MM:SS[...]`
/// (the time part and any offset are discarded) and the SGS `dd/mm/YYYY` form.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
  let value = value.trim();
  if value.contains('/') {
    return NaiveDate::parse_from_str(value, SGS_DATE_FORMAT).ok();
  }
  let day_part = value.get(..10)?;
  NaiveDate::parse_from_str(day_part, ISO_DATE_FORMAT).ok()
}

/// Serde adapter that writes dates as `YYYY-MM-DD` and reads any form
/// accepted by [`parse_calendar_date`].
pub mod calendar_date {
  use super::*;

  pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&date.format(ISO_DATE_FORMAT).to_string())
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
      .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date: {}", raw)))
  }
}
