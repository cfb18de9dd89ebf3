// ── Single-column sort ──

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::model::{FieldRef, Record};

/// Field names containing this marker are compared as timestamps.
const DATE_MARKER: &str = "Date";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Sort key: one field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }

    /// Compare two records under this spec.
    ///
    /// Nulls sort first ascending and last descending. Values of
    /// different kinds, unparsable dates and NaN compare equal.
    pub fn compare<T: Record>(&self, a: &T, b: &T) -> Ordering {
        let is_date = self.field.contains(DATE_MARKER);
        let ord = compare_values(a.field(&self.field), b.field(&self.field), is_date);
        match self.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// Stable in-place sort.
///
/// Mixed kinds and unparsable dates compare equal to everything, so the
/// comparator is not a total order. `slice::sort_by` may panic on such a
/// comparator; the merge below only ever asks "is right strictly less".
pub fn sort_records<T: Record>(rows: &mut [std::sync::Arc<T>], spec: &SortSpec) {
    merge_sort_by(rows, |a, b| spec.compare(a.as_ref(), b.as_ref()));
}

/// Bottom-up merge sort. Ties keep the left run first.
fn merge_sort_by<T: Clone>(rows: &mut [T], mut cmp: impl FnMut(&T, &T) -> Ordering) {
    let len = rows.len();
    if len < 2 {
        return;
    }
    let mut buf = rows.to_vec();
    let mut width = 1;
    while width < len {
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);
            for slot in &mut buf[start..end] {
                let take_left =
                    right >= end || (left < mid && cmp(&rows[right], &rows[left]) != Ordering::Less);
                if take_left {
                    slot.clone_from(&rows[left]);
                    left += 1;
                } else {
                    slot.clone_from(&rows[right]);
                    right += 1;
                }
            }
            start = end;
        }
        rows.clone_from_slice(&buf);
        width *= 2;
    }
}

fn compare_values(a: Option<FieldRef<'_>>, b: Option<FieldRef<'_>>, is_date: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) if is_date => match (timestamp(a), timestamp(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        },
        (Some(FieldRef::Text(a)), Some(FieldRef::Text(b))) => locale_compare(a, b),
        (Some(FieldRef::Number(a)), Some(FieldRef::Number(b))) => {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

/// Three-level collation close to a root-locale `localeCompare`.
///
/// Primary: base letters, case and accents ignored (`đ` folds to `d`).
/// Secondary: unaccented before accented. Tertiary: lowercase before
/// uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    let (a_base, a_marks) = collation_keys(a);
    let (b_base, b_marks) = collation_keys(b);
    a_base
        .cmp(&b_base)
        .then_with(|| a_marks.cmp(&b_marks))
        .then_with(|| case_order(a, b))
}

/// Lowercased NFD text split into base letters and base-plus-marks.
fn collation_keys(s: &str) -> (String, String) {
    let mut base = String::with_capacity(s.len());
    let mut marked = String::with_capacity(s.len());
    for c in s.nfd().flat_map(char::to_lowercase) {
        match c {
            '\u{0111}' => {
                base.push('d');
                marked.push('d');
                marked.push('\u{0335}');
            }
            c if is_combining_mark(c) => marked.push(c),
            c => {
                base.push(c);
                marked.push(c);
            }
        }
    }
    (base, marked)
}

fn case_order(a: &str, b: &str) -> Ordering {
    a.nfd()
        .zip(b.nfd())
        .find(|(x, y)| x != y)
        .map_or(Ordering::Equal, |(x, _)| {
            if x.is_lowercase() {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        })
}

/// Milliseconds since the epoch, or `None` when the value is not a date.
#[allow(clippy::cast_possible_truncation)]
fn timestamp(value: FieldRef<'_>) -> Option<i64> {
    let raw = match value {
        FieldRef::Number(n) if n.is_finite() => return Some(n as i64),
        FieldRef::Number(_) => return None,
        FieldRef::Text(s) => s.trim(),
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp_millis());
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::{Entity, FieldValue};
    use pretty_assertions::assert_eq;

    fn ids(rows: &[Arc<Entity>]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    fn rows(values: &[(&str, FieldValue)]) -> Vec<Arc<Entity>> {
        values
            .iter()
            .map(|(id, v)| Arc::new(Entity::new(*id).with("v", v.clone())))
            .collect()
    }

    #[test]
    fn nulls_first_ascending_last_descending() {
        let mut data = rows(&[
            ("a", FieldValue::from("b")),
            ("n", FieldValue::Null),
            ("c", FieldValue::from("a")),
        ]);
        sort_records(&mut data, &SortSpec::asc("v"));
        assert_eq!(ids(&data), ["n", "c", "a"]);
        sort_records(&mut data, &SortSpec::desc("v"));
        assert_eq!(ids(&data), ["a", "c", "n"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let mut data = rows(&[
            ("1", FieldValue::from(2)),
            ("2", FieldValue::from(1)),
            ("3", FieldValue::from(2)),
            ("4", FieldValue::from(1)),
        ]);
        sort_records(&mut data, &SortSpec::asc("v"));
        assert_eq!(ids(&data), ["2", "4", "1", "3"]);
        sort_records(&mut data, &SortSpec::desc("v"));
        assert_eq!(ids(&data), ["1", "3", "2", "4"]);
    }

    #[test]
    fn strings_compare_case_insensitively() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("abc", "abc"), Ordering::Equal);
        assert_eq!(locale_compare("ab", "abc"), Ordering::Less);
    }

    #[test]
    fn date_fields_compare_chronologically() {
        let mut data: Vec<Arc<Entity>> = [("x", "2024-03-01"), ("y", "2023-12-31T10:00:00"), ("z", "2024-01-15 08:00:00")]
            .iter()
            .map(|(id, d)| Arc::new(Entity::new(*id).with("createDate", *d)))
            .collect();
        sort_records(&mut data, &SortSpec::asc("createDate"));
        assert_eq!(ids(&data), ["y", "z", "x"]);
    }

    #[test]
    fn unparsable_dates_and_mixed_types_are_equal() {
        let spec = SortSpec::asc("birthDate");
        let a = Entity::new("a").with("birthDate", "not a date");
        let b = Entity::new("b").with("birthDate", "2020-01-01");
        assert_eq!(spec.compare(&a, &b), Ordering::Equal);

        let spec = SortSpec::asc("v");
        let a = Entity::new("a").with("v", 1);
        let b = Entity::new("b").with("v", "1");
        assert_eq!(spec.compare(&a, &b), Ordering::Equal);
    }

    #[test]
    fn accented_names_collate_by_base_letter() {
        assert_eq!(locale_compare("Ánh", "Bảo"), Ordering::Less);
        assert_eq!(locale_compare("Đức", "Em"), Ordering::Less);
        assert_eq!(locale_compare("đức", "Dung"), Ordering::Less);
        assert_eq!(locale_compare("bình", "binz"), Ordering::Less);
        assert_eq!(locale_compare("binh", "bình"), Ordering::Less);
        assert_eq!(locale_compare("ánh", "Ánh"), Ordering::Less);
        assert_eq!(locale_compare("Ánh", "Ánh"), Ordering::Equal);

        let mut data = rows(&[
            ("1", FieldValue::from("Đức")),
            ("2", FieldValue::from("Em")),
            ("3", FieldValue::from("Ánh")),
            ("4", FieldValue::from("Bảo")),
            ("5", FieldValue::from("Yến")),
        ]);
        sort_records(&mut data, &SortSpec::asc("v"));
        assert_eq!(ids(&data), ["3", "4", "1", "2", "5"]);
    }

    #[test]
    fn mixed_numbers_and_text_sort_without_panicking() {
        let mut data: Vec<Arc<Entity>> = (0..64u32)
            .map(|i| {
                let n = f64::from((i * 37 + 11) % 23);
                let value = if (i * 7) % 3 == 0 {
                    FieldValue::from(n.to_string())
                } else {
                    FieldValue::from(n)
                };
                Arc::new(Entity::new(i.to_string()).with("v", value))
            })
            .collect();

        sort_records(&mut data, &SortSpec::asc("v"));
        sort_records(&mut data, &SortSpec::desc("v"));

        let mut seen: Vec<u32> = data.iter().map(|r| r.id.parse().unwrap()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn date_column_with_unparsable_values_sorts_without_panicking() {
        let mut data: Vec<Arc<Entity>> = (0..48u32)
            .map(|i| {
                let day = (i * 11) % 28 + 1;
                let value = match i % 4 {
                    0 => "pending".to_owned(),
                    1 => format!("2024-02-{day:02}"),
                    2 => format!("2023-07-{day:02}T08:30:00"),
                    _ => String::new(),
                };
                Arc::new(Entity::new(i.to_string()).with("dueDate", value))
            })
            .collect();

        sort_records(&mut data, &SortSpec::asc("dueDate"));
        sort_records(&mut data, &SortSpec::desc("dueDate"));
        assert_eq!(data.len(), 48);
    }

    #[test]
    fn merge_keeps_ties_in_input_order() {
        let mut values = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd'), (1, 'e')];
        merge_sort_by(&mut values, |x, y| x.0.cmp(&y.0));
        assert_eq!(values, [(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c'), (1, 'e')]);
    }

    #[test]
    fn order_parses_from_text() {
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert_eq!(SortOrder::Asc.flipped(), SortOrder::Desc);
    }
}
