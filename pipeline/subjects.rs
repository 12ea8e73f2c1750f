//! Contiguous subject grouping over an ordered record table.
//!
//! Records arrive sorted by the leading integer subject id; a range closes and
//! the next one opens whenever the id changes. Sortedness is assumed, not
//! enforced: an out-of-order repeat of an id simply opens a new range.

/// Inclusive row span `[first, last]` belonging to one subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubjectRange {
    pub first: usize,
    pub last: usize,
}

impl SubjectRange {
    /// Number of rows in the span; always at least one.
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }
}

fn leading_id(line: &str) -> i64 {
    let field = line.split(',').next().unwrap_or("");
    field
        .trim()
        .parse::<i64>()
        .unwrap_or_else(|_| panic!("record has no leading integer subject id: {line:?}"))
}

/// Splits `records` into contiguous ranges of equal leading subject id.
///
/// Panics when fewer than two records are supplied (precondition) or when a
/// leading field is not an integer (malformed grouping input).
pub fn subject_ranges(records: &[String]) -> Vec<SubjectRange> {
    assert!(
        records.len() > 1,
        "subject grouping requires at least two records, got {}",
        records.len()
    );

    let mut ranges = Vec::new();
    let mut first = 0usize;
    let mut current = leading_id(&records[0]);

    for (idx, record) in records.iter().enumerate().skip(1) {
        let id = leading_id(record);
        if id != current {
            ranges.push(SubjectRange { first, last: idx - 1 });
            first = idx;
            current = id;
        }
    }
    ranges.push(SubjectRange {
        first,
        last: records.len() - 1,
    });

    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(ids: &[i64]) -> Vec<String> {
        ids.iter().map(|id| format!("{id},0,0")).collect()
    }

    #[test]
    fn groups_contiguous_ids() {
        let ranges = subject_ranges(&records(&[1, 1, 1, 2, 2, 3]));
        assert_eq!(
            ranges,
            vec![
                SubjectRange { first: 0, last: 2 },
                SubjectRange { first: 3, last: 4 },
                SubjectRange { first: 5, last: 5 },
            ]
        );
    }

    #[test]
    fn out_of_order_repeat_opens_a_new_range() {
        let ranges = subject_ranges(&records(&[1, 2, 1]));
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[2], SubjectRange { first: 2, last: 2 });
    }

    #[test]
    fn final_range_closes_at_the_last_record() {
        let ranges = subject_ranges(&records(&[7, 7]));
        assert_eq!(ranges, vec![SubjectRange { first: 0, last: 1 }]);
    }

    #[test]
    #[should_panic(expected = "at least two records")]
    fn single_record_is_rejected() {
        subject_ranges(&records(&[1]));
    }

    #[test]
    #[should_panic(expected = "leading integer subject id")]
    fn malformed_leading_field_is_fatal() {
        subject_ranges(&["oops,1".to_string(), "2,1".to_string()]);
    }
}
