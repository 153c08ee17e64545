use crate::photos::MediaItem;

/// Whether `candidate` already exists somewhere in `reference`.
///
/// A reference item is the same media when its filename contains the
/// candidate's filename and at least one of these agrees: dimensions,
/// dimensions rotated by 90 degrees, or creation time. The filename check is
/// one-directional: a long reference name can cover many shorter candidates.
pub fn matches(reference: &[MediaItem], candidate: &MediaItem) -> bool {
    reference.iter().any(|item| is_same_media(item, candidate))
}

fn is_same_media(reference: &MediaItem, candidate: &MediaItem) -> bool {
    let name_match = reference.filename.contains(candidate.filename.as_str());
    if !name_match {
        return false;
    }

    let window_match = both_equal(reference.width(), candidate.width())
        && both_equal(reference.height(), candidate.height());
    let inverted_window_match = both_equal(reference.width(), candidate.height())
        && both_equal(reference.height(), candidate.width());
    let created_match = both_equal(reference.creation_time(), candidate.creation_time());

    window_match || inverted_window_match || created_match
}

/// Absent on either side never counts as equal
fn both_equal(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photos::MediaMetadata;

    fn item(
        filename: &str,
        width: Option<&str>,
        height: Option<&str>,
        created: Option<&str>,
    ) -> MediaItem {
        MediaItem {
            id: filename.to_string(),
            filename: filename.to_string(),
            mime_type: "image/jpeg".to_string(),
            media_metadata: Some(MediaMetadata {
                creation_time: created.map(str::to_string),
                width: width.map(str::to_string),
                height: height.map(str::to_string),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_item_matches() {
        let master = item("A.jpg", Some("100"), Some("200"), Some("2020-01-01T00:00:00Z"));
        let candidate = master.clone();
        assert!(matches(&[master], &candidate));
    }

    #[test]
    fn test_rotated_dimensions_match() {
        let master = item("A.jpg", Some("100"), Some("200"), None);
        let candidate = item("A.jpg", Some("200"), Some("100"), None);
        assert!(matches(&[master], &candidate));
    }

    #[test]
    fn test_creation_time_fallback_with_substring_name() {
        let master = item("IMG_0001.jpg", None, None, Some("2020-01-01T00:00:00Z"));
        let candidate = item("IMG_0001", Some("1"), Some("2"), Some("2020-01-01T00:00:00Z"));
        assert!(matches(&[master], &candidate));
    }

    #[test]
    fn test_name_gate_overrides_metadata() {
        let master = item("B.jpg", Some("100"), Some("200"), Some("2020-01-01T00:00:00Z"));
        let candidate = item("A.jpg", Some("100"), Some("200"), Some("2020-01-01T00:00:00Z"));
        assert!(!matches(&[master], &candidate));
    }

    #[test]
    fn test_empty_reference_never_matches() {
        let candidate = item("A.jpg", Some("1"), Some("1"), None);
        assert!(!matches(&[], &candidate));
    }

    #[test]
    fn test_absent_metadata_is_not_a_match() {
        let master = MediaItem {
            filename: "A.jpg".to_string(),
            ..Default::default()
        };
        let candidate = master.clone();
        assert!(!matches(&[master], &candidate));

        let master = item("A.jpg", Some("100"), None, None);
        let candidate = item("A.jpg", Some("100"), None, None);
        assert!(!matches(&[master], &candidate));
    }

    #[test]
    fn test_name_match_alone_is_not_enough() {
        let master = item("A.jpg", Some("100"), Some("200"), Some("2020-01-01T00:00:00Z"));
        let candidate = item("A.jpg", Some("300"), Some("400"), Some("2021-01-01T00:00:00Z"));
        assert!(!matches(&[master], &candidate));
    }

    #[test]
    fn test_any_reference_item_suffices() {
        let master = vec![
            item("X.jpg", Some("1"), Some("1"), None),
            item("Y.jpg", Some("2"), Some("2"), None),
            item("A.jpg", Some("100"), Some("200"), None),
        ];
        let candidate = item("A.jpg", Some("100"), Some("200"), None);
        assert!(matches(&master, &candidate));
    }

    // Documents current behavior, which may not be intended: the reference
    // filename must contain the candidate's, never the other way round.
    #[test]
    fn test_name_match_is_directional() {
        let created = Some("2020-01-01T00:00:00Z");
        let long = item("IMG_0001-edited.jpg", None, None, created);
        let short = item("IMG_0001", None, None, created);

        assert!(matches(&[long.clone()], &short));
        assert!(!matches(&[short], &long));

        // A broad reference name also swallows unrelated short candidates.
        let unrelated = item("1.jpg", None, None, created);
        let broad = item("holiday_2021.jpg", None, None, created);
        assert!(matches(&[broad], &unrelated));
    }
}
