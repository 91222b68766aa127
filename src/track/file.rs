//! Text codec for section files.
//!
//! A section file is a sequence of blocks, each introduced by a header line
//! containing the word `section` and followed by six value lines:
//!
//! ```text
//! section_1
//! 26, 479
//! 638, 479
//! 26, 569
//! 638, 569
//! 1
//! 0
//! ```
//!
//! The four coordinate lines are the top-left, top-right, bottom-left and
//! bottom-right corners; the last two lines are the x and y rewards. Blank
//! lines are ignored.

use super::section::{Point, Reward, Section};
use super::topology::TrackError;

/// Parse section records from the text of a section file
pub fn parse_sections(text: &str) -> Result<Vec<Section>, TrackError> {
    let mut sections = Vec::new();
    let mut headers = 0usize;
    let mut corners: Vec<Point> = Vec::with_capacity(4);
    let mut rewards: Vec<i32> = Vec::with_capacity(2);

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let malformed = |reason| TrackError::Malformed {
            line: index + 1,
            content: raw.to_string(),
            reason,
        };

        if line.contains("section") {
            if !corners.is_empty() {
                return Err(malformed("section header inside an unfinished section"));
            }
            headers += 1;
            continue;
        }

        if corners.len() < 4 {
            let point = parse_point(line).ok_or_else(|| malformed("expected an `x, y` coordinate pair"))?;
            corners.push(point);
            continue;
        }

        let value = line
            .parse::<i32>()
            .map_err(|_| malformed("expected an integer reward"))?;
        rewards.push(value);

        if rewards.len() == 2 {
            sections.push(Section::new(
                corners[0],
                corners[1],
                corners[2],
                corners[3],
                Reward::new(rewards[0], rewards[1]),
            ));
            corners.clear();
            rewards.clear();
        }
    }

    if !corners.is_empty() {
        return Err(TrackError::Incomplete {
            fields: corners.len() + rewards.len(),
        });
    }

    if headers != sections.len() {
        return Err(TrackError::CountMismatch {
            headers,
            records: sections.len(),
        });
    }

    Ok(sections)
}

/// Render sections in the section file format
pub fn format_sections(sections: &[Section]) -> String {
    let mut out = String::with_capacity(sections.len() * 64);
    for (index, section) in sections.iter().enumerate() {
        out.push_str(&format!("section_{}\n", index + 1));
        for corner in [
            section.top_left,
            section.top_right,
            section.bottom_left,
            section.bottom_right,
        ] {
            out.push_str(&format!("{}, {}\n", corner.x, corner.y));
        }
        out.push_str(&format!("{}\n{}\n\n", section.reward.x, section.reward.y));
    }
    out
}

fn parse_point(line: &str) -> Option<Point> {
    let mut parts = line.split(',');
    let x = parts.next()?.trim().parse().ok()?;
    let y = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::demo_sections;

    const TRACK_0: &str = "section_1\n26, 479\n638, 479\n26, 569\n638, 569\n1\n0\n\n\
section_2\n639, 105\n778, 105\n639, 569\n778, 569\n0\n-1\n\n\
section_3\n76, 18\n778, 18\n76, 104\n778, 104\n-1\n0\n";

    #[test]
    fn test_parse_track() {
        let sections = parse_sections(TRACK_0).unwrap();

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[1].top_left, Point::new(639, 105));
        assert_eq!(sections[1].bottom_right, Point::new(778, 569));
        assert_eq!(sections[1].reward, Reward::new(0, -1));
        assert_eq!(sections[2].reward, Reward::new(-1, 0));
        assert_eq!(sections, demo_sections());
    }

    #[test]
    fn test_format_matches_parse_input() {
        let text = format_sections(&demo_sections());
        assert_eq!(parse_sections(&text).unwrap(), demo_sections());
        assert!(text.starts_with("section_1\n26, 479\n"));
    }

    #[test]
    fn test_malformed_coordinate() {
        let text = "section_1\n26; 479\n";
        match parse_sections(text) {
            Err(TrackError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_reward_line() {
        let text = "section_1\n0, 0\n9, 0\n0, 9\n9, 9\n1, 0\n0\n";
        assert!(matches!(
            parse_sections(text),
            Err(TrackError::Malformed { line: 6, .. })
        ));
    }

    #[test]
    fn test_truncated_record() {
        let text = "section_1\n0, 0\n9, 0\n0, 9\n";
        assert!(matches!(
            parse_sections(text),
            Err(TrackError::Incomplete { fields: 3 })
        ));
    }

    #[test]
    fn test_header_count_mismatch() {
        let text = "section_1\nsection_2\n0, 0\n9, 0\n0, 9\n9, 9\n1\n0\n";
        assert!(matches!(
            parse_sections(text),
            Err(TrackError::CountMismatch { headers: 2, records: 1 })
        ));
    }
}
