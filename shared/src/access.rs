use crate::codec;
use crate::types::MovieFilter;
use rand::Rng;

/// Unfiltered listings never read more than this many rows.
pub const SCAN_LIMIT: i32 = 50;

/// Secondary indexes over the movie table, one per filterable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryIndex {
    UserId,
    Genre,
    Title,
}

impl SecondaryIndex {
    pub fn index_name(self) -> &'static str {
        match self {
            SecondaryIndex::UserId => "userIdIndex",
            SecondaryIndex::Genre => "genreIndex",
            SecondaryIndex::Title => "titleIndex",
        }
    }

    pub fn attribute(self) -> &'static str {
        match self {
            SecondaryIndex::UserId => codec::USER_ID,
            SecondaryIndex::Genre => codec::GENRE,
            SecondaryIndex::Title => codec::TITLE,
        }
    }
}

/// The single store read a request turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieQuery {
    ById(String),
    ByIndex { index: SecondaryIndex, value: String },
    Scan { limit: i32 },
}

/// Pick the query for a list request. Only one filter is honored, with
/// `userId` ahead of `genre` ahead of `title`; blank values count as absent.
pub fn route(filter: &MovieFilter) -> MovieQuery {
    let candidates = [
        (SecondaryIndex::UserId, &filter.user_id),
        (SecondaryIndex::Genre, &filter.genre),
        (SecondaryIndex::Title, &filter.title),
    ];

    candidates
        .into_iter()
        .find_map(|(index, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| MovieQuery::ByIndex {
                    index,
                    value: v.to_string(),
                })
        })
        .unwrap_or(MovieQuery::Scan { limit: SCAN_LIMIT })
}

pub fn by_genre(genre: &str) -> MovieQuery {
    MovieQuery::ByIndex {
        index: SecondaryIndex::Genre,
        value: genre.to_string(),
    }
}

/// Uniform draw over `[0, len)`. `None` for an empty set; never indexes out of range.
pub fn pick_uniform<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let index = rng.random_range(0..items.len());
    Some(items.swap_remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(user_id: Option<&str>, genre: Option<&str>, title: Option<&str>) -> MovieFilter {
        MovieFilter {
            user_id: user_id.map(str::to_string),
            genre: genre.map(str::to_string),
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn test_no_filter_scans_with_cap() {
        assert_eq!(route(&MovieFilter::default()), MovieQuery::Scan { limit: 50 });
    }

    #[test]
    fn test_single_filters_pick_their_index() {
        assert_eq!(
            route(&filter(None, None, Some("Heat"))),
            MovieQuery::ByIndex { index: SecondaryIndex::Title, value: "Heat".to_string() }
        );
        assert_eq!(
            route(&filter(None, Some("crime"), None)),
            MovieQuery::ByIndex { index: SecondaryIndex::Genre, value: "crime".to_string() }
        );
    }

    #[test]
    fn test_user_id_wins_over_genre_and_title() {
        assert_eq!(
            route(&filter(Some("u-1"), Some("crime"), Some("Heat"))),
            MovieQuery::ByIndex { index: SecondaryIndex::UserId, value: "u-1".to_string() }
        );
        assert_eq!(
            route(&filter(None, Some("crime"), Some("Heat"))),
            MovieQuery::ByIndex { index: SecondaryIndex::Genre, value: "crime".to_string() }
        );
    }

    #[test]
    fn test_blank_filter_is_ignored() {
        assert_eq!(
            route(&filter(Some(""), Some("drama"), None)),
            MovieQuery::ByIndex { index: SecondaryIndex::Genre, value: "drama".to_string() }
        );
        assert_eq!(
            route(&filter(Some(""), None, Some(""))),
            MovieQuery::Scan { limit: SCAN_LIMIT }
        );
    }

    #[test]
    fn test_index_names() {
        assert_eq!(SecondaryIndex::UserId.index_name(), "userIdIndex");
        assert_eq!(SecondaryIndex::Genre.attribute(), "genre");
        assert_eq!(SecondaryIndex::Title.index_name(), "titleIndex");
    }

    #[test]
    fn test_pick_uniform() {
        let mut rng = rand::rng();

        assert_eq!(pick_uniform(Vec::<u8>::new(), &mut rng), None);
        for _ in 0..20 {
            assert_eq!(pick_uniform(vec!["only"], &mut rng), Some("only"));
        }

        let picked = pick_uniform(vec![1, 2, 3], &mut rng).unwrap();
        assert!((1..=3).contains(&picked));
    }
}
