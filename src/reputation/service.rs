use uuid::Uuid;

use crate::reputation::repo::Rating;

/// Round to one decimal place, half away from zero. This is the pinned
/// rounding rule for seller scores.
pub(crate) fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Arithmetic mean of all scores, rounded to one decimal. An empty history
/// yields 0.0, matching the default score of a never-rated user.
pub(crate) fn recompute_score(scores: &[i32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: i64 = scores.iter().map(|&s| s as i64).sum();
    round1(sum as f64 / scores.len() as f64)
}

/// Linear scan of the ratee's rating list for an earlier rating by the same
/// rater. Lists are small, so no index is kept; the UNIQUE constraint on
/// (ratee_id, rater_id) still guards the invariant under concurrency.
pub(crate) fn already_rated(ratings: &[Rating], rater_id: Uuid) -> bool {
    ratings.iter().any(|r| r.rater_id == rater_id)
}

pub(crate) fn score_in_range(score: i32) -> bool {
    (1..=5).contains(&score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn rating(rater_id: Uuid, score: i32) -> Rating {
        Rating {
            id: Uuid::new_v4(),
            ratee_id: Uuid::new_v4(),
            rater_id,
            score,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn round1_is_half_away_from_zero() {
        assert_eq!(round1(3.25), 3.3);
        assert_eq!(round1(3.24), 3.2);
        assert_eq!(round1(4.449), 4.4);
        assert_eq!(round1(1.5), 1.5);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn mean_of_four_and_five_is_four_point_five() {
        assert_eq!(recompute_score(&[4, 5]), 4.5);
    }

    #[test]
    fn third_rating_of_three_drops_score_to_four() {
        // [4,5] -> 4.5, then +3 -> round1(12/3) = 4.0
        assert_eq!(recompute_score(&[4, 5, 3]), 4.0);
    }

    #[test]
    fn single_rating_is_its_own_score() {
        for s in 1..=5 {
            assert_eq!(recompute_score(&[s]), s as f64);
        }
    }

    #[test]
    fn uneven_mean_rounds_to_one_decimal() {
        // 1+2 = 3/2 = 1.5; 5+4+4 = 13/3 = 4.333.. -> 4.3
        assert_eq!(recompute_score(&[1, 2]), 1.5);
        assert_eq!(recompute_score(&[5, 4, 4]), 4.3);
    }

    #[test]
    fn empty_history_scores_zero() {
        assert_eq!(recompute_score(&[]), 0.0);
    }

    #[test]
    fn duplicate_rater_detected_by_scan() {
        let rater = Uuid::new_v4();
        let ratings = vec![rating(Uuid::new_v4(), 4), rating(rater, 5)];
        assert!(already_rated(&ratings, rater));
        assert!(!already_rated(&ratings, Uuid::new_v4()));
        assert!(!already_rated(&[], rater));
    }

    #[test]
    fn score_range_is_one_through_five() {
        assert!(!score_in_range(0));
        assert!(score_in_range(1));
        assert!(score_in_range(5));
        assert!(!score_in_range(6));
        assert!(!score_in_range(-3));
    }
}
