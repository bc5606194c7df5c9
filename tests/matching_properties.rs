//! Property tests for the normalizer and both similarity scorers

use proptest::prelude::*;

use medmatch::matching::edit_distance::{distance, normalized_score, EditCosts, EditDistanceScorer};
use medmatch::matching::fragment::FragmentScorer;
use medmatch::matching::scoring::Similarity;
use medmatch::{NormalizationProfile, Normalizer};

/// Katakana that never spell a form word on their own
const CORE_KANA: &str = "[アイウエオキコサスソトナニノハヒフホマミムメモヤユヨラリルレワン]";

fn core_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex(&format!("{CORE_KANA}{{2,8}}")).unwrap()
}

fn annotation() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "",
        "錠",
        "錠5mg",
        "OD錠10mg",
        "カプセル25mg",
        "錠100mg（サワイ）",
        "注射液2mg/mL",
        "「日医工」",
    ])
}

fn ocr_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[ア-ンa-zA-ZＡ-Ｚ0-9０-９錠液涙化注剤用（）()「」%×./ 　]{0,24}").unwrap()
}

proptest! {
    #[test]
    fn proptest_edit_distance_is_symmetric(a in ocr_text(), b in ocr_text()) {
        let costs = EditCosts::default();
        prop_assert_eq!(distance(&a, &b, &costs), distance(&b, &a, &costs));
    }

    #[test]
    fn proptest_edit_distance_bounded_by_longer_string(a in ocr_text(), b in ocr_text()) {
        let d = distance(&a, &b, &EditCosts::default());
        let longer = a.chars().count().max(b.chars().count());
        prop_assert!(d >= 0.0);
        prop_assert!(d <= longer as f64);

        let score = normalized_score(&a, &b, &EditCosts::default());
        prop_assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn proptest_self_similarity_is_one(a in core_name()) {
        prop_assert_eq!(EditDistanceScorer::default().score(&a, &a), 1.0);
        prop_assert_eq!(FragmentScorer::default().score(&a, &a), 1.0);
    }

    #[test]
    fn proptest_fragment_score_in_unit_range(a in core_name(), b in core_name()) {
        let score = FragmentScorer::default().score(&a, &b);
        prop_assert!((0.0..=1.0).contains(&score), "{} vs {}: {}", a, b, score);
    }

    #[test]
    fn proptest_normalization_keeps_original_text(raw in ocr_text()) {
        for profile in [NormalizationProfile::Standard, NormalizationProfile::Extended] {
            let name = Normalizer::new(profile).normalize(&raw);
            let rebuilt = format!("{}{}{}", name.prefix, name.core, name.suffix);
            prop_assert_eq!(rebuilt.as_str(), raw.trim());
        }
    }

    #[test]
    fn proptest_annotations_are_stripped(core in core_name(), suffix in annotation()) {
        let raw = format!("{core}{suffix}");
        let name = Normalizer::default().normalize(&raw);
        prop_assert_eq!(&name.normalized, &core);
        prop_assert_eq!(name.suffix.as_str(), suffix);
        prop_assert_eq!(name.rewrap("ロキソニン"), format!("ロキソニン{suffix}"));
    }

    #[test]
    fn proptest_normalization_is_idempotent(raw in ocr_text()) {
        for profile in [NormalizationProfile::Standard, NormalizationProfile::Extended] {
            let normalizer = Normalizer::new(profile);
            let once = normalizer.normalize(&raw).normalized;
            let twice = normalizer.normalize(&once).normalized;
            prop_assert_eq!(once, twice, "{:?} ({})", raw, profile);
        }
    }

    #[test]
    fn proptest_annotated_names_normalize_idempotently(core in core_name(), suffix in annotation()) {
        for profile in [NormalizationProfile::Standard, NormalizationProfile::Extended] {
            let normalizer = Normalizer::new(profile);
            let once = normalizer.normalize(&format!("{core}{suffix}")).normalized;
            let twice = normalizer.normalize(&once).normalized;
            prop_assert_eq!(once, twice);
        }
    }
}
