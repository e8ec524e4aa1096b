use regex::Regex;

use crate::config::SentimentOptions;
use crate::errors::{Result, TrendAnalysisError};
use crate::models::{Polarity, SentimentTally};

/// Produces a polarity in `[-1, 1]` for one piece of text.
pub trait PolarityScorer {
    fn polarity(&self, text: &str) -> Result<f64>;
}

impl<F> PolarityScorer for F
where
    F: Fn(&str) -> Result<f64>,
{
    fn polarity(&self, text: &str) -> Result<f64> {
        self(text)
    }
}

/// Word weights for audience comments. Positive weights are favourable.
const LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("brilliant", 0.9),
    ("clear", 0.1),
    ("cool", 0.35),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("fun", 0.3),
    ("funny", 0.25),
    ("good", 0.7),
    ("great", 0.8),
    ("helpful", 0.5),
    ("incredible", 0.9),
    ("informative", 0.5),
    ("interesting", 0.5),
    ("like", 0.2),
    ("love", 0.5),
    ("loved", 0.7),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("thanks", 0.2),
    ("useful", 0.3),
    ("wonderful", 1.0),
    ("annoying", -0.8),
    ("awful", -1.0),
    ("bad", -0.7),
    ("boring", -1.0),
    ("clickbait", -0.6),
    ("confusing", -0.4),
    ("disappointing", -0.6),
    ("dislike", -0.5),
    ("fake", -0.5),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("misleading", -0.6),
    ("poor", -0.4),
    ("stupid", -0.8),
    ("terrible", -1.0),
    ("useless", -0.5),
    ("waste", -0.4),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

const NEGATIONS: &[&str] = &["not", "never", "no", "isn't", "wasn't", "don't", "doesn't", "didn't"];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("so", 1.3),
    ("extremely", 1.5),
    ("super", 1.3),
    ("absolutely", 1.4),
];

/// Lexicon-based polarity: the mean weight of the sentiment-bearing words.
///
/// A negation in front of a word flips and halves its weight; an intensifier
/// scales it. Text with no word tokens cannot be classified.
#[derive(Debug, Clone, Default)]
pub struct LexiconScorer;

impl LexiconScorer {
    pub fn new() -> Self {
        LexiconScorer
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> Result<f64> {
        let words: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(TrendAnalysisError::ClassificationFailure(
                "no words to score".to_string(),
            ));
        }

        let mut total = 0.0;
        let mut matched = 0usize;
        for (i, word) in words.iter().enumerate() {
            let Some(&(_, weight)) = LEXICON.iter().find(|(w, _)| *w == word.as_str()) else {
                continue;
            };

            let mut score = weight;
            let previous = i.checked_sub(1).map(|j| words[j].as_str());
            if let Some(&(_, factor)) = previous.and_then(|p| INTENSIFIERS.iter().find(|(w, _)| *w == p)) {
                score *= factor;
            }
            let negated = (1..=2)
                .filter_map(|back| i.checked_sub(back))
                .any(|j| NEGATIONS.contains(&words[j].as_str()));
            if negated {
                score *= -0.5;
            }

            total += score;
            matched += 1;
        }

        if matched == 0 {
            return Ok(0.0);
        }
        Ok((total / matched as f64).clamp(-1.0, 1.0))
    }
}

/// Buckets a polarity with the configured thresholds.
pub fn classify_polarity(polarity: f64, options: &SentimentOptions) -> Polarity {
    if polarity > options.positive_threshold {
        Polarity::Positive
    } else if polarity < options.negative_threshold {
        Polarity::Negative
    } else {
        Polarity::Neutral
    }
}

/// Strips HTML tags, links and repeated whitespace from comment text.
#[derive(Debug, Clone)]
pub struct CommentCleaner {
    html: Regex,
    url: Regex,
    whitespace: Regex,
}

impl CommentCleaner {
    pub fn new() -> Result<Self> {
        Ok(CommentCleaner {
            html: Regex::new(r"<[^>]+>")?,
            url: Regex::new(r"http\S+|www\.\S+")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    pub fn clean(&self, text: &str) -> String {
        let cleaned = self.html.replace_all(text, " ");
        let cleaned = self.url.replace_all(&cleaned, " ");
        let cleaned = self.whitespace.replace_all(&cleaned, " ");
        cleaned.trim().to_string()
    }
}

/// Classifies comments one by one into a [`SentimentTally`].
///
/// Best effort: empty comments and comments the scorer rejects are dropped
/// and counted in `dropped`, never folded into Neutral.
pub struct SentimentAggregator<S> {
    scorer: S,
    cleaner: CommentCleaner,
    options: SentimentOptions,
}

impl<S: PolarityScorer> SentimentAggregator<S> {
    pub fn new(scorer: S, options: SentimentOptions) -> Result<Self> {
        Ok(SentimentAggregator {
            scorer,
            cleaner: CommentCleaner::new()?,
            options,
        })
    }

    pub fn aggregate<T: AsRef<str>>(&self, comments: &[T]) -> SentimentTally {
        let mut tally = SentimentTally::default();

        for comment in comments {
            let text = self.cleaner.clean(comment.as_ref());
            if text.is_empty() {
                tally.dropped += 1;
                continue;
            }

            match self.scorer.polarity(&text) {
                Ok(polarity) if polarity.is_finite() => {
                    let polarity = polarity.clamp(-1.0, 1.0);
                    tally.record(classify_polarity(polarity, &self.options));
                }
                Ok(polarity) => {
                    tracing::debug!(polarity, "scorer returned a non-finite polarity, dropping comment");
                    tally.dropped += 1;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "comment could not be classified, dropping");
                    tally.dropped += 1;
                }
            }
        }

        if tally.dropped > 0 {
            tracing::warn!(
                dropped = tally.dropped,
                classified = tally.total(),
                "some comments were dropped from sentiment"
            );
        }

        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(map: &'static [(&'static str, f64)]) -> impl Fn(&str) -> Result<f64> {
        move |text: &str| {
            map.iter()
                .find(|(t, _)| *t == text)
                .map(|(_, p)| *p)
                .ok_or_else(|| TrendAnalysisError::ClassificationFailure(text.to_string()))
        }
    }

    #[test]
    fn one_comment_per_bucket() {
        let scorer = fixed(&[("great video!", 0.6), ("terrible", -0.6), ("it exists", 0.0)]);
        let aggregator = SentimentAggregator::new(scorer, SentimentOptions::default()).unwrap();

        let tally = aggregator.aggregate(&["great video!", "terrible", "it exists"]);
        assert_eq!(tally.positive, 1);
        assert_eq!(tally.neutral, 1);
        assert_eq!(tally.negative, 1);
        assert_eq!(tally.dropped, 0);
    }

    #[test]
    fn empty_input_gives_zero_tally() {
        let aggregator =
            SentimentAggregator::new(LexiconScorer::new(), SentimentOptions::default()).unwrap();
        let none: [&str; 0] = [];
        assert_eq!(aggregator.aggregate(&none), SentimentTally::default());
    }

    #[test]
    fn empty_strings_are_dropped_not_neutral() {
        let aggregator =
            SentimentAggregator::new(LexiconScorer::new(), SentimentOptions::default()).unwrap();
        let tally = aggregator.aggregate(&["", "   ", "<br>"]);
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.neutral, 0);
        assert_eq!(tally.dropped, 3);
    }

    #[test]
    fn failed_classifications_are_dropped() {
        let scorer = fixed(&[("good", 0.5)]);
        let aggregator = SentimentAggregator::new(scorer, SentimentOptions::default()).unwrap();
        let tally = aggregator.aggregate(&["good", "unknown", "good"]);
        assert_eq!(tally.positive, 2);
        assert_eq!(tally.total(), 2);
        assert_eq!(tally.dropped, 1);
    }

    #[test]
    fn thresholds_are_exclusive() {
        let options = SentimentOptions::default();
        assert_eq!(classify_polarity(0.5, &options), Polarity::Positive);
        assert_eq!(classify_polarity(-0.5, &options), Polarity::Negative);
        assert_eq!(classify_polarity(0.0, &options), Polarity::Neutral);
        assert_eq!(classify_polarity(0.1, &options), Polarity::Neutral);
        assert_eq!(classify_polarity(-0.1, &options), Polarity::Neutral);
    }

    #[test]
    fn lexicon_scores_the_reference_comments() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("great video!").unwrap() > 0.1);
        assert!(scorer.polarity("terrible").unwrap() < -0.1);
        assert_eq!(scorer.polarity("it exists").unwrap(), 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        let scorer = LexiconScorer::new();
        assert!(scorer.polarity("this is not good").unwrap() < 0.0);
        assert!(scorer.polarity("not bad at all").unwrap() > 0.0);
    }

    #[test]
    fn intensifier_is_clamped() {
        let scorer = LexiconScorer::new();
        assert_eq!(scorer.polarity("extremely awesome").unwrap(), 1.0);
    }

    #[test]
    fn symbols_only_cannot_be_classified() {
        assert!(LexiconScorer::new().polarity("!!! ???").is_err());
    }

    #[test]
    fn cleaner_strips_markup_and_links() {
        let cleaner = CommentCleaner::new().unwrap();
        assert_eq!(
            cleaner.clean("<b>loved</b>   it https://youtu.be/x  www.example.com"),
            "loved it"
        );
    }
}
