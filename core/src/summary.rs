//! Query-biased extractive summaries for result previews.

use std::cmp::Reverse;
use std::collections::HashSet;

use crate::select::top_k;
use crate::Normalization;

/// Sentences with fewer tokens are never picked.
pub const MIN_SENTENCE_TOKENS: usize = 5;
/// Summaries longer than this many words are cut.
pub const MAX_SUMMARY_WORDS: usize = 50;
/// Words kept when a summary is cut.
pub const TRUNCATED_WORDS: usize = 35;
pub const ELLIPSIS: &str = "...";

const SENTENCES_PER_SUMMARY: usize = 2;

/// Split after every `.`, `!` or `?`; the punctuation stays with its sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split_inclusive(['.', '!', '?']).collect()
}

/// Score for sentence `index`: lead bias, query token hits, distinct query
/// tokens present, and the longest run of consecutive query tokens.
pub fn score_sentence(index: usize, tokens: &[String], query: &HashSet<&str>) -> usize {
    let lead = match index {
        0 => 2,
        1 => 1,
        _ => 0,
    };
    let mut hits = 0;
    let mut longest_run = 0;
    let mut run = 0;
    let mut present: HashSet<&str> = HashSet::new();
    for token in tokens {
        if let Some(&q) = query.get(token.as_str()) {
            hits += 1;
            present.insert(q);
            run += 1;
            longest_run = longest_run.max(run);
        } else {
            run = 0;
        }
    }
    lead + hits + present.len() + longest_run
}

/// Pick the two best-scoring eligible sentences of `text`, best first, and
/// cut the result to [`TRUNCATED_WORDS`] words when it runs past
/// [`MAX_SUMMARY_WORDS`]. Equal scores prefer the earlier sentence.
pub fn query_biased_summary<S: AsRef<str>>(text: &str, query_tokens: &[S], normalization: Normalization) -> String {
    let query: HashSet<&str> = query_tokens.iter().map(|t| t.as_ref()).collect();
    let sentences = split_sentences(text);

    let scored = sentences.iter().enumerate().filter_map(|(i, sentence)| {
        let tokens = normalization.tokenize(sentence);
        (tokens.len() >= MIN_SENTENCE_TOKENS).then(|| (score_sentence(i, &tokens, &query), Reverse(i)))
    });
    let chosen: Vec<&str> = top_k(scored, SENTENCES_PER_SUMMARY)
        .into_iter()
        .map(|(_, Reverse(i))| sentences[i].trim())
        .collect();

    truncate_words(&chosen.join(" "))
}

/// Collapse whitespace; beyond [`MAX_SUMMARY_WORDS`] words keep the first
/// [`TRUNCATED_WORDS`] and append [`ELLIPSIS`].
pub fn truncate_words(summary: &str) -> String {
    let words: Vec<&str> = summary.split_whitespace().collect();
    if words.len() > MAX_SUMMARY_WORDS {
        let mut cut = words[..TRUNCATED_WORDS].join(" ");
        cut.push_str(ELLIPSIS);
        cut
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn words(n: usize, word: &str) -> String {
        vec![word; n].join(" ")
    }

    #[test]
    fn splits_keeping_punctuation() {
        assert_eq!(split_sentences("One. Two! Three? tail"), vec!["One.", " Two!", " Three?", " tail"]);
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn scores_each_component() {
        let query: HashSet<&str> = ["quake", "damage"].into_iter().collect();
        let tokens = tokenize("quake damage quake in the city damage");
        // lead 2, hits 4, distinct 2, longest run 3
        assert_eq!(score_sentence(0, &tokens, &query), 2 + 4 + 2 + 3);
        assert_eq!(score_sentence(1, &tokens, &query), 1 + 4 + 2 + 3);
        assert_eq!(score_sentence(7, &tokens, &query), 4 + 2 + 3);
    }

    #[test]
    fn trailing_run_counts_toward_longest() {
        let query: HashSet<&str> = ["fire", "crews"].into_iter().collect();
        let tokens = tokenize("officials said fire crews");
        assert_eq!(score_sentence(5, &tokens, &query), 2 + 2 + 2);
    }

    #[test]
    fn four_token_sentences_are_never_chosen() {
        let text = "Quake quake quake quake. The city was quiet today.";
        let query = tokenize("quake");
        assert_eq!(query_biased_summary(text, &query, Normalization::Plain), "The city was quiet today.");
    }

    #[test]
    fn five_token_sentence_is_eligible() {
        let text = "Quake quake quake quake quake.";
        let query = tokenize("quake");
        assert_eq!(query_biased_summary(text, &query, Normalization::Plain), text);
    }

    #[test]
    fn best_two_sentences_best_first() {
        let text = "Officials met on Monday morning. Nothing about the topic here at all. \
                    The storm hit the coast with storm surge.";
        let query = tokenize("storm coast");
        let summary = query_biased_summary(text, &query, Normalization::Plain);
        assert_eq!(summary, "The storm hit the coast with storm surge. Officials met on Monday morning.");
    }

    #[test]
    fn equal_scores_prefer_earlier_sentences() {
        // the last three sentences each score 3
        let text = "Officials gathered downtown early Monday. Nobody answered the phone calls there. \
                    The flood covered the main road. The flood closed the old bridge. \
                    The flood reached the school gym.";
        let query = tokenize("flood");
        let summary = query_biased_summary(text, &query, Normalization::Plain);
        assert_eq!(summary, "The flood covered the main road. The flood closed the old bridge.");
    }

    #[test]
    fn fifty_words_are_kept_whole() {
        let fifty = format!("{}.", words(50, "word"));
        assert_eq!(truncate_words(&fifty), fifty);
    }

    #[test]
    fn fifty_one_words_are_cut_to_thirty_five() {
        let text = format!("{}. {}.", words(30, "alpha"), words(21, "beta"));
        let query = tokenize("alpha");
        let summary = query_biased_summary(&text, &query, Normalization::Plain);
        assert!(summary.ends_with(ELLIPSIS));
        let kept = summary.trim_end_matches(ELLIPSIS);
        assert_eq!(kept.split_whitespace().count(), TRUNCATED_WORDS);
        assert!(kept.starts_with("alpha"));
    }

    #[test]
    fn no_eligible_sentences_gives_empty_summary() {
        assert_eq!(query_biased_summary("Too short. Also short!", &["short"], Normalization::Plain), "");
    }
}
