pub fn user_keyphrases(fragment: &str, max_ngram: usize, max_candidates: usize) -> String {
    format!(r#"You'll receive one fragment of a hotel guest review (usually Italian, sometimes English).
Extract the keyphrases that best represent what the guest is talking about.

Return ONLY this JSON:
{{
  "keyphrases": [{{"phrase": "", "score": 0.0}}]
}}

CONSTRAINTS:
- Each phrase is 1 to {max_ngram} words, copied from the fragment, lowercase.
- At most {max_candidates} phrases, ranked by relevance (score in 0..1, descending).
- No duplicates, no stop-words on their own.
- Keep the fragment's language; do not translate.

FRAGMENT:
<{fragment}>"#, max_ngram = max_ngram, max_candidates = max_candidates, fragment = fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_bounds_and_fragment() {
        let p = user_keyphrases("Colazione varia ed abbondante", 2, 10);
        assert!(p.contains("1 to 2 words"));
        assert!(p.contains("At most 10 phrases"));
        assert!(p.contains("<Colazione varia ed abbondante>"));
        assert!(p.contains(r#""keyphrases": [{"phrase": "", "score": 0.0}]"#));
    }
}
